//! Statement generation through the registry.

mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::{context, registry, text, user, Item, Role, Suffix, Tagged, User, UserRole};
use oxide_mapper_core::{
    ConvertingCustomizer, Criteria, DialectKind, GeneratorRegistry, IdValueSource, MapperError,
    PersistentProperty, PostgresDialect, SqlValue, SqliteDialect, StatementGenerator,
};

fn names(properties: &[PersistentProperty]) -> Vec<&'static str> {
    properties.iter().map(|p| p.name).collect()
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_identifier_value_source() {
    let registry = registry();
    assert_eq!(
        registry.generator::<User>().unwrap().id_value_source(),
        IdValueSource::Generated
    );
    assert_eq!(
        registry.generator::<Role>().unwrap().id_value_source(),
        IdValueSource::Provided
    );

    let links = registry.generator::<UserRole>().unwrap();
    assert_eq!(links.id_value_source(), IdValueSource::Provided);
    assert!(!links.entity().has_id_property());
    assert!(registry.generator::<Role>().unwrap().entity().has_id_property());
}

#[test]
fn test_projections() {
    let users = registry().generator::<User>().unwrap();
    assert_eq!(
        names(users.insert_properties()),
        ["id", "name", "email", "active", "created_by"]
    );
    assert_eq!(names(users.update_properties()), ["id", "name", "email", "active"]);
    assert_eq!(users.select_columns().len(), 6);
    assert_eq!(
        users.insert_prefix(),
        "INSERT INTO \"t_user\" (\"id\", \"user_name\", \"email\", \"active\", \"created_by\") VALUES "
    );
}

// =============================================================================
// Inserts
// =============================================================================

#[test]
fn test_insert_selective_skips_nulls() {
    let users = registry().generator::<User>().unwrap();
    let mut alice = user("alice", "alice@example.com");
    alice.version = Some(9);

    let insert = users.insert_selective(&mut alice).unwrap();
    assert_eq!(
        insert.sql,
        "INSERT INTO \"t_user\" (\"user_name\", \"email\") VALUES (?1, ?2)"
    );
    assert_eq!(insert.args, vec![text("alice"), text("alice@example.com")]);
}

#[test]
fn test_insert_selective_keeps_declaration_order() {
    let users = registry().generator::<User>().unwrap();
    let mut row = User {
        id: Some(3),
        active: Some(false),
        created_by: Some(String::from("admin")),
        ..User::default()
    };
    let insert = users.insert_selective(&mut row).unwrap();
    assert_eq!(
        insert.sql,
        "INSERT INTO \"t_user\" (\"id\", \"active\", \"created_by\") VALUES (?1, ?2, ?3)"
    );
    assert_eq!(
        insert.args,
        vec![SqlValue::Int(3), SqlValue::Bool(false), text("admin")]
    );
}

#[test]
fn test_insert_selective_all_null() {
    let users = registry().generator::<User>().unwrap();
    let mut empty = User::default();
    assert!(matches!(
        users.insert_selective(&mut empty),
        Err(MapperError::EmptyInsert { table: "t_user" })
    ));
}

#[test]
fn test_insert_selective_accessor_writes_back() {
    let users = registry().generator::<User>().unwrap();
    let id = users.id_property().unwrap().clone();
    let mut alice = user("alice", "alice@example.com");
    {
        let mut insert = users.insert_selective(&mut alice).unwrap();
        insert.accessor.set_property(&id, SqlValue::Int(42)).unwrap();
    }
    assert_eq!(alice.id, Some(42));
}

#[test]
fn test_insert_list_is_column_major() {
    let users = registry().generator::<User>().unwrap();
    let mut rows = vec![user("a", "a@x"), User::default()];
    rows[1].active = Some(true);

    let batch = users.insert_list(&mut rows).unwrap();
    assert_eq!(
        batch.sql,
        "INSERT INTO \"t_user\" (\"id\", \"user_name\", \"email\", \"active\", \"created_by\") \
         VALUES (?1, ?3, ?5, ?7, ?9), (?2, ?4, ?6, ?8, ?10)"
    );
    assert_eq!(
        batch.args,
        vec![
            SqlValue::Null,
            SqlValue::Null,
            text("a"),
            SqlValue::Null,
            text("a@x"),
            SqlValue::Null,
            SqlValue::Null,
            SqlValue::Bool(true),
            SqlValue::Null,
            SqlValue::Null,
        ]
    );
    assert_eq!(batch.accessors.len(), 2);
}

#[test]
fn test_insert_list_accessors_follow_input_order() {
    let users = registry().generator::<User>().unwrap();
    let id = users.id_property().unwrap().clone();
    // Equal instances are still distinct rows.
    let mut rows = vec![User::default(), User::default(), User::default()];
    {
        let mut batch = users.insert_list(&mut rows).unwrap();
        for (n, accessor) in (10..).zip(batch.accessors.iter_mut()) {
            accessor.set_property(&id, SqlValue::Int(n)).unwrap();
        }
    }
    let ids: Vec<Option<i64>> = rows.iter().map(|u| u.id).collect();
    assert_eq!(ids, [Some(10), Some(11), Some(12)]);
}

#[test]
fn test_insert_list_postgres_markers() {
    let registry = GeneratorRegistry::builder(context())
        .dialect(PostgresDialect::new())
        .build();
    let roles = registry.generator::<Role>().unwrap();
    let mut rows = vec![Role::default(); 3];
    let batch = roles.insert_list(&mut rows).unwrap();
    assert_eq!(
        batch.sql,
        "INSERT INTO \"t_role\" (\"label\") VALUES ($1), ($2), ($3)"
    );
    assert_eq!(batch.args.len(), 3);
}

#[test]
fn test_insert_list_empty() {
    let users = registry().generator::<User>().unwrap();
    let mut rows: Vec<User> = Vec::new();
    assert!(matches!(
        users.insert_list(&mut rows),
        Err(MapperError::EmptyBatch { table: "t_user" })
    ));
}

// =============================================================================
// Deletes
// =============================================================================

#[test]
fn test_delete_all_without_criteria() {
    let users = registry().generator::<User>().unwrap();
    for criteria in [None, Some(&Criteria::empty())] {
        let delete = users.delete_all(criteria).unwrap();
        assert_eq!(delete.sql, "DELETE FROM \"t_user\"");
        assert!(delete.params.is_empty());
    }
}

#[test]
fn test_delete_all_with_criteria() {
    let users = registry().generator::<User>().unwrap();
    let criteria = Criteria::eq("name", "bob").and(Criteria::is_not_null("email"));
    let delete = users.delete_all(Some(&criteria)).unwrap();
    assert_eq!(
        delete.sql,
        "DELETE FROM \"t_user\" WHERE (\"t_user\".\"user_name\" = :user_name) \
         AND (\"t_user\".\"email\" IS NOT NULL)"
    );
    assert_eq!(delete.sql.matches(" WHERE ").count(), 1);
    assert_eq!(delete.params.value("user_name"), Some(&text("bob")));
}

#[test]
fn test_delete_all_unknown_property() {
    let users = registry().generator::<User>().unwrap();
    assert!(matches!(
        users.delete_all(Some(&Criteria::eq("scratch", "x"))),
        Err(MapperError::UnknownProperty { .. })
    ));
}

// =============================================================================
// Updates
// =============================================================================

#[test]
fn test_update_by_id_selective() {
    let users = registry().generator::<User>().unwrap();
    let bob = User {
        id: Some(5),
        name: Some(String::from("bob")),
        created_by: Some(String::from("ignored")),
        version: Some(2),
        ..User::default()
    };
    let update = users.update_by_id_selective(&bob).unwrap();
    assert_eq!(
        update.sql,
        "UPDATE \"t_user\" SET \"id\" = :setid, \"user_name\" = :setname \
         WHERE \"t_user\".\"id\" = :id"
    );
    assert_eq!(update.params.value("setname"), Some(&text("bob")));
    assert_eq!(update.params.value("id"), Some(&SqlValue::Int(5)));
    assert_eq!(update.params.len(), 3);
}

#[test]
fn test_update_by_id_selective_errors() {
    let registry = registry();

    let users = registry.generator::<User>().unwrap();
    assert!(matches!(
        users.update_by_id_selective(&user("a", "b")),
        Err(MapperError::MissingIdentifier { .. })
    ));

    let roles = registry.generator::<Role>().unwrap();
    let admin = Role {
        code: Some(String::from("admin")),
        label: None,
    };
    assert!(matches!(
        roles.update_by_id_selective(&admin),
        Err(MapperError::EmptyUpdate { table: "t_role" })
    ));

    let links = registry.generator::<UserRole>().unwrap();
    assert!(matches!(
        links.update_by_id_selective(&UserRole::default()),
        Err(MapperError::NoIdentifierProperty { .. })
    ));
}

#[test]
fn test_update_by_id_selective_natural_key() {
    let roles = registry().generator::<Role>().unwrap();
    let admin = Role {
        code: Some(String::from("admin")),
        label: Some(String::from("Administrator")),
    };
    let update = roles.update_by_id_selective(&admin).unwrap();
    assert_eq!(
        update.sql,
        "UPDATE \"t_role\" SET \"label\" = :setlabel WHERE \"t_role\".\"code\" = :code"
    );
}

#[test]
fn test_update_with_criteria() {
    let users = registry().generator::<User>().unwrap();
    let patch = User {
        active: Some(false),
        ..User::default()
    };
    let update = users
        .update(&patch, &Criteria::lt("id", 100).and(Criteria::gte("id", 10)))
        .unwrap();
    assert_eq!(
        update.sql,
        "UPDATE \"t_user\" SET \"active\" = :setactive \
         WHERE (\"t_user\".\"id\" < :id) AND (\"t_user\".\"id\" >= :id1)"
    );
    assert_eq!(update.params.value("id1"), Some(&SqlValue::Int(10)));
}

#[test]
fn test_update_requires_criteria() {
    let users = registry().generator::<User>().unwrap();
    assert!(matches!(
        users.update(&user("a", "b"), &Criteria::empty()),
        Err(MapperError::MissingCriteria { table: "t_user" })
    ));
}

#[test]
fn test_update_named_to_positional() {
    let registry = GeneratorRegistry::builder(context())
        .dialect(SqliteDialect::new())
        .build();
    let users = registry.generator::<User>().unwrap();
    let update = users
        .update(&user("n", "e"), &Criteria::eq("email", "old"))
        .unwrap();
    let (sql, args) = update.to_positional(registry.dialect()).unwrap();
    assert_eq!(
        sql,
        "UPDATE \"t_user\" SET \"user_name\" = ?1, \"email\" = ?2 WHERE \"t_user\".\"email\" = ?3"
    );
    assert_eq!(args, vec![text("n"), text("e"), text("old")]);
}

// =============================================================================
// Column names that are not plain identifiers
// =============================================================================

fn sqlite_items() -> (GeneratorRegistry, StatementGenerator<Item>) {
    let registry = GeneratorRegistry::builder(context())
        .dialect(SqliteDialect::new())
        .build();
    let items = registry.generator::<Item>().unwrap();
    (registry, items)
}

#[test]
fn test_delete_by_spaced_and_non_ascii_columns() {
    let (registry, items) = sqlite_items();
    let delete = items
        .delete_all(Some(&Criteria::eq("first_name", "bob").and(Criteria::gt("size", 3))))
        .unwrap();
    assert_eq!(
        delete.sql,
        "DELETE FROM \"t_item\" WHERE (\"t_item\".\"first name\" = :first_name) \
         AND (\"t_item\".\"größe\" > :gr__e)"
    );
    let (sql, args) = delete.to_positional(registry.dialect()).unwrap();
    assert_eq!(
        sql,
        "DELETE FROM \"t_item\" WHERE (\"t_item\".\"first name\" = ?1) \
         AND (\"t_item\".\"größe\" > ?2)"
    );
    assert_eq!(args, vec![text("bob"), SqlValue::Int(3)]);
}

#[test]
fn test_update_raw_field_name() {
    let (registry, items) = sqlite_items();
    let item = Item {
        id: Some(1),
        r#type: Some(String::from("x")),
        ..Item::default()
    };
    let update = items.update_by_id_selective(&item).unwrap();
    assert_eq!(
        update.sql,
        "UPDATE \"t_item\" SET \"id\" = :setid, \"type\" = :settype \
         WHERE \"t_item\".\"id\" = :id"
    );
    let (sql, args) = update.to_positional(registry.dialect()).unwrap();
    assert_eq!(
        sql,
        "UPDATE \"t_item\" SET \"id\" = ?1, \"type\" = ?2 WHERE \"t_item\".\"id\" = ?3"
    );
    assert_eq!(args, vec![SqlValue::Int(1), text("x"), SqlValue::Int(1)]);
}

#[test]
fn test_update_and_select_by_spaced_column() {
    let (registry, items) = sqlite_items();
    let patch = Item {
        first_name: Some(String::from("alice")),
        ..Item::default()
    };
    let update = items
        .update(&patch, &Criteria::eq("first_name", "bob"))
        .unwrap();
    let (sql, args) = update.to_positional(registry.dialect()).unwrap();
    assert_eq!(
        sql,
        "UPDATE \"t_item\" SET \"first name\" = ?1 WHERE \"t_item\".\"first name\" = ?2"
    );
    assert_eq!(args, vec![text("alice"), text("bob")]);

    let select = items.select(Some(&Criteria::eq("size", 7))).unwrap();
    let (sql, args) = select.to_positional(registry.dialect()).unwrap();
    assert!(sql.ends_with("WHERE \"t_item\".\"größe\" = ?1"));
    assert_eq!(args, vec![SqlValue::Int(7)]);

    let by_id = items.select_by_id(4_i64).unwrap();
    let (_, args) = by_id.to_positional(registry.dialect()).unwrap();
    assert_eq!(args, vec![SqlValue::Int(4)]);
}

// =============================================================================
// Selects and row mapping
// =============================================================================

#[test]
fn test_select() {
    let users = registry().generator::<User>().unwrap();
    assert_eq!(
        users.select(None).unwrap().sql,
        "SELECT \"t_user\".\"id\", \"t_user\".\"user_name\", \"t_user\".\"email\", \
         \"t_user\".\"active\", \"t_user\".\"created_by\", \"t_user\".\"version\" FROM \"t_user\""
    );

    let by_id = users.select_by_id(7_i64).unwrap();
    assert!(by_id.sql.ends_with(" FROM \"t_user\" WHERE \"t_user\".\"id\" = :id"));
    assert_eq!(by_id.params.value("id"), Some(&SqlValue::Int(7)));

    assert!(matches!(
        users.select_by_id(None::<i64>),
        Err(MapperError::MissingIdentifier { .. })
    ));
}

#[test]
fn test_map_row_with_converters() {
    let registry = GeneratorRegistry::builder(context())
        .dialect_kind("sqlite".parse::<DialectKind>().unwrap())
        .customizer(ConvertingCustomizer::sqlite())
        .build();
    let users = registry.generator::<User>().unwrap();

    let row: HashMap<String, SqlValue> = [
        ("id", SqlValue::Int(1)),
        ("user_name", text("alice")),
        ("active", SqlValue::Int(1)),
        ("version", SqlValue::Null),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let alice = users.map_row(&row).unwrap();
    assert_eq!(alice.id, Some(1));
    assert_eq!(alice.name.as_deref(), Some("alice"));
    assert_eq!(alice.active, Some(true));
    assert_eq!(alice.email, None);
    assert_eq!(alice.version, None);
}

#[test]
fn test_map_row_type_mismatch_without_converters() {
    let users = registry().generator::<User>().unwrap();
    let row: HashMap<String, SqlValue> =
        HashMap::from([(String::from("active"), SqlValue::Int(1))]);
    assert!(matches!(
        users.map_row(&row),
        Err(MapperError::TypeMismatch { .. })
    ));
}

#[test]
fn test_array_support_is_a_dialect_capability() {
    let row: HashMap<String, SqlValue> = HashMap::from([(
        String::from("tags"),
        SqlValue::Array(vec![text("a"), text("b")]),
    )]);

    let generic = registry().generator::<Tagged>().unwrap();
    assert!(matches!(
        generic.map_row(&row),
        Err(MapperError::UnsupportedArray {
            dialect: "generic",
            property: "tags"
        })
    ));

    let postgres = GeneratorRegistry::builder(context())
        .dialect(PostgresDialect::new())
        .build()
        .generator::<Tagged>()
        .unwrap();
    let tagged = postgres.map_row(&row).unwrap();
    assert_eq!(
        tagged.tags,
        Some(SqlValue::Array(vec![text("a"), text("b")]))
    );
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_customizers_apply_in_registration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let registry = GeneratorRegistry::builder(context())
        .customizer(Suffix {
            suffix: "-a",
            log: Arc::clone(&log),
        })
        .customizer(Suffix {
            suffix: "-b",
            log: Arc::clone(&log),
        })
        .build();
    let roles = registry.generator::<Role>().unwrap();

    let row: HashMap<String, SqlValue> = HashMap::from([(String::from("label"), text("x"))]);
    let role = roles.map_row(&row).unwrap();

    assert_eq!(*log.lock().unwrap(), ["-a", "-b"]);
    // The last customizer wraps outermost, so it sees written values first.
    assert_eq!(role.label.as_deref(), Some("x-b-a"));
}

#[test]
fn test_unquoted_identifiers() {
    let registry = GeneratorRegistry::builder(context()).force_quote(false).build();
    let links = registry.generator::<UserRole>().unwrap();
    assert_eq!(links.delete_all(None).unwrap().sql, "DELETE FROM user_role");
}

#[test]
fn test_unknown_dialect_name() {
    assert!(matches!(
        "oracle".parse::<DialectKind>(),
        Err(MapperError::UnknownDialect(name)) if name == "oracle"
    ));
}
