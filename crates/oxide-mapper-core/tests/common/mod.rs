#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_mapper_core::{
    GeneratorRegistry, MappingContext, PersistentProperty, PropertyAccessor,
    PropertyAccessorCustomizer, Result, SqlValue,
};
use oxide_mapper_derive::Entity;

/// Writable identifier, insert-only and read-only columns, one renamed
/// column and one transient field.
#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[table(name = "t_user")]
pub struct User {
    #[column(primary_key)]
    pub id: Option<i64>,
    #[column(name = "user_name")]
    pub name: Option<String>,
    pub email: Option<String>,
    pub active: Option<bool>,
    #[column(insert_only)]
    pub created_by: Option<String>,
    #[column(read_only)]
    pub version: Option<i64>,
    #[column(transient)]
    pub scratch: Option<String>,
}

/// Natural key the caller provides.
#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[table(name = "t_role")]
pub struct Role {
    #[column(primary_key, read_only)]
    pub code: Option<String>,
    pub label: Option<String>,
}

/// No identifier property at all.
#[derive(Debug, Default, Clone, PartialEq, Entity)]
pub struct UserRole {
    pub user_id: Option<i64>,
    pub role_code: Option<String>,
}

/// Carries a raw value column.
#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[table(name = "t_tagged")]
pub struct Tagged {
    #[column(primary_key)]
    pub id: Option<i64>,
    pub tags: Option<SqlValue>,
}

/// Column names that are not plain identifiers, and a raw field name.
#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[table(name = "t_item")]
pub struct Item {
    #[column(primary_key)]
    pub id: Option<i64>,
    #[column(name = "first name")]
    pub first_name: Option<String>,
    #[column(name = "größe")]
    pub size: Option<i64>,
    pub r#type: Option<String>,
}

pub fn context() -> MappingContext {
    MappingContext::new()
        .with::<User>()
        .with::<Role>()
        .with::<UserRole>()
        .with::<Tagged>()
        .with::<Item>()
}

pub fn registry() -> GeneratorRegistry {
    GeneratorRegistry::new(context())
}

pub fn user(name: &str, email: &str) -> User {
    User {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        ..User::default()
    }
}

pub fn text(s: &str) -> SqlValue {
    SqlValue::Text(s.to_string())
}

/// Appends a suffix to every text value written through it and records each
/// `customize` call in a shared log.
pub struct Suffix {
    pub suffix: &'static str,
    pub log: Arc<Mutex<Vec<&'static str>>>,
}

struct SuffixAccessor<'a> {
    inner: Box<dyn PropertyAccessor + 'a>,
    suffix: &'static str,
}

impl PropertyAccessor for SuffixAccessor<'_> {
    fn get_property(&self, property: &PersistentProperty) -> Result<SqlValue> {
        self.inner.get_property(property)
    }

    fn set_property(&mut self, property: &PersistentProperty, value: SqlValue) -> Result<()> {
        let value = match value {
            SqlValue::Text(s) => SqlValue::Text(format!("{s}{}", self.suffix)),
            other => other,
        };
        self.inner.set_property(property, value)
    }
}

impl PropertyAccessorCustomizer for Suffix {
    fn customize<'a>(
        &self,
        accessor: Box<dyn PropertyAccessor + 'a>,
    ) -> Box<dyn PropertyAccessor + 'a> {
        self.log.lock().unwrap().push(self.suffix);
        Box::new(SuffixAccessor {
            inner: accessor,
            suffix: self.suffix,
        })
    }
}
