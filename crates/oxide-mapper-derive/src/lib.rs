//! Derive macro for mapped entities.
//!
//! This crate provides the `#[derive(Entity)]` macro, which implements
//! `oxide_mapper_core::Entity` for a struct with named fields.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Expr, Fields, Ident, Lit, Meta, Type};

/// Derives `oxide_mapper_core::Entity` for a struct.
///
/// # Attributes
///
/// - `#[table(name = "table_name")]` - Specifies the SQL table name (optional,
///   defaults to snake_case of struct name)
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - Marks the field as the identifier (at most one)
/// - `#[column(name = "column_name")]` - Specifies the SQL column name
///   (optional, defaults to field name)
/// - `#[column(read_only)]` - Never written by inserts or updates
/// - `#[column(insert_only)]` - Written by inserts, never by updates
/// - `#[column(transient)]` - Not mapped at all
///
/// Every mapped field type must implement `ToSqlValue`, `FromSqlValue` and
/// `Clone`.
///
/// # Generated Items
///
/// - `Entity::metadata` listing the mapped fields in declaration order
/// - `Entity::read_property` / `Entity::write_property` matching on the
///   field name
#[proc_macro_derive(Entity, attributes(table, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_entity_impl(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_name = get_table_name(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Entity derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Entity derive only supports structs",
            ));
        }
    };

    let mut properties: Vec<PropertyInfo> = Vec::new();
    let mut primary_key: Option<Ident> = None;
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.transient {
            continue;
        }
        if attrs.primary_key {
            if let Some(existing) = &primary_key {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("`{existing}` is already the primary key; composite keys are not supported"),
                ));
            }
            primary_key = Some(field_name.clone());
        }
        // `r#type` maps to the property and column `type`.
        let property_name = field_name.unraw().to_string();
        properties.push(PropertyInfo {
            column_name: attrs.name.unwrap_or_else(|| property_name.clone()),
            property_name,
            field_name,
            field_type: field.ty.clone(),
            primary_key: attrs.primary_key,
            read_only: attrs.read_only,
            insert_only: attrs.insert_only,
        });
    }

    let metadata_entries: Vec<TokenStream2> = properties
        .iter()
        .map(|info| {
            let name = &info.property_name;
            let column = &info.column_name;
            let field_type = &info.field_type;
            let mut entry = quote! {
                ::oxide_mapper_core::PersistentProperty::new(
                    #name,
                    #column,
                    <#field_type as ::oxide_mapper_core::FromSqlValue>::KIND,
                )
            };
            if info.primary_key {
                entry = quote! { #entry.identifier() };
            }
            if info.read_only {
                entry = quote! { #entry.read_only() };
            }
            if info.insert_only {
                entry = quote! { #entry.insert_only() };
            }
            entry
        })
        .collect();

    let read_arms: Vec<TokenStream2> = properties
        .iter()
        .map(|info| {
            let field = &info.field_name;
            let name = &info.property_name;
            quote! {
                #name => ::core::option::Option::Some(
                    ::oxide_mapper_core::ToSqlValue::to_sql_value(
                        ::core::clone::Clone::clone(&self.#field),
                    ),
                ),
            }
        })
        .collect();

    let write_arms: Vec<TokenStream2> = properties
        .iter()
        .map(|info| {
            let field = &info.field_name;
            let field_type = &info.field_type;
            let name = &info.property_name;
            quote! {
                #name => {
                    self.#field =
                        <#field_type as ::oxide_mapper_core::FromSqlValue>::from_sql_value(value)?;
                    ::core::result::Result::Ok(())
                }
            }
        })
        .collect();

    let type_name = struct_name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics ::oxide_mapper_core::Entity for #struct_name #ty_generics #where_clause {
            fn metadata() -> ::oxide_mapper_core::EntityMetadata {
                ::oxide_mapper_core::EntityMetadata::new(
                    #type_name,
                    #table_name,
                    ::std::vec![#(#metadata_entries),*],
                )
            }

            fn read_property(
                &self,
                property: &str,
            ) -> ::core::option::Option<::oxide_mapper_core::SqlValue> {
                match property {
                    #(#read_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn write_property(
                &mut self,
                property: &str,
                value: ::oxide_mapper_core::SqlValue,
            ) -> ::oxide_mapper_core::Result<()> {
                match property {
                    #(#write_arms)*
                    _ => ::core::result::Result::Err(
                        ::oxide_mapper_core::MapperError::UnknownProperty {
                            entity: #type_name,
                            property: ::std::string::String::from(property),
                        },
                    ),
                }
            }
        }
    };

    Ok(expanded)
}

struct PropertyInfo {
    field_name: Ident,
    field_type: Type,
    property_name: String,
    column_name: String,
    primary_key: bool,
    read_only: bool,
    insert_only: bool,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    primary_key: bool,
    read_only: bool,
    insert_only: bool,
    transient: bool,
}

fn get_table_name(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<String> {
    for attr in attrs {
        if attr.path().is_ident("table") {
            let mut table_name = None;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    table_name = Some(parse_str_value(&meta)?);
                    Ok(())
                } else {
                    Err(meta.error("unsupported table attribute"))
                }
            })?;
            if let Some(name) = table_name {
                return Ok(name);
            }
        }
    }
    // Default to snake_case of struct name
    Ok(to_snake_case(&struct_name.unraw().to_string()))
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();

    for attr in attrs {
        if attr.path().is_ident("column") {
            // Handle empty attribute like #[column]
            if matches!(attr.meta, Meta::Path(_)) {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("primary_key") {
                    result.primary_key = true;
                } else if meta.path.is_ident("read_only") {
                    result.read_only = true;
                } else if meta.path.is_ident("insert_only") {
                    result.insert_only = true;
                } else if meta.path.is_ident("transient") {
                    result.transient = true;
                } else if meta.path.is_ident("name") {
                    result.name = Some(parse_str_value(&meta)?);
                } else {
                    return Err(meta.error("unsupported column attribute"));
                }
                Ok(())
            })?;
        }
    }

    Ok(result)
}

fn parse_str_value(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<String> {
    let value: Expr = meta.value()?.parse()?;
    if let Expr::Lit(lit) = &value {
        if let Lit::Str(s) = &lit.lit {
            return Ok(s.value());
        }
    }
    Err(syn::Error::new_spanned(value, "expected a string literal"))
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("User"), "user");
        assert_eq!(to_snake_case("UserRole"), "user_role");
    }

    #[test]
    fn test_rejects_second_primary_key() {
        let input: DeriveInput = syn::parse_quote! {
            struct Link {
                #[column(primary_key)]
                a: Option<i64>,
                #[column(primary_key)]
                b: Option<i64>,
            }
        };
        let err = derive_entity_impl(input).unwrap_err();
        assert!(err.to_string().contains("already the primary key"));
    }

    #[test]
    fn test_rejects_unknown_column_attribute() {
        let input: DeriveInput = syn::parse_quote! {
            struct Link {
                #[column(unique)]
                a: Option<i64>,
            }
        };
        assert!(derive_entity_impl(input).is_err());
    }

    #[test]
    fn test_transient_fields_are_skipped() {
        let input: DeriveInput = syn::parse_quote! {
            #[table(name = "t_link")]
            struct Link {
                #[column(primary_key)]
                id: Option<i64>,
                #[column(transient)]
                cache: Vec<u8>,
            }
        };
        let tokens = derive_entity_impl(input).unwrap().to_string();
        assert!(tokens.contains("\"t_link\""));
        assert!(!tokens.contains("cache"));
    }

    #[test]
    fn test_raw_identifiers_are_unescaped() {
        let input: DeriveInput = syn::parse_quote! {
            struct Item {
                #[column(primary_key)]
                id: Option<i64>,
                r#type: Option<String>,
            }
        };
        let tokens = derive_entity_impl(input).unwrap().to_string();
        assert!(tokens.contains("\"type\""));
        assert!(!tokens.contains("\"r#type\""));
        assert!(tokens.contains("self . r#type"));
    }
}
