//! # Field Naming Strategies
//!
//! Derive a column name from a property when no explicit column is given.
//!
//! ```text
//! property          PropertyName     SnakeCase       CamelCaseSplitting("-")
//! ───────────────   ──────────────   ─────────────   ───────────────────────
//! userName          userName         user_name       user-name
//! createdAt         createdAt        created_at      created-at
//! id                id               id              id
//! ```

use std::fmt;

use heck::ToSnakeCase;

use super::descriptor::PropertyDescriptor;

/// Maps a property to its column name.
pub trait FieldNamingStrategy: Send + Sync + fmt::Debug {
    fn field_name(&self, property: &PropertyDescriptor) -> String;
}

/// Uses the property name as the column name.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyNameFieldNamingStrategy;

impl FieldNamingStrategy for PropertyNameFieldNamingStrategy {
    fn field_name(&self, property: &PropertyDescriptor) -> String {
        property.name.to_string()
    }
}

/// Splits camel case into lower-case words joined by `_`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseFieldNamingStrategy;

impl FieldNamingStrategy for SnakeCaseFieldNamingStrategy {
    fn field_name(&self, property: &PropertyDescriptor) -> String {
        property.name.to_snake_case()
    }
}

/// Splits camel case into lower-case words joined by a custom delimiter.
#[derive(Debug, Clone)]
pub struct CamelCaseSplittingFieldNamingStrategy {
    delimiter: String,
}

impl CamelCaseSplittingFieldNamingStrategy {
    pub fn new(delimiter: impl Into<String>) -> Self {
        CamelCaseSplittingFieldNamingStrategy {
            delimiter: delimiter.into(),
        }
    }
}

impl FieldNamingStrategy for CamelCaseSplittingFieldNamingStrategy {
    fn field_name(&self, property: &PropertyDescriptor) -> String {
        property
            .name
            .to_snake_case()
            .split('_')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(&self.delimiter)
    }
}

pub static PROPERTY_NAME: PropertyNameFieldNamingStrategy = PropertyNameFieldNamingStrategy;
pub static SNAKE_CASE: SnakeCaseFieldNamingStrategy = SnakeCaseFieldNamingStrategy;
