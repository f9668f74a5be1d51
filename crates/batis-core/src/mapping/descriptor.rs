//! # Entity Descriptors
//!
//! Static, declarative tables describing how a Rust type maps to a table.
//! Descriptors are the only input the metamodel builder consumes; nothing
//! is discovered at runtime.
//!
//! ## Declaring an Entity
//! ```rust
//! use batis_core::mapping::{EntityDescriptor, NamedQueryDescriptor, PropertyDescriptor};
//!
//! static USER: EntityDescriptor = EntityDescriptor::new(&[
//!     PropertyDescriptor::id("id", "i64"),
//!     PropertyDescriptor::new("userName", "String"),
//!     PropertyDescriptor::new("createdAt", "DateTime<Utc>").column("created_on"),
//! ])
//! .table("t_user")
//! .named_query(NamedQueryDescriptor::new("findActive", "SELECT * FROM t_user WHERE active"));
//!
//! assert_eq!(USER.properties.len(), 3);
//! ```

/// One mapped attribute of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyDescriptor {
    /// Property name as it appears in the serialized entity.
    pub name: &'static str,
    /// Declared type, for diagnostics.
    pub type_name: &'static str,
    /// Whether this property is the primary key.
    pub id: bool,
    /// Explicit column name; bypasses the naming strategy.
    pub column: Option<&'static str>,
}

impl PropertyDescriptor {
    pub const fn new(name: &'static str, type_name: &'static str) -> Self {
        PropertyDescriptor {
            name,
            type_name,
            id: false,
            column: None,
        }
    }

    /// Declares the identity property.
    pub const fn id(name: &'static str, type_name: &'static str) -> Self {
        PropertyDescriptor {
            name,
            type_name,
            id: true,
            column: None,
        }
    }

    pub const fn column(self, column: &'static str) -> Self {
        PropertyDescriptor {
            column: Some(column),
            ..self
        }
    }
}

/// A named query declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedQueryDescriptor {
    pub name: &'static str,
    pub query: &'static str,
}

impl NamedQueryDescriptor {
    pub const fn new(name: &'static str, query: &'static str) -> Self {
        NamedQueryDescriptor { name, query }
    }
}

/// Static description of one mapped type.
///
/// Named queries come in four slots mirroring the usual declaration forms.
/// They are harvested in this fixed order, later entries overwriting
/// earlier ones with the same name:
///
/// 1. `named_query`
/// 2. `named_queries`
/// 3. `named_native_query`
/// 4. `named_native_queries`
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    /// Explicit table name; defaults to the snake-cased type name.
    pub table: Option<&'static str>,
    /// Persistent properties in column order.
    pub properties: &'static [PropertyDescriptor],
    pub named_query: Option<NamedQueryDescriptor>,
    pub named_queries: &'static [NamedQueryDescriptor],
    pub named_native_query: Option<NamedQueryDescriptor>,
    pub named_native_queries: &'static [NamedQueryDescriptor],
}

impl EntityDescriptor {
    pub const fn new(properties: &'static [PropertyDescriptor]) -> Self {
        EntityDescriptor {
            table: None,
            properties,
            named_query: None,
            named_queries: &[],
            named_native_query: None,
            named_native_queries: &[],
        }
    }

    pub const fn table(self, table: &'static str) -> Self {
        EntityDescriptor {
            table: Some(table),
            ..self
        }
    }

    pub const fn named_query(self, query: NamedQueryDescriptor) -> Self {
        EntityDescriptor {
            named_query: Some(query),
            ..self
        }
    }

    pub const fn named_queries(self, queries: &'static [NamedQueryDescriptor]) -> Self {
        EntityDescriptor {
            named_queries: queries,
            ..self
        }
    }

    pub const fn named_native_query(self, query: NamedQueryDescriptor) -> Self {
        EntityDescriptor {
            named_native_query: Some(query),
            ..self
        }
    }

    pub const fn named_native_queries(self, queries: &'static [NamedQueryDescriptor]) -> Self {
        EntityDescriptor {
            named_native_queries: queries,
            ..self
        }
    }

    /// Named queries in harvest order.
    pub fn named_query_declarations(&self) -> impl Iterator<Item = &NamedQueryDescriptor> {
        self.named_query
            .iter()
            .chain(self.named_queries.iter())
            .chain(self.named_native_query.iter())
            .chain(self.named_native_queries.iter())
    }
}
