//! # Persistent Metamodel
//!
//! The resolved description of a mapped type: table, identity, columns and
//! named queries. Built once from an [`EntityDescriptor`] and a naming
//! strategy, immutable afterwards.
//!
//! ## Build Steps
//! ```text
//! EntityDescriptor ──► validate properties (unique names, exactly one id)
//!        │
//!        ▼
//! naming strategy ──► column per property (explicit column wins)
//!        │
//!        ▼
//! table name ──────► explicit, or snake-cased short type name
//!        │
//!        ▼
//! named queries ───► merged name → text map, last declaration wins
//! ```

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};

use heck::ToSnakeCase;

use super::descriptor::{EntityDescriptor, PropertyDescriptor};
use super::naming::FieldNamingStrategy;
use super::Entity;
use crate::error::{CoreError, CoreResult};

// =============================================================================
// Persistent Property
// =============================================================================

/// One mapped attribute with its resolved column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistentProperty {
    name: &'static str,
    type_name: &'static str,
    column: String,
    id: bool,
}

impl PersistentProperty {
    fn resolve(descriptor: &PropertyDescriptor, strategy: &dyn FieldNamingStrategy) -> Self {
        let column = match descriptor.column {
            Some(column) => column.to_string(),
            None => strategy.field_name(descriptor),
        };
        PersistentProperty {
            name: descriptor.name,
            type_name: descriptor.type_name,
            column,
            id: descriptor.id,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_id(&self) -> bool {
        self.id
    }
}

// =============================================================================
// Persistent Entity
// =============================================================================

/// Resolved metamodel of one mapped type.
#[derive(Debug, Clone)]
pub struct PersistentEntity {
    type_id: TypeId,
    type_name: &'static str,
    table: String,
    id_index: usize,
    properties: Vec<PersistentProperty>,
    named_queries: BTreeMap<String, String>,
}

impl PersistentEntity {
    /// Builds the metamodel of `T` from its descriptor.
    pub fn build<T: Entity>(strategy: &dyn FieldNamingStrategy) -> CoreResult<Self> {
        Self::from_descriptor(
            TypeId::of::<T>(),
            std::any::type_name::<T>(),
            T::descriptor(),
            strategy,
        )
    }

    /// Builds a metamodel from an explicit type identity and descriptor.
    pub fn from_descriptor(
        type_id: TypeId,
        type_name: &'static str,
        descriptor: &EntityDescriptor,
        strategy: &dyn FieldNamingStrategy,
    ) -> CoreResult<Self> {
        let mut seen = HashSet::new();
        for property in descriptor.properties {
            if !seen.insert(property.name) {
                return Err(CoreError::DuplicateProperty {
                    entity: type_name.to_string(),
                    property: property.name.to_string(),
                });
            }
        }

        let ids: Vec<usize> = descriptor
            .properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.id)
            .map(|(i, _)| i)
            .collect();
        let id_index = match ids.as_slice() {
            [single] => *single,
            [] => {
                return Err(CoreError::MissingIdentifier {
                    entity: type_name.to_string(),
                })
            }
            many => {
                return Err(CoreError::MultipleIdentifiers {
                    entity: type_name.to_string(),
                    properties: many
                        .iter()
                        .map(|&i| descriptor.properties[i].name.to_string())
                        .collect(),
                })
            }
        };

        let table = match descriptor.table {
            Some(table) => table.trim().to_string(),
            None => short_name(type_name).to_snake_case(),
        };
        if table.is_empty() {
            return Err(CoreError::InvalidTable {
                entity: type_name.to_string(),
            });
        }

        let properties = descriptor
            .properties
            .iter()
            .map(|p| PersistentProperty::resolve(p, strategy))
            .collect();

        let named_queries = descriptor
            .named_query_declarations()
            .map(|q| (q.name.to_string(), q.query.to_string()))
            .collect();

        Ok(PersistentEntity {
            type_id,
            type_name,
            table,
            id_index,
            properties,
            named_queries,
        })
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fully-qualified Rust type path; also the statement namespace.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Type name without module path or generic arguments.
    pub fn short_name(&self) -> &'static str {
        short_name(self.type_name)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn id_property(&self) -> &PersistentProperty {
        &self.properties[self.id_index]
    }

    /// All properties, identity included, in declaration order.
    pub fn properties(&self) -> &[PersistentProperty] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PersistentProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Resolves a property name to its column, if mapped.
    pub fn column_of(&self, name: &str) -> Option<&str> {
        self.property(name).map(PersistentProperty::column)
    }

    pub fn named_queries(&self) -> &BTreeMap<String, String> {
        &self.named_queries
    }

    pub fn named_query(&self, name: &str) -> Option<&str> {
        self.named_queries.get(name).map(String::as_str)
    }
}

fn short_name(type_name: &'static str) -> &'static str {
    let without_generics = type_name.split('<').next().unwrap_or(type_name);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}
