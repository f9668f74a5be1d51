//! # Mapping Context
//!
//! Process-wide owner of the entity metamodel cache, the named-query map and
//! the resolved dialect of one execution environment.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  MappingContext::builder(configuration)                                 │
//! │       │  .field_naming_strategy(..)   optional override                │
//! │       │  .dialect(..)                 optional override                │
//! │       │  .providers(..)               resolver chain                   │
//! │       ▼                                                                 │
//! │  build().await ── resolve dialect once ── NoDialect aborts             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  persistent_entity::<User>()                                            │
//! │       │                                                                 │
//! │       ├── cached? ───────────────► Arc<PersistentEntity>                │
//! │       │                                                                 │
//! │       └── build, insert-if-absent, publish named queries                │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Naming Strategy Selection
//! 1. Explicit override from the builder
//! 2. Snake case when the engine maps underscores to camel case
//! 3. Property name as column name

use std::any::TypeId;
use std::fmt;
use std::sync::Arc;

use batis_core::dialect::Dialect;
use batis_core::mapping::{
    Entity, FieldNamingStrategy, PersistentEntity, PropertyNameFieldNamingStrategy,
    SnakeCaseFieldNamingStrategy,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{debug, info};

use crate::dialect_resolver::{DialectProvider, DialectResolver};
use crate::error::DbResult;
use crate::session::EngineConfiguration;

// =============================================================================
// Builder
// =============================================================================

/// Configures and constructs a [`MappingContext`].
pub struct MappingContextBuilder {
    configuration: EngineConfiguration,
    field_naming_strategy: Option<Arc<dyn FieldNamingStrategy>>,
    dialect: Option<&'static dyn Dialect>,
    resolver: DialectResolver,
    quote_identifiers: bool,
}

impl MappingContextBuilder {
    /// Overrides the naming strategy for every property.
    pub fn field_naming_strategy(mut self, strategy: Arc<dyn FieldNamingStrategy>) -> Self {
        self.field_naming_strategy = Some(strategy);
        self
    }

    /// Skips probing and uses `dialect` directly.
    pub fn dialect(mut self, dialect: &'static dyn Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Replaces the provider chain used when no dialect override is set.
    pub fn providers(mut self, providers: Vec<Box<dyn DialectProvider>>) -> Self {
        self.resolver = DialectResolver::new(providers);
        self
    }

    /// Quote table and column names in generated statements.
    pub fn quote_identifiers(mut self, quote: bool) -> Self {
        self.quote_identifiers = quote;
        self
    }

    /// Resolves the dialect and creates the context.
    ///
    /// ## Errors
    /// [`DbError::NoDialect`](crate::DbError::NoDialect) when no override is
    /// set and no provider recognises the database.
    pub async fn build(self) -> DbResult<MappingContext> {
        let dialect = match self.dialect {
            Some(dialect) => dialect,
            None => self.resolver.resolve(&self.configuration).await?,
        };

        let field_naming_strategy = match self.field_naming_strategy {
            Some(strategy) => strategy,
            None if self.configuration.is_map_underscore_to_camel_case() => {
                Arc::new(SnakeCaseFieldNamingStrategy)
            }
            None => Arc::new(PropertyNameFieldNamingStrategy),
        };

        info!(
            environment = %self.configuration.environment().id(),
            dialect = dialect.name(),
            naming = ?field_naming_strategy,
            "Mapping context ready"
        );

        Ok(MappingContext {
            configuration: self.configuration,
            dialect,
            field_naming_strategy,
            quote_identifiers: self.quote_identifiers,
            entities: DashMap::new(),
            named_queries: DashMap::new(),
        })
    }
}

// =============================================================================
// Context
// =============================================================================

/// Metamodel cache and dialect of one execution environment.
///
/// Shared by every repository of the environment, typically as
/// `Arc<MappingContext>`.
pub struct MappingContext {
    configuration: EngineConfiguration,
    dialect: &'static dyn Dialect,
    field_naming_strategy: Arc<dyn FieldNamingStrategy>,
    quote_identifiers: bool,
    entities: DashMap<TypeId, Arc<PersistentEntity>>,
    named_queries: DashMap<String, String>,
}

impl MappingContext {
    pub fn builder(configuration: EngineConfiguration) -> MappingContextBuilder {
        MappingContextBuilder {
            configuration,
            field_naming_strategy: None,
            dialect: None,
            resolver: DialectResolver::default(),
            quote_identifiers: false,
        }
    }

    pub fn configuration(&self) -> &EngineConfiguration {
        &self.configuration
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.dialect
    }

    pub fn field_naming_strategy(&self) -> &dyn FieldNamingStrategy {
        self.field_naming_strategy.as_ref()
    }

    pub fn quote_identifiers(&self) -> bool {
        self.quote_identifiers
    }

    /// Returns the metamodel of `T`, building it on first access.
    ///
    /// Concurrent first accesses may each build a candidate; only the first
    /// one inserted is kept and every caller receives that value.
    pub fn persistent_entity<T: Entity>(&self) -> DbResult<Arc<PersistentEntity>> {
        let type_id = TypeId::of::<T>();
        if let Some(cached) = self.entities.get(&type_id) {
            return Ok(Arc::clone(cached.value()));
        }

        let built = PersistentEntity::build::<T>(self.field_naming_strategy.as_ref())?;

        let entity = match self.entities.entry(type_id) {
            Entry::Occupied(occupied) => Arc::clone(occupied.get()),
            Entry::Vacant(vacant) => {
                let entity = Arc::new(built);
                for (name, query) in entity.named_queries() {
                    self.named_queries.insert(name.clone(), query.clone());
                }
                debug!(
                    entity = entity.type_name(),
                    table = entity.table(),
                    properties = entity.properties().len(),
                    "Built persistent entity"
                );
                vacant.insert(Arc::clone(&entity));
                entity
            }
        };
        Ok(entity)
    }

    /// Looks up a named query across every entity built so far.
    pub fn named_query(&self, name: &str) -> Option<String> {
        self.named_queries.get(name).map(|q| q.value().clone())
    }

    /// Number of cached metamodels.
    pub fn cached_entities(&self) -> usize {
        self.entities.len()
    }
}

impl fmt::Debug for MappingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingContext")
            .field("environment", &self.configuration.environment().id())
            .field("dialect", &self.dialect.name())
            .field("field_naming_strategy", &self.field_naming_strategy)
            .field("entities", &self.entities.len())
            .finish()
    }
}
