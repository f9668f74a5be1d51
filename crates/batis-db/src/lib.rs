//! # batis-db: Engine-facing Layer for batis
//!
//! Everything that touches a live database or the external statement engine:
//! dialect probing, the mapping context, statement generation and the
//! generic repositories built on top of them.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           batis Data Flow                               │
//! │                                                                         │
//! │  Application (users.find_page(..))                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     batis-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ MappingContext│    │  Repositories │    │  Statements  │  │   │
//! │  │   │ (context.rs)  │    │ (repository/) │    │(statement.rs)│  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ Dialect       │◄───│ SimpleRepo    │───►│ _insert      │  │   │
//! │  │   │ Entity cache  │    │ Factory       │    │ _selectBy..  │  │   │
//! │  │   │ Named queries │    │ Support       │    │ ...          │  │   │
//! │  │   └───────┬───────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │           │ probe              │ dispatch                      │   │
//! │  └───────────┼────────────────────┼───────────────────────────────┘   │
//! │              ▼                    ▼                                     │
//! │  ┌──────────────────┐   ┌──────────────────────┐                       │
//! │  │ DataSource       │   │ StatementExecutor    │                       │
//! │  │ (SqlxDataSource) │   │ (external engine)    │                       │
//! │  └──────────────────┘   └──────────────────────┘                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`session`] - Engine boundary traits and configuration
//! - [`dialect_resolver`] - Provider chain that detects the dialect
//! - [`context`] - Mapping context with the metamodel cache
//! - [`statement`] - Generated CRUD and paging statements
//! - [`repository`] - Repository factory and generic repository
//! - [`pool`] - sqlx-backed data source
//! - [`config`] - TOML + environment configuration
//! - [`error`] - Error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use batis_db::{BatisConfig, MappingContext, RepositoryFactory, SqlxDataSource};
//!
//! let config = BatisConfig::load(None)?;
//! let source = SqlxDataSource::connect(&config.pool_config()).await?;
//! let environment = Environment::new(&config.environment.id, Arc::new(source));
//! let engine = EngineConfiguration::new(environment).map_underscore_to_camel_case(true);
//!
//! let context = config.configure(MappingContext::builder(engine))?.build().await?;
//! let factory = RepositoryFactory::new(Arc::new(context), executor);
//!
//! let users = factory.repository::<User>()?;
//! let page = users.find_all_paged(&Pageable::of(0, 20)?).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod dialect_resolver;
pub mod error;
pub mod pool;
pub mod repository;
pub mod session;
pub mod statement;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::BatisConfig;
pub use context::{MappingContext, MappingContextBuilder};
pub use dialect_resolver::{
    DefaultDialectProvider, DialectProvider, DialectResolver, StaticDialectProvider,
};
pub use error::{DbError, DbResult};
pub use pool::{PoolConfig, SqlxDataSource};
pub use repository::{RepositoryFactory, RepositorySupport, SimpleRepository};
pub use session::{
    ConnectionMetadata, DataSource, EngineConfiguration, Environment, MappedStatement,
    StatementExecutor, StatementKind,
};
pub use statement::StatementGenerator;
