//! # batis-core: Pure Mapping Model for batis
//!
//! This crate holds everything the mapping layer can decide without touching
//! a database: SQL segments, dialect syntax, entity descriptors and the
//! persistent metamodel built from them, plus paging and audit types.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          batis Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Application code                             │   │
//! │  │        repository.save(..) / find_page(..) / delete(..)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                batis-db (I/O layer)                             │   │
//! │  │   dialect resolver, mapping context, statement generator,      │   │
//! │  │   repository support, sqlx data source                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ batis-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  segment  │  │  dialect  │  │  mapping  │  │  domain   │  │   │
//! │  │   │    Sql    │  │  quoting  │  │ Persistent│  │   Sort    │  │   │
//! │  │   │  Method   │  │  paging   │  │  Entity   │  │   Page    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO ASYNC                              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`segment`] - SQL literals and method-invocation placeholders
//! - [`dialect`] - Per-database quoting and paging syntax
//! - [`mapping`] - Entity descriptors, naming strategies, metamodel
//! - [`domain`] - Sort, Pageable and Page
//! - [`audit`] - Optional audit capability of entities
//! - [`error`] - Metamodel error types
//!
//! ## Example Usage
//!
//! ```rust
//! use batis_core::mapping::{Entity, EntityDescriptor, PersistentEntity, PropertyDescriptor};
//! use batis_core::mapping::naming::SNAKE_CASE;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! #[serde(rename_all = "camelCase")]
//! struct UserAccount {
//!     id: Option<i64>,
//!     user_name: String,
//! }
//!
//! static USER_ACCOUNT: EntityDescriptor = EntityDescriptor::new(&[
//!     PropertyDescriptor::id("id", "i64"),
//!     PropertyDescriptor::new("userName", "String"),
//! ]);
//!
//! impl Entity for UserAccount {
//!     type Id = i64;
//!
//!     fn descriptor() -> &'static EntityDescriptor {
//!         &USER_ACCOUNT
//!     }
//!
//!     fn id(&self) -> Option<i64> {
//!         self.id
//!     }
//! }
//!
//! let entity = PersistentEntity::build::<UserAccount>(&SNAKE_CASE).unwrap();
//! assert_eq!(entity.table(), "user_account");
//! assert_eq!(entity.column_of("userName"), Some("user_name"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod audit;
pub mod dialect;
pub mod domain;
pub mod error;
pub mod mapping;
pub mod segment;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use audit::{Auditable, AuditorAware, AuditorId, FixedAuditor};
pub use dialect::Dialect;
pub use domain::{Direction, NullHandling, Order, Page, Pageable, Sort};
pub use error::{CoreError, CoreResult};
pub use mapping::{Entity, EntityDescriptor, PersistentEntity, PersistentProperty};
pub use segment::{MethodInvocation, Segment, Segments, Sql};
