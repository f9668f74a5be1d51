//! # Mapping Module
//!
//! Entity descriptors, naming strategies and the persistent metamodel.
//!
//! ## How a Type Becomes Mappable
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  #[derive(Serialize, Deserialize)]                                     │
//! │  struct User { id: Option<i64>, user_name: String }                    │
//! │       │                                                                 │
//! │       │  impl Entity for User                                          │
//! │       │  ├── descriptor() ──► static EntityDescriptor                  │
//! │       │  ├── id()          ──► Option<i64>                             │
//! │       │  └── as_auditable() (optional capability)                      │
//! │       ▼                                                                 │
//! │  PersistentEntity::build::<User>(strategy)                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  table, id property, columns, named queries                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod descriptor;
pub mod entity;
pub mod naming;

pub use descriptor::{EntityDescriptor, NamedQueryDescriptor, PropertyDescriptor};
pub use entity::{PersistentEntity, PersistentProperty};
pub use naming::{
    CamelCaseSplittingFieldNamingStrategy, FieldNamingStrategy, PropertyNameFieldNamingStrategy,
    SnakeCaseFieldNamingStrategy,
};

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::audit::Auditable;

/// A type that can be persisted through a repository.
///
/// Entities travel to and from the statement engine as JSON values, so the
/// serde representation must use the property names of the descriptor.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Primary key type.
    type Id: Serialize + Clone + fmt::Debug + Send + Sync;

    /// The static mapping table of this type.
    fn descriptor() -> &'static EntityDescriptor;

    /// Current identity value, `None` while unsaved.
    fn id(&self) -> Option<Self::Id>;

    /// Whether `save` should insert rather than update.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Audit capability query. Entities without audit columns keep the
    /// default and are never stamped.
    fn as_auditable(&mut self) -> Option<&mut dyn Auditable> {
        None
    }
}
