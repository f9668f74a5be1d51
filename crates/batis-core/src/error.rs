//! # Error Types
//!
//! Error types for batis-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  batis-core errors (this file)                                         │
//! │  └── CoreError        - Metamodel and paging rule violations           │
//! │                                                                         │
//! │  batis-db errors (separate crate)                                      │
//! │  └── DbError          - Resolver, context and repository failures      │
//! │                                                                         │
//! │  Flow: CoreError → DbError::Mapping → caller                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Metamodel construction and paging errors.
///
/// Raised while turning an [`EntityDescriptor`](crate::mapping::EntityDescriptor)
/// into a [`PersistentEntity`](crate::mapping::PersistentEntity), or when a
/// page request is built from nonsensical numbers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The descriptor declares no identity property.
    ///
    /// ## When This Occurs
    /// - Every `PropertyDescriptor` was declared with `new` instead of `id`
    /// - The property list is empty
    #[error("Entity {entity} declares no identity property")]
    MissingIdentifier { entity: String },

    /// The descriptor declares more than one identity property.
    ///
    /// Composite keys are not supported by the generated statements.
    #[error("Entity {entity} declares multiple identity properties: {properties:?}")]
    MultipleIdentifiers {
        entity: String,
        properties: Vec<String>,
    },

    /// Two properties share one name.
    #[error("Entity {entity} declares property '{property}' more than once")]
    DuplicateProperty { entity: String, property: String },

    /// The table name (explicit or derived) is blank.
    #[error("Entity {entity} resolves to an empty table name")]
    InvalidTable { entity: String },

    /// A page request was built with an impossible size.
    #[error("Invalid page request: {reason}")]
    InvalidPageable { reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;
