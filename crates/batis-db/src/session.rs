//! # Engine Boundary
//!
//! Traits describing the external statement engine and the connection
//! source this layer probes. Nothing here runs SQL; implementations live in
//! the engine (or, for the data source, in [`crate::pool`]).
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  EngineConfiguration                                                    │
//! │  ├── environment: Environment { id, data_source }                      │
//! │  │                                   │                                  │
//! │  │                                   ▼                                  │
//! │  │                        DataSource::acquire()                         │
//! │  │                                   │                                  │
//! │  │                                   ▼                                  │
//! │  │                 ConnectionMetadata::database_product_name()          │
//! │  │                  (scoped: released when the box drops)               │
//! │  │                                                                      │
//! │  └── map_underscore_to_camel_case                                      │
//! │                                                                         │
//! │  StatementExecutor                                                      │
//! │  ├── select_one / select_list / insert / update / delete               │
//! │  └── has_statement / add_statement                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DbResult;

// =============================================================================
// Connections
// =============================================================================

/// Metadata view of one acquired connection.
///
/// The connection goes back to its pool when the value is dropped.
#[async_trait]
pub trait ConnectionMetadata: Send {
    /// Product name as reported by the driver, e.g. `"PostgreSQL"`.
    async fn database_product_name(&mut self) -> DbResult<String>;
}

/// A source of scoped connections.
#[async_trait]
pub trait DataSource: Send + Sync + fmt::Debug {
    async fn acquire(&self) -> DbResult<Box<dyn ConnectionMetadata>>;
}

/// A named execution environment backed by one data source.
#[derive(Debug, Clone)]
pub struct Environment {
    id: String,
    data_source: Arc<dyn DataSource>,
}

impl Environment {
    pub fn new(id: impl Into<String>, data_source: Arc<dyn DataSource>) -> Self {
        Environment {
            id: id.into(),
            data_source,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }
}

/// The subset of engine configuration this layer reads.
#[derive(Debug, Clone)]
pub struct EngineConfiguration {
    environment: Environment,
    map_underscore_to_camel_case: bool,
}

impl EngineConfiguration {
    pub fn new(environment: Environment) -> Self {
        EngineConfiguration {
            environment,
            map_underscore_to_camel_case: false,
        }
    }

    /// Whether the engine translates `user_name` columns to `userName`.
    pub fn map_underscore_to_camel_case(mut self, enabled: bool) -> Self {
        self.map_underscore_to_camel_case = enabled;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn is_map_underscore_to_camel_case(&self) -> bool {
        self.map_underscore_to_camel_case
    }
}

// =============================================================================
// Statements
// =============================================================================

/// The kind of a mapped statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Select => write!(f, "select"),
            StatementKind::Insert => write!(f, "insert"),
            StatementKind::Update => write!(f, "update"),
            StatementKind::Delete => write!(f, "delete"),
        }
    }
}

/// A statement template registered with the engine under a fully-qualified id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedStatement {
    pub id: String,
    pub kind: StatementKind,
    /// Script body: SQL with `#{..}` binds and dynamic `<if>`/`<where>`/`<foreach>` tags.
    pub script: String,
}

impl MappedStatement {
    pub fn new(id: impl Into<String>, kind: StatementKind, script: impl Into<String>) -> Self {
        MappedStatement {
            id: id.into(),
            kind,
            script: script.into(),
        }
    }

    /// Renders the statement as a mapper XML element.
    pub fn to_xml(&self) -> String {
        format!(
            "<{kind} id=\"{id}\">\n  <script>{script}</script>\n</{kind}>",
            kind = self.kind,
            id = self.id,
            script = self.script
        )
    }
}

/// The external statement engine.
///
/// Parameters and rows travel as JSON values. Errors raised here reach the
/// repository caller unchanged.
#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn select_one(&self, statement: &str, parameter: Value) -> DbResult<Option<Value>>;

    async fn select_list(&self, statement: &str, parameter: Value) -> DbResult<Vec<Value>>;

    /// Returns the number of affected rows.
    async fn insert(&self, statement: &str, parameter: Value) -> DbResult<u64>;

    async fn update(&self, statement: &str, parameter: Value) -> DbResult<u64>;

    async fn delete(&self, statement: &str, parameter: Value) -> DbResult<u64>;

    fn has_statement(&self, statement: &str) -> bool;

    fn add_statement(&self, statement: MappedStatement) -> DbResult<()>;
}
