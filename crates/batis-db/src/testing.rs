//! Test doubles for the engine boundary: a scripted data source, a recording
//! statement executor and two sample entities.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use batis_core::audit::{Auditable, AuditorId};
use batis_core::mapping::{Entity, EntityDescriptor, NamedQueryDescriptor, PropertyDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DbError, DbResult};
use crate::session::{
    ConnectionMetadata, DataSource, EngineConfiguration, Environment, MappedStatement,
    StatementExecutor, StatementKind,
};

// =============================================================================
// Data Source
// =============================================================================

/// Reports a fixed product name, or fails every acquisition.
#[derive(Debug)]
pub struct FakeDataSource {
    product: Option<String>,
    acquisitions: AtomicUsize,
    open: Arc<AtomicUsize>,
}

impl FakeDataSource {
    pub fn product(name: &str) -> Arc<Self> {
        Arc::new(FakeDataSource {
            product: Some(name.to_string()),
            acquisitions: AtomicUsize::new(0),
            open: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(FakeDataSource {
            product: None,
            acquisitions: AtomicUsize::new(0),
            open: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Connections handed out and not yet dropped.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

struct FakeConnection {
    product: String,
    open: Arc<AtomicUsize>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectionMetadata for FakeConnection {
    async fn database_product_name(&mut self) -> DbResult<String> {
        Ok(self.product.clone())
    }
}

#[async_trait]
impl DataSource for FakeDataSource {
    async fn acquire(&self) -> DbResult<Box<dyn ConnectionMetadata>> {
        let product = self
            .product
            .clone()
            .ok_or_else(|| DbError::ConnectionFailed("connection refused".to_string()))?;
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        self.open.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeConnection {
            product,
            open: Arc::clone(&self.open),
        }))
    }
}

/// An engine configuration whose environment id is `"test"`.
pub fn configuration_for(source: Arc<FakeDataSource>) -> EngineConfiguration {
    EngineConfiguration::new(Environment::new("test", source))
}

// =============================================================================
// Statement Executor
// =============================================================================

/// One recorded call into the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub kind: StatementKind,
    pub statement: String,
    pub parameter: Value,
}

/// Records every dispatch and answers selects from canned responses keyed by
/// statement suffix.
#[derive(Default)]
pub struct MockExecutor {
    dispatches: Mutex<Vec<Dispatch>>,
    one: Mutex<HashMap<String, Value>>,
    list: Mutex<HashMap<String, Vec<Value>>>,
    statements: Mutex<HashMap<String, MappedStatement>>,
    fail_with: Mutex<Option<String>>,
}

impl MockExecutor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers `select_one` on any statement ending in `suffix`.
    pub fn on_select_one(&self, suffix: &str, row: Value) {
        self.one.lock().unwrap().insert(suffix.to_string(), row);
    }

    /// Answers `select_list` on any statement ending in `suffix`.
    pub fn on_select_list(&self, suffix: &str, rows: Vec<Value>) {
        self.list.lock().unwrap().insert(suffix.to_string(), rows);
    }

    /// Makes every later dispatch fail with a query error.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.dispatches.lock().unwrap().clone()
    }

    /// Number of dispatches whose statement ends in `suffix`.
    pub fn count_of(&self, suffix: &str) -> usize {
        self.dispatches
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.statement.ends_with(suffix))
            .count()
    }

    pub fn statement(&self, id: &str) -> Option<MappedStatement> {
        self.statements.lock().unwrap().get(id).cloned()
    }

    pub fn statement_count(&self) -> usize {
        self.statements.lock().unwrap().len()
    }

    fn record(&self, kind: StatementKind, statement: &str, parameter: Value) -> DbResult<()> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(DbError::QueryFailed(message));
        }
        self.dispatches.lock().unwrap().push(Dispatch {
            kind,
            statement: statement.to_string(),
            parameter,
        });
        Ok(())
    }

    fn canned<V: Clone>(map: &Mutex<HashMap<String, V>>, statement: &str) -> Option<V> {
        map.lock()
            .unwrap()
            .iter()
            .find(|(suffix, _)| statement.ends_with(suffix.as_str()))
            .map(|(_, v)| v.clone())
    }
}

#[async_trait]
impl StatementExecutor for MockExecutor {
    async fn select_one(&self, statement: &str, parameter: Value) -> DbResult<Option<Value>> {
        self.record(StatementKind::Select, statement, parameter)?;
        Ok(Self::canned(&self.one, statement))
    }

    async fn select_list(&self, statement: &str, parameter: Value) -> DbResult<Vec<Value>> {
        self.record(StatementKind::Select, statement, parameter)?;
        Ok(Self::canned(&self.list, statement).unwrap_or_default())
    }

    async fn insert(&self, statement: &str, parameter: Value) -> DbResult<u64> {
        self.record(StatementKind::Insert, statement, parameter)?;
        Ok(1)
    }

    async fn update(&self, statement: &str, parameter: Value) -> DbResult<u64> {
        self.record(StatementKind::Update, statement, parameter)?;
        Ok(1)
    }

    async fn delete(&self, statement: &str, parameter: Value) -> DbResult<u64> {
        self.record(StatementKind::Delete, statement, parameter)?;
        Ok(1)
    }

    fn has_statement(&self, statement: &str) -> bool {
        self.statements.lock().unwrap().contains_key(statement)
    }

    fn add_statement(&self, statement: MappedStatement) -> DbResult<()> {
        self.statements
            .lock()
            .unwrap()
            .insert(statement.id.clone(), statement);
        Ok(())
    }
}

// =============================================================================
// Sample Entities
// =============================================================================

static USER_ACCOUNT_QUERIES: &[NamedQueryDescriptor] = &[NamedQueryDescriptor::new(
    "byEmail",
    "SELECT * FROM t_user WHERE email_address = #{email}",
)];

static USER_ACCOUNT: EntityDescriptor = EntityDescriptor::new(&[
    PropertyDescriptor::id("id", "i64"),
    PropertyDescriptor::new("userName", "String"),
    PropertyDescriptor::new("email", "Option<String>").column("email_address"),
    PropertyDescriptor::new("createdDate", "Option<DateTime<Utc>>"),
    PropertyDescriptor::new("createdBy", "Option<i64>"),
    PropertyDescriptor::new("lastModifiedDate", "Option<DateTime<Utc>>"),
    PropertyDescriptor::new("lastModifiedBy", "Option<i64>"),
])
.table("t_user")
.named_query(NamedQueryDescriptor::new("findActive", "from UserAccount where active = true"))
.named_queries(USER_ACCOUNT_QUERIES)
.named_native_query(NamedQueryDescriptor::new(
    "findActive",
    "SELECT * FROM t_user WHERE active = TRUE",
));

/// An auditable entity with an explicit table and named queries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: Option<i64>,
    pub user_name: String,
    pub email: Option<String>,
    pub created_date: Option<DateTime<Utc>>,
    pub created_by: Option<AuditorId>,
    pub last_modified_date: Option<DateTime<Utc>>,
    pub last_modified_by: Option<AuditorId>,
}

impl UserAccount {
    pub fn named(user_name: &str) -> Self {
        UserAccount {
            user_name: user_name.to_string(),
            ..Self::default()
        }
    }
}

impl Entity for UserAccount {
    type Id = i64;

    fn descriptor() -> &'static EntityDescriptor {
        &USER_ACCOUNT
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn as_auditable(&mut self) -> Option<&mut dyn Auditable> {
        Some(self)
    }
}

impl Auditable for UserAccount {
    fn set_created_date(&mut self, at: DateTime<Utc>) {
        self.created_date = Some(at);
    }

    fn set_created_by(&mut self, auditor: Option<AuditorId>) {
        self.created_by = auditor;
    }

    fn set_last_modified_date(&mut self, at: DateTime<Utc>) {
        self.last_modified_date = Some(at);
    }

    fn set_last_modified_by(&mut self, auditor: Option<AuditorId>) {
        self.last_modified_by = auditor;
    }
}

static TAG: EntityDescriptor = EntityDescriptor::new(&[
    PropertyDescriptor::id("code", "String"),
    PropertyDescriptor::new("label", "String"),
]);

/// A plain entity with a string key and a derived table name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub code: Option<String>,
    pub label: String,
}

impl Entity for Tag {
    type Id = String;

    fn descriptor() -> &'static EntityDescriptor {
        &TAG
    }

    fn id(&self) -> Option<String> {
        self.code.clone()
    }
}
