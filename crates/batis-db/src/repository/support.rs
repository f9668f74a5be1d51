//! # Repository Support
//!
//! Namespace-scoped dispatch helpers shared by repositories: statement id
//! composition, JSON conversion of parameters and rows, count parsing and
//! the count-then-select paging path.

use std::sync::Arc;

use batis_core::domain::{Page, Pageable};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::session::StatementExecutor;
use crate::statement::statement_id;

/// Dispatches statements of one namespace to the engine.
#[derive(Clone)]
pub struct RepositorySupport {
    namespace: String,
    executor: Arc<dyn StatementExecutor>,
}

impl RepositorySupport {
    pub fn new(namespace: impl Into<String>, executor: Arc<dyn StatementExecutor>) -> Self {
        RepositorySupport {
            namespace: namespace.into(),
            executor,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn executor(&self) -> &Arc<dyn StatementExecutor> {
        &self.executor
    }

    fn statement(&self, suffix: &str) -> String {
        statement_id(&self.namespace, suffix)
    }

    pub async fn select_one<R: DeserializeOwned>(
        &self,
        suffix: &str,
        parameter: Value,
    ) -> DbResult<Option<R>> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "select_one");
        match self.executor.select_one(&statement, parameter).await? {
            Some(row) if !row.is_null() => Ok(Some(serde_json::from_value(row)?)),
            _ => Ok(None),
        }
    }

    pub async fn select_list<R: DeserializeOwned>(
        &self,
        suffix: &str,
        parameter: Value,
    ) -> DbResult<Vec<R>> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "select_list");
        let rows = self.executor.select_list(&statement, parameter).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(DbError::from))
            .collect()
    }

    /// Runs a count statement and parses its single value.
    pub async fn select_count(&self, suffix: &str, parameter: Value) -> DbResult<u64> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "select_count");
        match self.executor.select_one(&statement, parameter).await? {
            Some(row) => count_from_row(&row),
            None => Ok(0),
        }
    }

    pub async fn insert(&self, suffix: &str, parameter: Value) -> DbResult<u64> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "insert");
        self.executor.insert(&statement, parameter).await
    }

    pub async fn update(&self, suffix: &str, parameter: Value) -> DbResult<u64> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "update");
        self.executor.update(&statement, parameter).await
    }

    pub async fn delete(&self, suffix: &str, parameter: Value) -> DbResult<u64> {
        let statement = self.statement(suffix);
        debug!(statement = %statement, "delete");
        self.executor.delete(&statement, parameter).await
    }

    /// Counts, then selects one page with the same parameters.
    ///
    /// Always issues exactly one count and one select. The page total is the
    /// count as reported.
    pub async fn find_by_pager<R: DeserializeOwned>(
        &self,
        pageable: &Pageable,
        select_suffix: &str,
        count_suffix: &str,
        parameter: Map<String, Value>,
    ) -> DbResult<Page<R>> {
        let parameter = Value::Object(parameter);
        let total = self.select_count(count_suffix, parameter.clone()).await?;
        let content = self.select_list(select_suffix, parameter).await?;
        Ok(Page::new(content, pageable.clone(), total))
    }
}

impl std::fmt::Debug for RepositorySupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySupport")
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Serializes any value into a parameter.
pub fn to_parameter<P: Serialize + ?Sized>(value: &P) -> DbResult<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Reads a row count from the shapes engines commonly return: a bare number,
/// a numeric string, or a single-column row.
pub fn count_from_row(row: &Value) -> DbResult<u64> {
    match row {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .ok_or_else(|| DbError::QueryFailed(format!("Invalid row count: {n}"))),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| DbError::QueryFailed(format!("Invalid row count: '{s}'"))),
        Value::Object(columns) if columns.len() == 1 => match columns.values().next() {
            Some(value) => count_from_row(value),
            None => Ok(0),
        },
        other => Err(DbError::QueryFailed(format!("Unexpected count row: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExecutor;
    use serde_json::json;

    #[test]
    fn test_count_shapes() {
        assert_eq!(count_from_row(&json!(7)).unwrap(), 7);
        assert_eq!(count_from_row(&json!("12")).unwrap(), 12);
        assert_eq!(count_from_row(&json!({"COUNT(*)": 3})).unwrap(), 3);
        assert_eq!(count_from_row(&Value::Null).unwrap(), 0);
        assert!(count_from_row(&json!(-1)).is_err());
        assert!(count_from_row(&json!([1, 2])).is_err());
    }

    #[tokio::test]
    async fn test_statement_ids_are_namespaced() {
        let executor = MockExecutor::new();
        let support = RepositorySupport::new("app::User", executor.clone());

        support.delete("_deleteAll", json!({})).await.unwrap();

        let dispatches = executor.dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].statement, "app::User_deleteAll");
    }

    #[tokio::test]
    async fn test_find_by_pager_counts_then_selects() {
        let executor = MockExecutor::new();
        executor.on_select_one("_countByPager", json!(42));
        executor.on_select_list("_selectByPager", vec![json!("a"), json!("b")]);
        let support = RepositorySupport::new("ns", executor.clone());

        let pageable = Pageable::of(1, 2).unwrap();
        let page: Page<String> = support
            .find_by_pager(&pageable, "_selectByPager", "_countByPager", Map::new())
            .await
            .unwrap();

        assert_eq!(page.total_elements(), 42);
        assert_eq!(page.content(), &["a".to_string(), "b".to_string()]);
        let order: Vec<_> = executor.dispatches().into_iter().map(|d| d.statement).collect();
        assert_eq!(order, vec!["ns_countByPager", "ns_selectByPager"]);
    }

    #[tokio::test]
    async fn test_engine_errors_propagate() {
        let executor = MockExecutor::new();
        executor.fail_with("syntax error");
        let support = RepositorySupport::new("ns", executor);

        let err = support.insert("_insert", json!({})).await.unwrap_err();
        assert!(matches!(err, DbError::QueryFailed(ref m) if m == "syntax error"));
    }
}
