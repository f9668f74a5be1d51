//! # Repository Factory
//!
//! Builds [`SimpleRepository`] instances and makes sure the engine knows
//! their statements.
//!
//! ```text
//! factory.repository::<User>()
//!      │
//!      ├── context.persistent_entity::<User>()      (cached metamodel)
//!      │
//!      ├── StatementGenerator::generate(namespace)
//!      │        │
//!      │        └── for each statement:
//!      │              executor.has_statement(id)? ── yes ─► keep engine's
//!      │                                          └─ no ──► add_statement
//!      │
//!      └── SimpleRepository<User>
//! ```

use std::sync::Arc;

use batis_core::audit::AuditorAware;
use batis_core::mapping::Entity;
use tracing::{debug, info};

use super::simple::SimpleRepository;
use super::support::RepositorySupport;
use crate::context::MappingContext;
use crate::error::DbResult;
use crate::session::StatementExecutor;
use crate::statement::StatementGenerator;

/// Creates repositories sharing one mapping context and engine.
#[derive(Clone)]
pub struct RepositoryFactory {
    context: Arc<MappingContext>,
    executor: Arc<dyn StatementExecutor>,
    auditor_aware: Option<Arc<dyn AuditorAware>>,
}

impl RepositoryFactory {
    pub fn new(context: Arc<MappingContext>, executor: Arc<dyn StatementExecutor>) -> Self {
        RepositoryFactory {
            context,
            executor,
            auditor_aware: None,
        }
    }

    /// Enables creator/modifier stamping on save.
    pub fn with_auditor_aware(mut self, auditor_aware: Arc<dyn AuditorAware>) -> Self {
        self.auditor_aware = Some(auditor_aware);
        self
    }

    pub fn context(&self) -> &Arc<MappingContext> {
        &self.context
    }

    /// Returns a repository for `T`, registering any generated statement the
    /// engine does not already define.
    pub fn repository<T: Entity>(&self) -> DbResult<SimpleRepository<T>> {
        let entity = self.context.persistent_entity::<T>()?;
        let namespace = entity.type_name();

        let mut registered = 0usize;
        for statement in StatementGenerator::new(&self.context, &entity).generate(namespace) {
            if self.executor.has_statement(&statement.id) {
                debug!(statement = %statement.id, "Engine already defines statement, keeping it");
                continue;
            }
            self.executor.add_statement(statement)?;
            registered += 1;
        }
        info!(namespace = %namespace, registered, "Repository ready");

        Ok(SimpleRepository::new(
            RepositorySupport::new(namespace, Arc::clone(&self.executor)),
            Arc::clone(&self.context),
            entity,
            self.auditor_aware.clone(),
        ))
    }
}

impl std::fmt::Debug for RepositoryFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryFactory")
            .field("context", &self.context)
            .field("auditing", &self.auditor_aware.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MappedStatement, StatementKind};
    use crate::testing::{configuration_for, FakeDataSource, MockExecutor, UserAccount};

    async fn context() -> Arc<MappingContext> {
        let configuration = configuration_for(FakeDataSource::product("PostgreSQL"))
            .map_underscore_to_camel_case(true);
        Arc::new(MappingContext::builder(configuration).build().await.unwrap())
    }

    #[tokio::test]
    async fn test_registers_generated_statements() {
        let executor = MockExecutor::new();
        let factory = RepositoryFactory::new(context().await, executor.clone());

        let repository = factory.repository::<UserAccount>().unwrap();

        assert_eq!(repository.namespace(), std::any::type_name::<UserAccount>());
        assert_eq!(executor.statement_count(), 12);
        let insert = executor
            .statement(&format!("{}_insert", repository.namespace()))
            .unwrap();
        assert_eq!(insert.kind, StatementKind::Insert);
    }

    #[tokio::test]
    async fn test_engine_statements_win() {
        let executor = MockExecutor::new();
        let id = format!("{}_getById", std::any::type_name::<UserAccount>());
        executor
            .add_statement(MappedStatement::new(&id, StatementKind::Select, "SELECT 1"))
            .unwrap();

        let factory = RepositoryFactory::new(context().await, executor.clone());
        factory.repository::<UserAccount>().unwrap();

        assert_eq!(executor.statement(&id).unwrap().script, "SELECT 1");
        assert_eq!(executor.statement_count(), 12);
    }

    #[tokio::test]
    async fn test_second_repository_registers_nothing() {
        let executor = MockExecutor::new();
        let factory = RepositoryFactory::new(context().await, executor.clone());
        factory.repository::<UserAccount>().unwrap();
        factory.repository::<UserAccount>().unwrap();
        assert_eq!(executor.statement_count(), 12);
        assert_eq!(factory.context().cached_entities(), 1);
    }
}
