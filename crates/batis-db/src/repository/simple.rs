//! # Simple Repository
//!
//! Generic CRUD, paging and conditional queries for one entity type.
//!
//! ## Dispatch Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  save(new)              ──► _insert             (create stamps)         │
//! │  save(existing)         ──► _update             (modify stamps)         │
//! │  find_one / exists      ──► _getById                                    │
//! │  find_basic_one         ──► _getBasicById                               │
//! │  count / count_all      ──► _countByPager                               │
//! │  delete_by_id / delete  ──► _deleteById         (one per entity)        │
//! │  delete_all             ──► _deleteAll                                  │
//! │  delete_by_condition    ──► _deleteByCondition                          │
//! │  find_all*              ──► _selectByPager                              │
//! │  find_all_by_ids        ──► _selectByIds                                │
//! │  find_page              ──► _countByPager + _selectByPager              │
//! │  find_basic_*           ──► _selectBasicByPager / _countBasicByPager    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Statements live in the namespace `std::any::type_name::<T>()`. The engine
//! owns transactions; nothing here begins or commits one.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use batis_core::audit::AuditorAware;
use batis_core::dialect::{OFFSET_END_PARAM, OFFSET_PARAM, PAGE_SIZE_PARAM};
use batis_core::domain::{Page, Pageable, Sort};
use batis_core::mapping::{Entity, PersistentEntity};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::support::{to_parameter, RepositorySupport};
use crate::context::MappingContext;
use crate::error::{DbError, DbResult};
use crate::statement::{
    StatementGenerator, CONDITION_PARAM, IDS_PARAM, SORTS_PARAM, SPECIFIED_FIELDS_PARAM,
    STATEMENT_COUNT_BASIC_BY_PAGER, STATEMENT_COUNT_BY_PAGER, STATEMENT_DELETE_ALL,
    STATEMENT_DELETE_BY_CONDITION, STATEMENT_DELETE_BY_ID, STATEMENT_GET_BASIC_BY_ID,
    STATEMENT_GET_BY_ID, STATEMENT_INSERT, STATEMENT_SELECT_BASIC_BY_PAGER,
    STATEMENT_SELECT_BY_IDS, STATEMENT_SELECT_BY_PAGER, STATEMENT_UPDATE,
};

/// Repository for one entity type.
///
/// ## Usage
/// ```rust,ignore
/// let users: SimpleRepository<User> = factory.repository()?;
///
/// let mut user = User::new("ada");
/// users.save(&mut user).await?;
///
/// let page = users
///     .find_page(&Pageable::of(0, 20)?, &UserFilter::active(), &["userName"])
///     .await?;
/// ```
pub struct SimpleRepository<T: Entity> {
    support: RepositorySupport,
    context: Arc<MappingContext>,
    entity: Arc<PersistentEntity>,
    auditor_aware: Option<Arc<dyn AuditorAware>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Entity> SimpleRepository<T> {
    pub(crate) fn new(
        support: RepositorySupport,
        context: Arc<MappingContext>,
        entity: Arc<PersistentEntity>,
        auditor_aware: Option<Arc<dyn AuditorAware>>,
    ) -> Self {
        SimpleRepository {
            support,
            context,
            entity,
            auditor_aware,
            _marker: PhantomData,
        }
    }

    pub fn namespace(&self) -> &str {
        self.support.namespace()
    }

    pub fn entity(&self) -> &PersistentEntity {
        &self.entity
    }

    fn generator(&self) -> StatementGenerator<'_> {
        StatementGenerator::new(&self.context, &self.entity)
    }

    /// `{condition, _specifiedFields?}` plus `sorts` when given.
    fn condition_parameter<C>(
        &self,
        condition: Option<&C>,
        sort: Option<&Sort>,
        columns: &[&str],
    ) -> DbResult<Map<String, Value>>
    where
        C: Serialize + ?Sized,
    {
        let mut parameter = Map::new();
        let condition = match condition {
            Some(condition) => to_parameter(condition)?,
            None => Value::Null,
        };
        parameter.insert(CONDITION_PARAM.to_string(), condition);
        if let Some(sort) = sort {
            let orders = self.generator().sort_parameter(sort)?;
            parameter.insert(SORTS_PARAM.to_string(), to_parameter(&orders)?);
        }
        if !columns.is_empty() {
            let fields = self.generator().specified_fields(columns)?;
            parameter.insert(SPECIFIED_FIELDS_PARAM.to_string(), to_parameter(&fields)?);
        }
        Ok(parameter)
    }

    fn pager_parameter<C>(
        &self,
        pageable: &Pageable,
        condition: Option<&C>,
        columns: &[&str],
    ) -> DbResult<Map<String, Value>>
    where
        C: Serialize + ?Sized,
    {
        let mut parameter = self.condition_parameter(condition, Some(pageable.sort()), columns)?;
        parameter.insert(OFFSET_PARAM.to_string(), Value::from(pageable.offset()));
        parameter.insert(PAGE_SIZE_PARAM.to_string(), Value::from(pageable.page_size()));
        parameter.insert(OFFSET_END_PARAM.to_string(), Value::from(pageable.offset_end()));
        Ok(parameter)
    }

    // =========================================================================
    // Save
    // =========================================================================

    /// Inserts a new entity or updates an existing one.
    ///
    /// ## Audit
    /// Entities exposing [`Entity::as_auditable`] get the current time as
    /// creation (insert) or modification (update) date. The auditor is only
    /// stamped when the repository was built with an [`AuditorAware`].
    ///
    /// Identity values generated by the database are not read back.
    pub async fn save<'e>(&self, entity: &'e mut T) -> DbResult<&'e mut T> {
        let is_new = entity.is_new();
        let auditor = self.auditor_aware.as_ref().map(|a| a.current_auditor());

        if let Some(auditable) = entity.as_auditable() {
            let now = Utc::now();
            if is_new {
                auditable.set_created_date(now);
                if let Some(auditor) = auditor {
                    auditable.set_created_by(auditor);
                }
            } else {
                auditable.set_last_modified_date(now);
                if let Some(auditor) = auditor {
                    auditable.set_last_modified_by(auditor);
                }
            }
        }

        let parameter = to_parameter(&*entity)?;
        if is_new {
            self.support.insert(STATEMENT_INSERT, parameter).await?;
        } else {
            self.support.update(STATEMENT_UPDATE, parameter).await?;
        }
        Ok(entity)
    }

    /// Saves each entity in order.
    pub async fn save_all(&self, entities: &mut [T]) -> DbResult<()> {
        for entity in entities.iter_mut() {
            self.save(entity).await?;
        }
        Ok(())
    }

    // =========================================================================
    // Lookup by Id
    // =========================================================================

    pub async fn find_one(&self, id: &T::Id) -> DbResult<Option<T>> {
        self.support
            .select_one(STATEMENT_GET_BY_ID, to_parameter(id)?)
            .await
    }

    /// Like [`find_one`](Self::find_one), restricted to `columns` when given.
    pub async fn find_basic_one(&self, id: &T::Id, columns: &[&str]) -> DbResult<Option<T>> {
        let mut parameter = Map::new();
        parameter.insert("id".to_string(), to_parameter(id)?);
        if !columns.is_empty() {
            let fields = self.generator().specified_fields(columns)?;
            parameter.insert(SPECIFIED_FIELDS_PARAM.to_string(), to_parameter(&fields)?);
        }
        self.support
            .select_one(STATEMENT_GET_BASIC_BY_ID, Value::Object(parameter))
            .await
    }

    /// Whether a row with `id` exists; performs a full [`find_one`](Self::find_one).
    pub async fn exists(&self, id: &T::Id) -> DbResult<bool> {
        Ok(self.find_one(id).await?.is_some())
    }

    pub async fn count(&self) -> DbResult<u64> {
        self.support
            .select_count(STATEMENT_COUNT_BY_PAGER, Value::Object(Map::new()))
            .await
    }

    // =========================================================================
    // Delete
    // =========================================================================

    pub async fn delete_by_id(&self, id: &T::Id) -> DbResult<()> {
        self.support
            .delete(STATEMENT_DELETE_BY_ID, to_parameter(id)?)
            .await?;
        Ok(())
    }

    /// Deletes by the entity's identity.
    ///
    /// ## Errors
    /// [`DbError::InvalidArgument`] when the entity has no identity value.
    pub async fn delete(&self, entity: &T) -> DbResult<()> {
        let id = entity.id().ok_or_else(|| {
            DbError::invalid_argument(format!(
                "Cannot delete {} without an identity value",
                self.entity.short_name()
            ))
        })?;
        self.delete_by_id(&id).await
    }

    /// Deletes entities one by one.
    pub async fn delete_all_entities<'e, I>(&self, entities: I) -> DbResult<()>
    where
        I: IntoIterator<Item = &'e T>,
    {
        for entity in entities {
            self.delete(entity).await?;
        }
        Ok(())
    }

    pub async fn delete_all(&self) -> DbResult<()> {
        self.support
            .delete(STATEMENT_DELETE_ALL, Value::Object(Map::new()))
            .await?;
        Ok(())
    }

    /// Deletes every row matching the non-null properties of `condition`.
    ///
    /// The generated `<where>` collapses when no property is set, which
    /// would delete the whole table. Use [`SimpleRepository::delete_all`]
    /// for that.
    ///
    /// ## Errors
    /// [`DbError::InvalidArgument`] when `condition` does not serialize to
    /// an object with at least one non-null property. Nothing is dispatched.
    pub async fn delete_by_condition<C>(&self, condition: &C) -> DbResult<u64>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, &[])?;
        let restricts = match parameter.get(CONDITION_PARAM) {
            Some(Value::Object(properties)) => properties.values().any(|v| !v.is_null()),
            _ => false,
        };
        if !restricts {
            return Err(DbError::invalid_argument(format!(
                "Delete condition for {} sets no property",
                self.entity.short_name()
            )));
        }
        self.support
            .delete(STATEMENT_DELETE_BY_CONDITION, Value::Object(parameter))
            .await
    }

    // =========================================================================
    // Listing
    // =========================================================================

    pub async fn find_all(&self) -> DbResult<Vec<T>> {
        let parameter = self.condition_parameter::<Value>(None, None, &[])?;
        self.support
            .select_list(STATEMENT_SELECT_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_all_sorted(&self, sort: &Sort) -> DbResult<Vec<T>> {
        let parameter = self.condition_parameter::<Value>(None, Some(sort), &[])?;
        self.support
            .select_list(STATEMENT_SELECT_BY_PAGER, Value::Object(parameter))
            .await
    }

    /// Loads the entities with the given ids. No statement runs for an empty
    /// id list.
    pub async fn find_all_by_ids(&self, ids: &[T::Id]) -> DbResult<Vec<T>> {
        if ids.is_empty() {
            debug!(namespace = %self.namespace(), "Empty id list, skipping select");
            return Ok(Vec::new());
        }
        let mut parameter = Map::new();
        parameter.insert(IDS_PARAM.to_string(), to_parameter(ids)?);
        self.support
            .select_list(STATEMENT_SELECT_BY_IDS, Value::Object(parameter))
            .await
    }

    pub async fn find_all_paged(&self, pageable: &Pageable) -> DbResult<Page<T>> {
        let parameter = self.pager_parameter::<Value>(pageable, None, &[])?;
        self.support
            .find_by_pager(
                pageable,
                STATEMENT_SELECT_BY_PAGER,
                STATEMENT_COUNT_BY_PAGER,
                parameter,
            )
            .await
    }

    // =========================================================================
    // Conditional Queries
    // =========================================================================

    pub async fn find_one_by_condition<C>(
        &self,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Option<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, columns)?;
        self.support
            .select_one(STATEMENT_SELECT_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_all_by_condition<C>(
        &self,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Vec<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, columns)?;
        self.support
            .select_list(STATEMENT_SELECT_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_all_by_condition_sorted<C>(
        &self,
        sort: &Sort,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Vec<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), Some(sort), columns)?;
        self.support
            .select_list(STATEMENT_SELECT_BY_PAGER, Value::Object(parameter))
            .await
    }

    /// One page of entities matching `condition`.
    ///
    /// Issues one count and one select; the page total is the count.
    pub async fn find_page<C>(
        &self,
        pageable: &Pageable,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Page<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.pager_parameter(pageable, Some(condition), columns)?;
        self.support
            .find_by_pager(
                pageable,
                STATEMENT_SELECT_BY_PAGER,
                STATEMENT_COUNT_BY_PAGER,
                parameter,
            )
            .await
    }

    pub async fn count_all<C>(&self, condition: &C) -> DbResult<u64>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, &[])?;
        self.support
            .select_count(STATEMENT_COUNT_BY_PAGER, Value::Object(parameter))
            .await
    }

    // =========================================================================
    // Basic Variants
    // =========================================================================

    pub async fn find_basic_one_by_condition<C>(
        &self,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Option<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, columns)?;
        self.support
            .select_one(STATEMENT_SELECT_BASIC_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_basic_all<C>(&self, condition: &C, columns: &[&str]) -> DbResult<Vec<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, columns)?;
        self.support
            .select_list(STATEMENT_SELECT_BASIC_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_basic_all_sorted<C>(
        &self,
        sort: &Sort,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Vec<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), Some(sort), columns)?;
        self.support
            .select_list(STATEMENT_SELECT_BASIC_BY_PAGER, Value::Object(parameter))
            .await
    }

    pub async fn find_basic_page<C>(
        &self,
        pageable: &Pageable,
        condition: &C,
        columns: &[&str],
    ) -> DbResult<Page<T>>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.pager_parameter(pageable, Some(condition), columns)?;
        self.support
            .find_by_pager(
                pageable,
                STATEMENT_SELECT_BASIC_BY_PAGER,
                STATEMENT_COUNT_BASIC_BY_PAGER,
                parameter,
            )
            .await
    }

    pub async fn count_basic_all<C>(&self, condition: &C) -> DbResult<u64>
    where
        C: Serialize + Sync + ?Sized,
    {
        let parameter = self.condition_parameter(Some(condition), None, &[])?;
        self.support
            .select_count(STATEMENT_COUNT_BASIC_BY_PAGER, Value::Object(parameter))
            .await
    }

    // =========================================================================
    // Query by Example
    // =========================================================================
    // Not implemented. Each call fails instead of returning an empty answer.

    pub async fn find_one_by_example(&self, _example: &T) -> DbResult<Option<T>> {
        Err(DbError::unsupported("find_one_by_example"))
    }

    pub async fn find_all_by_example(
        &self,
        _example: &T,
        _sort: Option<&Sort>,
    ) -> DbResult<Vec<T>> {
        Err(DbError::unsupported("find_all_by_example"))
    }

    pub async fn find_page_by_example(
        &self,
        _example: &T,
        _pageable: &Pageable,
    ) -> DbResult<Page<T>> {
        Err(DbError::unsupported("find_page_by_example"))
    }

    pub async fn count_by_example(&self, _example: &T) -> DbResult<u64> {
        Err(DbError::unsupported("count_by_example"))
    }

    pub async fn exists_by_example(&self, _example: &T) -> DbResult<bool> {
        Err(DbError::unsupported("exists_by_example"))
    }
}

impl<T: Entity> fmt::Debug for SimpleRepository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleRepository")
            .field("namespace", &self.namespace())
            .field("table", &self.entity.table())
            .finish()
    }
}

impl<T: Entity> Clone for SimpleRepository<T> {
    fn clone(&self) -> Self {
        SimpleRepository {
            support: self.support.clone(),
            context: Arc::clone(&self.context),
            entity: Arc::clone(&self.entity),
            auditor_aware: self.auditor_aware.clone(),
            _marker: PhantomData,
        }
    }
}
