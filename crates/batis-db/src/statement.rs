//! # Statement Generation
//!
//! Builds the CRUD and paging statement templates of one entity for one
//! dialect. Templates are script bodies for the external engine: plain SQL
//! with `#{..}` binds plus `<where>`, `<if>`, `<set>`, `<trim>`, `<choose>`
//! and `<foreach>` tags.
//!
//! ## Generated Statements
//! ```text
//! ┌──────────────────────┬────────┬──────────────────────────────────────────┐
//! │ suffix               │ kind   │ shape                                    │
//! ├──────────────────────┼────────┼──────────────────────────────────────────┤
//! │ _insert              │ insert │ INSERT INTO t (..) VALUES (..)           │
//! │ _update              │ update │ UPDATE t SET .. WHERE id = #{id}         │
//! │ _getById             │ select │ SELECT .. WHERE __root.id = #{id}        │
//! │ _getBasicById        │ select │ same, honours _specifiedFields           │
//! │ _deleteById          │ delete │ DELETE FROM t WHERE id = #{id}           │
//! │ _deleteAll           │ delete │ DELETE FROM t                            │
//! │ _selectByPager       │ select │ condition + sorts (+ dialect paging)     │
//! │ _countByPager        │ select │ COUNT(*) + condition                     │
//! │ _selectBasicByPager  │ select │ as _selectByPager                        │
//! │ _countBasicByPager   │ select │ as _countByPager                         │
//! │ _selectByIds         │ select │ WHERE __root.id IN (<foreach ids>)       │
//! │ _deleteByCondition   │ delete │ DELETE FROM t <where>condition</where>   │
//! └──────────────────────┴────────┴──────────────────────────────────────────┘
//! ```
//!
//! ORDER BY text is produced at expansion time by the [`Sorts::render`]
//! placeholder; the repository hands it orders whose properties are already
//! resolved to column expressions.

use batis_core::dialect::{Dialect, OFFSET_PARAM, PAGE_SIZE_PARAM};
use batis_core::domain::{NullHandling, Order, Sort};
use batis_core::mapping::{PersistentEntity, PersistentProperty};
use batis_core::segment::{MethodInvocation, Segments, Sql};

use crate::context::MappingContext;
use crate::error::{DbError, DbResult};
use crate::session::{MappedStatement, StatementKind};

// =============================================================================
// Statement Names & Parameters
// =============================================================================

pub const STATEMENT_INSERT: &str = "_insert";
pub const STATEMENT_UPDATE: &str = "_update";
pub const STATEMENT_GET_BY_ID: &str = "_getById";
pub const STATEMENT_GET_BASIC_BY_ID: &str = "_getBasicById";
pub const STATEMENT_DELETE_BY_ID: &str = "_deleteById";
pub const STATEMENT_DELETE_ALL: &str = "_deleteAll";
pub const STATEMENT_SELECT_BY_PAGER: &str = "_selectByPager";
pub const STATEMENT_COUNT_BY_PAGER: &str = "_countByPager";
pub const STATEMENT_SELECT_BASIC_BY_PAGER: &str = "_selectBasicByPager";
pub const STATEMENT_COUNT_BASIC_BY_PAGER: &str = "_countBasicByPager";
pub const STATEMENT_SELECT_BY_IDS: &str = "_selectByIds";
pub const STATEMENT_DELETE_BY_CONDITION: &str = "_deleteByCondition";

pub const CONDITION_PARAM: &str = "condition";
pub const SORTS_PARAM: &str = "sorts";
pub const IDS_PARAM: &str = "ids";
pub const SPECIFIED_FIELDS_PARAM: &str = "_specifiedFields";

/// Parameter name under which a single identity value is bound.
const ID_PARAM: &str = "id";

/// Builds `<namespace><suffix>`.
pub fn statement_id(namespace: &str, suffix: &str) -> String {
    format!("{namespace}{suffix}")
}

// =============================================================================
// Sorts
// =============================================================================

/// Renders resolved orders into ORDER BY items.
///
/// Referenced from templates as `@batis_db::statement::Sorts@render(sorts)`.
#[derive(Debug, Clone, Copy)]
pub struct Sorts;

impl Sorts {
    /// Joins orders as `expr DIR[ NULLS FIRST|LAST]`, comma separated.
    ///
    /// ## Example
    /// ```rust
    /// use batis_core::domain::Order;
    /// use batis_db::statement::Sorts;
    ///
    /// let orders = [Order::asc("__root.name"), Order::desc("__root.id")];
    /// assert_eq!(Sorts::render(&orders), "__root.name ASC, __root.id DESC");
    /// ```
    pub fn render(orders: &[Order]) -> String {
        orders
            .iter()
            .map(|order| {
                let nulls = match order.null_handling {
                    NullHandling::Native => "",
                    NullHandling::NullsFirst => " NULLS FIRST",
                    NullHandling::NullsLast => " NULLS LAST",
                };
                format!("{} {}{}", order.property, order.direction, nulls)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn placeholder() -> MethodInvocation {
        MethodInvocation::of::<Sorts>("render", &[SORTS_PARAM])
    }
}

// =============================================================================
// Generator
// =============================================================================

/// Renders statement templates for one entity.
#[derive(Debug, Clone, Copy)]
pub struct StatementGenerator<'a> {
    entity: &'a PersistentEntity,
    dialect: &'static dyn Dialect,
    quote: bool,
}

impl<'a> StatementGenerator<'a> {
    /// Uses the dialect and quoting setting of `context`.
    pub fn new(context: &MappingContext, entity: &'a PersistentEntity) -> Self {
        Self::for_dialect(entity, context.dialect(), context.quote_identifiers())
    }

    pub fn for_dialect(
        entity: &'a PersistentEntity,
        dialect: &'static dyn Dialect,
        quote: bool,
    ) -> Self {
        StatementGenerator {
            entity,
            dialect,
            quote,
        }
    }

    // =========================================================================
    // Identifiers
    // =========================================================================

    fn ident(&self, name: &str) -> String {
        if self.quote {
            self.dialect.quote(name)
        } else {
            name.to_string()
        }
    }

    fn table(&self) -> String {
        self.ident(self.entity.table())
    }

    fn column(&self, property: &PersistentProperty) -> String {
        self.ident(property.column())
    }

    fn qualified(&self, property: &PersistentProperty) -> String {
        format!("{}.{}", Sql::ROOT_ALIAS, self.column(property))
    }

    /// `__root.col AS "prop"`; the alias is always quoted to keep its case.
    fn select_item(&self, property: &PersistentProperty) -> String {
        format!("{} AS {}", self.qualified(property), self.dialect.quote(property.name()))
    }

    fn property(&self, name: &str) -> DbResult<&'a PersistentProperty> {
        self.entity.property(name).ok_or_else(|| {
            DbError::invalid_argument(format!(
                "No property '{name}' found on entity {}",
                self.entity.type_name()
            ))
        })
    }

    /// Translates property names into select items for `_specifiedFields`.
    ///
    /// ## Errors
    /// [`DbError::InvalidArgument`] for a name the entity does not map.
    pub fn specified_fields(&self, fields: &[&str]) -> DbResult<Vec<String>> {
        fields
            .iter()
            .map(|name| self.property(name).map(|p| self.select_item(p)))
            .collect()
    }

    /// Resolves the properties of `sort` to qualified column expressions.
    ///
    /// Case-insensitive orders are wrapped in the dialect's lower function.
    pub fn sort_parameter(&self, sort: &Sort) -> DbResult<Vec<Order>> {
        sort.orders()
            .iter()
            .map(|order| {
                let column = self.qualified(self.property(&order.property)?);
                let expression = if order.ignore_case {
                    format!("{}({column})", self.dialect.lower_function())
                } else {
                    column
                };
                Ok(Order {
                    property: expression,
                    ..order.clone()
                })
            })
            .collect()
    }

    // =========================================================================
    // Fragments
    // =========================================================================

    fn all_select_items(&self) -> String {
        self.entity
            .properties()
            .iter()
            .map(|p| self.select_item(p))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn select_items_choice(&self) -> String {
        format!(
            "<choose><when test=\"{f} != null and {f}.size() > 0\"><foreach collection=\"{f}\" item=\"field\" separator=\",\">${{field}}</foreach></when><otherwise>{all}</otherwise></choose>",
            f = SPECIFIED_FIELDS_PARAM,
            all = self.all_select_items()
        )
    }

    /// `<where>` block testing every property of the condition.
    fn condition_where(&self, qualify: bool) -> String {
        let mut tests = String::new();
        for property in self.entity.properties() {
            let column = if qualify {
                self.qualified(property)
            } else {
                self.column(property)
            };
            let path = format!("{CONDITION_PARAM}.{}", property.name());
            tests.push_str(&format!(
                "<if test=\"{path} != null\"> {} </if>",
                Segments::new()
                    .push(Sql::AND)
                    .push(column)
                    .push(Sql::EQUALS)
                    .push(format!("#{{{path}}}"))
            ));
        }
        format!("<where><if test=\"{CONDITION_PARAM} != null\">{tests}</if></where>")
    }

    fn order_by(&self, fallback_to_id: bool) -> String {
        let sorted = format!(
            "{} ${{{}}}",
            Sql::ORDER_BY,
            Sorts::placeholder()
        );
        let test = format!("{SORTS_PARAM} != null and {SORTS_PARAM}.size() > 0");
        if fallback_to_id {
            format!(
                "<choose><when test=\"{test}\">{sorted}</when><otherwise>{} {}</otherwise></choose>",
                Sql::ORDER_BY,
                self.qualified(self.entity.id_property())
            )
        } else {
            format!("<if test=\"{test}\">{sorted}</if>")
        }
    }

    fn from_root(&self) -> Segments {
        Segments::new()
            .push(Sql::FROM)
            .push(self.table())
            .push(Sql::ROOT_ALIAS)
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn insert(&self) -> String {
        let id = self.entity.id_property();
        let mut columns = format!("<if test=\"{} != null\">{},</if>", id.name(), self.column(id));
        let mut values = format!("<if test=\"{0} != null\">#{{{0}}},</if>", id.name());
        for property in self.entity.properties().iter().filter(|p| !p.is_id()) {
            columns.push_str(&format!("{},", self.column(property)));
            values.push_str(&format!("#{{{}}},", property.name()));
        }
        Segments::new()
            .push(Sql::INSERT_INTO)
            .push(self.table())
            .push(format!("<trim prefix=\"(\" suffix=\")\" suffixOverrides=\",\">{columns}</trim>"))
            .push(Sql::VALUES)
            .push(format!("<trim prefix=\"(\" suffix=\")\" suffixOverrides=\",\">{values}</trim>"))
            .to_string()
    }

    fn update(&self) -> String {
        let id = self.entity.id_property();
        let assignments: String = self
            .entity
            .properties()
            .iter()
            .filter(|p| !p.is_id())
            .map(|p| format!("{} {} #{{{}}},", self.column(p), Sql::EQUALS, p.name()))
            .collect();
        Segments::new()
            .push(Sql::UPDATE)
            .push(self.table())
            .push(format!("<set>{assignments}</set>"))
            .push(Sql::WHERE)
            .push(self.column(id))
            .push(Sql::EQUALS)
            .push(format!("#{{{}}}", id.name()))
            .to_string()
    }

    fn get_by_id(&self, basic: bool) -> String {
        let items = if basic {
            self.select_items_choice()
        } else {
            self.all_select_items()
        };
        Segments::new()
            .push(Sql::SELECT)
            .push(items)
            .push(self.from_root())
            .push(Sql::WHERE)
            .push(self.qualified(self.entity.id_property()))
            .push(Sql::EQUALS)
            .push(format!("#{{{ID_PARAM}}}"))
            .to_string()
    }

    fn delete_by_id(&self) -> String {
        let id = self.entity.id_property();
        Segments::new()
            .push(Sql::DELETE_FROM)
            .push(self.table())
            .push(Sql::WHERE)
            .push(self.column(id))
            .push(Sql::EQUALS)
            .push(format!("#{{{ID_PARAM}}}"))
            .to_string()
    }

    fn delete_all(&self) -> String {
        Segments::new()
            .push(Sql::DELETE_FROM)
            .push(self.table())
            .to_string()
    }

    fn delete_by_condition(&self) -> String {
        Segments::new()
            .push(Sql::DELETE_FROM)
            .push(self.table())
            .push(self.condition_where(false))
            .to_string()
    }

    /// Select with optional projection, condition and sorting; paged through
    /// the dialect when both paging parameters are present.
    fn select_by_pager(&self) -> String {
        let base = Segments::new()
            .push(Sql::SELECT)
            .push(self.select_items_choice())
            .push(self.from_root())
            .push(self.condition_where(true));

        let unpaged = Segments::new()
            .push(base.clone())
            .push(self.order_by(false))
            .to_string();
        let paged = self
            .dialect
            .paginate(&Segments::new().push(base).push(self.order_by(true)).to_string());

        format!(
            "<choose><when test=\"{OFFSET_PARAM} != null and {PAGE_SIZE_PARAM} != null\">{paged}</when><otherwise>{unpaged}</otherwise></choose>"
        )
    }

    fn count_by_pager(&self) -> String {
        Segments::new()
            .push(Sql::SELECT)
            .push(Sql::COUNTS)
            .push(self.from_root())
            .push(self.condition_where(true))
            .to_string()
    }

    fn select_by_ids(&self) -> String {
        Segments::new()
            .push(Sql::SELECT)
            .push(self.all_select_items())
            .push(self.from_root())
            .push(Sql::WHERE)
            .push(self.qualified(self.entity.id_property()))
            .push(Sql::IN)
            .push(format!(
                "<foreach collection=\"{IDS_PARAM}\" item=\"item\" open=\"(\" separator=\",\" close=\")\">#{{item}}</foreach>"
            ))
            .to_string()
    }

    /// Generates every statement of the entity under `namespace`.
    pub fn generate(&self, namespace: &str) -> Vec<MappedStatement> {
        let pager = self.select_by_pager();
        let count = self.count_by_pager();
        [
            (STATEMENT_INSERT, StatementKind::Insert, self.insert()),
            (STATEMENT_UPDATE, StatementKind::Update, self.update()),
            (STATEMENT_GET_BY_ID, StatementKind::Select, self.get_by_id(false)),
            (STATEMENT_GET_BASIC_BY_ID, StatementKind::Select, self.get_by_id(true)),
            (STATEMENT_DELETE_BY_ID, StatementKind::Delete, self.delete_by_id()),
            (STATEMENT_DELETE_ALL, StatementKind::Delete, self.delete_all()),
            (STATEMENT_SELECT_BY_PAGER, StatementKind::Select, pager.clone()),
            (STATEMENT_COUNT_BY_PAGER, StatementKind::Select, count.clone()),
            (STATEMENT_SELECT_BASIC_BY_PAGER, StatementKind::Select, pager),
            (STATEMENT_COUNT_BASIC_BY_PAGER, StatementKind::Select, count),
            (STATEMENT_SELECT_BY_IDS, StatementKind::Select, self.select_by_ids()),
            (STATEMENT_DELETE_BY_CONDITION, StatementKind::Delete, self.delete_by_condition()),
        ]
        .into_iter()
        .map(|(suffix, kind, script)| {
            MappedStatement::new(statement_id(namespace, suffix), kind, script)
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Tag, UserAccount};
    use batis_core::dialect::{HSQLDB, MYSQL, POSTGRESQL, SQLSERVER};
    use batis_core::domain::Direction;
    use batis_core::mapping::naming::SNAKE_CASE;

    fn user() -> PersistentEntity {
        PersistentEntity::build::<UserAccount>(&SNAKE_CASE).unwrap()
    }

    fn script(statements: &[MappedStatement], suffix: &str) -> String {
        statements
            .iter()
            .find(|s| s.id.ends_with(suffix))
            .map(|s| s.script.clone())
            .unwrap()
    }

    #[test]
    fn test_generates_every_suffix() {
        let entity = user();
        let statements =
            StatementGenerator::for_dialect(&entity, &POSTGRESQL, false).generate("app::User");
        assert_eq!(statements.len(), 12);
        assert!(statements.iter().any(|s| s.id == "app::User_selectByIds"));
        let kinds: Vec<_> = statements
            .iter()
            .filter(|s| s.kind == StatementKind::Delete)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(
            kinds,
            vec!["app::User_deleteById", "app::User_deleteAll", "app::User_deleteByCondition"]
        );
    }

    #[test]
    fn test_insert_and_update_shapes() {
        let entity = user();
        let statements =
            StatementGenerator::for_dialect(&entity, &POSTGRESQL, false).generate("ns");

        let insert = script(&statements, STATEMENT_INSERT);
        assert!(insert.starts_with("INSERT INTO t_user <trim"));
        assert!(insert.contains("<if test=\"id != null\">id,</if>user_name,email_address,"));
        assert!(insert.contains("#{userName},"));

        let update = script(&statements, STATEMENT_UPDATE);
        assert!(update.starts_with("UPDATE t_user <set>user_name = #{userName},"));
        assert!(update.ends_with("</set> WHERE id = #{id}"));
        assert!(!update.contains("id = #{id},"));
    }

    #[test]
    fn test_get_by_id_selects_aliased_columns() {
        let entity = user();
        let statements =
            StatementGenerator::for_dialect(&entity, &POSTGRESQL, false).generate("ns");
        let get = script(&statements, STATEMENT_GET_BY_ID);
        assert!(get.starts_with("SELECT __root.id AS \"id\", __root.user_name AS \"userName\""));
        assert!(get.ends_with("FROM t_user __root WHERE __root.id = #{id}"));
    }

    #[test]
    fn test_condition_where_clause() {
        let entity = user();
        let statements =
            StatementGenerator::for_dialect(&entity, &POSTGRESQL, false).generate("ns");

        let count = script(&statements, STATEMENT_COUNT_BY_PAGER);
        assert!(
            count.starts_with("SELECT COUNT(*) FROM t_user __root <where><if test=\"condition != null\">")
        );
        assert!(count.contains(
            "<if test=\"condition.userName != null\"> AND __root.user_name = #{condition.userName} </if>"
        ));

        let delete = script(&statements, STATEMENT_DELETE_BY_CONDITION);
        assert!(delete.contains("AND email_address = #{condition.email}"));
        assert!(!delete.contains("__root"));
    }

    #[test]
    fn test_pager_uses_dialect_paging_and_sort_placeholder() {
        let entity = user();
        let statements = StatementGenerator::for_dialect(&entity, &HSQLDB, false).generate("ns");
        let select = script(&statements, STATEMENT_SELECT_BY_PAGER);

        assert!(select.contains("ORDER BY ${@batis_db::statement::Sorts@render(sorts)}"));
        assert!(
            select.contains("<otherwise>ORDER BY __root.id</otherwise></choose> OFFSET #{offset} LIMIT #{pageSize}")
        );
        assert_eq!(select, script(&statements, STATEMENT_SELECT_BASIC_BY_PAGER));
    }

    #[test]
    fn test_sqlserver_paging_keeps_generated_order() {
        let entity = user();
        let statements = StatementGenerator::for_dialect(&entity, &SQLSERVER, false).generate("ns");
        let select = script(&statements, STATEMENT_SELECT_BY_PAGER);
        assert!(!select.contains("ORDER BY CURRENT_TIMESTAMP"));
        assert!(select.contains("ROWS FETCH NEXT #{pageSize} ROWS ONLY"));
    }

    #[test]
    fn test_select_by_ids_iterates_ids() {
        let entity = PersistentEntity::build::<Tag>(&SNAKE_CASE).unwrap();
        let statements =
            StatementGenerator::for_dialect(&entity, &POSTGRESQL, false).generate("ns");
        let select = script(&statements, STATEMENT_SELECT_BY_IDS);
        assert!(
            select.contains("FROM tag __root WHERE __root.code IN <foreach collection=\"ids\"")
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let entity = user();
        let statements = StatementGenerator::for_dialect(&entity, &MYSQL, true).generate("ns");
        let delete = script(&statements, STATEMENT_DELETE_BY_ID);
        assert_eq!(delete, "DELETE FROM `t_user` WHERE `id` = #{id}");
    }

    #[test]
    fn test_sort_parameter_resolves_columns() {
        let entity = user();
        let generator = StatementGenerator::for_dialect(&entity, &POSTGRESQL, false);
        let sort = Sort::by_orders([Order::desc("userName").ignore_case(), Order::asc("id")]);

        let orders = generator.sort_parameter(&sort).unwrap();
        assert_eq!(orders[0].property, "lower(__root.user_name)");
        assert_eq!(orders[0].direction, Direction::Desc);
        assert_eq!(Sorts::render(&orders), "lower(__root.user_name) DESC, __root.id ASC");

        let unknown = Sort::by(["password"]);
        assert!(matches!(
            generator.sort_parameter(&unknown),
            Err(DbError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_specified_fields() {
        let entity = user();
        let generator = StatementGenerator::for_dialect(&entity, &POSTGRESQL, false);
        assert_eq!(
            generator.specified_fields(&["userName"]).unwrap(),
            vec!["__root.user_name AS \"userName\"".to_string()]
        );
        assert!(generator.specified_fields(&["nope"]).is_err());
    }

    #[test]
    fn test_sorts_render_null_handling() {
        let orders = [Order::asc("a").with_null_handling(NullHandling::NullsLast)];
        assert_eq!(Sorts::render(&orders), "a ASC NULLS LAST");
        assert_eq!(Sorts::render(&[]), "");
    }
}
