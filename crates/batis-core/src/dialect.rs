//! # Dialects
//!
//! Database-family SQL syntax: identifier quoting, paging, function names.
//!
//! ## Built-in Dialects
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Dialect     Quote   Paging clause                                      │
//! │  ──────────  ─────   ────────────────────────────────────────────────  │
//! │  hsqldb      "x"     OFFSET #{offset} LIMIT #{pageSize}                 │
//! │  h2          "x"     LIMIT #{pageSize} OFFSET #{offset}                 │
//! │  sqlite      "x"     LIMIT #{pageSize} OFFSET #{offset}                 │
//! │  postgresql  "x"     LIMIT #{pageSize} OFFSET #{offset}                 │
//! │  mysql       `x`     LIMIT #{offset}, #{pageSize}                       │
//! │  oracle      "x"     OFFSET #{offset} ROWS FETCH NEXT #{pageSize} ...   │
//! │  sqlserver   [x]     [ORDER BY ...] OFFSET #{offset} ROWS FETCH ...     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every dialect is a stateless `'static` singleton. Once a dialect has been
//! chosen for an execution environment it is shared read-only by all
//! statement generation against that environment.

use std::fmt;

/// Parameter holding the zero-based row offset of a page.
pub const OFFSET_PARAM: &str = "offset";

/// Parameter holding the number of rows in a page.
pub const PAGE_SIZE_PARAM: &str = "pageSize";

/// Parameter holding `offset + pageSize`, for row-number based paging.
pub const OFFSET_END_PARAM: &str = "offsetEnd";

// =============================================================================
// Dialect Trait
// =============================================================================

/// SQL syntax of one database family.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Canonical lower-case name, e.g. `"postgresql"`.
    fn name(&self) -> &'static str;

    fn open_quote(&self) -> char {
        '"'
    }

    fn close_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier unless it is already quoted.
    fn quote(&self, identifier: &str) -> String {
        let (open, close) = (self.open_quote(), self.close_quote());
        if identifier.len() >= 2 && identifier.starts_with(open) && identifier.ends_with(close) {
            return identifier.to_string();
        }
        format!("{open}{identifier}{close}")
    }

    /// Wraps a select statement in this family's paging syntax.
    ///
    /// The returned text binds [`OFFSET_PARAM`] and [`PAGE_SIZE_PARAM`]
    /// (and [`OFFSET_END_PARAM`] where needed) as `#{..}` parameters.
    fn paginate(&self, sql: &str) -> String {
        format!("{sql} LIMIT #{{{PAGE_SIZE_PARAM}}} OFFSET #{{{OFFSET_PARAM}}}")
    }

    fn lower_function(&self) -> &'static str {
        "lower"
    }

    fn current_timestamp(&self) -> &'static str {
        "CURRENT_TIMESTAMP"
    }
}

// =============================================================================
// Built-in Dialects
// =============================================================================

/// HyperSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct HsqlDbDialect;

impl Dialect for HsqlDbDialect {
    fn name(&self) -> &'static str {
        "hsqldb"
    }

    fn paginate(&self, sql: &str) -> String {
        format!("{sql} OFFSET #{{{OFFSET_PARAM}}} LIMIT #{{{PAGE_SIZE_PARAM}}}")
    }
}

/// H2.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dialect;

impl Dialect for H2Dialect {
    fn name(&self) -> &'static str {
        "h2"
    }
}

/// SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }
}

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn current_timestamp(&self) -> &'static str {
        "now()"
    }
}

/// MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn open_quote(&self) -> char {
        '`'
    }

    fn close_quote(&self) -> char {
        '`'
    }

    fn paginate(&self, sql: &str) -> String {
        format!("{sql} LIMIT #{{{OFFSET_PARAM}}}, #{{{PAGE_SIZE_PARAM}}}")
    }

    fn current_timestamp(&self) -> &'static str {
        "now()"
    }
}

/// Oracle 12c and later.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

impl Dialect for OracleDialect {
    fn name(&self) -> &'static str {
        "oracle"
    }

    fn paginate(&self, sql: &str) -> String {
        format!(
            "{sql} OFFSET #{{{OFFSET_PARAM}}} ROWS FETCH NEXT #{{{PAGE_SIZE_PARAM}}} ROWS ONLY"
        )
    }

    fn current_timestamp(&self) -> &'static str {
        "SYSTIMESTAMP"
    }
}

/// SQL Server 2012 and later.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn open_quote(&self) -> char {
        '['
    }

    fn close_quote(&self) -> char {
        ']'
    }

    // OFFSET/FETCH is only legal after an ORDER BY.
    fn paginate(&self, sql: &str) -> String {
        let order = if sql.to_ascii_lowercase().contains("order by") {
            ""
        } else {
            " ORDER BY CURRENT_TIMESTAMP"
        };
        format!(
            "{sql}{order} OFFSET #{{{OFFSET_PARAM}}} ROWS FETCH NEXT #{{{PAGE_SIZE_PARAM}}} ROWS ONLY"
        )
    }
}

pub static HSQLDB: HsqlDbDialect = HsqlDbDialect;
pub static H2: H2Dialect = H2Dialect;
pub static SQLITE: SqliteDialect = SqliteDialect;
pub static POSTGRESQL: PostgresDialect = PostgresDialect;
pub static MYSQL: MySqlDialect = MySqlDialect;
pub static ORACLE: OracleDialect = OracleDialect;
pub static SQLSERVER: SqlServerDialect = SqlServerDialect;

// =============================================================================
// Lookup
// =============================================================================

/// Looks up a built-in dialect by name or alias (case-insensitive).
///
/// ## Example
/// ```rust
/// use batis_core::dialect;
///
/// assert_eq!(dialect::by_name("PG").unwrap().name(), "postgresql");
/// assert!(dialect::by_name("db2").is_none());
/// ```
pub fn by_name(name: &str) -> Option<&'static dyn Dialect> {
    match name.trim().to_ascii_lowercase().as_str() {
        "hsql" | "hsqldb" => Some(&HSQLDB),
        "h2" => Some(&H2),
        "sqlite" | "sqlite3" => Some(&SQLITE),
        "postgres" | "postgresql" | "pg" => Some(&POSTGRESQL),
        "mysql" | "mariadb" => Some(&MYSQL),
        "oracle" => Some(&ORACLE),
        "sqlserver" | "mssql" | "sql server" => Some(&SQLSERVER),
        _ => None,
    }
}

/// Classifies a database product name by substring.
///
/// The name is lower-cased first; the first matching fragment wins.
///
/// ## Example
/// ```rust
/// use batis_core::dialect;
///
/// assert_eq!(dialect::for_product_name("HSQL Database Engine").unwrap().name(), "hsqldb");
/// assert!(dialect::for_product_name("unknownDB").is_none());
/// ```
pub fn for_product_name(product_name: &str) -> Option<&'static dyn Dialect> {
    static FRAGMENTS: &[(&str, &'static dyn Dialect)] = &[
        ("hsql", &HSQLDB),
        ("h2", &H2),
        ("sqlite", &SQLITE),
        ("postgres", &POSTGRESQL),
        ("mysql", &MYSQL),
        ("mariadb", &MYSQL),
        ("oracle", &ORACLE),
        ("sql server", &SQLSERVER),
    ];

    let name = product_name.to_lowercase();
    FRAGMENTS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, dialect)| *dialect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_name_classification() {
        let cases = [
            ("HSQL Database Engine", "hsqldb"),
            ("H2", "h2"),
            ("SQLite", "sqlite"),
            ("PostgreSQL", "postgresql"),
            ("MySQL", "mysql"),
            ("MariaDB", "mysql"),
            ("Oracle", "oracle"),
            ("Microsoft SQL Server", "sqlserver"),
        ];
        for (product, expected) in cases {
            let dialect = for_product_name(product).unwrap();
            assert_eq!(dialect.name(), expected, "product {product}");
        }
    }

    #[test]
    fn test_unknown_product_has_no_dialect() {
        assert!(for_product_name("unknownDB").is_none());
        assert!(for_product_name("").is_none());
    }

    #[test]
    fn test_by_name_aliases() {
        assert_eq!(by_name("HSQL").unwrap().name(), "hsqldb");
        assert_eq!(by_name(" mariadb ").unwrap().name(), "mysql");
        assert_eq!(by_name("mssql").unwrap().name(), "sqlserver");
        assert!(by_name("informix").is_none());
    }

    #[test]
    fn test_quoting() {
        assert_eq!(POSTGRESQL.quote("user"), "\"user\"");
        assert_eq!(MYSQL.quote("order"), "`order`");
        assert_eq!(SQLSERVER.quote("key"), "[key]");
        assert_eq!(MYSQL.quote("`already`"), "`already`");
    }

    #[test]
    fn test_paging_clauses() {
        assert_eq!(
            POSTGRESQL.paginate("SELECT * FROM t"),
            "SELECT * FROM t LIMIT #{pageSize} OFFSET #{offset}"
        );
        assert_eq!(
            HSQLDB.paginate("SELECT * FROM t"),
            "SELECT * FROM t OFFSET #{offset} LIMIT #{pageSize}"
        );
        assert_eq!(
            MYSQL.paginate("SELECT * FROM t"),
            "SELECT * FROM t LIMIT #{offset}, #{pageSize}"
        );
        assert_eq!(
            ORACLE.paginate("SELECT * FROM t"),
            "SELECT * FROM t OFFSET #{offset} ROWS FETCH NEXT #{pageSize} ROWS ONLY"
        );
    }

    #[test]
    fn test_sqlserver_paging_requires_order() {
        assert_eq!(
            SQLSERVER.paginate("SELECT * FROM t"),
            "SELECT * FROM t ORDER BY CURRENT_TIMESTAMP OFFSET #{offset} ROWS FETCH NEXT #{pageSize} ROWS ONLY"
        );
        assert_eq!(
            SQLSERVER.paginate("SELECT * FROM t ORDER BY id"),
            "SELECT * FROM t ORDER BY id OFFSET #{offset} ROWS FETCH NEXT #{pageSize} ROWS ONLY"
        );
    }
}
