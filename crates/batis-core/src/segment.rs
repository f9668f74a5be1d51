//! # SQL Segments
//!
//! Immutable fragments that generated statements are assembled from.
//!
//! ## Segment Kinds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Segment                                        │
//! │                                                                         │
//! │  ┌───────────────────────────┐   ┌───────────────────────────────────┐ │
//! │  │ Sql (literal)             │   │ MethodInvocation (placeholder)    │ │
//! │  │ ───────────────────────── │   │ ───────────────────────────────── │ │
//! │  │ "SELECT", "AND", "&lt;"   │   │ @batis::Sorts@render(sorts)       │ │
//! │  │ renders verbatim          │   │ expanded later by the engine's    │ │
//! │  │                           │   │ template language, never here     │ │
//! │  └───────────────────────────┘   └───────────────────────────────────┘ │
//! │                                                                         │
//! │  Segments ── concatenates with single spaces, skips empty fragments    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Comparison operators keep their XML-escaped spelling (`&gt;`, `&lt;`)
//! because statement bodies are XML scripts.

use std::borrow::Cow;
use std::fmt;

// =============================================================================
// Literal SQL
// =============================================================================

/// A literal SQL token.
///
/// ## Example
/// ```rust
/// use batis_core::segment::Sql;
///
/// assert_eq!(Sql::new("SELECT").to_string(), "SELECT");
/// assert_eq!(Sql::ROOT_ALIAS.to_string(), "__root");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sql(Cow<'static, str>);

impl Sql {
    pub const EMPTY: Sql = Sql::from_static("");
    pub const QUOTE: Sql = Sql::from_static("'");
    /// Percent wildcard, quoted.
    pub const PAH: Sql = Sql::from_static("'%'");
    pub const EQUALS: Sql = Sql::from_static("=");
    pub const GREATER_THAN: Sql = Sql::from_static("&gt;");
    pub const GREATER_THAN_EQUAL: Sql = Sql::from_static("&gt;=");
    pub const LESS_THAN: Sql = Sql::from_static("&lt;");
    pub const LESS_THAN_EQUAL: Sql = Sql::from_static("&lt;=");
    pub const NOT_EQUALS: Sql = Sql::from_static("&lt;&gt;");
    pub const BETWEEN: Sql = Sql::from_static("BETWEEN");
    pub const LIKE: Sql = Sql::from_static("LIKE");
    pub const NOT_LIKE: Sql = Sql::from_static("NOT LIKE");
    pub const FROM: Sql = Sql::from_static("FROM");
    pub const WHERE: Sql = Sql::from_static("WHERE");
    pub const SET: Sql = Sql::from_static("SET");
    pub const VALUES: Sql = Sql::from_static("VALUES");
    pub const IN: Sql = Sql::from_static("IN");
    pub const ORDER_BY: Sql = Sql::from_static("ORDER BY");
    pub const SELECT: Sql = Sql::from_static("SELECT");
    pub const DISTINCT: Sql = Sql::from_static("DISTINCT");
    pub const UPDATE: Sql = Sql::from_static("UPDATE");
    pub const DELETE_FROM: Sql = Sql::from_static("DELETE FROM");
    pub const INSERT_INTO: Sql = Sql::from_static("INSERT INTO");
    /// `COUNT(*)`
    pub const COUNTS: Sql = Sql::from_static("COUNT(*)");
    pub const OR: Sql = Sql::from_static("OR");
    pub const AND: Sql = Sql::from_static("AND");
    pub const TRUE: Sql = Sql::from_static("TRUE");
    pub const FALSE: Sql = Sql::from_static("FALSE");
    /// Alias of the entity's own table in generated selects.
    pub const ROOT_ALIAS: Sql = Sql::from_static("__root");

    /// Wraps a static string without allocating.
    pub const fn from_static(value: &'static str) -> Self {
        Sql(Cow::Borrowed(value))
    }

    /// Creates a literal from any string.
    pub fn new(value: impl Into<Cow<'static, str>>) -> Self {
        Sql(value.into())
    }

    /// Returns the literal text.
    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Sql {
    fn from(value: &'static str) -> Self {
        Sql::from_static(value)
    }
}

impl From<String> for Sql {
    fn from(value: String) -> Self {
        Sql(Cow::Owned(value))
    }
}

// =============================================================================
// Method Invocation
// =============================================================================

/// A deferred call to a static function, resolved by the template expander.
///
/// Renders as `@<type>@<method>(<p1>,<p2>)`.
///
/// ## Example
/// ```rust
/// use batis_core::segment::MethodInvocation;
///
/// let call = MethodInvocation::new("pkg.Type", "method", Vec::<String>::new());
/// assert_eq!(call.to_string(), "@pkg.Type@method()");
///
/// let call = MethodInvocation::new("pkg.Type", "render", ["sorts", "alias"]);
/// assert_eq!(call.to_string(), "@pkg.Type@render(sorts,alias)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodInvocation {
    static_type: Cow<'static, str>,
    method_name: Cow<'static, str>,
    parameters: Vec<String>,
}

impl MethodInvocation {
    /// Creates a placeholder for an explicitly named owning type.
    pub fn new<I, P>(
        static_type: impl Into<Cow<'static, str>>,
        method_name: impl Into<Cow<'static, str>>,
        parameters: I,
    ) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        MethodInvocation {
            static_type: static_type.into(),
            method_name: method_name.into(),
            parameters: parameters.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a placeholder owned by `T`, using its Rust type path.
    pub fn of<T: ?Sized>(method_name: &'static str, parameters: &[&str]) -> Self {
        Self::new(
            std::any::type_name::<T>(),
            method_name,
            parameters.iter().copied(),
        )
    }

    pub fn static_type(&self) -> &str {
        &self.static_type
    }

    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
}

impl fmt::Display for MethodInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "@{}@{}({})",
            self.static_type,
            self.method_name,
            self.parameters.join(",")
        )
    }
}

// =============================================================================
// Segment
// =============================================================================

/// Either a literal or a method placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Sql(Sql),
    Method(MethodInvocation),
}

impl Segment {
    fn is_empty(&self) -> bool {
        match self {
            Segment::Sql(sql) => sql.is_empty(),
            Segment::Method(_) => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Sql(sql) => fmt::Display::fmt(sql, f),
            Segment::Method(call) => fmt::Display::fmt(call, f),
        }
    }
}

impl From<Sql> for Segment {
    fn from(value: Sql) -> Self {
        Segment::Sql(value)
    }
}

impl From<MethodInvocation> for Segment {
    fn from(value: MethodInvocation) -> Self {
        Segment::Method(value)
    }
}

impl From<&'static str> for Segment {
    fn from(value: &'static str) -> Self {
        Segment::Sql(Sql::from_static(value))
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Segment::Sql(Sql::from(value))
    }
}

// =============================================================================
// Composition
// =============================================================================

/// An ordered run of segments rendered space-separated.
///
/// ## Example
/// ```rust
/// use batis_core::segment::{Segments, Sql};
///
/// let sql = Segments::new()
///     .push(Sql::SELECT)
///     .push(Sql::COUNTS)
///     .push(Sql::EMPTY)
///     .push(Sql::FROM)
///     .push("t_user");
/// assert_eq!(sql.to_string(), "SELECT COUNT(*) FROM t_user");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments(Vec<Segment>);

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one segment.
    pub fn push(mut self, segment: impl Into<Segment>) -> Self {
        self.0.push(segment.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(Segment::is_empty)
    }
}

impl fmt::Display for Segments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in self.0.iter().filter(|s| !s.is_empty()) {
            if !first {
                f.write_str(" ")?;
            }
            fmt::Display::fmt(segment, f)?;
            first = false;
        }
        Ok(())
    }
}

impl From<Segments> for Segment {
    fn from(value: Segments) -> Self {
        Segment::Sql(Sql::from(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_renders_verbatim() {
        assert_eq!(Sql::new("SELECT").to_string(), "SELECT");
        assert_eq!(Sql::from(String::from("t_user")).to_string(), "t_user");
        assert_eq!(Sql::EMPTY.to_string(), "");
    }

    #[test]
    fn test_keyword_constants() {
        assert_eq!(Sql::COUNTS.value(), "COUNT(*)");
        assert_eq!(Sql::NOT_EQUALS.value(), "&lt;&gt;");
        assert_eq!(Sql::GREATER_THAN_EQUAL.value(), "&gt;=");
        assert_eq!(Sql::PAH.value(), "'%'");
        assert_eq!(Sql::DELETE_FROM.value(), "DELETE FROM");
        assert_eq!(Sql::ROOT_ALIAS.value(), "__root");
    }

    #[test]
    fn test_method_invocation_without_parameters() {
        let call = MethodInvocation::new("pkg.Type", "method", Vec::<String>::new());
        assert_eq!(call.to_string(), "@pkg.Type@method()");
        assert!(call.parameters().is_empty());
    }

    #[test]
    fn test_method_invocation_joins_parameters() {
        let call = MethodInvocation::new("pkg.Type", "render", ["sorts", "alias"]);
        assert_eq!(call.to_string(), "@pkg.Type@render(sorts,alias)");
        assert_eq!(call.static_type(), "pkg.Type");
        assert_eq!(call.method_name(), "render");
    }

    #[test]
    fn test_method_invocation_of_type() {
        struct Helper;
        let call = MethodInvocation::of::<Helper>("columns", &["fields"]);
        assert!(call.static_type().ends_with("Helper"));
        assert!(call.to_string().ends_with("Helper@columns(fields)"));
    }

    #[test]
    fn test_segments_skip_empty_fragments() {
        let call = MethodInvocation::new("pkg.Sorts", "render", ["sorts"]);
        let rendered = Segments::new()
            .push(Sql::SELECT)
            .push(Sql::EMPTY)
            .push("id")
            .push(Sql::FROM)
            .push("t_user")
            .push(Sql::ORDER_BY)
            .push(call)
            .to_string();
        assert_eq!(
            rendered,
            "SELECT id FROM t_user ORDER BY @pkg.Sorts@render(sorts)"
        );
    }

    #[test]
    fn test_empty_segments() {
        assert!(Segments::new().is_empty());
        assert!(Segments::new().push(Sql::EMPTY).is_empty());
        assert_eq!(Segments::new().to_string(), "");
    }
}
