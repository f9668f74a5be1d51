//! # Paging & Sorting Types
//!
//! Request and result types for listing queries.
//!
//! ## Page Arithmetic
//! ```text
//! Pageable { page: 2, size: 20 }
//!       │
//!       ├── offset()     = page * size   = 40
//!       └── offset_end() = offset + size = 60
//!
//! Page { content: [..20 rows..], total: 95 }
//!       │
//!       ├── total_pages() = ceil(95 / 20) = 5
//!       ├── has_next()    = page + 1 < 5  = true
//!       └── is_first()    = page == 0     = false
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Sort
// =============================================================================

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn is_ascending(&self) -> bool {
        matches!(self, Direction::Asc)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}

/// Placement of NULL values in an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NullHandling {
    /// Whatever the database does.
    #[default]
    Native,
    NullsFirst,
    NullsLast,
}

/// Ordering on one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub property: String,
    pub direction: Direction,
    pub ignore_case: bool,
    pub null_handling: NullHandling,
}

impl Order {
    pub fn new(direction: Direction, property: impl Into<String>) -> Self {
        Order {
            property: property.into(),
            direction,
            ignore_case: false,
            null_handling: NullHandling::Native,
        }
    }

    pub fn asc(property: impl Into<String>) -> Self {
        Self::new(Direction::Asc, property)
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self::new(Direction::Desc, property)
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub fn with_null_handling(mut self, null_handling: NullHandling) -> Self {
        self.null_handling = null_handling;
        self
    }
}

/// An ordered list of [`Order`]s. Serializes as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort {
    orders: Vec<Order>,
}

impl Sort {
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Sorts ascending on each named property.
    pub fn by<I, P>(properties: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Sort {
            orders: properties.into_iter().map(Order::asc).collect(),
        }
    }

    pub fn by_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        Sort {
            orders: orders.into_iter().collect(),
        }
    }

    /// Appends the orders of `other`.
    pub fn and(mut self, other: Sort) -> Self {
        self.orders.extend(other.orders);
        self
    }

    /// Flips every direction to descending.
    pub fn descending(mut self) -> Self {
        for order in &mut self.orders {
            order.direction = Direction::Desc;
        }
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.orders.is_empty()
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order_for(&self, property: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.property == property)
    }
}

// =============================================================================
// Pageable
// =============================================================================

/// A zero-based page request.
///
/// Deserialization goes through the same checks as [`Pageable::sorted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageable")]
pub struct Pageable {
    page: u64,
    size: u64,
    sort: Sort,
}

impl Pageable {
    /// Creates a request for page `page` (zero-based) of `size` rows.
    ///
    /// ## Example
    /// ```rust
    /// use batis_core::domain::Pageable;
    ///
    /// let pageable = Pageable::of(2, 20).unwrap();
    /// assert_eq!(pageable.offset(), 40);
    /// assert!(Pageable::of(0, 0).is_err());
    /// ```
    pub fn of(page: u64, size: u64) -> CoreResult<Self> {
        Self::sorted(page, size, Sort::unsorted())
    }

    pub fn sorted(page: u64, size: u64, sort: Sort) -> CoreResult<Self> {
        if size == 0 {
            return Err(CoreError::InvalidPageable {
                reason: "page size must not be less than one".to_string(),
            });
        }
        if page.checked_mul(size).is_none() {
            return Err(CoreError::InvalidPageable {
                reason: format!("page {page} of size {size} overflows the row offset"),
            });
        }
        Ok(Pageable { page, size, sort })
    }

    pub fn page_number(&self) -> u64 {
        self.page
    }

    pub fn page_size(&self) -> u64 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Row offset of this page, saturating at `u64::MAX`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    pub fn offset_end(&self) -> u64 {
        self.offset().saturating_add(self.size)
    }

    pub fn next(&self) -> Self {
        Pageable {
            page: self.page.saturating_add(1),
            ..self.clone()
        }
    }

    pub fn previous_or_first(&self) -> Self {
        Pageable {
            page: self.page.saturating_sub(1),
            ..self.clone()
        }
    }

    pub fn first(&self) -> Self {
        Pageable {
            page: 0,
            ..self.clone()
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }
}

#[derive(Deserialize)]
struct RawPageable {
    page: u64,
    size: u64,
    #[serde(default)]
    sort: Sort,
}

impl TryFrom<RawPageable> for Pageable {
    type Error = CoreError;

    fn try_from(raw: RawPageable) -> CoreResult<Self> {
        Pageable::sorted(raw.page, raw.size, raw.sort)
    }
}

// =============================================================================
// Page
// =============================================================================

/// One page of results plus the total row count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    content: Vec<T>,
    pageable: Pageable,
    total: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: Pageable, total: u64) -> Self {
        Page {
            content,
            pageable,
            total,
        }
    }

    pub fn content(&self) -> &[T] {
        &self.content
    }

    pub fn into_content(self) -> Vec<T> {
        self.content
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    pub fn total_elements(&self) -> u64 {
        self.total
    }

    pub fn total_pages(&self) -> u64 {
        match self.pageable.page_size() {
            0 => 0,
            size => self.total.div_ceil(size),
        }
    }

    pub fn number(&self) -> u64 {
        self.pageable.page_number()
    }

    pub fn size(&self) -> u64 {
        self.pageable.page_size()
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.number() + 1 < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.pageable.has_previous()
    }

    pub fn is_first(&self) -> bool {
        !self.has_previous()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Converts the content while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            pageable: self.pageable,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pageable_offsets() {
        let pageable = Pageable::of(3, 25).unwrap();
        assert_eq!(pageable.offset(), 75);
        assert_eq!(pageable.offset_end(), 100);
        assert_eq!(pageable.next().page_number(), 4);
        assert_eq!(pageable.previous_or_first().page_number(), 2);
        assert_eq!(pageable.first().page_number(), 0);
        assert_eq!(pageable.first().previous_or_first().page_number(), 0);
    }

    #[test]
    fn test_pageable_rejects_zero_size() {
        assert!(matches!(
            Pageable::of(0, 0),
            Err(CoreError::InvalidPageable { .. })
        ));
        assert!(Pageable::of(u64::MAX, 2).is_err());
    }

    #[test]
    fn test_pageable_deserialize_validates() {
        let err = serde_json::from_value::<Pageable>(json!({"page": 0, "size": 0, "sort": []}));
        assert!(err.is_err());

        let overflow = serde_json::from_value::<Pageable>(json!({"page": u64::MAX, "size": 2}));
        assert!(overflow.is_err());

        let pageable: Pageable = serde_json::from_value(json!({"page": 1, "size": 10})).unwrap();
        assert_eq!(pageable.offset(), 10);
        assert!(!pageable.sort().is_sorted());
    }

    #[test]
    fn test_next_page_near_limit_saturates() {
        let pageable = Pageable::of(u64::MAX / 2, 2).unwrap().next();
        assert_eq!(pageable.offset(), u64::MAX);
        assert_eq!(pageable.offset_end(), u64::MAX);

        let last = Pageable::of(u64::MAX, 1).unwrap();
        assert_eq!(last.next().page_number(), u64::MAX);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], Pageable::of(1, 3).unwrap(), 10);
        assert_eq!(page.total_pages(), 4);
        assert!(page.has_next());
        assert!(page.has_previous());
        assert!(!page.is_first());
        assert_eq!(page.number_of_elements(), 3);

        let last = Page::new(vec![10], Pageable::of(3, 3).unwrap(), 10);
        assert!(last.is_last());

        let empty: Page<i32> = Page::new(vec![], Pageable::of(0, 5).unwrap(), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(empty.is_last());
        assert!(!empty.has_content());
    }

    #[test]
    fn test_page_map_keeps_total() {
        let page = Page::new(vec![1, 2], Pageable::of(0, 2).unwrap(), 7);
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.content(), &[10, 20]);
        assert_eq!(mapped.total_elements(), 7);
    }

    #[test]
    fn test_sort_serializes_as_array() {
        let sort =
            Sort::by(["name"]).and(Sort::by_orders([Order::desc("createdAt").ignore_case()]));
        let value = serde_json::to_value(&sort).unwrap();
        assert_eq!(
            value,
            json!([
                {"property": "name", "direction": "ASC", "ignoreCase": false, "nullHandling": "NATIVE"},
                {"property": "createdAt", "direction": "DESC", "ignoreCase": true, "nullHandling": "NATIVE"}
            ])
        );
    }

    #[test]
    fn test_sort_descending() {
        let sort = Sort::by(["a", "b"]).descending();
        assert!(sort.orders().iter().all(|o| o.direction == Direction::Desc));
        assert!(sort.order_for("b").is_some());
        assert!(!Sort::unsorted().is_sorted());
    }
}
