use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::FilterError;

/// A column value as seen by predicates, sorting and parameter binding.
/// Every variant carries an `Option` so NULLs stay typed when bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Bool(Option<bool>),
    Int(Option<i64>),
    Decimal(Option<Decimal>),
    Text(Option<String>),
    Timestamp(Option<DateTime<Utc>>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Decimal(v) => v.is_none(),
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
        }
    }

    /// SQL-style comparison: NULL on either side or mismatched types compare as unknown.
    pub fn compare(&self, other: &SqlValue) -> Option<Ordering> {
        match (self, other) {
            (SqlValue::Bool(Some(a)), SqlValue::Bool(Some(b))) => Some(a.cmp(b)),
            (SqlValue::Int(Some(a)), SqlValue::Int(Some(b))) => Some(a.cmp(b)),
            (SqlValue::Decimal(Some(a)), SqlValue::Decimal(Some(b))) => Some(a.cmp(b)),
            (SqlValue::Int(Some(a)), SqlValue::Decimal(Some(b))) => Some(Decimal::from(*a).cmp(b)),
            (SqlValue::Decimal(Some(a)), SqlValue::Int(Some(b))) => Some(a.cmp(&Decimal::from(*b))),
            (SqlValue::Text(Some(a)), SqlValue::Text(Some(b))) => Some(a.cmp(b)),
            (SqlValue::Timestamp(Some(a)), SqlValue::Timestamp(Some(b))) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(Some(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(Some(v))
    }
}

impl From<Option<i64>> for SqlValue {
    fn from(v: Option<i64>) -> Self {
        SqlValue::Int(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(Some(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(Some(v))
    }
}

impl From<Option<String>> for SqlValue {
    fn from(v: Option<String>) -> Self {
        SqlValue::Text(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(Some(v))
    }
}

impl From<Option<DateTime<Utc>>> for SqlValue {
    fn from(v: Option<DateTime<Utc>>) -> Self {
        SqlValue::Timestamp(v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: &'static str,
    pub sort: SortDirection,
}

/// Zero-based page request, size already capped by configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>, size: Option<i64>) -> Result<Self, FilterError> {
        let filter_config = &crate::config::config().filter;
        Self::with_limits(page, size, filter_config.default_page_size, filter_config.max_page_size)
    }

    pub fn with_limits(
        page: Option<i64>,
        size: Option<i64>,
        default_size: i64,
        max_size: i64,
    ) -> Result<Self, FilterError> {
        let page = page.unwrap_or(0);
        if page < 0 {
            return Err(FilterError::InvalidPage("Page must be non-negative".to_string()));
        }

        let size = size.unwrap_or(default_size);
        if size < 1 {
            return Err(FilterError::InvalidPageSize("Page size must be at least 1".to_string()));
        }
        let size = if size > max_size {
            if crate::config::config().filter.debug_logging {
                tracing::warn!("Page size {} exceeds max {}, capping to max", size, max_size);
            }
            max_size
        } else {
            size
        };

        Ok(Self { page, size })
    }

    /// Everything on a single page, for unpaged reads.
    pub fn unpaged() -> Self {
        Self { page: 0, size: i64::MAX }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements - 1) / request.size + 1
        };
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_caps_size_and_rejects_negatives() {
        let req = PageRequest::with_limits(Some(2), Some(500), 20, 100).unwrap();
        assert_eq!(req, PageRequest { page: 2, size: 100 });
        assert_eq!(req.offset(), 200);

        assert_eq!(PageRequest::with_limits(None, None, 20, 100).unwrap().size, 20);
        assert!(PageRequest::with_limits(Some(-1), None, 20, 100).is_err());
        assert!(PageRequest::with_limits(None, Some(0), 20, 100).is_err());
    }

    #[test]
    fn page_counts_partial_last_page() {
        let req = PageRequest { page: 0, size: 10 };
        let page = Page::new(vec![1, 2, 3], &req, 21);
        assert_eq!(page.total_pages, 3);
        assert_eq!(Page::<i32>::new(vec![], &req, 0).total_pages, 0);
    }

    #[test]
    fn null_values_never_compare() {
        assert_eq!(SqlValue::Int(None).compare(&SqlValue::Int(None)), None);
        assert_eq!(
            SqlValue::Int(Some(3)).compare(&SqlValue::Decimal(Some(Decimal::new(25, 1)))),
            Some(Ordering::Greater)
        );
    }
}
