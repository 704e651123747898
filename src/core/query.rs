//! Query parameters, pagination and search criteria

use crate::config::PaginationConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw pagination query string parameters
///
/// Both values are kept as strings so that a malformed value falls back to
/// the configured default instead of rejecting the request.
///
/// # Example
/// ```text
/// GET /companies/paginate?page=2&limit=25
/// GET /companies/paginate?page=abc      -> page falls back to 1
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PaginationQuery {
    /// Resolve into concrete page/limit values using `defaults` for
    /// absent, unparsable or zero values.
    pub fn resolve(&self, defaults: &PaginationConfig) -> Pagination {
        Pagination {
            page: parse_positive(self.page.as_deref()).unwrap_or(defaults.default_page.max(1)),
            limit: parse_positive(self.limit.as_deref()).unwrap_or(defaults.default_limit.max(1)),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
}

/// Resolved pagination window (page is 1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
}

impl Pagination {
    /// Number of records to skip
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of records to take
    pub fn take(&self) -> usize {
        self.limit
    }

    /// Index of the last page for `total` records
    pub fn last_page(&self, total: usize) -> usize {
        total.div_ceil(self.limit)
    }
}

/// Paginated response body
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub last_page: usize,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, total: usize, pagination: Pagination) -> Self {
        Self {
            data,
            total,
            page: pagination.page,
            last_page: pagination.last_page(total),
        }
    }
}

/// Body of the `count` operation
#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

/// Equality filter built verbatim from query string parameters
///
/// Every criterion must match for an entity to be selected. Values are
/// compared against the entity's JSON form: strings compare as-is, numbers
/// and booleans compare through their textual representation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SearchCriteria(BTreeMap<String, String>);

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    /// Check whether an entity's JSON form satisfies every criterion
    pub fn matches(&self, entity: &Value) -> bool {
        self.0.iter().all(|(field, expected)| {
            entity
                .get(field)
                .is_some_and(|actual| value_equals(actual, expected))
        })
    }
}

impl From<BTreeMap<String, String>> for SearchCriteria {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

fn value_equals(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Bool(b) => expected.parse::<bool>().is_ok_and(|e| e == *b),
        Value::Number(n) => {
            n.to_string() == expected
                || match (n.as_f64(), expected.parse::<f64>()) {
                    (Some(a), Ok(e)) => a == e,
                    _ => false,
                }
        }
        Value::Null => expected == "null",
        Value::Array(_) | Value::Object(_) => false,
    }
}
