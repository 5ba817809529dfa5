//! Core query and result types.

use std::cmp;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Direction of a single ordering entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ord: cmp::Ordering) -> cmp::Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// One sort key. Orderings are applied in list order; the first is primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ordering {
    pub field: String,
    pub direction: SortDirection,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Immutable description of paging, sorting and filtering intent.
///
/// `F` is the consumer-defined filter; the engine only compares, clones and
/// serializes it. `orderings` is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "F: Deserialize<'de>"))]
pub struct QueryParams<F = ()> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<usize>,
    #[serde(default)]
    pub orderings: Vec<Ordering>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_total: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<F>,
}

impl<F> Default for QueryParams<F> {
    fn default() -> Self {
        Self {
            skip: None,
            take: None,
            orderings: Vec::new(),
            include_total: None,
            filter: None,
        }
    }
}

impl<F> QueryParams<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    pub fn with_orderings(mut self, orderings: Vec<Ordering>) -> Self {
        self.orderings = orderings;
        self
    }

    pub fn with_include_total(mut self, include_total: bool) -> Self {
        self.include_total = Some(include_total);
        self
    }

    pub fn with_filter(mut self, filter: F) -> Self {
        self.filter = Some(filter);
        self
    }

    /// The primary sort key, if any.
    pub fn primary_ordering(&self) -> Option<&Ordering> {
        self.orderings.first()
    }
}

/// One page of rows plus the total row count when the loader knows it.
///
/// `data` is reference counted so the displayed page can be republished
/// without copying and deduplicated by pointer identity.
#[derive(Debug, PartialEq)]
pub struct ListResult<T> {
    pub data: Arc<Vec<T>>,
    pub total: Option<usize>,
}

impl<T> Clone for ListResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            total: self.total,
        }
    }
}

impl<T> ListResult<T> {
    pub fn new(data: Vec<T>, total: Option<usize>) -> Self {
        Self {
            data: Arc::new(data),
            total,
        }
    }

    /// A page whose total row count is unknown.
    pub fn rows(data: Vec<T>) -> Self {
        Self::new(data, None)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
