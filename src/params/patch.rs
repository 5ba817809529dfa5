use serde::{Deserialize, Serialize};

use super::types::{Ordering, QueryParams};

/// A partial update of [`QueryParams`].
///
/// Each outer `None` leaves the current value alone; `Some(None)` clears it.
/// `orderings` is replaced wholesale, never merged entry by entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "F: Deserialize<'de>"))]
pub struct ParamsPatch<F = ()> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<Option<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub take: Option<Option<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orderings: Option<Vec<Ordering>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_total: Option<Option<bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Option<F>>,
}

impl<F> Default for ParamsPatch<F> {
    fn default() -> Self {
        Self {
            skip: None,
            take: None,
            orderings: None,
            include_total: None,
            filter: None,
        }
    }
}

impl<F> ParamsPatch<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(Some(skip));
        self
    }

    pub fn take(mut self, take: usize) -> Self {
        self.take = Some(Some(take));
        self
    }

    /// Clear `take`, meaning "all remaining rows".
    pub fn clear_take(mut self) -> Self {
        self.take = Some(None);
        self
    }

    pub fn orderings(mut self, orderings: Vec<Ordering>) -> Self {
        self.orderings = Some(orderings);
        self
    }

    pub fn include_total(mut self, include_total: bool) -> Self {
        self.include_total = Some(Some(include_total));
        self
    }

    pub fn filter(mut self, filter: F) -> Self {
        self.filter = Some(Some(filter));
        self
    }

    pub fn clear_filter(mut self) -> Self {
        self.filter = Some(None);
        self
    }

    /// True when applying this patch would not touch any key.
    pub fn is_empty(&self) -> bool {
        self.skip.is_none()
            && self.take.is_none()
            && self.orderings.is_none()
            && self.include_total.is_none()
            && self.filter.is_none()
    }

    /// Shallow-merge this patch over `params`.
    pub fn apply_to(self, params: &mut QueryParams<F>) {
        if let Some(skip) = self.skip {
            params.skip = skip;
        }
        if let Some(take) = self.take {
            params.take = take;
        }
        if let Some(orderings) = self.orderings {
            params.orderings = orderings;
        }
        if let Some(include_total) = self.include_total {
            params.include_total = include_total;
        }
        if let Some(filter) = self.filter {
            params.filter = filter;
        }
    }
}

impl<F> QueryParams<F> {
    /// Return a copy of these params with `patch` merged over them.
    pub fn merged(mut self, patch: ParamsPatch<F>) -> Self {
        patch.apply_to(&mut self);
        self
    }
}

/// Every key of a full params value, as a patch that overwrites everything.
impl<F> From<QueryParams<F>> for ParamsPatch<F> {
    fn from(params: QueryParams<F>) -> Self {
        Self {
            skip: Some(params.skip),
            take: Some(params.take),
            orderings: Some(params.orderings),
            include_total: Some(params.include_total),
            filter: Some(params.filter),
        }
    }
}
