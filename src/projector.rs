//! In-memory sort, filter and paging of a local row array.

use std::cmp;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::LoadError;
use crate::params::{to_json, ListResult, QueryParams};
use crate::source::Loader;

/// Read access to a row's fields by name.
pub trait FieldAccess {
    fn field(&self, name: &str) -> Option<Value>;
}

/// Dotted paths (`"address.city"`) descend into nested objects.
impl FieldAccess for Value {
    fn field(&self, name: &str) -> Option<Value> {
        let mut current = self;
        for part in name.split('.') {
            current = current.as_object()?.get(part)?;
        }
        Some(current.clone())
    }
}

impl FieldAccess for Map<String, Value> {
    fn field(&self, name: &str) -> Option<Value> {
        let (head, rest) = match name.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (name, None),
        };
        let value = self.get(head)?;
        match rest {
            Some(rest) => value.field(rest),
            None => Some(value.clone()),
        }
    }
}

/// Overrides how the sort key of a row is read for a given field.
pub type SortKeyFn<T> = Arc<dyn Fn(&T, &str) -> Option<Value> + Send + Sync>;

/// Which projection steps run, and how sort keys are extracted.
pub struct ProjectOptions<T> {
    pub sort: bool,
    pub filter: bool,
    pub paginate: bool,
    pub sort_key: Option<SortKeyFn<T>>,
}

impl<T> Default for ProjectOptions<T> {
    fn default() -> Self {
        Self {
            sort: true,
            filter: true,
            paginate: true,
            sort_key: None,
        }
    }
}

impl<T> Clone for ProjectOptions<T> {
    fn clone(&self) -> Self {
        Self {
            sort: self.sort,
            filter: self.filter,
            paginate: self.paginate,
            sort_key: self.sort_key.clone(),
        }
    }
}

/// Sort, filter and page `rows` according to `params`.
///
/// 1. Stable sort by the primary ordering; ties keep input order.
/// 2. Keep rows whose stringified field contains every non-null filter
///    entry (case-sensitive substring match).
/// 3. Slice `[skip, skip + take)` when both are set.
///
/// `total` is always `rows.len()`: the unfiltered, unsliced length, not the
/// filtered count.
pub fn project<T, F>(rows: &[T], params: &QueryParams<F>, options: &ProjectOptions<T>) -> ListResult<T>
where
    T: FieldAccess + Clone,
    F: Serialize,
{
    let total = rows.len();
    let mut projected: Vec<T> = rows.to_vec();

    if options.sort {
        if let Some(ordering) = params.primary_ordering() {
            let key = |row: &T| match &options.sort_key {
                Some(extract) => extract(row, &ordering.field),
                None => row.field(&ordering.field),
            };
            projected.sort_by(|a, b| {
                let ka = key(a).unwrap_or(Value::Null);
                let kb = key(b).unwrap_or(Value::Null);
                ordering.direction.apply(compare_values(&ka, &kb))
            });
        }
    }

    if options.filter {
        let constraints = filter_constraints(params.filter.as_ref());
        if !constraints.is_empty() {
            projected.retain(|row| matches_all(row, &constraints));
        }
    }

    if options.paginate {
        if let (Some(skip), Some(take)) = (params.skip, params.take) {
            projected = projected.into_iter().skip(skip).take(take).collect();
        }
    }

    ListResult::new(projected, Some(total))
}

/// Total order over JSON values: nulls sort last, then by type rank.
pub fn compare_values(a: &Value, b: &Value) -> cmp::Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => cmp::Ordering::Equal,
        (Value::Null, _) => cmp::Ordering::Greater,
        (_, Value::Null) => cmp::Ordering::Less,
        (Value::Number(na), Value::Number(nb)) => {
            let fa = na.as_f64().unwrap_or(f64::NAN);
            let fb = nb.as_f64().unwrap_or(f64::NAN);
            fa.partial_cmp(&fb).unwrap_or(cmp::Ordering::Equal)
        }
        (Value::String(sa), Value::String(sb)) => sa.cmp(sb),
        (Value::Bool(ba), Value::Bool(bb)) => ba.cmp(bb),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

/// Text form used for substring filtering.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Non-null entries of an object-shaped filter. Other filter shapes
/// impose no constraint.
fn filter_constraints<F: Serialize>(filter: Option<&F>) -> Vec<(String, String)> {
    match filter.and_then(to_json) {
        Some(Value::Object(entries)) => entries
            .into_iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(field, value)| (field, stringify(&value)))
            .collect(),
        _ => Vec::new(),
    }
}

fn matches_all<T: FieldAccess>(row: &T, constraints: &[(String, String)]) -> bool {
    constraints.iter().all(|(field, needle)| {
        row.field(field)
            .filter(|value| !value.is_null())
            .is_some_and(|value| stringify(&value).contains(needle.as_str()))
    })
}

/// A [`Loader`] over a fixed in-memory array.
pub struct InMemoryLoader<T> {
    rows: Arc<Vec<T>>,
    options: ProjectOptions<T>,
}

impl<T> InMemoryLoader<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(rows),
            options: ProjectOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ProjectOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }
}

#[async_trait]
impl<T, F> Loader<T, F> for InMemoryLoader<T>
where
    T: FieldAccess + Clone + Send + Sync + 'static,
    F: Serialize + Send + Sync + 'static,
{
    async fn load(&self, params: QueryParams<F>) -> Result<ListResult<T>, LoadError> {
        Ok(project(&self.rows, &params, &self.options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_dotted_path() {
        let row = json!({"address": {"city": "Oslo"}});
        assert_eq!(row.field("address.city"), Some(json!("Oslo")));
        assert_eq!(row.field("address.zip"), None);
    }

    #[test]
    fn test_map_field_access() {
        let row = json!({"a": {"b": 2}, "c": 1});
        let map = row.as_object().unwrap();
        assert_eq!(map.field("c"), Some(json!(1)));
        assert_eq!(map.field("a.b"), Some(json!(2)));
    }

    #[test]
    fn test_compare_values_nulls_last() {
        assert_eq!(compare_values(&Value::Null, &json!(1)), cmp::Ordering::Greater);
        assert_eq!(compare_values(&json!(2), &json!(10)), cmp::Ordering::Less);
        assert_eq!(compare_values(&json!("b"), &json!("a")), cmp::Ordering::Greater);
        assert_eq!(compare_values(&json!(1), &json!("1")), cmp::Ordering::Less);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(stringify(&json!("abc")), "abc");
        assert_eq!(stringify(&json!(42)), "42");
        assert_eq!(stringify(&json!(true)), "true");
    }

    #[test]
    fn test_non_object_filter_is_unconstrained() {
        assert!(filter_constraints(Some(&json!("text"))).is_empty());
        assert!(filter_constraints(Some(&json!({"a": null}))).is_empty());
    }
}
