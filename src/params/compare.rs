//! Structural comparison used for change detection.
//!
//! Values are compared through their JSON form so any serializable filter
//! type works without extra trait bounds.

use serde::Serialize;
use serde_json::Value;

/// Serialize `value` to JSON, or `None` if it has no JSON representation.
pub fn to_json<V: Serialize>(value: &V) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Structural equality bounded to `depth` levels of nesting.
///
/// Scalars always compare by value. Containers found below the depth bound
/// are treated as different, so a too-deep value can only cause an extra
/// save or patch, never a missed one.
pub fn deep_equal_json(a: &Value, b: &Value, depth: usize) -> bool {
    match (a, b) {
        (Value::Object(left), Value::Object(right)) => {
            if depth == 0 {
                return false;
            }
            left.len() == right.len()
                && left.iter().all(|(key, lv)| {
                    right
                        .get(key)
                        .is_some_and(|rv| deep_equal_json(lv, rv, depth - 1))
                })
        }
        (Value::Array(left), Value::Array(right)) => {
            if depth == 0 {
                return false;
            }
            left.len() == right.len()
                && left
                    .iter()
                    .zip(right)
                    .all(|(lv, rv)| deep_equal_json(lv, rv, depth - 1))
        }
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => {
            false
        }
        _ => a == b,
    }
}

/// [`deep_equal_json`] over any two serializable values.
pub fn deep_equal<A: Serialize, B: Serialize>(a: &A, b: &B, depth: usize) -> bool {
    match (to_json(a), to_json(b)) {
        (Some(a), Some(b)) => deep_equal_json(&a, &b, depth),
        _ => false,
    }
}

/// Shallow equality of a form value against the current filter.
///
/// Top-level keys are compared one level deep. Missing keys, `null` and the
/// empty string all count as "no value", so clearing a text box back to ""
/// does not register as a change against an absent filter.
pub fn shallow_equal_coalesced<V: Serialize>(value: &V, previous: Option<&V>) -> bool {
    let current = to_json(value).unwrap_or(Value::Null);
    let previous = previous.and_then(to_json).unwrap_or(Value::Null);

    match (&current, &previous) {
        (Value::Object(_), _) | (_, Value::Object(_)) => {
            let empty = serde_json::Map::new();
            let left = current.as_object().unwrap_or(&empty);
            let right = previous.as_object().unwrap_or(&empty);
            left.keys()
                .chain(right.keys())
                .all(|key| coalesce(left.get(key)) == coalesce(right.get(key)))
        }
        _ => coalesce(Some(&current)) == coalesce(Some(&previous)),
    }
}

fn coalesce(value: Option<&Value>) -> Option<&Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(other) => Some(other),
    }
}
