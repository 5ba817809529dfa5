use std::sync::Arc;

use serde_json::{json, Value};
use viewsource::projector::{project, InMemoryLoader, ProjectOptions};
use viewsource::{Loader, Ordering, QueryParams};

fn people() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Carol", "team": "red"}),
        json!({"id": 2, "name": "alice", "team": "blue"}),
        json!({"id": 3, "name": "Bob", "team": "red"}),
        json!({"id": 4, "name": "Alice", "team": "green"}),
        json!({"id": 5, "name": "Bob", "team": "blue"}),
    ]
}

fn ids(rows: &[Value]) -> Vec<i64> {
    rows.iter().map(|row| row["id"].as_i64().unwrap()).collect()
}

fn params() -> QueryParams<Value> {
    QueryParams::new()
}

#[test]
fn sorts_ascending_and_keeps_ties_in_input_order() {
    let result = project(
        &people(),
        &params().with_orderings(vec![Ordering::asc("name")]),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![4, 3, 5, 1, 2]);
}

#[test]
fn sorts_descending_and_keeps_ties_in_input_order() {
    let result = project(
        &people(),
        &params().with_orderings(vec![Ordering::desc("team")]),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![1, 3, 4, 2, 5]);
}

#[test]
fn only_primary_ordering_is_used() {
    let result = project(
        &people(),
        &params().with_orderings(vec![Ordering::asc("team"), Ordering::desc("id")]),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![2, 5, 4, 1, 3]);
}

#[test]
fn filter_is_case_sensitive_substring() {
    let result = project(
        &people(),
        &params().with_filter(json!({"name": "lice"})),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![2, 4]);

    let result = project(
        &people(),
        &params().with_filter(json!({"name": "Ali"})),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![4]);
}

#[test]
fn every_filter_entry_must_match() {
    let result = project(
        &people(),
        &params().with_filter(json!({"name": "Bob", "team": "blu"})),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![5]);
}

#[test]
fn null_filter_entries_are_ignored() {
    let result = project(
        &people(),
        &params().with_filter(json!({"name": null, "team": "red"})),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![1, 3]);
}

#[test]
fn numbers_are_matched_by_their_text() {
    let result = project(
        &people(),
        &params().with_filter(json!({"id": 3})),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data), vec![3]);
}

#[test]
fn slicing_needs_both_skip_and_take() {
    let rows = people();

    let only_skip = project(&rows, &params().with_skip(3), &ProjectOptions::default());
    assert_eq!(only_skip.len(), 5);

    let only_take = project(&rows, &params().with_take(1), &ProjectOptions::default());
    assert_eq!(only_take.len(), 5);

    let both = project(
        &rows,
        &params().with_skip(1).with_take(2),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&both.data), vec![2, 3]);

    let past_end = project(
        &rows,
        &params().with_skip(4).with_take(10),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&past_end.data), vec![5]);
}

#[test]
fn total_reports_unfiltered_length() {
    let result = project(
        &people(),
        &params()
            .with_filter(json!({"team": "red"}))
            .with_skip(0)
            .with_take(1),
        &ProjectOptions::default(),
    );
    assert_eq!(result.len(), 1);
    assert_eq!(result.total, Some(5));
}

#[test]
fn sorting_sorted_input_is_identity() {
    let sort = params().with_orderings(vec![Ordering::asc("name")]);
    let once = project(&people(), &sort, &ProjectOptions::default());
    let twice = project(&once.data, &sort, &ProjectOptions::default());
    assert_eq!(once.data, twice.data);
}

#[test]
fn full_window_returns_every_row() {
    let rows = people();
    let result = project(
        &rows,
        &params().with_skip(0).with_take(rows.len()),
        &ProjectOptions::default(),
    );
    assert_eq!(*result.data, rows);
}

#[test]
fn missing_sort_field_sorts_last() {
    let mut rows = people();
    rows.insert(0, json!({"id": 0, "team": "none"}));
    let result = project(
        &rows,
        &params().with_orderings(vec![Ordering::asc("name")]),
        &ProjectOptions::default(),
    );
    assert_eq!(ids(&result.data).last(), Some(&0));
}

#[test]
fn disabled_steps_are_skipped() {
    let options = ProjectOptions {
        sort: false,
        paginate: false,
        ..ProjectOptions::default()
    };
    let result = project(
        &people(),
        &params()
            .with_orderings(vec![Ordering::desc("id")])
            .with_filter(json!({"team": "blue"}))
            .with_skip(1)
            .with_take(1),
        &options,
    );
    assert_eq!(ids(&result.data), vec![2, 5]);
}

#[test]
fn custom_sort_key_overrides_field_lookup() {
    let options = ProjectOptions {
        sort_key: Some(Arc::new(|row: &Value, field: &str| {
            row[field].as_str().map(|name| json!(name.to_lowercase()))
        })),
        ..ProjectOptions::default()
    };
    let result = project(
        &people(),
        &params().with_orderings(vec![Ordering::asc("name")]),
        &options,
    );
    assert_eq!(ids(&result.data), vec![2, 4, 3, 5, 1]);
}

#[tokio::test]
async fn in_memory_loader_projects_its_rows() {
    let loader = InMemoryLoader::new(people());
    assert_eq!(loader.rows().len(), 5);

    let result = loader
        .load(
            params()
                .with_orderings(vec![Ordering::desc("id")])
                .with_skip(0)
                .with_take(2),
        )
        .await
        .unwrap();
    assert_eq!(ids(&result.data), vec![5, 4]);
    assert_eq!(result.total, Some(5));
}
