mod common;

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{settle, MockLoader};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tempfile::TempDir;
use viewsource::persist::{
    JsonFileParamsStore, MemoryParamsStore, ParamsStore, PersistOptions,
    PersistedParamsSynchronizer,
};
use viewsource::{ListSource, Ordering, ParamsPatch, PersistError, QueryParams};

fn defaults() -> QueryParams<Value> {
    QueryParams::new()
        .with_skip(0)
        .with_take(25)
        .with_orderings(vec![Ordering::asc("name")])
}

fn source() -> (ListSource<Value, Value>, common::Calls<Value>) {
    let (loader, calls) = MockLoader::paging(100);
    (ListSource::new(loader, defaults()), calls)
}

/// Store whose every operation fails, counting save attempts.
#[derive(Default)]
struct BrokenStore {
    save_attempts: AtomicUsize,
}

#[async_trait]
impl ParamsStore<Value> for BrokenStore {
    async fn load(&self) -> Result<Option<ParamsPatch<Value>>, PersistError> {
        Err(PersistError::Backend {
            message: "storage unavailable".to_string(),
        })
    }

    async fn save(&self, _params: QueryParams<Value>) -> Result<(), PersistError> {
        self.save_attempts.fetch_add(1, AtomicOrdering::SeqCst);
        Err(PersistError::Backend {
            message: "storage unavailable".to_string(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn saved_params_are_merged_over_defaults() {
    let (source, calls) = source();
    let store = Arc::new(MemoryParamsStore::with_saved(
        ParamsPatch::new().skip(5).filter(json!({"x": 1})),
    ));
    let sync = PersistedParamsSynchronizer::start(source.clone(), Arc::clone(&store), PersistOptions::default());
    sync.wait_loaded().await;
    assert!(sync.is_loaded());

    let params = source.query_params();
    assert_eq!(params.skip, Some(5));
    assert_eq!(params.take, Some(25));
    assert_eq!(params.orderings, vec![Ordering::asc("name")]);
    assert_eq!(params.filter, Some(json!({"x": 1})));

    settle().await;
    // The applied value is the baseline and is not written back.
    assert_eq!(store.save_count(), 0);
    assert_eq!(calls.lock().last().unwrap().skip, Some(5));
}

#[tokio::test(start_paused = true)]
async fn reapplying_the_same_value_does_not_save() {
    let (source, _calls) = source();
    let store = Arc::new(MemoryParamsStore::with_saved(
        ParamsPatch::new().filter(json!({"x": 1})),
    ));
    let sync = PersistedParamsSynchronizer::start(source.clone(), Arc::clone(&store), PersistOptions::default());
    sync.wait_loaded().await;

    source.filter(json!({"x": 1}));
    source.refresh();
    settle().await;

    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn settled_change_is_saved_once() {
    let (source, _calls) = source();
    let store = Arc::new(MemoryParamsStore::new());
    let sync = PersistedParamsSynchronizer::start(source.clone(), Arc::clone(&store), PersistOptions::default());
    sync.wait_loaded().await;

    source.page(25, 25);
    source.page(50, 25);
    source.sort(vec![Ordering::desc("id")]);
    settle().await;

    let saves = store.saves();
    assert_eq!(saves.len(), 1);
    assert_eq!(saves[0].skip, Some(50));
    assert_eq!(saves[0].orderings, vec![Ordering::desc("id")]);

    // Loading back yields the last saved value.
    let patch = store.load().await.unwrap().unwrap();
    assert_eq!(defaults().merged(patch), saves[0]);
}

#[tokio::test(start_paused = true)]
async fn failed_load_keeps_defaults_and_failed_save_is_not_retried() {
    let (source, _calls) = source();
    let store = Arc::new(BrokenStore::default());
    let sync = PersistedParamsSynchronizer::start(source.clone(), Arc::clone(&store), PersistOptions::default());
    sync.wait_loaded().await;
    assert_eq!(source.query_params(), defaults());

    source.page(25, 25);
    settle().await;
    settle().await;
    assert_eq!(store.save_attempts.load(AtomicOrdering::SeqCst), 1);

    // The next change is attempted again since nothing was saved.
    source.page(50, 25);
    settle().await;
    assert_eq!(store.save_attempts.load(AtomicOrdering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn empty_saved_patch_is_ignored() {
    let (source, _calls) = source();
    let store = Arc::new(MemoryParamsStore::with_saved(ParamsPatch::new()));
    let sync = PersistedParamsSynchronizer::start(source.clone(), Arc::clone(&store), PersistOptions::default());
    sync.wait_loaded().await;

    assert_eq!(source.query_params(), defaults());
}

#[tokio::test]
async fn json_file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let store: JsonFileParamsStore<Value> =
        JsonFileParamsStore::new(dir.path().join("nested").join("params.json"));

    assert!(store.load().await.unwrap().is_none());

    let params = defaults().with_skip(75).with_filter(json!({"name": "bob"}));
    store.save(params.clone()).await.unwrap();
    assert!(store.path().exists());

    let patch = store.load().await.unwrap().unwrap();
    assert_eq!(patch.skip, Some(Some(75)));
    assert_eq!(patch.take, Some(Some(25)));
    assert_eq!(QueryParams::new().merged(patch), params);
}

#[tokio::test]
async fn json_file_store_treats_empty_file_as_unsaved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    std::fs::write(&path, "  \n").unwrap();

    let store: JsonFileParamsStore<Value> = JsonFileParamsStore::new(&path);
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn json_file_store_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    std::fs::write(&path, "{not json").unwrap();

    let store: JsonFileParamsStore<Value> = JsonFileParamsStore::new(&path);
    let err = store.load().await.unwrap_err();
    assert!(matches!(err, PersistError::Serialize(_)));
}

#[tokio::test]
async fn synchronizer_restores_from_file_written_earlier() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("params.json");
    let options = PersistOptions {
        debounce: Duration::from_millis(20),
        ..PersistOptions::default()
    };

    {
        let (source, _calls) = source();
        let store = Arc::new(JsonFileParamsStore::<Value>::new(&path));
        let sync = PersistedParamsSynchronizer::start(source.clone(), store, options.clone());
        sync.wait_loaded().await;
        source.filter(json!({"team": "red"}));
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    let (source, _calls) = source();
    let store = Arc::new(JsonFileParamsStore::<Value>::new(&path));
    let sync = PersistedParamsSynchronizer::start(source.clone(), store, options);
    sync.wait_loaded().await;
    assert_eq!(source.query_params().filter, Some(json!({"team": "red"})));
}

/// A filter type that is neither `Default` nor JSON-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct AgeRange {
    min: u32,
    max: u32,
}

#[tokio::test]
async fn json_file_store_accepts_filter_without_default() {
    let dir = TempDir::new().unwrap();
    let store: JsonFileParamsStore<AgeRange> =
        JsonFileParamsStore::new(dir.path().join("params.json"));

    let params = QueryParams::new()
        .with_skip(10)
        .with_filter(AgeRange { min: 18, max: 30 });
    store.save(params.clone()).await.unwrap();

    let patch = store.load().await.unwrap().unwrap();
    assert_eq!(patch.filter, Some(Some(AgeRange { min: 18, max: 30 })));
    assert_eq!(QueryParams::new().merged(patch), params);
}
