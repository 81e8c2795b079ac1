//! Integration Tests for the Cache Facade
//!
//! Drives the public API end to end against the in-process backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Duration;
use keyed_cache::backend::{Connector, KvBackend, ManualClock, MemoryConnector, MemoryStore};
use keyed_cache::error::BackendResult;
use keyed_cache::{
    BackendError, Cache, CacheConfig, CacheError, Completion, ConnectionParams, ErrorSink,
    ExpiryMode, JsonObject, KeyFragment, Outcome,
};
use serde_json::{json, Value};

// == Helper Types ==

#[derive(Default)]
struct RecordingSink {
    entries: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }
}

impl ErrorSink for RecordingSink {
    fn error(&self, detail: &str) {
        self.entries.lock().unwrap().push(detail.to_string());
    }
}

struct RefusingConnector;

#[async_trait]
impl Connector for RefusingConnector {
    async fn connect(&self, _params: &ConnectionParams) -> BackendResult<Box<dyn KvBackend>> {
        Err(BackendError::Unavailable("connection refused".to_string()))
    }
}

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn memory_cache(config: CacheConfig, store: MemoryStore) -> Cache {
    init_tracing();
    let mut cache = Cache::with_connector(config, Arc::new(MemoryConnector::new(store))).unwrap();
    cache.initialize().await.unwrap();
    cache
}

fn user_42() -> Vec<KeyFragment> {
    vec!["user".into(), 42.into()]
}

fn object(value: Value) -> JsonObject {
    value.as_object().cloned().unwrap()
}

fn completed<T: std::fmt::Debug>(outcome: Outcome<T>) -> Completion<T> {
    outcome
        .into_completion()
        .expect("operation should reach the completion channel")
}

// == Scenarios ==

#[tokio::test]
async fn test_save_then_get_value() {
    let store = MemoryStore::new();
    let cache = memory_cache(CacheConfig::default(), store.clone()).await;

    let saved = completed(cache.save_value(&user_42(), json!(100)).await.unwrap());
    assert_eq!(saved.unwrap(), json!(100));

    let read = completed(cache.get_value(&user_42()).await.unwrap());
    assert_eq!(read.unwrap(), Some(json!(100)));
    assert_eq!(store.get("user:42").await.unwrap().as_deref(), Some("100"));
}

#[tokio::test]
async fn test_save_then_get_object() {
    let cache = memory_cache(CacheConfig::default(), MemoryStore::new()).await;
    let user = object(json!({"name": "a", "age": 1}));

    let saved = completed(cache.save_object(&user_42(), user.clone()).await.unwrap());
    assert_eq!(saved.unwrap(), user);

    let read = completed(cache.get_object(&user_42()).await.unwrap());
    assert_eq!(read.unwrap(), Some(user));
}

#[tokio::test]
async fn test_delete_then_get_value() {
    let cache = memory_cache(CacheConfig::default(), MemoryStore::new()).await;
    let _ = cache.save_value(&user_42(), json!(100)).await.unwrap();

    let removed = completed(cache.delete_entry(&user_42()).await.unwrap());
    assert_eq!(removed.unwrap(), 1);

    let read = completed(cache.get_value(&user_42()).await.unwrap());
    assert_eq!(read.unwrap(), None);
}

#[tokio::test]
async fn test_get_value_never_written() {
    let cache = memory_cache(CacheConfig::default(), MemoryStore::new()).await;

    let read = completed(cache.get_value(&["test-string".into()]).await.unwrap());
    assert_eq!(read.unwrap(), None);
}

#[tokio::test]
async fn test_array_value_round_trip() {
    let cache = memory_cache(CacheConfig::default(), MemoryStore::new()).await;
    let value = json!([1, "two", {"three": [3]}, null, true]);

    let _ = cache.save_value(&["list".into()], value.clone()).await.unwrap();

    let read = completed(cache.get_value(&["list".into()]).await.unwrap());
    assert_eq!(read.unwrap(), Some(value));
}

#[tokio::test]
async fn test_empty_value_performs_no_write() {
    let store = MemoryStore::new();
    let cache = memory_cache(CacheConfig::default(), store.clone()).await;

    let saved = completed(cache.save_value(&user_42(), Value::Null).await.unwrap());
    assert_eq!(saved.unwrap(), Value::Null);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unsupported_provider_fails_before_initialize() {
    let sink = Arc::new(RecordingSink::default());
    let config = CacheConfig::default()
        .with_provider_type("unsupported-x")
        .with_logger(sink.clone());

    let result = Cache::with_connector(config, Arc::new(MemoryConnector::default()));

    assert!(matches!(result, Err(CacheError::Config(_))));
    assert!(sink.entries().is_empty(), "construction never uses the sink");
}

// == Expiration ==

#[tokio::test]
async fn test_entries_expire_after_max_time() {
    let clock = Arc::new(ManualClock::default());
    let store = MemoryStore::with_clock(clock.clone());
    let cache = memory_cache(CacheConfig::default().with_max_time(2), store.clone()).await;

    let _ = cache.save_value(&["v".into()], json!("scalar")).await.unwrap();
    let _ = cache
        .save_object(&["o".into()], object(json!({"k": 1})))
        .await
        .unwrap();
    assert_eq!(store.ttl("v").await, Some(2));
    assert_eq!(store.ttl("o").await, Some(2));

    clock.advance(Duration::seconds(1));
    let read = completed(cache.get_value(&["v".into()]).await.unwrap());
    assert_eq!(read.unwrap(), Some(json!("scalar")));

    clock.advance(Duration::seconds(1));
    let value = completed(cache.get_value(&["v".into()]).await.unwrap());
    let obj = completed(cache.get_object(&["o".into()]).await.unwrap());
    assert_eq!(value.unwrap(), None);
    assert_eq!(obj.unwrap(), None);
}

#[tokio::test]
async fn test_atomic_expiry_mode() {
    let clock = Arc::new(ManualClock::default());
    let store = MemoryStore::with_clock(clock.clone());
    let config = CacheConfig::default()
        .with_max_time(60)
        .with_expiry_mode(ExpiryMode::Atomic);
    let cache = memory_cache(config, store.clone()).await;

    let _ = cache.save_value(&user_42(), json!(1)).await.unwrap();
    assert_eq!(store.ttl("user:42").await, Some(60));

    clock.advance(Duration::seconds(61));
    let read = completed(cache.get_value(&user_42()).await.unwrap());
    assert_eq!(read.unwrap(), None);
}

// == Error Routing ==

#[tokio::test]
async fn test_empty_fragments_fail_loudly_without_sink() {
    let cache = memory_cache(CacheConfig::default(), MemoryStore::new()).await;

    let result = cache.save_value(&[], json!(1)).await;
    assert!(matches!(result, Err(CacheError::Key(_))));
}

#[tokio::test]
async fn test_empty_fragments_reported_with_sink() {
    let sink = Arc::new(RecordingSink::default());
    let store = MemoryStore::new();
    let cache = memory_cache(CacheConfig::default().with_logger(sink.clone()), store.clone()).await;

    let outcome = cache.save_value(&[], json!(1)).await.unwrap();

    assert!(outcome.is_reported());
    assert!(outcome.into_completion().is_none());
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("Invalid key"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_backend_error_uses_completion_even_with_sink() {
    let sink = Arc::new(RecordingSink::default());
    let cache = memory_cache(
        CacheConfig::default().with_logger(sink.clone()),
        MemoryStore::new(),
    )
    .await;
    let _ = cache.save_value(&user_42(), json!(100)).await.unwrap();

    let outcome = cache.get_object(&user_42()).await.unwrap();

    let completion = completed(outcome);
    assert!(matches!(
        completion,
        Err(CacheError::Backend(BackendError::WrongType))
    ));
    assert!(sink.entries().is_empty(), "backend errors bypass the sink");
}

#[tokio::test]
async fn test_malformed_payload_uses_completion() {
    let store = MemoryStore::new();
    let cache = memory_cache(CacheConfig::default(), store.clone()).await;
    store.set("user:42", "{truncated", None).await;

    let completion = completed(cache.get_value(&user_42()).await.unwrap());
    assert!(matches!(completion, Err(CacheError::Serialization(_))));
}

#[tokio::test]
async fn test_connection_failure_without_sink() {
    init_tracing();
    let mut cache = Cache::with_connector(CacheConfig::default(), Arc::new(RefusingConnector)).unwrap();

    let err = cache.initialize().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to setup the cache functionality: Failed to establish a connection with \
         the backend: Backend error: Backend unavailable: connection refused"
    );
    assert!(!cache.is_initialized());
}

#[tokio::test]
async fn test_connection_failure_with_sink() {
    init_tracing();
    let sink = Arc::new(RecordingSink::default());
    let config = CacheConfig::default().with_logger(sink.clone());
    let mut cache = Cache::with_connector(config, Arc::new(RefusingConnector)).unwrap();

    cache.initialize().await.unwrap();

    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("Failed to establish a connection with the backend"));

    // The provider swallowed its failure, so data calls reach it and complete
    // with the missing connection.
    let completion = completed(cache.get_value(&user_42()).await.unwrap());
    assert!(matches!(completion, Err(CacheError::NotConnected)));
}

#[tokio::test]
async fn test_quit_twice() {
    let sink = Arc::new(RecordingSink::default());
    let mut cache = memory_cache(
        CacheConfig::default().with_logger(sink.clone()),
        MemoryStore::new(),
    )
    .await;

    cache.quit().await.unwrap();
    assert!(sink.entries().is_empty());

    cache.quit().await.unwrap();
    let entries = sink.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].contains("Failed to close the backend connection"));
}

#[tokio::test]
async fn test_data_survives_reconnect() {
    let store = MemoryStore::new();
    let mut cache = memory_cache(CacheConfig::default(), store.clone()).await;
    let _ = cache.save_value(&user_42(), json!("kept")).await.unwrap();
    cache.quit().await.unwrap();

    cache.initialize().await.unwrap();
    let read = completed(cache.get_value(&user_42()).await.unwrap());
    assert_eq!(read.unwrap(), Some(json!("kept")));
}

#[tokio::test]
async fn test_concurrent_independent_operations() {
    let cache = Arc::new(memory_cache(CacheConfig::default(), MemoryStore::new()).await);

    let mut handles = Vec::new();
    for i in 0..16i64 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            let key = vec![KeyFragment::from("item"), i.into()];
            let _ = cache.save_value(&key, json!(i)).await.unwrap();
            completed(cache.get_value(&key).await.unwrap()).unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), Some(json!(i)));
    }
}
