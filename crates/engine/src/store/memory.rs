//! In-process record store.
//!
//! Records live in insertion order per model name. Stubs let callers pin the
//! outcome of specific operations (including failures), which makes the store
//! usable both as an embedded data source and as a test double. Every call is
//! appended to a log before it is served.

use std::{
    collections::VecDeque,
    fmt,
    sync::{
        Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use dataprov_types::{FetchData, StoreError, StoreMethod};
use indexmap::IndexMap;
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use super::RecordStore;
use crate::StoreRequest;

#[derive(Debug, Clone)]
enum StubOutcome {
    Returns(FetchData),
    Fails(StoreError),
}

#[derive(Debug, Clone)]
struct Stub {
    method: StoreMethod,
    model_name: String,
    query: Option<JsonMap<String, Value>>,
    outcome: StubOutcome,
}

impl Stub {
    fn matches(&self, request: &StoreRequest) -> bool {
        self.method == request.method()
            && self.model_name == request.model_name()
            && self.query.as_ref().is_none_or(|expected| request.query() == Some(expected))
    }

    fn same_target(&self, other: &Stub) -> bool {
        self.method == other.method && self.model_name == other.model_name && self.query == other.query
    }
}

#[derive(Debug, Default)]
struct Latency {
    default: Option<Duration>,
    scripted: VecDeque<Duration>,
}

/// Record store held entirely in memory.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<IndexMap<String, Vec<Value>>>,
    stubs: Mutex<Vec<Stub>>,
    calls: Mutex<Vec<StoreRequest>>,
    latency: Mutex<Latency>,
    next_id: AtomicU64,
}

impl fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("models", &lock(&self.records).len())
            .field("stubs", &lock(&self.stubs).len())
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

impl InMemoryStore {
    /// Empty store with no latency and no stubs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from `{model: [record, ...]}` data. Records without an
    /// `id` get one assigned.
    pub fn from_fixture(fixture: IndexMap<String, Vec<Value>>) -> Self {
        let store = Self::new();
        for (model_name, records) in fixture {
            for record in records {
                store.make(&model_name, record);
            }
        }
        store
    }

    /// Delay every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        lock(&self.latency).default = Some(latency);
        self
    }

    /// Delay the next not-yet-delayed call by `latency`. Queued delays are
    /// consumed in call order and take precedence over the default.
    pub fn push_latency(&self, latency: Duration) {
        lock(&self.latency).scripted.push_back(latency);
    }

    /// Insert a record, assigning a sequential string `id` when it has none.
    /// Returns the stored record.
    pub fn make(&self, model_name: &str, attrs: Value) -> Value {
        let mut record = match attrs {
            Value::Object(map) => map,
            other => {
                let mut map = JsonMap::new();
                map.insert("value".into(), other);
                map
            }
        };
        match record.get("id") {
            Some(id) => {
                if let Some(numeric) = id_string(id).and_then(|id| id.parse::<u64>().ok()) {
                    self.next_id.fetch_max(numeric, Ordering::SeqCst);
                }
            }
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
                record.insert("id".into(), Value::String(id.to_string()));
            }
        }
        let record = Value::Object(record);
        lock(&self.records)
            .entry(model_name.to_string())
            .or_default()
            .push(record.clone());
        record
    }

    /// Records currently held for `model_name`.
    pub fn records(&self, model_name: &str) -> Vec<Value> {
        lock(&self.records).get(model_name).cloned().unwrap_or_default()
    }

    /// Start a stub for `method` on `model_name`.
    pub fn stub(&self, method: StoreMethod, model_name: impl Into<String>) -> StubBuilder<'_> {
        StubBuilder {
            store: self,
            method,
            model_name: model_name.into(),
            query: None,
        }
    }

    /// Remove every stub so calls are served from records again.
    pub fn clear_stubs(&self) {
        lock(&self.stubs).clear();
    }

    /// Every request served so far, in call order.
    pub fn calls(&self) -> Vec<StoreRequest> {
        lock(&self.calls).clone()
    }

    /// Number of store calls made so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    fn install(&self, stub: Stub) {
        let mut stubs = lock(&self.stubs);
        stubs.retain(|existing| !existing.same_target(&stub));
        stubs.push(stub);
    }

    fn next_latency(&self) -> Option<Duration> {
        let mut latency = lock(&self.latency);
        latency.scripted.pop_front().or(latency.default)
    }

    fn stubbed(&self, request: &StoreRequest) -> Option<StubOutcome> {
        lock(&self.stubs)
            .iter()
            .rev()
            .find(|stub| stub.matches(request))
            .map(|stub| stub.outcome.clone())
    }

    async fn handle(&self, request: StoreRequest) -> Result<FetchData, StoreError> {
        let delay = self.next_latency();
        let stubbed = self.stubbed(&request);
        lock(&self.calls).push(request.clone());

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match stubbed {
            Some(StubOutcome::Returns(data)) => Ok(data),
            Some(StubOutcome::Fails(error)) => Err(error),
            None => self.serve(&request),
        }
    }

    fn serve(&self, request: &StoreRequest) -> Result<FetchData, StoreError> {
        let records = lock(&self.records);
        let model = records.get(request.model_name()).map(Vec::as_slice).unwrap_or(&[]);
        let data = match request {
            StoreRequest::Query { query, .. } => FetchData::Records(
                model
                    .iter()
                    .filter(|record| matches_query(record, query.as_ref()))
                    .cloned()
                    .collect(),
            ),
            StoreRequest::QueryRecord { query, .. } => model
                .iter()
                .find(|record| matches_query(record, query.as_ref()))
                .cloned()
                .into(),
            StoreRequest::FindRecord {
                model_name, record_id, ..
            } => find_by_id(model, record_id)
                .cloned()
                .map(FetchData::Record)
                .ok_or_else(|| StoreError::not_found(model_name, record_id))?,
            StoreRequest::FindAll { .. } | StoreRequest::PeekAll { .. } => FetchData::Records(model.to_vec()),
            StoreRequest::PeekRecord { record_id, .. } => find_by_id(model, record_id).cloned().into(),
        };
        debug!(
            model_name = %request.model_name(),
            store_method = %request.method(),
            record_count = data.len(),
            "in-memory store served request"
        );
        Ok(data)
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn query(
        &self,
        model_name: &str,
        query: Option<&JsonMap<String, Value>>,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::Query {
            model_name: model_name.to_string(),
            query: query.cloned(),
            options: options.cloned(),
        })
        .await
    }

    async fn query_record(
        &self,
        model_name: &str,
        query: Option<&JsonMap<String, Value>>,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::QueryRecord {
            model_name: model_name.to_string(),
            query: query.cloned(),
            options: options.cloned(),
        })
        .await
    }

    async fn find_record(
        &self,
        model_name: &str,
        record_id: &str,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::FindRecord {
            model_name: model_name.to_string(),
            record_id: record_id.to_string(),
            options: options.cloned(),
        })
        .await
    }

    async fn find_all(&self, model_name: &str, options: Option<&JsonMap<String, Value>>) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::FindAll {
            model_name: model_name.to_string(),
            options: options.cloned(),
        })
        .await
    }

    async fn peek_all(&self, model_name: &str) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::PeekAll {
            model_name: model_name.to_string(),
        })
        .await
    }

    async fn peek_record(&self, model_name: &str, record_id: &str) -> Result<FetchData, StoreError> {
        self.handle(StoreRequest::PeekRecord {
            model_name: model_name.to_string(),
            record_id: record_id.to_string(),
        })
        .await
    }
}

/// Pins the outcome of one store operation. Installing a stub replaces any
/// earlier stub for the same operation, model and query.
#[must_use = "a stub is only installed by `returns` or `fails`"]
pub struct StubBuilder<'a> {
    store: &'a InMemoryStore,
    method: StoreMethod,
    model_name: String,
    query: Option<JsonMap<String, Value>>,
}

impl StubBuilder<'_> {
    /// Only match calls whose query equals `query`.
    pub fn with_query(mut self, query: Value) -> Self {
        self.query = query.as_object().cloned();
        self
    }

    pub fn returns(self, data: impl Into<FetchData>) {
        self.install(StubOutcome::Returns(data.into()));
    }

    pub fn fails(self, error: StoreError) {
        self.install(StubOutcome::Fails(error));
    }

    fn install(self, outcome: StubOutcome) {
        self.store.install(Stub {
            method: self.method,
            model_name: self.model_name,
            query: self.query,
            outcome,
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn matches_query(record: &Value, query: Option<&JsonMap<String, Value>>) -> bool {
    query.is_none_or(|query| query.iter().all(|(key, expected)| record.get(key) == Some(expected)))
}

fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn find_by_id<'a>(records: &'a [Value], record_id: &str) -> Option<&'a Value> {
    records
        .iter()
        .find(|record| record.get("id").and_then(id_string).as_deref() == Some(record_id))
}
