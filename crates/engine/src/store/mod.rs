//! Record store abstraction and dispatch.
//!
//! Modules:
//! - `memory`: in-process store with stubbing, latency and a call log

mod memory;

pub use memory::{InMemoryStore, StubBuilder};

use async_trait::async_trait;
use dataprov_types::{FetchData, StoreError};
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

use crate::StoreRequest;

/// Data-access capability a provider reads from.
///
/// Collection operations answer with [`FetchData::Records`]; singular ones with
/// [`FetchData::Record`] or [`FetchData::Empty`] when nothing matched.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn query(
        &self,
        model_name: &str,
        query: Option<&JsonMap<String, Value>>,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError>;

    async fn query_record(
        &self,
        model_name: &str,
        query: Option<&JsonMap<String, Value>>,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError>;

    async fn find_record(
        &self,
        model_name: &str,
        record_id: &str,
        options: Option<&JsonMap<String, Value>>,
    ) -> Result<FetchData, StoreError>;

    async fn find_all(&self, model_name: &str, options: Option<&JsonMap<String, Value>>) -> Result<FetchData, StoreError>;

    async fn peek_all(&self, model_name: &str) -> Result<FetchData, StoreError>;

    async fn peek_record(&self, model_name: &str, record_id: &str) -> Result<FetchData, StoreError>;
}

/// Route a request to the matching store operation.
pub async fn dispatch(store: &dyn RecordStore, request: &StoreRequest) -> Result<FetchData, StoreError> {
    debug!(
        model_name = %request.model_name(),
        store_method = %request.method(),
        "dispatching store request"
    );
    match request {
        StoreRequest::Query {
            model_name,
            query,
            options,
        } => store.query(model_name, query.as_ref(), options.as_ref()).await,
        StoreRequest::QueryRecord {
            model_name,
            query,
            options,
        } => store.query_record(model_name, query.as_ref(), options.as_ref()).await,
        StoreRequest::FindRecord {
            model_name,
            record_id,
            options,
        } => store.find_record(model_name, record_id, options.as_ref()).await,
        StoreRequest::FindAll { model_name, options } => store.find_all(model_name, options.as_ref()).await,
        StoreRequest::PeekAll { model_name } => store.peek_all(model_name).await,
        StoreRequest::PeekRecord { model_name, record_id } => store.peek_record(model_name, record_id).await,
    }
}
