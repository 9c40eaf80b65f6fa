//! Typed store requests.
//!
//! Each operation takes a different subset of the provider inputs. Rather than
//! assembling a variable-length argument list, a [`StoreRequest`] carries
//! exactly the fields its operation accepts. Query and option handles are
//! snapshotted when the request is built, so later in-place edits cannot leak
//! into a call that is already in flight.

use dataprov_types::{FetchSpec, Params, StoreError, StoreMethod};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value};
use tracing::debug;

/// One call against a [`crate::RecordStore`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreRequest {
    Query {
        model_name: String,
        query: Option<JsonMap<String, Value>>,
        options: Option<JsonMap<String, Value>>,
    },
    QueryRecord {
        model_name: String,
        query: Option<JsonMap<String, Value>>,
        options: Option<JsonMap<String, Value>>,
    },
    FindRecord {
        model_name: String,
        record_id: String,
        options: Option<JsonMap<String, Value>>,
    },
    FindAll {
        model_name: String,
        options: Option<JsonMap<String, Value>>,
    },
    PeekAll {
        model_name: String,
    },
    PeekRecord {
        model_name: String,
        record_id: String,
    },
}

impl StoreRequest {
    /// Build the request `method` needs from `spec`.
    ///
    /// Inputs the operation does not accept are dropped. Singular lookups by id
    /// (`findRecord`, `peekRecord`) fail without a record id.
    pub fn build(method: StoreMethod, spec: &FetchSpec) -> Result<Self, StoreError> {
        let model_name = spec.model_name.clone();
        let query = spec.query.as_ref().map(Params::snapshot);
        let options = spec.options.as_ref().map(Params::snapshot);
        let record_id = spec.record_id().map(str::to_string);

        let request = match method {
            StoreMethod::Query => Self::Query {
                model_name,
                query,
                options,
            },
            StoreMethod::QueryRecord => Self::QueryRecord {
                model_name,
                query,
                options,
            },
            StoreMethod::FindRecord => {
                let record_id = record_id.ok_or_else(|| StoreError::missing_record_id(method, &spec.model_name))?;
                log_dropped(method, &spec.model_name, query.is_some(), false);
                Self::FindRecord {
                    model_name,
                    record_id,
                    options,
                }
            }
            StoreMethod::FindAll => {
                log_dropped(method, &spec.model_name, query.is_some(), record_id.is_some());
                Self::FindAll { model_name, options }
            }
            StoreMethod::PeekAll => {
                log_dropped(method, &spec.model_name, query.is_some(), record_id.is_some());
                Self::PeekAll { model_name }
            }
            StoreMethod::PeekRecord => {
                let record_id = record_id.ok_or_else(|| StoreError::missing_record_id(method, &spec.model_name))?;
                log_dropped(method, &spec.model_name, query.is_some(), false);
                Self::PeekRecord { model_name, record_id }
            }
        };
        Ok(request)
    }

    pub fn method(&self) -> StoreMethod {
        match self {
            Self::Query { .. } => StoreMethod::Query,
            Self::QueryRecord { .. } => StoreMethod::QueryRecord,
            Self::FindRecord { .. } => StoreMethod::FindRecord,
            Self::FindAll { .. } => StoreMethod::FindAll,
            Self::PeekAll { .. } => StoreMethod::PeekAll,
            Self::PeekRecord { .. } => StoreMethod::PeekRecord,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            Self::Query { model_name, .. }
            | Self::QueryRecord { model_name, .. }
            | Self::FindRecord { model_name, .. }
            | Self::FindAll { model_name, .. }
            | Self::PeekAll { model_name }
            | Self::PeekRecord { model_name, .. } => model_name,
        }
    }

    pub fn query(&self) -> Option<&JsonMap<String, Value>> {
        match self {
            Self::Query { query, .. } | Self::QueryRecord { query, .. } => query.as_ref(),
            _ => None,
        }
    }
}

fn log_dropped(method: StoreMethod, model_name: &str, query: bool, record_id: bool) {
    if query || record_id {
        debug!(
            model_name = %model_name,
            store_method = %method,
            dropped_query = query,
            dropped_record_id = record_id,
            "store method does not accept every supplied input"
        );
    }
}
