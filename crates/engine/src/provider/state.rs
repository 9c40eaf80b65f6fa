use chrono::{DateTime, Utc};
use dataprov_types::{ErrorDetail, FetchData, FetchSpec};
use serde::Serialize;

/// Mutable state owned by one provider instance.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchState {
    /// True while the current fetch is awaiting the store.
    pub is_loading: bool,
    /// Result of the last accepted successful fetch.
    pub data: FetchData,
    /// Error objects from the last accepted failure, cleared on success.
    pub errors: Vec<ErrorDetail>,
    /// Fetches started (not skipped) over the provider's lifetime.
    pub fetch_count: u64,
    /// When the last accepted response was applied.
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl FetchState {
    /// State before the first fetch: not loading, no errors, empty data.
    pub fn initial(spec: &FetchSpec) -> Self {
        Self {
            is_loading: false,
            data: FetchData::initial_for(spec),
            errors: Vec::new(),
            fetch_count: 0,
            last_completed_at: None,
        }
    }
}
