use dataprov_types::{StoreError, StoreMethod};
use thiserror::Error;

/// A store failure re-raised to the caller because the provider was
/// configured with `throw_error`.
///
/// The failure has already been recorded into provider state and reported to
/// the error callback by the time this is returned.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{store_method} for '{model_name}' failed: {source}")]
pub struct FetchError {
    /// Model the fetch targeted.
    pub model_name: String,
    /// Operation that failed.
    pub store_method: StoreMethod,
    /// Failure as the store reported it.
    pub source: StoreError,
}

impl FetchError {
    pub fn new(model_name: impl Into<String>, store_method: StoreMethod, source: StoreError) -> Self {
        Self {
            model_name: model_name.into(),
            store_method,
            source,
        }
    }

    /// Underlying store failure.
    pub fn store_error(&self) -> &StoreError {
        &self.source
    }
}
