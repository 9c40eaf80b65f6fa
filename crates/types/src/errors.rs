//! Failures reported by record stores.

use serde_json::{Map as JsonMap, Value, json};
use thiserror::Error;

use crate::{ErrorDetail, StoreMethod};

/// Failure of a single store call.
///
/// Stores usually carry a list of error objects (`[{ "detail": "..." }]`);
/// when they do not, [`StoreError::error_details`] wraps the failure itself.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    /// Human-readable summary; also the `Display` output.
    pub message: String,
    /// Transport status, when the store had one.
    pub status: Option<u16>,
    /// Error objects exactly as the store returned them.
    pub errors: Option<Vec<ErrorDetail>>,
}

impl StoreError {
    /// Error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            errors: None,
        }
    }

    /// Attach a status code.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the store's own error objects.
    pub fn with_errors(mut self, errors: Vec<ErrorDetail>) -> Self {
        self.errors = Some(errors);
        self
    }

    /// Build an error from a response body. An `errors` array is taken as is;
    /// a single `errors` object is wrapped into a one-element list.
    pub fn from_payload(status: u16, payload: &Value) -> Self {
        let errors = match payload.get("errors") {
            Some(Value::Array(items)) => Some(items.clone()),
            Some(Value::Object(item)) => Some(vec![Value::Object(item.clone())]),
            _ => None,
        };
        let message = errors
            .as_ref()
            .and_then(|items| items.first())
            .and_then(|first| first.get("detail").or_else(|| first.get("description")))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("request failed with status {}", status));
        Self {
            message,
            status: Some(status),
            errors,
        }
    }

    /// 404 for a record lookup that matched nothing.
    pub fn not_found(model_name: &str, record_id: &str) -> Self {
        Self::new(format!("no record of type '{}' with id '{}'", model_name, record_id))
            .with_status(404)
            .with_errors(vec![json!({
                "status": "404",
                "detail": format!("{} {} not found", model_name, record_id),
            })])
    }

    /// A single-record operation was asked for without an id.
    pub fn missing_record_id(method: StoreMethod, model_name: &str) -> Self {
        Self::new(format!("{} on '{}' requires a record id", method, model_name))
    }

    /// Error list recorded into provider state.
    pub fn error_details(&self) -> Vec<ErrorDetail> {
        if let Some(errors) = &self.errors {
            return errors.clone();
        }
        let mut detail = JsonMap::new();
        detail.insert("detail".into(), Value::String(self.message.clone()));
        if let Some(status) = self.status {
            detail.insert("status".into(), Value::String(status.to_string()));
        }
        vec![Value::Object(detail)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_details_prefers_the_errors_list() {
        let err = StoreError::new("boom").with_errors(vec![json!({ "detail": "Server Error" })]);
        assert_eq!(err.error_details(), vec![json!({ "detail": "Server Error" })]);
    }

    #[test]
    fn error_details_wraps_bare_failures() {
        let err = StoreError::new("connection reset").with_status(503);
        assert_eq!(
            err.error_details(),
            vec![json!({ "detail": "connection reset", "status": "503" })]
        );
    }

    #[test]
    fn from_payload_normalizes_single_error_objects() {
        let payload = json!({ "errors": { "description": "Server Error" } });
        let err = StoreError::from_payload(422, &payload);
        assert_eq!(err.status, Some(422));
        assert_eq!(err.message, "Server Error");
        assert_eq!(err.errors, Some(vec![json!({ "description": "Server Error" })]));
    }

    #[test]
    fn from_payload_without_errors_uses_status_message() {
        let err = StoreError::from_payload(500, &json!({}));
        assert_eq!(err.to_string(), "request failed with status 500");
        assert!(err.errors.is_none());
    }
}
