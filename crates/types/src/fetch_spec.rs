use serde::{Deserialize, Serialize};

use crate::{Params, StoreMethod};

/// Consumer-supplied inputs of a data provider.
///
/// A `FetchSpec` is treated as immutable for the duration of one fetch; hosts
/// replace it wholesale when attributes change. `query` and `options` are
/// shared handles, see [`Params`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchSpec {
    /// Model type to fetch, e.g. `user`. Nothing is fetched while empty.
    #[serde(default)]
    pub model_name: String,
    /// Identifier for singular fetches (`GET /users/1` => `"1"`).
    #[serde(default)]
    pub record_id: Option<String>,
    /// Explicit store operation; inferred from `query`/`record_id` when absent.
    #[serde(default)]
    pub store_method: Option<StoreMethod>,
    /// Query object for `query`/`queryRecord`.
    #[serde(default)]
    pub query: Option<Params>,
    /// Adapter options forwarded to the store call.
    #[serde(default)]
    pub options: Option<Params>,
    /// Re-raise store failures to the caller instead of logging them.
    #[serde(default)]
    pub throw_error: bool,
}

impl FetchSpec {
    /// Inputs for `model_name` with everything else unset.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            ..Self::default()
        }
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn with_store_method(mut self, store_method: StoreMethod) -> Self {
        self.store_method = Some(store_method);
        self
    }

    pub fn with_query(mut self, query: Params) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_options(mut self, options: Params) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_throw_error(mut self, throw_error: bool) -> Self {
        self.throw_error = throw_error;
        self
    }

    /// Whether a fetch may run at all. Only an empty model name blocks it.
    pub fn is_fetchable(&self) -> bool {
        !self.model_name.is_empty()
    }

    /// Record identifier, treating an empty string as absent.
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Whether a non-empty record id is set.
    pub fn has_record_id(&self) -> bool {
        self.record_id().is_some()
    }

    pub fn has_query(&self) -> bool {
        self.query.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_record_id_counts_as_absent() {
        let spec = FetchSpec::new("user").with_record_id("");
        assert!(!spec.has_record_id());
        assert_eq!(spec.record_id(), None);
    }

    #[test]
    fn blank_model_name_is_not_fetchable() {
        assert!(!FetchSpec::default().is_fetchable());
        assert!(FetchSpec::new("   ").is_fetchable());
        assert!(FetchSpec::new("user").is_fetchable());
    }

    #[test]
    fn deserializes_camel_case_attributes() {
        let spec: FetchSpec = serde_json::from_value(json!({
            "modelName": "user",
            "recordId": "1",
            "storeMethod": "findRecord",
            "throwError": true
        }))
        .unwrap();
        assert_eq!(spec.model_name, "user");
        assert_eq!(spec.record_id(), Some("1"));
        assert_eq!(spec.store_method, Some(StoreMethod::FindRecord));
        assert!(spec.throw_error);
        assert!(spec.query.is_none());
    }
}
