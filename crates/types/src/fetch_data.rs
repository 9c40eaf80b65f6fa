use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::FetchSpec;

/// Unstructured error payload as reported by a store.
pub type ErrorDetail = Value;

/// Result of a store operation: a collection, a single record, or nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FetchData {
    Records(Vec<Value>),
    Empty,
    Record(Value),
}

impl FetchData {
    /// Value held before the first fetch completes: an empty collection when
    /// no record id is set, otherwise nothing.
    pub fn initial_for(spec: &FetchSpec) -> Self {
        if spec.has_record_id() {
            Self::Empty
        } else {
            Self::Records(Vec::new())
        }
    }

    /// Collection contents, empty for single-record results.
    pub fn records(&self) -> &[Value] {
        match self {
            Self::Records(records) => records,
            _ => &[],
        }
    }

    /// The single record, if this is one.
    pub fn record(&self) -> Option<&Value> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Number of records held, counting a single record as one.
    pub fn len(&self) -> usize {
        match self {
            Self::Records(records) => records.len(),
            Self::Record(_) => 1,
            Self::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the result came from a collection operation.
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Records(_))
    }
}

impl Default for FetchData {
    fn default() -> Self {
        Self::Records(Vec::new())
    }
}

impl From<Vec<Value>> for FetchData {
    fn from(records: Vec<Value>) -> Self {
        Self::Records(records)
    }
}

impl From<Option<Value>> for FetchData {
    fn from(record: Option<Value>) -> Self {
        record.map_or(Self::Empty, Self::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn initial_value_depends_on_record_id() {
        assert_eq!(FetchData::initial_for(&FetchSpec::new("user")), FetchData::Records(vec![]));
        assert_eq!(
            FetchData::initial_for(&FetchSpec::new("user").with_record_id("1")),
            FetchData::Empty
        );
    }

    #[test]
    fn serializes_to_plain_json_shapes() {
        let records = FetchData::Records(vec![json!({ "name": "Huey" })]);
        assert_eq!(serde_json::to_value(&records).unwrap(), json!([{ "name": "Huey" }]));
        assert_eq!(serde_json::to_value(FetchData::Empty).unwrap(), Value::Null);

        let record: FetchData = serde_json::from_value(json!({ "name": "Daffy" })).unwrap();
        assert_eq!(record.record(), Some(&json!({ "name": "Daffy" })));
        let nothing: FetchData = serde_json::from_value(Value::Null).unwrap();
        assert_eq!(nothing, FetchData::Empty);
    }

    #[test]
    fn single_record_is_not_a_collection() {
        let record = FetchData::from(Some(json!({ "id": "1" })));
        assert!(!record.is_collection());
        assert_eq!(record.len(), 1);
        assert!(record.records().is_empty());
    }
}
