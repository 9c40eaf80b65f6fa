//! Operation kinds exposed by a record store.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the six retrieval operations a record store exposes.
///
/// The serialized form uses the camelCase operation names (`findAll`,
/// `queryRecord`, ...) so settings files and CLI flags read the same way the
/// store API is usually documented.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StoreMethod {
    /// Fetch every record matching a query object.
    Query,
    /// Fetch a single record matching a query object.
    QueryRecord,
    /// Fetch a single record by identifier.
    FindRecord,
    /// Fetch every record of a model type.
    FindAll,
    /// Read every locally known record without a round trip.
    PeekAll,
    /// Read a locally known record by identifier without a round trip.
    PeekRecord,
}

impl StoreMethod {
    pub const ALL: [StoreMethod; 6] = [
        StoreMethod::Query,
        StoreMethod::QueryRecord,
        StoreMethod::FindRecord,
        StoreMethod::FindAll,
        StoreMethod::PeekAll,
        StoreMethod::PeekRecord,
    ];

    /// Canonical camelCase operation name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::QueryRecord => "queryRecord",
            Self::FindRecord => "findRecord",
            Self::FindAll => "findAll",
            Self::PeekAll => "peekAll",
            Self::PeekRecord => "peekRecord",
        }
    }
}

impl fmt::Display for StoreMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known store operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown store method '{0}' (expected one of query, queryRecord, findRecord, findAll, peekAll, peekRecord)")]
pub struct ParseStoreMethodError(pub String);

impl FromStr for StoreMethod {
    type Err = ParseStoreMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "query" => Ok(Self::Query),
            "queryRecord" | "query_record" => Ok(Self::QueryRecord),
            "findRecord" | "find_record" => Ok(Self::FindRecord),
            "findAll" | "find_all" => Ok(Self::FindAll),
            "peekAll" | "peek_all" => Ok(Self::PeekAll),
            "peekRecord" | "peek_record" => Ok(Self::PeekRecord),
            other => Err(ParseStoreMethodError(other.to_string())),
        }
    }
}
