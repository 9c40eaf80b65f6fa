use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Policy for responses that complete out of order.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseOrdering {
    /// Only the most recently issued fetch may write state; older responses
    /// are dropped when they arrive.
    #[default]
    LatestIssued,
    /// Every response writes state as it completes, so the slowest request
    /// wins regardless of issue order.
    LastCompleted,
}

impl fmt::Display for ResponseOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LatestIssued => f.write_str("latest-issued"),
            Self::LastCompleted => f.write_str("last-completed"),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown response ordering '{0}' (expected latest-issued or last-completed)")]
pub struct ParseResponseOrderingError(pub String);

impl FromStr for ResponseOrdering {
    type Err = ParseResponseOrderingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest" | "latest-issued" | "latest_issued" => Ok(Self::LatestIssued),
            "last" | "last-completed" | "last_completed" => Ok(Self::LastCompleted),
            other => Err(ParseResponseOrderingError(other.to_string())),
        }
    }
}

/// Provider-wide defaults, usually loaded from a settings file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSettings {
    #[serde(default)]
    pub response_ordering: ResponseOrdering,
    /// Default for [`crate::FetchSpec::throw_error`] when a spec leaves it unset.
    #[serde(default)]
    pub throw_error: bool,
    /// `tracing` filter directive used by the CLI when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_filter: Option<String>,
}
