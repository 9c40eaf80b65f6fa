//! Shallow change detection over provider inputs.
//!
//! Scalars compare by value; `query` and `options` compare by reference, so an
//! in-place edit of a query handle the provider already holds is not a change.

use std::fmt;

use dataprov_types::{FetchSpec, Params};
use serde::Serialize;

/// Top-level provider input that triggers a refetch when replaced.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecField {
    ModelName,
    RecordId,
    StoreMethod,
    Query,
    Options,
}

impl fmt::Display for SpecField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ModelName => "modelName",
            Self::RecordId => "recordId",
            Self::StoreMethod => "storeMethod",
            Self::Query => "query",
            Self::Options => "options",
        };
        f.write_str(name)
    }
}

/// Outcome of handing a provider a new set of inputs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AttrChange {
    /// No triggering field was replaced; nothing was fetched.
    Unchanged,
    /// One fetch ran because these fields were replaced.
    Refetched(Vec<SpecField>),
}

/// Fields of `next` that differ from `prev` at the top level.
pub fn changed_fields(prev: &FetchSpec, next: &FetchSpec) -> Vec<SpecField> {
    let mut changed = Vec::new();
    if prev.model_name != next.model_name {
        changed.push(SpecField::ModelName);
    }
    if prev.record_id() != next.record_id() {
        changed.push(SpecField::RecordId);
    }
    if prev.store_method != next.store_method {
        changed.push(SpecField::StoreMethod);
    }
    if !same_handle(prev.query.as_ref(), next.query.as_ref()) {
        changed.push(SpecField::Query);
    }
    if !same_handle(prev.options.as_ref(), next.options.as_ref()) {
        changed.push(SpecField::Options);
    }
    changed
}

fn same_handle(prev: Option<&Params>, next: Option<&Params>) -> bool {
    match (prev, next) {
        (None, None) => true,
        (Some(prev), Some(next)) => prev.same_ref(next),
        _ => false,
    }
}
