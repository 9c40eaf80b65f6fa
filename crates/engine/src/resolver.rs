//! Store method inference.
//!
//! When a consumer does not name a store operation explicitly, the operation is
//! derived from which inputs are present: a query object selects the `query`
//! family, a record id selects the singular variant.

use dataprov_types::{FetchSpec, StoreMethod};

/// Infer the store operation from the presence of a query object and a record id.
///
/// | query | record id | operation     |
/// |-------|-----------|---------------|
/// | yes   | yes       | `queryRecord` |
/// | yes   | no        | `query`       |
/// | no    | yes       | `findRecord`  |
/// | no    | no        | `findAll`     |
pub fn infer_store_method(has_query: bool, has_record_id: bool) -> StoreMethod {
    match (has_query, has_record_id) {
        (true, true) => StoreMethod::QueryRecord,
        (true, false) => StoreMethod::Query,
        (false, true) => StoreMethod::FindRecord,
        (false, false) => StoreMethod::FindAll,
    }
}

/// Operation a fetch for `spec` will use. An explicit `store_method` always
/// wins, even when it contradicts the other inputs.
pub fn resolve_store_method(spec: &FetchSpec) -> StoreMethod {
    spec.store_method
        .unwrap_or_else(|| infer_store_method(spec.has_query(), spec.has_record_id()))
}
