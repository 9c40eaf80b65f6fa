//! # dataprov types
//!
//! Data model shared by the provider engine, its stores and the CLI:
//!
//! - [`StoreMethod`]: closed set of store operations
//! - [`FetchSpec`]: consumer inputs of a provider
//! - [`Params`]: shared query/options handles compared by reference
//! - [`FetchData`] / [`ErrorDetail`]: what a fetch leaves behind
//! - [`StoreError`]: failure of a store call
//! - [`ProviderSettings`]: provider-wide defaults

mod errors;
mod fetch_data;
mod fetch_spec;
mod params;
mod settings;
mod store_method;

pub use errors::StoreError;
pub use fetch_data::{ErrorDetail, FetchData};
pub use fetch_spec::FetchSpec;
pub use params::Params;
pub use settings::{ParseResponseOrderingError, ProviderSettings, ResponseOrdering};
pub use store_method::{ParseStoreMethodError, StoreMethod};
