//! # dataprov engine
//!
//! Declarative record fetching for UI components. A component describes what
//! it needs (a model name plus an optional record id, query object and store
//! options); the engine picks the store operation, runs it, and keeps
//! loading/data/error state the component can render from.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use dataprov_engine::{DataProvider, InMemoryStore};
//! use dataprov_types::FetchSpec;
//! use serde_json::json;
//!
//! # async fn run() -> Result<(), dataprov_engine::FetchError> {
//! let store = Arc::new(InMemoryStore::new());
//! store.make("user", json!({ "name": "Huey" }));
//!
//! let provider = DataProvider::new(store, FetchSpec::new("user"));
//! provider.mount().await?;
//!
//! let view = provider.projection();
//! assert_eq!(view.data.len(), 1);
//! view.reload.reload().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **`resolver`**: infers the store operation from the supplied inputs
//! - **`request`**: typed per-operation store requests
//! - **`store`**: the [`RecordStore`] capability, dispatch, and an in-memory store
//! - **`change`**: shallow change detection over provider inputs
//! - **`provider`**: the fetch orchestrator, its state and the consumer projection

mod change;
mod error;
pub mod provider;
mod request;
mod resolver;
pub mod store;

pub use change::{AttrChange, SpecField, changed_fields};
pub use error::FetchError;
pub use provider::{DataProvider, DataProviderBuilder, FetchState, Projection, ReloadHandle};
pub use request::StoreRequest;
pub use resolver::{infer_store_method, resolve_store_method};
pub use store::{InMemoryStore, RecordStore, StubBuilder, dispatch};
