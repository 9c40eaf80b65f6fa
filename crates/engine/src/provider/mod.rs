//! Declarative data provider.
//!
//! A [`DataProvider`] owns the fetch state of one consuming component. Hosts
//! call [`DataProvider::mount`] once and [`DataProvider::did_receive_attrs`]
//! whenever they re-establish inputs; consumers read a [`Projection`] and may
//! trigger a refetch at any time through its [`ReloadHandle`].
//!
//! Fetch lifecycle:
//! 1. stamp a generation, then skip while the model name is empty
//! 2. mark loading
//! 3. resolve the store method and build a typed request
//! 4. await the store
//! 5. record data or errors, run callbacks, clear loading
//! 6. re-raise the failure when `throw_error` is set, otherwise log it
//!
//! Only the most recently issued fetch may write state under
//! [`ResponseOrdering::LatestIssued`]. [`ResponseOrdering::LastCompleted`]
//! lets every response write as it lands.

mod projection;
mod state;

pub use projection::{Projection, ReloadHandle};
pub use state::FetchState;

use std::{
    fmt,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::Utc;
use dataprov_types::{FetchData, FetchSpec, ProviderSettings, ResponseOrdering, StoreError};
use tracing::{debug, error, info};

use crate::{
    AttrChange, FetchError, RecordStore, StoreRequest, changed_fields, resolve_store_method, store::dispatch,
};

/// Callback invoked with the data of every accepted successful fetch.
pub type SuccessCallback = Arc<dyn Fn(&FetchData) + Send + Sync>;
/// Callback invoked with every accepted store failure.
pub type ErrorCallback = Arc<dyn Fn(&StoreError) + Send + Sync>;

pub(crate) struct ProviderInner {
    store: Arc<dyn RecordStore>,
    spec: Mutex<FetchSpec>,
    state: Mutex<FetchState>,
    generation: AtomicU64,
    ordering: ResponseOrdering,
    default_throw_error: bool,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl ProviderInner {
    pub(crate) fn spec(&self) -> FetchSpec {
        lock(&self.spec).clone()
    }

    fn state(&self) -> FetchState {
        lock(&self.state).clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        match self.ordering {
            ResponseOrdering::LatestIssued => self.generation.load(Ordering::SeqCst) == generation,
            ResponseOrdering::LastCompleted => true,
        }
    }

    pub(crate) async fn fetch(&self) -> Result<(), FetchError> {
        let spec = self.spec();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if !spec.is_fetchable() {
            debug!(generation, "provider fetch skipped without a model name");
            if self.ordering == ResponseOrdering::LatestIssued {
                // Any fetch still in flight is now stale and will not settle.
                lock(&self.state).is_loading = false;
            }
            return Ok(());
        }

        {
            let mut state = lock(&self.state);
            state.is_loading = true;
            state.fetch_count += 1;
        }
        let mut in_flight = InFlight {
            inner: self,
            generation,
            settled: false,
        };

        let store_method = resolve_store_method(&spec);
        let throw_error = spec.throw_error || self.default_throw_error;
        debug!(
            model_name = %spec.model_name,
            store_method = %store_method,
            generation,
            "provider fetch started"
        );

        let outcome = match StoreRequest::build(store_method, &spec) {
            Ok(request) => dispatch(self.store.as_ref(), &request).await,
            Err(error) => Err(error),
        };
        in_flight.settled = true;

        if !self.is_current(generation) {
            debug!(
                model_name = %spec.model_name,
                store_method = %store_method,
                generation,
                "discarding stale provider response"
            );
            return Ok(());
        }

        match outcome {
            Ok(data) => {
                info!(
                    model_name = %spec.model_name,
                    store_method = %store_method,
                    record_count = data.len(),
                    "provider fetch completed"
                );
                {
                    let mut state = lock(&self.state);
                    state.data = data.clone();
                    state.errors.clear();
                }
                if let Some(on_success) = &self.on_success {
                    on_success(&data);
                }
                self.finish(generation);
                Ok(())
            }
            Err(store_error) => {
                lock(&self.state).errors = store_error.error_details();
                if let Some(on_error) = &self.on_error {
                    on_error(&store_error);
                }
                self.finish(generation);
                if throw_error {
                    return Err(FetchError::new(spec.model_name, store_method, store_error));
                }
                error!(
                    model_name = %spec.model_name,
                    store_method = %store_method,
                    status = ?store_error.status,
                    error = %store_error,
                    "DataProviderError"
                );
                Ok(())
            }
        }
    }

    fn finish(&self, generation: u64) {
        if !self.is_current(generation) {
            return;
        }
        let mut state = lock(&self.state);
        state.is_loading = false;
        state.last_completed_at = Some(Utc::now());
    }
}

/// Clears `is_loading` when the current fetch is dropped before its store
/// call returns.
struct InFlight<'a> {
    inner: &'a ProviderInner,
    generation: u64,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled || !self.inner.is_current(self.generation) {
            return;
        }
        debug!(generation = self.generation, "provider fetch dropped before completion");
        lock(&self.inner.state).is_loading = false;
    }
}

/// Fetch orchestrator for one consuming component.
#[derive(Clone)]
pub struct DataProvider {
    inner: Arc<ProviderInner>,
}

impl fmt::Debug for DataProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataProvider")
            .field("spec", &self.inner.spec())
            .field("ordering", &self.inner.ordering)
            .finish()
    }
}

impl DataProvider {
    /// Provider with default settings and no callbacks.
    pub fn new(store: Arc<dyn RecordStore>, spec: FetchSpec) -> Self {
        Self::builder(store, spec).build()
    }

    /// Start configuring a provider with settings or callbacks.
    pub fn builder(store: Arc<dyn RecordStore>, spec: FetchSpec) -> DataProviderBuilder {
        DataProviderBuilder {
            store,
            spec,
            settings: ProviderSettings::default(),
            on_success: None,
            on_error: None,
        }
    }

    /// Initial fetch when the host first establishes inputs.
    pub async fn mount(&self) -> Result<(), FetchError> {
        self.inner.fetch().await
    }

    /// Run one fetch cycle with the current inputs.
    pub async fn fetch(&self) -> Result<(), FetchError> {
        self.inner.fetch().await
    }

    /// Replace the inputs and fetch once if any top-level input changed.
    ///
    /// Query and option handles are compared by reference: editing a field
    /// inside the handle the provider already holds does not refetch.
    pub async fn did_receive_attrs(&self, next: FetchSpec) -> Result<AttrChange, FetchError> {
        let changed = {
            let mut spec = lock(&self.inner.spec);
            let changed = changed_fields(&spec, &next);
            *spec = next;
            changed
        };
        if changed.is_empty() {
            return Ok(AttrChange::Unchanged);
        }
        debug!(fields = ?changed, "provider inputs replaced");
        self.inner.fetch().await?;
        Ok(AttrChange::Refetched(changed))
    }

    /// Current inputs.
    pub fn spec(&self) -> FetchSpec {
        self.inner.spec()
    }

    /// Snapshot of the full fetch state.
    pub fn state(&self) -> FetchState {
        self.inner.state()
    }

    /// Loading flag, data, errors and a reload handle for consumers.
    pub fn projection(&self) -> Projection {
        let state = self.inner.state();
        Projection {
            is_loading: state.is_loading,
            data: state.data,
            errors: state.errors,
            reload: self.reload_handle(),
        }
    }

    /// Handle that re-runs the fetch with the inputs current at call time.
    pub fn reload_handle(&self) -> ReloadHandle {
        ReloadHandle {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Configures a [`DataProvider`] before it is shared.
pub struct DataProviderBuilder {
    store: Arc<dyn RecordStore>,
    spec: FetchSpec,
    settings: ProviderSettings,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
}

impl DataProviderBuilder {
    /// Apply loaded settings: response ordering and the default `throw_error`.
    pub fn settings(mut self, settings: &ProviderSettings) -> Self {
        self.settings = settings.clone();
        self
    }

    /// Override how concurrent responses are reconciled.
    pub fn response_ordering(mut self, ordering: ResponseOrdering) -> Self {
        self.settings.response_ordering = ordering;
        self
    }

    /// Called with the data of every accepted successful fetch.
    pub fn on_success(mut self, callback: impl Fn(&FetchData) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    /// Called once per accepted failure, before any re-raise.
    pub fn on_error(mut self, callback: impl Fn(&StoreError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    /// Finish configuration. No fetch runs until `mount`.
    pub fn build(self) -> DataProvider {
        let state = FetchState::initial(&self.spec);
        DataProvider {
            inner: Arc::new(ProviderInner {
                store: self.store,
                spec: Mutex::new(self.spec),
                state: Mutex::new(state),
                generation: AtomicU64::new(0),
                ordering: self.settings.response_ordering,
                default_throw_error: self.settings.throw_error,
                on_success: self.on_success,
                on_error: self.on_error,
            }),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use serde_json::json;
    use std::time::Duration;

    fn store() -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::new())
    }

    #[tokio::test]
    async fn empty_model_name_leaves_state_untouched() {
        let store = store();
        let provider = DataProvider::new(store.clone(), FetchSpec::default());
        let before = provider.state();

        provider.mount().await.unwrap();
        provider.fetch().await.unwrap();

        assert_eq!(provider.state(), before);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn initial_data_reflects_record_id() {
        let collection = DataProvider::new(store(), FetchSpec::new("user"));
        assert_eq!(collection.projection().data, FetchData::Records(vec![]));

        let single = DataProvider::new(store(), FetchSpec::new("user").with_record_id("1"));
        assert_eq!(single.projection().data, FetchData::Empty);
        assert!(!single.projection().is_loading);
    }

    #[tokio::test]
    async fn success_clears_previous_errors() {
        let store = store();
        store
            .stub(dataprov_types::StoreMethod::FindAll, "user")
            .fails(StoreError::new("down"));
        let provider = DataProvider::new(store.clone(), FetchSpec::new("user"));
        provider.mount().await.unwrap();
        assert_eq!(provider.state().errors.len(), 1);

        store.clear_stubs();
        store.make("user", json!({ "name": "Huey" }));
        provider.fetch().await.unwrap();
        let state = provider.state();
        assert!(state.errors.is_empty());
        assert_eq!(state.data.len(), 1);
        assert_eq!(state.fetch_count, 2);
        assert!(state.last_completed_at.is_some());
    }

    #[tokio::test]
    async fn settings_throw_error_applies_when_spec_leaves_it_unset() {
        let store = store();
        store
            .stub(dataprov_types::StoreMethod::FindAll, "user")
            .fails(StoreError::new("down"));
        let settings = ProviderSettings {
            throw_error: true,
            ..ProviderSettings::default()
        };
        let provider = DataProvider::builder(store, FetchSpec::new("user"))
            .settings(&settings)
            .build();
        let err = provider.mount().await.unwrap_err();
        assert_eq!(err.store_error().message, "down");
    }

    #[tokio::test]
    async fn missing_record_id_for_find_record_is_recorded_as_failure() {
        let store = store();
        let spec = FetchSpec::new("user").with_store_method(dataprov_types::StoreMethod::FindRecord);
        let provider = DataProvider::new(store.clone(), spec);
        provider.mount().await.unwrap();

        let state = provider.state();
        assert!(!state.is_loading);
        assert_eq!(state.errors.len(), 1);
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn dropped_fetch_does_not_leave_provider_loading() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(50)));
        store.make("user", json!({ "name": "Huey" }));
        let provider = DataProvider::new(store.clone(), FetchSpec::new("user"));

        let timed_out = tokio::time::timeout(Duration::from_millis(5), provider.fetch()).await;
        assert!(timed_out.is_err());

        let state = provider.state();
        assert!(!state.is_loading);
        assert_eq!(state.fetch_count, 1);
        assert!(state.last_completed_at.is_none());

        provider.fetch().await.unwrap();
        assert_eq!(provider.state().data.len(), 1);
    }

    #[test]
    fn projection_serializes_without_reload() {
        let provider = DataProvider::new(store(), FetchSpec::new("user"));
        let value = serde_json::to_value(provider.projection()).unwrap();
        assert_eq!(value, json!({ "isLoading": false, "data": [], "errors": [] }));
    }
}
