use std::{fmt, sync::Arc};

use dataprov_types::{ErrorDetail, FetchData};
use serde::Serialize;

use super::ProviderInner;
use crate::FetchError;

/// Read-only view handed to the consuming surface.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub is_loading: bool,
    pub data: FetchData,
    pub errors: Vec<ErrorDetail>,
    #[serde(skip)]
    pub reload: ReloadHandle,
}

/// Bound reference to a provider's fetch, callable from anywhere.
#[derive(Clone)]
pub struct ReloadHandle {
    pub(super) inner: Arc<ProviderInner>,
}

impl ReloadHandle {
    /// Run a full fetch cycle with the provider's current inputs.
    pub async fn reload(&self) -> Result<(), FetchError> {
        self.inner.fetch().await
    }
}

impl fmt::Debug for ReloadHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReloadHandle")
            .field("model_name", &self.inner.spec().model_name)
            .finish()
    }
}
