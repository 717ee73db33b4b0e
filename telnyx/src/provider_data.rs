//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::any::Any;
use std::sync::Arc;
use tfplug::types::Diagnostic;

#[derive(Clone)]
pub struct TelnyxProviderData {
    pub client: Arc<Client>,
}

impl TelnyxProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl TelnyxProviderData {
    /// Recover the provider data handed out by `TelnyxProvider::configure`
    pub fn from_any(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
    ) -> Result<Self, Diagnostic> {
        match provider_data {
            Some(data) => data
                .downcast_ref::<TelnyxProviderData>()
                .cloned()
                .ok_or_else(|| {
                    Diagnostic::error(
                        "Invalid provider data",
                        "Failed to extract TelnyxProviderData from provider data",
                    )
                }),
            None => Err(Diagnostic::error(
                "No provider data",
                "No provider data was provided; configure the provider first",
            )),
        }
    }
}
