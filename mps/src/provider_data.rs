//! Provider data structure passed to resources and data sources

use crate::api::Client;
use crate::service::MpsService;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tfplug::retry::RetryPolicy;
use tfplug::types::Diagnostic;

pub const READ_RETRY_TIMEOUT: Duration = Duration::from_secs(3 * 60);
pub const WRITE_RETRY_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Clone)]
pub struct MpsProviderData {
    pub client: Arc<Client>,
    pub read_retry: RetryPolicy,
    pub write_retry: RetryPolicy,
}

impl MpsProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
            read_retry: RetryPolicy::new(READ_RETRY_TIMEOUT),
            write_retry: RetryPolicy::new(WRITE_RETRY_TIMEOUT),
        }
    }

    pub fn with_retry_policies(mut self, read: RetryPolicy, write: RetryPolicy) -> Self {
        self.read_retry = read;
        self.write_retry = write;
        self
    }

    /// Recovers the data handed out by the provider's configure. `receiver`
    /// names the kind of handler for the diagnostic, e.g. "resource".
    pub fn from_configure(
        provider_data: Option<Arc<dyn Any + Send + Sync>>,
        receiver: &str,
    ) -> Result<Self, Diagnostic> {
        match provider_data {
            Some(data) => data.downcast_ref::<MpsProviderData>().cloned().ok_or_else(|| {
                Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract MpsProviderData from provider data",
                )
            }),
            None => Err(Diagnostic::error(
                "No provider data",
                format!("No provider data was provided to the {}", receiver),
            )),
        }
    }

    pub fn service(&self) -> MpsService {
        MpsService::new(self.client.clone())
    }
}
