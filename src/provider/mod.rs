//! Provider adapters, the registry that owns them, and the switchboard.

pub mod anthropic;
pub mod azure;
pub mod credentials;
pub(crate) mod envelope;
pub mod google;
pub mod http;
pub mod huggingface;
pub mod ollama;
pub mod openai;
pub mod registry;
pub mod switchboard;
pub mod tongyi;

pub use credentials::{CredentialCell, ProviderCredentials};
pub use registry::ProviderRegistry;
pub use switchboard::{ProviderInfo, Switchboard};

pub use crate::models::ProviderId;

use std::any::Any;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerationRequest, UnifiedResponse};

/// Uniform text-generation contract implemented by every vendor adapter.
#[async_trait]
pub trait ModelProvider: Send + Sync + 'static {
    /// Which vendor this adapter speaks to.
    fn id(&self) -> ProviderId;

    /// The adapter's credential record.
    fn credential_cell(&self) -> &CredentialCell;

    /// Perform one chat round-trip and map the vendor envelope.
    ///
    /// Credentials are read once, at call time.
    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse>;

    /// Typed access for vendor-specific configuration.
    fn as_any(&self) -> &dyn Any;

    /// Snapshot of the current credentials.
    fn credentials(&self) -> ProviderCredentials {
        self.credential_cell().snapshot()
    }

    /// Replace the credential record. No network call.
    fn configure(&self, credentials: ProviderCredentials) {
        self.credential_cell().replace(credentials);
    }

    fn set_api_key(&self, api_key: &str) {
        let api_key = api_key.to_string();
        self.credential_cell().update(|c| c.api_key = api_key);
    }

    fn set_base_url(&self, base_url: &str) {
        let base_url = base_url.to_string();
        self.credential_cell().update(|c| c.base_url = base_url);
    }

    fn set_extra(&self, key: &str, value: &str) {
        let (key, value) = (key.to_string(), value.to_string());
        self.credential_cell().update(|c| {
            c.extras.insert(key, value);
        });
    }
}
