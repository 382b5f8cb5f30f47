//! Provider registry: one adapter per [`ProviderId`], resolved without failure.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;

use super::anthropic::AnthropicProvider;
use super::azure::AzureOpenAiProvider;
use super::google::GoogleProvider;
use super::huggingface::HuggingFaceProvider;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use super::tongyi::TongyiProvider;
use super::{ModelProvider, ProviderId};

/// Owns exactly one adapter per provider id for the process lifetime.
///
/// Slots are indexed by [`ProviderId::index`], so lookup is total: there is no
/// "unregistered provider" path.
pub struct ProviderRegistry {
    providers: [Arc<dyn ModelProvider>; ProviderId::COUNT],
}

impl ProviderRegistry {
    /// Build the seven vendor adapters with their default credentials.
    pub fn new() -> Result<Self> {
        let providers: [Arc<dyn ModelProvider>; ProviderId::COUNT] = [
            Arc::new(OpenAiProvider::new()?),
            Arc::new(AzureOpenAiProvider::new()?),
            Arc::new(GoogleProvider::new()?),
            Arc::new(AnthropicProvider::new()?),
            Arc::new(HuggingFaceProvider::new()?),
            Arc::new(OllamaProvider::new()?),
            Arc::new(TongyiProvider::new()?),
        ];
        debug!(count = providers.len(), "provider registry initialized");
        Ok(Self { providers })
    }

    /// Replace the adapter in the slot its [`ModelProvider::id`] names.
    pub fn with_provider(mut self, provider: Arc<dyn ModelProvider>) -> Self {
        let slot = provider.id().index();
        self.providers[slot] = provider;
        self
    }

    pub fn get(&self, id: ProviderId) -> Arc<dyn ModelProvider> {
        Arc::clone(&self.providers[id.index()])
    }

    /// Typed retrieval for vendor-specific configuration.
    ///
    /// ```no_run
    /// # fn main() -> onekey::error::Result<()> {
    /// use onekey::provider::{azure::AzureOpenAiProvider, ProviderRegistry};
    ///
    /// let registry = ProviderRegistry::new()?;
    /// if let Some(azure) = registry.concrete::<AzureOpenAiProvider>() {
    ///     azure.set_deployment_name("gpt35");
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn concrete<T: ModelProvider>(&self) -> Option<&T> {
        self.providers
            .iter()
            .find_map(|p| p.as_any().downcast_ref::<T>())
    }

    /// Adapters in [`ProviderId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ModelProvider>> {
        self.providers.iter()
    }
}
