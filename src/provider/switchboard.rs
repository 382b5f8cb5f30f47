//! Dispatcher that forwards calls to the currently selected provider.

use std::sync::{Arc, RwLock};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::types::{GenerationRequest, UnifiedResponse};

use super::{ModelProvider, ProviderId, ProviderRegistry};

/// Public description of one provider slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    pub display_name: &'static str,
    pub requires_api_key: bool,
    pub base_url: String,
    pub has_api_key: bool,
}

/// Holds the current provider selection over a [`ProviderRegistry`].
///
/// Switching only affects calls dispatched afterwards; an in-flight call keeps
/// the adapter and credentials it started with.
pub struct Switchboard {
    registry: Arc<ProviderRegistry>,
    current: RwLock<ProviderId>,
}

impl Switchboard {
    /// Starts on [`ProviderId::default`] (Tongyi).
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self {
            registry,
            current: RwLock::new(ProviderId::default()),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Always succeeds; every id has an adapter.
    pub fn switch_provider(&self, id: ProviderId) {
        let mut current = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if *current != id {
            info!(from = %*current, to = %id, "switched provider");
        }
        *current = id;
    }

    pub fn current_provider(&self) -> ProviderId {
        match self.current.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn current_adapter(&self) -> Arc<dyn ModelProvider> {
        self.registry.get(self.current_provider())
    }

    /// Uniform four-argument entry point.
    pub async fn generate_text(
        &self,
        model: &str,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<UnifiedResponse> {
        let request = GenerationRequest::new(model, prompt, temperature, max_tokens);
        self.generate(&request).await
    }

    /// Forward to the current provider; the adapter's result is returned unchanged.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let adapter = self.current_adapter();
        adapter.generate_text(request).await
    }

    /// Forward to a provider chosen by the caller, ignoring the selection.
    pub async fn generate_with(
        &self,
        id: ProviderId,
        request: &GenerationRequest,
    ) -> Result<UnifiedResponse> {
        self.registry.get(id).generate_text(request).await
    }

    /// Applies to the current provider only.
    pub fn set_api_key(&self, api_key: &str) {
        self.current_adapter().set_api_key(api_key);
    }

    /// Applies to the current provider only.
    pub fn set_base_url(&self, base_url: &str) {
        self.current_adapter().set_base_url(base_url);
    }

    pub fn providers(&self) -> Vec<ProviderInfo> {
        self.registry
            .iter()
            .map(|adapter| {
                let id = adapter.id();
                let creds = adapter.credentials();
                ProviderInfo {
                    id,
                    display_name: id.display_name(),
                    requires_api_key: id.requires_api_key(),
                    has_api_key: creds.has_api_key(),
                    base_url: creds.base_url,
                }
            })
            .collect()
    }
}
