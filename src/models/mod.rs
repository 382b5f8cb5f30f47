//! Provider ids and the per-provider default model table.

pub mod provider_id;

pub use provider_id::ProviderId;

use std::collections::HashMap;

/// Model used when no provider-specific entry applies.
pub const FALLBACK_MODEL: &str = "qwen-plus";

impl ProviderId {
    /// The model id a translation run uses when nothing is configured.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-3.5-turbo",
            Self::AzureOpenAi => "gpt-35-turbo",
            Self::GoogleAi => "gemini-2.5-flash",
            Self::Anthropic => "claude-3-opus-20240229",
            Self::HuggingFace => "microsoft/DialoGPT-medium",
            Self::Ollama => "llama2",
            Self::Tongyi => "qwen-plus",
        }
    }
}

/// Static default-model lookup with optional per-provider overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelTable {
    overrides: HashMap<ProviderId, String>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the model for one provider. Blank names clear the override.
    pub fn set(&mut self, provider: ProviderId, model: impl Into<String>) {
        let model = model.into();
        if model.trim().is_empty() {
            self.overrides.remove(&provider);
        } else {
            self.overrides.insert(provider, model);
        }
    }

    pub fn with(mut self, provider: ProviderId, model: impl Into<String>) -> Self {
        self.set(provider, model);
        self
    }

    /// Resolve the model for a provider; `None` yields the global fallback.
    pub fn model_for(&self, provider: Option<ProviderId>) -> String {
        match provider {
            Some(id) => self
                .overrides
                .get(&id)
                .cloned()
                .unwrap_or_else(|| id.default_model().to_string()),
            None => FALLBACK_MODEL.to_string(),
        }
    }
}
