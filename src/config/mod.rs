//! Persistent application configuration.
//!
//! Resolution order for credentials: environment (`apply_env`) > config file >
//! adapter defaults.

pub mod store;

pub use store::{backup_path, default_config_path, CONFIG_PATH_ENV};

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{OneKeyError, Result};
use crate::models::{ModelTable, ProviderId};
use crate::pipeline::PipelineSettings;
use crate::provider::azure::DEPLOYMENT_KEY;
use crate::provider::Switchboard;

/// Stored settings for one provider. Absent fields keep the adapter default.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Azure only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("deployment", &self.deployment)
            .field("model", &self.model)
            .finish()
    }
}

/// The on-disk config document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub current_provider: ProviderId,
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
    pub pipeline: PipelineSettings,
    pub theme: String,
    pub language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current_provider: ProviderId::default(),
            providers: BTreeMap::new(),
            pipeline: PipelineSettings::default(),
            theme: "Light".to_string(),
            language: "zh-CN".to_string(),
        }
    }
}

#[derive(Clone, Copy)]
enum EnvField {
    ApiKey,
    BaseUrl,
    Deployment,
}

/// Variables read by [`AppConfig::apply_env`]; the first set name in a group wins.
const ENV_MAPPINGS: &[(&[&str], ProviderId, EnvField)] = &[
    (&["OPENAI_API_KEY"], ProviderId::OpenAi, EnvField::ApiKey),
    (&["OPENAI_BASE_URL"], ProviderId::OpenAi, EnvField::BaseUrl),
    (&["AZURE_OPENAI_API_KEY"], ProviderId::AzureOpenAi, EnvField::ApiKey),
    (&["AZURE_OPENAI_ENDPOINT"], ProviderId::AzureOpenAi, EnvField::BaseUrl),
    (&["AZURE_OPENAI_DEPLOYMENT"], ProviderId::AzureOpenAi, EnvField::Deployment),
    (&["GOOGLE_API_KEY", "GEMINI_API_KEY"], ProviderId::GoogleAi, EnvField::ApiKey),
    (&["ANTHROPIC_API_KEY"], ProviderId::Anthropic, EnvField::ApiKey),
    (&["ANTHROPIC_BASE_URL"], ProviderId::Anthropic, EnvField::BaseUrl),
    (&["HUGGINGFACE_API_KEY", "HF_TOKEN"], ProviderId::HuggingFace, EnvField::ApiKey),
    (&["OLLAMA_BASE_URL"], ProviderId::Ollama, EnvField::BaseUrl),
    (&["DASHSCOPE_API_KEY"], ProviderId::Tongyi, EnvField::ApiKey),
    (&["DASHSCOPE_BASE_URL"], ProviderId::Tongyi, EnvField::BaseUrl),
];

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Load the config at `path`, writing defaults first if it does not exist.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        match store::read_optional(path)? {
            Some(raw) => {
                let config = serde_json::from_str(&raw).map_err(OneKeyError::Serialization)?;
                debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            None => {
                let config = Self::default();
                config.save(path)?;
                info!(path = %path.display(), "created default config");
                Ok(config)
            }
        }
    }

    /// Like [`load_or_create`](Self::load_or_create), but a file that is not
    /// valid config JSON is moved to [`backup_path`] and replaced by defaults.
    ///
    /// Returns the backup location when that happened.
    pub fn load_or_recover(path: &Path) -> Result<(Self, Option<PathBuf>)> {
        match Self::load_or_create(path) {
            Err(OneKeyError::Serialization(err)) => {
                warn!(path = %path.display(), error = %err, "config file is not valid");
                let backup = store::move_to_backup(path)?;
                Ok((Self::load_or_create(path)?, Some(backup)))
            }
            other => other.map(|config| (config, None)),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(self).map_err(OneKeyError::Serialization)?;
        store::atomic_write(path, &serialized)
    }

    pub fn provider(&self, id: ProviderId) -> Option<&ProviderSettings> {
        self.providers.get(&id)
    }

    pub fn provider_mut(&mut self, id: ProviderId) -> &mut ProviderSettings {
        self.providers.entry(id).or_default()
    }

    /// Overlay credentials from the environment (and `.env`, if present).
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv();
        for (names, id, field) in ENV_MAPPINGS {
            let Some(value) = names
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|v| !v.trim().is_empty())
            else {
                continue;
            };
            let settings = self.provider_mut(*id);
            match field {
                EnvField::ApiKey => settings.api_key = Some(value),
                EnvField::BaseUrl => settings.base_url = Some(value),
                EnvField::Deployment => settings.deployment = Some(value),
            }
        }
    }

    /// Push stored credentials into each adapter and select the current provider.
    ///
    /// Credentials go to the named adapter directly, not through the current
    /// selection. Returns the model table built from per-provider overrides.
    pub fn apply(&self, switchboard: &Switchboard) -> ModelTable {
        let mut models = ModelTable::new();
        for (id, settings) in &self.providers {
            let adapter = switchboard.registry().get(*id);
            if let Some(key) = non_blank(settings.api_key.as_ref()) {
                adapter.set_api_key(key);
            }
            if let Some(url) = non_blank(settings.base_url.as_ref()) {
                adapter.set_base_url(url);
            }
            if let Some(deployment) = non_blank(settings.deployment.as_ref()) {
                adapter.set_extra(DEPLOYMENT_KEY, deployment);
            }
            if let Some(model) = non_blank(settings.model.as_ref()) {
                models.set(*id, model);
            }
        }
        switchboard.switch_provider(self.current_provider);
        models
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_shipped_config() {
        let config = AppConfig::default();
        assert_eq!(config.current_provider, ProviderId::Tongyi);
        assert_eq!(config.theme, "Light");
        assert_eq!(config.language, "zh-CN");
        assert_eq!(config.pipeline.settle_delay_ms, 200);
        assert!(!config.pipeline.notify_errors);
    }

    #[test]
    fn provider_map_uses_canonical_keys() {
        let mut config = AppConfig::default();
        config.provider_mut(ProviderId::AzureOpenAi).deployment = Some("gpt35".into());
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(
            json["providers"],
            serde_json::json!({"azure-openai": {"deployment": "gpt35"}})
        );
        let back: AppConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"current_provider": "ollama"}"#).unwrap();
        assert_eq!(config.current_provider, ProviderId::Ollama);
        assert_eq!(config.language, "zh-CN");
    }

    #[test]
    fn debug_hides_keys() {
        let settings = ProviderSettings {
            api_key: Some("sk-secret".into()),
            ..Default::default()
        };
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }
}
