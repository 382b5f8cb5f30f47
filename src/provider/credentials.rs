//! Per-provider credential record and its interior-mutable holder.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::{OneKeyError, Result};
use crate::models::ProviderId;

/// API key, base URL and vendor-specific extras for one provider.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCredentials {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.api_key.is_empty() { "" } else { "***" };
        f.debug_struct("ProviderCredentials")
            .field("api_key", &key)
            .field("base_url", &self.base_url)
            .field("extras", &self.extras)
            .finish()
    }
}

impl ProviderCredentials {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            extras: BTreeMap::new(),
        }
    }

    /// Vendor default: public base URL, empty key.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::new(String::new(), base_url)
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn require_api_key(&self, provider: ProviderId) -> Result<&str> {
        non_blank(&self.api_key).ok_or_else(|| {
            OneKeyError::Configuration(format!("{} API key is not set", provider.display_name()))
        })
    }

    /// Base URL without a trailing slash.
    pub fn require_base_url(&self, provider: ProviderId) -> Result<&str> {
        non_blank(&self.base_url)
            .map(|url| url.trim_end_matches('/'))
            .ok_or_else(|| {
                OneKeyError::Configuration(format!(
                    "{} base URL is not set",
                    provider.display_name()
                ))
            })
    }

    pub fn require_extra(&self, provider: ProviderId, key: &str, label: &str) -> Result<&str> {
        self.extra(key).and_then(non_blank).ok_or_else(|| {
            OneKeyError::Configuration(format!("{} {label} is not set", provider.display_name()))
        })
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Holds one adapter's credentials. Calls read a snapshot, setters replace fields.
#[derive(Debug, Default)]
pub struct CredentialCell {
    inner: RwLock<ProviderCredentials>,
}

impl CredentialCell {
    pub fn new(credentials: ProviderCredentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }

    /// Owned copy of the current credentials.
    pub fn snapshot(&self) -> ProviderCredentials {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, apply: impl FnOnce(&mut ProviderCredentials)) {
        match self.inner.write() {
            Ok(mut guard) => apply(&mut guard),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        }
    }

    pub fn replace(&self, credentials: ProviderCredentials) {
        self.update(|current| *current = credentials);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let creds = ProviderCredentials::new("sk-secret", "https://example.test");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn blank_key_is_configuration_error() {
        let creds = ProviderCredentials::new("   ", "https://example.test");
        let err = creds.require_api_key(ProviderId::OpenAi).unwrap_err();
        assert!(matches!(err, OneKeyError::Configuration(msg) if msg.contains("OpenAI API key")));
    }

    #[test]
    fn base_url_loses_trailing_slash() {
        let creds = ProviderCredentials::with_base_url("http://localhost:11434/");
        assert_eq!(
            creds.require_base_url(ProviderId::Ollama).unwrap(),
            "http://localhost:11434"
        );
    }

    #[test]
    fn snapshot_is_detached_from_later_updates() {
        let cell = CredentialCell::new(ProviderCredentials::new("old", "u"));
        let before = cell.snapshot();
        cell.update(|c| c.api_key = "new".into());
        assert_eq!(before.api_key, "old");
        assert_eq!(cell.snapshot().api_key, "new");
    }
}
