//! Typed provider identifiers and alias handling.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OneKeyError;

/// The closed set of supported vendors. Used as a lookup key everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProviderId {
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "azure-openai")]
    AzureOpenAi,
    #[serde(rename = "google")]
    GoogleAi,
    #[serde(rename = "anthropic")]
    Anthropic,
    #[serde(rename = "huggingface")]
    HuggingFace,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "tongyi")]
    Tongyi,
}

impl Default for ProviderId {
    fn default() -> Self {
        Self::Tongyi
    }
}

impl ProviderId {
    pub const COUNT: usize = 7;

    /// Every provider, in declaration order.
    pub const ALL: [ProviderId; Self::COUNT] = [
        Self::OpenAi,
        Self::AzureOpenAi,
        Self::GoogleAi,
        Self::Anthropic,
        Self::HuggingFace,
        Self::Ollama,
        Self::Tongyi,
    ];

    /// Canonical provider key string.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::AzureOpenAi => "azure-openai",
            Self::GoogleAi => "google",
            Self::Anthropic => "anthropic",
            Self::HuggingFace => "huggingface",
            Self::Ollama => "ollama",
            Self::Tongyi => "tongyi",
        }
    }

    /// Human-readable vendor name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::OpenAi => "OpenAI",
            Self::AzureOpenAi => "Azure OpenAI",
            Self::GoogleAi => "Google AI",
            Self::Anthropic => "Anthropic",
            Self::HuggingFace => "Hugging Face",
            Self::Ollama => "Ollama",
            Self::Tongyi => "Tongyi",
        }
    }

    /// Position in [`ProviderId::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::OpenAi => 0,
            Self::AzureOpenAi => 1,
            Self::GoogleAi => 2,
            Self::Anthropic => 3,
            Self::HuggingFace => 4,
            Self::Ollama => 5,
            Self::Tongyi => 6,
        }
    }

    /// Whether generation refuses to run without an API key.
    pub const fn requires_api_key(self) -> bool {
        !matches!(self, Self::Ollama)
    }

    /// Parse user-facing provider aliases into a typed id.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "azure" | "azure-openai" | "azure_openai" | "azureopenai" => Some(Self::AzureOpenAi),
            "google" | "googleai" | "google-ai" | "gemini" => Some(Self::GoogleAi),
            "anthropic" | "claude" => Some(Self::Anthropic),
            "huggingface" | "hugging-face" | "hf" => Some(Self::HuggingFace),
            "ollama" => Some(Self::Ollama),
            "tongyi" | "qwen" | "dashscope" => Some(Self::Tongyi),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = OneKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| OneKeyError::InvalidArgument(format!("unknown provider '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderId;

    #[test]
    fn parses_aliases() {
        for alias in ["azure", "Azure-OpenAI", "azure_openai"] {
            assert_eq!(ProviderId::parse(alias), Some(ProviderId::AzureOpenAi));
        }
        for alias in ["tongyi", "qwen", "dashscope"] {
            assert_eq!(ProviderId::parse(alias), Some(ProviderId::Tongyi));
        }
        assert_eq!(ProviderId::parse("gemini"), Some(ProviderId::GoogleAi));
        assert_eq!(ProviderId::parse("mistral"), None);
    }

    #[test]
    fn display_round_trips_through_parse() {
        for id in ProviderId::ALL {
            assert_eq!(id.to_string().parse::<ProviderId>().unwrap(), id);
        }
    }

    #[test]
    fn index_matches_position_in_all() {
        for (i, id) in ProviderId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn serde_uses_canonical_keys() {
        let json = serde_json::to_string(&ProviderId::AzureOpenAi).unwrap();
        assert_eq!(json, "\"azure-openai\"");
        let id: ProviderId = serde_json::from_str("\"google\"").unwrap();
        assert_eq!(id, ProviderId::GoogleAi);
    }

    #[test]
    fn only_ollama_skips_api_key() {
        let keyless: Vec<_> = ProviderId::ALL
            .into_iter()
            .filter(|id| !id.requires_api_key())
            .collect();
        assert_eq!(keyless, vec![ProviderId::Ollama]);
    }
}
