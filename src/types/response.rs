//! The vendor-agnostic result of a generation call.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// What every adapter produces. Vendor envelopes never leak past this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UnifiedResponse {
    pub content: String,
    /// Auxiliary vendor data (`Usage`, `Id`, `Model`, ...) in insertion order.
    #[serde(default)]
    pub metadata: IndexMap<String, serde_json::Value>,
}

impl UnifiedResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: IndexMap::new(),
        }
    }

    /// Record a metadata entry; `None` values are skipped so absent fields stay absent.
    pub fn with_metadata<T: Serialize>(mut self, key: &str, value: Option<T>) -> Self {
        if let Some(value) = value {
            if let Ok(json) = serde_json::to_value(value) {
                self.metadata.insert(key.to_string(), json);
            }
        }
        self
    }

    /// Like [`with_metadata`](Self::with_metadata), but also skips empty strings.
    pub fn with_text_metadata(self, key: &str, value: Option<String>) -> Self {
        self.with_metadata(key, value.filter(|v| !v.is_empty()))
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }
}

/// First fragment that is present and non-empty.
pub(crate) fn first_non_empty<'a, I>(fragments: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    fragments
        .into_iter()
        .flatten()
        .find(|text| !text.is_empty())
        .map(str::to_string)
}
