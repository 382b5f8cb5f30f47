//! Capture → translate → notify pipeline.
//!
//! The pipeline talks to the desktop only through the collaborator traits
//! below; [`crate::desktop`] provides command-backed implementations.

pub mod runner;

pub use runner::{PipelineState, RunOutcome, TranslationPipeline};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{OneKeyError, Result};
use crate::types::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Instruction appended to the captured text.
pub const TRANSLATE_INSTRUCTION: &str =
    "以上内容如果是中文则翻译成英文，如果是英文则翻译成中文";

pub const DEFAULT_SETTLE_DELAY_MS: u64 = 200;

/// Fixed zh↔en translation prompt for `text`.
pub fn build_prompt(text: &str) -> String {
    format!("{text}\n{TRANSLATE_INSTRUCTION}")
}

/// Reads plain text from the system clipboard.
#[async_trait]
pub trait ClipboardReader: Send + Sync {
    /// `Ok(None)` when the clipboard holds no plain text.
    async fn read_text(&self) -> Result<Option<String>>;
}

/// Simulates the platform copy keystroke in the focused window.
#[async_trait]
pub trait CopyTrigger: Send + Sync {
    async fn send_copy(&self) -> Result<()>;
}

/// Renders a desktop notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// The captured source text.
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn translated(source: &str, translation: &str) -> Self {
        Self {
            title: source.to_string(),
            body: translation.to_string(),
        }
    }

    pub fn failed(source: &str, error: &OneKeyError) -> Self {
        Self {
            title: source.to_string(),
            body: error.to_string(),
        }
    }
}

/// Per-run knobs, persisted under `pipeline` in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Wait between the copy keystroke and the clipboard read.
    pub settle_delay_ms: u64,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Show invocation failures as a notification instead of only logging them.
    pub notify_errors: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            notify_errors: false,
        }
    }
}
