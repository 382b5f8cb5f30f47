//! Convenience re-exports for common use.

pub use crate::config::AppConfig;
pub use crate::error::{OneKeyError, Result};
pub use crate::models::{ModelTable, ProviderId};
pub use crate::pipeline::{Notification, RunOutcome, TranslationPipeline};
pub use crate::provider::{ModelProvider, ProviderCredentials, ProviderRegistry, Switchboard};
pub use crate::types::{ChatMessage, GenerationRequest, Role, UnifiedResponse};
