//! OpenAI Chat Completions API adapter.
//!
//! The chat wire types here are shared with the Azure adapter.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{first_non_empty, GenerationRequest, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{bearer_headers, build_client, send, STANDARD_TIMEOUT};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Stop sequence the legacy completion endpoint is called with.
const LEGACY_STOP: &str = "\n\n";

pub struct OpenAiProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl OpenAiProvider {
    pub fn new() -> Result<Self> {
        Self::with_credentials(ProviderCredentials::with_base_url(DEFAULT_BASE_URL))
    }

    pub fn with_credentials(credentials: ProviderCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client(STANDARD_TIMEOUT)?,
            credentials: CredentialCell::new(credentials),
        })
    }

    /// Legacy `/completions` call. Not used by `generate_text`.
    pub async fn completions(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::OpenAi)?;
        let base_url = creds.require_base_url(ProviderId::OpenAi)?;
        request.validate()?;

        let body = serde_json::json!({
            "model": request.model,
            "prompt": request.prompt,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
            "stop": [LEGACY_STOP],
        });

        debug!(model = %request.model, "OpenAI completions");

        let text = send(
            self.client
                .post(format!("{base_url}/completions"))
                .headers(bearer_headers(api_key)?)
                .json(&body),
        )
        .await?;

        let data: LegacyCompletionResponse =
            super::http::decode_envelope(ProviderId::OpenAi, &text)?;
        Ok(data.into_unified())
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::OpenAi)?;
        let base_url = creds.require_base_url(ProviderId::OpenAi)?;
        request.validate()?;

        let body = chat_body(Some(&request.model), request);

        debug!(model = %request.model, "OpenAI generate_text");

        let text = send(
            self.client
                .post(format!("{base_url}/chat/completions"))
                .headers(bearer_headers(api_key)?)
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::OpenAi, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// snake_case chat body. Azure omits `model`; the deployment selects it.
pub(crate) fn chat_body(model: Option<&str>, request: &GenerationRequest) -> serde_json::Value {
    let mut body = serde_json::json!({
        "messages": request.chat_messages(),
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    });
    if let (Some(model), Some(obj)) = (model, body.as_object_mut()) {
        obj.insert("model".into(), model.into());
    }
    body
}

// Chat Completions wire types (shared with Azure)

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Option<Vec<ChatChoice>>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl ChatCompletionResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let choices = self.choices.unwrap_or_default();
        let content = first_non_empty(
            choices
                .iter()
                .map(|c| c.message.as_ref().and_then(|m| m.content.as_deref())),
        )
        .unwrap_or_default();

        UnifiedResponse::new(content)
            .with_metadata("Usage", self.usage)
            .with_text_metadata("Id", self.id)
            .with_text_metadata("Model", self.model)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacyCompletionResponse {
    pub id: Option<String>,
    pub model: Option<String>,
    pub choices: Option<Vec<LegacyChoice>>,
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LegacyChoice {
    pub text: Option<String>,
}

impl LegacyCompletionResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let choices = self.choices.unwrap_or_default();
        let content = first_non_empty(choices.iter().map(|c| c.text.as_deref())).unwrap_or_default();

        UnifiedResponse::new(content)
            .with_metadata("Usage", self.usage)
            .with_text_metadata("Id", self.id)
            .with_text_metadata("Model", self.model)
    }
}
