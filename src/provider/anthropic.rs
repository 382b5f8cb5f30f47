//! Anthropic Messages API adapter.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{first_non_empty, GenerationRequest, Role, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{anthropic_headers, build_client, decode_envelope, send, STANDARD_TIMEOUT};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl AnthropicProvider {
    pub fn new() -> Result<Self> {
        Self::with_credentials(ProviderCredentials::with_base_url(DEFAULT_BASE_URL))
    }

    pub fn with_credentials(credentials: ProviderCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client(STANDARD_TIMEOUT)?,
            credentials: CredentialCell::new(credentials),
        })
    }

    /// Legacy text-completions endpoint (`/complete`).
    pub async fn complete(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::Anthropic)?;
        let base_url = creds.require_base_url(ProviderId::Anthropic)?;
        request.validate()?;

        let body = serde_json::json!({
            "model": request.model,
            "prompt": format!("\n\nHuman: {}\n\nAssistant:", request.prompt),
            "max_tokens_to_sample": request.max_tokens,
            "temperature": request.temperature,
        });

        debug!(model = %request.model, "Anthropic complete");

        let text = send(
            self.client
                .post(format!("{base_url}/complete"))
                .headers(anthropic_headers(api_key, API_VERSION)?)
                .json(&body),
        )
        .await?;

        let data: LegacyCompleteResponse = decode_envelope(ProviderId::Anthropic, &text)?;
        Ok(data.into_unified())
    }
}

fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
    let mut system_parts = Vec::new();
    let mut messages = Vec::new();

    for msg in request.chat_messages() {
        match msg.role {
            Role::System => system_parts.push(msg.content),
            Role::User | Role::Assistant => messages.push(serde_json::json!({
                "role": msg.role,
                "content": msg.content,
            })),
        }
    }

    let mut body = serde_json::json!({
        "model": request.model,
        "messages": messages,
        "max_tokens": request.max_tokens,
        "temperature": request.temperature,
    });
    if let Some(obj) = body.as_object_mut() {
        if !system_parts.is_empty() {
            obj.insert("system".into(), system_parts.join("\n").into());
        }
    }
    body
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::Anthropic)?;
        let base_url = creds.require_base_url(ProviderId::Anthropic)?;
        request.validate()?;

        let body = build_request_body(request);

        debug!(model = %request.model, "Anthropic generate_text");

        let text = send(
            self.client
                .post(format!("{base_url}/messages"))
                .headers(anthropic_headers(api_key, API_VERSION)?)
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::Anthropic, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Internal Anthropic response types

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    id: Option<String>,
    model: Option<String>,
    role: Option<String>,
    content: Option<Vec<ContentBlock>>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let blocks = self.content.unwrap_or_default();
        let content = first_non_empty(blocks.iter().map(|b| b.text.as_deref())).unwrap_or_default();

        UnifiedResponse::new(content)
            .with_metadata("Usage", self.usage)
            .with_text_metadata("Id", self.id)
            .with_text_metadata("Model", self.model)
            .with_text_metadata("Role", self.role)
    }
}

#[derive(Debug, Deserialize)]
struct LegacyCompleteResponse {
    completion: Option<String>,
    model: Option<String>,
    stop_reason: Option<String>,
}

impl LegacyCompleteResponse {
    fn into_unified(self) -> UnifiedResponse {
        UnifiedResponse::new(self.completion.unwrap_or_default())
            .with_text_metadata("Model", self.model)
            .with_text_metadata("StopReason", self.stop_reason)
    }
}
