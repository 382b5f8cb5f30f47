//! Tongyi Qianwen (DashScope) adapter.
//!
//! Requests go to the OpenAI-compatible endpoint. Responses are accepted in
//! either the compatible-mode shape or DashScope's native `output` envelope.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{first_non_empty, GenerationRequest, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{bearer_headers, build_client, send, STANDARD_TIMEOUT};
use super::openai::{chat_body, ChatChoice};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";

pub struct TongyiProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl TongyiProvider {
    pub fn new() -> Result<Self> {
        Self::with_credentials(ProviderCredentials::with_base_url(DEFAULT_BASE_URL))
    }

    pub fn with_credentials(credentials: ProviderCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client(STANDARD_TIMEOUT)?,
            credentials: CredentialCell::new(credentials),
        })
    }
}

#[async_trait]
impl ModelProvider for TongyiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Tongyi
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::Tongyi)?;
        let base_url = creds.require_base_url(ProviderId::Tongyi)?;
        request.validate()?;

        let body = chat_body(Some(&request.model), request);

        debug!(model = %request.model, "Tongyi generate_text");

        let text = send(
            self.client
                .post(format!("{base_url}/chat/completions"))
                .headers(bearer_headers(api_key)?)
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::Tongyi, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TongyiResponse {
    request_id: Option<String>,
    id: Option<String>,
    model: Option<String>,
    output: Option<TongyiOutput>,
    choices: Option<Vec<ChatChoice>>,
    usage: Option<TongyiUsage>,
}

#[derive(Debug, Deserialize)]
struct TongyiOutput {
    text: Option<String>,
    choices: Option<Vec<ChatChoice>>,
}

// Native mode reports input/output tokens, compatible mode prompt/completion.
#[derive(Debug, Serialize, Deserialize)]
struct TongyiUsage {
    #[serde(alias = "prompt_tokens", default)]
    input_tokens: u32,
    #[serde(alias = "completion_tokens", default)]
    output_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

fn choice_text(choices: Option<&Vec<ChatChoice>>) -> Option<&str> {
    choices?
        .iter()
        .filter_map(|c| c.message.as_ref().and_then(|m| m.content.as_deref()))
        .find(|text| !text.is_empty())
}

impl TongyiResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let output = self.output.as_ref();
        let content = first_non_empty([
            choice_text(output.and_then(|o| o.choices.as_ref())),
            output.and_then(|o| o.text.as_deref()),
            choice_text(self.choices.as_ref()),
        ])
        .unwrap_or_default();

        UnifiedResponse::new(content)
            .with_metadata("Usage", self.usage)
            .with_text_metadata("RequestId", self.request_id)
            .with_text_metadata("Id", self.id)
            .with_text_metadata("Model", self.model)
    }
}
