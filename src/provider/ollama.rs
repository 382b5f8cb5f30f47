//! Ollama local provider (`/api/generate`, non-streaming).

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{flatten_messages, GenerationRequest, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{build_client, json_headers, send, EXTENDED_TIMEOUT};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

pub struct OllamaProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl OllamaProvider {
    pub fn new() -> Result<Self> {
        Self::with_credentials(ProviderCredentials::with_base_url(DEFAULT_BASE_URL))
    }

    pub fn with_credentials(credentials: ProviderCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client(EXTENDED_TIMEOUT)?,
            credentials: CredentialCell::new(credentials),
        })
    }
}

fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
    let prompt = if request.messages.is_empty() {
        request.prompt.clone()
    } else {
        flatten_messages(&request.messages)
    };
    serde_json::json!({
        "model": request.model,
        "prompt": prompt,
        "stream": false,
        "think": false,
        "options": {
            "temperature": request.temperature,
            "num_predict": request.max_tokens,
        },
    })
}

#[async_trait]
impl ModelProvider for OllamaProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Ollama
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        // Local server: no API key.
        let creds = self.credentials.snapshot();
        let base_url = creds.require_base_url(ProviderId::Ollama)?;
        request.validate()?;

        let body = build_request_body(request);

        debug!(model = %request.model, "Ollama generate_text");

        let text = send(
            self.client
                .post(format!("{base_url}/api/generate"))
                .headers(json_headers())
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::Ollama, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateResponse {
    model: Option<String>,
    response: Option<String>,
    done_reason: Option<String>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt_eval_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eval_count: Option<u32>,
}

impl GenerateResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let usage = (self.prompt_eval_count.is_some() || self.eval_count.is_some()).then_some(
            OllamaUsage {
                prompt_eval_count: self.prompt_eval_count,
                eval_count: self.eval_count,
            },
        );

        UnifiedResponse::new(self.response.unwrap_or_default())
            .with_text_metadata("Model", self.model)
            .with_text_metadata("DoneReason", self.done_reason)
            .with_metadata("Usage", usage)
    }
}
