//! HuggingFace Inference API adapter.

use std::any::Any;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::types::{first_non_empty, flatten_messages, GenerationRequest, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{bearer_headers, build_client, send, EXTENDED_TIMEOUT};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";

const TOP_K: u32 = 50;
const TOP_P: f64 = 0.95;
const REPETITION_PENALTY: f64 = 1.0;

pub struct HuggingFaceProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl HuggingFaceProvider {
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
    let inputs = if request.messages.is_empty() {
        request.prompt.clone()
    } else {
        flatten_messages(&request.messages)
    };
    serde_json::json!({
        "inputs": inputs,
        "parameters": {
            "temperature": request.temperature,
            "max_new_tokens": request.max_tokens,
            "top_k": TOP_K,
            "top_p": TOP_P,
            "repetition_penalty": REPETITION_PENALTY,
            "return_full_text": false,
        },
    })
}

#[async_trait]
impl ModelProvider for HuggingFaceProvider {
    fn id(&self) -> ProviderId {
        ProviderId::HuggingFace
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::HuggingFace)?;
        let base_url = creds.require_base_url(ProviderId::HuggingFace)?;
        request.validate()?;

        let body = build_request_body(request);

        debug!(model = %request.model, "HuggingFace generate_text");

        let text = send(
            self.client
                .post(format!("{base_url}/{}", request.model))
                .headers(bearer_headers(api_key)?)
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::HuggingFace, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Text-generation endpoints answer with a list; some task pipelines with one object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum InferenceResponse {
    Many(Vec<Generation>),
    One(Generation),
}

#[derive(Debug, Deserialize)]
pub(crate) struct Generation {
    generated_text: Option<String>,
    generated_texts: Option<Vec<String>>,
    answer: Option<String>,
    score: Option<f64>,
}

impl Generation {
    fn text(&self) -> Option<String> {
        first_non_empty([
            self.generated_text.as_deref(),
            self.generated_texts
                .as_ref()
                .and_then(|texts| texts.first())
                .map(String::as_str),
            self.answer.as_deref(),
        ])
    }
}

impl InferenceResponse {
    /// Only the first generation is read.
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let first = match self {
            Self::Many(items) => items.into_iter().next(),
            Self::One(item) => Some(item),
        };
        let content = first.as_ref().and_then(Generation::text).unwrap_or_default();
        let score = first.and_then(|g| g.score);

        UnifiedResponse::new(content).with_metadata("Score", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn parameters_are_fixed_by_adapter() {
        let request = GenerationRequest::new("gpt2", "hello", 0.7, 100);
        let body = build_request_body(&request);
        assert_eq!(body["inputs"], "hello");
        assert_eq!(body["parameters"]["max_new_tokens"], 100);
        assert_eq!(body["parameters"]["top_k"], 50);
        assert_eq!(body["parameters"]["return_full_text"], false);
    }

    #[test]
    fn messages_are_flattened() {
        let request = GenerationRequest::builder()
            .model("gpt2")
            .messages(vec![ChatMessage::system("s"), ChatMessage::user("u")])
            .build();
        assert_eq!(build_request_body(&request)["inputs"], "system: s\nuser: u");
    }

    #[test]
    fn generated_texts_fallback() {
        let data: InferenceResponse =
            serde_json::from_value(serde_json::json!([{"generated_texts": ["first", "second"]}]))
                .unwrap();
        let unified = data.into_unified();
        assert_eq!(unified.content, "first");
        assert!(unified.metadata.is_empty());
    }

    #[test]
    fn later_generations_are_ignored() {
        let data: InferenceResponse = serde_json::from_value(serde_json::json!([
            {"generated_text": ""},
            {"generated_text": "second"}
        ]))
        .unwrap();
        assert_eq!(data.into_unified().content, "");
    }
}
