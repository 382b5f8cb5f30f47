//! Google AI (Gemini) `generateContent` adapter.

use std::any::Any;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::types::{first_non_empty, GenerationRequest, Role, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{build_client, json_headers, send, STANDARD_TIMEOUT};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GoogleProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl GoogleProvider {
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

/// camelCase body: `contents`, optional `systemInstruction`, `generationConfig`.
fn build_request_body(request: &GenerationRequest) -> serde_json::Value {
    let mut system_instruction = None;
    let mut contents = Vec::new();

    for msg in request.chat_messages() {
        match msg.role {
            Role::System => {
                system_instruction = Some(serde_json::json!({
                    "parts": [{"text": msg.content}]
                }));
            }
            Role::User => contents.push(serde_json::json!({
                "role": "user",
                "parts": [{"text": msg.content}],
            })),
            Role::Assistant => contents.push(serde_json::json!({
                "role": "model",
                "parts": [{"text": msg.content}],
            })),
        }
    }

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        },
    });
    if let (Some(sys), Some(obj)) = (system_instruction, body.as_object_mut()) {
        obj.insert("systemInstruction".into(), sys);
    }
    body
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn id(&self) -> ProviderId {
        ProviderId::GoogleAi
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::GoogleAi)?;
        let base_url = creds.require_base_url(ProviderId::GoogleAi)?;
        request.validate()?;

        let body = build_request_body(request);
        let url = format!("{base_url}/models/{}:generateContent", request.model);

        debug!(model = %request.model, "Google generate_text");

        let text = send(
            self.client
                .post(url)
                .query(&[("key", api_key)])
                .headers(json_headers())
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::GoogleAi, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// Internal Gemini response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiCandidate {
    /// First part with non-empty text; later parts are ignored.
    fn first_text(&self) -> Option<&str> {
        self.content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .find(|text| !text.is_empty())
    }
}

impl GenerateContentResponse {
    pub(crate) fn into_unified(self) -> UnifiedResponse {
        let candidates = self.candidates.unwrap_or_default();
        let content =
            first_non_empty(candidates.iter().map(GeminiCandidate::first_text)).unwrap_or_default();

        UnifiedResponse::new(content)
            .with_metadata("UsageMetadata", self.usage_metadata)
            .with_text_metadata("ModelVersion", self.model_version)
            .with_text_metadata("ResponseId", self.response_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    #[test]
    fn prompt_becomes_user_content() {
        let request = GenerationRequest::new("gemini-2.5-flash", "hi", 0.3, 64);
        let body = build_request_body(&request);
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "generationConfig": {"temperature": 0.3, "maxOutputTokens": 64},
            })
        );
    }

    #[test]
    fn roles_map_to_gemini_conventions() {
        let request = GenerationRequest::builder()
            .model("gemini-2.5-flash")
            .messages(vec![
                ChatMessage::system("terse"),
                ChatMessage::user("q"),
                ChatMessage::assistant("a"),
            ])
            .build();
        let body = build_request_body(&request);
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "terse");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][1]["role"], "model");
        assert_eq!(body["contents"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn only_the_first_text_part_is_used() {
        let data: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [
                {"text": ""},
                {"text": "Thinking about it..."},
                {"text": "Bonjour"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(data.into_unified().content, "Thinking about it...");
    }

    #[test]
    fn candidate_without_text_falls_through() {
        let data: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                {"content": {"parts": [{"text": ""}]}},
                {},
                {"content": {"parts": [{"text": "Salut"}, {"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(data.into_unified().content, "Salut");
    }
}
