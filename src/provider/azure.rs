//! Azure OpenAI adapter.
//!
//! Same chat schema as OpenAI, but addressed by deployment rather than model
//! and authenticated with an `api-key` header.

use std::any::Any;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::types::{GenerationRequest, UnifiedResponse};

use super::envelope::VendorEnvelope;
use super::http::{api_key_headers, build_client, decode_envelope, send, STANDARD_TIMEOUT};
use super::openai::{chat_body, LegacyCompletionResponse};
use super::{CredentialCell, ModelProvider, ProviderCredentials, ProviderId};

pub const API_VERSION: &str = "2023-05-15";

/// Extras key holding the deployment name.
pub const DEPLOYMENT_KEY: &str = "deployment";

pub struct AzureOpenAiProvider {
    client: reqwest::Client,
    credentials: CredentialCell,
}

impl AzureOpenAiProvider {
    /// No public default endpoint exists; base URL and deployment must be set.
    pub fn new() -> Result<Self> {
        Self::with_credentials(ProviderCredentials::default())
    }

    pub fn with_credentials(credentials: ProviderCredentials) -> Result<Self> {
        Ok(Self {
            client: build_client(STANDARD_TIMEOUT)?,
            credentials: CredentialCell::new(credentials),
        })
    }

    pub fn set_deployment_name(&self, deployment: &str) {
        self.set_extra(DEPLOYMENT_KEY, deployment);
    }

    pub fn deployment_name(&self) -> Option<String> {
        self.credentials
            .snapshot()
            .extra(DEPLOYMENT_KEY)
            .map(str::to_string)
    }

    /// Resolve `{base}/openai/deployments/{deployment}/{operation}` and the key.
    fn endpoint(creds: &ProviderCredentials, operation: &str) -> Result<String> {
        let base_url = creds.require_base_url(ProviderId::AzureOpenAi)?;
        let deployment =
            creds.require_extra(ProviderId::AzureOpenAi, DEPLOYMENT_KEY, "deployment name")?;
        Ok(format!("{base_url}/openai/deployments/{deployment}/{operation}"))
    }

    /// Legacy deployment `/completions` call.
    pub async fn completions(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::AzureOpenAi)?;
        let url = Self::endpoint(&creds, "completions")?;
        request.validate()?;

        let body = serde_json::json!({
            "prompt": request.prompt,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        debug!(model = %request.model, "Azure OpenAI completions");

        let text = send(
            self.client
                .post(url)
                .query(&[("api-version", API_VERSION)])
                .headers(api_key_headers(api_key)?)
                .json(&body),
        )
        .await?;

        let data: LegacyCompletionResponse = decode_envelope(ProviderId::AzureOpenAi, &text)?;
        Ok(data.into_unified())
    }
}

#[async_trait]
impl ModelProvider for AzureOpenAiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AzureOpenAi
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        let creds = self.credentials.snapshot();
        let api_key = creds.require_api_key(ProviderId::AzureOpenAi)?;
        let url = Self::endpoint(&creds, "chat/completions")?;
        request.validate()?;

        // The deployment fixes the model; the request's model id is not sent.
        let body = chat_body(None, request);

        debug!(model = %request.model, "Azure OpenAI generate_text");

        let text = send(
            self.client
                .post(url)
                .query(&[("api-version", API_VERSION)])
                .headers(api_key_headers(api_key)?)
                .json(&body),
        )
        .await?;

        Ok(VendorEnvelope::decode(ProviderId::AzureOpenAi, &text)?.into_unified())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_requires_deployment() {
        let creds = ProviderCredentials::new("k", "https://res.openai.azure.com/");
        let err = AzureOpenAiProvider::endpoint(&creds, "chat/completions").unwrap_err();
        assert!(err.to_string().contains("deployment name"));

        let creds = creds.with_extra(DEPLOYMENT_KEY, "gpt35");
        assert_eq!(
            AzureOpenAiProvider::endpoint(&creds, "chat/completions").unwrap(),
            "https://res.openai.azure.com/openai/deployments/gpt35/chat/completions"
        );
    }

    #[test]
    fn deployment_setter_round_trips() {
        let provider = AzureOpenAiProvider::new().unwrap();
        assert_eq!(provider.deployment_name(), None);
        provider.set_deployment_name("prod");
        assert_eq!(provider.deployment_name().as_deref(), Some("prod"));
    }
}
