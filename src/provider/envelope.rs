//! Closed set of raw vendor response shapes.
//!
//! Each adapter decodes into its own variant and maps it with a pure
//! `into_unified`, so vendor schemas never escape this module's callers.

use tracing::trace;

use crate::error::Result;
use crate::types::UnifiedResponse;

use super::anthropic::MessagesResponse;
use super::google::GenerateContentResponse;
use super::http::decode_envelope;
use super::huggingface::InferenceResponse;
use super::ollama::GenerateResponse;
use super::openai::ChatCompletionResponse;
use super::tongyi::TongyiResponse;
use super::ProviderId;

#[derive(Debug)]
pub(crate) enum VendorEnvelope {
    OpenAi(ChatCompletionResponse),
    AzureOpenAi(ChatCompletionResponse),
    Google(GenerateContentResponse),
    Anthropic(MessagesResponse),
    HuggingFace(InferenceResponse),
    Ollama(GenerateResponse),
    Tongyi(TongyiResponse),
}

impl VendorEnvelope {
    /// Parse a successful response body with the schema `provider` speaks.
    pub(crate) fn decode(provider: ProviderId, body: &str) -> Result<Self> {
        Ok(match provider {
            ProviderId::OpenAi => Self::OpenAi(decode_envelope(provider, body)?),
            ProviderId::AzureOpenAi => Self::AzureOpenAi(decode_envelope(provider, body)?),
            ProviderId::GoogleAi => Self::Google(decode_envelope(provider, body)?),
            ProviderId::Anthropic => Self::Anthropic(decode_envelope(provider, body)?),
            ProviderId::HuggingFace => Self::HuggingFace(decode_envelope(provider, body)?),
            ProviderId::Ollama => Self::Ollama(decode_envelope(provider, body)?),
            ProviderId::Tongyi => Self::Tongyi(decode_envelope(provider, body)?),
        })
    }

    pub(crate) fn provider(&self) -> ProviderId {
        match self {
            Self::OpenAi(_) => ProviderId::OpenAi,
            Self::AzureOpenAi(_) => ProviderId::AzureOpenAi,
            Self::Google(_) => ProviderId::GoogleAi,
            Self::Anthropic(_) => ProviderId::Anthropic,
            Self::HuggingFace(_) => ProviderId::HuggingFace,
            Self::Ollama(_) => ProviderId::Ollama,
            Self::Tongyi(_) => ProviderId::Tongyi,
        }
    }

    pub(crate) fn into_unified(self) -> UnifiedResponse {
        trace!(provider = %self.provider(), "mapping vendor envelope");
        match self {
            Self::OpenAi(raw) | Self::AzureOpenAi(raw) => raw.into_unified(),
            Self::Google(raw) => raw.into_unified(),
            Self::Anthropic(raw) => raw.into_unified(),
            Self::HuggingFace(raw) => raw.into_unified(),
            Self::Ollama(raw) => raw.into_unified(),
            Self::Tongyi(raw) => raw.into_unified(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OneKeyError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn unify(provider: ProviderId, body: serde_json::Value) -> UnifiedResponse {
        let envelope = VendorEnvelope::decode(provider, &body.to_string()).unwrap();
        assert_eq!(envelope.provider(), provider);
        envelope.into_unified()
    }

    #[test]
    fn openai_takes_first_non_empty_choice() {
        let unified = unify(
            ProviderId::OpenAi,
            json!({
                "id": "chatcmpl-1",
                "model": "gpt-3.5-turbo",
                "choices": [
                    {"message": {"role": "assistant", "content": ""}},
                    {"message": {"role": "assistant", "content": "Hello"}}
                ],
                "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
            }),
        );
        assert_eq!(unified.content, "Hello");
        assert_eq!(unified.metadata_str("Id"), Some("chatcmpl-1"));
        assert_eq!(unified.metadata["Usage"]["total_tokens"], 4);
    }

    #[test]
    fn azure_shares_chat_shape() {
        let unified = unify(
            ProviderId::AzureOpenAi,
            json!({"choices": [{"message": {"content": "hi"}}]}),
        );
        assert_eq!(unified.content, "hi");
        assert!(unified.metadata.is_empty());
    }

    #[test]
    fn google_takes_first_candidate_with_text() {
        let unified = unify(
            ProviderId::GoogleAi,
            json!({
                "candidates": [
                    {"content": {"parts": []}},
                    {"content": {"role": "model", "parts": [{"text": "Bonjour"}]}}
                ],
                "usageMetadata": {"promptTokenCount": 2, "candidatesTokenCount": 1, "totalTokenCount": 3},
                "modelVersion": "gemini-2.5-flash",
                "responseId": "r-1"
            }),
        );
        assert_eq!(unified.content, "Bonjour");
        assert_eq!(unified.metadata_str("ModelVersion"), Some("gemini-2.5-flash"));
        assert_eq!(unified.metadata_str("ResponseId"), Some("r-1"));
        assert_eq!(unified.metadata["UsageMetadata"]["totalTokenCount"], 3);
    }

    #[test]
    fn anthropic_uses_first_text_block() {
        let unified = unify(
            ProviderId::Anthropic,
            json!({
                "id": "msg_1",
                "model": "claude-3-opus-20240229",
                "role": "assistant",
                "content": [{"type": "text", "text": ""}, {"type": "text", "text": "Hi there"}],
                "usage": {"input_tokens": 5, "output_tokens": 2}
            }),
        );
        assert_eq!(unified.content, "Hi there");
        assert_eq!(unified.metadata_str("Role"), Some("assistant"));
        assert_eq!(unified.metadata["Usage"]["output_tokens"], 2);
    }

    #[test]
    fn huggingface_accepts_list_or_object() {
        let list = unify(
            ProviderId::HuggingFace,
            json!([{"generated_text": "from list", "score": 0.5}]),
        );
        assert_eq!(list.content, "from list");
        assert_eq!(list.metadata["Score"], 0.5);

        let object = unify(ProviderId::HuggingFace, json!({"answer": "42"}));
        assert_eq!(object.content, "42");
    }

    #[test]
    fn ollama_reads_response_field() {
        let unified = unify(
            ProviderId::Ollama,
            json!({
                "model": "llama2",
                "response": "你好，世界",
                "done": true,
                "done_reason": "stop",
                "prompt_eval_count": 10,
                "eval_count": 4
            }),
        );
        assert_eq!(unified.content, "你好，世界");
        assert_eq!(unified.metadata_str("DoneReason"), Some("stop"));
        assert_eq!(unified.metadata["Usage"]["eval_count"], 4);
    }

    #[test]
    fn tongyi_accepts_native_and_compatible_shapes() {
        let native = unify(
            ProviderId::Tongyi,
            json!({
                "request_id": "req-1",
                "output": {"choices": [{"message": {"role": "assistant", "content": "译文"}}]},
                "usage": {"input_tokens": 3, "output_tokens": 2, "total_tokens": 5}
            }),
        );
        assert_eq!(native.content, "译文");
        assert_eq!(native.metadata_str("RequestId"), Some("req-1"));

        let text_only = unify(ProviderId::Tongyi, json!({"output": {"text": "plain"}}));
        assert_eq!(text_only.content, "plain");

        let compatible = unify(
            ProviderId::Tongyi,
            json!({"id": "c-1", "model": "qwen-plus", "choices": [{"message": {"content": "兼容"}}]}),
        );
        assert_eq!(compatible.content, "兼容");
        assert_eq!(compatible.metadata_str("Id"), Some("c-1"));
    }

    #[test]
    fn missing_fragment_yields_empty_content() {
        let unified = unify(ProviderId::OpenAi, json!({"choices": []}));
        assert_eq!(unified.content, "");
    }

    #[test]
    fn empty_object_is_empty_response() {
        for provider in ProviderId::ALL {
            let err = VendorEnvelope::decode(provider, "{}").unwrap_err();
            assert!(matches!(err, OneKeyError::EmptyResponse { .. }), "{provider}");
        }
    }
}
