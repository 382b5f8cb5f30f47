//! Generation request.

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::message::ChatMessage;
use crate::error::{OneKeyError, Result};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// One text-generation call, built fresh per request.
///
/// ```
/// use onekey::types::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .model("qwen-plus")
///     .prompt("Hello")
///     .temperature(0.2)
///     .build();
/// assert_eq!(request.max_tokens, 1000);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    #[builder(into)]
    pub model: String,
    #[builder(into, default)]
    pub prompt: String,
    /// When non-empty, sent instead of a single user message built from `prompt`.
    #[builder(default)]
    pub messages: Vec<ChatMessage>,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    #[builder(default = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// Shorthand for the uniform `(model, prompt, temperature, max_tokens)` contract.
    pub fn new(
        model: impl Into<String>,
        prompt: impl Into<String>,
        temperature: f64,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            messages: Vec::new(),
            temperature,
            max_tokens,
        }
    }

    /// Reject blank model or blank prompt before any network work.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(OneKeyError::Validation("model cannot be blank".into()));
        }
        if self.prompt.trim().is_empty() && self.messages.is_empty() {
            return Err(OneKeyError::Validation("prompt cannot be blank".into()));
        }
        Ok(())
    }

    /// The message list to send: explicit messages, or the prompt as one user turn.
    pub fn chat_messages(&self) -> Vec<ChatMessage> {
        if self.messages.is_empty() {
            vec![ChatMessage::user(self.prompt.clone())]
        } else {
            self.messages.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_model_is_rejected() {
        let request = GenerationRequest::new("  ", "hello", 0.7, 10);
        assert!(matches!(request.validate(), Err(OneKeyError::Validation(_))));
    }

    #[test]
    fn blank_prompt_is_rejected_without_messages() {
        let request = GenerationRequest::new("gpt", "\n\t", 0.7, 10);
        assert!(matches!(request.validate(), Err(OneKeyError::Validation(_))));
    }

    #[test]
    fn messages_satisfy_prompt_requirement() {
        let request = GenerationRequest::builder()
            .model("gpt")
            .messages(vec![ChatMessage::user("hi")])
            .build();
        assert!(request.validate().is_ok());
        assert_eq!(request.chat_messages(), vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn prompt_becomes_single_user_message() {
        let request = GenerationRequest::new("gpt", "translate me", 0.7, 10);
        assert_eq!(request.chat_messages(), vec![ChatMessage::user("translate me")]);
    }
}
