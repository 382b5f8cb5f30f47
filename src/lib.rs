//! onekey: one hotkey to copy, translate and notify.
//!
//! A provider-normalization layer puts seven LLM vendors (OpenAI, Azure
//! OpenAI, Google AI, Anthropic, HuggingFace, Ollama, Tongyi) behind one
//! [`provider::ModelProvider`] contract. A [`provider::Switchboard`] routes
//! calls to the selected vendor, and a [`pipeline::TranslationPipeline`]
//! drives capture → translate → notify.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use onekey::prelude::*;
//!
//! # async fn example() -> onekey::error::Result<()> {
//! let switchboard = Switchboard::new(Arc::new(ProviderRegistry::new()?));
//! switchboard.switch_provider(ProviderId::Ollama);
//! let response = switchboard.generate_text("llama2", "Hello!", 0.7, 1000).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod desktop;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod prelude;
pub mod provider;
pub mod types;

#[cfg(feature = "cli")]
pub mod cli;
