//! Switchboard routing, credential isolation and in-flight switching.

mod common;

use std::sync::Arc;

use tokio::sync::Semaphore;

use common::{switchboard_with, MockProvider};
use onekey::error::OneKeyError;
use onekey::provider::azure::AzureOpenAiProvider;
use onekey::provider::{ProviderId, ProviderRegistry, Switchboard};

#[tokio::test]
async fn generate_routes_to_current_provider() {
    let openai = Arc::new(MockProvider::new(ProviderId::OpenAi, "from openai"));
    let ollama = Arc::new(MockProvider::new(ProviderId::Ollama, "from ollama"));
    let sb = switchboard_with(vec![openai.clone(), ollama.clone()]);

    sb.switch_provider(ProviderId::Ollama);
    let response = sb.generate_text("llama2", "Hello", 0.7, 1000).await.unwrap();

    assert_eq!(response.content, "from ollama");
    assert_eq!(ollama.calls(), 1);
    assert_eq!(openai.calls(), 0);
    let sent = &ollama.requests()[0];
    assert_eq!(sent.model, "llama2");
    assert_eq!(sent.max_tokens, 1000);
}

#[tokio::test]
async fn adapter_errors_pass_through_unchanged() {
    let tongyi = Arc::new(MockProvider::new(ProviderId::Tongyi, "").failing(429));
    let sb = switchboard_with(vec![tongyi]);

    let err = sb.generate_text("qwen-plus", "Hello", 0.7, 10).await.unwrap_err();
    assert!(matches!(err, OneKeyError::Protocol { status: 429, .. }));
}

#[tokio::test]
async fn switch_does_not_affect_in_flight_call() {
    let gate = Arc::new(Semaphore::new(0));
    let openai = Arc::new(MockProvider::new(ProviderId::OpenAi, "openai").gated(gate.clone()));
    let anthropic = Arc::new(MockProvider::new(ProviderId::Anthropic, "anthropic"));
    let sb = switchboard_with(vec![openai.clone(), anthropic.clone()]);
    sb.switch_provider(ProviderId::OpenAi);

    let call = {
        let sb = Arc::clone(&sb);
        tokio::spawn(async move { sb.generate_text("gpt", "Hello", 0.7, 10).await })
    };
    while openai.calls() == 0 {
        tokio::task::yield_now().await;
    }

    sb.switch_provider(ProviderId::Anthropic);
    gate.add_permits(1);

    let response = call.await.unwrap().unwrap();
    assert_eq!(response.content, "openai");
    assert_eq!(anthropic.calls(), 0);

    let next = sb.generate_text("claude", "Hello", 0.7, 10).await.unwrap();
    assert_eq!(next.content, "anthropic");
}

#[test]
fn every_provider_id_is_switchable() {
    let sb = Switchboard::new(Arc::new(ProviderRegistry::new().unwrap()));
    for id in ProviderId::ALL {
        sb.switch_provider(id);
        assert_eq!(sb.current_provider(), id);
        assert_eq!(sb.registry().get(id).id(), id);
    }
}

#[test]
fn base_url_goes_to_current_provider_only() {
    let sb = Switchboard::new(Arc::new(ProviderRegistry::new().unwrap()));
    sb.switch_provider(ProviderId::Ollama);
    sb.set_base_url("http://gpu-box:11434");

    let infos = sb.providers();
    assert_eq!(infos[ProviderId::Ollama.index()].base_url, "http://gpu-box:11434");
    assert_eq!(
        infos[ProviderId::OpenAi.index()].base_url,
        "https://api.openai.com/v1"
    );
}

#[test]
fn azure_deployment_is_set_through_typed_retrieval() {
    let sb = Switchboard::new(Arc::new(ProviderRegistry::new().unwrap()));
    let azure = sb
        .registry()
        .concrete::<AzureOpenAiProvider>()
        .expect("azure adapter is registered");
    azure.set_deployment_name("gpt35-prod");
    assert_eq!(azure.deployment_name().as_deref(), Some("gpt35-prod"));
}
