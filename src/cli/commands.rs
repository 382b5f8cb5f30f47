//! CLI command handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use crate::config::{default_config_path, AppConfig};
use crate::desktop::{CommandClipboard, CommandCopyTrigger, CommandNotifier};
use crate::error::{OneKeyError, Result};
use crate::models::{ModelTable, ProviderId};
use crate::pipeline::{RunOutcome, TranslationPipeline};
use crate::provider::{ProviderRegistry, Switchboard};
use crate::types::GenerationRequest;

use super::GenerateArgs;

/// Wired-up runtime for one CLI invocation.
pub struct App {
    pub config_path: PathBuf,
    /// Config as stored on disk; environment overrides are not written back.
    pub stored: AppConfig,
    pub switchboard: Arc<Switchboard>,
    pub models: ModelTable,
    /// Where an invalid config file was moved before defaults replaced it.
    pub recovered_from: Option<PathBuf>,
    /// Set when the config file exists but could not be read; saving is refused.
    read_only: bool,
}

impl App {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let (stored, recovered_from, read_only) = match AppConfig::load_or_recover(&config_path) {
            Ok((config, backup)) => (config, backup, false),
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "config unreadable, using defaults without saving");
                (AppConfig::default(), None, true)
            }
        };

        let mut effective = stored.clone();
        effective.apply_env();

        let switchboard = Arc::new(Switchboard::new(Arc::new(ProviderRegistry::new()?)));
        let models = effective.apply(&switchboard);

        Ok(Self {
            config_path,
            stored,
            switchboard,
            models,
            recovered_from,
            read_only,
        })
    }

    fn pipeline(&self) -> TranslationPipeline {
        TranslationPipeline::new(
            Arc::clone(&self.switchboard),
            Arc::new(CommandClipboard::default()),
            Arc::new(CommandCopyTrigger::default()),
            Arc::new(CommandNotifier::default()),
        )
        .with_models(self.models.clone())
        .with_settings(self.stored.pipeline.clone())
    }

    fn save(&self) -> Result<()> {
        if self.read_only {
            return Err(OneKeyError::Configuration(format!(
                "config file {} could not be read; refusing to overwrite it",
                self.config_path.display()
            )));
        }
        self.stored.save(&self.config_path)
    }
}

/// Handle `onekey translate`.
pub async fn handle_translate(app: &App) -> Result<()> {
    let outcome = app.pipeline().run().await;
    report(&outcome);
    Ok(())
}

/// Handle `onekey listen`: every stdin line is one hotkey press.
pub async fn handle_listen(app: &App) -> Result<()> {
    let pipeline = app.pipeline();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = None;

    eprintln!("listening for hotkey events on stdin (one per line)");
    while let Some(_line) = lines.next_line().await? {
        let handle = pipeline.trigger();
        last = Some(handle.clone());
        tokio::spawn(async move {
            let outcome = handle.await;
            debug!(run_id = %outcome.run_id(), "hotkey run settled");
        });
    }

    if let Some(handle) = last {
        report(&handle.await);
    }
    Ok(())
}

/// Handle `onekey generate`.
pub async fn handle_generate(app: &App, args: GenerateArgs) -> Result<()> {
    let provider = args
        .provider
        .unwrap_or_else(|| app.switchboard.current_provider());
    let model = args
        .model
        .unwrap_or_else(|| app.models.model_for(Some(provider)));

    let request = GenerationRequest::builder()
        .model(model)
        .prompt(args.prompt)
        .temperature(args.temperature.unwrap_or(app.stored.pipeline.temperature))
        .max_tokens(args.max_tokens.unwrap_or(app.stored.pipeline.max_tokens))
        .build();

    let response = app.switchboard.generate_with(provider, &request).await?;
    println!("{}", response.content);
    for (key, value) in &response.metadata {
        debug!(%key, %value, "response metadata");
    }
    Ok(())
}

/// Handle `onekey providers`.
pub fn handle_providers(app: &App) {
    let current = app.switchboard.current_provider();
    for info in app.switchboard.providers() {
        let marker = if info.id == current { "*" } else { " " };
        let key = match (info.requires_api_key, info.has_api_key) {
            (false, _) => "no key needed",
            (true, true) => "key set",
            (true, false) => "key missing",
        };
        let base_url = if info.base_url.is_empty() {
            "(unset)"
        } else {
            info.base_url.as_str()
        };
        println!(
            "{marker} {:<13} {:<13} {:<12} {base_url}  [model {}]",
            info.id.as_str(),
            info.display_name,
            key,
            app.models.model_for(Some(info.id)),
        );
    }
}

/// Handle `onekey use <provider>`.
pub fn handle_use(app: &mut App, provider: ProviderId) -> Result<()> {
    app.stored.current_provider = provider;
    app.save()?;
    app.switchboard.switch_provider(provider);
    println!("current provider: {}", provider.display_name());
    Ok(())
}

/// Handle `onekey set-key <provider> <key>`.
pub fn handle_set_key(app: &mut App, provider: ProviderId, key: String) -> Result<()> {
    app.stored.provider_mut(provider).api_key = Some(key);
    app.save()?;
    println!("saved API key for {}", provider.display_name());
    Ok(())
}

/// Handle `onekey set-url <provider> <url>`.
pub fn handle_set_url(app: &mut App, provider: ProviderId, url: String) -> Result<()> {
    app.stored.provider_mut(provider).base_url = Some(url);
    app.save()?;
    println!("saved base URL for {}", provider.display_name());
    Ok(())
}

fn report(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Translated { response, .. } => println!("{}", response.content),
        RunOutcome::EmptyClipboard { .. } => eprintln!("nothing selected"),
        RunOutcome::CaptureFailed { reason, .. } => eprintln!("capture failed: {reason}"),
        RunOutcome::InvocationFailed { error, .. } => eprintln!("translation failed: {error}"),
        RunOutcome::NotifyFailed { error, .. } => eprintln!("notification failed: {error}"),
        RunOutcome::Aborted { reason, .. } => eprintln!("run aborted: {reason}"),
    }
}
