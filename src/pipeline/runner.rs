//! Single-slot pipeline runner.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{OneKeyError, Result};
use crate::models::ModelTable;
use crate::provider::{ProviderId, Switchboard};
use crate::types::{GenerationRequest, UnifiedResponse};

use super::{build_prompt, ClipboardReader, CopyTrigger, Notification, Notifier, PipelineSettings};

/// Observable phase of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum PipelineState {
    Idle,
    Capturing,
    Invoking,
    Notifying,
}

/// How one run ended. Runs never panic out or return `Err`.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    Translated {
        run_id: Uuid,
        source: String,
        response: UnifiedResponse,
        notification: Notification,
    },
    /// Nothing to translate; the run ended silently.
    EmptyClipboard { run_id: Uuid },
    CaptureFailed { run_id: Uuid, reason: String },
    InvocationFailed {
        run_id: Uuid,
        source: String,
        error: Arc<OneKeyError>,
    },
    NotifyFailed {
        run_id: Uuid,
        error: Arc<OneKeyError>,
    },
    /// The run's task panicked or was cancelled.
    Aborted { run_id: Uuid, reason: String },
}

impl RunOutcome {
    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Translated { run_id, .. }
            | Self::EmptyClipboard { run_id }
            | Self::CaptureFailed { run_id, .. }
            | Self::InvocationFailed { run_id, .. }
            | Self::NotifyFailed { run_id, .. }
            | Self::Aborted { run_id, .. } => *run_id,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated { .. })
    }
}

type RunHandle = Shared<BoxFuture<'static, RunOutcome>>;

struct CurrentRun {
    run_id: Uuid,
    handle: RunHandle,
}

/// Hotkey-driven translation pipeline.
///
/// At most one run is live at a time. Triggering while a run is active joins
/// it: every caller receives the same [`RunOutcome`].
///
/// Cloning is cheap and clones share the same run slot.
#[derive(Clone)]
pub struct TranslationPipeline {
    switchboard: Arc<Switchboard>,
    models: Arc<ModelTable>,
    settings: PipelineSettings,
    clipboard: Arc<dyn ClipboardReader>,
    copier: Arc<dyn CopyTrigger>,
    notifier: Arc<dyn Notifier>,
    state_tx: Arc<watch::Sender<PipelineState>>,
    current: Arc<Mutex<Option<CurrentRun>>>,
}

impl TranslationPipeline {
    pub fn new(
        switchboard: Arc<Switchboard>,
        clipboard: Arc<dyn ClipboardReader>,
        copier: Arc<dyn CopyTrigger>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        Self {
            switchboard,
            models: Arc::new(ModelTable::new()),
            settings: PipelineSettings::default(),
            clipboard,
            copier,
            notifier,
            state_tx: Arc::new(state_tx),
            current: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_models(mut self, models: ModelTable) -> Self {
        self.models = Arc::new(models);
        self
    }

    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn state(&self) -> PipelineState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch_state(&self) -> watch::Receiver<PipelineState> {
        self.state_tx.subscribe()
    }

    /// Hotkey entry point: start a run, or join the one in flight.
    pub async fn run(&self) -> RunOutcome {
        self.trigger().await
    }

    /// Like [`run`](Self::run), but returns the shared handle without awaiting.
    ///
    /// The run proceeds on its own task whether or not the handle is polled.
    pub fn trigger(&self) -> Shared<BoxFuture<'static, RunOutcome>> {
        let mut slot = lock(&self.current);
        if let Some(active) = slot.as_ref() {
            debug!(run_id = %active.run_id, "joining in-flight run");
            return active.handle.clone();
        }

        let run_id = Uuid::new_v4();
        let this = self.clone();
        let task = tokio::spawn(async move {
            let _guard = RunGuard {
                pipeline: this.clone(),
                run_id,
            };
            this.execute(run_id).await
        });

        let handle = async move {
            match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    warn!(%run_id, error = %err, "pipeline run aborted");
                    RunOutcome::Aborted {
                        run_id,
                        reason: err.to_string(),
                    }
                }
            }
        }
        .boxed()
        .shared();

        *slot = Some(CurrentRun {
            run_id,
            handle: handle.clone(),
        });
        handle
    }

    async fn execute(&self, run_id: Uuid) -> RunOutcome {
        // One snapshot per run; later switches affect only later runs.
        let provider = self.switchboard.current_provider();
        let model = self.models.model_for(Some(provider));

        self.set_state(PipelineState::Capturing);
        let source = match self.capture().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                debug!(%run_id, "clipboard held no text");
                return RunOutcome::EmptyClipboard { run_id };
            }
            Err(err) => {
                debug!(%run_id, error = %err, "capture failed");
                return RunOutcome::CaptureFailed {
                    run_id,
                    reason: err.to_string(),
                };
            }
        };

        self.set_state(PipelineState::Invoking);
        let response = match self.invoke(provider, &model, &source).await {
            Ok(response) => response,
            Err(err) => {
                warn!(%run_id, %provider, %model, error = %err, "translation failed");
                if self.settings.notify_errors {
                    self.set_state(PipelineState::Notifying);
                    let notification = Notification::failed(&source, &err);
                    if let Err(notify_err) = self.notifier.show(&notification).await {
                        warn!(%run_id, error = %notify_err, "error notification failed");
                    }
                }
                return RunOutcome::InvocationFailed {
                    run_id,
                    source,
                    error: Arc::new(err),
                };
            }
        };

        self.set_state(PipelineState::Notifying);
        let notification = Notification::translated(&source, &response.content);
        if let Err(err) = self.notifier.show(&notification).await {
            warn!(%run_id, error = %err, "notification failed");
            return RunOutcome::NotifyFailed {
                run_id,
                error: Arc::new(err),
            };
        }

        info!(%run_id, %provider, %model, "translation delivered");
        RunOutcome::Translated {
            run_id,
            source,
            response,
            notification,
        }
    }

    async fn capture(&self) -> Result<Option<String>> {
        self.copier.send_copy().await?;
        if self.settings.settle_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.settings.settle_delay_ms)).await;
        }
        let text = self.clipboard.read_text().await?;
        Ok(text.filter(|t| !t.trim().is_empty()))
    }

    async fn invoke(
        &self,
        provider: ProviderId,
        model: &str,
        source: &str,
    ) -> Result<UnifiedResponse> {
        let request = GenerationRequest::new(
            model,
            build_prompt(source),
            self.settings.temperature,
            self.settings.max_tokens,
        );
        self.switchboard.generate_with(provider, &request).await
    }

    fn set_state(&self, state: PipelineState) {
        self.state_tx.send_replace(state);
    }
}

/// Returns the pipeline to `Idle` and frees the run slot, even on panic.
struct RunGuard {
    pipeline: TranslationPipeline,
    run_id: Uuid,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let mut slot = lock(&self.pipeline.current);
        if slot.as_ref().is_some_and(|run| run.run_id == self.run_id) {
            *slot = None;
        }
        drop(slot);
        self.pipeline.set_state(PipelineState::Idle);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
