//! Shared test helpers: a mock provider and in-memory desktop collaborators.
#![allow(dead_code)]

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use onekey::error::{OneKeyError, Result};
use onekey::pipeline::{ClipboardReader, CopyTrigger, Notification, Notifier};
use onekey::provider::{CredentialCell, ModelProvider, ProviderId, ProviderRegistry, Switchboard};
use onekey::types::{GenerationRequest, UnifiedResponse};

/// A provider that answers with a fixed reply, optionally held behind a gate.
pub struct MockProvider {
    id: ProviderId,
    reply: String,
    credentials: CredentialCell,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
    gate: Option<Arc<Semaphore>>,
    fail_with: Option<u16>,
}

impl MockProvider {
    pub fn new(id: ProviderId, reply: &str) -> Self {
        Self {
            id,
            reply: reply.to_string(),
            credentials: CredentialCell::default(),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            gate: None,
            fail_with: None,
        }
    }

    /// Each call waits for one permit before answering.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Answer every call with a protocol error of this status.
    pub fn failing(mut self, status: u16) -> Self {
        self.fail_with = Some(status);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn credential_cell(&self) -> &CredentialCell {
        &self.credentials
    }

    async fn generate_text(&self, request: &GenerationRequest) -> Result<UnifiedResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        match self.fail_with {
            Some(status) => Err(OneKeyError::protocol(status, "mock failure")),
            None => Ok(UnifiedResponse::new(self.reply.clone())),
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Switchboard over real adapters with the given mocks swapped in.
pub fn switchboard_with(mocks: Vec<Arc<MockProvider>>) -> Arc<Switchboard> {
    let mut registry = ProviderRegistry::new().unwrap();
    for mock in mocks {
        registry = registry.with_provider(mock);
    }
    Arc::new(Switchboard::new(Arc::new(registry)))
}

/// Clipboard returning a fixed value (or an error).
pub struct StaticClipboard {
    text: Option<String>,
    fail: bool,
    reads: AtomicUsize,
}

impl StaticClipboard {
    pub fn with_text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            fail: false,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self {
            text: None,
            fail: false,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn broken() -> Self {
        Self {
            text: None,
            fail: true,
            reads: AtomicUsize::new(0),
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClipboardReader for StaticClipboard {
    async fn read_text(&self) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(OneKeyError::Capture("clipboard locked".into()));
        }
        Ok(self.text.clone())
    }
}

#[derive(Default)]
pub struct CountingCopy {
    presses: AtomicUsize,
}

impl CountingCopy {
    pub fn presses(&self) -> usize {
        self.presses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CopyTrigger for CountingCopy {
    async fn send_copy(&self) -> Result<()> {
        self.presses.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    shown: Mutex<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn broken() -> Self {
        Self {
            shown: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) -> Result<()> {
        if self.fail {
            return Err(OneKeyError::Io(std::io::Error::other("no notification daemon")));
        }
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }
}
