//! Desktop collaborators backed by external command-line tools.
//!
//! Each collaborator walks a fallback chain; a tool that is not installed or
//! exits non-zero is skipped and the next one is tried.

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{OneKeyError, Result};
use crate::pipeline::{ClipboardReader, CopyTrigger, Notification, Notifier};

/// One external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Run the first tool in `chain` that succeeds and return its stdout.
async fn run_chain(chain: &[ToolCommand]) -> std::result::Result<Vec<u8>, Vec<String>> {
    let mut failures = Vec::new();
    for tool in chain {
        let output = Command::new(&tool.program)
            .args(&tool.args)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .stdout(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;
        match output {
            Ok(out) if out.status.success() => {
                trace!(program = %tool.program, "desktop tool succeeded");
                return Ok(out.stdout);
            }
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                debug!(program = %tool.program, status = %out.status, %stderr, "desktop tool failed");
                failures.push(format!("{}: {}", tool.program, out.status));
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                trace!(program = %tool.program, "desktop tool not installed");
            }
            Err(err) => {
                debug!(program = %tool.program, error = %err, "desktop tool could not start");
                failures.push(format!("{}: {err}", tool.program));
            }
        }
    }
    Err(failures)
}

fn chain_error(what: &str, failures: &[String]) -> String {
    if failures.is_empty() {
        format!("no {what} tool is installed")
    } else {
        format!("every {what} tool failed ({})", failures.join("; "))
    }
}

/// Clipboard reader: `wl-paste`, `xclip`, `xsel`, `pbpaste`, then PowerShell.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    chain: Vec<ToolCommand>,
}

impl Default for CommandClipboard {
    fn default() -> Self {
        Self::with_chain(vec![
            ToolCommand::new("wl-paste", &["--no-newline", "--type", "text/plain"]),
            ToolCommand::new("xclip", &["-selection", "clipboard", "-o"]),
            ToolCommand::new("xsel", &["--clipboard", "--output"]),
            ToolCommand::new("pbpaste", &[]),
            ToolCommand::new("powershell", &["-NoProfile", "-Command", "Get-Clipboard"]),
        ])
    }
}

impl CommandClipboard {
    pub fn with_chain(chain: Vec<ToolCommand>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl ClipboardReader for CommandClipboard {
    async fn read_text(&self) -> Result<Option<String>> {
        let stdout = run_chain(&self.chain)
            .await
            .map_err(|failures| OneKeyError::Capture(chain_error("clipboard", &failures)))?;
        let text = String::from_utf8_lossy(&stdout);
        let text = text.trim_end_matches(['\r', '\n']);
        Ok((!text.is_empty()).then(|| text.to_string()))
    }
}

/// Copy keystroke: `wtype`, `xdotool`, `osascript`, then PowerShell `SendKeys`.
#[derive(Debug, Clone)]
pub struct CommandCopyTrigger {
    chain: Vec<ToolCommand>,
}

impl Default for CommandCopyTrigger {
    fn default() -> Self {
        Self::with_chain(vec![
            ToolCommand::new("wtype", &["-M", "ctrl", "c", "-m", "ctrl"]),
            ToolCommand::new("xdotool", &["key", "--clearmodifiers", "ctrl+c"]),
            ToolCommand::new(
                "osascript",
                &[
                    "-e",
                    "tell application \"System Events\" to keystroke \"c\" using command down",
                ],
            ),
            ToolCommand::new(
                "powershell",
                &[
                    "-NoProfile",
                    "-Command",
                    "(New-Object -ComObject WScript.Shell).SendKeys('^c')",
                ],
            ),
        ])
    }
}

impl CommandCopyTrigger {
    pub fn with_chain(chain: Vec<ToolCommand>) -> Self {
        Self { chain }
    }
}

#[async_trait]
impl CopyTrigger for CommandCopyTrigger {
    async fn send_copy(&self) -> Result<()> {
        run_chain(&self.chain)
            .await
            .map(|_| ())
            .map_err(|failures| OneKeyError::Capture(chain_error("keystroke", &failures)))
    }
}

/// Notifications through `notify-send` or `osascript`.
#[derive(Debug, Clone, Default)]
pub struct CommandNotifier {
    app_name: Option<String>,
}

impl CommandNotifier {
    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
        }
    }

    fn chain(&self, notification: &Notification) -> Vec<ToolCommand> {
        let mut notify_send = vec!["--app-name".to_string()];
        notify_send.push(self.app_name.clone().unwrap_or_else(|| "onekey".into()));
        notify_send.push(notification.title.clone());
        notify_send.push(notification.body.clone());

        let script = format!(
            "display notification \"{}\" with title \"{}\"",
            applescript_escape(&notification.body),
            applescript_escape(&notification.title),
        );

        vec![
            ToolCommand {
                program: "notify-send".into(),
                args: notify_send,
            },
            ToolCommand {
                program: "osascript".into(),
                args: vec!["-e".into(), script],
            },
        ]
    }
}

#[async_trait]
impl Notifier for CommandNotifier {
    async fn show(&self, notification: &Notification) -> Result<()> {
        run_chain(&self.chain(notification))
            .await
            .map(|_| ())
            .map_err(|failures| {
                OneKeyError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    chain_error("notification", &failures),
                ))
            })
    }
}

fn applescript_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
