//! Clipboard backends: the platform clipboard command and an OSC 52 fallback.

use std::io::{IsTerminal, Write};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::ClipboardError;

/// Upper bound on one clipboard command, from spawn to exit.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Write-text capability of the host platform.
#[async_trait]
pub trait Clipboard: Send + Sync {
    fn name(&self) -> &str;

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Copies through the first clipboard utility that is installed.
pub struct SystemClipboard {
    candidates: Vec<(String, Vec<String>)>,
}

impl SystemClipboard {
    /// Candidates for the current platform, tried in order.
    pub fn new() -> Self {
        let candidates: Vec<(&str, Vec<&str>)> = if cfg!(target_os = "macos") {
            vec![("pbcopy", vec![])]
        } else if cfg!(target_os = "windows") {
            vec![("clip", vec![])]
        } else {
            vec![
                ("wl-copy", vec![]),
                ("xclip", vec!["-selection", "clipboard"]),
                ("xsel", vec!["--clipboard", "--input"]),
            ]
        };
        Self {
            candidates: candidates
                .into_iter()
                .map(|(cmd, args)| (cmd.to_string(), args.into_iter().map(String::from).collect()))
                .collect(),
        }
    }

    /// Use an explicit command instead of the platform defaults.
    pub fn with_command(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            candidates: vec![(command.into(), args)],
        }
    }

    async fn pipe_to(&self, command: &str, args: &[String], text: &str) -> Result<(), ClipboardError> {
        // xclip and wl-copy fork a server that outlives the command and keeps
        // any inherited pipe open, so only stdin is piped.
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let copy = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(text.as_bytes()).await?;
                stdin.shutdown().await?;
            }
            child.wait().await
        };

        let status = match tokio::time::timeout(COMMAND_TIMEOUT, copy).await {
            Ok(status) => status?,
            Err(_) => {
                warn!(command = %command, "Clipboard command timed out");
                return Err(ClipboardError::CommandFailed {
                    command: command.to_string(),
                    reason: format!("timed out after {}s", COMMAND_TIMEOUT.as_secs()),
                });
            }
        };

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed {
                command: command.to_string(),
                reason: status.to_string(),
            })
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    fn name(&self) -> &str {
        "system"
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = None;
        for (command, args) in &self.candidates {
            match self.pipe_to(command, args, text).await {
                Ok(()) => {
                    debug!(command = %command, "Copied with clipboard command");
                    return Ok(());
                }
                Err(e) => {
                    debug!(command = %command, error = %e, "Clipboard command unavailable");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error
            .unwrap_or_else(|| ClipboardError::Unavailable("no clipboard command configured".into())))
    }
}

/// Build the OSC 52 "set clipboard" escape sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{payload}\x07")
}

/// Synchronous fallback: asks the terminal emulator to set the clipboard.
pub struct Osc52Clipboard;

#[async_trait]
impl Clipboard for Osc52Clipboard {
    fn name(&self) -> &str {
        "osc52"
    }

    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stderr = std::io::stderr();
        if !stderr.is_terminal() {
            return Err(ClipboardError::Unavailable(
                "stderr is not a terminal".into(),
            ));
        }
        stderr.write_all(osc52_sequence(text).as_bytes())?;
        stderr.flush()?;
        Ok(())
    }
}
