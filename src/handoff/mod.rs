//! Copying the finished review and sending the user to the review site.
//!
//! Copying tries the primary clipboard first and the fallback second. Only
//! when both fail is the user asked to copy by hand. After a successful copy
//! a fixed progress sequence runs before the destination is opened.

pub mod clipboard;
pub mod navigate;
pub mod progress;

pub use clipboard::{Clipboard, Osc52Clipboard, SystemClipboard};
pub use navigate::{NavigationMode, Navigator, SystemNavigator, is_mobile_user_agent};
pub use progress::ProgressPlan;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::HandoffError;

/// Handoff constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffConfig {
    /// External review-submission page.
    pub destination_url: String,
    pub progress_duration: Duration,
    /// Percentage points per progress tick.
    pub progress_step: u8,
    pub navigation: NavigationMode,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            destination_url: "https://g.page/r/trueaim-ai/review".to_string(),
            progress_duration: Duration::from_millis(1500),
            progress_step: 10,
            navigation: NavigationMode::NewContext,
        }
    }
}

impl HandoffConfig {
    pub fn progress_plan(&self) -> ProgressPlan {
        ProgressPlan::new(self.progress_duration, self.progress_step)
    }
}

/// Which clipboard path succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMethod {
    Primary,
    Fallback,
}

/// Summary of a completed handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffReceipt {
    pub copy_method: CopyMethod,
    pub url: String,
    pub mode: NavigationMode,
}

pub struct Handoff {
    primary: Arc<dyn Clipboard>,
    fallback: Arc<dyn Clipboard>,
    navigator: Arc<dyn Navigator>,
    config: HandoffConfig,
}

impl Handoff {
    pub fn new(
        primary: Arc<dyn Clipboard>,
        fallback: Arc<dyn Clipboard>,
        navigator: Arc<dyn Navigator>,
        config: HandoffConfig,
    ) -> Self {
        Self {
            primary,
            fallback,
            navigator,
            config,
        }
    }

    /// Platform clipboard, OSC 52 fallback and the desktop URL opener.
    pub fn system(config: HandoffConfig) -> Self {
        Self::new(
            Arc::new(SystemClipboard::new()),
            Arc::new(Osc52Clipboard),
            Arc::new(SystemNavigator),
            config,
        )
    }

    pub fn config(&self) -> &HandoffConfig {
        &self.config
    }

    /// Put `text` on the clipboard, falling back once before giving up.
    pub async fn copy(&self, text: &str) -> Result<CopyMethod, HandoffError> {
        match self.primary.write_text(text).await {
            Ok(()) => {
                info!(clipboard = self.primary.name(), "Review copied");
                return Ok(CopyMethod::Primary);
            }
            Err(e) => {
                warn!(
                    clipboard = self.primary.name(),
                    error = %e,
                    "Clipboard write failed, trying fallback"
                );
            }
        }

        match self.fallback.write_text(text).await {
            Ok(()) => {
                info!(clipboard = self.fallback.name(), "Review copied with fallback");
                Ok(CopyMethod::Fallback)
            }
            Err(e) => {
                warn!(clipboard = self.fallback.name(), error = %e, "Fallback clipboard failed");
                Err(HandoffError::ManualCopyRequired {
                    text: text.to_string(),
                })
            }
        }
    }

    /// Run the progress sequence, then open the destination.
    pub async fn redirect(
        &self,
        on_progress: impl FnMut(u8) + Send,
    ) -> Result<(String, NavigationMode), HandoffError> {
        self.config.progress_plan().run(on_progress).await;

        let url = self.config.destination_url.clone();
        let mode = self.config.navigation;
        self.navigator.open(&url, mode).await?;
        info!(url = %url, ?mode, "Opened review destination");
        Ok((url, mode))
    }

    /// Copy `text`, show progress, then navigate.
    pub async fn commit_and_redirect(
        &self,
        text: &str,
        on_progress: impl FnMut(u8) + Send,
    ) -> Result<HandoffReceipt, HandoffError> {
        let copy_method = self.copy(text).await?;
        let (url, mode) = self.redirect(on_progress).await?;
        Ok(HandoffReceipt {
            copy_method,
            url,
            mode,
        })
    }
}
