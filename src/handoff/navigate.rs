//! Opening the external review destination.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::HandoffError;

/// User-agent fragments that mark a mobile platform.
const MOBILE_MARKERS: [&str; 9] = [
    "Android",
    "iPhone",
    "iPad",
    "iPod",
    "Mobile",
    "webOS",
    "BlackBerry",
    "IEMobile",
    "Opera Mini",
];

/// Where the destination opens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    /// A new tab or window; the wizard stays open.
    #[default]
    NewContext,
    /// Replace the current page. Used on mobile, where pop-ups are blocked.
    SameContext,
}

impl NavigationMode {
    pub fn for_user_agent(user_agent: &str) -> Self {
        if is_mobile_user_agent(user_agent) {
            Self::SameContext
        } else {
            Self::NewContext
        }
    }
}

pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    MOBILE_MARKERS.iter().any(|m| user_agent.contains(m))
}

#[async_trait]
pub trait Navigator: Send + Sync {
    async fn open(&self, url: &str, mode: NavigationMode) -> Result<(), HandoffError>;
}

/// Opens URLs with the desktop's default handler.
pub struct SystemNavigator;

#[async_trait]
impl Navigator for SystemNavigator {
    async fn open(&self, url: &str, mode: NavigationMode) -> Result<(), HandoffError> {
        let mut command = if cfg!(target_os = "macos") {
            Command::new("open")
        } else if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", ""]);
            c
        } else {
            Command::new("xdg-open")
        };
        tracing::debug!(url, ?mode, "Opening destination");

        let status = command
            .arg(url)
            .status()
            .await
            .map_err(|e| HandoffError::NavigationFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(HandoffError::NavigationFailed {
                url: url.to_string(),
                reason: format!("opener exited with {status}"),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_agents_navigate_in_place() {
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15";
        let android = "Mozilla/5.0 (Linux; Android 14; Pixel 8) Chrome/120.0 Mobile Safari/537.36";
        assert_eq!(NavigationMode::for_user_agent(iphone), NavigationMode::SameContext);
        assert_eq!(NavigationMode::for_user_agent(android), NavigationMode::SameContext);
    }

    #[test]
    fn desktop_agents_open_new_context() {
        let desktop = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 Chrome/120.0 Safari/537.36";
        assert_eq!(NavigationMode::for_user_agent(desktop), NavigationMode::NewContext);
        assert_eq!(NavigationMode::for_user_agent(""), NavigationMode::NewContext);
    }

    #[test]
    fn mode_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&NavigationMode::SameContext).unwrap(),
            "\"same_context\""
        );
    }
}
