//! Wire types shared by the generation proxy and its client.

use serde::{Deserialize, Serialize};

use crate::handoff::NavigationMode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReviewRequest {
    /// Rating name, label or emoji.
    pub rating: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateReviewResponse {
    pub review: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Handoff settings for a client, with navigation chosen from its user agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffInfo {
    pub destination_url: String,
    pub navigation: NavigationMode,
    pub progress_duration_ms: u64,
    pub progress_step: u8,
}
