//! REST endpoints for the generation proxy.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use super::api::{ErrorBody, GenerateReviewRequest, GenerateReviewResponse, HandoffInfo};
use crate::error::SynthesisError;
use crate::handoff::{HandoffConfig, NavigationMode};
use crate::synth::{SynthesisRequest, Synthesizer};
use crate::wizard::{PreferenceSet, Rating, is_known_preference};

/// State shared across proxy handlers.
#[derive(Clone)]
pub struct ProxyState {
    pub synthesizer: Arc<dyn Synthesizer>,
    pub handoff: HandoffConfig,
}

/// Build the proxy router.
pub fn review_routes(state: ProxyState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/reviews/generate", post(generate_review))
        .route("/api/handoff", get(handoff_info))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "review-wizard"
    }))
}

fn error_response(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}

/// POST /api/reviews/generate
async fn generate_review(
    State(state): State<ProxyState>,
    Json(body): Json<GenerateReviewRequest>,
) -> impl IntoResponse {
    let rating: Rating = match body.rating.parse() {
        Ok(r) => r,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    let mut preferences = PreferenceSet::default();
    for tag in &body.tags {
        if !is_known_preference(tag) {
            return error_response(StatusCode::BAD_REQUEST, format!("unknown preference: {tag}"));
        }
        if !preferences.contains(tag) {
            preferences.toggle(tag);
        }
    }
    preferences.text = body.text;

    let request = SynthesisRequest {
        rating: rating.selection(),
        preferences,
    };

    match state.synthesizer.synthesize(&request).await {
        Ok(review) => {
            info!(rating = %rating, tags = request.preferences.tags.len(), "Proxied review generated");
            Json(GenerateReviewResponse { review }).into_response()
        }
        Err(SynthesisError::NothingToDescribe) => error_response(
            StatusCode::BAD_REQUEST,
            SynthesisError::NothingToDescribe.to_string(),
        ),
        Err(e) => {
            warn!(error = %e, "Proxied review generation failed");
            error_response(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

/// GET /api/handoff
///
/// Navigation mode is picked from the caller's `User-Agent`.
async fn handoff_info(State(state): State<ProxyState>, headers: HeaderMap) -> impl IntoResponse {
    let navigation = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(NavigationMode::for_user_agent)
        .unwrap_or_default();

    Json(HandoffInfo {
        destination_url: state.handoff.destination_url.clone(),
        navigation,
        progress_duration_ms: state.handoff.progress_duration.as_millis() as u64,
        progress_step: state.handoff.progress_step,
    })
}
