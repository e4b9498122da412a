//! Generation proxy served by `review-wizard serve`.
//!
//! Holds the generation credential so clients using the `proxy` strategy
//! never see it.

pub mod api;
pub mod routes;

pub use api::{ErrorBody, GenerateReviewRequest, GenerateReviewResponse, HandoffInfo};
pub use routes::{ProxyState, review_routes};
