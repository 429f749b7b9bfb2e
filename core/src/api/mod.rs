//! HTTP API.
//!
//! ## Endpoints
//! - `POST /ai/payment-summary`         - narrated metrics for a date window
//! - `POST /ai/fraud-risk`              - heuristic risk + narrated explanation
//! - `POST /ai/payment-ask`             - free-form question over global context
//! - `GET  /ai/payment-recommendations` - recommendations from global context
//! - `GET  /`                           - welcome payload
//! - `GET  /health`                     - store probe

mod error;
mod routes;

pub use error::ErrorBody;
pub use routes::*;

use crate::{analyzer::PaymentAnalyzer, narrative::NarrativeGenerator};
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<PaymentAnalyzer>,
    pub narrator: Arc<dyn NarrativeGenerator>,
}

impl AppState {
    pub fn new(analyzer: PaymentAnalyzer, narrator: Arc<dyn NarrativeGenerator>) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            narrator,
        }
    }
}

/// Build the router with all routes and, optionally, a permissive CORS
/// layer for browser dashboards.
pub fn router(state: AppState, cors_enabled: bool) -> Router {
    let app = Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/ai/payment-summary", post(routes::payment_summary))
        .route("/ai/fraud-risk", post(routes::fraud_risk))
        .route("/ai/payment-ask", post(routes::payment_ask))
        .route(
            "/ai/payment-recommendations",
            get(routes::payment_recommendations),
        )
        .with_state(state);

    if cors_enabled {
        app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else {
        app
    }
}
