//! Request handlers and their DTOs.
//!
//! Store reads and the narrator call are blocking, so each handler moves
//! its work onto a blocking worker and awaits the result.

use super::AppState;
use crate::error::{IntelError, IntelResult};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── DTOs ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummaryRequest {
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSummaryResponse {
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRiskRequest {
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FraudRiskResponse {
    pub risk_score:     String,
    pub explanation:    String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAskRequest {
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAskResponse {
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecommendationResponse {
    pub insights: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeResponse {
    pub message: String,
    pub status:  String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status:       String,
    pub transactions: i64,
    pub narrator:     String,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: "Welcome to the SeShat AI Payment Intelligence API.".to_string(),
        status: "Running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> IntelResult<Json<HealthResponse>> {
    let narrator = state.narrator.name().to_string();
    let transactions = run_blocking(state, |s| s.analyzer.transaction_count()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        transactions,
        narrator,
    }))
}

/// POST /ai/payment-summary
pub async fn payment_summary(
    State(state): State<AppState>,
    payload: Result<Json<PaymentSummaryRequest>, JsonRejection>,
) -> IntelResult<Json<PaymentSummaryResponse>> {
    let Json(req) = payload?;
    log::info!("payment-summary {}..={}", req.start_date, req.end_date);

    let summary = run_blocking(state, move |s| {
        let metrics = s.analyzer.summarize(req.start_date, req.end_date)?;
        s.narrator.narrate_summary(&metrics)
    })
    .await?;
    Ok(Json(PaymentSummaryResponse { summary }))
}

/// POST /ai/fraud-risk
pub async fn fraud_risk(
    State(state): State<AppState>,
    payload: Result<Json<FraudRiskRequest>, JsonRejection>,
) -> IntelResult<Json<FraudRiskResponse>> {
    let Json(req) = payload?;
    let transaction_id = req.transaction_id;
    log::info!("fraud-risk {transaction_id}");

    let explanation = run_blocking(state, move |s| {
        let assessment = s.analyzer.score(&transaction_id)?;
        s.narrator.explain_risk(&assessment)
    })
    .await?;
    Ok(Json(FraudRiskResponse {
        risk_score: explanation.risk_score,
        explanation: explanation.explanation,
        recommendation: explanation.recommendation,
    }))
}

/// POST /ai/payment-ask
pub async fn payment_ask(
    State(state): State<AppState>,
    payload: Result<Json<PaymentAskRequest>, JsonRejection>,
) -> IntelResult<Json<PaymentAskResponse>> {
    let Json(req) = payload?;
    if req.question.trim().is_empty() {
        return Err(IntelError::InvalidRequest("question must not be empty".to_string()));
    }
    log::info!("payment-ask ({} chars)", req.question.len());

    let answer = run_blocking(state, move |s| {
        let context = s.analyzer.context()?;
        s.narrator.answer_question(&req.question, &context)
    })
    .await?;
    Ok(Json(PaymentAskResponse { answer }))
}

/// GET /ai/payment-recommendations
pub async fn payment_recommendations(
    State(state): State<AppState>,
) -> IntelResult<Json<PaymentRecommendationResponse>> {
    log::info!("payment-recommendations");

    let insights = run_blocking(state, |s| {
        let context = s.analyzer.context()?;
        s.narrator.recommend(&context)
    })
    .await?;
    Ok(Json(PaymentRecommendationResponse { insights }))
}

async fn run_blocking<T, F>(state: AppState, work: F) -> IntelResult<T>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> IntelResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| IntelError::Other(anyhow::anyhow!("request worker failed: {e}")))?
}
