//! End-to-end tests for the HTTP layer with in-process requests.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use common::{failed, tx, Fixture};
use payintel_core::{
    api::{self, AppState},
    error::{IntelError, IntelResult},
    global_context::GlobalContext,
    metric_aggregator::MetricSummary,
    narrative::{FraudExplanation, NarrativeGenerator, OfflineNarrator},
    risk_scorer::RiskAssessment,
    types::TransactionRecord,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Answers with fixed prose and overrides the heuristic label.
struct EchoNarrator;

impl NarrativeGenerator for EchoNarrator {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn narrate_summary(&self, summary: &MetricSummary) -> IntelResult<String> {
        Ok(format!("{} transactions", summary.total_transactions))
    }

    fn explain_risk(&self, assessment: &RiskAssessment) -> IntelResult<FraudExplanation> {
        Ok(FraudExplanation {
            risk_score: "Critical".to_string(),
            explanation: format!("heuristic said {}", assessment.heuristic_risk_score),
            recommendation: "Escalate".to_string(),
        })
    }

    fn answer_question(&self, question: &str, context: &GlobalContext) -> IntelResult<String> {
        Ok(format!("{question} / {}", context.transaction_count))
    }

    fn recommend(&self, context: &GlobalContext) -> IntelResult<String> {
        Ok(format!("focus on {}", context.most_used_device))
    }
}

/// Every call fails the way an unreachable LLM does.
struct FailingNarrator;

impl NarrativeGenerator for FailingNarrator {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn narrate_summary(&self, _: &MetricSummary) -> IntelResult<String> {
        Err(IntelError::Generation("upstream timed out".into()))
    }

    fn explain_risk(&self, _: &RiskAssessment) -> IntelResult<FraudExplanation> {
        Err(IntelError::Generation("upstream timed out".into()))
    }

    fn answer_question(&self, _: &str, _: &GlobalContext) -> IntelResult<String> {
        Err(IntelError::Generation("upstream timed out".into()))
    }

    fn recommend(&self, _: &GlobalContext) -> IntelResult<String> {
        Err(IntelError::Generation("upstream timed out".into()))
    }
}

fn sample_rows() -> Vec<TransactionRecord> {
    let mut rows: Vec<TransactionRecord> = (0..8).map(|i| tx(&format!("OK{i}"))).collect();
    rows.push(failed("BAD1"));
    rows.push(TransactionRecord {
        amount: 9_000.0,
        retry_attempts: 5,
        ..failed("BAD2")
    });
    rows
}

fn app(fixture: &Fixture, narrator: Arc<dyn NarrativeGenerator>) -> Router {
    api::router(AppState::new(fixture.analyzer(), narrator), true)
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn root_reports_running() {
    let fixture = Fixture::with_rows("api-root", &sample_rows());
    let (status, body) = send(app(&fixture, Arc::new(OfflineNarrator)), "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Running");
}

#[tokio::test]
async fn health_counts_rows_and_names_the_narrator() {
    let fixture = Fixture::with_rows("api-health", &sample_rows());
    let (status, body) = send(app(&fixture, Arc::new(EchoNarrator)), "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transactions"], 10);
    assert_eq!(body["narrator"], "echo");
}

#[tokio::test]
async fn summary_is_narrated() {
    let fixture = Fixture::with_rows("api-summary", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/payment-summary",
        Some(json!({"start_date": "2026-01-01", "end_date": "2026-01-31"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "10 transactions");
}

#[tokio::test]
async fn summary_of_empty_window_is_404_with_detail() {
    let fixture = Fixture::with_rows("api-summary-empty", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/payment-summary",
        Some(json!({"start_date": "2020-01-01", "end_date": "2020-01-31"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "No transactions found in this date range.");
}

#[tokio::test]
async fn malformed_date_is_422() {
    let fixture = Fixture::with_rows("api-summary-bad-date", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/payment-summary",
        Some(json!({"start_date": "January", "end_date": "2026-01-31"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn fraud_risk_passes_the_narrator_label_through() {
    let fixture = Fixture::with_rows("api-fraud", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/fraud-risk",
        Some(json!({"transaction_id": "BAD2"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk_score"], "Critical");
    assert_eq!(body["explanation"], "heuristic said High");
    assert_eq!(body["recommendation"], "Escalate");
}

#[tokio::test]
async fn offline_fraud_risk_uses_the_heuristic_label() {
    let fixture = Fixture::with_rows("api-fraud-offline", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(OfflineNarrator)),
        "POST",
        "/ai/fraud-risk",
        Some(json!({"transaction_id": "BAD2"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk_score"], "High");
    assert_eq!(body["recommendation"], "Block");
}

#[tokio::test]
async fn unknown_transaction_is_404_with_detail() {
    let fixture = Fixture::with_rows("api-fraud-missing", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/fraud-risk",
        Some(json!({"transaction_id": "TX-DOES-NOT-EXIST"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Transaction not found.");
}

#[tokio::test]
async fn transaction_ids_are_matched_exactly() {
    let fixture = Fixture::with_rows("api-fraud-exact-id", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/fraud-risk",
        Some(json!({"transaction_id": " BAD2 "})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Transaction not found.");
}

#[tokio::test]
async fn question_is_answered_from_global_context() {
    let fixture = Fixture::with_rows("api-ask", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/payment-ask",
        Some(json!({"question": "Why do payments fail?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "Why do payments fail? / 10");
}

#[tokio::test]
async fn blank_question_is_422() {
    let fixture = Fixture::with_rows("api-ask-blank", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "POST",
        "/ai/payment-ask",
        Some(json!({"question": "   "})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("question"));
}

#[tokio::test]
async fn recommendations_use_global_context() {
    let fixture = Fixture::with_rows("api-recommend", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "GET",
        "/ai/payment-recommendations",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["insights"], "focus on Mobile");
}

#[tokio::test]
async fn recommendations_on_empty_store_are_500() {
    let fixture = Fixture::new("api-recommend-empty");
    let (status, body) = send(
        app(&fixture, Arc::new(EchoNarrator)),
        "GET",
        "/ai/payment-recommendations",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn narrator_failure_is_502_with_detail() {
    let fixture = Fixture::with_rows("api-generation-failure", &sample_rows());
    let (status, body) = send(
        app(&fixture, Arc::new(FailingNarrator)),
        "POST",
        "/ai/payment-summary",
        Some(json!({"start_date": "2026-01-01", "end_date": "2026-01-31"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(
        body["detail"],
        "Narrative generation failed: upstream timed out"
    );
}

#[tokio::test]
async fn not_found_wins_over_narrator_failure() {
    let fixture = Fixture::with_rows("api-generation-not-found", &sample_rows());
    let (status, _) = send(
        app(&fixture, Arc::new(FailingNarrator)),
        "POST",
        "/ai/fraud-risk",
        Some(json!({"transaction_id": "missing"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
