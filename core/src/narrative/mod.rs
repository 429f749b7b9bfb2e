//! Narrative generation — structured metrics in, prose out.
//!
//! The analytic core never talks to the LLM itself. Callers hold an
//! `Arc<dyn NarrativeGenerator>` so the HTTP layer can run against the
//! real client, the offline templates, or a test double.

mod llm;
mod offline;

pub use llm::LlmNarrator;
pub use offline::OfflineNarrator;

use crate::{
    config::LlmConfig,
    error::{IntelError, IntelResult},
    global_context::GlobalContext,
    metric_aggregator::MetricSummary,
    risk_scorer::{RiskAssessment, RiskLevel},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// The contract every narrator must fulfill.
pub trait NarrativeGenerator: Send + Sync {
    /// Stable name, used in logs.
    fn name(&self) -> &'static str;

    fn narrate_summary(&self, summary: &MetricSummary) -> IntelResult<String>;

    /// The returned `risk_score` is what callers surface. It may differ from
    /// the heuristic label, which is only advisory input to the narrator.
    fn explain_risk(&self, assessment: &RiskAssessment) -> IntelResult<FraudExplanation>;

    fn answer_question(&self, question: &str, context: &GlobalContext) -> IntelResult<String>;

    fn recommend(&self, context: &GlobalContext) -> IntelResult<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FraudExplanation {
    pub risk_score:     String,
    pub explanation:    String,
    pub recommendation: String,
}

/// Pick the narrator for a deployment: the LLM when a key is configured,
/// deterministic templates otherwise.
pub fn narrator_from_config(config: &LlmConfig) -> Arc<dyn NarrativeGenerator> {
    match LlmNarrator::new(config.clone()) {
        Ok(narrator) => {
            log::info!("narrative: using {} at {}", config.model, config.base_url);
            Arc::new(narrator)
        }
        Err(e) => {
            log::warn!("narrative: {e}; falling back to offline templates");
            Arc::new(OfflineNarrator)
        }
    }
}

// ── Prompts ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptTask {
    PaymentSummary,
    FraudExplanation,
    PaymentQuery,
    Recommendations,
}

impl PromptTask {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PaymentSummary => "payment_summary",
            Self::FraudExplanation => "fraud_explanation",
            Self::PaymentQuery => "payment_query",
            Self::Recommendations => "recommendations",
        }
    }

    fn instructions(&self) -> &'static str {
        match self {
            Self::PaymentSummary => {
                "Write a concise business summary (at most 150 words) of the payment \
                 metrics below. Call out the success rate, where failures concentrate, \
                 which payment methods under-perform, and the revenue figure."
            }
            Self::FraudExplanation => {
                "Assess the fraud risk of the transaction below using its heuristic \
                 indicators. Reply with a JSON object with exactly these keys: \
                 \"risk_score\" (one of \"Low\", \"Medium\", \"High\"), \"explanation\" \
                 (two or three sentences referencing the indicators), and \
                 \"recommendation\" (one of \"Approve\", \"Review\", \"Block\")."
            }
            Self::PaymentQuery => {
                "Answer the business question using only the dataset statistics below. \
                 If the statistics cannot answer it, say what data would be needed."
            }
            Self::Recommendations => {
                "Give three to five concrete recommendations to improve payment success \
                 and reduce fraud, grounded in the dataset statistics below."
            }
        }
    }
}

const SYSTEM_PERSONA: &str = "You are SeShat, a payment intelligence analyst. \
    You explain payment metrics to business teams in plain language. \
    Never invent numbers that are not in the provided data.";

#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub task:         PromptTask,
    pub system:       String,
    pub user:         String,
    /// The reply must be a single JSON object.
    pub expects_json: bool,
}

impl Prompt {
    fn new<T: Serialize>(task: PromptTask, data_label: &str, data: &T) -> IntelResult<Self> {
        let rendered = serde_json::to_string_pretty(data)?;
        Ok(Self {
            task,
            system: SYSTEM_PERSONA.to_string(),
            user: format!("{}\n\n{data_label}:\n{rendered}", task.instructions()),
            expects_json: task == PromptTask::FraudExplanation,
        })
    }
}

pub fn summary_prompt(summary: &MetricSummary) -> IntelResult<Prompt> {
    Prompt::new(PromptTask::PaymentSummary, "Payment metrics", summary)
}

pub fn risk_prompt(assessment: &RiskAssessment) -> IntelResult<Prompt> {
    Prompt::new(PromptTask::FraudExplanation, "Transaction risk data", assessment)
}

pub fn question_prompt(question: &str, context: &GlobalContext) -> IntelResult<Prompt> {
    let mut prompt = Prompt::new(PromptTask::PaymentQuery, "Dataset statistics", context)?;
    prompt.user = format!("Question: {}\n\n{}", question.trim(), prompt.user);
    Ok(prompt)
}

pub fn recommendation_prompt(context: &GlobalContext) -> IntelResult<Prompt> {
    Prompt::new(PromptTask::Recommendations, "Dataset statistics", context)
}

// ── Replies ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawExplanation {
    #[serde(default)]
    risk_score: Option<String>,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    recommendation: Option<String>,
}

/// Parse the model's JSON reply. Code fences are tolerated; a missing
/// `risk_score` falls back to the heuristic label.
pub fn parse_fraud_explanation(reply: &str, heuristic: RiskLevel) -> IntelResult<FraudExplanation> {
    let body = strip_code_fence(reply);
    let raw: RawExplanation = serde_json::from_str(body).map_err(|e| {
        IntelError::Generation(format!("fraud explanation is not valid JSON: {e}"))
    })?;

    let non_empty = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let explanation = non_empty(raw.explanation)
        .ok_or_else(|| IntelError::Generation("fraud explanation has no `explanation`".into()))?;
    let recommendation = non_empty(raw.recommendation).ok_or_else(|| {
        IntelError::Generation("fraud explanation has no `recommendation`".into())
    })?;

    Ok(FraudExplanation {
        risk_score: non_empty(raw.risk_score).unwrap_or_else(|| heuristic.to_string()),
        explanation,
        recommendation,
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag on the opening fence.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
