//! Chat-completions client for OpenAI-compatible endpoints (Groq by default).
//!
//! One attempt per call, bounded by `timeout_ms`. Any failure surfaces as
//! `IntelError::Generation` so callers can tell it apart from data errors.

use super::{
    parse_fraud_explanation, question_prompt, recommendation_prompt, risk_prompt, summary_prompt,
    FraudExplanation, NarrativeGenerator, Prompt,
};
use crate::{
    config::LlmConfig,
    error::{IntelError, IntelResult},
    global_context::GlobalContext,
    metric_aggregator::MetricSummary,
    risk_scorer::RiskAssessment,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest slice of an upstream error body kept in our error message.
const ERROR_BODY_LIMIT: usize = 300;

#[derive(Serialize, Debug)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize, Debug)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize, Debug)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize, Debug)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize, Debug)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize, Debug)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

pub struct LlmNarrator {
    config: LlmConfig,
    api_key: String,
}

impl LlmNarrator {
    /// Fails with `Configuration` when no API key is set.
    pub fn new(config: LlmConfig) -> IntelResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| IntelError::Configuration("no LLM API key configured".to_string()))?;
        Ok(Self { config, api_key })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Send one prompt and return the reply text.
    ///
    /// The blocking client is built per call: callers run on blocking
    /// worker threads, where creating and dropping it is allowed.
    fn complete(&self, prompt: &Prompt) -> IntelResult<String> {
        let client = Client::builder()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| IntelError::Generation(format!("cannot build HTTP client: {e}")))?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: prompt.expects_json.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let started = Instant::now();
        let resp = client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    IntelError::Generation(format!(
                        "LLM request timed out after {} ms",
                        self.config.timeout_ms
                    ))
                } else {
                    IntelError::Generation(format!("LLM request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            let snippet: String = text.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(IntelError::Generation(format!("LLM returned {status}: {snippet}")));
        }

        let parsed: ChatResponse = resp
            .json()
            .map_err(|e| IntelError::Generation(format!("cannot parse LLM response: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| IntelError::Generation("LLM returned an empty reply".to_string()))?;

        log::debug!(
            "llm task={} model={} took {} ms",
            prompt.task.name(),
            self.config.model,
            started.elapsed().as_millis()
        );
        Ok(content)
    }
}

impl NarrativeGenerator for LlmNarrator {
    fn name(&self) -> &'static str {
        "llm"
    }

    fn narrate_summary(&self, summary: &MetricSummary) -> IntelResult<String> {
        self.complete(&summary_prompt(summary)?)
    }

    fn explain_risk(&self, assessment: &RiskAssessment) -> IntelResult<FraudExplanation> {
        let reply = self.complete(&risk_prompt(assessment)?)?;
        parse_fraud_explanation(&reply, assessment.heuristic_risk_score)
    }

    fn answer_question(&self, question: &str, context: &GlobalContext) -> IntelResult<String> {
        self.complete(&question_prompt(question, context)?)
    }

    fn recommend(&self, context: &GlobalContext) -> IntelResult<String> {
        self.complete(&recommendation_prompt(context)?)
    }
}
