//! Deterministic, template-based narrator. Used when no LLM key is
//! configured, and as the narrator of record in tests.

use super::{FraudExplanation, NarrativeGenerator};
use crate::{
    error::IntelResult,
    global_context::GlobalContext,
    metric_aggregator::MetricSummary,
    risk_scorer::{RiskAssessment, RiskLevel, EXCESSIVE_RETRY_ATTEMPTS, PAST_FAILURE_LIMIT},
};

/// Failure rate above which the recommendations call out retries.
const HIGH_FAILURE_RATE: f64 = 10.0;

pub struct OfflineNarrator;

impl NarrativeGenerator for OfflineNarrator {
    fn name(&self) -> &'static str {
        "offline"
    }

    fn narrate_summary(&self, s: &MetricSummary) -> IntelResult<String> {
        let mut text = format!(
            "Between {} and {}, {} transactions were processed: {:.2}% succeeded and \
             {:.2}% failed, generating {:.2} in revenue.",
            s.window.start_date,
            s.window.end_date,
            s.total_transactions,
            s.success_rate_percent,
            s.failure_rate_percent,
            s.total_revenue
        );

        if !s.top_failing_regions.is_empty() {
            let regions: Vec<String> = s
                .top_failing_regions
                .iter()
                .map(|r| format!("{} ({})", r.country, r.failures))
                .collect();
            text.push_str(&format!(" Failures concentrate in {}.", regions.join(", ")));
        }

        let weakest = s
            .payment_method_success_rates
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1));
        if let Some((method, rate)) = weakest {
            text.push_str(&format!(
                " The weakest payment method is {method} at {rate:.1}% success."
            ));
        }
        Ok(text)
    }

    fn explain_risk(&self, a: &RiskAssessment) -> IntelResult<FraudExplanation> {
        let mut reasons = Vec::new();
        if a.indicators.amount_above_90th_percentile {
            reasons.push(format!(
                "the amount {:.2} is above the 90th percentile of successful payments ({:.2})",
                a.transaction_data.amount, a.high_amount_threshold
            ));
        }
        if a.indicators.past_failures_for_customer > PAST_FAILURE_LIMIT {
            reasons.push(format!(
                "the customer has {} failed transactions on record",
                a.indicators.past_failures_for_customer
            ));
        }
        if a.indicators.excessive_retries {
            reasons.push(format!(
                "the payment was retried {} times (threshold {EXCESSIVE_RETRY_ATTEMPTS})",
                a.transaction_data.retry_attempts
            ));
        }

        let explanation = if reasons.is_empty() {
            format!(
                "Transaction {} shows none of the heuristic risk indicators.",
                a.transaction_data.transaction_id
            )
        } else {
            format!(
                "Transaction {} scored {} risk points because {}.",
                a.transaction_data.transaction_id,
                a.risk_points,
                reasons.join("; ")
            )
        };

        let recommendation = match a.heuristic_risk_score {
            RiskLevel::Low => "Approve",
            RiskLevel::Medium => "Review",
            RiskLevel::High => "Block",
        };

        Ok(FraudExplanation {
            risk_score: a.heuristic_risk_score.to_string(),
            explanation,
            recommendation: recommendation.to_string(),
        })
    }

    fn answer_question(&self, question: &str, c: &GlobalContext) -> IntelResult<String> {
        Ok(format!(
            "No language model is configured, so \"{}\" cannot be answered directly. \
             Across {} transactions the overall failure rate is {:.2}%, the average \
             transaction value is {:.2}, customers retry {:.2} times on average and \
             most payments come from {} devices.",
            question.trim(),
            c.transaction_count,
            c.overall_failure_rate,
            c.average_transaction_value,
            c.average_retries,
            c.most_used_device
        ))
    }

    fn recommend(&self, c: &GlobalContext) -> IntelResult<String> {
        let mut items = vec![format!(
            "Optimise the checkout flow for {} devices, which carry most of the traffic.",
            c.most_used_device
        )];
        if c.overall_failure_rate > HIGH_FAILURE_RATE {
            items.push(format!(
                "Investigate the {:.2}% failure rate; route retries to a fallback processor.",
                c.overall_failure_rate
            ));
        } else {
            items.push(format!(
                "Keep monitoring the failure rate, currently {:.2}%.",
                c.overall_failure_rate
            ));
        }
        if c.average_retries >= 1.0 {
            items.push(format!(
                "Flag sessions with repeated retries; the average is {:.2} per transaction.",
                c.average_retries
            ));
        }
        items.push(format!(
            "Review transactions well above the {:.2} average value before settlement.",
            c.average_transaction_value
        ));

        Ok(items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {item}", i + 1))
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
