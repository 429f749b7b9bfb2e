//! Risk Scorer — heuristic fraud risk for a single transaction.
//!
//! Point system (not probabilistic):
//!   amount above the 90th percentile of successful amounts  +1
//!   more than 2 failed transactions for the customer          +1
//!   3 or more retry attempts                                  +2
//!
//! 3+ points is High, 1-2 is Medium, 0 is Low.

use crate::{
    error::{IntelError, IntelResult},
    types::TransactionRecord,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Constants ────────────────────────────────────────────────────────────────

pub const HIGH_AMOUNT_QUANTILE: f64 = 0.90;
/// `past_failures` must exceed this to score.
pub const PAST_FAILURE_LIMIT: u32 = 2;
pub const EXCESSIVE_RETRY_ATTEMPTS: u32 = 3;

const HIGH_AMOUNT_POINTS: u8 = 1;
const PAST_FAILURE_POINTS: u8 = 1;
const RETRY_POINTS: u8 = 2;

const HIGH_RISK_POINTS: u8 = 3;
const MEDIUM_RISK_POINTS: u8 = 1;

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_points(points: u8) -> Self {
        if points >= HIGH_RISK_POINTS {
            Self::High
        } else if points >= MEDIUM_RISK_POINTS {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicators {
    pub amount_above_90th_percentile: bool,
    pub past_failures_for_customer:   u32,
    pub excessive_retries:            bool,
}

impl RiskIndicators {
    pub fn points(&self) -> u8 {
        let mut points = 0;
        if self.amount_above_90th_percentile {
            points += HIGH_AMOUNT_POINTS;
        }
        if self.past_failures_for_customer > PAST_FAILURE_LIMIT {
            points += PAST_FAILURE_POINTS;
        }
        if self.excessive_retries {
            points += RETRY_POINTS;
        }
        points
    }

    pub fn level(&self) -> RiskLevel {
        RiskLevel::from_points(self.points())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub transaction_data:      TransactionRecord,
    pub indicators:            RiskIndicators,
    pub high_amount_threshold: f64,
    pub risk_points:           u8,
    pub heuristic_risk_score:  RiskLevel,
}

// ── Scoring ──────────────────────────────────────────────────────────────────

/// Score `transaction` given the customer's failure tally and the amounts
/// of every successful transaction in the store.
pub fn assess(
    transaction: TransactionRecord,
    past_failures: u32,
    successful_amounts: &[f64],
) -> IntelResult<RiskAssessment> {
    let threshold = quantile(successful_amounts, HIGH_AMOUNT_QUANTILE).ok_or_else(|| {
        IntelError::Computation(
            "90th percentile of successful amounts is undefined: no successful transactions"
                .to_string(),
        )
    })?;

    let indicators = RiskIndicators {
        amount_above_90th_percentile: transaction.amount > threshold,
        past_failures_for_customer: past_failures,
        excessive_retries: transaction.retry_attempts >= EXCESSIVE_RETRY_ATTEMPTS,
    };
    let risk_points = indicators.points();

    Ok(RiskAssessment {
        transaction_data: transaction,
        indicators,
        high_amount_threshold: threshold,
        risk_points,
        heuristic_risk_score: RiskLevel::from_points(risk_points),
    })
}

/// Quantile with linear interpolation between closest ranks
/// (position `q * (n - 1)` in the sorted values). `None` for empty input.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let fraction = pos - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}
