//! Global Context Builder — dataset-wide statistics used as background
//! for open-ended questions and recommendations.

use crate::{
    error::{IntelError, IntelResult},
    store::ContextRow,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_DEVICE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalContext {
    pub transaction_count:         u32,
    pub total_processed_volume:    f64,
    pub average_transaction_value: f64,
    pub overall_failure_rate:      f64,
    pub most_used_device:          String,
    pub average_retries:           f64,
}

/// Build the context from every row in the store.
/// An empty store has no mean, so it is an error rather than NaN.
pub fn build_context(rows: &[ContextRow]) -> IntelResult<GlobalContext> {
    if rows.is_empty() {
        return Err(IntelError::Computation(
            "global context is undefined for an empty transaction store".to_string(),
        ));
    }
    let n = rows.len() as f64;

    let total_processed_volume: f64 = rows
        .iter()
        .filter(|r| r.payment_status.is_success())
        .map(|r| r.amount)
        .sum();
    let failed = rows.iter().filter(|r| r.payment_status.is_failed()).count() as f64;

    Ok(GlobalContext {
        transaction_count: rows.len() as u32,
        total_processed_volume,
        average_transaction_value: rows.iter().map(|r| r.amount).sum::<f64>() / n,
        overall_failure_rate: failed / n * 100.0,
        most_used_device: most_used_device(rows),
        average_retries: rows.iter().map(|r| r.retry_attempts as f64).sum::<f64>() / n,
    })
}

/// Mode of the non-null device types. Ties go to the alphabetically
/// first value; no devices at all gives "Unknown".
pub fn most_used_device(rows: &[ContextRow]) -> String {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for device in rows.iter().filter_map(|r| r.device_type.as_deref()) {
        *counts.entry(device).or_insert(0) += 1;
    }
    // BTreeMap iterates alphabetically; keep the first maximum.
    let mut best: Option<(&str, u32)> = None;
    for (device, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((device, count));
        }
    }
    best.map(|(device, _)| device.to_string())
        .unwrap_or_else(|| UNKNOWN_DEVICE.to_string())
}
