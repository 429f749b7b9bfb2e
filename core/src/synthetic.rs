//! Deterministic synthetic transaction data for demos and local runs.
//!
//! Shapes follow what a card/UPI payments table usually looks like:
//! Pareto-distributed amounts, a few dominant countries and methods,
//! and failures that become more likely the more a payment was retried.

use crate::{
    error::{IntelError, IntelResult},
    rng::{SeededRng, Stream},
    types::{PaymentStatus, TransactionRecord},
};
use chrono::{Days, NaiveDate};

const COUNTRIES: &[(&str, f64)] = &[
    ("USA", 0.32),
    ("India", 0.22),
    ("UK", 0.12),
    ("Germany", 0.10),
    ("Brazil", 0.09),
    ("Nigeria", 0.08),
    ("Japan", 0.07),
];

const METHODS: &[(&str, f64)] = &[
    ("Credit Card", 0.34),
    ("Debit Card", 0.24),
    ("UPI", 0.18),
    ("Wallet", 0.14),
    ("Net Banking", 0.10),
];

const DEVICES: &[(&str, f64)] = &[("Mobile", 0.56), ("Desktop", 0.34), ("Tablet", 0.10)];

const RETRIES: &[(u32, f64)] = &[(0, 0.68), (1, 0.16), (2, 0.08), (3, 0.05), (4, 0.03)];

const BASE_FAILURE_PROBABILITY: f64 = 0.08;
const FAILURE_PER_RETRY: f64 = 0.09;
const PENDING_PROBABILITY: f64 = 0.03;
const AMOUNT_CAP: f64 = 5_000.0;
const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub rows:       usize,
    pub seed:       u64,
    pub customers:  usize,
    pub start_date: NaiveDate,
    pub days:       u64,
}

impl SyntheticConfig {
    /// A quarter of data starting 2026-01-01, one customer per four rows.
    pub fn demo(rows: usize, seed: u64) -> Self {
        Self {
            rows,
            seed,
            customers: (rows / 4).max(1),
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap_or(NaiveDate::MIN),
            days: 90,
        }
    }
}

/// Generate `config.rows` transactions ordered by time, with ids
/// `TX10000`, `TX10001`, ... in that order.
pub fn generate(config: &SyntheticConfig) -> IntelResult<Vec<TransactionRecord>> {
    if config.customers == 0 || config.days == 0 {
        return Err(IntelError::InvalidRequest(
            "synthetic data needs at least one customer and one day".to_string(),
        ));
    }

    let mut customer_rng = SeededRng::for_stream(config.seed, Stream::Customer);
    let mut amount_rng = SeededRng::for_stream(config.seed, Stream::Amount);
    let mut status_rng = SeededRng::for_stream(config.seed, Stream::Status);
    let mut geo_rng = SeededRng::for_stream(config.seed, Stream::Geography);
    let mut method_rng = SeededRng::for_stream(config.seed, Stream::Method);
    let mut device_rng = SeededRng::for_stream(config.seed, Stream::Device);
    let mut retry_rng = SeededRng::for_stream(config.seed, Stream::Retry);
    let mut time_rng = SeededRng::for_stream(config.seed, Stream::Time);

    let mut rows = Vec::with_capacity(config.rows);
    for _ in 0..config.rows {
        let customer = customer_rng.next_u64_below(config.customers as u64);
        let amount = (amount_rng.pareto(12.0, 1.5).min(AMOUNT_CAP) * 100.0).round() / 100.0;
        let retry_attempts = *retry_rng.weighted(RETRIES);

        let failure_probability =
            BASE_FAILURE_PROBABILITY + FAILURE_PER_RETRY * retry_attempts as f64;
        let payment_status = if status_rng.chance(failure_probability) {
            PaymentStatus::Failed
        } else if status_rng.chance(PENDING_PROBABILITY) {
            PaymentStatus::Other("Pending".to_string())
        } else {
            PaymentStatus::Success
        };

        let day = time_rng.next_u64_below(config.days);
        let second = time_rng.next_u64_below(SECONDS_PER_DAY);
        let date = config
            .start_date
            .checked_add_days(Days::new(day))
            .ok_or_else(|| IntelError::InvalidRequest("synthetic date range overflows".into()))?;

        rows.push(TransactionRecord {
            transaction_id: String::new(),
            customer_id: format!("CUST{:04}", customer + 1),
            amount,
            payment_status,
            country: geo_rng.weighted(COUNTRIES).to_string(),
            payment_method: method_rng.weighted(METHODS).to_string(),
            device_type: Some(device_rng.weighted(DEVICES).to_string()),
            retry_attempts,
            transaction_time: format!(
                "{} {:02}:{:02}:{:02}",
                date.format("%Y-%m-%d"),
                second / 3600,
                (second % 3600) / 60,
                second % 60
            ),
        });
    }

    rows.sort_by(|a, b| a.transaction_time.cmp(&b.transaction_time));
    for (i, row) in rows.iter_mut().enumerate() {
        row.transaction_id = format!("TX{}", 10_000 + i);
    }
    Ok(rows)
}
