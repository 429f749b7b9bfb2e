//! Metric Aggregator — summary statistics over a calendar-day window.
//!
//! Aggregation is a pure function of the window's rows; the analyzer
//! fetches the rows and hands them over.

use crate::{
    store::WindowRow,
    types::round2,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How many countries `top_failing_regions` reports.
pub const TOP_FAILING_REGIONS: usize = 3;

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
}

impl DateWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self { start_date, end_date }
    }

    /// Lower bound for `transaction_time >= ?`.
    pub fn lower_bound(&self) -> String {
        self.start_date.format("%Y-%m-%d").to_string()
    }

    /// Exclusive upper bound for `transaction_time < ?`: the day after `end_date`,
    /// so every timestamp on the last day is kept.
    pub fn upper_bound(&self) -> String {
        match self.end_date.succ_opt() {
            Some(next) => next.format("%Y-%m-%d").to_string(),
            // '~' sorts after every digit, space and 'T'.
            None => format!("{}~", self.end_date.format("%Y-%m-%d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionFailures {
    pub country:  String,
    pub failures: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub window:                       DateWindow,
    pub total_transactions:           u32,
    pub success_rate_percent:         f64,
    pub failure_rate_percent:         f64,
    /// Highest failure counts first; ties keep first-seen order.
    pub top_failing_regions:          Vec<RegionFailures>,
    pub payment_method_success_rates: BTreeMap<String, f64>,
    /// Sum of successful amounts only.
    pub total_revenue:                f64,
}

/// Summarize the rows of one window. `None` when the window is empty.
pub fn aggregate_window(window: DateWindow, rows: &[WindowRow]) -> Option<MetricSummary> {
    if rows.is_empty() {
        return None;
    }

    let total = rows.len() as u32;
    let successes = rows.iter().filter(|r| r.payment_status.is_success()).count() as f64;
    let failures = rows.iter().filter(|r| r.payment_status.is_failed()).count() as f64;

    let total_revenue: f64 = rows
        .iter()
        .filter(|r| r.payment_status.is_success())
        .map(|r| r.amount)
        .sum();

    Some(MetricSummary {
        window,
        total_transactions: total,
        success_rate_percent: round2(successes / total as f64 * 100.0),
        failure_rate_percent: round2(failures / total as f64 * 100.0),
        top_failing_regions: top_failing_regions(rows, TOP_FAILING_REGIONS),
        payment_method_success_rates: method_success_rates(rows),
        total_revenue,
    })
}

/// Countries ranked by failed-transaction count.
pub fn top_failing_regions(rows: &[WindowRow], limit: usize) -> Vec<RegionFailures> {
    let mut ranked: Vec<RegionFailures> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows.iter().filter(|r| r.payment_status.is_failed()) {
        let seen = index.get(row.country.as_str()).copied();
        match seen {
            Some(i) => ranked[i].failures += 1,
            None => {
                index.insert(row.country.as_str(), ranked.len());
                ranked.push(RegionFailures {
                    country: row.country.clone(),
                    failures: 1,
                });
            }
        }
    }

    // Stable sort: equal counts stay in first-seen order.
    ranked.sort_by(|a, b| b.failures.cmp(&a.failures));
    ranked.truncate(limit);
    ranked
}

/// Success percentage per payment method, across every status.
pub fn method_success_rates(rows: &[WindowRow]) -> BTreeMap<String, f64> {
    let mut tallies: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    for row in rows {
        let entry = tallies.entry(row.payment_method.clone()).or_insert((0, 0));
        if row.payment_status.is_success() {
            entry.0 += 1;
        }
        entry.1 += 1;
    }
    tallies
        .into_iter()
        .map(|(method, (ok, all))| (method, ok as f64 / all as f64 * 100.0))
        .collect()
}
