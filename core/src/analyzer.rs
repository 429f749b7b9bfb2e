//! The payment analyzer — the entry point of the analytic core.
//!
//! RULES:
//!   - Holds only the store location; no connection outlives a call.
//!   - Every connection is read-only. The analyzer never mutates the store.
//!   - Aggregation is delegated to the pure component functions.

use crate::{
    error::{IntelError, IntelResult},
    global_context::{self, GlobalContext},
    metric_aggregator::{self, DateWindow, MetricSummary},
    risk_scorer::{self, RiskAssessment},
    store::{PaymentStore, StoreLocation},
};
use chrono::NaiveDate;

pub struct PaymentAnalyzer {
    location: StoreLocation,
}

impl PaymentAnalyzer {
    /// Verify the store is usable and build the analyzer.
    /// A missing database fails here, not on the first request.
    pub fn new(location: StoreLocation) -> IntelResult<Self> {
        if let StoreLocation::File(path) = &location {
            if !path.exists() {
                return Err(IntelError::Configuration(format!(
                    "Database not found at {}. Run `payintel seed --db {}` \
                     or load the dataset first.",
                    path.display(),
                    path.display()
                )));
            }
        }

        let store = PaymentStore::open_read_only(&location)?;
        if !store.has_transactions_table()? {
            return Err(IntelError::Configuration(format!(
                "Database at {location} has no `transactions` table"
            )));
        }
        let rows = store.transaction_count()?;
        log::info!("analyzer: store {location} ready with {rows} transactions");

        Ok(Self { location })
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    fn connect(&self) -> IntelResult<PaymentStore> {
        PaymentStore::open_read_only(&self.location)
    }

    /// Metrics for every transaction between `start` and `end`, both days included.
    pub fn summarize(&self, start: NaiveDate, end: NaiveDate) -> IntelResult<MetricSummary> {
        let window = DateWindow::new(start, end);
        let rows = {
            let store = self.connect()?;
            store.window_rows(&window.lower_bound(), &window.upper_bound())?
        };

        let summary = metric_aggregator::aggregate_window(window, &rows).ok_or_else(|| {
            IntelError::NotFound("No transactions found in this date range.".to_string())
        })?;
        log::debug!(
            "summary {start}..={end}: {} txns, success {:.2}%, failure {:.2}%",
            summary.total_transactions,
            summary.success_rate_percent,
            summary.failure_rate_percent
        );
        Ok(summary)
    }

    /// Heuristic fraud risk for one transaction.
    pub fn score(&self, transaction_id: &str) -> IntelResult<RiskAssessment> {
        let (transaction, past_failures, successful_amounts) = {
            let store = self.connect()?;
            let transaction = store
                .find_transaction(transaction_id)?
                .ok_or_else(|| IntelError::NotFound("Transaction not found.".to_string()))?;
            let past_failures = store.customer_failure_count(&transaction.customer_id)?;
            let amounts = store.successful_amounts()?;
            (transaction, past_failures, amounts)
        };

        let assessment = risk_scorer::assess(transaction, past_failures, &successful_amounts)?;
        log::debug!(
            "risk {transaction_id}: {} points -> {}",
            assessment.risk_points,
            assessment.heuristic_risk_score
        );
        Ok(assessment)
    }

    /// Dataset-wide statistics.
    pub fn context(&self) -> IntelResult<GlobalContext> {
        let rows = self.connect()?.context_rows()?;
        global_context::build_context(&rows)
    }

    /// Number of rows in the store; used by the health probe.
    pub fn transaction_count(&self) -> IntelResult<i64> {
        self.connect()?.transaction_count()
    }
}
