//! Shared fixtures: a named in-memory store the analyzer can reopen.

#![allow(dead_code)]

use payintel_core::{
    analyzer::PaymentAnalyzer,
    store::{PaymentStore, StoreLocation},
    types::{PaymentStatus, TransactionRecord},
};

/// Keeps the writer connection open so the shared in-memory database
/// outlives every analyzer call made during the test.
pub struct Fixture {
    pub store: PaymentStore,
    pub location: StoreLocation,
}

impl Fixture {
    /// `name` must be unique per test; tests in one binary share a process.
    pub fn new(name: &str) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let location = StoreLocation::memory(format!("payintel-test-{name}"));
        let store = PaymentStore::open(&location).unwrap();
        store.migrate().unwrap();
        Self { store, location }
    }

    pub fn with_rows(name: &str, rows: &[TransactionRecord]) -> Self {
        let fixture = Self::new(name);
        for row in rows {
            fixture.add(row.clone());
        }
        fixture
    }

    pub fn add(&self, row: TransactionRecord) {
        self.store.insert_transaction(&row).unwrap();
    }

    pub fn analyzer(&self) -> PaymentAnalyzer {
        PaymentAnalyzer::new(self.location.clone()).unwrap()
    }
}

/// A successful 100.00 card payment on 2026-01-15 with no retries.
pub fn tx(id: &str) -> TransactionRecord {
    TransactionRecord {
        transaction_id: id.to_string(),
        customer_id: "C001".to_string(),
        amount: 100.0,
        payment_status: PaymentStatus::Success,
        country: "USA".to_string(),
        payment_method: "Credit Card".to_string(),
        device_type: Some("Mobile".to_string()),
        retry_attempts: 0,
        transaction_time: "2026-01-15 12:00:00".to_string(),
    }
}

pub fn failed(id: &str) -> TransactionRecord {
    TransactionRecord {
        payment_status: PaymentStatus::Failed,
        ..tx(id)
    }
}
