//! Shared primitive types used across the service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a single payment event.
pub type TransactionId = String;

/// Identifier of the customer that owns a transaction.
pub type CustomerId = String;

/// Outcome label of a payment event.
///
/// Only `Success` and `Failed` drive the metrics; any other label is
/// kept verbatim so it still counts towards totals.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Success,
    Failed,
    Other(String),
}

impl PaymentStatus {
    pub const SUCCESS: &'static str = "Success";
    pub const FAILED: &'static str = "Failed";

    pub fn parse(label: &str) -> Self {
        match label {
            Self::SUCCESS => Self::Success,
            Self::FAILED => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => Self::SUCCESS,
            Self::Failed => Self::FAILED,
            Self::Other(label) => label,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PaymentStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PaymentStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::parse(&label))
    }
}

/// One row of the `transactions` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id:   TransactionId,
    pub customer_id:      CustomerId,
    pub amount:           f64,
    pub payment_status:   PaymentStatus,
    pub country:          String,
    pub payment_method:   String,
    pub device_type:      Option<String>,
    pub retry_attempts:   u32,
    /// `YYYY-MM-DD HH:MM:SS`; compared lexically by the store.
    pub transaction_time: String,
}

/// Round to two decimal places, the precision used for reported rates.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
