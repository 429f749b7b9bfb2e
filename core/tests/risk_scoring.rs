//! Heuristic fraud risk scoring against a populated store.

mod common;

use common::{failed, tx, Fixture};
use payintel_core::{
    error::IntelError,
    risk_scorer::{assess, RiskIndicators, RiskLevel},
    types::TransactionRecord,
};

/// Ten successful 100.00 payments: the 90th percentile is exactly 100.00.
fn baseline() -> Vec<TransactionRecord> {
    (0..10).map(|i| tx(&format!("BASE{i}"))).collect()
}

#[test]
fn every_indicator_scores_high() {
    let mut rows = baseline();
    rows.push(TransactionRecord {
        customer_id: "C900".into(),
        ..failed("OLD1")
    });
    rows.push(TransactionRecord {
        customer_id: "C900".into(),
        ..failed("OLD2")
    });
    rows.push(TransactionRecord {
        customer_id: "C900".into(),
        amount: 5_000.0,
        retry_attempts: 4,
        ..failed("SUSPECT")
    });
    let fixture = Fixture::with_rows("risk-high", &rows);

    let assessment = fixture.analyzer().score("SUSPECT").unwrap();

    assert!(assessment.indicators.amount_above_90th_percentile);
    assert_eq!(assessment.indicators.past_failures_for_customer, 3);
    assert!(assessment.indicators.excessive_retries);
    assert_eq!(assessment.risk_points, 4);
    assert_eq!(assessment.heuristic_risk_score, RiskLevel::High);
    assert_eq!(assessment.transaction_data.amount, 5_000.0);
}

#[test]
fn no_indicator_scores_low() {
    let mut rows = baseline();
    rows.push(TransactionRecord {
        customer_id: "C200".into(),
        amount: 20.0,
        retry_attempts: 1,
        ..tx("CALM")
    });
    let fixture = Fixture::with_rows("risk-low", &rows);

    let assessment = fixture.analyzer().score("CALM").unwrap();

    assert!(!assessment.indicators.amount_above_90th_percentile);
    assert_eq!(assessment.indicators.past_failures_for_customer, 0);
    assert!(!assessment.indicators.excessive_retries);
    assert_eq!(assessment.risk_points, 0);
    assert_eq!(assessment.heuristic_risk_score, RiskLevel::Low);
}

#[test]
fn unknown_transaction_is_not_found() {
    let fixture = Fixture::with_rows("risk-missing", &baseline());

    match fixture.analyzer().score("NOPE").unwrap_err() {
        IntelError::NotFound(msg) => assert_eq!(msg, "Transaction not found."),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn amount_equal_to_threshold_is_not_high() {
    let fixture = Fixture::with_rows("risk-threshold", &baseline());

    let assessment = fixture.analyzer().score("BASE3").unwrap();

    assert_eq!(assessment.high_amount_threshold, 100.0);
    assert!(!assessment.indicators.amount_above_90th_percentile);
}

#[test]
fn current_failure_counts_towards_customer_history() {
    let mut rows = baseline();
    for id in ["F1", "F2", "F3"] {
        rows.push(TransactionRecord {
            customer_id: "C300".into(),
            amount: 10.0,
            ..failed(id)
        });
    }
    let fixture = Fixture::with_rows("risk-history", &rows);

    let assessment = fixture.analyzer().score("F3").unwrap();

    assert_eq!(assessment.indicators.past_failures_for_customer, 3);
    assert_eq!(assessment.risk_points, 1);
    assert_eq!(assessment.heuristic_risk_score, RiskLevel::Medium);
}

#[test]
fn two_failures_do_not_score() {
    let mut rows = baseline();
    for id in ["F1", "F2"] {
        rows.push(TransactionRecord {
            customer_id: "C301".into(),
            amount: 10.0,
            ..failed(id)
        });
    }
    let fixture = Fixture::with_rows("risk-two-failures", &rows);

    let assessment = fixture.analyzer().score("F2").unwrap();
    assert_eq!(assessment.indicators.past_failures_for_customer, 2);
    assert_eq!(assessment.heuristic_risk_score, RiskLevel::Low);
}

#[test]
fn three_retries_alone_are_medium() {
    let mut rows = baseline();
    rows.push(TransactionRecord {
        retry_attempts: 3,
        amount: 50.0,
        ..tx("RETRY")
    });
    let fixture = Fixture::with_rows("risk-retries", &rows);

    let assessment = fixture.analyzer().score("RETRY").unwrap();
    assert!(assessment.indicators.excessive_retries);
    assert_eq!(assessment.risk_points, 2);
    assert_eq!(assessment.heuristic_risk_score, RiskLevel::Medium);
}

#[test]
fn store_without_successes_cannot_be_scored() {
    let rows = [failed("F1"), failed("F2")];
    let fixture = Fixture::with_rows("risk-no-successes", &rows);

    let err = fixture.analyzer().score("F1").unwrap_err();
    assert!(matches!(err, IntelError::Computation(_)), "got {err:?}");
}

#[test]
fn more_retries_never_lower_the_level() {
    let amounts = [100.0; 10];
    for amount in [50.0, 500.0] {
        for past_failures in 0..5 {
            let mut previous = RiskLevel::Low;
            for retry_attempts in 0..6 {
                let transaction = TransactionRecord {
                    amount,
                    retry_attempts,
                    ..tx("GRID")
                };
                let level = assess(transaction, past_failures, &amounts)
                    .unwrap()
                    .heuristic_risk_score;
                assert!(
                    level_rank(level) >= level_rank(previous),
                    "amount {amount}, failures {past_failures}, retries {retry_attempts}"
                );
                previous = level;
            }
        }
    }
}

#[test]
fn points_follow_the_indicator_weights() {
    let indicators = RiskIndicators {
        amount_above_90th_percentile: true,
        past_failures_for_customer: 0,
        excessive_retries: true,
    };
    assert_eq!(indicators.points(), 3);
    assert_eq!(indicators.level(), RiskLevel::High);
}

fn level_rank(level: RiskLevel) -> u8 {
    match level {
        RiskLevel::Low => 0,
        RiskLevel::Medium => 1,
        RiskLevel::High => 2,
    }
}
