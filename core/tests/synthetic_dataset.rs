//! The demo dataset loaded into a store and read back through the analyzer.

mod common;

use chrono::NaiveDate;
use common::Fixture;
use payintel_core::{
    narrative::{NarrativeGenerator, OfflineNarrator},
    synthetic::{generate, SyntheticConfig},
};

fn seeded(name: &str, rows: usize, seed: u64) -> Fixture {
    let mut fixture = Fixture::new(name);
    let data = generate(&SyntheticConfig::demo(rows, seed)).unwrap();
    assert_eq!(fixture.store.insert_transactions(&data).unwrap(), rows);
    fixture
}

#[test]
fn full_quarter_summary_matches_the_context() {
    let fixture = seeded("synthetic-quarter", 500, 42);
    let analyzer = fixture.analyzer();

    let ctx = analyzer.context().unwrap();
    let summary = analyzer
        .summarize(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        )
        .unwrap();

    assert_eq!(ctx.transaction_count, 500);
    assert_eq!(summary.total_transactions, 500);
    assert!((summary.total_revenue - ctx.total_processed_volume).abs() < 0.01);
    assert!(summary.success_rate_percent + summary.failure_rate_percent <= 100.0);
    assert!(summary.top_failing_regions.len() <= 3);
    assert!(summary
        .top_failing_regions
        .windows(2)
        .all(|w| w[0].failures >= w[1].failures));
}

#[test]
fn every_seeded_transaction_can_be_scored() {
    let fixture = seeded("synthetic-scoring", 120, 7);
    let analyzer = fixture.analyzer();

    for i in 0..120 {
        let id = format!("TX{}", 10_000 + i);
        let assessment = analyzer.score(&id).unwrap();
        assert_eq!(assessment.transaction_data.transaction_id, id);
        assert_eq!(
            assessment.risk_points,
            assessment.indicators.points(),
            "{id}"
        );
    }
}

#[test]
fn offline_narration_covers_the_demo_data() {
    let fixture = seeded("synthetic-offline", 200, 3);
    let analyzer = fixture.analyzer();
    let narrator = OfflineNarrator;

    let ctx = analyzer.context().unwrap();
    let insights = narrator.recommend(&ctx).unwrap();
    assert!(insights.starts_with("1. "));
    assert!(insights.contains(&ctx.most_used_device));

    let assessment = analyzer.score("TX10000").unwrap();
    let explanation = narrator.explain_risk(&assessment).unwrap();
    assert_eq!(explanation.risk_score, assessment.heuristic_risk_score.to_string());
}
