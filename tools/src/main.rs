//! payintel: runner for the payment intelligence service.
//!
//! Usage:
//!   payintel serve  [--config config/service.json] [--db data/payments.db] [--host H] [--port P]
//!   payintel seed   --db data/payments.db [--rows 500] [--seed 42] [--force]
//!   payintel report --db data/payments.db [--start 2026-01-01 --end 2026-03-31]

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use payintel_core::{
    analyzer::PaymentAnalyzer,
    api::{self, AppState},
    config::ServiceConfig,
    narrative::narrator_from_config,
    store::{PaymentStore, StoreLocation},
    synthetic::{self, SyntheticConfig},
};
use std::env;
use std::path::Path;

const DEFAULT_CONFIG: &str = "config/service.json";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("serve") => serve(&args),
        Some("seed") => seed(&args),
        Some("report") => report(&args),
        Some("--help") | Some("-h") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            bail!("unknown command: {other}")
        }
    }
}

fn serve(args: &[String]) -> Result<()> {
    let mut config = match find_arg(args, "--config") {
        Some(path) => ServiceConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => ServiceConfig::load(DEFAULT_CONFIG)?,
        None => ServiceConfig::from_env()?,
    };
    if let Some(db) = find_arg(args, "--db") {
        config.store.db_path = db.to_string();
    }
    if let Some(host) = find_arg(args, "--host") {
        config.server.host = host.to_string();
    }
    config.server.port = parse_arg(args, "--port", config.server.port);

    // Fail fast: a missing database is a startup error, not a 500 later.
    let analyzer = PaymentAnalyzer::new(config.store_location())?;
    let narrator = narrator_from_config(&config.llm);
    let app = api::router(AppState::new(analyzer, narrator), config.server.cors_enabled);
    let addr = config.bind_address();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("cannot start async runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("cannot bind {addr}"))?;
        log::info!("payintel listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

fn seed(args: &[String]) -> Result<()> {
    let Some(db) = find_arg(args, "--db") else {
        bail!("seed needs --db <path>");
    };
    let rows = parse_arg(args, "--rows", 500usize);
    let seed = parse_arg(args, "--seed", 42u64);
    let force = args.iter().any(|a| a == "--force");

    if let Some(parent) = Path::new(db).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    let mut store = PaymentStore::open(&StoreLocation::file(db))?;
    store.migrate()?;
    let existing = store.transaction_count()?;
    if existing > 0 {
        if !force {
            bail!("{db} already holds {existing} transactions; pass --force to replace them");
        }
        store.clear_transactions()?;
        log::info!("removed {existing} existing transactions from {db}");
    }

    let data = synthetic::generate(&SyntheticConfig::demo(rows, seed))?;
    let inserted = store.insert_transactions(&data)?;

    println!("payintel seed");
    println!("  db:    {db}");
    println!("  seed:  {seed}");
    println!("  rows:  {inserted}");
    if let (Some(first), Some(last)) = (data.first(), data.last()) {
        println!("  from:  {}", first.transaction_time);
        println!("  to:    {}", last.transaction_time);
    }
    Ok(())
}

fn report(args: &[String]) -> Result<()> {
    let db = find_arg(args, "--db").unwrap_or("data/payments.db");
    let analyzer = PaymentAnalyzer::new(StoreLocation::file(db))?;

    let ctx = analyzer.context()?;
    println!("=== GLOBAL CONTEXT ===");
    println!("  transactions:      {}", ctx.transaction_count);
    println!("  processed volume:  {:.2}", ctx.total_processed_volume);
    println!("  average value:     {:.2}", ctx.average_transaction_value);
    println!("  failure rate:      {:.2}%", ctx.overall_failure_rate);
    println!("  most used device:  {}", ctx.most_used_device);
    println!("  average retries:   {:.2}", ctx.average_retries);

    let (start, end) = match (find_arg(args, "--start"), find_arg(args, "--end")) {
        (Some(s), Some(e)) => (parse_date(s)?, parse_date(e)?),
        (None, None) => return Ok(()),
        _ => bail!("--start and --end must be given together"),
    };

    println!();
    println!("=== WINDOW {start} .. {end} ===");
    let summary = analyzer.summarize(start, end)?;
    println!("  transactions:  {}", summary.total_transactions);
    println!("  success rate:  {:.2}%", summary.success_rate_percent);
    println!("  failure rate:  {:.2}%", summary.failure_rate_percent);
    println!("  revenue:       {:.2}", summary.total_revenue);
    for region in &summary.top_failing_regions {
        println!("  failing:       {} ({})", region.country, region.failures);
    }
    for (method, rate) in &summary.payment_method_success_rates {
        println!("  {method:<14} {rate:.1}% success");
    }
    Ok(())
}

fn print_help() {
    println!("payintel - payment intelligence service");
    println!();
    println!("USAGE:");
    println!("    payintel serve  [--config FILE] [--db PATH] [--host HOST] [--port PORT]");
    println!("    payintel seed   --db PATH [--rows N] [--seed S] [--force]");
    println!("    payintel report [--db PATH] [--start YYYY-MM-DD --end YYYY-MM-DD]");
    println!();
    println!("ENVIRONMENT:");
    println!("    GROQ_API_KEY           enables LLM narration (offline templates otherwise)");
    println!("    PAYINTEL_DB            database path override");
    println!("    PAYINTEL_HOST/PORT     bind address override");
    println!("    PAYINTEL_LLM_MODEL     chat model name");
    println!("    PAYINTEL_LLM_BASE_URL  OpenAI-compatible base URL");
    println!("    RUST_LOG               log filter, e.g. info or payintel_core=debug");
}

fn find_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("{value} is not a YYYY-MM-DD date"))
}
