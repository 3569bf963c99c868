// src/main.rs
use anyhow::Context;
use dotenv::dotenv;
use log::{info, warn};
use std::time::Duration;

use rental_analyzer::config::{Settings, UserAssumptions};
use rental_analyzer::handlers::report::{batch_summary, render_estimations, DIVIDER};
use rental_analyzer::services::analysis::{analyze_all, committable, log_skipped, PropertyOutcome};
use rental_analyzer::services::analysis_store::AnalysisStore;
use rental_analyzer::services::error_log::ErrorLog;
use rental_analyzer::services::interest_rate::resolve_interest_rate;
use rental_analyzer::services::property_source::JsonPropertySource;
use rental_analyzer::services::url_store::UrlStore;

async fn exit_after(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting batch analysis...");

    let settings = Settings::from_env();
    let urls = UrlStore::from_settings(&settings);

    let collection = match urls.collection() {
        Some(collection) => collection,
        None => {
            println!("No URLs exist, run add_urls first to add property URLs.");
            exit_after(settings.exit_delay).await;
            return Ok(());
        }
    };

    let analyses = AnalysisStore::new(settings.analysis_path());
    let pruned = analyses
        .retain_tracked(&collection.property)
        .context("Failed to prune stale analyses")?;
    if pruned > 0 {
        info!("Pruned {} analyses no longer tracked in {}", pruned, urls.path().display());
    }

    let assumptions = UserAssumptions::load(&settings.assumptions_path)
        .context("Failed to load user assumptions")?;
    let rate = resolve_interest_rate(settings.interest_rate).await;
    let source = JsonPropertySource::load(&settings.property_facts_path).with_interest_rate(rate);

    let total = collection.property.len();
    let mut done = 0;
    let outcomes = analyze_all(collection.property.keys().map(String::as_str), &source, &assumptions, |url| {
        done += 1;
        println!("{}\nAnalyzing property {} of {}: {}", DIVIDER, done, total, url);
    });

    for outcome in &outcomes {
        if let PropertyOutcome::Analyzed(analysis) = outcome {
            print!("{}", render_estimations(&analysis.facts));
        }
    }
    let skipped = log_skipped(&outcomes, &ErrorLog::new(settings.errors_log_path()));
    if skipped > 0 {
        warn!("{} properties skipped, see {}", skipped, settings.errors_log_path().display());
    }

    let report = analyses
        .upsert_batch(&committable(&outcomes))
        .context("Failed to write analyses")?;
    info!(
        "{} of {} properties added/updated in {}",
        report.updated_count(),
        total,
        analyses.path().display()
    );
    println!("{}\n{}", DIVIDER, batch_summary(&report));

    exit_after(settings.exit_delay).await;
    Ok(())
}
