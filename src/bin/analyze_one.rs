// src/bin/analyze_one.rs
use anyhow::bail;
use dotenv::dotenv;
use log::info;
use std::env;

use rental_analyzer::config::{Settings, UserAssumptions};
use rental_analyzer::handlers::report::{
    render_amortization, render_analysis, render_estimations, render_property_info, DIVIDER,
};
use rental_analyzer::services::analysis::{analyze_url, log_skipped, PropertyOutcome};
use rental_analyzer::services::analysis_store::AnalysisStore;
use rental_analyzer::services::error_log::ErrorLog;
use rental_analyzer::services::interest_rate::resolve_interest_rate;
use rental_analyzer::services::listing::is_detail_url;
use rental_analyzer::services::property_source::JsonPropertySource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let url = match env::args().nth(1) {
        Some(url) if is_detail_url(url.trim()) => url.trim().to_string(),
        Some(url) => bail!("'{}' is not a property detail URL", url),
        None => bail!("usage: analyze_one <property url>"),
    };

    let settings = Settings::from_env();
    let assumptions = UserAssumptions::load(&settings.assumptions_path)?;
    let rate = resolve_interest_rate(settings.interest_rate).await;
    let source = JsonPropertySource::load(&settings.property_facts_path).with_interest_rate(rate);

    let outcome = analyze_url(&url, &source, &assumptions);
    log_skipped(std::slice::from_ref(&outcome), &ErrorLog::new(settings.errors_log_path()));
    let analysis = match outcome {
        PropertyOutcome::Analyzed(analysis) => analysis,
        PropertyOutcome::Skipped { reason, .. } => {
            return Err(anyhow::Error::new(reason).context(format!("Could not analyze {}", url)));
        }
    };

    println!("{}", DIVIDER);
    print!("{}", render_estimations(&analysis.facts));
    println!("{}", render_property_info(&analysis.record.property_info));
    println!("{}", render_amortization(&analysis.amortization));
    println!("{}", render_analysis(&analysis.metrics, analysis.record.property_info.price));
    println!("{}", DIVIDER);

    let store = AnalysisStore::new(settings.analysis_path());
    if store.upsert_one(&analysis.key, &analysis.record)? {
        info!("Stored analysis for {} in {}", analysis.key, store.path().display());
    } else {
        info!("Price unchanged for {}, stored analysis kept", analysis.key);
    }
    Ok(())
}
