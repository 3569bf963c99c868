// src/bin/add_urls.rs
use dotenv::dotenv;
use log::info;

use rental_analyzer::config::Settings;
use rental_analyzer::handlers::input::ConsoleInput;
use rental_analyzer::handlers::wizard::{UrlCaptureWizard, WizardOutcome};
use rental_analyzer::services::url_store::UrlStore;

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();

    let settings = Settings::from_env();
    let store = UrlStore::from_settings(&settings);
    info!("Capturing URLs into {}", store.path().display());

    let mut input = ConsoleInput::stdio();
    let outcome = UrlCaptureWizard::new(&mut input, &store).run();
    match outcome {
        WizardOutcome::Committed { report, .. } => info!(
            "{} URL(s) tracked, {} ignored, {} stale analyses pruned",
            report.tracked,
            report.ignored.len(),
            report.pruned_analyses
        ),
        WizardOutcome::NotCommitted { reason, .. } => info!("Nothing committed: {}", reason),
        WizardOutcome::Unchanged { .. } => info!("{} left unchanged", store.path().display()),
        WizardOutcome::Cancelled => {}
    }

    tokio::time::sleep(settings.exit_delay).await;
}
