// src/bin/ignore_urls.rs
use anyhow::bail;
use dotenv::dotenv;
use log::info;
use std::collections::BTreeSet;
use std::env;

use rental_analyzer::config::Settings;
use rental_analyzer::models::Scope;
use rental_analyzer::services::listing::validate_listing_url;
use rental_analyzer::services::url_store::UrlStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let urls: BTreeSet<String> = env::args().skip(1).map(|url| url.trim().to_string()).collect();
    if urls.is_empty() {
        bail!("usage: ignore_urls <property url>...");
    }
    for url in &urls {
        validate_listing_url(url, Scope::Property)?;
    }

    let settings = Settings::from_env();
    let store = UrlStore::from_settings(&settings);
    let report = store.ignore(&urls)?;
    info!(
        "{} URL(s) ignored, {} analyses pruned, {} properties still tracked",
        report.ignored.len(),
        report.pruned_analyses,
        report.tracked
    );
    println!("!!! {} URL(s) added to the ignore list! !!!", report.ignored.len());
    Ok(())
}
