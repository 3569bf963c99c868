// src/services/interest_rate.rs
use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

pub const MORTGAGE_RATES_URL: &str = "https://www.nerdwallet.com/mortgages/mortgage-rates";

/// Fetch today's 30-year fixed rate as a fraction (0.065 for 6.5%).
pub async fn fetch_current_rate() -> Result<f64> {
    info!("Fetching current mortgage rates from URL: {}", MORTGAGE_RATES_URL);

    let client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()?;
    let page = client
        .get(MORTGAGE_RATES_URL)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let rate = parse_rate_table(&page)?;
    info!("Found 30-year fixed rate: {:.4}", rate);
    Ok(rate)
}

/// Rate applied to listings without their own: `configured` when set,
/// otherwise today's published rate, or `None` if that cannot be fetched.
pub async fn resolve_interest_rate(configured: Option<f64>) -> Option<f64> {
    if let Some(rate) = configured {
        info!("Using $INTEREST_RATE = {}", rate);
        return Some(rate);
    }
    match fetch_current_rate().await {
        Ok(rate) => Some(rate),
        Err(e) => {
            warn!("Could not fetch the current interest rate, relying on property facts: {:#}", e);
            None
        }
    }
}

/// Reads the first cell of the rates table body, e.g. "6.875%".
pub fn parse_rate_table(html: &str) -> Result<f64> {
    let document = Html::parse_document(html);
    let cell_selector = Selector::parse("tbody td").map_err(|e| anyhow!("bad selector: {:?}", e))?;

    let cell = document
        .select(&cell_selector)
        .next()
        .ok_or_else(|| anyhow!("no rate table on the page"))?;
    let text: String = cell.text().collect();

    let re = Regex::new(r"(\d+(?:\.\d+)?)\s*%")?;
    let percent = re
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| anyhow!("no percentage in first rate cell: '{}'", text.trim()))?
        .as_str()
        .parse::<f64>()
        .context("rate cell is not a number")?;

    Ok(percent / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_cell_as_fraction() {
        let html = r#"
            <table>
              <thead><tr><th>Product</th></tr></thead>
              <tbody>
                <tr><td><span>6.875%</span></td><td>7.01%</td></tr>
                <tr><td>6.125%</td></tr>
              </tbody>
            </table>"#;
        let rate = parse_rate_table(html).unwrap();
        assert!((rate - 0.06875).abs() < 1e-12);
    }

    #[test]
    fn missing_table_is_an_error() {
        assert!(parse_rate_table("<html><body><p>Rates unavailable</p></body></html>").is_err());
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        assert!(parse_rate_table("<table><tbody><tr><td>N/A</td></tr></tbody></table>").is_err());
    }

    #[tokio::test]
    async fn configured_rate_skips_the_fetch() {
        assert_eq!(resolve_interest_rate(Some(0.0525)).await, Some(0.0525));
    }
}
