// src/handlers/report.rs
//! Terminal rendering for the binaries. The engines and stores hand back
//! plain data; colors and layout live here only.

use owo_colors::OwoColorize;

use crate::config::Action;
use crate::handlers::wizard::Caption;
use crate::models::{AmortizationRow, PropertyFacts, PropertyInfo};
use crate::services::analysis_store::BatchReport;
use crate::services::calculations::ReturnsMetrics;
use crate::services::format::{format_money, format_percent};

pub const DIVIDER: &str =
    "--------------------------------------------------------------------------------";

const DESCRIPTION_WIDTH: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Bad,
    Ok,
    Good,
    Great,
}

fn band(value: f64, ok: f64, good: f64, great: f64) -> Rating {
    if value < ok {
        Rating::Bad
    } else if value < good {
        Rating::Ok
    } else if value < great {
        Rating::Good
    } else {
        Rating::Great
    }
}

pub fn rate_return_on_investment(percent: f64) -> Rating {
    band(percent, 12.0, 20.0, 25.0)
}

pub fn rate_cash_on_cash(percent: f64) -> Rating {
    band(percent, 8.0, 10.0, 12.0)
}

pub fn rate_cap_rate(percent: f64) -> Rating {
    band(percent, 5.0, 7.0, 8.0)
}

pub fn rate_cashflow_per_month(dollars: f64) -> Rating {
    band(dollars, 150.0, 300.0, 500.0)
}

/// A max offer is rated against the asking price.
pub fn rate_max_offer(max_offer: f64, price: f64) -> Rating {
    band(max_offer, price * 0.95, price * 1.05, price * 1.1)
}

fn paint(text: &str, rating: Option<Rating>) -> String {
    match rating {
        Some(Rating::Bad) => text.red().to_string(),
        Some(Rating::Ok) => text.yellow().to_string(),
        Some(Rating::Good) => text.cyan().to_string(),
        Some(Rating::Great) => text.green().to_string(),
        None => text.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RatedMetric {
    pub label: &'static str,
    pub value: String,
    pub rating: Option<Rating>,
}

pub fn rated_metrics(metrics: &ReturnsMetrics, price: f64) -> Vec<RatedMetric> {
    vec![
        RatedMetric {
            label: "Return On Investment",
            value: format_percent(metrics.return_on_investment_percent),
            rating: Some(rate_return_on_investment(metrics.return_on_investment_percent)),
        },
        RatedMetric {
            label: "Cash on Cash Return",
            value: format_percent(metrics.cash_on_cash_percent),
            rating: Some(rate_cash_on_cash(metrics.cash_on_cash_percent)),
        },
        RatedMetric {
            label: "Caprate",
            value: format_percent(metrics.cap_rate_percent),
            rating: Some(rate_cap_rate(metrics.cap_rate_percent)),
        },
        RatedMetric {
            label: "Cashflow per month",
            value: format_money(metrics.cashflow_per_month),
            rating: Some(rate_cashflow_per_month(metrics.cashflow_per_month)),
        },
        RatedMetric {
            label: "Max Offer (Approximately)",
            value: format_money(metrics.max_offer),
            rating: Some(rate_max_offer(metrics.max_offer, price)),
        },
        RatedMetric {
            label: "Emergency Fund (Recommended)",
            value: format_money(metrics.emergency_fund),
            rating: None,
        },
    ]
}

pub fn render_analysis(metrics: &ReturnsMetrics, price: f64) -> String {
    let mut out = String::from("Analysis of property:\n\n");
    for metric in rated_metrics(metrics, price) {
        out.push_str(&format!("{}: {}\n", metric.label, paint(&metric.value, metric.rating)));
    }
    out
}

/// Splits long descriptions into fixed-width lines, hyphenating mid-word breaks.
fn wrap_description(description: &str) -> String {
    let chars: Vec<char> = description.chars().collect();
    let mut out = String::new();
    for (i, chunk) in chars.chunks(DESCRIPTION_WIDTH).enumerate() {
        if i > 0 {
            let mid_word = chars[i * DESCRIPTION_WIDTH - 1] != ' ' && chunk[0] != ' ';
            out.push_str(if mid_word { "-\n" } else { "\n" });
        }
        out.extend(chunk.iter());
    }
    out
}

fn or_unknown<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map_or_else(|| "None".to_string(), |v| v.to_string())
}

pub fn render_property_info(info: &PropertyInfo) -> String {
    let description = info
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map_or_else(|| "None".to_string(), wrap_description);

    let mut out = String::from("Info used for calculations:\n\n");
    out.push_str(&format!("Property Description - {}\n", description));
    out.push_str(&format!("\nParking - {}\n\n", or_unknown(&info.parking)));
    out.push_str(&format!("Address: {}\n", or_unknown(&info.address)));
    out.push_str(&format!("Price: {}\n", format_money(info.price)));
    out.push_str(&format!("Year Built: {}\n", or_unknown(&info.year_built)));
    out.push_str(&format!("House Size: {} sqft\n", or_unknown(&info.sqft)));
    out.push_str(&format!("Price/sqft: {}\n", info.price_per_sqft.map_or_else(|| "None".to_string(), format_money)));
    out.push_str(&format!("Lot Size: {} sqft\n", or_unknown(&info.lot_size)));
    out.push_str(&format!("Down Payment: {:.0}%\n", info.down_payment_fraction * 100.0));
    out.push_str(&format!("Fix Up Cost: {}\n", format_money(info.fix_up_cost)));
    out.push_str(&format!("Loan: {}\n", format_money(info.loan as f64)));
    out.push_str(&format!("Interest Rate: {:.2}%\n", info.interest_rate * 100.0));
    out.push_str(&format!("Loan Length (Years): {}\n", info.loan_years));
    out.push_str(&format!("Mortgage Payment (Monthly): {}\n", format_money(info.mortgage_payment_monthly)));
    out.push_str(&format!("Property Taxes (Monthly): {}\n", format_money(info.property_taxes_monthly)));
    out.push_str(&format!("Insurance (Monthly): {}\n", format_money(info.insurance_monthly)));
    out.push_str(&format!("Units: {}\n", info.units));
    out.push_str(&format!("Rent Per Unit: {}\n", format_money(info.rent_per_unit)));
    out.push_str(&format!("Vacancy: {:.0}%\n", info.vacancy_fraction * 100.0));
    out
}

pub fn render_amortization(rows: &[AmortizationRow]) -> String {
    let headers = ["Period", "Monthly Payment", "Principal Payment", "Interest Payment", "Loan Balance"];
    let mut out = String::from("Amortization Table:\n\n");
    out.push_str(&headers.iter().map(|h| format!("{} |", h)).collect::<Vec<_>>().join(" "));
    out.push('\n');

    for row in rows {
        let cells = [
            row.period.to_string(),
            format_money(row.monthly_payment).trim_start_matches('$').to_string(),
            format_money(row.principal_payment).trim_start_matches('$').to_string(),
            format_money(row.interest_payment).trim_start_matches('$').to_string(),
            format_money(row.loan_balance).trim_start_matches('$').to_string(),
        ];
        let line = headers
            .iter()
            .zip(cells.iter())
            .map(|(header, cell)| format!("{:^width$} |", cell, width = header.len()))
            .collect::<Vec<_>>()
            .join(" ");
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Warning block for facts that were estimated; empty when all were found.
pub fn render_estimations(facts: &PropertyFacts) -> String {
    let estimated = facts.estimated_fields();
    if estimated.is_empty() {
        return String::new();
    }
    let mut out = format!(
        "{}\n",
        "WARNING: THESE ITEMS COULD NOT BE FOUND THUS DEFAULTED TO AN ESTIMATE VALUE. THEY MAY BE WRONG.".red()
    );
    for (field, value) in estimated {
        out.push_str(&format!("{}\n", format!("{}: ??? --> {}", field, value).yellow()));
    }
    out
}

pub fn batch_summary(report: &BatchReport) -> String {
    if report.any_updated() {
        "!!! Analyses were successfully added/updated! Ending program... !!!".green().to_string()
    } else {
        "!!! No new analysis to add/update! Ending program... !!!".red().to_string()
    }
}

fn mode_banner(action: Action) -> (&'static str, &'static str, &'static str) {
    match action {
        Action::Append => (
            "--- APPEND MODE... URLs in this session will be appended to file! ---",
            "- Enter URL to append ('c' to cancel):",
            "Enter another URL to append ('e' to execute changes, 'c' to cancel):",
        ),
        Action::Overwrite => (
            "--- OVERWRITE MODE... URLs before this session will be lost! ---",
            "Enter URL to write ('c' to cancel):",
            "Enter another URL to write ('e' to execute changes, 'c' to cancel):",
        ),
        Action::Delete => (
            "--- DELETE MODE... URLs in session will be lost! ---",
            "Enter URL to delete ('c' to cancel):",
            "Enter another URL to delete ('e' to execute changes, 'c' to cancel):",
        ),
    }
}

/// Text shown for a wizard caption. Prompts end without a newline.
pub fn caption_text(caption: &Caption) -> String {
    match caption {
        Caption::ChooseScope => format!(
            "{} ",
            "Do you want to update search URLs 's' or property URLs 'p'? ('c' to cancel):".cyan()
        ),
        Caption::ChooseAction => format!(
            "{} ",
            "Do you want to append 'a', overwrite 'o', or delete 'd'? ('c' to cancel):".cyan()
        ),
        Caption::EnterUrl { action, another } => {
            let (banner, first, next) = mode_banner(*action);
            let prompt = if *another { next } else { first };
            format!("\n{}\n{} ", banner.yellow(), prompt.cyan())
        }
        Caption::InvalidUrl => format!(
            "\n{}\n",
            "!!! Invalid URL... Try again! (Correct URL for Search/Property?) !!!".red()
        ),
        Caption::UrlReceived => format!("\n{}\n", "!!! URL received! !!!".green()),
        Caption::IgnoredUrls(urls) => format!(
            "{}\n{}\n",
            "!!! At least one of the URLs entered is being ignored. They were not added to urls.json... !!!".red(),
            urls.join("\n")
        ),
        Caption::Committed => format!("\n{}\n", "!!! Committed changes to file! Ending program... !!!".green()),
        Caption::NotCommitted(reason) => format!(
            "\n{}\n",
            format!("!!! No changes were committed ({}). Ending program... !!!", reason).red()
        ),
        Caption::Cancelled => format!("\n{}\n", "!!! No changes were made! Ending program... !!!".red()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldSource;

    #[test]
    fn rating_bands() {
        assert_eq!(rate_return_on_investment(11.99), Rating::Bad);
        assert_eq!(rate_return_on_investment(12.0), Rating::Ok);
        assert_eq!(rate_return_on_investment(24.99), Rating::Good);
        assert_eq!(rate_return_on_investment(25.0), Rating::Great);
        assert_eq!(rate_cash_on_cash(9.0), Rating::Ok);
        assert_eq!(rate_cap_rate(7.5), Rating::Good);
        assert_eq!(rate_cashflow_per_month(500.0), Rating::Great);
        assert_eq!(rate_max_offer(100_000.0, 100_000.0), Rating::Ok);
        assert_eq!(rate_max_offer(94_000.0, 100_000.0), Rating::Bad);
        assert_eq!(rate_max_offer(111_000.0, 100_000.0), Rating::Great);
    }

    #[test]
    fn emergency_fund_is_not_rated() {
        let metrics = ReturnsMetrics {
            return_on_investment_percent: 20.0,
            cash_on_cash_percent: 10.0,
            cap_rate_percent: 7.0,
            cashflow_per_month: 300.0,
            max_offer: 1.0,
            emergency_fund: 5_000.0,
        };
        let rated = rated_metrics(&metrics, 100_000.0);
        assert_eq!(rated.len(), 6);
        assert_eq!(rated[5].rating, None);
        assert_eq!(rated[5].value, "$5,000.00");
        assert_eq!(rated[0].rating, Some(Rating::Good));
    }

    #[test]
    fn amortization_table_has_a_row_per_period() {
        let rows = crate::services::amortization::compute(12_000.0, 0.01, 12).unwrap();
        let table = render_amortization(&rows);
        assert_eq!(table.lines().count(), 2 + 1 + 12);
        assert!(table.contains("Period | Monthly Payment |"));
    }

    #[test]
    fn long_descriptions_wrap() {
        let description = "a".repeat(250);
        let wrapped = wrap_description(&description);
        assert_eq!(wrapped.lines().count(), 3);
        assert!(wrapped.lines().next().unwrap().ends_with('-'));
    }

    #[test]
    fn estimations_list_only_estimated_fields() {
        let mut facts = PropertyFacts::default();
        facts.found.insert("rent_per_unit".into(), FieldSource::Estimated("1200".into()));
        facts.found.insert("price".into(), FieldSource::Found);
        let text = render_estimations(&facts);
        assert!(text.contains("rent_per_unit: ??? --> 1200"));
        assert!(!text.contains("price"));
        assert!(render_estimations(&PropertyFacts::default()).is_empty());
    }

    #[test]
    fn prompts_follow_progress() {
        let first = caption_text(&Caption::EnterUrl { action: Action::Delete, another: false });
        let next = caption_text(&Caption::EnterUrl { action: Action::Delete, another: true });
        assert!(first.contains("Enter URL to delete ('c' to cancel):"));
        assert!(next.contains("'e' to execute changes"));
    }
}
