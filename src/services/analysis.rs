// src/services/analysis.rs
use log::{error, info, warn};
use std::collections::BTreeMap;

use crate::config::UserAssumptions;
use crate::error::{AnalysisError, Result};
use crate::models::{AmortizationRow, AnalysisRecord, PropertyFacts, PropertyInfo};
use crate::services::amortization;
use crate::services::calculations::{
    compute_display_metrics, insurance_cost, loan_basics, required_facts, returns_metrics,
    LoanBasics, RequiredFacts, ReturnsMetrics,
};
use crate::services::error_log::ErrorLog;
use crate::services::format::round2;
use crate::services::listing::canonical_key;
use crate::services::property_source::PropertySource;

/// Everything computed for one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAnalysis {
    pub key: String,
    pub facts: PropertyFacts,
    pub amortization: Vec<AmortizationRow>,
    pub metrics: ReturnsMetrics,
    pub record: AnalysisRecord,
}

#[derive(Debug)]
pub enum PropertyOutcome {
    Analyzed(Box<PropertyAnalysis>),
    Skipped { url: String, reason: AnalysisError },
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

fn property_info(
    facts: &PropertyFacts,
    required: &RequiredFacts,
    assumptions: &UserAssumptions,
    basics: &LoanBasics,
    monthly_payment: f64,
) -> PropertyInfo {
    let price_per_sqft = facts
        .sqft
        .filter(|sqft| *sqft > 0.0)
        .map(|sqft| round2(required.price / sqft));

    PropertyInfo {
        address: facts.address.clone(),
        price: required.price,
        year_built: facts.year_built,
        description: facts.description.clone(),
        sqft: facts.sqft,
        price_per_sqft,
        lot_size: facts.lot_size,
        parking: facts.parking.clone(),
        down_payment_fraction: round2(assumptions.down_payment_fraction),
        fix_up_cost: assumptions.fix_up_cost,
        loan: basics.loan.trunc() as i64,
        interest_rate: round4(required.interest_rate),
        loan_years: assumptions.loan_years,
        mortgage_payment_monthly: round2(-monthly_payment),
        property_taxes_monthly: round2(required.property_taxes_monthly),
        insurance_monthly: round2(-insurance_cost(required.price) / 12.0),
        units: required.units,
        rent_per_unit: required.rent_per_unit,
        vacancy_fraction: round2(assumptions.vacancy_fraction),
    }
}

/// Runs amortization and returns for one listing and assembles its record.
pub fn analyze_property(url: &str, facts: PropertyFacts, assumptions: &UserAssumptions) -> Result<PropertyAnalysis> {
    let required = required_facts(&facts)?;
    let basics = loan_basics(&required, assumptions);
    let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months)?;
    let monthly_payment = rows.first().map(|r| r.monthly_payment).unwrap_or(0.0);
    let metrics = returns_metrics(&required, assumptions, &basics, &rows)?;

    let record = AnalysisRecord {
        property_url: url.to_string(),
        property_taxes_url: facts.property_taxes_url.clone(),
        property_info: property_info(&facts, &required, assumptions, &basics, monthly_payment),
        analysis: compute_display_metrics(&metrics),
        estimations: BTreeMap::new(),
    };

    Ok(PropertyAnalysis {
        key: canonical_key(url),
        facts,
        amortization: rows,
        metrics,
        record,
    })
}

/// Fetches and analyzes one URL; any failure becomes a `Skipped` outcome.
pub fn analyze_url<S: PropertySource + ?Sized>(url: &str, source: &S, assumptions: &UserAssumptions) -> PropertyOutcome {
    let result = source
        .fetch(url)
        .and_then(|facts| analyze_property(url, facts, assumptions));
    match result {
        Ok(analysis) => {
            info!("Analyzed {} as {}", url, analysis.key);
            PropertyOutcome::Analyzed(Box::new(analysis))
        }
        Err(reason) => {
            error!("Analysis of {} failed: {}", url, reason);
            PropertyOutcome::Skipped { url: url.to_string(), reason }
        }
    }
}

/// Analyzes every URL in order. One bad listing never stops the rest.
pub fn analyze_all<'a, S, I, F>(urls: I, source: &S, assumptions: &UserAssumptions, mut on_progress: F) -> Vec<PropertyOutcome>
where
    S: PropertySource + ?Sized,
    I: IntoIterator<Item = &'a str>,
    F: FnMut(&str),
{
    urls.into_iter()
        .map(|url| {
            on_progress(url);
            analyze_url(url, source, assumptions)
        })
        .collect()
}

/// Key/record pairs of the analyzed outcomes, ready for a batch commit.
pub fn committable(outcomes: &[PropertyOutcome]) -> Vec<(String, AnalysisRecord)> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            PropertyOutcome::Analyzed(analysis) => Some((analysis.key.clone(), analysis.record.clone())),
            PropertyOutcome::Skipped { .. } => None,
        })
        .collect()
}

/// Appends an errors.log block for every skipped outcome and returns how
/// many were written. A log that cannot be written is only warned about.
pub fn log_skipped(outcomes: &[PropertyOutcome], errors: &ErrorLog) -> usize {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            PropertyOutcome::Skipped { url, reason } => Some((url, reason)),
            PropertyOutcome::Analyzed(_) => None,
        })
        .filter(|(url, reason)| match errors.record(url, reason) {
            Ok(()) => true,
            Err(e) => {
                warn!("Could not write to {}: {}", errors.path().display(), e);
                false
            }
        })
        .count()
}
