// src/models.rs
use serde::{Serialize, Deserialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which named collection of urls.json an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Search,
    Property,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scope::Search => write!(f, "Search"),
            Scope::Property => write!(f, "Property"),
        }
    }
}

/// Whether a fact came off the listing or was filled in with an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    Found,
    Estimated(String),
}

/// Raw facts about one listing, as handed over by a `PropertySource`.
///
/// The numeric facts the returns math depends on are optional here so that a
/// source can report a partially scraped listing; the engines reject such
/// facts instead of guessing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyFacts {
    pub address: Option<String>,
    pub price: Option<f64>,
    pub year_built: Option<i32>,
    pub description: Option<String>,
    pub sqft: Option<f64>,
    pub lot_size: Option<f64>,
    pub parking: Option<String>,
    pub units: Option<u32>,
    pub rent_per_unit: Option<f64>,
    pub property_taxes_monthly: Option<f64>,
    /// Annual rate as a fraction (0.065 for 6.5%).
    pub interest_rate: Option<f64>,
    pub property_taxes_url: Option<String>,
    pub found: BTreeMap<String, FieldSource>,
}

impl PropertyFacts {
    /// Fields that were estimated rather than read off the listing.
    pub fn estimated_fields(&self) -> Vec<(&str, &str)> {
        self.found
            .iter()
            .filter_map(|(field, source)| match source {
                FieldSource::Estimated(value) => Some((field.as_str(), value.as_str())),
                FieldSource::Found => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub monthly_payment: f64,
    pub principal_payment: f64,
    pub interest_payment: f64,
    pub loan_balance: f64,
}

/// Rounded, display-ready snapshot of the facts and the derived monthly figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Price ($)")]
    pub price: f64,
    #[serde(rename = "Year Built")]
    pub year_built: Option<i32>,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "House Size (sqft)")]
    pub sqft: Option<f64>,
    #[serde(rename = "Price/sqft ($)")]
    pub price_per_sqft: Option<f64>,
    #[serde(rename = "Lot Size (sqft)")]
    pub lot_size: Option<f64>,
    #[serde(rename = "Parking")]
    pub parking: Option<String>,
    #[serde(rename = "Down Payment (Fraction)")]
    pub down_payment_fraction: f64,
    #[serde(rename = "Fix Up Cost ($)")]
    pub fix_up_cost: f64,
    #[serde(rename = "Loan ($)")]
    pub loan: i64,
    #[serde(rename = "Interest Rate (Fraction)")]
    pub interest_rate: f64,
    #[serde(rename = "Loan Length (Years)")]
    pub loan_years: u32,
    #[serde(rename = "Mortgage Payment [Monthly] ($)")]
    pub mortgage_payment_monthly: f64,
    #[serde(rename = "Property Taxes [Monthly] ($)")]
    pub property_taxes_monthly: f64,
    #[serde(rename = "Insurance [Monthly] ($)")]
    pub insurance_monthly: f64,
    #[serde(rename = "Units")]
    pub units: u32,
    #[serde(rename = "Rent Per Unit ($)")]
    pub rent_per_unit: f64,
    #[serde(rename = "Vacancy (Fraction)")]
    pub vacancy_fraction: f64,
}

/// Formatted return metrics as stored under "Analysis".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayMetrics {
    #[serde(rename = "Return On Investment")]
    pub return_on_investment: String,
    #[serde(rename = "Cash on Cash Return")]
    pub cash_on_cash_return: String,
    #[serde(rename = "Caprate")]
    pub cap_rate: String,
    #[serde(rename = "Cashflow per month")]
    pub cashflow_per_month: String,
    #[serde(rename = "Max Offer (Approximately)")]
    pub max_offer: String,
    #[serde(rename = "Emergency Fund (Recommended)")]
    pub emergency_fund: String,
}

/// One entry of analysis.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    #[serde(rename = "Property URL")]
    pub property_url: String,
    #[serde(rename = "Property Taxes URL")]
    pub property_taxes_url: Option<String>,
    #[serde(rename = "Property Info")]
    pub property_info: PropertyInfo,
    #[serde(rename = "Analysis")]
    pub analysis: DisplayMetrics,
    // Placeholder until estimated-field tracking is wired into the record.
    #[serde(rename = "Estimations")]
    pub estimations: BTreeMap<String, String>,
}

/// The urls.json document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlCollection {
    /// Search page URL -> property URLs discovered on it.
    #[serde(rename = "Search", default)]
    pub search: BTreeMap<String, Vec<String>>,
    /// Individually tracked property URLs; values are always empty.
    #[serde(rename = "Property", default)]
    pub property: BTreeMap<String, Vec<String>>,
}

impl UrlCollection {
    pub fn set(&self, scope: Scope) -> &BTreeMap<String, Vec<String>> {
        match scope {
            Scope::Search => &self.search,
            Scope::Property => &self.property,
        }
    }

    pub fn set_mut(&mut self, scope: Scope) -> &mut BTreeMap<String, Vec<String>> {
        match scope {
            Scope::Search => &mut self.search,
            Scope::Property => &mut self.property,
        }
    }
}
