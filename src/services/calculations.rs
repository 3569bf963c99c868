// src/services/calculations.rs
use serde::Serialize;
use log::{debug, warn};

use crate::config::UserAssumptions;
use crate::error::{AnalysisError, Result};
use crate::models::{AmortizationRow, DisplayMetrics, PropertyFacts};
use crate::services::format::{format_money, format_percent, round2};

/// Yearly insurance as a fraction of the purchase price.
pub const INSURANCE_RATE: f64 = 0.00425;

const SHORT_DEPRECIATION_YEARS: f64 = 5.0;
const LONG_DEPRECIATION_YEARS: f64 = 27.5;

/// The numeric facts every stage needs, checked once up front.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RequiredFacts {
    pub price: f64,
    pub units: u32,
    pub rent_per_unit: f64,
    pub property_taxes_monthly: f64,
    pub interest_rate: f64,
}

impl RequiredFacts {
    pub fn property_taxes_annual(&self) -> f64 {
        self.property_taxes_monthly * 12.0
    }
}

/// Loan figures shared by the amortization table and the returns stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoanBasics {
    pub down_payment: f64,
    pub loan: f64,
    pub interest_rate_monthly: f64,
    pub months: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Profit {
    pub cashflow: f64,
    pub net_operating_income: f64,
    pub debt_service: f64,
    pub yearly_cost: f64,
}

/// Final metrics, each rounded to cents or hundredths of a percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnsMetrics {
    pub return_on_investment_percent: f64,
    pub cash_on_cash_percent: f64,
    pub cap_rate_percent: f64,
    pub cashflow_per_month: f64,
    pub max_offer: f64,
    pub emergency_fund: f64,
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Price is a divisor downstream, so it must also be positive.
pub fn required_facts(facts: &PropertyFacts) -> Result<RequiredFacts> {
    let price = finite(facts.price).filter(|p| *p > 0.0);
    let rent_per_unit = finite(facts.rent_per_unit);
    let property_taxes_monthly = finite(facts.property_taxes_monthly);
    let interest_rate = finite(facts.interest_rate);

    let mut missing = Vec::new();
    if price.is_none() {
        missing.push("price");
    }
    if facts.units.is_none() {
        missing.push("units");
    }
    if rent_per_unit.is_none() {
        missing.push("rent_per_unit");
    }
    if property_taxes_monthly.is_none() {
        missing.push("property_taxes_monthly");
    }
    if interest_rate.is_none() {
        missing.push("interest_rate");
    }

    match (price, facts.units, rent_per_unit, property_taxes_monthly, interest_rate) {
        (Some(price), Some(units), Some(rent_per_unit), Some(property_taxes_monthly), Some(interest_rate)) => {
            Ok(RequiredFacts { price, units, rent_per_unit, property_taxes_monthly, interest_rate })
        }
        _ => {
            warn!("Property facts incomplete: {:?}", missing);
            Err(AnalysisError::IncompletePropertyFacts { fields: missing })
        }
    }
}

pub fn loan_basics(facts: &RequiredFacts, assumptions: &UserAssumptions) -> LoanBasics {
    let down_payment = facts.price * assumptions.down_payment_fraction;
    LoanBasics {
        down_payment,
        loan: facts.price - down_payment,
        interest_rate_monthly: facts.interest_rate / 12.0,
        months: assumptions.loan_years * 12,
    }
}

/// Cash needed to close: down payment, fix-up budget and closing costs.
pub fn purchase_cost(basics: &LoanBasics, assumptions: &UserAssumptions) -> f64 {
    basics.down_payment + assumptions.fix_up_cost + basics.loan * assumptions.closing_cost_fraction
}

pub fn effective_gross_income(facts: &RequiredFacts, assumptions: &UserAssumptions) -> f64 {
    let gross_potential_income = facts.rent_per_unit * facts.units as f64 * 12.0;
    gross_potential_income * (1.0 - assumptions.vacancy_fraction)
}

/// Yearly insurance, as an outflow.
pub fn insurance_cost(price: f64) -> f64 {
    -(price * INSURANCE_RATE)
}

/// Yearly operating expenses, as an outflow.
pub fn expenses(facts: &RequiredFacts, assumptions: &UserAssumptions) -> f64 {
    let income = effective_gross_income(facts, assumptions);
    -(assumptions.maintenance_fraction + assumptions.management_fraction) * income
        - facts.property_taxes_annual()
        + insurance_cost(facts.price)
}

pub fn profit(facts: &RequiredFacts, assumptions: &UserAssumptions, monthly_payment: f64) -> Profit {
    let total_expenses = expenses(facts, assumptions);
    let net_operating_income = effective_gross_income(facts, assumptions) + total_expenses;
    let debt_service = monthly_payment * 12.0;
    Profit {
        cashflow: net_operating_income + debt_service,
        net_operating_income,
        debt_service,
        yearly_cost: total_expenses + debt_service,
    }
}

/// Tax saved in year one by depreciating the building and its short-lived parts.
pub fn depreciation_shield(facts: &RequiredFacts, assumptions: &UserAssumptions) -> f64 {
    let basis = facts.price + assumptions.fix_up_cost;
    let short_yearly = basis * assumptions.depreciation_short_fraction / SHORT_DEPRECIATION_YEARS;
    let long_yearly = basis * assumptions.depreciation_long_fraction / LONG_DEPRECIATION_YEARS;
    (short_yearly + long_yearly) * assumptions.tax_bracket
}

pub fn principal_paydown_year_one(rows: &[AmortizationRow]) -> f64 {
    -rows.iter().take(12).map(|r| r.principal_payment).sum::<f64>()
}

pub fn max_offer(facts: &RequiredFacts, assumptions: &UserAssumptions) -> f64 {
    let income = effective_gross_income(facts, assumptions);
    ((income * 0.75 - facts.property_taxes_annual() - 600.0) * (0.37 / 0.12))
        / (assumptions.closing_cost_fraction + assumptions.down_payment_fraction)
        - assumptions.fix_up_cost
}

fn usable_divisor(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() && value != 0.0 {
        Ok(value)
    } else {
        Err(AnalysisError::InvalidAssumptions(format!("{} is {}", what, value)))
    }
}

pub fn returns_metrics(
    facts: &RequiredFacts,
    assumptions: &UserAssumptions,
    basics: &LoanBasics,
    rows: &[AmortizationRow],
) -> Result<ReturnsMetrics> {
    let monthly_payment = rows.first().map(|r| r.monthly_payment).unwrap_or(0.0);
    let capital_required = usable_divisor(purchase_cost(basics, assumptions), "purchase cost")?;
    usable_divisor(
        assumptions.closing_cost_fraction + assumptions.down_payment_fraction,
        "down payment plus closing cost fraction",
    )?;
    let profit = profit(facts, assumptions, monthly_payment);
    let total_return = profit.cashflow
        + depreciation_shield(facts, assumptions)
        + principal_paydown_year_one(rows);

    let emergency_fund = if assumptions.first_rental {
        -profit.yearly_cost / 2.0
    } else {
        -profit.yearly_cost / 4.0
    };

    debug!(
        "capital required {:.2}, cashflow {:.2}, total return {:.2}",
        capital_required, profit.cashflow, total_return
    );

    let metrics = ReturnsMetrics {
        return_on_investment_percent: round2(total_return / capital_required * 100.0),
        cash_on_cash_percent: round2(profit.cashflow / capital_required * 100.0),
        cap_rate_percent: round2(profit.net_operating_income / facts.price * 100.0),
        cashflow_per_month: round2(profit.cashflow / 12.0),
        max_offer: round2(max_offer(facts, assumptions)),
        emergency_fund: round2(emergency_fund),
    };
    let all = [
        metrics.return_on_investment_percent,
        metrics.cash_on_cash_percent,
        metrics.cap_rate_percent,
        metrics.cashflow_per_month,
        metrics.max_offer,
        metrics.emergency_fund,
    ];
    if all.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::InvalidAssumptions(format!("non-finite metrics {:?}", metrics)));
    }
    Ok(metrics)
}

pub fn compute_display_metrics(metrics: &ReturnsMetrics) -> DisplayMetrics {
    DisplayMetrics {
        return_on_investment: format_percent(metrics.return_on_investment_percent),
        cash_on_cash_return: format_percent(metrics.cash_on_cash_percent),
        cap_rate: format_percent(metrics.cap_rate_percent),
        cashflow_per_month: format_money(metrics.cashflow_per_month),
        max_offer: format_money(metrics.max_offer),
        emergency_fund: format_money(metrics.emergency_fund),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::amortization;

    fn duplex() -> PropertyFacts {
        PropertyFacts {
            price: Some(300_000.0),
            units: Some(2),
            rent_per_unit: Some(1_500.0),
            property_taxes_monthly: Some(250.0),
            interest_rate: Some(0.065),
            ..Default::default()
        }
    }

    fn assumptions() -> UserAssumptions {
        UserAssumptions {
            down_payment_fraction: 0.25,
            fix_up_cost: 10_000.0,
            closing_cost_fraction: 0.03,
            loan_years: 30,
            vacancy_fraction: 0.1,
            maintenance_fraction: 0.1,
            management_fraction: 0.1,
            tax_bracket: 0.22,
            depreciation_short_fraction: 0.2,
            depreciation_long_fraction: 0.6,
            first_rental: true,
        }
    }

    #[test]
    fn stage_values() {
        let facts = required_facts(&duplex()).unwrap();
        let a = assumptions();
        let basics = loan_basics(&facts, &a);
        assert_eq!(basics.down_payment, 75_000.0);
        assert_eq!(basics.loan, 225_000.0);
        assert_eq!(basics.months, 360);

        // 75k down + 10k fix-up + 3% of 225k
        assert!((purchase_cost(&basics, &a) - 91_750.0).abs() < 1e-9);
        // 1500 * 2 * 12 * 0.9
        assert!((effective_gross_income(&facts, &a) - 32_400.0).abs() < 1e-9);
        assert!((insurance_cost(300_000.0) + 1_275.0).abs() < 1e-9);
        // -(0.2 * 32400) - 3000 - 1275
        assert!((expenses(&facts, &a) + 10_755.0).abs() < 1e-9);
    }

    #[test]
    fn depreciation_uses_five_and_twenty_seven_and_a_half_years() {
        let facts = required_facts(&duplex()).unwrap();
        let a = assumptions();
        let expected = (310_000.0 * 0.2 / 5.0 + 310_000.0 * 0.6 / 27.5) * 0.22;
        assert!((depreciation_shield(&facts, &a) - expected).abs() < 1e-9);
    }

    #[test]
    fn max_offer_formula() {
        let facts = required_facts(&duplex()).unwrap();
        let a = assumptions();
        let expected = ((32_400.0 * 0.75 - 3_000.0 - 600.0) * (0.37 / 0.12)) / 0.28 - 10_000.0;
        assert!((max_offer(&facts, &a) - expected).abs() < 1e-6);
    }

    #[test]
    fn emergency_fund_depends_on_first_rental() {
        let facts = required_facts(&duplex()).unwrap();
        let mut a = assumptions();
        let basics = loan_basics(&facts, &a);
        let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months).unwrap();

        let first = returns_metrics(&facts, &a, &basics, &rows).unwrap();
        a.first_rental = false;
        let seasoned = returns_metrics(&facts, &a, &basics, &rows).unwrap();

        assert!(first.emergency_fund > 0.0);
        assert!((first.emergency_fund - 2.0 * seasoned.emergency_fund).abs() < 0.02);
    }

    #[test]
    fn metrics_are_consistent_with_stages() {
        let facts = required_facts(&duplex()).unwrap();
        let a = assumptions();
        let basics = loan_basics(&facts, &a);
        let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months).unwrap();
        let metrics = returns_metrics(&facts, &a, &basics, &rows).unwrap();

        let p = profit(&facts, &a, rows[0].monthly_payment);
        assert_eq!(metrics.cashflow_per_month, round2(p.cashflow / 12.0));
        assert_eq!(metrics.cap_rate_percent, round2(p.net_operating_income / 300_000.0 * 100.0));
        assert!(principal_paydown_year_one(&rows) > 0.0);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let facts = required_facts(&duplex()).unwrap();
        let a = assumptions();
        let run = || {
            let basics = loan_basics(&facts, &a);
            let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months).unwrap();
            returns_metrics(&facts, &a, &basics, &rows).unwrap()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn missing_and_non_numeric_facts_are_reported() {
        let mut facts = duplex();
        facts.price = None;
        facts.rent_per_unit = Some(f64::NAN);
        match required_facts(&facts) {
            Err(AnalysisError::IncompletePropertyFacts { fields }) => {
                assert_eq!(fields, vec!["price", "rent_per_unit"]);
            }
            other => panic!("expected incomplete facts, got {:?}", other),
        }
    }

    #[test]
    fn display_metrics_use_sign_and_unit_conventions() {
        let display = compute_display_metrics(&ReturnsMetrics {
            return_on_investment_percent: 14.2,
            cash_on_cash_percent: -1.5,
            cap_rate_percent: 6.0,
            cashflow_per_month: -42.5,
            max_offer: 251_234.567,
            emergency_fund: 7_100.0,
        });
        assert_eq!(display.return_on_investment, "14.2%");
        assert_eq!(display.cash_on_cash_return, "-1.5%");
        assert_eq!(display.cap_rate, "6.0%");
        assert_eq!(display.cashflow_per_month, "$-42.50");
        assert_eq!(display.max_offer, "$251,234.57");
        assert_eq!(display.emergency_fund, "$7,100.00");
    }

    #[test]
    fn non_positive_price_is_incomplete() {
        for price in [0.0, -5.0] {
            let facts = PropertyFacts { price: Some(price), ..duplex() };
            match required_facts(&facts) {
                Err(AnalysisError::IncompletePropertyFacts { fields }) => assert_eq!(fields, vec!["price"]),
                other => panic!("expected incomplete facts, got {:?}", other),
            }
        }
    }

    #[test]
    fn nothing_down_and_no_closing_cost_is_rejected() {
        let facts = required_facts(&duplex()).unwrap();
        let a = UserAssumptions {
            down_payment_fraction: 0.0,
            closing_cost_fraction: 0.0,
            fix_up_cost: 0.0,
            ..assumptions()
        };
        let basics = loan_basics(&facts, &a);
        let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months).unwrap();

        let err = returns_metrics(&facts, &a, &basics, &rows).unwrap_err();
        assert_eq!(err.kind(), "InvalidAssumptionsError");
    }

    #[test]
    fn cash_to_close_without_down_payment_still_divides() {
        let facts = required_facts(&duplex()).unwrap();
        let a = UserAssumptions { down_payment_fraction: 0.0, ..assumptions() };
        let basics = loan_basics(&facts, &a);
        let rows = amortization::compute(basics.loan, basics.interest_rate_monthly, basics.months).unwrap();

        let metrics = returns_metrics(&facts, &a, &basics, &rows).unwrap();
        assert!(metrics.return_on_investment_percent.is_finite());
        assert!(metrics.max_offer.is_finite());
    }
}
