// src/services/amortization.rs
use log::debug;

use crate::error::{AnalysisError, Result};
use crate::models::AmortizationRow;

/// Level payment per period for a loan of `present_value` over `periods`.
/// Cash leaving the borrower is negative.
pub fn payment(rate: f64, periods: u32, present_value: f64) -> f64 {
    let n = periods as f64;
    if rate == 0.0 {
        return -present_value / n;
    }
    let growth = (1.0 + rate).powf(n);
    -(present_value * growth * rate) / (growth - 1.0)
}

/// Value of the loan after `periods` payments of `pmt`. While principal is
/// still owed this is negative.
pub fn future_value(rate: f64, periods: u32, pmt: f64, present_value: f64) -> f64 {
    let n = periods as f64;
    if rate == 0.0 {
        return -(present_value + pmt * n);
    }
    let growth = (1.0 + rate).powf(n);
    -(present_value * growth + pmt * (growth - 1.0) / rate)
}

/// Interest portion of the payment made in `period` (1-based).
pub fn interest_payment(rate: f64, period: u32, pmt: f64, present_value: f64) -> f64 {
    future_value(rate, period - 1, pmt, present_value) * rate
}

/// Month-by-month schedule for a fixed-rate loan.
///
/// The payment computed for period 1 is carried on every row; principal,
/// interest and balance are recomputed from the period index so rounding
/// never accumulates across the schedule.
pub fn compute(principal: f64, monthly_rate: f64, term_months: u32) -> Result<Vec<AmortizationRow>> {
    if term_months == 0 {
        return Err(AnalysisError::InvalidTerm(term_months));
    }
    if !monthly_rate.is_finite() {
        return Err(AnalysisError::InvalidRate(monthly_rate));
    }

    let monthly_payment = payment(monthly_rate, term_months, principal);
    debug!(
        "Amortizing {:.2} over {} months at {:.6}/month: payment {:.2}",
        principal, term_months, monthly_rate, monthly_payment
    );

    let rows = (1..=term_months)
        .map(|period| {
            let interest = interest_payment(monthly_rate, period, monthly_payment, principal);
            AmortizationRow {
                period,
                monthly_payment,
                principal_payment: monthly_payment - interest,
                interest_payment: interest,
                loan_balance: future_value(monthly_rate, period, monthly_payment, principal),
            }
        })
        .collect();

    Ok(rows)
}
