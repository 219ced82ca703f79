//! Month-by-month amortisation of a fixed instalment under compound interest.
//!
//! Interest accrues on the running balance at a periodic (monthly) rate and
//! the instalment is deducted afterwards. A negative balance is a legitimate
//! result: the instalment over-amortises the loan at that rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LoanAnalyticsError;
use crate::loan::flat_rate::MONTHS_PER_YEAR;
use crate::types::{Money, Rate};
use crate::LoanAnalyticsResult;

/// Balance left after the last simulated month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub ending_balance: Money,
}

/// One month of an amortisation schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based month number.
    pub month: u32,
    /// 1-based loan year the month falls in.
    pub year: u32,
    pub opening_balance: Money,
    pub interest: Money,
    pub installment: Money,
    /// Instalment less interest. Negative when interest exceeds the payment.
    pub principal_repaid: Money,
    pub closing_balance: Money,
}

/// Run the loan forward `total_months` periods and return the ending balance.
pub fn simulate_balance(
    periodic_rate: Rate,
    principal: Money,
    installment: Money,
    total_months: u32,
) -> LoanAnalyticsResult<AmortizationResult> {
    let mut balance = principal;

    for month in 1..=total_months {
        balance = step(balance, periodic_rate, installment)
            .map(|(_, closing)| closing)
            .ok_or_else(|| overflow(month))?;
    }

    Ok(AmortizationResult {
        ending_balance: balance,
    })
}

/// Same recurrence as [`simulate_balance`], keeping every month.
pub fn amortization_rows(
    periodic_rate: Rate,
    principal: Money,
    installment: Money,
    total_months: u32,
) -> LoanAnalyticsResult<Vec<ScheduleRow>> {
    let mut rows = Vec::with_capacity(total_months as usize);
    let mut balance = principal;

    for month in 1..=total_months {
        let (interest, closing) =
            step(balance, periodic_rate, installment).ok_or_else(|| overflow(month))?;

        rows.push(ScheduleRow {
            month,
            year: (month - 1) / MONTHS_PER_YEAR + 1,
            opening_balance: balance,
            interest,
            installment,
            principal_repaid: installment - interest,
            closing_balance: closing,
        });
        balance = closing;
    }

    Ok(rows)
}

/// Returns `(interest, closing_balance)`, or `None` on decimal overflow.
fn step(balance: Money, periodic_rate: Rate, installment: Money) -> Option<(Money, Money)> {
    let interest = balance.checked_mul(periodic_rate)?;
    let closing = balance.checked_add(interest)?.checked_sub(installment)?;
    Some((interest, closing))
}

fn overflow(month: u32) -> LoanAnalyticsError {
    LoanAnalyticsError::FinancialImpossibility(format!(
        "loan balance exceeds decimal range at month {month}"
    ))
}

/// Sum of a slice of schedule rows' interest.
pub fn total_interest(rows: &[ScheduleRow]) -> Money {
    rows.iter().map(|r| r.interest).sum::<Decimal>()
}
