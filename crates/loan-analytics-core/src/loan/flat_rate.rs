use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::LoanAnalyticsError;
use crate::types::Money;
use crate::LoanAnalyticsResult;

pub const MONTHS_PER_YEAR: u32 = 12;

/// Loan as quoted by a flat-rate lender.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    /// Amount borrowed.
    pub principal: Money,
    /// Tenure in whole years.
    pub tenure_years: u32,
    /// Flat nominal rate per annum as a percentage (7.5 = 7.5%).
    pub nominal_annual_rate_pct: Decimal,
}

impl LoanTerms {
    pub fn tenure_months(&self) -> u32 {
        self.tenure_years.saturating_mul(MONTHS_PER_YEAR)
    }

    pub fn validate(&self) -> LoanAnalyticsResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "principal".into(),
                reason: "Principal must be positive".into(),
            });
        }
        if self.tenure_years == 0 {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "tenure_years".into(),
                reason: "Tenure must be at least one year".into(),
            });
        }
        if self.tenure_years.checked_mul(MONTHS_PER_YEAR).is_none() {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "tenure_years".into(),
                reason: "Tenure in months does not fit in 32 bits".into(),
            });
        }
        if self.nominal_annual_rate_pct < Decimal::ZERO {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "nominal_annual_rate_pct".into(),
                reason: "Nominal rate cannot be negative".into(),
            });
        }
        Ok(())
    }
}

/// Closed-form flat-rate figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRateBreakdown {
    pub total_interest: Money,
    pub total_repayment: Money,
    pub monthly_installment: Money,
}

/// Simple interest on the full principal for the whole tenure, spread evenly
/// over every month.
pub fn flat_rate_installment(terms: &LoanTerms) -> LoanAnalyticsResult<FlatRateBreakdown> {
    let months = terms.tenure_months();
    if months == 0 {
        return Err(LoanAnalyticsError::DivisionByZero {
            context: "flat-rate installment (zero tenure)".into(),
        });
    }

    let total_interest = (terms.nominal_annual_rate_pct / dec!(100))
        .checked_mul(terms.principal)
        .and_then(|yearly| yearly.checked_mul(Decimal::from(terms.tenure_years)))
        .ok_or_else(|| out_of_range("total interest"))?;
    let total_repayment = terms
        .principal
        .checked_add(total_interest)
        .ok_or_else(|| out_of_range("total repayment"))?;
    let monthly_installment = total_repayment / Decimal::from(months);

    Ok(FlatRateBreakdown {
        total_interest,
        total_repayment,
        monthly_installment,
    })
}

fn out_of_range(what: &str) -> LoanAnalyticsError {
    LoanAnalyticsError::FinancialImpossibility(format!("{what} exceeds decimal range"))
}
