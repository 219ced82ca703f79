use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::amortization::{amortization_rows, total_interest, ScheduleRow};
use crate::loan::eir::solve_eir;
use crate::loan::flat_rate::flat_rate_installment;
use crate::loan::metrics::LoanMetricsInput;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanAnalyticsResult;

/// Interest and principal split for one loan year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub interest: Money,
    pub principal_repaid: Money,
    pub closing_balance: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationScheduleOutput {
    pub monthly_installment: Money,
    pub effective_monthly_rate: Rate,
    pub effective_annual_rate: Rate,
    pub rows: Vec<ScheduleRow>,
    pub yearly: Vec<YearSummary>,
    /// Interest under compounding; equals the flat total interest up to the
    /// solver tolerance.
    pub total_interest: Money,
    pub total_paid: Money,
    pub residual_balance: Money,
}

/// Reducing-balance view of a flat-rate loan at its effective rate.
pub fn build_amortization_schedule(
    input: &LoanMetricsInput,
) -> LoanAnalyticsResult<ComputationOutput<AmortizationScheduleOutput>> {
    let start = Instant::now();
    let terms = &input.terms;
    terms.validate()?;
    input.solver.validate()?;

    let flat = flat_rate_installment(terms)?;
    let rate = solve_eir(
        terms.principal,
        flat.monthly_installment,
        terms.tenure_years,
        terms.nominal_annual_rate_pct,
        &input.solver,
    )
    .into_result()?;

    let rows = amortization_rows(
        rate.monthly_rate,
        terms.principal,
        flat.monthly_installment,
        terms.tenure_months(),
    )?;
    let yearly = summarise_years(&rows);
    let residual_balance = rows
        .last()
        .map(|r| r.closing_balance)
        .unwrap_or(terms.principal);

    let output = AmortizationScheduleOutput {
        monthly_installment: flat.monthly_installment,
        effective_monthly_rate: rate.monthly_rate,
        effective_annual_rate: rate.annual_rate,
        total_interest: total_interest(&rows),
        total_paid: flat.monthly_installment * Decimal::from(rows.len() as u64),
        residual_balance,
        rows,
        yearly,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Monthly amortisation schedule at the effective interest rate",
        input,
        Vec::new(),
        elapsed,
        output,
    ))
}

fn summarise_years(rows: &[ScheduleRow]) -> Vec<YearSummary> {
    let mut yearly: Vec<YearSummary> = Vec::new();

    for row in rows {
        match yearly.last_mut() {
            Some(summary) if summary.year == row.year => {
                summary.interest += row.interest;
                summary.principal_repaid += row.principal_repaid;
                summary.closing_balance = row.closing_balance;
            }
            _ => yearly.push(YearSummary {
                year: row.year,
                interest: row.interest,
                principal_repaid: row.principal_repaid,
                closing_balance: row.closing_balance,
            }),
        }
    }

    yearly
}
