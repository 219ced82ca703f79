use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::loan::eir::{solve_eir, SolverConfig, SolverOutcome};
use crate::loan::flat_rate::{flat_rate_installment, LoanTerms};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanAnalyticsResult;

/// Flat-rate loan plus optional solver overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanMetricsInput {
    #[serde(flatten)]
    pub terms: LoanTerms,
    #[serde(default)]
    pub solver: SolverConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EirStatus {
    Converged,
    NotConverged,
}

/// Flat-rate summary with the effective rate, when one was found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanMetricsOutput {
    pub principal: Money,
    pub tenure_years: u32,
    pub tenure_months: u32,
    pub nominal_annual_rate_pct: Decimal,
    pub monthly_installment: Money,
    pub total_repayment: Money,
    pub total_interest: Money,
    /// Flat interest attributed to each year.
    pub yearly_interest: Money,
    /// Flat interest attributed to each month.
    pub monthly_interest: Money,
    pub eir_status: EirStatus,
    pub eir_iterations: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_monthly_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_annual_rate: Option<Rate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_annual_rate_pct: Option<Decimal>,
}

/// Compute the flat-rate instalment, totals and EIR for a loan.
///
/// A search that does not converge is not an error here: the rate fields
/// are left empty, `eir_status` says so and a warning is attached.
pub fn calculate_loan_metrics(
    input: &LoanMetricsInput,
) -> LoanAnalyticsResult<ComputationOutput<LoanMetricsOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = &input.terms;
    terms.validate()?;
    input.solver.validate()?;

    if terms.nominal_annual_rate_pct > dec!(100) {
        warnings.push(format!(
            "Nominal rate of {}% p.a. is unusually high; the EIR search may not settle",
            terms.nominal_annual_rate_pct
        ));
    }

    let flat = flat_rate_installment(terms)?;
    let tenure_months = terms.tenure_months();
    let yearly_interest = flat.total_interest / Decimal::from(terms.tenure_years);
    let monthly_interest = flat.total_interest / Decimal::from(tenure_months);

    let outcome = solve_eir(
        terms.principal,
        flat.monthly_installment,
        terms.tenure_years,
        terms.nominal_annual_rate_pct,
        &input.solver,
    );
    let eir_iterations = outcome.iterations();

    let (eir_status, effective_monthly_rate, effective_annual_rate) = match outcome {
        SolverOutcome::Converged(rate) => (
            EirStatus::Converged,
            Some(rate.monthly_rate),
            Some(rate.annual_rate),
        ),
        SolverOutcome::NotConverged(nc) => {
            warnings.push(format!(
                "Could not compute EIR: no convergence after {} iterations (last residual {})",
                nc.iterations, nc.last_residual
            ));
            (EirStatus::NotConverged, None, None)
        }
    };

    let output = LoanMetricsOutput {
        principal: terms.principal,
        tenure_years: terms.tenure_years,
        tenure_months,
        nominal_annual_rate_pct: terms.nominal_annual_rate_pct,
        monthly_installment: flat.monthly_installment,
        total_repayment: flat.total_repayment,
        total_interest: flat.total_interest,
        yearly_interest,
        monthly_interest,
        eir_status,
        eir_iterations,
        effective_monthly_rate,
        effective_annual_rate,
        effective_annual_rate_pct: effective_annual_rate.map(|r| r * dec!(100)),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Flat-rate instalment with effective interest rate (monthly compounding)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
