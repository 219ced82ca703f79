//! Effective interest rate (EIR) of a flat-rate instalment loan.
//!
//! The search is a damped fixed-point iteration over an annual rate guess.
//! Each step simulates the full tenure at `guess / 12` per month and nudges
//! the guess by at most one percentage point, scaled by how far the residual
//! balance is from zero relative to the principal. It needs neither a
//! bracketing interval nor a derivative, and it can fail to settle for
//! extreme inputs; that case is returned as [`SolverOutcome::NotConverged`].

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, trace, warn};

use crate::error::LoanAnalyticsError;
use crate::loan::amortization::simulate_balance;
use crate::loan::flat_rate::MONTHS_PER_YEAR;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LoanAnalyticsResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const DEFAULT_TOLERANCE: Decimal = dec!(0.000001);
const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// Largest single adjustment to the annual rate guess.
const MAX_STEP: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Stopping rules for the EIR search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Largest absolute ending balance accepted as zero.
    pub tolerance: Decimal,
    /// Hard cap on simulated tenures.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> LoanAnalyticsResult<()> {
        if self.tolerance <= Decimal::ZERO {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "solver.tolerance".into(),
                reason: "Tolerance must be positive".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(LoanAnalyticsError::InvalidInput {
                field: "solver.max_iterations".into(),
                reason: "At least one iteration is required".into(),
            });
        }
        Ok(())
    }
}

/// A rate that reproduces the instalment schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveRate {
    /// Nominal annual rate compounded monthly (0.09 = 9%).
    pub annual_rate: Rate,
    /// `annual_rate / 12`, the rate actually simulated.
    pub monthly_rate: Rate,
    pub iterations: u32,
    /// Ending balance at `monthly_rate`, within tolerance of zero.
    pub residual_balance: Money,
}

/// State of the search when the iteration budget ran out or the simulated
/// balance left the decimal range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonConvergence {
    pub iterations: u32,
    /// Annual rate guess the search would have tried next.
    pub last_guess: Rate,
    /// Ending balance of the last completed simulation.
    pub last_residual: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SolverOutcome {
    Converged(EffectiveRate),
    NotConverged(NonConvergence),
}

impl SolverOutcome {
    pub fn is_converged(&self) -> bool {
        matches!(self, SolverOutcome::Converged(_))
    }

    pub fn effective_rate(&self) -> Option<&EffectiveRate> {
        match self {
            SolverOutcome::Converged(rate) => Some(rate),
            SolverOutcome::NotConverged(_) => None,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            SolverOutcome::Converged(rate) => rate.iterations,
            SolverOutcome::NotConverged(nc) => nc.iterations,
        }
    }

    /// Treat non-convergence as an error.
    pub fn into_result(self) -> LoanAnalyticsResult<EffectiveRate> {
        match self {
            SolverOutcome::Converged(rate) => Ok(rate),
            SolverOutcome::NotConverged(nc) => Err(LoanAnalyticsError::ConvergenceFailure {
                function: "EIR".into(),
                iterations: nc.iterations,
                last_delta: nc.last_residual,
            }),
        }
    }
}

/// Input for solving the EIR of an arbitrary fixed instalment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EirInput {
    pub principal: Money,
    pub monthly_installment: Money,
    pub tenure_years: u32,
    /// Starting annual guess as a percentage (usually the flat rate).
    pub initial_rate_guess_pct: Decimal,
    #[serde(default)]
    pub solver: SolverConfig,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Find the annual rate, compounded monthly, at which `monthly_installment`
/// repays `principal` in exactly `tenure_years`.
///
/// Inputs are assumed valid (positive principal, instalment and tenure).
/// A negative residual balance raises the guess and a positive one lowers it.
pub fn solve_eir(
    principal: Money,
    monthly_installment: Money,
    tenure_years: u32,
    initial_rate_guess_pct: Decimal,
    config: &SolverConfig,
) -> SolverOutcome {
    let total_months = tenure_years.saturating_mul(MONTHS_PER_YEAR);
    let months_per_year = Decimal::from(MONTHS_PER_YEAR);

    let mut guess = initial_rate_guess_pct / dec!(100);
    let mut last_residual = principal;

    for iteration in 1..=config.max_iterations {
        let monthly_rate = guess / months_per_year;
        let balance =
            match simulate_balance(monthly_rate, principal, monthly_installment, total_months) {
                Ok(result) => result.ending_balance,
                Err(e) => {
                    warn!(iteration, guess = %guess, error = %e, "EIR search diverged");
                    return SolverOutcome::NotConverged(NonConvergence {
                        iterations: iteration,
                        last_guess: guess,
                        last_residual,
                    });
                }
            };
        trace!(iteration, guess = %guess, balance = %balance, "EIR iteration");

        if balance.abs() <= config.tolerance {
            debug!(iterations = iteration, annual_rate = %guess, residual = %balance, "EIR converged");
            return SolverOutcome::Converged(EffectiveRate {
                annual_rate: guess,
                monthly_rate,
                iterations: iteration,
                residual_balance: balance,
            });
        }

        let increment_factor = balance
            .abs()
            .checked_div(principal)
            .map_or(Decimal::ONE, |f| f.min(Decimal::ONE));
        let increment = MAX_STEP * increment_factor;

        if balance < Decimal::ZERO {
            guess += increment;
        } else {
            guess -= increment;
        }
        last_residual = balance;
    }

    warn!(
        iterations = config.max_iterations,
        last_guess = %guess,
        last_residual = %last_residual,
        "EIR search did not converge"
    );
    SolverOutcome::NotConverged(NonConvergence {
        iterations: config.max_iterations,
        last_guess: guess,
        last_residual,
    })
}

/// Validated entry point: solve the EIR for a given instalment and fail with
/// [`LoanAnalyticsError::ConvergenceFailure`] if the search does not settle.
pub fn solve_effective_rate(input: &EirInput) -> LoanAnalyticsResult<ComputationOutput<EffectiveRate>> {
    let start = Instant::now();
    validate_eir_input(input)?;

    let rate = solve_eir(
        input.principal,
        input.monthly_installment,
        input.tenure_years,
        input.initial_rate_guess_pct,
        &input.solver,
    )
    .into_result()?;

    let mut warnings = Vec::new();
    if rate.annual_rate < Decimal::ZERO {
        warnings.push(
            "Effective rate is negative: the instalments repay less than the principal".into(),
        );
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Damped fixed-point search on monthly-compounded amortisation",
        input,
        warnings,
        elapsed,
        rate,
    ))
}

fn validate_eir_input(input: &EirInput) -> LoanAnalyticsResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.monthly_installment <= Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "monthly_installment".into(),
            reason: "Monthly installment must be positive".into(),
        });
    }
    if input.tenure_years == 0 {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "tenure_years".into(),
            reason: "Tenure must be at least one year".into(),
        });
    }
    input.solver.validate()
}
