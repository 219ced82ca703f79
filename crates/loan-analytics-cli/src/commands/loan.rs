use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use loan_analytics_core::loan::eir::{self, EirInput, SolverConfig};
use loan_analytics_core::loan::flat_rate::LoanTerms;
use loan_analytics_core::loan::metrics::{self, LoanMetricsInput};
use loan_analytics_core::loan::schedule;

use crate::input;

/// Solver overrides shared by every loan command
#[derive(Args)]
pub struct SolverArgs {
    /// Largest ending balance accepted as fully repaid
    #[arg(long)]
    pub tolerance: Option<Decimal>,

    /// Iteration cap for the EIR search
    #[arg(long)]
    pub max_iterations: Option<u32>,
}

impl SolverArgs {
    fn to_config(&self) -> SolverConfig {
        let defaults = SolverConfig::default();
        SolverConfig {
            tolerance: self.tolerance.unwrap_or(defaults.tolerance),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
        }
    }
}

/// Arguments for a flat-rate loan
#[derive(Args)]
pub struct LoanArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long)]
    pub tenure_years: Option<u32>,

    /// Flat nominal rate per annum in percent (e.g. 7.5 for 7.5%)
    #[arg(long, alias = "interest-rate")]
    pub rate: Option<Decimal>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for solving the EIR of a given instalment
#[derive(Args)]
pub struct EirArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Fixed monthly instalment
    #[arg(long)]
    pub installment: Option<Decimal>,

    /// Tenure in whole years
    #[arg(long)]
    pub tenure_years: Option<u32>,

    /// Starting annual rate guess in percent
    #[arg(long)]
    pub initial_guess: Option<Decimal>,

    #[command(flatten)]
    pub solver: SolverArgs,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

fn loan_input(args: &LoanArgs) -> Result<LoanMetricsInput, Box<dyn std::error::Error>> {
    if let Some(parsed) = input::read_input(args.input.as_deref())? {
        return Ok(parsed);
    }
    Ok(LoanMetricsInput {
        terms: LoanTerms {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            tenure_years: args
                .tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            nominal_annual_rate_pct: args
                .rate
                .ok_or("--rate is required (or provide --input)")?,
        },
        solver: args.solver.to_config(),
    })
}

pub fn run_loan_metrics(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args)?;
    let result = metrics::calculate_loan_metrics(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_amortization_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = loan_input(&args)?;
    let result = schedule::build_amortization_schedule(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_eir(args: EirArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let eir_input: EirInput = match input::read_input(args.input.as_deref())? {
        Some(parsed) => parsed,
        None => EirInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            monthly_installment: args
                .installment
                .ok_or("--installment is required (or provide --input)")?,
            tenure_years: args
                .tenure_years
                .ok_or("--tenure-years is required (or provide --input)")?,
            initial_rate_guess_pct: args
                .initial_guess
                .ok_or("--initial-guess is required (or provide --input)")?,
            solver: args.solver.to_config(),
        },
    };
    let result = eir::solve_effective_rate(&eir_input)?;
    Ok(serde_json::to_value(result)?)
}
