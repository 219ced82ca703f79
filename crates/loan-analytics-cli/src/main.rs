mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::loan::{EirArgs, LoanArgs};
use commands::market::{IndicatorsArgs, RelativePerformanceArgs};

/// Flat-rate loan analytics and price-series indicators
#[derive(Parser)]
#[command(
    name = "loancalc",
    version,
    about = "Flat-rate loan analytics and price-series indicators",
    long_about = "A CLI for flat-rate loan calculations with decimal precision. \
                  Computes instalments, totals and the effective interest rate (EIR), \
                  builds amortisation schedules, and runs moving-average, MACD, RSI \
                  and relative-performance analysis over closing prices."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log solver progress to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Flat-rate instalment, totals and effective interest rate
    LoanMetrics(LoanArgs),
    /// Effective interest rate for an arbitrary monthly instalment
    Eir(EirArgs),
    /// Month-by-month amortisation at the effective interest rate
    AmortizationSchedule(LoanArgs),
    /// Moving averages, MACD and RSI over closing prices
    Indicators(IndicatorsArgs),
    /// Benchmark vs comparison relative performance
    RelativePerformance(RelativePerformanceArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::LoanMetrics(args) => commands::loan::run_loan_metrics(args),
        Commands::Eir(args) => commands::loan::run_eir(args),
        Commands::AmortizationSchedule(args) => commands::loan::run_amortization_schedule(args),
        Commands::Indicators(args) => commands::market::run_indicators(args),
        Commands::RelativePerformance(args) => commands::market::run_relative_performance(args),
        Commands::Version => {
            println!("loancalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
