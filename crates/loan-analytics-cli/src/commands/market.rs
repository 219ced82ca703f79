use clap::Args;
use serde_json::Value;

use loan_analytics_core::indicators::{self, IndicatorInput};
use loan_analytics_core::relative_performance::{self, RelativePerformanceInput};

use crate::input;

#[derive(Args)]
pub struct IndicatorsArgs {
    /// Path to JSON input file with closes and indicator specs
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct RelativePerformanceArgs {
    /// Path to JSON input file with benchmark and comparison closes
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_indicators(args: IndicatorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let ind_input: IndicatorInput = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for indicators")?;
    let result = indicators::calculate_indicators(&ind_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_relative_performance(
    args: RelativePerformanceArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let rp_input: RelativePerformanceInput = input::read_input(args.input.as_deref())?
        .ok_or("--input <file.json> or stdin required for relative performance")?;
    let result = relative_performance::analyze_relative_performance(&rp_input)?;
    Ok(serde_json::to_value(result)?)
}
