use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use loan_analytics_core::LoanAnalyticsResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// JSON in, JSON out around one core computation.
fn run_json<I, O>(
    input_json: &str,
    compute: impl FnOnce(&I) -> LoanAnalyticsResult<O>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = compute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[napi]
pub fn loan_metrics(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        loan_analytics_core::loan::metrics::calculate_loan_metrics,
    )
}

#[napi]
pub fn solve_effective_rate(input_json: String) -> NapiResult<String> {
    run_json(&input_json, loan_analytics_core::loan::eir::solve_effective_rate)
}

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        loan_analytics_core::loan::schedule::build_amortization_schedule,
    )
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[napi]
pub fn technical_indicators(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        loan_analytics_core::indicators::calculate_indicators,
    )
}

#[napi]
pub fn relative_performance(input_json: String) -> NapiResult<String> {
    run_json(
        &input_json,
        loan_analytics_core::relative_performance::analyze_relative_performance,
    )
}
