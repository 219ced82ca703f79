//! Flat-rate instalment loans and their effective (compounding) interest rate.

pub mod amortization;
pub mod eir;
pub mod flat_rate;
pub mod metrics;
pub mod schedule;
