//! Relative performance of a comparison index against a benchmark
//! (e.g. an equal-weight index against its cap-weighted parent).
//!
//! Both close series are inner-joined on date, then compared through
//! normalised prices, the daily return spread and its sigma bands, the
//! compounded spread, rolling annualised volatility and drawdowns.

pub mod series;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::LoanAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Price, PricePoint, Rate};
use crate::LoanAnalyticsResult;

/// Trading days used to annualise daily volatility.
const TRADING_DAYS_PER_YEAR: u32 = 252;

fn default_volatility_window() -> usize {
    TRADING_DAYS_PER_YEAR as usize
}

fn default_outlier_sigma() -> Decimal {
    dec!(3)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativePerformanceInput {
    pub benchmark: Vec<PricePoint>,
    pub comparison: Vec<PricePoint>,
    /// Rolling window, in observations, for volatility.
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    /// Width of the spread outlier band in standard deviations.
    #[serde(default = "default_outlier_sigma")]
    pub outlier_sigma: Decimal,
}

/// One aligned trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelativeObservation {
    pub date: NaiveDate,
    pub benchmark_close: Price,
    pub comparison_close: Price,
    pub benchmark_normalized: Decimal,
    pub comparison_normalized: Decimal,
    pub benchmark_return: Option<Rate>,
    pub comparison_return: Option<Rate>,
    /// Comparison return minus benchmark return.
    pub return_spread: Option<Rate>,
    /// Compounded spread since the first date.
    pub cumulative_spread: Option<Rate>,
    pub benchmark_volatility: Option<Rate>,
    pub comparison_volatility: Option<Rate>,
    pub benchmark_drawdown: Rate,
    pub comparison_drawdown: Rate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSummary {
    pub mean: Rate,
    pub std_dev: Rate,
    pub upper_bound: Rate,
    pub lower_bound: Rate,
    /// Dates whose spread falls outside the bounds.
    pub outlier_dates: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelativePerformanceOutput {
    pub observations: Vec<RelativeObservation>,
    pub spread: SpreadSummary,
    pub benchmark_total_return: Rate,
    pub comparison_total_return: Rate,
    pub final_cumulative_spread: Rate,
    pub benchmark_max_drawdown: Rate,
    pub comparison_max_drawdown: Rate,
}

pub fn analyze_relative_performance(
    input: &RelativePerformanceInput,
) -> LoanAnalyticsResult<ComputationOutput<RelativePerformanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_input(input)?;

    let aligned = align_on_date(&input.benchmark, &input.comparison)?;
    for (name, points) in [
        ("benchmark", &input.benchmark),
        ("comparison", &input.comparison),
    ] {
        let dropped = points.len() - aligned.len();
        if dropped > 0 {
            warnings.push(format!(
                "{dropped} {name} dates without a matching close were dropped"
            ));
        }
    }
    if aligned.len() < 3 {
        return Err(LoanAnalyticsError::InsufficientData(
            "At least 3 common dates are required".into(),
        ));
    }

    let dates: Vec<NaiveDate> = aligned.iter().map(|(d, _, _)| *d).collect();
    let bench: Vec<Price> = aligned.iter().map(|(_, b, _)| *b).collect();
    let comp: Vec<Price> = aligned.iter().map(|(_, _, c)| *c).collect();

    let bench_norm = series::normalize(&bench)?;
    let comp_norm = series::normalize(&comp)?;
    let bench_ret = series::pct_change(&bench)?;
    let comp_ret = series::pct_change(&comp)?;
    let spread: Vec<Option<Rate>> = bench_ret
        .iter()
        .zip(&comp_ret)
        .map(|(b, c)| match (b, c) {
            (Some(b), Some(c)) => c
                .checked_sub(*b)
                .map(Some)
                .ok_or_else(|| series::out_of_range("return spread")),
            _ => Ok(None),
        })
        .collect::<LoanAnalyticsResult<_>>()?;

    let mut growth = Decimal::ONE;
    let mut final_cumulative_spread = Decimal::ZERO;
    let mut cumulative: Vec<Option<Rate>> = Vec::with_capacity(spread.len());
    for s in &spread {
        let Some(s) = s else {
            cumulative.push(None);
            continue;
        };
        growth = Decimal::ONE
            .checked_add(*s)
            .and_then(|factor| growth.checked_mul(factor))
            .ok_or_else(|| series::out_of_range("cumulative spread"))?;
        final_cumulative_spread = growth
            .checked_sub(Decimal::ONE)
            .ok_or_else(|| series::out_of_range("cumulative spread"))?;
        cumulative.push(Some(final_cumulative_spread));
    }

    if input.volatility_window >= aligned.len() {
        warnings.push(format!(
            "Volatility window of {} exceeds the {} return observations; volatility is empty",
            input.volatility_window,
            aligned.len() - 1
        ));
    }
    let annualiser = Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .ok_or_else(|| LoanAnalyticsError::FinancialImpossibility("sqrt(252)".into()))?;
    let annualise = |v: Vec<Option<Decimal>>| -> LoanAnalyticsResult<Vec<Option<Decimal>>> {
        v.into_iter()
            .map(|s| {
                s.map(|s| {
                    s.checked_mul(annualiser)
                        .ok_or_else(|| series::out_of_range("annualised volatility"))
                })
                .transpose()
            })
            .collect()
    };
    let bench_vol = annualise(series::rolling_std(&bench_ret, input.volatility_window)?)?;
    let comp_vol = annualise(series::rolling_std(&comp_ret, input.volatility_window)?)?;

    let bench_dd = series::drawdown(&bench);
    let comp_dd = series::drawdown(&comp);

    let spread_values: Vec<Decimal> = spread.iter().flatten().copied().collect();
    let (mean, std_dev) = series::mean_and_std(&spread_values)?.ok_or_else(|| {
        LoanAnalyticsError::InsufficientData("At least 2 return spreads are required".into())
    })?;
    let (upper_bound, lower_bound) = input
        .outlier_sigma
        .checked_mul(std_dev)
        .and_then(|width| Some((mean.checked_add(width)?, mean.checked_sub(width)?)))
        .ok_or_else(|| series::out_of_range("spread outlier band"))?;
    let outlier_dates = dates
        .iter()
        .zip(&spread)
        .filter_map(|(d, s)| match s {
            Some(s) if *s > upper_bound || *s < lower_bound => Some(*d),
            _ => None,
        })
        .collect();

    let observations: Vec<RelativeObservation> = (0..aligned.len())
        .map(|i| RelativeObservation {
            date: dates[i],
            benchmark_close: bench[i],
            comparison_close: comp[i],
            benchmark_normalized: bench_norm[i],
            comparison_normalized: comp_norm[i],
            benchmark_return: bench_ret[i],
            comparison_return: comp_ret[i],
            return_spread: spread[i],
            cumulative_spread: cumulative[i],
            benchmark_volatility: bench_vol[i],
            comparison_volatility: comp_vol[i],
            benchmark_drawdown: bench_dd[i],
            comparison_drawdown: comp_dd[i],
        })
        .collect();

    let last = aligned.len() - 1;
    let output = RelativePerformanceOutput {
        spread: SpreadSummary {
            mean,
            std_dev,
            upper_bound,
            lower_bound,
            outlier_dates,
        },
        benchmark_total_return: bench_norm[last] - Decimal::ONE,
        comparison_total_return: comp_norm[last] - Decimal::ONE,
        final_cumulative_spread,
        benchmark_max_drawdown: bench_dd.iter().copied().min().unwrap_or(Decimal::ZERO),
        comparison_max_drawdown: comp_dd.iter().copied().min().unwrap_or(Decimal::ZERO),
        observations,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Date-aligned relative performance: return spread, sigma bands, rolling volatility, drawdown",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_input(input: &RelativePerformanceInput) -> LoanAnalyticsResult<()> {
    for (field, points) in [
        ("benchmark", &input.benchmark),
        ("comparison", &input.comparison),
    ] {
        if let Some(p) = points.iter().find(|p| p.close <= Decimal::ZERO) {
            return Err(LoanAnalyticsError::InvalidInput {
                field: field.into(),
                reason: format!("Close on {} must be positive", p.date),
            });
        }
    }
    if input.volatility_window < 2 {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "volatility_window".into(),
            reason: "Volatility window must span at least 2 returns".into(),
        });
    }
    if input.outlier_sigma <= Decimal::ZERO {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "outlier_sigma".into(),
            reason: "Outlier band must be positive".into(),
        });
    }
    Ok(())
}

/// Inner join on date, ascending. Duplicate dates within a series are rejected.
fn align_on_date(
    benchmark: &[PricePoint],
    comparison: &[PricePoint],
) -> LoanAnalyticsResult<Vec<(NaiveDate, Price, Price)>> {
    let index = |field: &str, points: &[PricePoint]| {
        let mut map = BTreeMap::new();
        for p in points {
            if map.insert(p.date, p.close).is_some() {
                return Err(LoanAnalyticsError::InvalidInput {
                    field: field.into(),
                    reason: format!("Duplicate date {}", p.date),
                });
            }
        }
        Ok(map)
    };

    let bench = index("benchmark", benchmark)?;
    let comp = index("comparison", comparison)?;

    Ok(bench
        .into_iter()
        .filter_map(|(date, b)| comp.get(&date).map(|&c| (date, b, c)))
        .collect())
}
