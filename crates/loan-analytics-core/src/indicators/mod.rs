//! Price-series technical indicators: simple moving averages, MACD and RSI.
//!
//! Each indicator is a pure function over a slice of closes. Output series
//! are aligned index-for-index with the input; positions without enough
//! history hold `None`.

pub mod macd;
pub mod moving_average;
pub mod rsi;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LoanAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Price};
use crate::LoanAnalyticsResult;

use self::macd::MacdSeries;

fn default_ma_periods() -> Vec<usize> {
    vec![20, 50, 200]
}

fn default_fast() -> usize {
    12
}

fn default_slow() -> usize {
    26
}

fn default_signal() -> usize {
    9
}

fn default_rsi_period() -> usize {
    14
}

/// Which indicator to compute, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSpec {
    MovingAverage {
        #[serde(default = "default_ma_periods")]
        periods: Vec<usize>,
    },
    Macd {
        #[serde(default = "default_fast")]
        fast: usize,
        #[serde(default = "default_slow")]
        slow: usize,
        #[serde(default = "default_signal")]
        signal: usize,
    },
    Rsi {
        #[serde(default = "default_rsi_period")]
        period: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorInput {
    /// Closing prices, oldest first.
    pub closes: Vec<Price>,
    pub indicators: Vec<IndicatorSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageSeries {
    pub period: usize,
    pub values: Vec<Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IndicatorSeries {
    MovingAverage { series: Vec<MovingAverageSeries> },
    Macd {
        fast: usize,
        slow: usize,
        signal_period: usize,
        values: MacdSeries,
    },
    Rsi {
        period: usize,
        values: Vec<Option<Decimal>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorOutput {
    pub observations: usize,
    pub indicators: Vec<IndicatorSeries>,
}

/// Compute every requested indicator over the same close series.
pub fn calculate_indicators(
    input: &IndicatorInput,
) -> LoanAnalyticsResult<ComputationOutput<IndicatorOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.closes.is_empty() {
        return Err(LoanAnalyticsError::InsufficientData(
            "At least one closing price is required".into(),
        ));
    }
    if input.indicators.is_empty() {
        return Err(LoanAnalyticsError::InvalidInput {
            field: "indicators".into(),
            reason: "Request at least one indicator".into(),
        });
    }

    let n = input.closes.len();
    let mut indicators = Vec::with_capacity(input.indicators.len());

    for spec in &input.indicators {
        validate_spec(spec)?;
        let series = match spec {
            IndicatorSpec::MovingAverage { periods } => {
                for &p in periods.iter().filter(|&&p| p > n) {
                    warnings.push(format!(
                        "{p}-period moving average needs more than the {n} closes supplied"
                    ));
                }
                IndicatorSeries::MovingAverage {
                    series: periods
                        .iter()
                        .map(|&period| MovingAverageSeries {
                            period,
                            values: moving_average::simple_moving_average(&input.closes, period),
                        })
                        .collect(),
                }
            }
            IndicatorSpec::Macd { fast, slow, signal } => IndicatorSeries::Macd {
                fast: *fast,
                slow: *slow,
                signal_period: *signal,
                values: macd::macd(&input.closes, *fast, *slow, *signal),
            },
            IndicatorSpec::Rsi { period } => {
                if *period >= n {
                    warnings.push(format!(
                        "RSI({period}) needs more than the {n} closes supplied"
                    ));
                }
                IndicatorSeries::Rsi {
                    period: *period,
                    values: rsi::rsi(&input.closes, *period),
                }
            }
        };
        indicators.push(series);
    }

    let output = IndicatorOutput {
        observations: n,
        indicators,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rolling-mean moving averages, unadjusted EMA MACD, rolling-mean RSI",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_spec(spec: &IndicatorSpec) -> LoanAnalyticsResult<()> {
    let positive = |field: &str, value: usize| {
        if value == 0 {
            Err(LoanAnalyticsError::InvalidInput {
                field: field.into(),
                reason: "Period must be greater than zero".into(),
            })
        } else {
            Ok(())
        }
    };

    match spec {
        IndicatorSpec::MovingAverage { periods } => {
            if periods.is_empty() {
                return Err(LoanAnalyticsError::InvalidInput {
                    field: "moving_average.periods".into(),
                    reason: "At least one period is required".into(),
                });
            }
            periods
                .iter()
                .try_for_each(|&p| positive("moving_average.periods", p))
        }
        IndicatorSpec::Macd { fast, slow, signal } => {
            positive("macd.fast", *fast)?;
            positive("macd.slow", *slow)?;
            positive("macd.signal", *signal)?;
            if fast >= slow {
                return Err(LoanAnalyticsError::InvalidInput {
                    field: "macd.fast".into(),
                    reason: "Fast span must be shorter than slow span".into(),
                });
            }
            Ok(())
        }
        IndicatorSpec::Rsi { period } => positive("rsi.period", *period),
    }
}
