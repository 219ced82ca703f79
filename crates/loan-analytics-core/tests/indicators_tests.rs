#![cfg(feature = "indicators")]

use loan_analytics_core::indicators::{
    calculate_indicators, IndicatorInput, IndicatorSeries, IndicatorSpec,
};
use loan_analytics_core::LoanAnalyticsError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn closes(n: u32) -> Vec<Decimal> {
    // Zig-zag uptrend: +2, -1, +2, -1, ...
    let mut price = dec!(100);
    (0..n)
        .map(|i| {
            if i > 0 {
                price += if i % 2 == 1 { dec!(2) } else { dec!(-1) };
            }
            price
        })
        .collect()
}

#[test]
fn test_indicator_defaults_from_json() {
    let json = r#"{
        "closes": ["1", "2", "3"],
        "indicators": [
            {"type": "moving_average"},
            {"type": "macd"},
            {"type": "rsi", "period": 7}
        ]
    }"#;
    let input: IndicatorInput = serde_json::from_str(json).unwrap();
    assert_eq!(
        input.indicators,
        vec![
            IndicatorSpec::MovingAverage {
                periods: vec![20, 50, 200]
            },
            IndicatorSpec::Macd {
                fast: 12,
                slow: 26,
                signal: 9
            },
            IndicatorSpec::Rsi { period: 7 },
        ]
    );
}

#[test]
fn test_all_series_align_with_closes() {
    let input = IndicatorInput {
        closes: closes(40),
        indicators: vec![
            IndicatorSpec::MovingAverage {
                periods: vec![5, 20],
            },
            IndicatorSpec::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorSpec::Rsi { period: 14 },
        ],
    };
    let out = calculate_indicators(&input).unwrap();
    assert_eq!(out.result.observations, 40);
    assert!(out.warnings.is_empty());

    for series in &out.result.indicators {
        match series {
            IndicatorSeries::MovingAverage { series } => {
                assert_eq!(series.len(), 2);
                for ma in series {
                    assert_eq!(ma.values.len(), 40);
                    assert!(ma.values[ma.period - 2].is_none());
                    assert!(ma.values[ma.period - 1].is_some());
                }
            }
            IndicatorSeries::Macd { values, .. } => {
                assert_eq!(values.macd.len(), 40);
                assert_eq!(values.signal.len(), 40);
                assert_eq!(values.histogram.len(), 40);
                assert!(values.macd[39] > Decimal::ZERO);
            }
            IndicatorSeries::Rsi { period, values } => {
                assert_eq!(*period, 14);
                assert!(values[13].is_none());
                // 14 changes: 7 gains of 2, 7 losses of 1 => RS 2 => RSI 66.67
                let rsi = values[14].unwrap();
                assert!((rsi - dec!(66.6667)).abs() < dec!(0.0001));
            }
        }
    }
}

#[test]
fn test_short_series_warns() {
    let input = IndicatorInput {
        closes: closes(10),
        indicators: vec![
            IndicatorSpec::MovingAverage {
                periods: vec![20],
            },
            IndicatorSpec::Rsi { period: 14 },
        ],
    };
    let out = calculate_indicators(&input).unwrap();
    assert_eq!(out.warnings.len(), 2);
}

#[test]
fn test_invalid_indicator_parameters_rejected() {
    for spec in [
        IndicatorSpec::MovingAverage { periods: vec![] },
        IndicatorSpec::MovingAverage {
            periods: vec![5, 0],
        },
        IndicatorSpec::Macd {
            fast: 26,
            slow: 12,
            signal: 9,
        },
        IndicatorSpec::Rsi { period: 0 },
    ] {
        let input = IndicatorInput {
            closes: closes(30),
            indicators: vec![spec],
        };
        assert!(matches!(
            calculate_indicators(&input),
            Err(LoanAnalyticsError::InvalidInput { .. })
        ));
    }
}

#[test]
fn test_empty_closes_rejected() {
    let input = IndicatorInput {
        closes: vec![],
        indicators: vec![IndicatorSpec::Rsi { period: 14 }],
    };
    assert!(matches!(
        calculate_indicators(&input),
        Err(LoanAnalyticsError::InsufficientData(_))
    ));
}
