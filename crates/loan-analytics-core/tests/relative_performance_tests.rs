#![cfg(feature = "relative_performance")]

use chrono::NaiveDate;
use loan_analytics_core::relative_performance::{
    analyze_relative_performance, RelativePerformanceInput,
};
use loan_analytics_core::{LoanAnalyticsError, PricePoint};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn points(closes: &[Decimal]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PricePoint {
            date: day(i as u32 + 1),
            close,
        })
        .collect()
}

fn input(bench: &[Decimal], comp: &[Decimal]) -> RelativePerformanceInput {
    RelativePerformanceInput {
        benchmark: points(bench),
        comparison: points(comp),
        volatility_window: 2,
        outlier_sigma: dec!(3),
    }
}

#[test]
fn test_spread_and_cumulative_spread() {
    let bench = [dec!(100), dec!(110), dec!(99), dec!(99)];
    let comp = [dec!(50), dec!(50), dec!(50), dec!(55)];
    let out = analyze_relative_performance(&input(&bench, &comp)).unwrap();
    let r = &out.result;

    let spreads: Vec<Option<Decimal>> = r.observations.iter().map(|o| o.return_spread).collect();
    assert_eq!(
        spreads,
        vec![None, Some(dec!(-0.1)), Some(dec!(0.1)), Some(dec!(0.1))]
    );

    // (1 - 0.1)(1 + 0.1)(1 + 0.1) - 1
    assert_eq!(r.final_cumulative_spread, dec!(0.089));
    assert_eq!(r.observations[3].cumulative_spread, Some(dec!(0.089)));
    assert_eq!(r.observations[0].cumulative_spread, None);

    assert_eq!(r.benchmark_total_return, dec!(-0.01));
    assert_eq!(r.comparison_total_return, dec!(0.1));
    assert_eq!(r.benchmark_max_drawdown, dec!(-0.1));
    assert_eq!(r.comparison_max_drawdown, Decimal::ZERO);
}

#[test]
fn test_spread_bounds_bracket_mean() {
    let bench = [dec!(100), dec!(101), dec!(102), dec!(101), dec!(103), dec!(104)];
    let comp = [dec!(100), dec!(102), dec!(101), dec!(103), dec!(104), dec!(104)];
    let out = analyze_relative_performance(&input(&bench, &comp)).unwrap();
    let s = &out.result.spread;

    assert!(s.lower_bound < s.mean && s.mean < s.upper_bound);
    assert!((s.upper_bound - s.mean - dec!(3) * s.std_dev).abs() < dec!(0.0000000001));
    assert!(s.outlier_dates.is_empty());
}

#[test]
fn test_volatility_annualised_after_window() {
    let bench = [dec!(100), dec!(101), dec!(102), dec!(101)];
    let comp = [dec!(100), dec!(100), dec!(100), dec!(100)];
    let out = analyze_relative_performance(&input(&bench, &comp)).unwrap();
    let obs = &out.result.observations;

    assert_eq!(obs[1].benchmark_volatility, None);
    assert!(obs[2].benchmark_volatility.unwrap() > Decimal::ZERO);
    assert_eq!(obs[2].comparison_volatility, Some(Decimal::ZERO));
}

#[test]
fn test_dates_are_inner_joined() {
    let mut inp = input(
        &[dec!(100), dec!(101), dec!(102), dec!(103)],
        &[dec!(10), dec!(11), dec!(12), dec!(13)],
    );
    inp.comparison.remove(1);
    let out = analyze_relative_performance(&inp).unwrap();

    let dates: Vec<NaiveDate> = out.result.observations.iter().map(|o| o.date).collect();
    assert_eq!(dates, vec![day(1), day(3), day(4)]);
    assert_eq!(out.warnings.len(), 1);
}

#[test]
fn test_rejects_non_positive_close_and_duplicates() {
    let inp = input(&[dec!(100), dec!(0), dec!(1)], &[dec!(1), dec!(2), dec!(3)]);
    assert!(matches!(
        analyze_relative_performance(&inp),
        Err(LoanAnalyticsError::InvalidInput { .. })
    ));

    let mut inp = input(&[dec!(1), dec!(2), dec!(3)], &[dec!(1), dec!(2), dec!(3)]);
    inp.benchmark[2].date = day(1);
    assert!(matches!(
        analyze_relative_performance(&inp),
        Err(LoanAnalyticsError::InvalidInput { .. })
    ));
}

#[test]
fn test_too_few_common_dates() {
    let inp = input(&[dec!(1), dec!(2)], &[dec!(1), dec!(2)]);
    assert!(matches!(
        analyze_relative_performance(&inp),
        Err(LoanAnalyticsError::InsufficientData(_))
    ));
}

#[test]
fn test_dropped_dates_reported_per_series() {
    let bench: Vec<PricePoint> = (1..=10)
        .map(|d| PricePoint {
            date: day(d),
            close: Decimal::from(100 + d),
        })
        .collect();
    let comp: Vec<PricePoint> = (6..=15)
        .map(|d| PricePoint {
            date: day(d),
            close: Decimal::from(50 + d),
        })
        .collect();
    let inp = RelativePerformanceInput {
        benchmark: bench,
        comparison: comp,
        volatility_window: 2,
        outlier_sigma: dec!(3),
    };
    let out = analyze_relative_performance(&inp).unwrap();

    assert_eq!(out.result.observations.len(), 5);
    assert_eq!(
        out.warnings,
        vec![
            "5 benchmark dates without a matching close were dropped".to_string(),
            "5 comparison dates without a matching close were dropped".to_string(),
        ]
    );
}

#[test]
fn test_extreme_closes_fail_without_panicking() {
    let tiny = dec!(0.0000000000000000000000000001);
    let huge = dec!(10_000_000_000_000_000_000_000_000_000);
    let inp = input(&[tiny, huge, huge], &[dec!(1), dec!(2), dec!(3)]);
    assert!(matches!(
        analyze_relative_performance(&inp),
        Err(LoanAnalyticsError::FinancialImpossibility(_))
    ));
}
