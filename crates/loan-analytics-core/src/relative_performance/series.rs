//! Element-wise helpers over close and return series.
//!
//! Arithmetic is checked: a series whose values leave the decimal range
//! yields [`LoanAnalyticsError::FinancialImpossibility`].

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::LoanAnalyticsError;
use crate::types::{Price, Rate};
use crate::LoanAnalyticsResult;

pub(crate) fn out_of_range(what: &str) -> LoanAnalyticsError {
    LoanAnalyticsError::FinancialImpossibility(format!("{what} exceeds decimal range"))
}

/// Each close divided by the first. Closes must be positive.
pub fn normalize(closes: &[Price]) -> LoanAnalyticsResult<Vec<Decimal>> {
    let Some(&base) = closes.first() else {
        return Ok(Vec::new());
    };
    closes
        .iter()
        .map(|&c| c.checked_div(base).ok_or_else(|| out_of_range("normalised close")))
        .collect()
}

/// Period-over-period simple returns; the first entry is `None`.
pub fn pct_change(closes: &[Price]) -> LoanAnalyticsResult<Vec<Option<Rate>>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return Ok(out);
    }
    out.push(None);
    for w in closes.windows(2) {
        let ratio = w[1]
            .checked_div(w[0])
            .ok_or_else(|| out_of_range("daily return"))?;
        out.push(Some(ratio - Decimal::ONE));
    }
    Ok(out)
}

/// Fractional decline from the running maximum (zero at new highs).
/// Positive closes keep every value within `[-1, 0]`.
pub fn drawdown(closes: &[Price]) -> Vec<Decimal> {
    let mut peak = Decimal::MIN;
    closes
        .iter()
        .map(|&c| {
            peak = peak.max(c);
            (c - peak) / peak
        })
        .collect()
}

/// Mean and sample (n - 1) standard deviation. `None` below two values.
pub fn mean_and_std(values: &[Decimal]) -> LoanAnalyticsResult<Option<(Decimal, Decimal)>> {
    if values.len() < 2 {
        return Ok(None);
    }
    let n = Decimal::from(values.len() as u64);
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, &v| acc.checked_add(v))
        .ok_or_else(|| out_of_range("sum of returns"))?;
    let mean = sum / n;
    let ss = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, &v| {
            let d = v.checked_sub(mean)?;
            acc.checked_add(d.checked_mul(d)?)
        })
        .ok_or_else(|| out_of_range("sum of squared deviations"))?;
    Ok((ss / (n - Decimal::ONE)).sqrt().map(|std| (mean, std)))
}

/// Rolling sample standard deviation over `window` entries; any missing
/// value inside the window leaves the result missing.
pub fn rolling_std(
    values: &[Option<Decimal>],
    window: usize,
) -> LoanAnalyticsResult<Vec<Option<Decimal>>> {
    let mut out = vec![None; values.len()];
    if window < 2 || values.len() < window {
        return Ok(out);
    }
    for end in window..=values.len() {
        let present: Option<Vec<Decimal>> = values[end - window..end].iter().copied().collect();
        if let Some(window_values) = present {
            out[end - 1] = mean_and_std(&window_values)?.map(|(_, std)| std);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_and_returns() {
        let closes = [dec!(100), dec!(110), dec!(99)];
        assert_eq!(normalize(&closes).unwrap(), vec![dec!(1), dec!(1.1), dec!(0.99)]);
        assert_eq!(
            pct_change(&closes).unwrap(),
            vec![None, Some(dec!(0.1)), Some(dec!(-0.1))]
        );
    }

    #[test]
    fn test_drawdown_from_running_peak() {
        let closes = [dec!(100), dec!(120), dec!(90), dec!(130)];
        assert_eq!(
            drawdown(&closes),
            vec![dec!(0), dec!(0), dec!(-0.25), dec!(0)]
        );
    }

    #[test]
    fn test_sample_std() {
        let values = [
            dec!(2),
            dec!(4),
            dec!(4),
            dec!(4),
            dec!(5),
            dec!(5),
            dec!(7),
            dec!(9),
        ];
        let (mean, std) = mean_and_std(&values).unwrap().unwrap();
        assert_eq!(mean, dec!(5));
        // Sample variance = 32 / 7
        assert!((std - dec!(2.13808993529939)).abs() < dec!(0.0000000001));
        assert!(mean_and_std(&[dec!(1)]).unwrap().is_none());
    }

    #[test]
    fn test_rolling_std_needs_full_window() {
        let values = [None, Some(dec!(1)), Some(dec!(3)), Some(dec!(5))];
        let out = rolling_std(&values, 2).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!((out[2].unwrap() - dec!(1.41421356237)).abs() < dec!(0.00000001));
        assert!(out[3].is_some());
    }

    #[test]
    fn test_out_of_range_ratios_are_errors() {
        let tiny = dec!(0.0000000000000000000000000001);
        let huge = dec!(10_000_000_000_000_000_000_000_000_000);
        assert!(matches!(
            normalize(&[tiny, huge]),
            Err(LoanAnalyticsError::FinancialImpossibility(_))
        ));
        assert!(matches!(
            pct_change(&[dec!(1), tiny, huge]),
            Err(LoanAnalyticsError::FinancialImpossibility(_))
        ));
    }

    #[test]
    fn test_std_overflow_is_an_error() {
        let big = dec!(70_000_000_000_000_000_000_000_000_000);
        assert!(matches!(
            mean_and_std(&[big, -big]),
            Err(LoanAnalyticsError::FinancialImpossibility(_))
        ));
    }
}
