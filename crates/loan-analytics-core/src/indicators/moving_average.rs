use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Price;

/// Simple rolling mean. Entries before the first full window are `None`.
pub fn simple_moving_average(closes: &[Price], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() < period {
        return out;
    }

    let divisor = Decimal::from(period as u64);
    let mut window_sum: Decimal = closes[..period].iter().copied().sum();
    out[period - 1] = Some(window_sum / divisor);

    for i in period..closes.len() {
        window_sum += closes[i] - closes[i - period];
        out[i] = Some(window_sum / divisor);
    }

    out
}

/// Exponential moving average with `alpha = 2 / (span + 1)`, seeded with the
/// first value and no bias adjustment.
pub fn exponential_moving_average(values: &[Decimal], span: usize) -> Vec<Decimal> {
    let Some(&first) = values.first() else {
        return Vec::new();
    };

    let alpha = dec!(2) / Decimal::from(span as u64 + 1);
    let one_minus_alpha = Decimal::ONE - alpha;

    let mut out = Vec::with_capacity(values.len());
    let mut prev = first;
    out.push(prev);
    for &v in &values[1..] {
        prev = v * alpha + prev * one_minus_alpha;
        out.push(prev);
    }
    out
}
