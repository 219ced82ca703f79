use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::Price;

/// Relative Strength Index over rolling simple means of gains and losses.
///
/// Index `i` uses the `period` price changes ending at `i`, so the first
/// `period` entries are `None`. A window with losses but no gains gives 0,
/// gains but no losses gives 100, and a flat window gives `None`.
pub fn rsi(closes: &[Price], period: usize) -> Vec<Option<Decimal>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let changes: Vec<Decimal> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let divisor = Decimal::from(period as u64);

    for end in period..=changes.len() {
        let window = &changes[end - period..end];
        let gain: Decimal = window.iter().copied().filter(|c| *c > Decimal::ZERO).sum();
        let loss: Decimal = window
            .iter()
            .filter(|c| **c < Decimal::ZERO)
            .map(|c| -*c)
            .sum();

        out[end] = if loss.is_zero() {
            (!gain.is_zero()).then_some(dec!(100))
        } else {
            let rs = (gain / divisor) / (loss / divisor);
            Some(dec!(100) - dec!(100) / (Decimal::ONE + rs))
        };
    }

    out
}
