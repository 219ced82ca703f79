use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::moving_average::exponential_moving_average;
use crate::types::Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    pub macd: Vec<Decimal>,
    pub signal: Vec<Decimal>,
    pub histogram: Vec<Decimal>,
}

/// Fast EMA minus slow EMA, its signal EMA, and the gap between the two.
/// Every series has the same length as `closes`.
pub fn macd(closes: &[Price], fast: usize, slow: usize, signal: usize) -> MacdSeries {
    let fast_ema = exponential_moving_average(closes, fast);
    let slow_ema = exponential_moving_average(closes, slow);

    let macd: Vec<Decimal> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = exponential_moving_average(&macd, signal);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_prices_have_zero_macd() {
        let closes = vec![dec!(50); 40];
        let m = macd(&closes, 12, 26, 9);
        assert_eq!(m.macd.len(), 40);
        let eps = dec!(0.00000000000000000001);
        assert!(m.macd.iter().all(|v| v.abs() < eps));
        assert!(m.histogram.iter().all(|v| v.abs() < eps));
    }

    #[test]
    fn test_rising_prices_give_positive_macd() {
        let closes: Vec<Decimal> = (1..=60).map(Decimal::from).collect();
        let m = macd(&closes, 12, 26, 9);
        assert_eq!(m.macd[0], Decimal::ZERO);
        assert!(m.macd[59] > Decimal::ZERO);
        assert_eq!(m.histogram[59], m.macd[59] - m.signal[59]);
    }
}
