/// Simple Moving Average of the last `period` values.
/// Returns `None` if fewer than `period` values exist.
pub fn sma(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Exponential Moving Average across the whole slice.
///
/// Seeded with the first price, `k = 2 / (period + 1)`. Returns `None` if
/// fewer than `period` values exist.
pub fn ema(prices: &[f64], period: usize) -> Option<f64> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let k = 2.0 / (period as f64 + 1.0);
    let (&seed, rest) = prices.split_first()?;
    Some(rest.iter().fold(seed, |ema, &price| price * k + ema * (1.0 - k)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_of_last_window() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&prices, 2), Some(4.5));
        assert_eq!(sma(&prices, 5), Some(3.0));
        assert_eq!(sma(&prices, 6), None);
        assert_eq!(sma(&prices, 0), None);
    }

    #[test]
    fn ema_recurrence_from_first_price() {
        // k = 0.5 for period 3
        let prices = [10.0, 20.0, 30.0];
        // 10 -> 15 -> 22.5
        assert_eq!(ema(&prices, 3), Some(22.5));
    }

    #[test]
    fn ema_needs_period_values() {
        assert_eq!(ema(&[1.0, 2.0], 3), None);
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let prices = vec![42.0; 30];
        let value = ema(&prices, 9).unwrap();
        assert!((value - 42.0).abs() < 1e-9);
    }
}
