//! Numeric helpers shared by the analytics
//!
//! `percentile_cont` follows the continuous (linear interpolation) definition used by
//! `PERCENTILE_CONT`: for N sorted values and fraction p the rank is `p * (N - 1)`, and the
//! result interpolates between the two order statistics bracketing that rank.

/// Continuous percentile of `values` at fraction `p` (0.0 to 1.0)
///
/// Returns `None` for an empty slice or a fraction outside `[0, 1]`.
pub fn percentile_cont(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Arithmetic mean, `None` when empty
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Round to two decimal places, halves away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `numerator / denominator` rounded to two places, `0` when the denominator is zero
///
/// Rounding happens in integer hundredths, so exact halves such as `201 / 200` go up.
pub fn ratio_or_zero(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let (n, d) = (u128::from(numerator), u128::from(denominator));
    let hundredths = (200 * n + d) / (2 * d);
    hundredths as f64 / 100.0
}

/// Percentage change from `previous` to `current` rounded to two places, `0` when
/// `previous` is zero
pub fn percent_change(current: u64, previous: u64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    let delta = i128::from(current) - i128::from(previous);
    let base = i128::from(previous);
    let hundredths = (20_000 * delta.abs() + base) / (2 * base);
    delta.signum() as f64 * hundredths as f64 / 100.0
}

/// Percentage difference of `value` relative to `baseline`, `None` when the baseline is zero
pub fn percent_difference(value: f64, baseline: f64) -> Option<f64> {
    if baseline == 0.0 {
        return None;
    }
    Some(round2((value - baseline) / baseline * 100.0))
}
