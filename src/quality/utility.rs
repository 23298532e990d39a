/// Computes the arithmetic mean of a slice of values. Returns `None` for empty input.
///
/// Values are accumulated in ascending order as a running mean, so the result
/// does not depend on input order and cannot overflow for finite input.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mut avg = 0.0;
    for (i, v) in sorted.iter().enumerate() {
        avg += (v - avg) / (i + 1) as f64;
    }
    Some(avg)
}

/// Rounds to two decimal places, the precision reports are displayed with.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
