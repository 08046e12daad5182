//! Summary statistics over captured channels.

/// Signal-to-noise ratio in decibels, `20 * log10(|mean / std|)`.
///
/// Uses the population standard deviation. Returns `None` for an empty
/// channel or when the deviation is zero.
#[must_use]
pub fn snr_db(samples: &[i32]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let count = samples.len() as f64;
    let mean = samples.iter().map(|s| f64::from(*s)).sum::<f64>() / count;
    let variance = samples
        .iter()
        .map(|s| (f64::from(*s) - mean).powi(2))
        .sum::<f64>()
        / count;
    let deviation = variance.sqrt();
    if deviation == 0.0 {
        return None;
    }
    Some(20.0 * (mean / deviation).abs().log10())
}
