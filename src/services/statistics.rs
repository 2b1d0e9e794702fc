//! Guarded statistics over analyzer history buffers
//!
//! Empty collections never leak NaN: means default to the caller's neutral
//! value and consistency defaults to 100.

use statrs::statistics::Statistics;

/// Arithmetic mean, or `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let m = values.iter().mean();
    m.is_finite().then_some(m)
}

/// Arithmetic mean with a fallback for empty input
pub fn mean_or(values: &[f64], default: f64) -> f64 {
    mean(values).unwrap_or(default)
}

/// Population standard deviation, 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sd = values.iter().population_std_dev();
    if sd.is_finite() {
        sd
    } else {
        0.0
    }
}

/// Number of samples below which consistency is reported as perfect
pub const MIN_CONSISTENCY_SAMPLES: usize = 3;

/// `max(0, 100 - k * stddev(values))`, integer precision
pub fn consistency_score(values: &[f64], k: f64) -> f64 {
    if values.len() < MIN_CONSISTENCY_SAMPLES {
        return 100.0;
    }
    (100.0 - k * population_std_dev(values)).max(0.0).round()
}

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Mean of the gaps between consecutive timestamps
pub fn mean_interval(timestamps: &[f64]) -> Option<f64> {
    let gaps: Vec<f64> = timestamps.windows(2).map(|w| w[1] - w[0]).collect();
    mean(&gaps)
}
