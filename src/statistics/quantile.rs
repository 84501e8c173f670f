//! Median computation.
//!
//! Medians follow the usual definition: the middle sorted value for an odd
//! count, the average of the two middle sorted values for an even count.

/// Median of nanosecond samples.
///
/// Works on a transient sorted copy; the caller's dataset is left untouched.
///
/// # Panics
///
/// Panics if `samples` is empty.
pub fn median_ns(samples: &[u64]) -> f64 {
    assert!(!samples.is_empty(), "Cannot compute median of empty slice");
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    median_sorted(&sorted)
}

/// Median of an already sorted slice.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median_sorted(sorted: &[u64]) -> f64 {
    assert!(!sorted.is_empty(), "Cannot compute median of empty slice");
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] as f64 + sorted[n / 2] as f64) / 2.0
    } else {
        sorted[n / 2] as f64
    }
}
