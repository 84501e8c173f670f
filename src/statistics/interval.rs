//! Normal-approximation confidence intervals.
//!
//! Intervals use the standard normal quantile rather than Student's t, even
//! for small samples. With the refinement loop's sample sizes the difference
//! is negligible.

use serde::{Deserialize, Serialize};

/// Inverse normal CDF (probit function).
///
/// Computes Φ⁻¹(p) using the Abramowitz & Stegun approximation (26.2.23).
/// Accurate to ~4.5×10⁻⁴ for p ∈ (0, 1).
pub fn probit(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    // Use symmetry: for p < 0.5, compute -probit(1-p)
    let (sign, q) = if p < 0.5 { (-1.0, 1.0 - p) } else { (1.0, p) };

    // Rational approximation constants (Abramowitz & Stegun 26.2.23)
    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let t = (-2.0 * (1.0 - q).ln()).sqrt();
    let z = t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t);

    sign * z
}

/// Two-sided critical value for `confidence`, e.g. ~1.96 at 0.95.
pub fn two_sided_z(confidence: f64) -> f64 {
    -probit((1.0 - confidence) / 2.0)
}

/// Two-sided interval around a sample mean.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub left: f64,
    /// Upper bound.
    pub right: f64,
    /// Confidence level the interval was built at.
    pub confidence: f64,
}

impl ConfidenceInterval {
    /// Interval for a mean with standard deviation `std_dev` over `n` samples.
    ///
    /// `margin = Φ⁻¹((1−C)/2) · sd / √n` is negative, so `left = mean + margin`
    /// and `right = mean − margin` come out ordered.
    pub fn for_mean(mean: f64, std_dev: f64, n: usize, confidence: f64) -> Self {
        let margin = probit((1.0 - confidence) / 2.0) * std_dev / (n as f64).sqrt();
        Self {
            left: mean + margin,
            right: mean - margin,
            confidence,
        }
    }

    /// Interval width.
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// True if the two intervals share at least one point.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.right < other.left || other.right < self.left)
    }
}

/// Verdict of a pairwise interval comparison.
pub fn distinguishable(a: &ConfidenceInterval, b: &ConfidenceInterval) -> bool {
    !a.overlaps(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probit_accuracy() {
        assert!((probit(0.5) - 0.0).abs() < 1e-3, "probit(0.5) should be 0");
        assert!((probit(0.975) - 1.96).abs() < 1e-2, "probit(0.975) should be ~1.96");
        assert!((probit(0.995) - 2.576).abs() < 1e-2, "probit(0.995) should be ~2.576");
        assert!((probit(0.025) + 1.96).abs() < 1e-2, "probit(0.025) should be ~-1.96");
    }

    #[test]
    fn test_two_sided_z() {
        assert!((two_sided_z(0.95) - 1.96).abs() < 1e-2);
        assert!((two_sided_z(0.99) - 2.576).abs() < 1e-2);
    }

    #[test]
    fn test_interval_is_ordered_and_centered() {
        let ci = ConfidenceInterval::for_mean(50.0, 5.0, 100, 0.95);
        assert!(ci.left < ci.right);
        assert!(((ci.left + ci.right) / 2.0 - 50.0).abs() < 1e-9);
        // 1.96 * 5 / 10 on each side
        assert!((ci.width() - 2.0 * 0.98).abs() < 1e-2);
        assert_eq!(ci.confidence, 0.95);
    }

    #[test]
    fn test_zero_spread_collapses() {
        let ci = ConfidenceInterval::for_mean(3.0, 0.0, 10, 0.95);
        assert_eq!(ci.left, 3.0);
        assert_eq!(ci.right, 3.0);
    }

    #[test]
    fn test_overlap_and_verdict() {
        let a = ConfidenceInterval { left: 1.0, right: 2.0, confidence: 0.95 };
        let b = ConfidenceInterval { left: 1.5, right: 3.0, confidence: 0.95 };
        let c = ConfidenceInterval { left: 2.5, right: 3.0, confidence: 0.95 };
        assert!(a.overlaps(&b));
        assert!(!distinguishable(&a, &b));
        assert!(distinguishable(&a, &c));
        assert!(distinguishable(&c, &a));
    }

    #[test]
    fn test_touching_intervals_overlap() {
        let a = ConfidenceInterval { left: 1.0, right: 2.0, confidence: 0.95 };
        let b = ConfidenceInterval { left: 2.0, right: 3.0, confidence: 0.95 };
        assert!(!distinguishable(&a, &b));
    }
}
