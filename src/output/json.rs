//! JSON serialization for round reports and run summaries.

use serde::Serialize;

/// Serialize a report or summary to a compact JSON string.
///
/// Used for line-delimited output, one round per line.
///
/// # Errors
///
/// Returns an error if serialization fails. Non-finite deviations are written
/// as `null`.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Serialize a report or summary to a pretty-printed JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_pretty<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Precision;
    use crate::result::{CaseEstimate, Estimate, IntervalReport, RoundReport, Verdict};
    use crate::statistics::ConfidenceInterval;

    fn case(label: &str, mean: f64) -> CaseEstimate {
        CaseEstimate {
            label: label.to_string(),
            samples: 10,
            median_ms: mean,
            mean_ms: mean,
            std_dev_ms: 0.5,
            interval: ConfidenceInterval::for_mean(mean, 0.5, 10, 0.95),
        }
    }

    fn make_report() -> RoundReport {
        RoundReport {
            round: 1,
            round_size: 10,
            accumulated_iterations: 10,
            samples_per_case: 10,
            estimate: Estimate::Interval(IntervalReport {
                base: case("whatever@fake.com", 1.0),
                target: case("correct@email.com", 1.5),
                precision: Precision::Nanoseconds,
                confidence: 0.95,
                verdict: Verdict::Distinguishable,
            }),
        }
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&make_report()).unwrap();
        assert!(json.contains("\"mode\":\"interval\""));
        assert!(json.contains("\"verdict\":\"distinguishable\""));
        assert!(json.contains("\"accumulated_iterations\":10"));
        assert!(json.contains("correct@email.com"));
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json_pretty(&make_report()).unwrap();
        assert!(json.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["estimate"]["precision"], "nanoseconds");
    }
}
