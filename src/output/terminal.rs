//! Terminal output formatting with colors.

use colored::Colorize;

use crate::result::{
    BaselineReport, Estimate, IntervalReport, RoundReport, RunSummary, StopReason, Verdict,
};

/// Format one round for human-readable terminal output.
///
/// Interval rounds render as a single progress line; baseline rounds add a
/// per-case table below the progress line.
pub fn format_round(report: &RoundReport) -> String {
    match &report.estimate {
        Estimate::Interval(interval) => {
            format_interval_line(report.accumulated_iterations, interval)
        }
        Estimate::Baseline(baseline) => {
            format_baseline_block(report.accumulated_iterations, baseline)
        }
    }
}

fn format_interval_line(iterations: usize, report: &IntervalReport) -> String {
    format!(
        "{:4} iterations | Base Mean Latency CI ({:.3}, {:.3}) | Target Mean Latency CI: ({:.3}, {:.3}) | CI at {}% | {}",
        iterations,
        report.base.interval.left,
        report.base.interval.right,
        report.target.interval.left,
        report.target.interval.right,
        format_confidence(report.confidence),
        format_verdict(report.verdict),
    )
}

fn format_baseline_block(iterations: usize, report: &BaselineReport) -> String {
    let mut output = format!(
        "{:4} iterations | Baseline {:.3} ms \u{00B1} {:.3} ms ({} samples) | Hit: {} | CI at {}% | {}\n",
        iterations,
        report.baseline_mean_ms,
        report.baseline_std_dev_ms,
        report.baseline_samples,
        report.hit_label,
        format_confidence(report.confidence),
        format_verdict(report.verdict),
    );
    for (i, case) in report.cases.iter().enumerate() {
        let marker = if i == report.hit_index { "*" } else { " " };
        output.push_str(&format!(
            "  {} {:<32} median {:>10.3} ms  {:>+9.1}% of sd\n",
            marker, case.label, case.median_ms, case.deviation_pct_of_sd
        ));
    }
    output
}

/// Format the end-of-run summary.
pub fn format_summary(summary: &RunSummary) -> String {
    let mut output = String::new();
    let sep = "\u{2500}".repeat(62);

    output.push_str("http-timing-oracle\n");
    output.push_str(&sep);
    output.push('\n');
    output.push_str(&format!(
        "  Rounds: {}  Iterations: {}  Stopped: {}\n",
        summary.reports.len(),
        summary.total_iterations(),
        match summary.stop_reason {
            StopReason::Ceiling => "iteration ceiling",
            StopReason::EarlyStop => "stable verdict",
        }
    ));
    for dataset in &summary.datasets {
        output.push_str(&format!("    {:<32} {} samples\n", dataset.label(), dataset.len()));
    }
    output.push('\n');

    match summary.verdict() {
        Verdict::Distinguishable => output.push_str(&format!(
            "  {}\n",
            "\u{26A0} Timing difference detected".yellow().bold()
        )),
        Verdict::Indistinguishable => output.push_str(&format!(
            "  {}\n",
            "\u{2713} No timing difference detected".green().bold()
        )),
    }
    output.push_str(&sep);
    output.push('\n');
    output
}

fn format_confidence(confidence: f64) -> String {
    let pct = confidence * 100.0;
    if (pct - pct.round()).abs() < 1e-9 {
        format!("{pct:.0}")
    } else {
        format!("{pct:.1}")
    }
}

fn format_verdict(verdict: Verdict) -> String {
    match verdict {
        Verdict::Distinguishable => "distinguishable".red().bold().to_string(),
        Verdict::Indistinguishable => "overlapping".green().to_string(),
    }
}
