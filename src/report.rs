//! Plain-text rendering of an analysis for the `analyse` subcommand.

use crate::analysis::{AnalysisOutcome, AnalysisResult};
use crate::ui::chart::{average_bar, counts_rows, format_value, pie_slices, AverageBar};
use std::fmt::Write;

pub fn format_report(handle: &str, result: &AnalysisResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "@{} (user {})", handle, result.user_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "{:<10} {:>8} {:>8}", "Sentiment", "Count", "Share");

    let slices = pie_slices(result.positive_tweets, result.negative_tweets);
    for row in counts_rows(result.positive_tweets, result.negative_tweets) {
        let share = slices
            .iter()
            .find(|s| s.row.label == row.label)
            .map(|s| format!("{}%", format_value(s.percent())))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(out, "{:<10} {:>8} {:>8}", row.label, row.count, share);
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Average sentiment: {} / {}",
        average_bar(result.average_score).label(),
        format_value(AverageBar::AXIS_MAX)
    );

    out
}

/// Text for an outcome, plus whether it counts as success.
pub fn describe_outcome(handle: &str, outcome: &AnalysisOutcome) -> (String, bool) {
    match outcome {
        AnalysisOutcome::Success(result) => (format_report(handle, result), true),
        other => (other.alert_text().unwrap_or_default(), false),
    }
}
