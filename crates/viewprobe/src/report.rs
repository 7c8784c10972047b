//! Rendering of listing and probe results for the terminal.

use std::fmt::Write;

use viewprobe_core::{ProbeReport, ProbeResult, ViewName};

/// One view per line.
pub fn render_views(views: &[ViewName]) -> String {
    let mut out = String::new();
    for view in views {
        let _ = writeln!(out, "{view}");
    }
    out
}

/// A single probe outcome on one line.
pub fn render_result(view: &str, result: &ProbeResult) -> String {
    match result {
        ProbeResult::Success { duration_ms } => format!("ok    {view} ({duration_ms} ms)"),
        ProbeResult::Failure(failure) => {
            let mut line = format!("FAIL  {view}: {}", failure.message);
            let codes: Vec<String> = [
                failure.sql_state.as_ref().map(|s| format!("SQLSTATE {s}")),
                failure.error_code.as_ref().map(|c| format!("code {c}")),
            ]
            .into_iter()
            .flatten()
            .collect();
            if !codes.is_empty() {
                let _ = write!(line, " [{}]", codes.join(", "));
            }
            line
        }
    }
}

/// Every outcome followed by a summary line.
pub fn render_report(report: &ProbeReport) -> String {
    let mut out = String::new();
    for outcome in &report.outcomes {
        let _ = writeln!(out, "{}", render_result(outcome.view.as_str(), &outcome.result));
    }
    let _ = writeln!(
        out,
        "{}: {} views, {} passed, {} failed, {} ms total",
        report.schema,
        report.total(),
        report.passed(),
        report.failed(),
        report.total_duration_ms()
    );
    out
}
