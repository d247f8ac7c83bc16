//! Static HTML rendering for validation results

use super::writer::AllResults;
use crate::engine::models::{DetectResult, ValidationReport};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }\n\
table { border-collapse: collapse; width: 100%; }\n\
th, td { border: 1px solid #ccc; padding: 8px; text-align: center; }\n\
th { background-color: #f2f2f2; }\n\
h1, h2 { color: #333; }";

fn page(title: &str, body: &str) -> String {
    format!(
        "<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        title, STYLE, body
    )
}

fn accuracy_cell(accuracy: Option<f64>) -> String {
    match accuracy {
        Some(value) => format!("{}", value),
        None => "-".to_string(),
    }
}

fn result_cell(result: DetectResult) -> String {
    let (color, label) = match result {
        DetectResult::Passed => ("green", "PASSED"),
        DetectResult::Failed => ("red", "FAILED"),
    };
    format!("<td style=\"color:{}\">{}</td>", color, label)
}

/// One-row-per-batch overview table
pub fn render_summary(results: &AllResults) -> String {
    let mut rows = String::new();
    for (batch_code, info) in &results.details {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td></tr>\n",
            batch_code,
            info.rule_code,
            info.total_testcases,
            info.passed,
            info.failed,
            info.pass_rate,
            info.status
        ));
    }

    let body = format!(
        "<h1>Test Summary Report</h1>\n<table>\n<tr><th>Batch</th><th>Rule Code</th><th>Total</th><th>Passed</th><th>Failed</th><th>Pass Rate</th><th>Status</th></tr>\n{}</table>",
        rows
    );
    page("Test Summary Report", &body)
}

fn render_frame_details(report: &ValidationReport, out: &mut String) {
    if report.frame_results.is_empty() {
        return;
    }

    out.push_str(
        "<tr><td colspan=\"7\"><details><summary><b>Frame Details</b></summary><table>\n\
         <tr><th>Frame ID</th><th>Event</th><th>Anchor Found</th><th>Matched</th><th>IoU</th></tr>\n",
    );
    for frame in &report.frame_results {
        let best_iou = frame
            .details
            .iter()
            .map(|d| d.iou)
            .fold(0.0_f64, f64::max);
        out.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            frame.frame_id, frame.expect_id, frame.anchor_found, frame.matched, best_iou
        ));
    }
    out.push_str("</table></details></td></tr>\n");
}

/// Per-batch sections with a row per test case and collapsible frame detail
pub fn render_details(results: &AllResults) -> String {
    let mut sections = String::new();

    for (batch_code, info) in &results.details {
        sections.push_str(&format!(
            "<h2>{} ({})</h2>\n<p><b>Total:</b> {} | <b>Passed:</b> {} | <b>Failed:</b> {} | <b>Pass rate:</b> {}%</p>\n\
             <table>\n<tr><th>Video</th><th>Expected</th><th>Matched Frames</th><th>Total Frames</th><th>Accuracy</th><th>Result</th><th>Note</th></tr>\n",
            batch_code, info.rule_code, info.total_testcases, info.passed, info.failed, info.pass_rate
        ));

        for case in &info.test_case_validation_result {
            sections.push_str(&format!(
                "<tr><td>{}</td><td>{:?}</td><td>{}</td><td>{}</td><td>{}</td>{}<td>{}</td></tr>\n",
                case.video_name,
                case.expected_status,
                case.matched_frames,
                case.total_frames,
                accuracy_cell(case.accuracy),
                result_cell(case.detect_result),
                case.validation_note
            ));

            render_frame_details(case, &mut sections);
        }

        sections.push_str("</table>\n");
    }

    page("Test Detail Report", &sections)
}
