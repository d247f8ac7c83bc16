//! Per-rule batch orchestration: build expectations, validate detector
//! output, and summarize the run

use crate::api::models::Evidence;
use crate::api::DetectionApiClient;
use crate::config::ValidationConfig;
use crate::engine::models::{ActualFrame, DetectResult, ValidationReport};
use crate::engine::{ExpectationBuilder, ResultValidator};
use crate::error::Result;
use crate::sheet::SheetRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// One rule under test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRule {
    pub tenant_name: String,
    pub rule_name: String,
    pub rule_code: String,
}

/// Aggregated outcome of validating one rule's batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRunSummary {
    pub status: String,
    pub batch_code: String,
    pub rule_code: String,
    pub total_testcases: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub test_case_validation_result: Vec<ValidationReport>,
}

/// Generate a session timestamp, e.g. `20260825_142501`
pub fn gen_timestamp() -> String {
    Utc::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Batch codes are `{tenant}_{rule}_{timestamp}` with spaces collapsed
pub fn generate_batch_code(tenant_name: &str, rule_name: &str, timestamp: &str) -> String {
    format!("{}_{}_{}", tenant_name, rule_name, timestamp).replace(' ', "_")
}

/// Human-readable duration, e.g. `2m 05s`
pub fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, minutes, secs)
    } else {
        format!("{}m {:02}s", minutes, secs)
    }
}

/// Group evidence frames by video code
pub fn group_frames_by_video(evidences: Vec<Evidence>) -> HashMap<String, Vec<ActualFrame>> {
    let mut by_video = HashMap::new();
    for evidence in evidences {
        if evidence.video_code.is_empty() {
            continue;
        }
        by_video.insert(evidence.video_code, evidence.payload.frames);
    }
    by_video
}

/// Runs one builder + validator pipeline per test case
pub struct BatchProcessor {
    builder: ExpectationBuilder,
    validator: ResultValidator,
}

impl BatchProcessor {
    pub fn new(config: &ValidationConfig) -> Self {
        Self {
            builder: ExpectationBuilder::from_config(config),
            validator: ResultValidator::new(config.iou_threshold),
        }
    }

    /// Validate every test case of a rule against grouped evidence frames
    ///
    /// Test cases are independent; a malformed row aborts the run as a
    /// test-infrastructure failure rather than a model FAIL.
    pub fn validate_batch(
        &self,
        batch_code: &str,
        rule_code: &str,
        rows: &[SheetRow],
        frames_by_video: &HashMap<String, Vec<ActualFrame>>,
    ) -> Result<RuleRunSummary> {
        let start_time: DateTime<Utc> = Utc::now();
        let empty: Vec<ActualFrame> = Vec::new();

        let mut reports = Vec::with_capacity(rows.len());
        let mut passed = 0;
        let mut failed = 0;

        for row in rows {
            let expectation = self.builder.build_from_row(row, rule_code)?;
            let video_code = expectation.video_name.trim_end_matches(".mp4");
            let actual_frames = frames_by_video.get(video_code).unwrap_or(&empty);

            let report = self.validator.validate(&expectation, actual_frames);

            match report.detect_result {
                DetectResult::Passed => {
                    passed += 1;
                    info!(
                        "  ✓ {} (TC{}): PASSED - {}",
                        report.video_name, report.test_case_id, report.validation_note
                    );
                }
                DetectResult::Failed => {
                    failed += 1;
                    info!(
                        "  ✗ {} (TC{}): FAILED - {}",
                        report.video_name, report.test_case_id, report.validation_note
                    );
                }
            }

            reports.push(report);
        }

        let end_time: DateTime<Utc> = Utc::now();
        let duration_seconds = (end_time - start_time).num_milliseconds() as f64 / 1000.0;

        let total = reports.len();
        let pass_rate = if total > 0 {
            (passed as f64 / total as f64 * 10000.0).round() / 100.0
        } else {
            0.0
        };

        info!(
            "Validation summary for {}: {}/{} passed ({}%)",
            batch_code, passed, total, pass_rate
        );

        Ok(RuleRunSummary {
            status: "success".to_string(),
            batch_code: batch_code.to_string(),
            rule_code: rule_code.to_string(),
            total_testcases: total,
            passed,
            failed,
            pass_rate,
            start_time: start_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            end_time: end_time.format("%Y-%m-%d %H:%M:%S").to_string(),
            duration: format_duration(duration_seconds),
            test_case_validation_result: reports,
        })
    }

    /// Fetch a batch's evidences from the detection service and validate
    pub async fn run_rule(
        &self,
        client: &DetectionApiClient,
        batch_code: &str,
        rule: &TestRule,
        rows: &[SheetRow],
    ) -> Result<RuleRunSummary> {
        info!(
            "Validating: {} - {} ({})",
            rule.tenant_name, rule.rule_name, rule.rule_code
        );

        let evidences = client
            .get_all_evidences(batch_code, Some(&rule.rule_code))
            .await?;
        let frames_by_video = group_frames_by_video(evidences);

        self.validate_batch(batch_code, &rule.rule_code, rows, &frames_by_video)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::DetectionEvent;

    fn approve_row(video: &str, tc: &str) -> SheetRow {
        SheetRow {
            test_case_id: tc.to_string(),
            video_name: video.to_string(),
            expected_status: "Approve".to_string(),
            event_start_time: "00:10".to_string(),
            event_end_time: "00:12".to_string(),
            expected_result: vec![DetectionEvent {
                event_start: "00:10".to_string(),
                event_end: "00:12".to_string(),
                area: vec![0, 0, 100, 100],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_batch_code() {
        let code = generate_batch_code("Linfox Viet Nam", "USEPHONE", "20260825_120000");
        assert_eq!(code, "Linfox_Viet_Nam_USEPHONE_20260825_120000");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0m 00s");
        assert_eq!(format_duration(125.0), "2m 05s");
        assert_eq!(format_duration(3725.0), "1h 02m 05s");
    }

    #[test]
    fn test_group_frames_by_video() {
        let evidences = vec![
            Evidence {
                video_code: "v1".to_string(),
                payload: crate::api::EvidencePayload {
                    frames: vec![ActualFrame {
                        frame_id: 1,
                        detected_areas: vec![],
                    }],
                    ..Default::default()
                },
            },
            Evidence {
                video_code: String::new(),
                payload: Default::default(),
            },
        ];

        let grouped = group_frames_by_video(evidences);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["v1"].len(), 1);
    }

    #[test]
    fn test_validate_batch_counts() {
        let processor = BatchProcessor::new(&ValidationConfig::default());

        let rows = vec![approve_row("good.mp4", "1"), approve_row("silent.mp4", "2")];

        // "good" gets matching detections at an offset numbering; "silent"
        // has no evidence at all and fails the Approve-empty short-circuit
        let area = crate::engine::BoundingBox {
            x: 0,
            y: 0,
            width: 100,
            height: 100,
        };
        let frames: Vec<ActualFrame> = (0..=19)
            .map(|i| ActualFrame {
                frame_id: 700 + i,
                detected_areas: vec![crate::engine::DetectedArea {
                    rule_code: "PAR02".to_string(),
                    bounding_box: area,
                    confidence: Some(0.9),
                }],
            })
            .collect();
        let mut by_video = HashMap::new();
        by_video.insert("good".to_string(), frames);

        let summary = processor
            .validate_batch("batch_1", "PAR02", &rows, &by_video)
            .unwrap();

        assert_eq!(summary.total_testcases, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.pass_rate, 50.0);
        assert_eq!(summary.status, "success");
    }

    #[test]
    fn test_validate_batch_malformed_row_is_error() {
        let processor = BatchProcessor::new(&ValidationConfig::default());
        let mut row = approve_row("v.mp4", "1");
        row.expected_result[0].area = vec![1, 2, 3];

        let by_video = HashMap::new();
        assert!(processor
            .validate_batch("batch_1", "PAR02", &[row], &by_video)
            .is_err());
    }
}
