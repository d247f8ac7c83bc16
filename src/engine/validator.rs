//! Result validator: anchor discovery, frame alignment, and IoU scoring

use super::models::{
    ActualFrame, BoundingBox, DetectResult, DetectedArea, Expectation, ExpectedFrame, ExpectedStatus,
    FrameResult, MatchDetail, ValidationReport,
};
use crate::metrics::METRICS;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Intersection over Union of two axis-aligned xywh boxes
///
/// Disjoint boxes and zero-area unions yield 0.0. Degenerate boxes (zero or
/// negative size) get no special handling beyond that; they simply never
/// reach the threshold.
pub fn calculate_iou(a: &BoundingBox, b: &BoundingBox) -> f64 {
    let ax_max = a.x + a.width;
    let ay_max = a.y + a.height;
    let bx_max = b.x + b.width;
    let by_max = b.y + b.height;

    let inter_x_min = a.x.max(b.x);
    let inter_y_min = a.y.max(b.y);
    let inter_x_max = ax_max.min(bx_max);
    let inter_y_max = ay_max.min(by_max);

    if inter_x_max < inter_x_min || inter_y_max < inter_y_min {
        return 0.0;
    }

    let inter_area = (inter_x_max - inter_x_min) * (inter_y_max - inter_y_min);
    let union_area = a.width * a.height + b.width * b.height - inter_area;

    if union_area == 0 {
        return 0.0;
    }

    inter_area as f64 / union_area as f64
}

/// Validates detector output against one expectation
///
/// Stateless apart from the configured IoU threshold; every call returns a
/// fresh report and never mutates its inputs.
#[derive(Debug, Clone)]
pub struct ResultValidator {
    iou_threshold: f64,
}

impl ResultValidator {
    pub fn new(iou_threshold: f64) -> Self {
        Self { iou_threshold }
    }

    /// Find the anchor frame for a detection-event group
    ///
    /// Scans actual frames in supplied (chronological) order for the first
    /// one containing an area with the expected rule code and IoU at or above
    /// the threshold. Returns `(frame_id, true)` on success and `(0, false)`
    /// when nothing matches; the fallback anchor makes the rest of the group
    /// fail loudly rather than be discarded.
    fn find_anchor_frame(
        &self,
        actual_frames: &[ActualFrame],
        first_expected: &ExpectedFrame,
    ) -> (i64, bool) {
        if first_expected.detected_areas.is_empty() {
            warn!("No expected areas in first frame of group {}", first_expected.expect_id);
            return (0, false);
        }

        for frame in actual_frames {
            if frame.detected_areas.is_empty() {
                continue;
            }

            for exp_area in &first_expected.detected_areas {
                for act_area in &frame.detected_areas {
                    if exp_area.rule_code != act_area.rule_code {
                        continue;
                    }

                    let iou = calculate_iou(&exp_area.bounding_box, &act_area.bounding_box);
                    if iou >= self.iou_threshold {
                        info!(
                            "Anchor for expect_id={} found at frameId={} (IoU {:.2})",
                            first_expected.expect_id, frame.frame_id, iou
                        );
                        return (frame.frame_id, true);
                    }
                }
            }
        }

        warn!(
            "No anchor found for expect_id={}, falling back to frame 0",
            first_expected.expect_id
        );
        METRICS.record_anchor_fallback();
        (0, false)
    }

    /// Compare one expected frame against the actual frame at its resolved id
    ///
    /// Every expected area is scored against the best same-rule actual area;
    /// the comparison is strict `>`, so the first-seen candidate wins ties.
    /// A frame with no expected areas matches only an equally empty actual
    /// frame.
    fn match_frame(
        &self,
        expected_areas: &[DetectedArea],
        actual_frame: &ActualFrame,
    ) -> (bool, Vec<MatchDetail>) {
        if expected_areas.is_empty() {
            return (actual_frame.detected_areas.is_empty(), vec![]);
        }

        let mut details = Vec::with_capacity(expected_areas.len());
        let mut matched_count = 0;

        for exp_area in expected_areas {
            let mut best_match: Option<&DetectedArea> = None;
            let mut best_iou = 0.0;

            for act_area in &actual_frame.detected_areas {
                if exp_area.rule_code != act_area.rule_code {
                    continue;
                }

                let iou = calculate_iou(&exp_area.bounding_box, &act_area.bounding_box);
                if iou > best_iou {
                    best_iou = iou;
                    best_match = Some(act_area);
                }
            }

            let matched = best_iou >= self.iou_threshold;
            if matched {
                matched_count += 1;
            }

            details.push(MatchDetail {
                expected: exp_area.clone(),
                actual: best_match.cloned(),
                iou: best_iou,
                matched,
            });
        }

        (matched_count == expected_areas.len(), details)
    }

    /// Validate one test case
    pub fn validate(
        &self,
        expectation: &Expectation,
        actual_results: &[ActualFrame],
    ) -> ValidationReport {
        // Case A: a Reject case is a pure existence check, no alignment
        if expectation.expected_status == ExpectedStatus::Reject {
            let has_detection = !actual_results.is_empty();
            let report = ValidationReport {
                video_name: expectation.video_name.clone(),
                test_case_id: expectation.test_case_id.clone(),
                test_case_description: expectation.test_case_description.clone(),
                expected_status: expectation.expected_status,
                total_frames: 0,
                matched_frames: 0,
                accuracy: None,
                detect_result: if has_detection {
                    DetectResult::Failed
                } else {
                    DetectResult::Passed
                },
                validation_note: if has_detection {
                    "Model detects violation when uploading a NO violation video".to_string()
                } else {
                    String::new()
                },
                frame_results: vec![],
            };
            METRICS.record_case(report.detect_result);
            return report;
        }

        // Case B: an Approve case with no detections at all short-circuits,
        // an anchor search over nothing would be vacuous
        if actual_results.is_empty() {
            let report = ValidationReport {
                video_name: expectation.video_name.clone(),
                test_case_id: expectation.test_case_id.clone(),
                test_case_description: expectation.test_case_description.clone(),
                expected_status: expectation.expected_status,
                total_frames: expectation.expected_frames.len(),
                matched_frames: 0,
                accuracy: Some(0.0),
                detect_result: DetectResult::Failed,
                validation_note: "Model detects NO violation when uploading a violation video"
                    .to_string(),
                frame_results: vec![],
            };
            METRICS.record_case(report.detect_result);
            return report;
        }

        // Case C: full alignment, one independent group per detection event
        let mut grouped: BTreeMap<usize, Vec<&ExpectedFrame>> = BTreeMap::new();
        for frame in &expectation.expected_frames {
            grouped.entry(frame.expect_id).or_default().push(frame);
        }
        debug!("Grouped into {} detection events", grouped.len());

        let actual_by_id: HashMap<i64, &ActualFrame> =
            actual_results.iter().map(|f| (f.frame_id, f)).collect();
        let empty_frame = |frame_id| ActualFrame {
            frame_id,
            detected_areas: vec![],
        };

        let mut frame_results = Vec::with_capacity(expectation.expected_frames.len());
        let mut matched_frames = 0;

        for (expect_id, group) in &grouped {
            debug!("Validating expect_id={} with {} frames", expect_id, group.len());

            let (anchor, anchor_found) = self.find_anchor_frame(actual_results, group[0]);

            for exp_frame in group {
                let absolute_frame_id = anchor + exp_frame.offset_frame;

                let missing;
                let actual_frame = match actual_by_id.get(&absolute_frame_id) {
                    Some(f) => *f,
                    None => {
                        missing = empty_frame(absolute_frame_id);
                        &missing
                    }
                };

                let (matched, details) = self.match_frame(&exp_frame.detected_areas, actual_frame);
                if matched {
                    matched_frames += 1;
                }

                frame_results.push(FrameResult {
                    frame_id: absolute_frame_id,
                    expect_id: *expect_id,
                    offset_frame: exp_frame.offset_frame,
                    anchor_found,
                    matched,
                    details,
                });
            }
        }

        let total_frames = expectation.expected_frames.len();
        let accuracy = if total_frames > 0 {
            matched_frames as f64 / total_frames as f64 * 100.0
        } else {
            0.0
        };
        // Verdict on the exact ratio; rounding is presentation only
        let detect_result = if accuracy > 50.0 {
            DetectResult::Passed
        } else {
            DetectResult::Failed
        };
        METRICS.record_case(detect_result);

        ValidationReport {
            video_name: expectation.video_name.clone(),
            test_case_id: expectation.test_case_id.clone(),
            test_case_description: expectation.test_case_description.clone(),
            expected_status: expectation.expected_status,
            total_frames,
            matched_frames,
            accuracy: Some(round2(accuracy)),
            detect_result,
            validation_note: format!(
                "Model detects violation but wrong bounding box ({}/{} frames matched)",
                matched_frames, total_frames
            ),
            frame_results,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
