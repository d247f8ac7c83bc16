//! End-to-end validation tests: sheet rows through the expectation builder
//! and result validator, covering anchor alignment and aggregate scoring.

use detection_validator::engine::{
    ActualFrame, BoundingBox, DetectResult, DetectedArea, ExpectationBuilder, ResultValidator,
};
use detection_validator::processor::{group_frames_by_video, BatchProcessor};
use detection_validator::sheet;
use detection_validator::ValidationConfig;
use std::collections::HashMap;

const GROUND_TRUTH: &str = r#"[
    {
        "TC": "1",
        "Video Name": "305948.mp4",
        "Test Case Description": "Phone usage at toolbox",
        "Camera Name": "89_KV TOOLBOX",
        "EventStartTime": "02:22",
        "EventEndTime": "02:25",
        "Expected Status": "Approve",
        "ExpectedResult": [
            {"eventStart": "02:22", "eventEnd": "02:23", "area": [156, 503, 331, 786]},
            {"eventStart": "02:24", "eventEnd": "02:25", "area": [364, 478, 562, 771]}
        ]
    },
    {
        "TC": "2",
        "Video Name": "305949.mp4",
        "Expected Status": "Reject",
        "ExpectedResult": []
    }
]"#;

fn area_of(coords: [i64; 4]) -> BoundingBox {
    BoundingBox::from_area(coords)
}

fn detected(rule: &str, bbox: BoundingBox) -> DetectedArea {
    DetectedArea {
        rule_code: rule.to_string(),
        bounding_box: bbox,
        confidence: Some(0.93),
    }
}

/// Actual frames that fully cover both events of TC1, numbered from `base`.
///
/// Event 0 spans event-relative offsets 0..=9 and event 1 sits 19 frames
/// after the case start (02:24 at 9.6 fps), so one contiguous run of frames
/// carrying the right boxes satisfies both groups.
fn matching_frames(base: i64) -> Vec<ActualFrame> {
    let event0 = area_of([156, 503, 331, 786]);
    let event1 = area_of([364, 478, 562, 771]);

    (0..=40)
        .map(|i| ActualFrame {
            frame_id: base + i,
            detected_areas: vec![
                detected("PAR02", if i < 15 { event0 } else { event1 }),
            ],
        })
        .collect()
}

#[test]
fn approve_case_passes_with_offset_numbering() {
    let rows = sheet::parse_rows(GROUND_TRUTH).unwrap();
    let builder = ExpectationBuilder::new(24.0, 2.5);
    let validator = ResultValidator::new(0.5);

    let expectation = builder.build_from_row(&rows[0], "PAR02").unwrap();
    assert_eq!(expectation.expected_frames.len(), 6);

    let report = validator.validate(&expectation, &matching_frames(1000));
    assert_eq!(report.detect_result, DetectResult::Passed);
    assert_eq!(report.total_frames, 6);
    assert_eq!(report.matched_frames, 6);
    assert_eq!(report.accuracy, Some(100.0));
    assert!(report.frame_results.iter().all(|f| f.anchor_found));
}

#[test]
fn anchor_translation_invariance() {
    let rows = sheet::parse_rows(GROUND_TRUTH).unwrap();
    let builder = ExpectationBuilder::new(24.0, 2.5);
    let validator = ResultValidator::new(0.5);
    let expectation = builder.build_from_row(&rows[0], "PAR02").unwrap();

    let report_a = validator.validate(&expectation, &matching_frames(1000));
    let report_b = validator.validate(&expectation, &matching_frames(4321));

    assert_eq!(report_a.accuracy, report_b.accuracy);
    assert_eq!(report_a.matched_frames, report_b.matched_frames);

    // Every resolved absolute frame id shifts by exactly the numbering delta
    let shift = 4321 - 1000;
    for (fa, fb) in report_a.frame_results.iter().zip(&report_b.frame_results) {
        assert_eq!(fa.frame_id + shift, fb.frame_id);
        assert_eq!(fa.matched, fb.matched);
    }
}

#[test]
fn reject_case_passes_only_without_detections() {
    let rows = sheet::parse_rows(GROUND_TRUTH).unwrap();
    let builder = ExpectationBuilder::new(24.0, 2.5);
    let validator = ResultValidator::new(0.5);
    let expectation = builder.build_from_row(&rows[1], "PAR02").unwrap();

    let report = validator.validate(&expectation, &[]);
    assert_eq!(report.detect_result, DetectResult::Passed);
    assert_eq!(report.accuracy, None);

    // A single spurious detection anywhere is a false positive
    let noise = vec![ActualFrame {
        frame_id: 99,
        detected_areas: vec![detected("PAR02", area_of([0, 0, 5, 5]))],
    }];
    let report = validator.validate(&expectation, &noise);
    assert_eq!(report.detect_result, DetectResult::Failed);
    assert_eq!(report.accuracy, None);
    assert_eq!(report.total_frames, 0);
}

#[test]
fn partially_detected_events_score_per_group() {
    let rows = sheet::parse_rows(GROUND_TRUTH).unwrap();
    let builder = ExpectationBuilder::new(24.0, 2.5);
    let validator = ResultValidator::new(0.5);
    let expectation = builder.build_from_row(&rows[0], "PAR02").unwrap();

    // Only the first event's box ever appears: group 0 matches fully, group 1
    // finds no anchor and contributes three failures
    let event0 = area_of([156, 503, 331, 786]);
    let actual: Vec<ActualFrame> = (0..=10)
        .map(|i| ActualFrame {
            frame_id: 500 + i,
            detected_areas: vec![detected("PAR02", event0)],
        })
        .collect();

    let report = validator.validate(&expectation, &actual);
    assert_eq!(report.total_frames, 6);
    assert_eq!(report.matched_frames, 3);
    assert_eq!(report.accuracy, Some(50.0));
    assert_eq!(report.detect_result, DetectResult::Failed);

    for frame in &report.frame_results {
        if frame.expect_id == 0 {
            assert!(frame.anchor_found && frame.matched);
        } else {
            assert!(!frame.anchor_found && !frame.matched);
        }
    }
}

#[test]
fn batch_processor_end_to_end() {
    let rows = sheet::parse_rows(GROUND_TRUTH).unwrap();
    let processor = BatchProcessor::new(&ValidationConfig::default());

    let evidences = vec![detection_validator::api::Evidence {
        video_code: "305948".to_string(),
        payload: detection_validator::api::EvidencePayload {
            frames: matching_frames(2000),
            ..Default::default()
        },
    }];
    let frames_by_video = group_frames_by_video(evidences);

    let summary = processor
        .validate_batch("Linfox_USEPHONE_20260825_100000", "PAR02", &rows, &frames_by_video)
        .unwrap();

    // TC1 passes on full alignment; TC2 (Reject) passes because no evidence
    // exists for its video at all
    assert_eq!(summary.total_testcases, 2);
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.pass_rate, 100.0);
}

#[test]
fn degenerate_ground_truth_never_matches() {
    // Reversed rectangle: negative width/height, IoU can never clear the bar
    let builder = ExpectationBuilder::new(24.0, 2.5);
    let row = sheet::SheetRow {
        test_case_id: "3".to_string(),
        video_name: "v.mp4".to_string(),
        expected_status: "Approve".to_string(),
        event_start_time: "00:00".to_string(),
        event_end_time: "00:01".to_string(),
        expected_result: vec![sheet::DetectionEvent {
            event_start: "00:00".to_string(),
            event_end: "00:01".to_string(),
            area: vec![300, 300, 100, 100],
        }],
        ..Default::default()
    };

    let expectation = builder.build_from_row(&row, "PAR02").unwrap();
    let validator = ResultValidator::new(0.5);

    let actual: Vec<ActualFrame> = (0..20)
        .map(|i| ActualFrame {
            frame_id: i,
            detected_areas: vec![detected("PAR02", area_of([100, 100, 300, 300]))],
        })
        .collect();

    let report = validator.validate(&expectation, &actual);
    assert_eq!(report.matched_frames, 0);
    assert_eq!(report.detect_result, DetectResult::Failed);

    let mut seen = HashMap::new();
    for frame in &report.frame_results {
        *seen.entry(frame.expect_id).or_insert(0) += 1;
    }
    assert_eq!(seen[&0], 3);
}
