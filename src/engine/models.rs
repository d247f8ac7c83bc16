//! Data model for the detection validation engine
//!
//! Field names follow the detection service's wire format (`frameId`,
//! `detectedAreas`, `ruleCode`, ...) so reports serialize exactly as the
//! downstream JSON and HTML renderers expect them.

use serde::{Deserialize, Serialize};

/// Bounding box in pixels, origin top-left
///
/// Width and height may be zero or negative: ground-truth areas are taken
/// as authored, and a reversed rectangle simply never matches anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl BoundingBox {
    /// Convert a ground-truth area `[x1, y1, x2, y2]` to xywh form
    pub fn from_area(area: [i64; 4]) -> Self {
        let [x1, y1, x2, y2] = area;
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

/// Expected detection status for a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpectedStatus {
    Approve,
    Reject,
}

impl ExpectedStatus {
    /// Parse a sheet cell value, tolerating case and surrounding whitespace
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "approve" => Some(Self::Approve),
            "reject" => Some(Self::Reject),
            _ => None,
        }
    }
}

/// One detected area, expected or actual
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedArea {
    #[serde(rename = "ruleCode")]
    pub rule_code: String,
    #[serde(rename = "boundingBox")]
    pub bounding_box: BoundingBox,
    /// Detector confidence; only present on actual areas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl DetectedArea {
    pub fn expected(rule_code: impl Into<String>, bounding_box: BoundingBox) -> Self {
        Self {
            rule_code: rule_code.into(),
            bounding_box,
            confidence: None,
        }
    }
}

/// One frame of expected detections
///
/// Both ids are offsets, not absolute frame numbers: `frame_id` is relative
/// to the test case's overall `EventStartTime` (sort ordering only), while
/// `offset_frame` is relative to the originating detection event's own start
/// and is added to the discovered anchor frame during validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedFrame {
    #[serde(rename = "frameId")]
    pub frame_id: i64,
    pub offset_frame: i64,
    pub expect_id: usize,
    #[serde(rename = "detectedAreas")]
    pub detected_areas: Vec<DetectedArea>,
}

/// Frame-indexed expectation for one test case, built from one sheet row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expectation {
    pub video_name: String,
    pub test_case_id: String,
    pub test_case_description: String,
    pub expected_status: ExpectedStatus,
    /// Relative frame offsets, grouped by `expect_id`
    pub expected_frames: Vec<ExpectedFrame>,
    pub should_validate: bool,
}

/// One frame of actual detections as emitted by the detection service
///
/// `frame_id` is absolute in the detector's own numbering, which has no
/// guaranteed relationship to ground-truth numbering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualFrame {
    #[serde(rename = "frameId")]
    pub frame_id: i64,
    #[serde(rename = "detectedAreas", default)]
    pub detected_areas: Vec<DetectedArea>,
}

/// Comparison outcome for one expected area within a frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDetail {
    pub expected: DetectedArea,
    /// Best-IoU actual area with the same rule code, if any overlapped
    pub actual: Option<DetectedArea>,
    pub iou: f64,
    pub matched: bool,
}

/// Outcome for one expected frame after anchoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameResult {
    /// Resolved absolute frame id (anchor + offset_frame)
    #[serde(rename = "frameId")]
    pub frame_id: i64,
    pub expect_id: usize,
    pub offset_frame: i64,
    /// False when the group's anchor search failed and fell back to 0;
    /// lets reports tell "never matched" apart from "matched at an
    /// implausible offset"
    pub anchor_found: bool,
    pub matched: bool,
    pub details: Vec<MatchDetail>,
}

/// Test case classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetectResult {
    Passed,
    Failed,
}

/// Scored validation outcome for one test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub video_name: String,
    pub test_case_id: String,
    pub test_case_description: String,
    pub expected_status: ExpectedStatus,
    pub total_frames: usize,
    pub matched_frames: usize,
    /// Percentage, rounded to 2 decimals; `None` only on the Reject path
    pub accuracy: Option<f64>,
    pub detect_result: DetectResult,
    pub validation_note: String,
    pub frame_results: Vec<FrameResult>,
}
