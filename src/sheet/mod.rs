//! Ground-truth rows as exported from the test-case sheet
//!
//! The sheet export keeps its literal header names (`TC`, `Video Name`,
//! `Expected Status`, ...); serde renames map them onto typed fields here so
//! nothing downstream touches dynamic keys. Field presence is checked once,
//! at the expectation-builder boundary.

use crate::error::{Result, ValidationError};
use serde::{Deserialize, Serialize};

/// One human-authored detection event within a test case
///
/// `area` is `[x1, y1, x2, y2]`; any other length is a ground-truth
/// authoring error. An empty list means the event carries no area and is
/// skipped by the builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionEvent {
    #[serde(rename = "eventStart", default)]
    pub event_start: String,
    #[serde(rename = "eventEnd", default)]
    pub event_end: String,
    #[serde(default)]
    pub area: Vec<i64>,
}

/// One test-case row from the ground-truth sheet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetRow {
    #[serde(rename = "TC", default)]
    pub test_case_id: String,
    #[serde(rename = "Video Name", default)]
    pub video_name: String,
    #[serde(rename = "Test Case Description", default)]
    pub test_case_description: String,
    #[serde(rename = "Camera Name", default)]
    pub camera_name: String,
    #[serde(rename = "Expected Status", default)]
    pub expected_status: String,
    #[serde(rename = "EventStartTime", default)]
    pub event_start_time: String,
    #[serde(rename = "EventEndTime", default)]
    pub event_end_time: String,
    #[serde(rename = "ExpectedResult", default)]
    pub expected_result: Vec<DetectionEvent>,
}

impl SheetRow {
    /// Check required fields; a missing one is a test-infrastructure error,
    /// never a model FAIL
    pub fn validate(&self) -> Result<()> {
        if self.test_case_id.trim().is_empty() {
            return Err(ValidationError::MissingField("TC"));
        }
        if self.video_name.trim().is_empty() {
            return Err(ValidationError::MissingField("Video Name"));
        }
        if self.expected_status.trim().is_empty() {
            return Err(ValidationError::MissingField("Expected Status"));
        }
        Ok(())
    }
}

/// Parse a sheet export (JSON array of rows)
pub fn parse_rows(json: &str) -> Result<Vec<SheetRow>> {
    let rows: Vec<SheetRow> = serde_json::from_str(json)?;
    Ok(rows)
}
