//! Expectation builder: ground-truth rows to frame-indexed expectations
//!
//! Pure offset computation only. The detector's frame zero is unknown at
//! build time; resolving offsets against actual data is the validator's job.

use super::models::{BoundingBox, DetectedArea, Expectation, ExpectedFrame, ExpectedStatus};
use crate::config::ValidationConfig;
use crate::error::{Result, ValidationError};
use crate::sheet::{DetectionEvent, SheetRow};

/// Builds frame-indexed expectations from ground-truth rows
#[derive(Debug, Clone)]
pub struct ExpectationBuilder {
    frame_rate: f64,
}

impl ExpectationBuilder {
    /// `original_fps` over `compression_ratio` gives the effective sampling
    /// rate, e.g. 24 / 2.5 = 9.6 frames per wall-clock second
    pub fn new(original_fps: f64, compression_ratio: f64) -> Self {
        Self {
            frame_rate: original_fps / compression_ratio,
        }
    }

    pub fn from_config(config: &ValidationConfig) -> Self {
        Self {
            frame_rate: config.frame_rate(),
        }
    }

    /// Parse an `MM:SS` time mark into seconds; an absent mark is 0
    pub fn time_to_seconds(time_mark: &str) -> Result<i64> {
        if time_mark.is_empty() {
            return Ok(0);
        }
        let mut parts = time_mark.split(':');
        let minutes = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|m| *m >= 0);
        let seconds = parts
            .next()
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|s| *s >= 0);
        match (minutes, seconds) {
            (Some(m), Some(s)) => Ok(m * 60 + s),
            _ => Err(ValidationError::InvalidTimeMark(time_mark.to_string())),
        }
    }

    /// Frame offset of `event_time` relative to `reference_time`
    ///
    /// A reference later than the event yields a negative offset; that is a
    /// ground-truth data-quality issue, not checked here.
    fn relative_frame_offset(&self, event_time: &str, reference_time: &str) -> Result<i64> {
        let event_secs = Self::time_to_seconds(event_time)?;
        let reference_secs = Self::time_to_seconds(reference_time)?;
        let elapsed = (event_secs - reference_secs) as f64;
        Ok((elapsed * self.frame_rate) as i64)
    }

    fn area_to_bounding_box(area: &[i64]) -> Result<BoundingBox> {
        let area: [i64; 4] = area
            .try_into()
            .map_err(|_| ValidationError::InvalidArea(area.len()))?;
        Ok(BoundingBox::from_area(area))
    }

    /// Expand detection events into expected frames with relative offsets
    ///
    /// Each event samples exactly three frames (start, floor midpoint, end),
    /// tagged with the event index as `expect_id`. Two zero-points per frame:
    /// `frame_id` counts from the test case's `event_start_time` (sort order
    /// only), `offset_frame` from the event's own start (anchor-relative).
    pub fn build_expected_frames(
        &self,
        events: &[DetectionEvent],
        event_start_time: &str,
        rule_code: &str,
    ) -> Result<Vec<ExpectedFrame>> {
        let mut frames = Vec::new();

        for (index, event) in events.iter().enumerate() {
            if event.event_start.is_empty() || event.event_end.is_empty() || event.area.is_empty() {
                continue;
            }

            let start_offset = self.relative_frame_offset(&event.event_start, event_start_time)?;
            let end_offset = self.relative_frame_offset(&event.event_end, event_start_time)?;

            let start_offset_frame =
                self.relative_frame_offset(&event.event_start, &event.event_start)?;
            let end_offset_frame =
                self.relative_frame_offset(&event.event_end, &event.event_start)?;

            let middle_offset = (start_offset + end_offset).div_euclid(2);
            let middle_offset_frame = (start_offset_frame + end_offset_frame).div_euclid(2);

            let bbox = Self::area_to_bounding_box(&event.area)?;

            let offset_pairs = [
                (start_offset, start_offset_frame),
                (middle_offset, middle_offset_frame),
                (end_offset, end_offset_frame),
            ];

            for (frame_id, offset_frame) in offset_pairs {
                frames.push(ExpectedFrame {
                    frame_id,
                    offset_frame,
                    expect_id: index,
                    detected_areas: vec![DetectedArea::expected(rule_code, bbox)],
                });
            }
        }

        frames.sort_by_key(|f| f.frame_id);

        Ok(frames)
    }

    /// Build the expectation for one test-case row
    pub fn build_from_row(&self, row: &SheetRow, rule_code: &str) -> Result<Expectation> {
        row.validate()?;

        let expected_status = ExpectedStatus::parse(&row.expected_status)
            .ok_or_else(|| ValidationError::InvalidStatus(row.expected_status.clone()))?;

        let expected_frames =
            self.build_expected_frames(&row.expected_result, &row.event_start_time, rule_code)?;

        Ok(Expectation {
            video_name: row.video_name.clone(),
            test_case_id: row.test_case_id.clone(),
            test_case_description: row.test_case_description.clone(),
            expected_status,
            expected_frames,
            should_validate: true,
        })
    }
}
