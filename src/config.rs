//! Engine configuration

use serde::{Deserialize, Serialize};

/// Validation engine configuration
///
/// Ground truth is authored in wall-clock time against the original video;
/// the system under test observes a re-encoded, time-compressed copy. All
/// time-to-frame conversions use the effective sampling rate
/// `original_fps / compression_ratio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Original video FPS
    #[serde(default = "default_fps")]
    pub original_fps: f64,

    /// Playback speed-up of the copy the detector sees (e.g. 2.5x)
    #[serde(default = "default_compression_ratio")]
    pub compression_ratio: f64,

    /// Minimum IoU for an expected area to count as matched
    #[serde(default = "default_iou_threshold")]
    pub iou_threshold: f64,
}

fn default_fps() -> f64 {
    24.0
}

fn default_compression_ratio() -> f64 {
    2.5
}

fn default_iou_threshold() -> f64 {
    0.5
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            original_fps: default_fps(),
            compression_ratio: default_compression_ratio(),
            iou_threshold: default_iou_threshold(),
        }
    }
}

impl ValidationConfig {
    /// Load configuration from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("VALIDATION_FPS") {
            if let Ok(fps) = val.parse() {
                self.original_fps = fps;
            }
        }

        if let Ok(val) = std::env::var("VALIDATION_COMPRESSION_RATIO") {
            if let Ok(ratio) = val.parse() {
                self.compression_ratio = ratio;
            }
        }

        if let Ok(val) = std::env::var("VALIDATION_IOU_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                self.iou_threshold = threshold;
            }
        }

        self
    }

    /// Effective frame sampling rate in frames per second
    pub fn frame_rate(&self) -> f64 {
        self.original_fps / self.compression_ratio
    }
}
