//! Evidence wire types for the detection service

use crate::engine::models::ActualFrame;
use serde::{Deserialize, Serialize};

/// One evidence record: all detections the model produced for one video
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evidence {
    #[serde(default)]
    pub video_code: String,
    #[serde(default)]
    pub payload: EvidencePayload,
}

/// Evidence payload: per-frame detections plus source metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidencePayload {
    #[serde(default)]
    pub frames: Vec<ActualFrame>,
    #[serde(rename = "videoMetadata", default)]
    pub video_metadata: VideoMetadata,
}

/// Source video metadata attached to an evidence record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoMetadata {
    #[serde(default)]
    pub filename: String,
}

/// One page of the evidences listing
#[derive(Debug, Clone, Deserialize)]
pub struct EvidencePage {
    #[serde(default)]
    pub data: Vec<Evidence>,
    #[serde(default)]
    pub total: usize,
}
