//! Detection service client

pub mod client;
pub mod config;
pub mod models;

pub use client::DetectionApiClient;
pub use config::DetectionApiConfig;
pub use models::{Evidence, EvidencePage, EvidencePayload, VideoMetadata};
