//! Detection validator: scores an AI video-detection model against
//! human-authored ground truth.
//!
//! The core is the detection validation engine in [`engine`]: an
//! [`engine::ExpectationBuilder`] projects time-coded expectations onto the
//! detector's frame numbering, and an [`engine::ResultValidator`] discovers
//! anchor frames, aligns expectations, and scores agreement with IoU. Around
//! it sit the ground-truth row types ([`sheet`]), the detection service
//! client ([`api`]), batch orchestration ([`processor`]), and the report
//! sink ([`report`]).

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod processor;
pub mod report;
pub mod sheet;

pub use config::ValidationConfig;
pub use engine::{ExpectationBuilder, ResultValidator, ValidationReport};
pub use error::{Result, ValidationError};
