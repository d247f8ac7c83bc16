//! Detection validation engine
//!
//! Two collaborating components, consumed sequentially per test case: the
//! [`builder::ExpectationBuilder`] turns one ground-truth row into a
//! frame-indexed expectation, and the [`validator::ResultValidator`] aligns
//! that expectation to the detector's actual frames and scores it.

pub mod builder;
pub mod models;
pub mod validator;

pub use builder::ExpectationBuilder;
pub use models::{
    ActualFrame, BoundingBox, DetectResult, DetectedArea, Expectation, ExpectedFrame,
    ExpectedStatus, FrameResult, MatchDetail, ValidationReport,
};
pub use validator::{calculate_iou, ResultValidator};
