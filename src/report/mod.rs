//! Report sink: JSON results file plus rendered HTML summaries

pub mod html;
pub mod writer;

pub use writer::{AllResults, ResultWriter};
