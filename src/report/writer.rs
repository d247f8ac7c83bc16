//! Accumulates per-rule run summaries and writes them to disk

use crate::error::Result;
use crate::processor::RuleRunSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything one validation session produced
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AllResults {
    /// Rule code -> run status
    pub summary: BTreeMap<String, String>,
    /// Batch code -> full run report
    pub details: BTreeMap<String, RuleRunSummary>,
}

/// Writes session results as pretty-printed JSON and HTML
pub struct ResultWriter {
    results_dir: PathBuf,
    all_results: AllResults,
}

impl ResultWriter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            all_results: AllResults::default(),
        }
    }

    /// Record one rule's run
    pub fn add_result(&mut self, batch_code: &str, rule_code: &str, summary: RuleRunSummary) {
        self.all_results
            .summary
            .insert(rule_code.to_string(), summary.status.clone());
        self.all_results
            .details
            .insert(batch_code.to_string(), summary);
    }

    pub fn results(&self) -> &AllResults {
        &self.all_results
    }

    /// Write all results to `test_results_{session}.json`
    pub fn save_all(&self, session_name: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.results_dir)?;

        let filepath = self
            .results_dir
            .join(format!("test_results_{}.json", session_name));
        let json = serde_json::to_string_pretty(&self.all_results)?;
        std::fs::write(&filepath, json)?;
        info!("All results saved: {}", filepath.display());

        self.log_summary();
        Ok(filepath)
    }

    /// Write rendered summary and detail HTML next to the JSON
    pub fn save_html_reports(&self) -> Result<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(&self.results_dir)?;

        let summary_path = self.results_dir.join("summary.html");
        std::fs::write(&summary_path, super::html::render_summary(&self.all_results))?;
        info!("Summary report generated: {}", summary_path.display());

        let detail_path = self.results_dir.join("details.html");
        std::fs::write(&detail_path, super::html::render_details(&self.all_results))?;
        info!("Detailed report generated: {}", detail_path.display());

        Ok((summary_path, detail_path))
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    fn log_summary(&self) {
        info!("{}", "=".repeat(60));
        info!("TEST SUMMARY");
        info!("{}", "=".repeat(60));
        for (rule_code, status) in &self.all_results.summary {
            info!("{}: {}", rule_code, status.to_uppercase());
        }
    }
}
