//! Batch validation run driven by environment variables
//!
//! Reads a ground-truth sheet export (JSON), fetches the batch's evidences
//! from the detection service, validates every test case, and writes JSON
//! and HTML reports under `RESULTS_DIR`.

use anyhow::Context;
use detection_validator::api::{DetectionApiClient, DetectionApiConfig};
use detection_validator::processor::{gen_timestamp, generate_batch_code, BatchProcessor, TestRule};
use detection_validator::report::ResultWriter;
use detection_validator::{sheet, ValidationConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let rule = TestRule {
        tenant_name: std::env::var("TENANT_NAME").unwrap_or_else(|_| "default".to_string()),
        rule_name: std::env::var("RULE_NAME").unwrap_or_else(|_| "USEPHONE".to_string()),
        rule_code: std::env::var("RULE_CODE").unwrap_or_else(|_| "PAR02".to_string()),
    };

    let ground_truth_path =
        std::env::var("GROUND_TRUTH_PATH").unwrap_or_else(|_| "ground_truth.json".to_string());
    let rows = sheet::parse_rows(
        &std::fs::read_to_string(&ground_truth_path)
            .with_context(|| format!("reading ground truth from {}", ground_truth_path))?,
    )?;
    info!("Loaded {} ground-truth rows from {}", rows.len(), ground_truth_path);

    let validation_config = ValidationConfig::default().from_env();
    let api_config = DetectionApiConfig::default().from_env();
    let client = DetectionApiClient::new(api_config)?;
    let processor = BatchProcessor::new(&validation_config);

    let timestamp = gen_timestamp();
    let batch_code = std::env::var("BATCH_CODE")
        .unwrap_or_else(|_| generate_batch_code(&rule.tenant_name, &rule.rule_name, &timestamp));

    let summary = processor
        .run_rule(&client, &batch_code, &rule, &rows)
        .await?;

    let results_dir = std::env::var("RESULTS_DIR").unwrap_or_else(|_| "results".to_string());
    let mut writer = ResultWriter::new(results_dir);
    writer.add_result(&batch_code, &rule.rule_code, summary);
    writer.save_all(&timestamp)?;
    writer.save_html_reports()?;

    Ok(())
}
