//! Detection service client: rule configuration, batch analysis triggers,
//! and evidence retrieval with auto-pagination

use super::config::DetectionApiConfig;
use super::models::{Evidence, EvidencePage};
use crate::error::{Result, ValidationError};
use crate::metrics::METRICS;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Detection service client
pub struct DetectionApiClient {
    http: Client,
    config: DetectionApiConfig,
}

impl DetectionApiClient {
    /// Create a new detection service client
    pub fn new(config: DetectionApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ValidationError::RequestFailed(e.to_string()))?;

        Ok(Self { http, config })
    }

    fn with_auth(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => req.header("X-API-Key", key),
            None => req,
        }
    }

    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ValidationError::UpstreamError(format!(
                "Status {}: {}",
                status, error_text
            )));
        }
        Ok(response)
    }

    fn map_send_error(e: reqwest::Error) -> ValidationError {
        if e.is_timeout() {
            ValidationError::Timeout(e.to_string())
        } else {
            ValidationError::RequestFailed(e.to_string())
        }
    }

    /// Push rule configuration to the detection service
    pub async fn update_rule(
        &self,
        rule_code: &str,
        config: &serde_json::Value,
    ) -> Result<serde_json::Value> {
        if self.config.debug {
            return Ok(json!({}));
        }

        let start = Instant::now();
        let url = format!("{}/api/rules/update", self.config.base_url);
        let body = json!({"rule_code": rule_code, "config": config});

        let response = self
            .with_auth(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| {
                METRICS.record_api_request("update_rule", false);
                Self::map_send_error(e)
            })?;
        let response = Self::check_response(response).await.map_err(|e| {
            METRICS.record_api_request("update_rule", false);
            e
        })?;

        let data = response
            .json()
            .await
            .map_err(|e| ValidationError::InvalidResponse(e.to_string()))?;

        METRICS.record_api_request("update_rule", true);
        METRICS
            .api_request_duration
            .with_label_values(&["update_rule"])
            .observe(start.elapsed().as_secs_f64());
        info!("Updated rule: {}", rule_code);
        Ok(data)
    }

    /// Return which of the given videos the service does not have yet
    pub async fn check_missing_videos(&self, filenames: &[String]) -> Result<Vec<String>> {
        let url = format!("{}/api/videos/missing", self.config.base_url);

        let response = self
            .with_auth(self.http.post(&url).json(&json!({"videos": filenames})))
            .send()
            .await
            .map_err(Self::map_send_error)?;
        let response = Self::check_response(response).await?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ValidationError::InvalidResponse(e.to_string()))?;

        let missing = body
            .get("missing_videos")
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(missing)
    }

    /// Trigger analysis of a batch: `{camera_code: [video_codes]}`
    pub async fn analyze_videos(
        &self,
        batch_code: &str,
        videos_config: &HashMap<String, Vec<String>>,
    ) -> Result<()> {
        if self.config.debug {
            return Ok(());
        }

        let url = format!("{}/api/videos/analyze", self.config.base_url);
        let body = json!({"batch_code": batch_code, "videos_config": videos_config});

        let response = self
            .with_auth(self.http.post(&url).json(&body))
            .send()
            .await
            .map_err(|e| {
                METRICS.record_api_request("analyze", false);
                Self::map_send_error(e)
            })?;
        Self::check_response(response).await.map_err(|e| {
            METRICS.record_api_request("analyze", false);
            e
        })?;

        METRICS.record_api_request("analyze", true);
        info!("Started analysis: {}", batch_code);
        Ok(())
    }

    /// Fetch one page of evidences
    pub async fn get_evidences(
        &self,
        batch_code: &str,
        rule_code: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> Result<EvidencePage> {
        let url = format!("{}/api/evidences", self.config.base_url);

        let mut params = vec![
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("batch_code", batch_code.to_string()),
        ];
        if let Some(rule) = rule_code {
            params.push(("rule_code", rule.to_string()));
        }

        debug!("Fetching evidences page {} for batch {}", page, batch_code);

        let response = self
            .with_auth(self.http.get(&url).query(&params))
            .send()
            .await
            .map_err(|e| {
                METRICS.record_api_request("evidences", false);
                Self::map_send_error(e)
            })?;
        let response = Self::check_response(response).await.map_err(|e| {
            METRICS.record_api_request("evidences", false);
            e
        })?;

        let evidence_page: EvidencePage = response
            .json()
            .await
            .map_err(|e| ValidationError::InvalidResponse(e.to_string()))?;

        METRICS.record_api_request("evidences", true);
        Ok(evidence_page)
    }

    /// Fetch every evidence for a batch, paginating until `total` is reached
    pub async fn get_all_evidences(
        &self,
        batch_code: &str,
        rule_code: Option<&str>,
    ) -> Result<Vec<Evidence>> {
        let start = Instant::now();
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let result = self
                .get_evidences(batch_code, rule_code, page, self.config.page_size)
                .await?;

            // An empty page means the listing is exhausted, whatever `total`
            // claims; without this a short listing would loop forever
            if result.data.is_empty() {
                if all.len() < result.total {
                    warn!(
                        "Evidence listing for batch {} ended early: got {} of {}",
                        batch_code,
                        all.len(),
                        result.total
                    );
                }
                break;
            }

            all.extend(result.data);
            if all.len() >= result.total {
                break;
            }
            page += 1;
        }

        METRICS
            .api_request_duration
            .with_label_values(&["evidences"])
            .observe(start.elapsed().as_secs_f64());
        info!("Got {} evidences for batch {}", all.len(), batch_code);
        Ok(all)
    }
}
