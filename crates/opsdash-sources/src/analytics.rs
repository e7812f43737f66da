//! Google Analytics source adapter
//!
//! Pulls a top-pages-by-sessions report (Reporting API v4) and the realtime
//! active-users count (v3 realtime endpoint) for one view. Token minting is
//! delegated to external tooling: the keyfile carries the OAuth bearer token,
//! so a missing keyfile means the source is disabled, never an error.

use crate::adapter::{SourceAdapter, SourceData};
use async_trait::async_trait;
use opsdash_core::{AnalyticsConfig, DashError, Result, SourceId, SourceKind, StatusRow};
use serde::Deserialize;
use std::path::PathBuf;

const REPORTING_API_URL: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";
const REALTIME_API_URL: &str = "https://www.googleapis.com/analytics/v3/data/realtime";
const MAX_REPORT_ROWS: usize = 10;

/// One analytics source instance: one view ID, one panel
pub struct AnalyticsSource {
    config: AnalyticsConfig,
    view_id: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct Keyfile {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ReportResponse {
    #[serde(default)]
    reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
struct Report {
    data: ReportData,
}

#[derive(Debug, Default, Deserialize)]
struct ReportData {
    #[serde(default)]
    rows: Vec<ReportRow>,
}

#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(default)]
    dimensions: Vec<String>,
    #[serde(default)]
    metrics: Vec<MetricValues>,
}

#[derive(Debug, Deserialize)]
struct MetricValues {
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RealtimeResponse {
    #[serde(rename = "totalsForAllResults", default)]
    totals: std::collections::HashMap<String, String>,
}

impl AnalyticsSource {
    pub fn new(config: AnalyticsConfig, view_id: impl Into<String>) -> Self {
        Self {
            config,
            view_id: view_id.into(),
            client: reqwest::Client::new(),
        }
    }

    fn keyfile_path(&self) -> Option<&PathBuf> {
        self.config.keyfile.as_ref()
    }

    async fn bearer_token(&self) -> Result<String> {
        let path = self
            .keyfile_path()
            .ok_or_else(|| DashError::ConfigMissing("analytics keyfile".to_string()))?;
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DashError::ConfigMissing(format!("analytics keyfile {}: {}", path.display(), e))
        })?;
        let keyfile: Keyfile = serde_json::from_str(&content)
            .map_err(|e| DashError::Malformed(format!("analytics keyfile: {}", e)))?;
        Ok(keyfile.access_token)
    }

    /// Top pages by sessions over the last week, fixed row cap
    async fn get_report(&self, token: &str) -> Result<ReportData> {
        let body = serde_json::json!({
            "reportRequests": [{
                "viewId": self.view_id,
                "dateRanges": [{ "startDate": "7daysAgo", "endDate": "today" }],
                "dimensions": [{ "name": "ga:pagePath" }],
                "metrics": [{ "expression": "ga:sessions" }],
                "orderBys": [{ "fieldName": "ga:sessions", "sortOrder": "DESCENDING" }],
                "pageSize": MAX_REPORT_ROWS,
            }]
        });

        let response = self
            .client
            .post(REPORTING_API_URL)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DashError::Fetch(format!("analytics report for {}: {}", self.view_id, e)))?;

        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "analytics report for {}: HTTP {}",
                self.view_id,
                response.status()
            )));
        }

        let mut parsed: ReportResponse = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("analytics report response: {}", e)))?;

        if parsed.reports.is_empty() {
            return Ok(ReportData::default());
        }
        Ok(parsed.reports.remove(0).data)
    }

    /// Realtime active-users count for the view
    async fn get_realtime_active_users(&self, token: &str) -> Result<String> {
        let url = format!(
            "{}?ids=ga:{}&metrics=rt:activeUsers",
            REALTIME_API_URL, self.view_id
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                DashError::Fetch(format!("analytics realtime for {}: {}", self.view_id, e))
            })?;

        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "analytics realtime for {}: HTTP {}",
                self.view_id,
                response.status()
            )));
        }

        let parsed: RealtimeResponse = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("analytics realtime response: {}", e)))?;

        Ok(parsed
            .totals
            .get("rt:activeUsers")
            .cloned()
            .unwrap_or_else(|| "0".to_string()))
    }
}

/// Map report rows to status rows. Rows missing a dimension or metric value
/// are skipped with a warning, never fatal to the cycle.
fn report_to_rows(data: &ReportData) -> Vec<StatusRow> {
    let mut rows = Vec::new();
    for row in data.rows.iter().take(MAX_REPORT_ROWS) {
        let Some(page) = row.dimensions.first() else {
            tracing::warn!("analytics: report row without dimensions, skipping");
            continue;
        };
        let Some(sessions) = row.metrics.first().and_then(|m| m.values.first()) else {
            tracing::warn!("analytics: report row without metric values, skipping");
            continue;
        };
        rows.push(StatusRow::new(page, "sessions", sessions, None));
    }
    rows
}

#[async_trait]
impl SourceAdapter for AnalyticsSource {
    fn id(&self) -> SourceId {
        SourceId::new(SourceKind::Analytics, &self.view_id)
    }

    fn title(&self) -> String {
        format!("Google Analytics data for {}", self.view_id)
    }

    /// Disabled unless the keyfile is configured AND actually on disk
    fn enabled(&self) -> bool {
        self.config.enabled()
            && self
                .keyfile_path()
                .map(|p| p.exists())
                .unwrap_or(false)
    }

    async fn fetch(&self) -> Result<SourceData> {
        let token = self.bearer_token().await?;
        let report = self.get_report(&token).await?;
        let active_users = self.get_realtime_active_users(&token).await?;

        Ok(SourceData {
            rows: report_to_rows(&report),
            active_users: Some(active_users),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_core::Severity;

    #[test]
    fn test_report_to_rows() {
        let data: ReportData = serde_json::from_value(serde_json::json!({
            "rows": [
                { "dimensions": ["/blog/post"], "metrics": [{ "values": ["412"] }] },
                { "dimensions": ["/"], "metrics": [{ "values": ["305"] }] }
            ]
        }))
        .expect("parse");

        let rows = report_to_rows(&data);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "/blog/post");
        assert_eq!(rows[0].sub_label, "sessions");
        assert_eq!(rows[0].state, "412");
        // Metric values are "other non-empty state" and stay visible by default
        assert_eq!(rows[0].severity, Severity::Warning);
    }

    #[test]
    fn test_malformed_report_row_skipped() {
        let data: ReportData = serde_json::from_value(serde_json::json!({
            "rows": [
                { "dimensions": [], "metrics": [] },
                { "dimensions": ["/ok"], "metrics": [{ "values": ["9"] }] }
            ]
        }))
        .expect("parse");

        let rows = report_to_rows(&data);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "/ok");
    }

    #[test]
    fn test_report_rows_capped() {
        let many: Vec<_> = (0..25)
            .map(|i| {
                serde_json::json!({
                    "dimensions": [format!("/page-{}", i)],
                    "metrics": [{ "values": ["1"] }]
                })
            })
            .collect();
        let data: ReportData =
            serde_json::from_value(serde_json::json!({ "rows": many })).expect("parse");
        assert_eq!(report_to_rows(&data).len(), MAX_REPORT_ROWS);
    }

    #[test]
    fn test_missing_keyfile_disables_source() {
        let config = AnalyticsConfig {
            keyfile: Some(PathBuf::from("/nonexistent/ga.json")),
            view_ids: vec!["12345".to_string()],
        };
        let source = AnalyticsSource::new(config, "12345");
        assert!(!source.enabled());
    }

    #[test]
    fn test_present_keyfile_enables_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let keyfile = dir.path().join("ga.json");
        std::fs::write(&keyfile, r#"{"access_token":"tok"}"#).expect("write");

        let config = AnalyticsConfig {
            keyfile: Some(keyfile),
            view_ids: vec!["12345".to_string()],
        };
        let source = AnalyticsSource::new(config, "12345");
        assert!(source.enabled());
    }
}
