//! Jenkins source adapter
//!
//! One `api/json` call with a `tree` filter pulls every job's last build in a
//! single round trip. A job whose last build has no result yet is shown as
//! `RUNNING`.

use crate::adapter::{SourceAdapter, SourceData};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use opsdash_core::{DashError, JenkinsConfig, Result, SourceId, SourceKind, StatusRow};
use serde::Deserialize;

const JOBS_TREE_QUERY: &str = "jobs[name,displayName,lastBuild[number,building,result,timestamp]]";

/// One Jenkins source instance: one base URI, one panel
pub struct JenkinsSource {
    config: JenkinsConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct JenkinsRoot {
    #[serde(default)]
    jobs: Vec<JenkinsJob>,
}

#[derive(Debug, Deserialize)]
struct JenkinsJob {
    name: String,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
    #[serde(rename = "lastBuild")]
    last_build: Option<JenkinsBuild>,
}

#[derive(Debug, Deserialize)]
struct JenkinsBuild {
    result: Option<String>,
    /// Build start time, milliseconds since epoch
    timestamp: Option<i64>,
}

impl JenkinsSource {
    pub fn new(config: JenkinsConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

/// Map the jobs listing to status rows, one per job with at least one build
fn jobs_to_rows(root: &JenkinsRoot) -> Vec<StatusRow> {
    let mut rows = Vec::new();
    for job in &root.jobs {
        let Some(build) = &job.last_build else {
            // Never built; nothing to report
            continue;
        };

        // An empty result while the build is in flight normalizes to RUNNING.
        let state = build.result.clone().unwrap_or_default();
        let finished_at = build
            .timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

        let label = job.display_name.clone().unwrap_or_else(|| job.name.clone());
        rows.push(StatusRow::new(label, "", state, finished_at));
    }
    rows
}

#[async_trait]
impl SourceAdapter for JenkinsSource {
    fn id(&self) -> SourceId {
        SourceId::new(SourceKind::Jenkins, &self.config.base_uri)
    }

    fn title(&self) -> String {
        format!("Jenkins builds for {}", self.config.base_uri)
    }

    fn enabled(&self) -> bool {
        self.config.enabled()
    }

    async fn fetch(&self) -> Result<SourceData> {
        let url = format!(
            "{}/api/json?tree={}",
            self.config.base_uri.trim_end_matches('/'),
            JOBS_TREE_QUERY
        );
        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
            .map_err(|e| DashError::Fetch(format!("jenkins jobs: {}", e)))?;

        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "jenkins jobs: HTTP {}",
                response.status()
            )));
        }

        let root: JenkinsRoot = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("jenkins jobs response: {}", e)))?;

        Ok(SourceData::rows(jobs_to_rows(&root)))
    }
}
