//! CircleCI source adapter
//!
//! Reads the followed-projects list from the v1.1 API, keeps the projects
//! belonging to the configured owner, and takes each project's most recent
//! completed `master` build.

use crate::adapter::{SourceAdapter, SourceData};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsdash_core::{CircleCiConfig, DashError, Result, SourceId, SourceKind, StatusRow};
use serde::Deserialize;

const CIRCLECI_API_URL: &str = "https://circleci.com/api/v1.1";

/// One CircleCI source instance: one configured owner, one panel
pub struct CircleCiSource {
    config: CircleCiConfig,
    owner: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct CircleProject {
    username: String,
    reponame: String,
}

#[derive(Debug, Deserialize)]
struct CircleBuild {
    reponame: String,
    branch: Option<String>,
    status: Option<String>,
    stop_time: Option<DateTime<Utc>>,
}

impl CircleCiSource {
    pub fn new(config: CircleCiConfig, owner: impl Into<String>) -> Self {
        Self {
            config,
            owner: owner.into(),
            client: reqwest::Client::new(),
        }
    }

    /// List followed projects, filtered to this owner
    async fn list_projects(&self) -> Result<Vec<CircleProject>> {
        let url = format!(
            "{}/projects?circle-token={}",
            CIRCLECI_API_URL, self.config.token
        );
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| DashError::Fetch(format!("listing circleci projects: {}", e)))?;

        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "listing circleci projects: HTTP {}",
                response.status()
            )));
        }

        let projects: Vec<CircleProject> = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("circleci projects response: {}", e)))?;

        Ok(projects
            .into_iter()
            .filter(|p| p.username == self.owner)
            .collect())
    }

    /// Most recent master build for one project. `None` when the project has
    /// no builds yet (or the branch 404s).
    async fn recent_master_build(&self, project: &CircleProject) -> Result<Option<CircleBuild>> {
        let url = format!(
            "{}/project/github/{}/{}/tree/master?circle-token={}&limit=1",
            CIRCLECI_API_URL, project.username, project.reponame, self.config.token
        );
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                DashError::Fetch(format!("circleci builds for {}: {}", project.reponame, e))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "circleci builds for {}: HTTP {}",
                project.reponame,
                response.status()
            )));
        }

        let mut builds: Vec<CircleBuild> = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("circleci builds response: {}", e)))?;

        Ok(if builds.is_empty() {
            None
        } else {
            Some(builds.remove(0))
        })
    }
}

/// Map one build to a status row
fn build_to_row(build: &CircleBuild) -> StatusRow {
    StatusRow::new(
        &build.reponame,
        build.branch.as_deref().unwrap_or("master"),
        build.status.clone().unwrap_or_default(),
        build.stop_time,
    )
}

#[async_trait]
impl SourceAdapter for CircleCiSource {
    fn id(&self) -> SourceId {
        SourceId::new(SourceKind::CircleCi, &self.owner)
    }

    fn title(&self) -> String {
        format!("CircleCI builds for {}", self.owner)
    }

    fn enabled(&self) -> bool {
        self.config.enabled()
    }

    async fn fetch(&self) -> Result<SourceData> {
        let projects = self.list_projects().await?;
        tracing::debug!(
            "circleci: checking {} projects for {}",
            projects.len(),
            self.owner
        );

        let mut rows = Vec::new();
        for project in &projects {
            match self.recent_master_build(project).await {
                Ok(Some(build)) => rows.push(build_to_row(&build)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("circleci: skipping {}: {}", project.reponame, e);
                    continue;
                }
            }
        }

        Ok(SourceData::rows(rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_core::Severity;

    #[test]
    fn test_build_to_row_fixed_state() {
        let build: CircleBuild = serde_json::from_value(serde_json::json!({
            "reponame": "dotfiles",
            "branch": "master",
            "status": "fixed",
            "stop_time": "2018-03-05T21:12:23Z"
        }))
        .expect("parse");

        let row = build_to_row(&build);
        assert_eq!(row.label, "dotfiles");
        assert_eq!(row.severity, Severity::Ok);
        assert!(row.just_fixed);
    }

    #[test]
    fn test_build_to_row_missing_status() {
        let build: CircleBuild = serde_json::from_value(serde_json::json!({
            "reponame": "dotfiles",
            "branch": null,
            "status": null,
            "stop_time": null
        }))
        .expect("parse");

        let row = build_to_row(&build);
        assert_eq!(row.state, "RUNNING");
        assert_eq!(row.sub_label, "master");
    }

    #[test]
    fn test_disabled_without_owners() {
        let config = CircleCiConfig {
            token: "token".to_string(),
            owners: vec![],
        };
        let source = CircleCiSource::new(config, "jessfraz");
        assert!(!source.enabled());
    }
}
