//! Travis CI source adapter
//!
//! Lists the owner's source repositories from GitHub (forks skipped), then
//! asks the Travis v3 API for the `master` branch build state of each. Repos
//! without a Travis configuration come back 404 and are skipped silently.

use crate::adapter::{SourceAdapter, SourceData};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use opsdash_core::{DashError, Result, SourceId, SourceKind, StatusRow, TravisConfig};
use serde::Deserialize;

const GITHUB_API_URL: &str = "https://api.github.com";
const TRAVIS_API_URL: &str = "https://api.travis-ci.org";
const TRAVIS_API_VERSION: &str = "3";
const REPOS_PER_PAGE: usize = 100;
const MAX_REPO_PAGES: usize = 10;

/// One Travis source instance: one configured owner, one panel
pub struct TravisSource {
    config: TravisConfig,
    owner: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct GithubRepo {
    full_name: String,
    fork: bool,
}

#[derive(Debug, Deserialize)]
struct TravisBranch {
    last_build: Option<TravisBuild>,
}

#[derive(Debug, Deserialize)]
struct TravisBuild {
    state: Option<String>,
    finished_at: Option<DateTime<Utc>>,
}

impl TravisSource {
    pub fn new(config: TravisConfig, owner: impl Into<String>) -> Self {
        Self {
            config,
            owner: owner.into(),
            client: reqwest::Client::new(),
        }
    }

    /// List the owner's non-fork repositories, exhausting pagination
    async fn list_repos(&self) -> Result<Vec<GithubRepo>> {
        let mut repos = Vec::new();

        for page in 1..=MAX_REPO_PAGES {
            let url = format!(
                "{}/users/{}/repos?per_page={}&page={}&type=sources",
                GITHUB_API_URL, self.owner, REPOS_PER_PAGE, page
            );
            let response = self
                .client
                .get(&url)
                .header("User-Agent", "opsdash")
                .send()
                .await
                .map_err(|e| DashError::Fetch(format!("listing repos for {}: {}", self.owner, e)))?;

            if !response.status().is_success() {
                return Err(DashError::Fetch(format!(
                    "listing repos for {}: HTTP {}",
                    self.owner,
                    response.status()
                )));
            }

            let page_repos: Vec<GithubRepo> = response
                .json()
                .await
                .map_err(|e| DashError::Malformed(format!("github repos response: {}", e)))?;

            let last_page = page_repos.len() < REPOS_PER_PAGE;
            repos.extend(page_repos.into_iter().filter(|r| !r.fork));
            if last_page {
                break;
            }
        }

        Ok(repos)
    }

    /// Get the master branch build state for one repo. `None` means the repo
    /// has no Travis builds (404 upstream).
    async fn master_branch(&self, slug: &str) -> Result<Option<TravisBranch>> {
        let url = format!(
            "{}/repo/{}/branch/master",
            TRAVIS_API_URL,
            urlencoding::encode(slug)
        );
        let response = self
            .client
            .get(&url)
            .header("Travis-API-Version", TRAVIS_API_VERSION)
            .header("Authorization", format!("token {}", self.config.token))
            .header("User-Agent", "opsdash")
            .send()
            .await
            .map_err(|e| DashError::Fetch(format!("travis branch for {}: {}", slug, e)))?;

        // Repos without a travis config 404 here; treat as empty, not fatal.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(DashError::Fetch(format!(
                "travis branch for {}: HTTP {}",
                slug,
                response.status()
            )));
        }

        let branch: TravisBranch = response
            .json()
            .await
            .map_err(|e| DashError::Malformed(format!("travis branch response: {}", e)))?;
        Ok(Some(branch))
    }
}

/// Map one repo's branch state to a status row
fn branch_to_row(slug: &str, branch: &TravisBranch) -> Option<StatusRow> {
    let build = branch.last_build.as_ref()?;
    let state = build.state.clone().unwrap_or_default();
    Some(StatusRow::new(slug, "master", state, build.finished_at))
}

#[async_trait]
impl SourceAdapter for TravisSource {
    fn id(&self) -> SourceId {
        SourceId::new(SourceKind::Travis, &self.owner)
    }

    fn title(&self) -> String {
        format!("Travis builds for {}", self.owner)
    }

    fn enabled(&self) -> bool {
        self.config.enabled()
    }

    async fn fetch(&self) -> Result<SourceData> {
        let repos = self.list_repos().await?;
        tracing::debug!("travis: checking {} repos for {}", repos.len(), self.owner);

        let mut rows = Vec::new();
        for repo in &repos {
            match self.master_branch(&repo.full_name).await {
                Ok(Some(branch)) => {
                    if let Some(row) = branch_to_row(&repo.full_name, &branch) {
                        rows.push(row);
                    }
                }
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!("travis: skipping {}: {}", repo.full_name, e);
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
    fn test_branch_to_row_maps_state() {
        let branch: TravisBranch = serde_json::from_value(serde_json::json!({
            "last_build": {
                "state": "failed",
                "finished_at": "2018-03-05T21:12:23Z"
            }
        }))
        .expect("parse");

        let row = branch_to_row("jessfraz/dotfiles", &branch).expect("row");
        assert_eq!(row.label, "jessfraz/dotfiles");
        assert_eq!(row.sub_label, "master");
        assert_eq!(row.state, "failed");
        assert_eq!(row.severity, Severity::Critical);
        assert!(row.finished_at.is_some());
    }

    #[test]
    fn test_branch_without_build_yields_no_row() {
        let branch = TravisBranch { last_build: None };
        assert!(branch_to_row("jessfraz/empty", &branch).is_none());
    }

    #[test]
    fn test_in_progress_build_normalizes_to_running() {
        let branch: TravisBranch = serde_json::from_value(serde_json::json!({
            "last_build": { "state": null, "finished_at": null }
        }))
        .expect("parse");

        let row = branch_to_row("jessfraz/wip", &branch).expect("row");
        assert_eq!(row.state, "RUNNING");
        assert_eq!(row.severity, Severity::Warning);
    }

    #[test]
    fn test_disabled_without_token() {
        let source = TravisSource::new(TravisConfig::default(), "jessfraz");
        assert!(!source.enabled());
        assert_eq!(source.title(), "Travis builds for jessfraz");
    }
}
