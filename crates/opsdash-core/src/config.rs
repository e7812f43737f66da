//! Configuration for opsdash
//!
//! One immutable `DashConfig` is constructed at startup (file, then env, then
//! flags — merging happens in the CLI) and passed by reference into the
//! scheduler and panel builders. No ambient globals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Result;

/// Refresh intervals shorter than this would hammer upstream rate limits.
pub const MIN_INTERVAL_SECS: u64 = 5;

/// Dashboard configuration, loaded from `~/.opsdash/config.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashConfig {
    /// Show all builds, even successful ones
    #[serde(default)]
    pub show_all_builds: bool,

    /// Refresh interval in seconds
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-adapter fetch timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub adapter_timeout_secs: u64,

    #[serde(default)]
    pub travis: TravisConfig,

    #[serde(default)]
    pub circleci: CircleCiConfig,

    #[serde(default)]
    pub jenkins: JenkinsConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Travis CI source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TravisConfig {
    /// API token (env: TRAVISCI_API_TOKEN)
    #[serde(default)]
    pub token: String,
    /// Owner names, one panel each, in configured order
    #[serde(default)]
    pub owners: Vec<String>,
}

impl TravisConfig {
    /// Required fields present?
    pub fn enabled(&self) -> bool {
        !self.token.is_empty() && !self.owners.is_empty()
    }
}

/// CircleCI source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CircleCiConfig {
    /// API token (env: CIRCLECI_API_TOKEN)
    #[serde(default)]
    pub token: String,
    /// Owner names, one panel each, in configured order
    #[serde(default)]
    pub owners: Vec<String>,
}

impl CircleCiConfig {
    pub fn enabled(&self) -> bool {
        !self.token.is_empty() && !self.owners.is_empty()
    }
}

/// Jenkins source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JenkinsConfig {
    /// Base URI (env: JENKINS_BASE_URI)
    #[serde(default)]
    pub base_uri: String,
    /// Username for basic auth (env: JENKINS_USERNAME)
    #[serde(default)]
    pub username: String,
    /// Password for basic auth (env: JENKINS_PASSWORD)
    #[serde(default)]
    pub password: String,
}

impl JenkinsConfig {
    pub fn enabled(&self) -> bool {
        !self.base_uri.is_empty() && !self.username.is_empty() && !self.password.is_empty()
    }
}

/// Google Analytics source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Path to the keyfile; defaults to `~/.opsdash/ga.json`
    #[serde(default)]
    pub keyfile: Option<PathBuf>,
    /// View IDs, one panel each, in configured order
    #[serde(default)]
    pub view_ids: Vec<String>,
}

impl AnalyticsConfig {
    /// Required fields present? The keyfile path is resolved and checked for
    /// existence by the adapter, since a configured-but-missing file also
    /// means disabled.
    pub fn enabled(&self) -> bool {
        self.keyfile.is_some() && !self.view_ids.is_empty()
    }
}

impl DashConfig {
    /// Load configuration from `<home>/.opsdash/config.toml` or use defaults
    pub fn load_or_default(home: &Path) -> Result<Self> {
        let config_path = home.join(".opsdash/config.toml");

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(toml::from_str(&content).map_err(|e| {
                crate::DashError::Other(format!("failed to parse config file: {}", e))
            })?)
        } else {
            Ok(Self::default())
        }
    }

    /// Refresh interval, clamped to the upstream-friendly minimum
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(MIN_INTERVAL_SECS))
    }

    /// Per-adapter fetch timeout. Always shorter than the refresh interval so
    /// a slow adapter resolves to empty before the cycle barrier is crossed.
    pub fn adapter_timeout(&self) -> Duration {
        let interval = self.interval();
        let timeout = Duration::from_secs(self.adapter_timeout_secs.max(1));
        if timeout >= interval {
            interval - Duration::from_secs(1)
        } else {
            timeout
        }
    }
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            show_all_builds: false,
            interval_secs: default_interval_secs(),
            adapter_timeout_secs: default_timeout_secs(),
            travis: TravisConfig::default(),
            circleci: CircleCiConfig::default(),
            jenkins: JenkinsConfig::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

fn default_interval_secs() -> u64 {
    120
}

fn default_timeout_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_clamped_to_minimum() {
        let config = DashConfig {
            interval_secs: 1,
            ..Default::default()
        };
        assert_eq!(config.interval(), Duration::from_secs(MIN_INTERVAL_SECS));
    }

    #[test]
    fn test_adapter_timeout_shorter_than_interval() {
        let config = DashConfig {
            interval_secs: 10,
            adapter_timeout_secs: 60,
            ..Default::default()
        };
        assert!(config.adapter_timeout() < config.interval());
    }

    #[test]
    fn test_source_enabled_requires_all_fields() {
        let mut travis = TravisConfig::default();
        assert!(!travis.enabled());
        travis.token = "token".to_string();
        assert!(!travis.enabled());
        travis.owners.push("jessfraz".to_string());
        assert!(travis.enabled());

        let mut jenkins = JenkinsConfig {
            base_uri: "https://ci.example.com".to_string(),
            username: "admin".to_string(),
            password: String::new(),
        };
        assert!(!jenkins.enabled());
        jenkins.password = "hunter2".to_string();
        assert!(jenkins.enabled());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = DashConfig::load_or_default(dir.path()).expect("load");
        assert_eq!(config.interval_secs, 120);
        assert!(!config.show_all_builds);
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let opsdash_dir = dir.path().join(".opsdash");
        std::fs::create_dir_all(&opsdash_dir).expect("mkdir");
        std::fs::write(
            opsdash_dir.join("config.toml"),
            r#"
show_all_builds = true
interval_secs = 30

[travis]
token = "abc"
owners = ["jessfraz", "moby"]
"#,
        )
        .expect("write");

        let config = DashConfig::load_or_default(dir.path()).expect("load");
        assert!(config.show_all_builds);
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.travis.owners, vec!["jessfraz", "moby"]);
        assert!(config.travis.enabled());
        assert!(!config.jenkins.enabled());
    }
}
