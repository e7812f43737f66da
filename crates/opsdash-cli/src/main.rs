//! opsdash - terminal dashboard for CI builds and web analytics
//!
//! Usage:
//!   opsdash --travis-owner jessfraz --jenkins-uri https://ci.example.com
//!   opsdash --all --interval 30
//!
//! Configuration merges three layers, later wins: `~/.opsdash/config.toml`,
//! environment variables (TRAVISCI_API_TOKEN, CIRCLECI_API_TOKEN,
//! JENKINS_BASE_URI, JENKINS_USERNAME, JENKINS_PASSWORD), then flags.

use anyhow::{Context, Result};
use clap::Parser;
use opsdash_core::DashConfig;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug, Default)]
#[command(name = "opsdash")]
#[command(
    about = "A terminal dashboard with build stats from Travis CI, CircleCI, Jenkins, and Google Analytics"
)]
struct Cli {
    /// Show all builds, even successful ones (default: only failures)
    #[arg(long = "all")]
    all: bool,

    /// Update interval in seconds
    #[arg(long)]
    interval: Option<u64>,

    /// Path to Google Analytics keyfile (default: ~/.opsdash/ga.json)
    #[arg(long = "ga-keyfile")]
    ga_keyfile: Option<PathBuf>,

    /// Google Analytics view ID (can be passed more than once)
    #[arg(long = "ga-viewid")]
    ga_viewids: Vec<String>,

    /// Travis CI API token (or env var TRAVISCI_API_TOKEN)
    #[arg(long = "travis-token")]
    travis_token: Option<String>,

    /// Travis owner name for builds (can be passed more than once)
    #[arg(long = "travis-owner")]
    travis_owners: Vec<String>,

    /// CircleCI API token (or env var CIRCLECI_API_TOKEN)
    #[arg(long = "circleci-token")]
    circleci_token: Option<String>,

    /// CircleCI owner name for builds (can be passed more than once)
    #[arg(long = "circleci-owner")]
    circleci_owners: Vec<String>,

    /// Jenkins base URI (or env var JENKINS_BASE_URI)
    #[arg(long = "jenkins-uri")]
    jenkins_uri: Option<String>,

    /// Jenkins username for authentication (or env var JENKINS_USERNAME)
    #[arg(long = "jenkins-username")]
    jenkins_username: Option<String>,

    /// Jenkins password for authentication (or env var JENKINS_PASSWORD)
    #[arg(long = "jenkins-password")]
    jenkins_password: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let home = home_dir().context("could not determine home directory")?;
    let dash_dir = home.join(".opsdash");
    std::fs::create_dir_all(&dash_dir)
        .with_context(|| format!("creating {}", dash_dir.display()))?;

    // The TUI owns the terminal, so logs go to a file instead of stderr.
    let level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let log_file = File::create(dash_dir.join("opsdash.log"))
        .with_context(|| format!("creating log file in {}", dash_dir.display()))?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = build_config(&cli, &home)?;
    opsdash_dashboard::run(config)
        .await
        .context("dashboard failed")?;

    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Merge config file, environment, and flags into one immutable config
fn build_config(cli: &Cli, home: &std::path::Path) -> Result<DashConfig> {
    let mut config = DashConfig::load_or_default(home).context("loading config file")?;

    config.show_all_builds |= cli.all;
    if let Some(interval) = cli.interval {
        config.interval_secs = interval;
    }

    // Environment fallbacks, overridden by flags
    merge_env(&mut config.travis.token, "TRAVISCI_API_TOKEN");
    merge_env(&mut config.circleci.token, "CIRCLECI_API_TOKEN");
    merge_env(&mut config.jenkins.base_uri, "JENKINS_BASE_URI");
    merge_env(&mut config.jenkins.username, "JENKINS_USERNAME");
    merge_env(&mut config.jenkins.password, "JENKINS_PASSWORD");

    merge_flag(&mut config.travis.token, &cli.travis_token);
    merge_flag(&mut config.circleci.token, &cli.circleci_token);
    merge_flag(&mut config.jenkins.base_uri, &cli.jenkins_uri);
    merge_flag(&mut config.jenkins.username, &cli.jenkins_username);
    merge_flag(&mut config.jenkins.password, &cli.jenkins_password);

    if !cli.travis_owners.is_empty() {
        config.travis.owners = cli.travis_owners.clone();
    }
    if !cli.circleci_owners.is_empty() {
        config.circleci.owners = cli.circleci_owners.clone();
    }
    if !cli.ga_viewids.is_empty() {
        config.analytics.view_ids = cli.ga_viewids.clone();
    }
    if let Some(keyfile) = &cli.ga_keyfile {
        config.analytics.keyfile = Some(keyfile.clone());
    }
    if config.analytics.keyfile.is_none() {
        config.analytics.keyfile = Some(home.join(".opsdash/ga.json"));
    }

    Ok(config)
}

fn merge_env(target: &mut String, var: &str) {
    if target.is_empty() {
        if let Ok(value) = std::env::var(var) {
            *target = value;
        }
    }
}

fn merge_flag(target: &mut String, flag: &Option<String>) {
    if let Some(value) = flag {
        *target = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let opsdash_dir = dir.path().join(".opsdash");
        std::fs::create_dir_all(&opsdash_dir).expect("mkdir");
        std::fs::write(
            opsdash_dir.join("config.toml"),
            r#"
interval_secs = 60

[travis]
token = "from-file"
owners = ["filed"]
"#,
        )
        .expect("write");

        let cli = Cli {
            interval: Some(30),
            travis_token: Some("from-flag".to_string()),
            travis_owners: vec!["flagged".to_string()],
            ..Default::default()
        };

        let config = build_config(&cli, dir.path()).expect("build");
        assert_eq!(config.interval_secs, 30);
        assert_eq!(config.travis.token, "from-flag");
        assert_eq!(config.travis.owners, vec!["flagged"]);
    }

    #[test]
    fn test_default_keyfile_under_home() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli = Cli::default();
        let config = build_config(&cli, dir.path()).expect("build");
        assert_eq!(
            config.analytics.keyfile,
            Some(dir.path().join(".opsdash/ga.json"))
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from([
            "opsdash",
            "--all",
            "--interval",
            "30",
            "--travis-owner",
            "jessfraz",
            "--travis-owner",
            "moby",
        ]);
        assert!(cli.all);
        assert_eq!(cli.interval, Some(30));
        assert_eq!(cli.travis_owners, vec!["jessfraz", "moby"]);
    }
}
