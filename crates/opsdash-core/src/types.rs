//! Shared dashboard data model
//!
//! These types define the contract between source adapters, the refresh
//! scheduler, and the UI widgets. Everything here is a value object created
//! fresh each refresh cycle; a published snapshot is never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which backend a source instance talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    /// Travis CI builds for one owner
    Travis,
    /// CircleCI builds for one owner
    CircleCi,
    /// Jenkins jobs on one base URI
    Jenkins,
    /// Google Analytics report for one view
    Analytics,
}

impl SourceKind {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Travis => "travis",
            Self::CircleCi => "circleci",
            Self::Jenkins => "jenkins",
            Self::Analytics => "analytics",
        }
    }
}

/// Identity of one configured source instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceId {
    /// Backend kind
    pub kind: SourceKind,
    /// Human-readable identity (owner name, base URI, or view name)
    pub name: String,
}

impl SourceId {
    pub fn new(kind: SourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind.name(), self.name)
    }
}

/// Severity classification driving row color and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Build passed / nothing actionable
    Ok,
    /// In progress, or an unrecognized-but-present state
    Warning,
    /// Build failed
    Critical,
    /// No state information at all
    Unknown,
}

impl Severity {
    /// Classify a normalized state string.
    ///
    /// `severity` is always derived through this function; it is never set
    /// independently of `state`.
    pub fn classify(state: &str) -> Self {
        match state {
            "success" | "SUCCESS" | "passed" | "fixed" => Self::Ok,
            "failed" | "FAILURE" | "errored" => Self::Critical,
            "running" | "RUNNING" | "started" | "created" => Self::Warning,
            "" => Self::Unknown,
            _ => Self::Warning,
        }
    }

    /// Status color name (for ratatui styling)
    pub fn color_name(&self) -> &'static str {
        match self {
            Self::Ok => "white",
            Self::Warning => "yellow",
            Self::Critical => "red",
            Self::Unknown => "gray",
        }
    }
}

/// One reportable unit: a repository branch build, a CI job, or an analytics
/// dimension row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRow {
    /// Primary label (repo name, job name, page path)
    pub label: String,
    /// Secondary label (branch name, metric name); may be empty
    pub sub_label: String,
    /// Normalized state string; never empty for a started build
    pub state: String,
    /// When the build/report finished, if known
    pub finished_at: Option<DateTime<Utc>>,
    /// Derived classification; pure function of `state`
    pub severity: Severity,
    /// Transitioned from failing to passing. Orthogonal to severity: shown
    /// distinctly but not treated as actionable.
    pub just_fixed: bool,
}

impl StatusRow {
    /// Build a row from a raw backend state, normalizing and classifying it.
    ///
    /// A started build with an empty state is normalized to `"RUNNING"` so no
    /// row is ever shown blank.
    pub fn new(
        label: impl Into<String>,
        sub_label: impl Into<String>,
        state: impl Into<String>,
        finished_at: Option<DateTime<Utc>>,
    ) -> Self {
        let mut state: String = state.into();
        if state.is_empty() {
            state = "RUNNING".to_string();
        }
        let severity = Severity::classify(&state);
        let just_fixed = state == "fixed";
        Self {
            label: label.into(),
            sub_label: sub_label.into(),
            state,
            finished_at,
            severity,
            just_fixed,
        }
    }

    /// Finished-at formatted for table display
    pub fn formatted_time(&self) -> String {
        self.finished_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

/// One rendered group of rows, corresponding to one configured source instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Originating source identity
    pub source: SourceId,
    /// Border title (e.g. "Travis builds for jessfraz")
    pub title: String,
    /// Ordered rows, adapter-intrinsic order preserved
    pub rows: Vec<StatusRow>,
    /// Realtime active-users figure (analytics panels only)
    pub active_users: Option<String>,
}

/// Immutable result of one complete refresh cycle across all sources
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSnapshot {
    /// Panels in configured source order, independent of completion order
    pub panels: Vec<Panel>,
    /// When the cycle's barrier was crossed
    pub completed_at: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    /// Panels of one kind, preserving configured order
    pub fn panels_of_kind(&self, kind: SourceKind) -> Vec<&Panel> {
        self.panels.iter().filter(|p| p.source.kind == kind).collect()
    }

    /// CI panels (everything except analytics), preserving configured order
    pub fn ci_panels(&self) -> Vec<&Panel> {
        self.panels
            .iter()
            .filter(|p| p.source.kind != SourceKind::Analytics)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_classification() {
        assert_eq!(Severity::classify("success"), Severity::Ok);
        assert_eq!(Severity::classify("passed"), Severity::Ok);
        assert_eq!(Severity::classify("fixed"), Severity::Ok);
        assert_eq!(Severity::classify("failed"), Severity::Critical);
        assert_eq!(Severity::classify("running"), Severity::Warning);
        assert_eq!(Severity::classify("RUNNING"), Severity::Warning);
        assert_eq!(Severity::classify("canceled"), Severity::Warning);
        assert_eq!(Severity::classify(""), Severity::Unknown);
    }

    #[test]
    fn test_empty_state_normalized_to_running() {
        let row = StatusRow::new("repo1", "master", "", None);
        assert_eq!(row.state, "RUNNING");
        assert_eq!(row.severity, Severity::Warning);
    }

    #[test]
    fn test_fixed_sets_flag_not_severity() {
        let row = StatusRow::new("repo1", "master", "fixed", None);
        assert_eq!(row.severity, Severity::Ok);
        assert!(row.just_fixed);
    }

    #[test]
    fn test_failed_is_critical() {
        let row = StatusRow::new("repo1", "master", "failed", None);
        assert_eq!(row.severity, Severity::Critical);
        assert!(!row.just_fixed);
    }

    #[test]
    fn test_source_id_display() {
        let id = SourceId::new(SourceKind::Jenkins, "https://ci.example.com");
        assert_eq!(id.to_string(), "jenkins/https://ci.example.com");
    }

    #[test]
    fn test_snapshot_kind_partition() {
        let snapshot = DashboardSnapshot {
            panels: vec![
                Panel {
                    source: SourceId::new(SourceKind::Analytics, "blog"),
                    title: "Google Analytics data for blog".to_string(),
                    rows: vec![StatusRow::new("/index", "sessions", "42", None)],
                    active_users: Some("7".to_string()),
                },
                Panel {
                    source: SourceId::new(SourceKind::Travis, "jessfraz"),
                    title: "Travis builds for jessfraz".to_string(),
                    rows: vec![StatusRow::new("repo1", "master", "failed", None)],
                    active_users: None,
                },
            ],
            completed_at: Some(Utc::now()),
        };
        assert_eq!(snapshot.panels_of_kind(SourceKind::Analytics).len(), 1);
        assert_eq!(snapshot.ci_panels().len(), 1);
    }
}
