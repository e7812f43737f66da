//! Panel assembly and the row filter policy
//!
//! Groups normalized rows per source instance, applies the "hide successful
//! rows unless show-all" filter, and drops panels that end up empty.

use crate::types::{Panel, Severity, SourceId, StatusRow};

/// Whether a classified row surfaces in its panel.
///
/// By default only non-successful and "just fixed" rows are shown, to keep the
/// dashboard focused on actionable items.
pub fn row_visible(row: &StatusRow, show_all_builds: bool) -> bool {
    show_all_builds || row.severity != Severity::Ok || row.just_fixed
}

/// Builds one panel for one source instance.
///
/// Rows keep their adapter-intrinsic order; nothing is re-sorted here so the
/// output stays deterministic and cheap.
pub struct PanelBuilder {
    source: SourceId,
    title: String,
    show_all_builds: bool,
    rows: Vec<StatusRow>,
    active_users: Option<String>,
}

impl PanelBuilder {
    pub fn new(source: SourceId, title: impl Into<String>, show_all_builds: bool) -> Self {
        Self {
            source,
            title: title.into(),
            show_all_builds,
            rows: Vec::new(),
            active_users: None,
        }
    }

    /// Add a row, applying the visibility filter
    pub fn push(&mut self, row: StatusRow) {
        if row_visible(&row, self.show_all_builds) {
            self.rows.push(row);
        }
    }

    /// Add every row from an adapter result
    pub fn extend(&mut self, rows: impl IntoIterator<Item = StatusRow>) {
        for row in rows {
            self.push(row);
        }
    }

    /// Attach a realtime active-users figure (analytics panels)
    pub fn with_active_users(mut self, count: impl Into<String>) -> Self {
        self.active_users = Some(count.into());
        self
    }

    /// Finish the panel. A panel with zero rows after filtering is dropped,
    /// never rendered as an empty box.
    pub fn build(self) -> Option<Panel> {
        if self.rows.is_empty() {
            return None;
        }
        Some(Panel {
            source: self.source,
            title: self.title,
            rows: self.rows,
            active_users: self.active_users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceKind;

    fn builder(show_all: bool) -> PanelBuilder {
        PanelBuilder::new(
            SourceId::new(SourceKind::Travis, "jessfraz"),
            "Travis builds for jessfraz",
            show_all,
        )
    }

    #[test]
    fn test_success_hidden_by_default() {
        let row = StatusRow::new("repo1", "master", "success", None);
        assert!(!row_visible(&row, false));
        assert!(row_visible(&row, true));
    }

    #[test]
    fn test_failed_always_visible() {
        let row = StatusRow::new("repo1", "master", "failed", None);
        assert!(row_visible(&row, false));
        assert!(row_visible(&row, true));
    }

    #[test]
    fn test_just_fixed_visible_despite_ok_severity() {
        let row = StatusRow::new("repo1", "master", "fixed", None);
        assert_eq!(row.severity, Severity::Ok);
        assert!(row_visible(&row, false));
    }

    #[test]
    fn test_empty_panel_dropped() {
        let mut b = builder(false);
        b.push(StatusRow::new("repo1", "master", "success", None));
        assert!(b.build().is_none());
    }

    #[test]
    fn test_panel_preserves_row_order() {
        let mut b = builder(true);
        b.extend([
            StatusRow::new("alpha", "master", "failed", None),
            StatusRow::new("beta", "master", "success", None),
            StatusRow::new("gamma", "master", "running", None),
        ]);
        let panel = b.build().expect("panel should have rows");
        let labels: Vec<_> = panel.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_filter_applies_before_emptiness_check() {
        let mut b = builder(false);
        b.extend([
            StatusRow::new("ok1", "master", "success", None),
            StatusRow::new("bad", "master", "failed", None),
            StatusRow::new("ok2", "master", "passed", None),
        ]);
        let panel = b.build().expect("failed row should survive");
        assert_eq!(panel.rows.len(), 1);
        assert_eq!(panel.rows[0].label, "bad");
    }
}
