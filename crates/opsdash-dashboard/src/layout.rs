//! Grid layout computation
//!
//! Pure function from (snapshot, area) to panel rectangles, so the same
//! snapshot at the same size always produces the same grid. Analytics panels
//! each get their own row with the report table beside the active-users box;
//! all CI panels share one row, divided evenly by panel count.

use opsdash_core::{DashboardSnapshot, SourceKind};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Fraction of an analytics row given to the report table; the remainder is
/// the active-users box (the 9/12 + 3/12 split of a 12-column grid).
const ANALYTICS_TABLE_PERCENT: u16 = 75;

/// Placement of one panel in the grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSlot {
    /// Index into `snapshot.panels`
    pub panel_idx: usize,
    /// Rectangle for the panel's table
    pub table: Rect,
    /// Rectangle for the active-users box, analytics panels only
    pub side: Option<Rect>,
}

/// Compute the grid for one snapshot inside the content area.
pub fn build_layout(snapshot: &DashboardSnapshot, area: Rect) -> Vec<PanelSlot> {
    let analytics: Vec<usize> = indices_of_kind(snapshot, SourceKind::Analytics);
    let ci: Vec<usize> = snapshot
        .panels
        .iter()
        .enumerate()
        .filter(|(_, p)| p.source.kind != SourceKind::Analytics)
        .map(|(i, _)| i)
        .collect();

    // One fixed-height row per analytics panel, then everything else.
    let mut constraints: Vec<Constraint> = analytics
        .iter()
        .map(|&i| Constraint::Length(snapshot.panels[i].rows.len() as u16 + 4))
        .collect();
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut slots = Vec::with_capacity(snapshot.panels.len());

    for (row, &panel_idx) in rows.iter().zip(&analytics) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(ANALYTICS_TABLE_PERCENT),
                Constraint::Percentage(100 - ANALYTICS_TABLE_PERCENT),
            ])
            .split(*row);
        slots.push(PanelSlot {
            panel_idx,
            table: halves[0],
            side: Some(halves[1]),
        });
    }

    // CI panels side by side: terminal width divided by panel count.
    if !ci.is_empty() {
        let ci_row = rows[rows.len() - 1];
        let count = ci.len() as u32;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(ci.iter().map(|_| Constraint::Ratio(1, count)))
            .split(ci_row);
        for (column, &panel_idx) in columns.iter().zip(&ci) {
            slots.push(PanelSlot {
                panel_idx,
                table: *column,
                side: None,
            });
        }
    }

    slots
}

fn indices_of_kind(snapshot: &DashboardSnapshot, kind: SourceKind) -> Vec<usize> {
    snapshot
        .panels
        .iter()
        .enumerate()
        .filter(|(_, p)| p.source.kind == kind)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsdash_core::{Panel, SourceId, StatusRow};

    fn ci_panel(name: &str) -> Panel {
        Panel {
            source: SourceId::new(SourceKind::Travis, name),
            title: format!("Travis builds for {}", name),
            rows: vec![StatusRow::new("repo", "master", "failed", None)],
            active_users: None,
        }
    }

    fn analytics_panel(view: &str, rows: usize) -> Panel {
        Panel {
            source: SourceId::new(SourceKind::Analytics, view),
            title: format!("Google Analytics data for {}", view),
            rows: (0..rows)
                .map(|i| StatusRow::new(format!("/page-{}", i), "sessions", "10", None))
                .collect(),
            active_users: Some("3".to_string()),
        }
    }

    #[test]
    fn test_layout_is_idempotent() {
        let snapshot = DashboardSnapshot {
            panels: vec![analytics_panel("12345", 5), ci_panel("a"), ci_panel("b")],
            completed_at: None,
        };
        let area = Rect::new(0, 0, 120, 40);

        let first = build_layout(&snapshot, area);
        let second = build_layout(&snapshot, area);
        assert_eq!(first, second);
    }

    #[test]
    fn test_ci_panels_divide_width_evenly() {
        let snapshot = DashboardSnapshot {
            panels: vec![ci_panel("a"), ci_panel("b"), ci_panel("c")],
            completed_at: None,
        };
        let area = Rect::new(0, 0, 120, 40);

        let slots = build_layout(&snapshot, area);
        assert_eq!(slots.len(), 3);
        for slot in &slots {
            assert_eq!(slot.table.width, 40);
            assert!(slot.side.is_none());
        }
        let total: u16 = slots.iter().map(|s| s.table.width).sum();
        assert_eq!(total, area.width);
    }

    #[test]
    fn test_analytics_row_splits_table_and_side() {
        let snapshot = DashboardSnapshot {
            panels: vec![analytics_panel("12345", 10)],
            completed_at: None,
        };
        let area = Rect::new(0, 0, 100, 40);

        let slots = build_layout(&snapshot, area);
        assert_eq!(slots.len(), 1);
        let slot = &slots[0];
        assert_eq!(slot.table.width, 75);
        let side = slot.side.expect("active users box");
        assert_eq!(side.width, 25);
        assert_eq!(slot.table.height, 14);
    }

    #[test]
    fn test_relayout_at_new_width_changes_columns_only() {
        let snapshot = DashboardSnapshot {
            panels: vec![ci_panel("a"), ci_panel("b")],
            completed_at: None,
        };

        let narrow = build_layout(&snapshot, Rect::new(0, 0, 80, 40));
        let wide = build_layout(&snapshot, Rect::new(0, 0, 160, 40));

        assert_eq!(narrow[0].table.width, 40);
        assert_eq!(wide[0].table.width, 80);
        // Same panels in the same order either way
        let order = |slots: &[PanelSlot]| slots.iter().map(|s| s.panel_idx).collect::<Vec<_>>();
        assert_eq!(order(&narrow), order(&wide));
    }

    #[test]
    fn test_empty_snapshot_produces_no_slots() {
        let snapshot = DashboardSnapshot::default();
        let slots = build_layout(&snapshot, Rect::new(0, 0, 80, 24));
        assert!(slots.is_empty());
    }
}
