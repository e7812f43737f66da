//! Panel table widget
//!
//! Renders one panel as a bordered table with severity-colored rows.

use super::row_color;
use opsdash_core::{Panel, SourceKind};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Row, Table},
};

pub struct PanelTableWidget;

impl PanelTableWidget {
    /// Render one panel's table
    pub fn render(panel: &Panel, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} ", panel.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White));

        let inner = block.inner(area);
        block.render(area, buf);

        let widths = Self::column_widths(panel.source.kind);

        let header = Row::new(
            Self::column_headers(panel.source.kind)
                .into_iter()
                .map(Cell::from),
        )
        .style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );

        let rows: Vec<Row> = panel
            .rows
            .iter()
            .map(|row| {
                let color = row_color(row);
                Row::new(vec![
                    Cell::from(row.label.clone()),
                    Cell::from(row.sub_label.clone()),
                    Cell::from(row.state.clone()),
                    Cell::from(row.formatted_time()),
                ])
                .style(Style::default().fg(color))
            })
            .collect();

        let table = Table::new(rows, widths).header(header).column_spacing(1);

        Widget::render(table, inner, buf);
    }

    /// Column headers per backend kind
    fn column_headers(kind: SourceKind) -> [&'static str; 4] {
        match kind {
            SourceKind::Jenkins => ["JOB", "", "STATE", "FINISHED AT"],
            SourceKind::Analytics => ["PAGE", "METRIC", "VALUE", ""],
            _ => ["REPO", "BRANCH", "STATE", "FINISHED AT"],
        }
    }

    fn column_widths(kind: SourceKind) -> [Constraint; 4] {
        match kind {
            SourceKind::Analytics => [
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(0),
            ],
            _ => [
                Constraint::Min(16),
                Constraint::Length(10),
                Constraint::Length(9),
                Constraint::Length(19),
            ],
        }
    }
}
