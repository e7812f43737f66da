//! Main UI layout and rendering
//!
//! Rebuilds the full grid from the latest snapshot on every draw. Nothing is
//! patched incrementally, so a redraw with the same snapshot at the same size
//! is always identical.

use crate::{
    layout::build_layout,
    widgets::{ActiveUsersWidget, PanelTableWidget},
};
use opsdash_core::DashboardSnapshot;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw the entire dashboard
pub fn draw(frame: &mut Frame, snapshot: &DashboardSnapshot) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header (title + keybindings)
            Constraint::Min(0),    // Panel grid
        ])
        .split(size);

    render_header(frame, chunks[0], snapshot);
    render_panels(frame, chunks[1], snapshot);
}

/// Render the header with title, last-updated time, and keybindings
fn render_header(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    let header_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let updated = snapshot
        .completed_at
        .map(|t| format!("updated {}", t.format("%H:%M:%S")))
        .unwrap_or_else(|| "waiting for first refresh".to_string());

    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled(
            "OPSDASH",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(updated, Style::default().fg(Color::Gray)),
    ])])
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, header_chunks[0]);

    let keybindings = Paragraph::new(vec![Line::from(vec![
        Span::styled("[q]", Style::default().fg(Color::Yellow)),
        Span::raw("uit "),
        Span::styled("[r]", Style::default().fg(Color::Yellow)),
        Span::raw("efresh"),
    ])])
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Right);
    frame.render_widget(keybindings, header_chunks[1]);
}

/// Render every panel at its computed grid position
fn render_panels(frame: &mut Frame, area: Rect, snapshot: &DashboardSnapshot) {
    if snapshot.panels.is_empty() {
        let msg = if snapshot.completed_at.is_some() {
            "All builds passing — nothing to show"
        } else {
            "Fetching…"
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    for slot in build_layout(snapshot, area) {
        let panel = &snapshot.panels[slot.panel_idx];
        frame.render_widget(
            WidgetAdapter::new(|area, buf| PanelTableWidget::render(panel, area, buf)),
            slot.table,
        );
        if let Some(side) = slot.side {
            frame.render_widget(
                WidgetAdapter::new(|area, buf| ActiveUsersWidget::render(panel, area, buf)),
                side,
            );
        }
    }
}

/// Widget adapter to bridge static render methods to ratatui's Widget trait
struct WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    render_fn: F,
}

impl<F> WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn new(render_fn: F) -> Self {
        Self { render_fn }
    }
}

impl<F> Widget for WidgetAdapter<F>
where
    F: Fn(Rect, &mut Buffer),
{
    fn render(self, area: Rect, buf: &mut Buffer) {
        (self.render_fn)(area, buf);
    }
}
