//! Realtime active-users box
//!
//! Small bordered box beside an analytics panel showing the current
//! active-users count for that view.

use opsdash_core::Panel;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

pub struct ActiveUsersWidget;

impl ActiveUsersWidget {
    pub fn render(panel: &Panel, area: Rect, buf: &mut Buffer) {
        let count = panel.active_users.as_deref().unwrap_or("-");
        let paragraph = Paragraph::new(count.to_string())
            .style(Style::default().fg(Color::White))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Active users for {} ", panel.source.name)),
            );
        paragraph.render(area, buf);
    }
}
