//! Dashboard widgets module
//!
//! Ratatui widgets for rendering panels from an immutable snapshot. Widgets
//! only read; all mutation happens in the scheduler before publish.

use opsdash_core::StatusRow;
use ratatui::style::Color;

mod panel_table;

pub use panel_table::PanelTableWidget;

mod active_users;

pub use active_users::ActiveUsersWidget;

/// Row color from its classification.
///
/// Failed rows red, just-fixed green, in-progress/other yellow, successes
/// plain white.
pub fn row_color(row: &StatusRow) -> Color {
    if row.just_fixed {
        return Color::Green;
    }
    match row.severity.color_name() {
        "red" => Color::Red,
        "yellow" => Color::Yellow,
        "gray" => Color::DarkGray,
        _ => Color::White,
    }
}
