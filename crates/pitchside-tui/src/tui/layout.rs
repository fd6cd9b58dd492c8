// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row): screen tabs, loading marker  |
// +--------------------------------------------------+
// | Main Panel (fill): listing table or detail page  |
// +--------------------------------------------------+
// | Input Line (1 row): search / avatar path prompt  |
// +--------------------------------------------------+
// | Help Bar (1 row)                                 |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas.
#[derive(Debug, Clone)]
pub struct AppLayout {
    pub status_bar: Rect,
    pub main_panel: Rect,
    pub input_line: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(5),    // main panel
            Constraint::Length(1), // input line
            Constraint::Length(1), // help bar
        ])
        .split(area);

    AppLayout {
        status_bar: vertical[0],
        main_panel: vertical[1],
        input_line: vertical[2],
        help_bar: vertical[3],
    }
}

/// Split the detail panel into the info card (left) and feedback (right).
pub fn split_detail(area: Rect) -> (Rect, Rect) {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    (horizontal[0], horizontal[1])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
