// Confirmation overlay widget.
//
// Renders a centered modal dialog asking the user to confirm a destructive
// action (quit, remove one favorite, remove all favorites). Displayed on top
// of the main layout while `ViewState::confirm` is set.

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::ConfirmAction;

const DIALOG_MIN_WIDTH: u16 = 28;
const DIALOG_HEIGHT: u16 = 6;

/// Render the confirmation dialog for `action` centered on the screen.
pub fn render(frame: &mut Frame, area: Rect, action: &ConfirmAction) {
    let prompt = action.prompt();
    let dialog_area = centered_rect(dialog_width(&prompt), DIALOG_HEIGHT, area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            action.title(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let text = vec![
        Line::from(format!("  {prompt}")),
        Line::from(""),
        Line::from(vec![
            Span::raw("  ("),
            Span::styled("y", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
            Span::raw("/"),
            Span::styled("n", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
            Span::raw(")"),
        ]),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(Color::Black));

    frame.render_widget(paragraph, dialog_area);
}

/// Compute a centered rectangle of the given size within `area`, clamped to
/// the available space.
/// Prompt width plus padding, saturating instead of wrapping for huge names.
fn dialog_width(prompt: &str) -> u16 {
    let len = prompt.chars().count().min(u16::MAX as usize) as u16;
    len.saturating_add(6).max(DIALOG_MIN_WIDTH)
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width);
    let clamped_height = height.min(area.height);

    let vertical = Layout::vertical([Constraint::Length(clamped_height)])
        .flex(Flex::Center)
        .split(area);

    let horizontal = Layout::horizontal([Constraint::Length(clamped_width)])
        .flex(Flex::Center)
        .split(vertical[0]);

    horizontal[0]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
