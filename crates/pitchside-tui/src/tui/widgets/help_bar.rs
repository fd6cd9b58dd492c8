// Bottom rows: the text input line and the key hint bar.

use pitchside_app::protocol::ScreenId;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::{InputMode, ViewState};

/// Render the input line: the active prompt while typing, otherwise the
/// search text applied to the current listing (if any).
pub fn render_input_line(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match state.input_mode {
        InputMode::Search => prompt_line("Search: ", &state.input_buffer),
        InputMode::AvatarPath => prompt_line("Image path: ", &state.input_buffer),
        InputMode::Normal => {
            let search = state.current_search();
            if search.is_empty() {
                Line::from("")
            } else {
                Line::from(vec![
                    Span::styled(" Filter: ", Style::default().fg(Color::Gray)),
                    Span::raw(search.to_string()),
                ])
            }
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn prompt_line(label: &'static str, buffer: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {label}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(buffer.to_string()),
        Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
    ])
}

/// Render the key hint bar for the current screen and mode.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        hint_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

pub fn hint_text(state: &ViewState) -> &'static str {
    match state.input_mode {
        InputMode::Search => " Enter:Apply | Esc:Clear search",
        InputMode::AvatarPath => " Enter:Use image | Esc:Cancel",
        InputMode::Normal => match state.active() {
            ScreenId::Home => {
                " q:Quit | 1-2:Screens | j/k:Move | Enter:Open | f:Favorite | /:Search | t:Team | r:Refresh"
            }
            ScreenId::Favorites => {
                " q:Quit | 1-2:Screens | j/k:Move | Enter:Open | d:Remove | D:Remove all | /:Search"
            }
            ScreenId::Detail => {
                " Esc:Back | f:Favorite | a:Avatar | 0:All stars | 1-5:Stars | j/k:Scroll"
            }
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
