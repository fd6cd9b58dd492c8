// Status bar widget: screen tabs, detail breadcrumb, loading marker.

use pitchside_app::protocol::ScreenId;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [app name] [tab bar] [detail breadcrumb] [loading marker]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![
        Span::styled(
            " pitchside ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(Color::Gray)),
    ];

    spans.extend(tab_spans(state.active()));

    if state.active() == ScreenId::Detail {
        let name = state
            .detail
            .as_ref()
            .map(|d| d.name.as_str())
            .unwrap_or("...");
        spans.push(Span::styled(
            format!("> {name} "),
            Style::default().fg(Color::Yellow),
        ));
    }

    if state.is_loading() {
        spans.push(Span::styled(
            "loading…",
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Tab indicator spans with the active listing highlighted.
/// E.g. "[1:Home] [2:Favorites]"
///
/// The detail screen has no tab of its own; it keeps both tabs dim.
pub fn tab_spans(active: ScreenId) -> Vec<Span<'static>> {
    let tabs = [(ScreenId::Home, "1:Home"), (ScreenId::Favorites, "2:Favorites")];

    let mut spans = Vec::new();
    for (screen, label) in tabs {
        let style = if screen == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::apply_ui_update;
    use crate::tui::tests::{buffer_lines, detail_view, home_view};
    use pitchside_app::protocol::UiUpdate;

    fn draw(state: &ViewState) -> String {
        let backend = ratatui::backend::TestBackend::new(80, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area, state);
            })
            .unwrap();
        buffer_lines(terminal.backend().buffer()).join("")
    }

    #[test]
    fn tab_spans_highlight_active() {
        let spans = tab_spans(ScreenId::Favorites);
        // 0=[1:Home], 1=" ", 2=[2:Favorites]
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
        assert!(spans[2].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn detail_has_no_highlighted_tab() {
        let spans = tab_spans(ScreenId::Detail);
        assert!(spans
            .iter()
            .all(|s| !s.style.add_modifier.contains(Modifier::BOLD)));
    }

    #[test]
    fn shows_loading_until_first_view() {
        let mut state = ViewState::default();
        state.home.loading = true;
        assert!(draw(&state).contains("loading"));

        apply_ui_update(&mut state, UiUpdate::Home(home_view()));
        let text = draw(&state);
        assert!(text.contains("[1:Home]"));
        assert!(!text.contains("loading"));
    }

    #[test]
    fn detail_breadcrumb_names_player() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Loading(ScreenId::Detail));
        apply_ui_update(&mut state, UiUpdate::Detail(Box::new(detail_view())));
        assert!(draw(&state).contains("> Anna"));
    }
}
