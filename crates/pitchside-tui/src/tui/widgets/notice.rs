// Notice popup: the latest alert from the orchestrator, shown until any key
// dismisses it.

use pitchside_app::protocol::{Notice, NoticeLevel};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::confirm::centered_rect;

const MAX_WIDTH: u16 = 60;

pub fn render(frame: &mut Frame, area: Rect, notice: &Notice) {
    let (title, color) = level_style(notice.level);
    let len = notice.message.chars().count().min(u16::MAX as usize) as u16;
    let width = len.saturating_add(4).clamp(24, MAX_WIDTH);
    let lines = len.div_ceil(width - 2);
    let dialog_area = centered_rect(width, lines.saturating_add(4), area);

    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            title,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));

    let text = vec![
        Line::from(notice.message.clone()),
        Line::from(""),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, dialog_area);
}

pub fn level_style(level: NoticeLevel) -> (&'static str, Color) {
    match level {
        NoticeLevel::Info => (" Info ", Color::Cyan),
        NoticeLevel::Warn => (" Warning ", Color::Yellow),
        NoticeLevel::Error => (" Error ", Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::tests::buffer_lines;

    #[test]
    fn levels_have_distinct_colors() {
        assert_eq!(level_style(NoticeLevel::Info).1, Color::Cyan);
        assert_eq!(level_style(NoticeLevel::Warn).1, Color::Yellow);
        assert_eq!(level_style(NoticeLevel::Error).1, Color::Red);
    }

    #[test]
    fn renders_message_and_title() {
        let backend = ratatui::backend::TestBackend::new(80, 24);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let notice = Notice::error("Could not update favorites");
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area, &notice);
            })
            .unwrap();
        let text = buffer_lines(terminal.backend().buffer()).join("\n");
        assert!(text.contains("Error"));
        assert!(text.contains("Could not update favorites"));
    }

    #[test]
    fn long_message_in_tiny_terminal_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(20, 5);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let notice = Notice::warn("x".repeat(300));
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, area, &notice);
            })
            .unwrap();
    }
}
