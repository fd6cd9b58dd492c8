// Detail page: info card on the left, star filter chips and grouped
// feedback on the right.

use pitchside_app::protocol::DetailView;
use pitchside_core::player::{StarCounts, StarFilter};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::tui::layout::split_detail;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(view) = &state.detail else {
        let loading = Paragraph::new("Loading player...")
            .block(Block::default().borders(Borders::ALL).title("Player"));
        frame.render_widget(loading, area);
        return;
    };

    let (card_area, feedback_area) = split_detail(area);
    render_card(frame, card_area, view);

    let [chips_area, list_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(feedback_area);
    frame.render_widget(
        Paragraph::new(Line::from(star_chips(view.star_filter, &view.star_counts))),
        chips_area,
    );

    let lines = feedback_lines(view);
    let scroll = state.detail_scroll.min(lines.len().saturating_sub(1)) as u16;
    let feedback = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title("Feedback"));
    frame.render_widget(feedback, list_area);
}

fn render_card(frame: &mut Frame, area: Rect, view: &DetailView) {
    let label = Style::default().fg(Color::Gray);
    let heart = if view.is_favorite {
        Span::styled("♥ favorite", Style::default().fg(Color::Red))
    } else {
        Span::styled("not a favorite", label)
    };
    let avatar_note = if view.has_custom_image {
        " (custom)"
    } else {
        ""
    };

    let lines = vec![
        Line::from(Span::styled(
            view.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(heart),
        Line::from(""),
        Line::from(vec![Span::styled("Team      ", label), Span::raw(view.team.clone())]),
        Line::from(vec![
            Span::styled("Position  ", label),
            Span::raw(view.position.clone()),
        ]),
        Line::from(vec![Span::styled("Minutes   ", label), Span::raw(view.minutes.clone())]),
        Line::from(vec![Span::styled("Passing   ", label), Span::raw(view.accuracy.clone())]),
        Line::from(""),
        Line::from(Span::styled(format!("Avatar{avatar_note}"), label)),
        Line::from(view.image.clone()),
    ];

    let card = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Player"));
    frame.render_widget(card, area);
}

/// Filter chips: `All (n)` then `5★ (n)` down to `1★ (n)`.
pub fn star_chips(active: StarFilter, counts: &StarCounts) -> Vec<Span<'static>> {
    let chip_style = |selected: bool| {
        if selected {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        }
    };

    let mut spans = vec![
        Span::styled(
            format!("[All ({})]", counts.all),
            chip_style(active == StarFilter::All),
        ),
        Span::raw(" "),
    ];
    for rating in (1..=5u8).rev() {
        spans.push(Span::styled(
            format!("[{rating}★ ({})]", counts.get(rating)),
            chip_style(active == StarFilter::Stars(rating)),
        ));
        spans.push(Span::raw(" "));
    }
    spans
}

fn feedback_lines(view: &DetailView) -> Vec<Line<'static>> {
    if view.feedback.is_empty() {
        let message = match view.star_filter {
            StarFilter::All => "No feedback yet.".to_string(),
            StarFilter::Stars(n) => format!("No {n}-star feedback."),
        };
        return vec![Line::from(Span::styled(
            message,
            Style::default().fg(Color::Gray),
        ))];
    }

    let mut lines = Vec::new();
    for group in &view.feedback {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", "★".repeat(group.rating as usize), group.entries.len()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for entry in &group.entries {
            lines.push(Line::from(format!("  \"{}\"", entry.comment)));
            lines.push(Line::from(Span::styled(
                format!("    {} · {}", entry.author, entry.date),
                Style::default().fg(Color::Gray),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
