// Player listing widget shared by Home and Favorites.
//
// Table columns: heart, Name, Team, Position, Minutes, Pass%. Home adds a
// row of team chips above the table; Favorites shows an empty-state message
// when nothing is favorited.

use pitchside_app::protocol::{PlayerRow, ScreenId};
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::tui::ViewState;

const HEART: &str = "♥";

/// Render the active listing screen into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    match state.active() {
        ScreenId::Home => {
            let [chips_area, table_area] =
                Layout::vertical([Constraint::Length(1), Constraint::Min(3)]).areas(area);
            let chips = Paragraph::new(Line::from(team_chips(
                &state.home.teams,
                state.home.selected_team.as_deref(),
            )));
            frame.render_widget(chips, chips_area);
            render_table(frame, table_area, state, &state.home.rows, home_title(state));
        }
        ScreenId::Favorites => {
            if !state.favorites.loading && state.favorites.favorite_count == 0 {
                let empty = Paragraph::new("No favorite players yet. Press f on Home to add one.")
                    .style(Style::default().fg(Color::Gray))
                    .block(Block::default().borders(Borders::ALL).title("Favorites"));
                frame.render_widget(empty, area);
                return;
            }
            render_table(
                frame,
                area,
                state,
                &state.favorites.rows,
                favorites_title(state),
            );
        }
        ScreenId::Detail => {}
    }
}

fn render_table(
    frame: &mut Frame,
    area: Rect,
    state: &ViewState,
    rows: &[PlayerRow],
    title: Line<'static>,
) {
    let header = Row::new(vec![
        Cell::from(" "),
        Cell::from("Name"),
        Cell::from("Team"),
        Cell::from("Position"),
        Cell::from("Minutes"),
        Cell::from("Pass%"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let body: Vec<Row> = rows
        .iter()
        .map(|p| {
            let heart = if p.is_favorite {
                Cell::from(HEART).style(Style::default().fg(Color::Red))
            } else {
                Cell::from(" ")
            };
            Row::new(vec![
                heart,
                Cell::from(p.name.clone()),
                Cell::from(p.team.clone()),
                Cell::from(p.position.clone()),
                Cell::from(p.minutes.clone()),
                Cell::from(p.accuracy.clone()),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(2),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(18),
        Constraint::Length(9),
        Constraint::Length(6),
    ];

    let table = Table::new(body, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default();
    if !rows.is_empty() {
        table_state.select(Some(state.selected_index().min(rows.len() - 1)));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Team filter chips, the selected one highlighted.
pub fn team_chips(teams: &[String], selected: Option<&str>) -> Vec<Span<'static>> {
    let mut spans = vec![Span::styled(" Teams: ", Style::default().fg(Color::Gray))];
    for team in teams {
        let style = if selected == Some(team.as_str()) {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{team}]"), style));
        spans.push(Span::raw(" "));
    }
    spans
}

fn home_title(state: &ViewState) -> Line<'static> {
    let mut title = String::from("Players");
    if let Some(team) = &state.home.selected_team {
        title.push_str(&format!(" [{team}]"));
    }
    if !state.home.search.is_empty() {
        title.push_str(&format!(" \"{}\"", state.home.search));
    }
    title.push_str(&format!(" ({})", state.home.rows.len()));
    if state.home.loading {
        title.push_str(" loading...");
    }
    Line::from(title)
}

fn favorites_title(state: &ViewState) -> Line<'static> {
    let mut title = String::from("Favorites");
    if !state.favorites.search.is_empty() {
        title.push_str(&format!(" \"{}\"", state.favorites.search));
    }
    title.push_str(&format!(
        " ({}/{})",
        state.favorites.rows.len(),
        state.favorites.favorite_count
    ));
    if state.favorites.loading {
        title.push_str(" loading...");
    }
    Line::from(title)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
