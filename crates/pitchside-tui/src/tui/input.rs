// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState mutations (selection, input modes,
// dialogs).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use pitchside_app::protocol::{ScreenId, UserCommand};
use pitchside_core::player::StarFilter;

use super::{ConfirmAction, InputMode, ViewState};

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// orchestrator. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm.is_some() {
        return handle_confirm(key_event, view_state);
    }

    // Any key dismisses a notice and is otherwise swallowed.
    if view_state.notice.is_some() {
        view_state.notice = None;
        return None;
    }

    match view_state.input_mode {
        InputMode::Search => return handle_search_mode(key_event, view_state),
        InputMode::AvatarPath => return handle_avatar_mode(key_event, view_state),
        InputMode::Normal => {}
    }

    let screen = view_state.active();
    match key_event.code {
        KeyCode::Char('1') => Some(UserCommand::Show(ScreenId::Home)),
        KeyCode::Char('2') => Some(UserCommand::Show(ScreenId::Favorites)),

        KeyCode::Down | KeyCode::Char('j') => {
            move_down(view_state);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            move_up(view_state);
            None
        }

        KeyCode::Enter => view_state
            .selected_row()
            .map(|row| UserCommand::OpenDetail(row.id.clone())),

        KeyCode::Char('f') => match screen {
            ScreenId::Home => view_state
                .selected_row()
                .map(|row| UserCommand::ToggleFavorite(row.id.clone())),
            // Every row here is a favorite, so the heart removes.
            ScreenId::Favorites => {
                confirm_remove(view_state);
                None
            }
            ScreenId::Detail => view_state
                .detail
                .as_ref()
                .map(|d| UserCommand::ToggleFavorite(d.id.clone())),
        },

        KeyCode::Char('/') if screen != ScreenId::Detail => {
            view_state.input_buffer = view_state.current_search().to_string();
            view_state.input_mode = InputMode::Search;
            None
        }

        KeyCode::Char('t') if screen == ScreenId::Home => {
            Some(UserCommand::SelectTeam(next_team(view_state)))
        }

        KeyCode::Char('d') if screen == ScreenId::Favorites => {
            confirm_remove(view_state);
            None
        }

        KeyCode::Char('D') if screen == ScreenId::Favorites => {
            // Nothing to confirm; the orchestrator reports the empty set.
            if view_state.favorites.favorite_count == 0 {
                return Some(UserCommand::ClearFavorites);
            }
            view_state.confirm = Some(ConfirmAction::ClearFavorites);
            None
        }

        KeyCode::Char('a') if screen == ScreenId::Detail => {
            view_state.input_buffer.clear();
            view_state.input_mode = InputMode::AvatarPath;
            None
        }

        KeyCode::Char(c @ '0'..='5') if screen == ScreenId::Detail => {
            let filter = match c {
                '0' => StarFilter::All,
                _ => StarFilter::Stars(c as u8 - b'0'),
            };
            view_state.detail_scroll = 0;
            Some(UserCommand::SetStarFilter(filter))
        }

        KeyCode::Esc | KeyCode::Char('b') if screen == ScreenId::Detail => {
            Some(UserCommand::Back)
        }

        // Esc on a listing clears an active search.
        KeyCode::Esc if !view_state.current_search().is_empty() => {
            Some(UserCommand::SetSearch(String::new()))
        }

        KeyCode::Char('r') => Some(UserCommand::Refresh),

        KeyCode::Char('q') => {
            view_state.confirm = Some(ConfirmAction::Quit);
            None
        }

        _ => None,
    }
}

/// `y` confirms the pending action, `n` or `Esc` cancels. Everything else is
/// blocked.
fn handle_confirm(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            view_state.confirm.take().map(|action| action.command())
        }
        // `q` again confirms a pending quit.
        KeyCode::Char('q') | KeyCode::Char('Q')
            if view_state.confirm == Some(ConfirmAction::Quit) =>
        {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm = None;
            None
        }
        _ => None,
    }
}

/// Search mode: every edit is forwarded so the list filters as you type.
/// Enter keeps the text, Esc clears it.
fn handle_search_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.input_mode = InputMode::Normal;
            view_state.input_buffer.clear();
            Some(UserCommand::SetSearch(String::new()))
        }
        KeyCode::Enter => {
            view_state.input_mode = InputMode::Normal;
            view_state.input_buffer.clear();
            None
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
            Some(UserCommand::SetSearch(view_state.input_buffer.clone()))
        }
        KeyCode::Char(c) => {
            view_state.input_buffer.push(c);
            Some(UserCommand::SetSearch(view_state.input_buffer.clone()))
        }
        _ => None,
    }
}

/// Avatar path entry: Enter submits the path, Esc abandons the pick.
fn handle_avatar_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.input_mode = InputMode::Normal;
            view_state.input_buffer.clear();
            None
        }
        KeyCode::Enter => {
            view_state.input_mode = InputMode::Normal;
            let path = std::mem::take(&mut view_state.input_buffer);
            Some(UserCommand::PickAvatar { path })
        }
        KeyCode::Backspace => {
            view_state.input_buffer.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.input_buffer.push(c);
            None
        }
        _ => None,
    }
}

/// Ask before removing the selected favorite.
fn confirm_remove(view_state: &mut ViewState) {
    if let Some(row) = view_state.selected_row() {
        view_state.confirm = Some(ConfirmAction::RemoveFavorite {
            id: row.id.clone(),
            name: row.name.clone(),
        });
    }
}

/// Team after the selected one in chip order; `None` after the last team.
fn next_team(view_state: &ViewState) -> Option<String> {
    let teams = &view_state.home.teams;
    match view_state.home.selected_team.as_deref() {
        None => teams.first().cloned(),
        Some(current) => teams
            .iter()
            .position(|t| t == current)
            .and_then(|i| teams.get(i + 1))
            .cloned(),
    }
}

fn move_down(view_state: &mut ViewState) {
    if view_state.active() == ScreenId::Detail {
        view_state.detail_scroll = view_state.detail_scroll.saturating_add(1);
    } else {
        view_state.move_selection(1);
    }
}

fn move_up(view_state: &mut ViewState) {
    if view_state.active() == ScreenId::Detail {
        view_state.detail_scroll = view_state.detail_scroll.saturating_sub(1);
    } else {
        view_state.move_selection(-1);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
