// Terminal front end: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the views pushed by the app
// orchestrator. `UiUpdate` messages arrive over an mpsc channel; the TUI
// applies them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::HashMap;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use pitchside_app::protocol::{
    DetailView, FavoritesView, HomeView, Notice, PlayerRow, ScreenId, UiUpdate, UserCommand,
};
use pitchside_core::player::PlayerId;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::{debug, info};

use layout::build_layout;

// ---------------------------------------------------------------------------
// Input modes
// ---------------------------------------------------------------------------

/// What typed characters currently go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    /// Editing the search text of the active listing.
    Search,
    /// Typing the path of an avatar image on the detail screen.
    AvatarPath,
}

/// A destructive action waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    Quit,
    RemoveFavorite { id: PlayerId, name: String },
    ClearFavorites,
}

impl ConfirmAction {
    pub fn title(&self) -> &'static str {
        match self {
            ConfirmAction::Quit => " Quit? ",
            ConfirmAction::RemoveFavorite { .. } => " Remove favorite ",
            ConfirmAction::ClearFavorites => " Remove all ",
        }
    }

    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::Quit => "Really quit?".to_string(),
            ConfirmAction::RemoveFavorite { name, .. } => {
                format!("Remove {name} from favorites?")
            }
            ConfirmAction::ClearFavorites => "Remove every favorite player?".to_string(),
        }
    }

    /// Command sent when the user confirms.
    pub fn command(&self) -> UserCommand {
        match self {
            ConfirmAction::Quit => UserCommand::Quit,
            ConfirmAction::RemoveFavorite { id, .. } => UserCommand::RemoveFavorite(id.clone()),
            ConfirmAction::ClearFavorites => UserCommand::ClearFavorites,
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the orchestrator's views for rendering.
#[derive(Debug, Default)]
pub struct ViewState {
    pub screen: ScreenId,
    pub home: HomeView,
    pub favorites: FavoritesView,
    /// Present while the detail screen is open.
    pub detail: Option<DetailView>,
    /// Selected row per listing screen.
    pub selected: HashMap<ScreenId, usize>,
    /// First feedback line shown on the detail screen.
    pub detail_scroll: usize,
    pub input_mode: InputMode,
    /// Text being typed in `Search` or `AvatarPath` mode.
    pub input_buffer: String,
    pub confirm: Option<ConfirmAction>,
    /// Latest notice, shown until dismissed.
    pub notice: Option<Notice>,
}

impl ViewState {
    pub fn active(&self) -> ScreenId {
        self.screen
    }

    /// Rows of the active listing screen (empty on Detail).
    pub fn rows(&self) -> &[PlayerRow] {
        match self.active() {
            ScreenId::Home => &self.home.rows,
            ScreenId::Favorites => &self.favorites.rows,
            ScreenId::Detail => &[],
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected.get(&self.active()).copied().unwrap_or(0)
    }

    pub fn selected_row(&self) -> Option<&PlayerRow> {
        self.rows().get(self.selected_index())
    }

    /// Move the listing selection by `delta`, clamped to the rows.
    pub fn move_selection(&mut self, delta: isize) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let current = self.selected_index() as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.selected.insert(self.active(), next);
    }

    /// Search text of the active listing as last reported.
    pub fn current_search(&self) -> &str {
        match self.active() {
            ScreenId::Home => &self.home.search,
            ScreenId::Favorites => &self.favorites.search,
            ScreenId::Detail => "",
        }
    }

    pub fn is_loading(&self) -> bool {
        match self.active() {
            ScreenId::Home => self.home.loading,
            ScreenId::Favorites => self.favorites.loading,
            ScreenId::Detail => self.detail.is_none(),
        }
    }

    fn clamp_selection(&mut self, screen: ScreenId, len: usize) {
        let entry = self.selected.entry(screen).or_insert(0);
        *entry = (*entry).min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Loading(screen) => {
            if state.active() != screen {
                state.input_mode = InputMode::Normal;
                state.input_buffer.clear();
            }
            if screen == ScreenId::Detail {
                state.detail_scroll = 0;
            } else {
                state.detail = None;
            }
            state.screen = screen;
        }
        UiUpdate::Home(view) => {
            let len = view.rows.len();
            state.home = view;
            state.clamp_selection(ScreenId::Home, len);
        }
        UiUpdate::Favorites(view) => {
            let len = view.rows.len();
            state.favorites = view;
            state.clamp_selection(ScreenId::Favorites, len);
        }
        UiUpdate::Detail(view) => {
            state.detail = Some(*view);
        }
        UiUpdate::Notice(notice) => {
            debug!("Notice: {}", notice.message);
            state.notice = Some(notice);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete frame: active screen plus any overlay.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let area = frame.area();
    let layout = build_layout(area);

    widgets::status_bar::render(frame, layout.status_bar, state);
    match state.active() {
        ScreenId::Home | ScreenId::Favorites => {
            widgets::player_list::render(frame, layout.main_panel, state);
        }
        ScreenId::Detail => widgets::detail::render(frame, layout.main_panel, state),
    }
    widgets::help_bar::render_input_line(frame, layout.input_line, state);
    widgets::help_bar::render(frame, layout.help_bar, state);

    if let Some(action) = &state.confirm {
        widgets::confirm::render(frame, area, action);
    } else if let Some(notice) = &state.notice {
        widgets::notice::render(frame, area, notice);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => {
                        info!("UI channel closed");
                        break;
                    }
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
