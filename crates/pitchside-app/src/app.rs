// Application state and orchestration logic.
//
// The event loop owns the three presenters and the preference store. It
// processes user commands one at a time, spawns refresh tasks on every
// visibility transition and applies their results when they come back.

use std::sync::Arc;

use pitchside_core::avatar::{pick_image, PickError};
use pitchside_core::directory::DirectorySource;
use pitchside_core::player::PlayerId;
use pitchside_core::store::{KeyValueStore, Preferences, StoreError};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::presenter::{
    load_detail, load_listing, ClearOutcome, DetailPresenter, DetailSnapshot, FavoritesPresenter,
    HomePresenter, ListingSnapshot, RefreshTicket,
};
use crate::protocol::{Notice, ScreenId, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// Refresh results
// ---------------------------------------------------------------------------

/// Result of a refresh task, sent back to the event loop.
///
/// `write_seq` is the store write sequence at the time the task started.
/// Preference slices loaded before a later local write are re-read when the
/// result is applied.
#[derive(Debug)]
pub enum RefreshResult {
    Listing {
        screen: ScreenId,
        ticket: RefreshTicket,
        write_seq: u64,
        snapshot: ListingSnapshot,
    },
    Detail {
        /// Player the refresh was started for. A result for a detail screen
        /// that has since been replaced is dropped.
        id: PlayerId,
        ticket: RefreshTicket,
        write_seq: u64,
        snapshot: DetailSnapshot,
    },
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState<S: KeyValueStore + 'static> {
    pub prefs: Arc<Preferences<S>>,
    pub directory: Arc<dyn DirectorySource>,
    pub home: HomePresenter,
    pub favorites: FavoritesPresenter,
    /// Present only while the detail screen is shown.
    pub detail: Option<DetailPresenter>,
    pub active: ScreenId,
    /// Listing screen that opened the current detail screen.
    pub return_to: ScreenId,
    /// Refresh tasks send their results through a clone of this sender.
    pub refresh_tx: mpsc::Sender<RefreshResult>,
    /// Bumped after every successful preference write.
    pub write_seq: u64,
}

impl<S: KeyValueStore + 'static> AppState<S> {
    pub fn new(
        prefs: Arc<Preferences<S>>,
        directory: Arc<dyn DirectorySource>,
        refresh_tx: mpsc::Sender<RefreshResult>,
    ) -> Self {
        AppState {
            prefs,
            directory,
            home: HomePresenter::new(),
            favorites: FavoritesPresenter::new(),
            detail: None,
            active: ScreenId::Home,
            return_to: ScreenId::Home,
            refresh_tx,
            write_seq: 0,
        }
    }

    /// Render-ready view of the active screen.
    pub fn current_view(&self) -> Option<UiUpdate> {
        match self.active {
            ScreenId::Home => Some(UiUpdate::Home(self.home.view())),
            ScreenId::Favorites => Some(UiUpdate::Favorites(self.favorites.view())),
            ScreenId::Detail => self
                .detail
                .as_ref()
                .map(|d| UiUpdate::Detail(Box::new(d.view()))),
        }
    }

    fn hide_active(&mut self) {
        match self.active {
            ScreenId::Home => self.home.on_hidden(),
            ScreenId::Favorites => self.favorites.on_hidden(),
            ScreenId::Detail => {
                if let Some(mut detail) = self.detail.take() {
                    detail.on_hidden();
                }
            }
        }
    }

    /// Mark the active screen visible again and start its refresh.
    fn refresh_active(&mut self) {
        match self.active {
            ScreenId::Home => {
                let ticket = self.home.on_visible();
                self.spawn_listing_refresh(ScreenId::Home, ticket);
            }
            ScreenId::Favorites => {
                let ticket = self.favorites.on_visible();
                self.spawn_listing_refresh(ScreenId::Favorites, ticket);
            }
            ScreenId::Detail => {
                if let Some(detail) = self.detail.as_mut() {
                    let ticket = detail.on_visible();
                    let id = detail.player_id().clone();
                    self.spawn_detail_refresh(id, ticket);
                }
            }
        }
    }

    fn spawn_listing_refresh(&self, screen: ScreenId, ticket: RefreshTicket) {
        let prefs = Arc::clone(&self.prefs);
        let directory = Arc::clone(&self.directory);
        let tx = self.refresh_tx.clone();
        let write_seq = self.write_seq;
        tokio::spawn(async move {
            let snapshot = load_listing(directory.as_ref(), &prefs).await;
            let _ = tx
                .send(RefreshResult::Listing {
                    screen,
                    ticket,
                    write_seq,
                    snapshot,
                })
                .await;
        });
    }

    fn spawn_detail_refresh(&self, id: PlayerId, ticket: RefreshTicket) {
        let prefs = Arc::clone(&self.prefs);
        let tx = self.refresh_tx.clone();
        let write_seq = self.write_seq;
        tokio::spawn(async move {
            let snapshot = load_detail(&prefs, &id).await;
            let _ = tx
                .send(RefreshResult::Detail {
                    id,
                    ticket,
                    write_seq,
                    snapshot,
                })
                .await;
        });
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Shows Home, then listens for user commands and refresh results with
/// `tokio::select!` until `Quit` arrives or the command channel closes.
pub async fn run<S: KeyValueStore + 'static>(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut refresh_rx: mpsc::Receiver<RefreshResult>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState<S>,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    show_screen(&mut state, ScreenId::Home, &ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        handle_user_command(&mut state, cmd, &ui_tx).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            Some(result) = refresh_rx.recv() => {
                handle_refresh(&mut state, result, &ui_tx).await;
            }
        }
    }

    Ok(())
}

/// Switch to `screen`, hiding the current one. Detail is entered only
/// through `OpenDetail`.
pub async fn show_screen<S: KeyValueStore + 'static>(
    state: &mut AppState<S>,
    screen: ScreenId,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if screen == ScreenId::Detail {
        warn!("Detail screen requested without a player, ignoring");
        return;
    }
    state.hide_active();
    state.active = screen;
    state.refresh_active();
    let _ = ui_tx.send(UiUpdate::Loading(screen)).await;
    if let Some(view) = state.current_view() {
        let _ = ui_tx.send(view).await;
    }
}

async fn open_detail<S: KeyValueStore + 'static>(
    state: &mut AppState<S>,
    id: PlayerId,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let player = match state.active {
        ScreenId::Home => state.home.player(&id).cloned(),
        ScreenId::Favorites => state.favorites.player(&id).cloned(),
        ScreenId::Detail => None,
    };
    let Some(player) = player else {
        warn!(player = %id, "Open detail for unknown player");
        notify(ui_tx, Notice::warn(format!("Player {id} is not in this list"))).await;
        return;
    };

    state.return_to = state.active;
    state.hide_active();
    state.detail = Some(DetailPresenter::new(player));
    state.active = ScreenId::Detail;
    state.refresh_active();
    let _ = ui_tx.send(UiUpdate::Loading(ScreenId::Detail)).await;
    if let Some(view) = state.current_view() {
        let _ = ui_tx.send(view).await;
    }
}

/// Apply a finished refresh if its screen still accepts it.
pub async fn handle_refresh<S: KeyValueStore + 'static>(
    state: &mut AppState<S>,
    result: RefreshResult,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let prefs = Arc::clone(&state.prefs);

    let applied = match result {
        RefreshResult::Listing {
            screen,
            ticket,
            write_seq,
            mut snapshot,
        } => {
            if write_seq != state.write_seq {
                debug!("Preferences changed during {:?} refresh, re-reading", screen);
                let ids: Vec<PlayerId> = snapshot.players.iter().map(|p| p.id.clone()).collect();
                snapshot.favorites = prefs.favorite_ids().await;
                snapshot.avatars = prefs.avatar_overrides(&ids).await;
            }
            match screen {
                ScreenId::Home => state.home.apply_refresh(ticket, snapshot),
                ScreenId::Favorites => state.favorites.apply_refresh(ticket, snapshot),
                ScreenId::Detail => false,
            }
        }
        RefreshResult::Detail {
            id,
            ticket,
            write_seq,
            mut snapshot,
        } => match state.detail.as_mut() {
            Some(detail) if detail.player_id() == &id => {
                if write_seq != state.write_seq {
                    snapshot = load_detail(&prefs, &id).await;
                }
                detail.apply_refresh(ticket, snapshot)
            }
            _ => {
                debug!(player = %id, "Dropping refresh for a closed detail screen");
                false
            }
        },
    };

    if applied {
        if let Some(view) = state.current_view() {
            let _ = ui_tx.send(view).await;
        }
    }
}

fn write_failed(action: &str, e: &StoreError) -> Notice {
    warn!("{} failed: {}", action, e);
    Notice::error(format!("Could not {action}: {e}"))
}

async fn notify(ui_tx: &mpsc::Sender<UiUpdate>, notice: Notice) {
    let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
}

/// Process a user command from the front end. Every command that changes
/// what the active screen shows is answered with its fresh view.
pub async fn handle_user_command<S: KeyValueStore + 'static>(
    state: &mut AppState<S>,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let prefs = Arc::clone(&state.prefs);

    match cmd {
        UserCommand::Show(screen) => {
            show_screen(state, screen, ui_tx).await;
            return;
        }
        UserCommand::OpenDetail(id) => {
            open_detail(state, id, ui_tx).await;
            return;
        }
        UserCommand::Back => {
            if state.active == ScreenId::Detail {
                let target = state.return_to;
                show_screen(state, target, ui_tx).await;
            }
            return;
        }
        UserCommand::Refresh => {
            info!("Refreshing {:?}", state.active);
            state.refresh_active();
            let _ = ui_tx.send(UiUpdate::Loading(state.active)).await;
        }
        UserCommand::SetSearch(text) => match state.active {
            ScreenId::Home => state.home.set_search(text),
            ScreenId::Favorites => state.favorites.set_search(text),
            ScreenId::Detail => return,
        },
        UserCommand::SelectTeam(team) => {
            if state.active != ScreenId::Home {
                return;
            }
            state.home.select_team(team);
        }
        UserCommand::ToggleFavorite(id) => {
            let result = match state.active {
                ScreenId::Home => state.home.toggle_favorite(&prefs, &id).await.map(|_| ()),
                // Removal from Favorites only goes through a confirmed RemoveFavorite.
                ScreenId::Favorites => {
                    debug!(player = %id, "Toggle ignored on Favorites");
                    return;
                }
                ScreenId::Detail => match state.detail.as_mut() {
                    Some(detail) => detail.toggle_favorite(&prefs).await.map(|_| ()),
                    None => return,
                },
            };
            if let Err(e) = result {
                notify(ui_tx, write_failed("update favorites", &e)).await;
                return;
            }
            state.write_seq += 1;
        }
        UserCommand::RemoveFavorite(id) => {
            if state.active != ScreenId::Favorites {
                debug!(player = %id, "Remove ignored outside Favorites");
                return;
            }
            if let Err(e) = state.favorites.remove_favorite(&prefs, &id).await {
                notify(ui_tx, write_failed("remove favorite", &e)).await;
                return;
            }
            state.write_seq += 1;
        }
        UserCommand::ClearFavorites => {
            if state.active != ScreenId::Favorites {
                return;
            }
            match state.favorites.clear_all(&prefs).await {
                Ok(ClearOutcome::Cleared) => {
                    info!("Cleared all favorites");
                    state.write_seq += 1;
                    notify(ui_tx, Notice::info("All favorites removed")).await;
                }
                Ok(ClearOutcome::NothingToClear) => {
                    notify(ui_tx, Notice::info("There are no favorites to remove")).await;
                }
                Err(e) => {
                    notify(ui_tx, write_failed("clear favorites", &e)).await;
                    return;
                }
            }
        }
        UserCommand::PickAvatar { path } => {
            let Some(detail) = state.detail.as_mut() else {
                return;
            };
            let uri = match pick_image(&path) {
                Ok(uri) => uri,
                Err(PickError::Cancelled) => {
                    debug!("Avatar pick cancelled");
                    return;
                }
                Err(e @ PickError::PermissionDenied { .. }) => {
                    warn!("Avatar pick denied: {}", e);
                    notify(ui_tx, Notice::warn(format!("Permission needed: {e}"))).await;
                    return;
                }
                Err(e) => {
                    warn!("Avatar pick failed: {}", e);
                    notify(ui_tx, Notice::warn(e.to_string())).await;
                    return;
                }
            };
            if let Err(e) = detail.set_avatar(&prefs, &uri).await {
                notify(ui_tx, write_failed("save avatar", &e)).await;
                return;
            }
            state.write_seq += 1;
        }
        UserCommand::SetStarFilter(filter) => match state.detail.as_mut() {
            Some(detail) => detail.set_star_filter(filter),
            None => return,
        },
        UserCommand::Quit => return,
    }

    if let Some(view) = state.current_view() {
        let _ = ui_tx.send(view).await;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pitchside_core::player::{Player, StarFilter};
    use pitchside_core::store::MemoryStore;

    use crate::presenter::tests::roster;
    use crate::protocol::NoticeLevel;

    struct StaticDirectory(Vec<Player>);

    #[async_trait]
    impl DirectorySource for StaticDirectory {
        async fn fetch_players(&self) -> anyhow::Result<Vec<Player>> {
            Ok(self.0.clone())
        }
    }

    struct Harness {
        state: AppState<MemoryStore>,
        refresh_rx: mpsc::Receiver<RefreshResult>,
        ui_tx: mpsc::Sender<UiUpdate>,
        ui_rx: mpsc::Receiver<UiUpdate>,
    }

    impl Harness {
        fn new() -> Self {
            let (refresh_tx, refresh_rx) = mpsc::channel(16);
            let (ui_tx, ui_rx) = mpsc::channel(64);
            let state = AppState::new(
                Arc::new(Preferences::new(MemoryStore::new())),
                Arc::new(StaticDirectory(roster())),
                refresh_tx,
            );
            Harness {
                state,
                refresh_rx,
                ui_tx,
                ui_rx,
            }
        }

        async fn command(&mut self, cmd: UserCommand) {
            handle_user_command(&mut self.state, cmd, &self.ui_tx).await;
        }

        /// Wait for the next refresh task and apply it.
        async fn settle(&mut self) {
            let result = self.refresh_rx.recv().await.unwrap();
            handle_refresh(&mut self.state, result, &self.ui_tx).await;
        }

        fn drain(&mut self) -> Vec<UiUpdate> {
            let mut out = Vec::new();
            while let Ok(update) = self.ui_rx.try_recv() {
                out.push(update);
            }
            out
        }

        fn notices(&mut self) -> Vec<Notice> {
            self.drain()
                .into_iter()
                .filter_map(|u| match u {
                    UiUpdate::Notice(n) => Some(n),
                    _ => None,
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn showing_home_loads_directory() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;

        let updates = h.drain();
        assert!(matches!(updates[0], UiUpdate::Loading(ScreenId::Home)));
        match updates.last() {
            Some(UiUpdate::Home(view)) => {
                assert!(!view.loading);
                assert_eq!(view.rows.len(), 3);
            }
            other => panic!("expected Home view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn toggle_on_home_writes_store() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;

        h.command(UserCommand::ToggleFavorite(PlayerId::new("2"))).await;
        assert!(h
            .state
            .prefs
            .favorite_ids()
            .await
            .contains(&PlayerId::new("2")));
        assert!(h.state.home.is_favorite(&PlayerId::new("2")));
    }

    #[tokio::test]
    async fn open_detail_and_back_returns_to_listing() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Favorites)).await;
        h.settle().await;
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;

        h.command(UserCommand::OpenDetail(PlayerId::new("1"))).await;
        assert_eq!(h.state.active, ScreenId::Detail);
        assert_eq!(h.state.return_to, ScreenId::Home);
        h.settle().await;

        h.command(UserCommand::ToggleFavorite(PlayerId::new("1"))).await;
        h.command(UserCommand::Back).await;
        assert_eq!(h.state.active, ScreenId::Home);
        assert!(h.state.detail.is_none());
        h.settle().await;
        assert!(h.state.home.is_favorite(&PlayerId::new("1")));
    }

    #[tokio::test]
    async fn open_unknown_player_warns() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::OpenDetail(PlayerId::new("99"))).await;
        assert_eq!(h.state.active, ScreenId::Home);
        let notices = h.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warn);
    }

    #[tokio::test]
    async fn toggle_on_favorites_is_ignored() {
        let mut h = Harness::new();
        h.state
            .prefs
            .toggle_favorite(&PlayerId::new("1"))
            .await
            .unwrap();
        h.command(UserCommand::Show(ScreenId::Favorites)).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::ToggleFavorite(PlayerId::new("1"))).await;
        assert!(h.drain().is_empty());
        assert!(h
            .state
            .prefs
            .favorite_ids()
            .await
            .contains(&PlayerId::new("1")));
        assert_eq!(h.state.write_seq, 0);
    }

    #[tokio::test]
    async fn clearing_empty_favorites_reports_info() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Favorites)).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::ClearFavorites).await;
        let notices = h.notices();
        assert_eq!(notices, vec![Notice::info("There are no favorites to remove")]);
    }

    #[tokio::test]
    async fn stale_refresh_after_switch_is_dropped() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        // Leave before the Home refresh lands.
        h.command(UserCommand::Show(ScreenId::Favorites)).await;

        let mut results = Vec::new();
        results.push(h.refresh_rx.recv().await.unwrap());
        results.push(h.refresh_rx.recv().await.unwrap());
        for result in results {
            handle_refresh(&mut h.state, result, &h.ui_tx).await;
        }
        assert!(h.state.home.visible_players().is_empty());
        assert!(h.state.favorites.is_visible());
    }

    #[tokio::test]
    async fn refresh_loaded_before_a_write_rereads_favorites() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        let early = h.refresh_rx.recv().await.unwrap();

        h.command(UserCommand::ToggleFavorite(PlayerId::new("2"))).await;
        handle_refresh(&mut h.state, early, &h.ui_tx).await;

        assert_eq!(h.state.home.visible_players().len(), 3);
        assert!(h.state.home.is_favorite(&PlayerId::new("2")));
    }

    #[tokio::test]
    async fn cancelled_avatar_pick_is_silent() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;
        h.command(UserCommand::OpenDetail(PlayerId::new("3"))).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::PickAvatar {
            path: "   ".to_string(),
        })
        .await;
        assert!(h.drain().is_empty());
        assert!(h.state.prefs.avatar_override(&PlayerId::new("3")).await.is_none());
    }

    #[tokio::test]
    async fn missing_avatar_file_warns_and_writes_nothing() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;
        h.command(UserCommand::OpenDetail(PlayerId::new("3"))).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::PickAvatar {
            path: "/definitely/not/here.png".to_string(),
        })
        .await;
        let notices = h.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level, NoticeLevel::Warn);
        assert!(h.state.prefs.avatar_override(&PlayerId::new("3")).await.is_none());
    }

    #[tokio::test]
    async fn star_filter_updates_detail_view() {
        let mut h = Harness::new();
        h.command(UserCommand::Show(ScreenId::Home)).await;
        h.settle().await;
        h.command(UserCommand::OpenDetail(PlayerId::new("1"))).await;
        h.settle().await;
        h.drain();

        h.command(UserCommand::SetStarFilter(StarFilter::Stars(5))).await;
        match h.drain().pop() {
            Some(UiUpdate::Detail(view)) => assert_eq!(view.star_filter, StarFilter::Stars(5)),
            other => panic!("expected Detail view, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn event_loop_handles_quit_command() {
        let (refresh_tx, refresh_rx) = mpsc::channel(16);
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        let (ui_tx, mut ui_rx) = mpsc::channel(64);
        let state = AppState::new(
            Arc::new(Preferences::new(MemoryStore::new())),
            Arc::new(StaticDirectory(roster())),
            refresh_tx,
        );

        let handle = tokio::spawn(run(cmd_rx, refresh_rx, ui_tx, state));
        assert!(matches!(
            ui_rx.recv().await,
            Some(UiUpdate::Loading(ScreenId::Home))
        ));

        cmd_tx.send(UserCommand::Quit).await.unwrap();
        let result = handle.await.unwrap();
        assert!(result.is_ok());
    }
}
