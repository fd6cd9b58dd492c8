// Home screen: the full directory with search, team filter and favorite
// toggles.

use pitchside_core::player::{team_names, Player, PlayerId};
use pitchside_core::store::{AvatarMap, FavoriteSet, KeyValueStore, Preferences, StoreError};
use tracing::debug;

use super::{filter_players, player_row, with_avatar, Lifecycle, ListingSnapshot, RefreshTicket};
use crate::protocol::HomeView;

#[derive(Debug, Default)]
pub struct HomePresenter {
    lifecycle: Lifecycle,
    loading: bool,
    players: Vec<Player>,
    favorites: FavoriteSet,
    avatars: AvatarMap,
    search: String,
    selected_team: Option<String>,
}

impl HomePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_visible(&mut self) -> RefreshTicket {
        self.loading = true;
        self.lifecycle.on_visible()
    }

    pub fn on_hidden(&mut self) {
        self.loading = false;
        self.lifecycle.on_hidden();
    }

    pub fn is_visible(&self) -> bool {
        self.lifecycle.is_visible()
    }

    /// Apply a loaded snapshot. Returns `false` (and changes nothing) when
    /// the ticket is stale or the screen is hidden.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, snapshot: ListingSnapshot) -> bool {
        if !self.lifecycle.accepts(ticket) {
            debug!("Discarding stale home refresh");
            return false;
        }
        self.players = snapshot.players;
        self.favorites = snapshot.favorites;
        self.avatars = snapshot.avatars;
        self.loading = false;
        if let Some(team) = &self.selected_team {
            if !self.players.iter().any(|p| &p.team == team) {
                self.selected_team = None;
            }
        }
        true
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    /// Select a team filter. Selecting the already selected team clears it.
    pub fn select_team(&mut self, team: Option<String>) {
        self.selected_team = match team {
            Some(t) if self.selected_team.as_deref() == Some(t.as_str()) => None,
            other => other,
        };
    }

    pub fn selected_team(&self) -> Option<&str> {
        self.selected_team.as_deref()
    }

    pub fn teams(&self) -> Vec<String> {
        team_names(&self.players)
    }

    pub fn is_favorite(&self, id: &PlayerId) -> bool {
        self.favorites.contains(id)
    }

    /// The unmodified directory record, as handed to the detail screen.
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Filtered players with avatar overrides applied.
    pub fn visible_players(&self) -> Vec<Player> {
        filter_players(&self.players, &self.search, self.selected_team.as_deref())
            .into_iter()
            .map(|p| with_avatar(p, &self.avatars))
            .collect()
    }

    /// Flip favorite membership through the store and adopt the set it
    /// wrote. On failure the in-memory set is left untouched.
    pub async fn toggle_favorite<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
        id: &PlayerId,
    ) -> Result<bool, StoreError> {
        let written = prefs.toggle_favorite(id).await?;
        self.favorites = written;
        Ok(self.favorites.contains(id))
    }

    pub fn view(&self) -> HomeView {
        HomeView {
            loading: self.loading,
            rows: filter_players(&self.players, &self.search, self.selected_team.as_deref())
                .into_iter()
                .map(|p| player_row(p, &self.favorites, &self.avatars))
                .collect(),
            teams: self.teams(),
            selected_team: self.selected_team.clone(),
            search: self.search.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::tests::roster;
    use pitchside_core::store::MemoryStore;

    fn loaded(favorites: &[&str]) -> HomePresenter {
        let mut home = HomePresenter::new();
        let ticket = home.on_visible();
        let snapshot = ListingSnapshot {
            players: roster(),
            favorites: favorites.iter().map(|s| PlayerId::new(*s)).collect(),
            avatars: AvatarMap::new(),
        };
        assert!(home.apply_refresh(ticket, snapshot));
        home
    }

    #[test]
    fn view_is_loading_until_refresh_lands() {
        let mut home = HomePresenter::new();
        let _ticket = home.on_visible();
        assert!(home.view().loading);
    }

    #[test]
    fn team_and_search_yield_anna() {
        let mut home = loaded(&[]);
        home.select_team(Some("Team A".to_string()));
        home.set_search("an");
        let names: Vec<String> = home.view().rows.into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Anna"]);
    }

    #[test]
    fn selecting_active_team_clears_filter() {
        let mut home = loaded(&[]);
        home.select_team(Some("Team B".to_string()));
        assert_eq!(home.selected_team(), Some("Team B"));
        home.select_team(Some("Team B".to_string()));
        assert_eq!(home.selected_team(), None);
    }

    #[test]
    fn teams_come_from_directory() {
        let home = loaded(&[]);
        assert_eq!(home.teams(), vec!["Team A", "Team B"]);
    }

    #[test]
    fn refresh_after_hide_is_discarded() {
        let mut home = HomePresenter::new();
        let ticket = home.on_visible();
        home.on_hidden();
        let applied = home.apply_refresh(
            ticket,
            ListingSnapshot {
                players: roster(),
                ..Default::default()
            },
        );
        assert!(!applied);
        assert!(home.visible_players().is_empty());
    }

    #[test]
    fn avatar_override_shows_in_rows() {
        let mut home = HomePresenter::new();
        let ticket = home.on_visible();
        let mut avatars = AvatarMap::new();
        avatars.insert(PlayerId::new("2"), "file:///andy.png".to_string());
        home.apply_refresh(
            ticket,
            ListingSnapshot {
                players: roster(),
                favorites: FavoriteSet::new(),
                avatars,
            },
        );
        let rows = home.view().rows;
        assert_eq!(rows[1].image, "file:///andy.png");
        assert_eq!(rows[0].image, "https://img.example/1.png");
        // Detail receives the untouched record.
        assert_eq!(
            home.player(&PlayerId::new("2")).unwrap().image,
            "https://img.example/2.png"
        );
    }

    #[tokio::test]
    async fn toggle_updates_store_and_snapshot() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut home = loaded(&[]);
        let id = PlayerId::new("3");

        assert!(home.toggle_favorite(&prefs, &id).await.unwrap());
        assert!(home.is_favorite(&id));
        assert!(prefs.favorite_ids().await.contains(&id));

        assert!(!home.toggle_favorite(&prefs, &id).await.unwrap());
        assert!(!home.is_favorite(&id));
        assert!(prefs.favorite_ids().await.is_empty());
    }

    #[tokio::test]
    async fn toggle_merges_with_durable_state_not_stale_snapshot() {
        let prefs = Preferences::new(MemoryStore::new());
        let mut home = loaded(&[]);
        // Another screen favorited player 1 after Home loaded.
        prefs.toggle_favorite(&PlayerId::new("1")).await.unwrap();

        home.toggle_favorite(&prefs, &PlayerId::new("2")).await.unwrap();
        assert!(home.is_favorite(&PlayerId::new("1")));
        assert_eq!(prefs.favorite_ids().await.len(), 2);
    }
}
