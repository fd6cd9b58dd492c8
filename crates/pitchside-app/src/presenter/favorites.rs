// Favorites screen: directory players in the favorite set, with search,
// remove-one and remove-all.

use pitchside_core::player::{Player, PlayerId};
use pitchside_core::store::{AvatarMap, FavoriteSet, KeyValueStore, Preferences, StoreError};
use tracing::debug;

use super::{filter_players, player_row, with_avatar, Lifecycle, ListingSnapshot, RefreshTicket};
use crate::protocol::FavoritesView;

/// Result of a remove-all request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    /// The durable set was already empty; nothing was written.
    NothingToClear,
}

#[derive(Debug, Default)]
pub struct FavoritesPresenter {
    lifecycle: Lifecycle,
    loading: bool,
    players: Vec<Player>,
    favorites: FavoriteSet,
    avatars: AvatarMap,
    search: String,
}

impl FavoritesPresenter {
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

    pub fn apply_refresh(&mut self, ticket: RefreshTicket, snapshot: ListingSnapshot) -> bool {
        if !self.lifecycle.accepts(ticket) {
            debug!("Discarding stale favorites refresh");
            return false;
        }
        self.players = snapshot.players;
        self.favorites = snapshot.favorites;
        self.avatars = snapshot.avatars;
        self.loading = false;
        true
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn favorites(&self) -> &FavoriteSet {
        &self.favorites
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn favorite_players(&self) -> Vec<&Player> {
        filter_players(&self.players, &self.search, None)
            .into_iter()
            .filter(|p| self.favorites.contains(&p.id))
            .collect()
    }

    /// Favorite players matching the search, avatar overrides applied.
    pub fn visible_players(&self) -> Vec<Player> {
        self.favorite_players()
            .into_iter()
            .map(|p| with_avatar(p, &self.avatars))
            .collect()
    }

    pub async fn remove_favorite<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
        id: &PlayerId,
    ) -> Result<(), StoreError> {
        self.favorites = prefs.remove_favorite(id).await?;
        Ok(())
    }

    pub async fn clear_all<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
    ) -> Result<ClearOutcome, StoreError> {
        let current = prefs.favorite_ids().await;
        if current.is_empty() {
            self.favorites = current;
            return Ok(ClearOutcome::NothingToClear);
        }
        prefs.clear_all_favorites().await?;
        self.favorites = FavoriteSet::new();
        Ok(ClearOutcome::Cleared)
    }

    pub fn view(&self) -> FavoritesView {
        FavoritesView {
            loading: self.loading,
            rows: self
                .favorite_players()
                .into_iter()
                .map(|p| player_row(p, &self.favorites, &self.avatars))
                .collect(),
            search: self.search.clone(),
            favorite_count: self.favorites.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
