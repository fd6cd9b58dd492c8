// Screen presenters and the refresh lifecycle they share.
//
// A presenter holds a transient copy of the directory and preference
// slices it needs. The copy is refreshed only when the screen becomes
// visible: `on_visible` hands out a `RefreshTicket`, the caller loads a
// snapshot (possibly on another task), and `apply_refresh` accepts it only
// while the screen is still visible and no newer refresh has started.

pub mod detail;
pub mod favorites;
pub mod home;

use pitchside_core::directory::{load_directory, DirectorySource};
use pitchside_core::player::{Player, PlayerId};
use pitchside_core::store::{AvatarMap, FavoriteSet, KeyValueStore, Preferences};

use crate::protocol::PlayerRow;

pub use detail::DetailPresenter;
pub use favorites::{ClearOutcome, FavoritesPresenter};
pub use home::HomePresenter;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Identifies one refresh started by `on_visible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    generation: u64,
}

/// Visibility state plus a generation counter. Every visibility transition
/// bumps the generation, which invalidates results from earlier refreshes.
#[derive(Debug, Default)]
pub struct Lifecycle {
    visible: bool,
    generation: u64,
}

impl Lifecycle {
    pub fn on_visible(&mut self) -> RefreshTicket {
        self.visible = true;
        self.generation += 1;
        RefreshTicket {
            generation: self.generation,
        }
    }

    pub fn on_hidden(&mut self) {
        self.visible = false;
        self.generation += 1;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a result loaded for `ticket` may still be applied.
    pub fn accepts(&self, ticket: RefreshTicket) -> bool {
        self.visible && ticket.generation == self.generation
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Directory plus preference slices for a listing screen.
#[derive(Debug, Clone, Default)]
pub struct ListingSnapshot {
    pub players: Vec<Player>,
    pub favorites: FavoriteSet,
    pub avatars: AvatarMap,
}

/// Preference slices for the detail screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailSnapshot {
    pub is_favorite: bool,
    pub avatar: Option<String>,
}

/// Fetch the directory, then the favorite set and the avatar overrides of
/// the fetched players. A failed fetch yields an empty listing.
pub async fn load_listing<S: KeyValueStore>(
    directory: &dyn DirectorySource,
    prefs: &Preferences<S>,
) -> ListingSnapshot {
    let players = load_directory(directory).await;
    let favorites = prefs.favorite_ids().await;
    let ids: Vec<PlayerId> = players.iter().map(|p| p.id.clone()).collect();
    let avatars = prefs.avatar_overrides(&ids).await;
    ListingSnapshot {
        players,
        favorites,
        avatars,
    }
}

pub async fn load_detail<S: KeyValueStore>(prefs: &Preferences<S>, id: &PlayerId) -> DetailSnapshot {
    DetailSnapshot {
        is_favorite: prefs.favorite_ids().await.contains(id),
        avatar: prefs.avatar_override(id).await,
    }
}

// ---------------------------------------------------------------------------
// Shared listing helpers
// ---------------------------------------------------------------------------

/// Case-insensitive substring match on name, plus an exact team match when
/// a team is selected.
pub fn filter_players<'a>(
    players: &'a [Player],
    search: &str,
    team: Option<&str>,
) -> Vec<&'a Player> {
    let needle = search.to_lowercase();
    players
        .iter()
        .filter(|p| team.map_or(true, |t| p.team == t))
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

/// The player with its avatar override (if any) applied to `image`.
pub fn with_avatar(player: &Player, avatars: &AvatarMap) -> Player {
    let mut shown = player.clone();
    if let Some(uri) = avatars.get(&player.id) {
        shown.image = uri.clone();
    }
    shown
}

pub(crate) fn player_row(player: &Player, favorites: &FavoriteSet, avatars: &AvatarMap) -> PlayerRow {
    PlayerRow {
        id: player.id.clone(),
        name: player.name.clone(),
        team: player.team.clone(),
        position: player.position_label(),
        minutes: player.format_minutes(),
        accuracy: player.format_accuracy(),
        image: avatars
            .get(&player.id)
            .cloned()
            .unwrap_or_else(|| player.image.clone()),
        is_favorite: favorites.contains(&player.id),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn player(id: &str, name: &str, team: &str) -> Player {
        Player {
            id: PlayerId::new(id),
            name: name.to_string(),
            team: team.to_string(),
            position: "Midfielder".to_string(),
            is_captain: false,
            minutes_played: 90,
            passing_accuracy: 0.75,
            image: format!("https://img.example/{id}.png"),
            feedbacks: vec![],
        }
    }

    pub(crate) fn roster() -> Vec<Player> {
        vec![
            player("1", "Anna", "Team A"),
            player("2", "Andy", "Team B"),
            player("3", "Beth", "Team A"),
        ]
    }

    #[test]
    fn team_and_search_filters_combine() {
        let players = roster();
        let names: Vec<&str> = filter_players(&players, "an", Some("Team A"))
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["Anna"]);
    }

    #[test]
    fn search_is_case_insensitive() {
        let players = roster();
        assert_eq!(filter_players(&players, "AN", None).len(), 2);
    }

    #[test]
    fn empty_filters_keep_everyone() {
        let players = roster();
        assert_eq!(filter_players(&players, "", None).len(), 3);
    }

    #[test]
    fn avatar_override_replaces_image() {
        let anna = player("1", "Anna", "Team A");
        let mut avatars = AvatarMap::new();
        assert_eq!(with_avatar(&anna, &avatars).image, anna.image);
        avatars.insert(PlayerId::new("1"), "file:///anna.png".to_string());
        assert_eq!(with_avatar(&anna, &avatars).image, "file:///anna.png");
    }

    #[test]
    fn lifecycle_rejects_stale_and_hidden_results() {
        let mut lc = Lifecycle::default();
        let first = lc.on_visible();
        assert!(lc.accepts(first));

        let second = lc.on_visible();
        assert!(!lc.accepts(first));
        assert!(lc.accepts(second));

        lc.on_hidden();
        assert!(!lc.accepts(second));
        assert!(!lc.is_visible());
    }
}
