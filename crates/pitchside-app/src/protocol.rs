// Messages exchanged between the orchestrator and a front end.
//
// Front ends send `UserCommand`s; the orchestrator answers with `UiUpdate`s
// carrying render-ready views.

use pitchside_core::player::{PlayerId, StarCounts, StarFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Home,
    Favorites,
    Detail,
}

/// Commands from the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Switch to a listing screen (Home or Favorites).
    Show(ScreenId),
    /// Open the detail screen for a player on the current listing.
    OpenDetail(PlayerId),
    /// Leave the detail screen.
    Back,
    /// Update the search text of the current listing.
    SetSearch(String),
    /// Select a team filter on Home. Selecting the active team clears it.
    SelectTeam(Option<String>),
    ToggleFavorite(PlayerId),
    /// Remove one favorite (already confirmed by the user).
    RemoveFavorite(PlayerId),
    /// Remove every favorite (already confirmed by the user).
    ClearFavorites,
    /// Set the detail player's avatar from a local image path.
    PickAvatar { path: String },
    SetStarFilter(StarFilter),
    /// Reload the current screen.
    Refresh,
    Quit,
}

/// Updates pushed to the front end.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    Loading(ScreenId),
    Home(HomeView),
    Favorites(FavoritesView),
    Detail(Box<DetailView>),
    Notice(Notice),
}

/// One row of a player listing, with the avatar override already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRow {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
    pub minutes: String,
    pub accuracy: String,
    pub image: String,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeView {
    pub loading: bool,
    pub rows: Vec<PlayerRow>,
    pub teams: Vec<String>,
    pub selected_team: Option<String>,
    pub search: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FavoritesView {
    pub loading: bool,
    pub rows: Vec<PlayerRow>,
    pub search: String,
    /// Size of the favorite set, independent of the search filter.
    pub favorite_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub id: PlayerId,
    pub name: String,
    pub team: String,
    pub position: String,
    pub minutes: String,
    pub accuracy: String,
    pub image: String,
    pub has_custom_image: bool,
    pub is_favorite: bool,
    pub star_filter: StarFilter,
    pub star_counts: StarCounts,
    pub feedback: Vec<FeedbackGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackGroup {
    pub rating: u8,
    pub entries: Vec<FeedbackLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackLine {
    pub comment: String,
    pub author: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A user-visible message (alert).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Warn,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
