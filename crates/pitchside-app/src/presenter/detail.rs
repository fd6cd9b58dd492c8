// Detail screen for a single player.

use pitchside_core::player::{group_feedbacks, star_counts, Player, PlayerId, StarFilter};
use pitchside_core::store::{KeyValueStore, Preferences, StoreError};
use tracing::debug;

use super::{DetailSnapshot, Lifecycle, RefreshTicket};
use crate::protocol::{DetailView, FeedbackGroup, FeedbackLine};

/// Holds the player record it was opened with. The record is never
/// re-fetched; only membership and the avatar override are refreshed.
#[derive(Debug)]
pub struct DetailPresenter {
    lifecycle: Lifecycle,
    player: Player,
    is_favorite: bool,
    avatar: Option<String>,
    star_filter: StarFilter,
}

impl DetailPresenter {
    pub fn new(player: Player) -> Self {
        Self {
            lifecycle: Lifecycle::default(),
            player,
            is_favorite: false,
            avatar: None,
            star_filter: StarFilter::All,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player.id
    }

    pub fn on_visible(&mut self) -> RefreshTicket {
        self.lifecycle.on_visible()
    }

    pub fn on_hidden(&mut self) {
        self.lifecycle.on_hidden();
    }

    pub fn is_visible(&self) -> bool {
        self.lifecycle.is_visible()
    }

    pub fn apply_refresh(&mut self, ticket: RefreshTicket, snapshot: DetailSnapshot) -> bool {
        if !self.lifecycle.accepts(ticket) {
            debug!(player = %self.player.id, "Discarding stale detail refresh");
            return false;
        }
        self.is_favorite = snapshot.is_favorite;
        self.avatar = snapshot.avatar;
        true
    }

    pub fn is_favorite(&self) -> bool {
        self.is_favorite
    }

    pub async fn toggle_favorite<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
    ) -> Result<bool, StoreError> {
        let written = prefs.toggle_favorite(&self.player.id).await?;
        self.is_favorite = written.contains(&self.player.id);
        Ok(self.is_favorite)
    }

    /// Persist `uri` as this player's avatar, then show it.
    pub async fn set_avatar<S: KeyValueStore>(
        &mut self,
        prefs: &Preferences<S>,
        uri: &str,
    ) -> Result<(), StoreError> {
        prefs.set_avatar_override(&self.player.id, uri).await?;
        self.avatar = Some(uri.to_string());
        Ok(())
    }

    /// The avatar override when one is set, else the remote image.
    pub fn image(&self) -> &str {
        self.avatar.as_deref().unwrap_or(&self.player.image)
    }

    pub fn set_star_filter(&mut self, filter: StarFilter) {
        self.star_filter = filter;
    }

    pub fn star_filter(&self) -> StarFilter {
        self.star_filter
    }

    /// Feedback grouped by rating (highest first), narrowed by the filter.
    pub fn feedback_groups(&self) -> Vec<FeedbackGroup> {
        group_feedbacks(&self.player.feedbacks)
            .into_iter()
            .filter(|(rating, _)| self.star_filter.matches(*rating))
            .map(|(rating, entries)| FeedbackGroup {
                rating,
                entries: entries
                    .into_iter()
                    .map(|fb| FeedbackLine {
                        comment: fb.comment.clone(),
                        author: fb.author.clone(),
                        date: fb.display_date(),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn view(&self) -> DetailView {
        let p = &self.player;
        DetailView {
            id: p.id.clone(),
            name: p.name.clone(),
            team: p.team.clone(),
            position: p.position_label(),
            minutes: p.format_minutes(),
            accuracy: p.format_accuracy(),
            image: self.image().to_string(),
            has_custom_image: self.avatar.is_some(),
            is_favorite: self.is_favorite,
            star_filter: self.star_filter,
            star_counts: star_counts(&p.feedbacks),
            feedback: self.feedback_groups(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
