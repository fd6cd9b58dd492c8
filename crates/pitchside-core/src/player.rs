// Player records as served by the remote directory, plus the display
// helpers shared by every screen (minutes, accuracy, feedback grouping).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// Stable player identifier.
///
/// The directory serves ids as JSON strings, but numeric ids are accepted
/// and normalized so `"7"` and `7` name the same player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        PlayerId(id.to_string())
    }
}

impl<'de> Deserialize<'de> for PlayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Int(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => PlayerId(s),
            RawId::Int(n) => PlayerId(n.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Player / Feedback
// ---------------------------------------------------------------------------

/// A player record from the directory. Treated as immutable by the app; the
/// only local overlay is the avatar override applied by presenters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    #[serde(rename = "playerName")]
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
    #[serde(rename = "isCaptain", default)]
    pub is_captain: bool,
    #[serde(rename = "MinutesPlayed", default)]
    pub minutes_played: u32,
    /// Ratio in 0.0..=1.0.
    #[serde(rename = "PassingAccuracy", default)]
    pub passing_accuracy: f64,
    /// Remote default image URI.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub feedbacks: Vec<Feedback>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    /// 1 to 5 stars.
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
}

impl Player {
    /// Minutes played as `"{hours}h {minutes}m"`.
    pub fn format_minutes(&self) -> String {
        format!("{}h {}m", self.minutes_played / 60, self.minutes_played % 60)
    }

    /// Passing accuracy as a whole percentage, e.g. `0.873` -> `"87%"`.
    pub fn format_accuracy(&self) -> String {
        format!("{:.0}%", self.passing_accuracy * 100.0)
    }

    pub fn position_label(&self) -> String {
        if self.is_captain {
            format!("{} (C)", self.position)
        } else {
            self.position.clone()
        }
    }
}

impl Feedback {
    /// Render the feedback date as `d/m/yyyy`. Falls back to the raw string
    /// when it is neither RFC 3339 nor a plain `YYYY-MM-DD` date.
    pub fn display_date(&self) -> String {
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.date) {
            return dt.format("%-d/%-m/%Y").to_string();
        }
        if let Ok(d) = NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            return d.format("%-d/%-m/%Y").to_string();
        }
        self.date.clone()
    }
}

/// Distinct team names in first-seen order.
pub fn team_names(players: &[Player]) -> Vec<String> {
    let mut teams: Vec<String> = Vec::new();
    for p in players {
        if !teams.iter().any(|t| t == &p.team) {
            teams.push(p.team.clone());
        }
    }
    teams
}

// ---------------------------------------------------------------------------
// Feedback grouping
// ---------------------------------------------------------------------------

/// Star filter for the detail screen's feedback list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StarFilter {
    #[default]
    All,
    Stars(u8),
}

impl StarFilter {
    pub fn matches(&self, rating: u8) -> bool {
        match self {
            StarFilter::All => true,
            StarFilter::Stars(n) => *n == rating,
        }
    }
}

/// Feedback counts for the filter chips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarCounts {
    pub all: usize,
    /// Index 0 holds one-star entries, index 4 five-star entries.
    by_rating: [usize; 5],
}

impl StarCounts {
    pub fn get(&self, rating: u8) -> usize {
        match rating {
            1..=5 => self.by_rating[(rating - 1) as usize],
            _ => 0,
        }
    }
}

/// Group feedback by rating, highest rating first. Entries keep their
/// original order within a group.
pub fn group_feedbacks(feedbacks: &[Feedback]) -> Vec<(u8, Vec<&Feedback>)> {
    let mut groups: BTreeMap<u8, Vec<&Feedback>> = BTreeMap::new();
    for fb in feedbacks {
        groups.entry(fb.rating).or_default().push(fb);
    }
    groups.into_iter().rev().collect()
}

pub fn star_counts(feedbacks: &[Feedback]) -> StarCounts {
    let mut counts = StarCounts::default();
    for fb in feedbacks {
        counts.all += 1;
        if (1..=5).contains(&fb.rating) {
            counts.by_rating[(fb.rating - 1) as usize] += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
