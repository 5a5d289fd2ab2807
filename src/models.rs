use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
    Anime,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Movie, MediaKind::Series, MediaKind::Anime];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Series => "series",
            MediaKind::Anime => "anime",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Series => "Series",
            MediaKind::Anime => "Anime",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "movie" => Ok(MediaKind::Movie),
            "series" => Ok(MediaKind::Series),
            "anime" => Ok(MediaKind::Anime),
            other => Err(anyhow::anyhow!("Unknown media type '{}'", other)),
        }
    }
}

/// A trackable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub poster: String,
    /// Aggregate rating on a 0–10 scale.
    pub rating: f32,
    pub kind: MediaKind,
    pub genres: Vec<String>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: String,
    pub name: String,
    pub character: String,
    pub avatar: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub number: u32,
    pub title: String,
    /// Minutes.
    pub duration: u32,
    pub thumbnail: String,
    pub watched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Season {
    pub id: String,
    pub number: u32,
    pub episode_count: u32,
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub watching: u64,
    pub completed: u64,
    pub plan_to_watch: u64,
}

impl EngagementStats {
    pub fn total(&self) -> u64 {
        self.watching + self.completed + self.plan_to_watch
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetails {
    #[serde(flatten)]
    pub media: Media,
    pub backdrop: String,
    pub synopsis: String,
    pub director: Option<String>,
    pub creator: Option<String>,
    pub cast: Vec<CastMember>,
    pub tags: Vec<String>,
    pub trailer_url: Option<String>,
    pub seasons: Option<Vec<Season>>,
    /// Minutes, movies only.
    pub runtime: Option<u32>,
    pub total_episodes: Option<u32>,
    pub stats: EngagementStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchStatus {
    Watching,
    Completed,
    PlanToWatch,
    OnHold,
    Dropped,
}

impl WatchStatus {
    pub const ALL: [WatchStatus; 5] = [
        WatchStatus::Watching,
        WatchStatus::Completed,
        WatchStatus::PlanToWatch,
        WatchStatus::OnHold,
        WatchStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "watching",
            WatchStatus::Completed => "completed",
            WatchStatus::PlanToWatch => "plan_to_watch",
            WatchStatus::OnHold => "on_hold",
            WatchStatus::Dropped => "dropped",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WatchStatus::Watching => "Watching",
            WatchStatus::Completed => "Completed",
            WatchStatus::PlanToWatch => "Plan to Watch",
            WatchStatus::OnHold => "On Hold",
            WatchStatus::Dropped => "Dropped",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| anyhow::anyhow!("Unknown watch status '{}'", s))
    }
}

/// The signed-in user's personal tracking state for one media item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMediaStatus {
    pub status: Option<WatchStatus>,
    /// 1–5 stars.
    pub user_rating: Option<u8>,
    pub is_favorite: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub rewatches: u32,
    /// Episodes marked watched across all seasons.
    pub current_episode: Option<u32>,
    pub notes: String,
}

/// Session placeholder. Replaced wholesale on login, cleared on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityUser {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub bio: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserList {
    pub id: String,
    pub name: String,
    pub cover: String,
    pub item_count: u32,
    pub is_public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_parses_case_insensitively() {
        assert_eq!("Anime".parse::<MediaKind>().unwrap(), MediaKind::Anime);
        assert_eq!(" series ".parse::<MediaKind>().unwrap(), MediaKind::Series);
        assert!("book".parse::<MediaKind>().is_err());
    }

    #[test]
    fn watch_status_round_trips_through_str() {
        for status in WatchStatus::ALL {
            assert_eq!(status.as_str().parse::<WatchStatus>().unwrap(), status);
        }
        assert!("none".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn display_name_prefers_username() {
        let mut user = User {
            id: "u".to_string(),
            email: "a@b.c".to_string(),
            username: None,
            avatar_url: None,
        };
        assert_eq!(user.display_name(), "a@b.c");
        user.username = Some("owl".to_string());
        assert_eq!(user.display_name(), "owl");
    }
}
