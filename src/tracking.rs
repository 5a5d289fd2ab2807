//! Per-title tracking state for the signed-in user. Volatile; cleared on logout.
use crate::models::{Episode, Media, Season, UserMediaStatus, WatchStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub const MAX_STARS: u8 = 5;
pub const LOG_SEARCH_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuickList {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

pub const QUICK_LISTS: [QuickList; 4] = [
    QuickList {
        id: "favorites",
        name: "Favorites",
        icon: "❤️",
    },
    QuickList {
        id: "watching",
        name: "Currently Watching",
        icon: "👁️",
    },
    QuickList {
        id: "completed",
        name: "Completed",
        icon: "✅",
    },
    QuickList {
        id: "plan_to_watch",
        name: "Plan to Watch",
        icon: "📋",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    #[error("Rating must be between 1 and {max} stars, got {0}", max = MAX_STARS)]
    RatingOutOfRange(u8),
    #[error("Select at least one list")]
    NoListSelected,
}

/// One "I watched this" record from the log dialog.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub media_id: String,
    pub watched_on: NaiveDate,
    pub rewatch: bool,
    pub review: String,
    pub tags: Vec<String>,
    /// 0 means unrated.
    pub rating: u8,
    pub liked: bool,
}

/// Splits a comma separated tag field, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Title or genre substring matches for the log dialog's search step.
pub fn log_search(items: &[Media], query: &str) -> Vec<Media> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    items
        .iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&query)
                || m.genres.iter().any(|g| g.to_lowercase().contains(&query))
        })
        .take(LOG_SEARCH_LIMIT)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonProgress {
    pub watched: usize,
    pub total: usize,
    pub percent: f32,
}

pub fn season_progress(season: &Season, is_watched: impl Fn(&Episode) -> bool) -> SeasonProgress {
    let total = season.episodes.len();
    let watched = season.episodes.iter().filter(|e| is_watched(e)).count();
    let percent = if total > 0 {
        watched as f32 / total as f32 * 100.0
    } else {
        0.0
    };
    SeasonProgress {
        watched,
        total,
        percent,
    }
}

#[derive(Debug, Default)]
struct TrackingState {
    statuses: HashMap<String, UserMediaStatus>,
    episode_overrides: HashMap<(String, String), bool>,
    lists: HashMap<String, Vec<String>>,
    log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Default)]
pub struct TrackingStore {
    inner: Arc<Mutex<TrackingState>>,
}

impl TrackingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn status(&self, media_id: &str) -> UserMediaStatus {
        self.inner
            .lock()
            .await
            .statuses
            .get(media_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Watching stamps the start date; completing stamps the end date once.
    pub async fn set_status(
        &self,
        media_id: &str,
        status: Option<WatchStatus>,
        today: NaiveDate,
    ) -> UserMediaStatus {
        let mut guard = self.inner.lock().await;
        let entry = guard.statuses.entry(media_id.to_string()).or_default();
        entry.status = status;
        match status {
            Some(WatchStatus::Watching) => entry.start_date = Some(today),
            Some(WatchStatus::Completed) if entry.end_date.is_none() => {
                entry.end_date = Some(today)
            }
            _ => {}
        }
        info!(
            "Status for {} set to {}",
            media_id,
            status.map(|s| s.as_str()).unwrap_or("none")
        );
        entry.clone()
    }

    pub async fn rate(&self, media_id: &str, stars: u8) -> Result<UserMediaStatus, TrackingError> {
        if !(1..=MAX_STARS).contains(&stars) {
            return Err(TrackingError::RatingOutOfRange(stars));
        }
        let mut guard = self.inner.lock().await;
        let entry = guard.statuses.entry(media_id.to_string()).or_default();
        entry.user_rating = Some(stars);
        Ok(entry.clone())
    }

    /// Returns the new favorite flag.
    pub async fn toggle_favorite(&self, media_id: &str) -> bool {
        let mut guard = self.inner.lock().await;
        let entry = guard.statuses.entry(media_id.to_string()).or_default();
        entry.is_favorite = !entry.is_favorite;
        entry.is_favorite
    }

    pub async fn save_notes(&self, media_id: &str, notes: &str) {
        let mut guard = self.inner.lock().await;
        guard
            .statuses
            .entry(media_id.to_string())
            .or_default()
            .notes = notes.trim().to_string();
    }

    pub async fn is_episode_watched(&self, media_id: &str, episode: &Episode) -> bool {
        self.inner
            .lock()
            .await
            .episode_overrides
            .get(&(media_id.to_string(), episode.id.clone()))
            .copied()
            .unwrap_or(episode.watched)
    }

    /// Flips the effective watched flag. Returns the new value.
    pub async fn toggle_episode(&self, media_id: &str, episode: &Episode) -> bool {
        let mut guard = self.inner.lock().await;
        let key = (media_id.to_string(), episode.id.clone());
        let current = guard
            .episode_overrides
            .get(&key)
            .copied()
            .unwrap_or(episode.watched);
        guard.episode_overrides.insert(key, !current);
        debug!("Episode {} of {} watched={}", episode.id, media_id, !current);
        !current
    }

    /// Recounts watched episodes across `seasons` into `current_episode`.
    pub async fn sync_episode_progress(&self, media_id: &str, seasons: &[Season]) -> u32 {
        let mut guard = self.inner.lock().await;
        let watched = seasons
            .iter()
            .flat_map(|s| &s.episodes)
            .filter(|e| {
                guard
                    .episode_overrides
                    .get(&(media_id.to_string(), e.id.clone()))
                    .copied()
                    .unwrap_or(e.watched)
            })
            .count() as u32;
        guard
            .statuses
            .entry(media_id.to_string())
            .or_default()
            .current_episode = Some(watched);
        watched
    }

    /// Snapshot of overrides for one title, keyed by episode id.
    pub async fn episode_overrides(&self, media_id: &str) -> HashMap<String, bool> {
        self.inner
            .lock()
            .await
            .episode_overrides
            .iter()
            .filter(|((media, _), _)| media == media_id)
            .map(|((_, episode), watched)| (episode.clone(), *watched))
            .collect()
    }

    pub async fn add_to_lists(
        &self,
        media_id: &str,
        list_ids: &[String],
    ) -> Result<Vec<String>, TrackingError> {
        if list_ids.is_empty() {
            return Err(TrackingError::NoListSelected);
        }
        let mut guard = self.inner.lock().await;
        let lists = guard.lists.entry(media_id.to_string()).or_default();
        for id in list_ids {
            if !lists.contains(id) {
                lists.push(id.clone());
            }
        }
        info!("Added {} to lists {:?}", media_id, list_ids);
        Ok(lists.clone())
    }

    pub async fn lists_for(&self, media_id: &str) -> Vec<String> {
        self.inner
            .lock()
            .await
            .lists
            .get(media_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn log_viewing(&self, entry: LogEntry) -> Result<(), TrackingError> {
        if entry.rating > MAX_STARS {
            return Err(TrackingError::RatingOutOfRange(entry.rating));
        }
        let mut guard = self.inner.lock().await;
        if entry.rewatch {
            guard
                .statuses
                .entry(entry.media_id.clone())
                .or_default()
                .rewatches += 1;
        }
        info!("Logged viewing of {} on {}", entry.media_id, entry.watched_on);
        guard.log.push(entry);
        Ok(())
    }

    pub async fn log(&self) -> Vec<LogEntry> {
        self.inner.lock().await.log.clone()
    }

    pub async fn clear(&self) {
        *self.inner.lock().await = TrackingState::default();
    }
}
