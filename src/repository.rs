use crate::catalog;
use crate::models::{CommunityUser, Media, MediaDetails, UserList};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of catalog data. The in-memory implementation serves the seed set;
/// a networked one can be swapped in behind the same trait.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn list_media(&self) -> Result<Vec<Media>>;
    async fn get_media(&self, id: &str) -> Result<Option<Media>>;
    async fn get_details(&self, id: &str) -> Result<Option<MediaDetails>>;
    async fn community_users(&self) -> Result<Vec<CommunityUser>>;
    async fn user_lists(&self) -> Result<Vec<UserList>>;
}

#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    media: Vec<Media>,
    details: HashMap<String, MediaDetails>,
    users: Vec<CommunityUser>,
    lists: Vec<UserList>,
}

impl InMemoryRepository {
    pub fn seeded() -> Self {
        Self::with_media(catalog::media().to_vec())
    }

    pub fn with_media(media: Vec<Media>) -> Self {
        let details = media
            .iter()
            .map(|m| (m.id.clone(), catalog::build_details(m)))
            .collect();
        Self {
            media,
            details,
            users: catalog::community_users(),
            lists: catalog::user_lists(),
        }
    }
}

#[async_trait]
impl MediaRepository for InMemoryRepository {
    async fn list_media(&self) -> Result<Vec<Media>> {
        Ok(self.media.clone())
    }

    async fn get_media(&self, id: &str) -> Result<Option<Media>> {
        Ok(self.media.iter().find(|m| m.id == id).cloned())
    }

    async fn get_details(&self, id: &str) -> Result<Option<MediaDetails>> {
        Ok(self.details.get(id).cloned())
    }

    async fn community_users(&self) -> Result<Vec<CommunityUser>> {
        Ok(self.users.clone())
    }

    async fn user_lists(&self) -> Result<Vec<UserList>> {
        Ok(self.lists.clone())
    }
}

/// Titles sharing at least one genre with `media`, excluding itself.
pub fn similar_media(all: &[Media], media: &Media, limit: usize) -> Vec<Media> {
    all.iter()
        .filter(|m| m.id != media.id && m.genres.iter().any(|g| media.genres.contains(g)))
        .take(limit)
        .cloned()
        .collect()
}

/// Highest rated titles first; ties keep catalog order.
pub fn top_rated(all: &[Media], limit: usize) -> Vec<Media> {
    let mut sorted = all.to_vec();
    sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    sorted.truncate(limit);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_repository_serves_catalog_and_details() {
        let repo = InMemoryRepository::seeded();
        assert_eq!(repo.list_media().await.unwrap().len(), 24);
        let dark = repo.get_media("24").await.unwrap().unwrap();
        assert_eq!(dark.title, "Dark");
        let details = repo.get_details("24").await.unwrap().unwrap();
        assert_eq!(details.media, dark);
        assert!(repo.get_media("999").await.unwrap().is_none());
        assert!(repo.get_details("999").await.unwrap().is_none());
    }

    #[test]
    fn similar_excludes_self_and_requires_shared_genre() {
        let all = catalog::media();
        let office = &all[10];
        assert_eq!(office.title, "The Office");
        let similar = similar_media(all, office, 8);
        assert!(!similar.is_empty());
        assert!(similar.len() <= 8);
        for m in &similar {
            assert_ne!(m.id, office.id);
            assert!(m.genres.iter().any(|g| g == "Comedy"));
        }
    }

    #[test]
    fn top_rated_orders_by_rating() {
        let top = top_rated(catalog::media(), 3);
        let titles: Vec<_> = top.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, ["Breaking Bad", "Chernobyl", "The Shawshank Redemption"]);
    }
}
