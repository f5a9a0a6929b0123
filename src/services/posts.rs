use crate::models::RelievePost;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading posts
#[derive(Debug, Error)]
pub enum PostRepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supplies the full, unfiltered post collection
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn all_posts(&self) -> Result<Vec<RelievePost>, PostRepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<RelievePost>, PostRepositoryError>;
}

/// Posts held in memory, typically loaded once from a JSON seed file
#[derive(Debug, Clone, Default)]
pub struct InMemoryPostRepository {
    posts: Vec<RelievePost>,
}

impl InMemoryPostRepository {
    pub fn new(posts: Vec<RelievePost>) -> Self {
        Self { posts }
    }

    /// Parse a JSON array of posts
    pub fn from_json_str(json: &str) -> Result<Self, PostRepositoryError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a JSON array of posts from disk
    pub async fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, PostRepositoryError> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        let repository = Self::from_json_str(&json)?;

        tracing::info!(
            "Loaded {} posts from {}",
            repository.posts.len(),
            path.as_ref().display()
        );

        Ok(repository)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn all_posts(&self) -> Result<Vec<RelievePost>, PostRepositoryError> {
        Ok(self.posts.clone())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<RelievePost>, PostRepositoryError> {
        Ok(self.posts.iter().find(|p| p.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"[
        {
            "id": "1",
            "title": "Cần cứu trợ khẩn cấp",
            "description": "Khu vực đang bị ngập sâu",
            "location": { "latitude": 21.1234, "longitude": 105.5678, "address": "Phường Đông Anh, Hà Nội" },
            "urgency": "critical",
            "postedAt": "2024-10-01T08:00:00Z",
            "contactPhone": "0912345678",
            "needs": ["Thuyền cứu hộ", "Áo phao"],
            "status": "active"
        },
        {
            "id": "2",
            "location": { "latitude": 21.2234, "longitude": 105.6678, "address": "Xã Mỹ Đức, Hà Nội" },
            "urgency": "high"
        }
    ]"#;

    #[test]
    fn test_parse_seed() {
        let repository = InMemoryPostRepository::from_json_str(SEED).unwrap();
        assert_eq!(repository.len(), 2);
    }

    #[test]
    fn test_find_by_id() {
        let repository = InMemoryPostRepository::from_json_str(SEED).unwrap();

        let post = tokio_test::block_on(repository.find_by_id("1")).unwrap().unwrap();
        assert_eq!(post.needs.len(), 2);
        assert!(post.posted_at.is_some());

        assert!(tokio_test::block_on(repository.find_by_id("missing")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_seed() {
        assert!(matches!(
            InMemoryPostRepository::from_json_str("{\"id\": 1}"),
            Err(PostRepositoryError::Parse(_))
        ));
    }
}
