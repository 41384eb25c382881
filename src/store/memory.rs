use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PostStore, StoreResult};
use crate::post::{Post, PostInput};

/// In-process post store. Ids come from a monotonically increasing counter
/// and are never reused, even after a delete.
#[derive(Debug)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { posts: RwLock::new(Vec::new()), next_id: AtomicI64::new(1) }
    }

    /// A store holding the two sample posts (ids 1 and 2).
    pub fn seeded() -> Self {
        let posts = vec![
            Post::from_input(1, PostInput::new("title of post 1", "content of post 1")),
            Post::from_input(2, PostInput::new("title of post 2", "content of post 2")),
        ];
        Self { posts: RwLock::new(posts), next_id: AtomicI64::new(3) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Post>> {
        Ok(self.posts.read().await.clone())
    }

    async fn insert(&self, input: PostInput) -> StoreResult<Post> {
        let mut posts = self.posts.write().await;
        // Allocated under the write lock so list order matches id order.
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let post = Post::from_input(id, input);
        posts.push(post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn replace(&self, id: i64, input: PostInput) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(slot) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        *slot = Post::from_input(id, input);
        Ok(Some(slot.clone()))
    }

    async fn remove_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let mut posts = self.posts.write().await;
        let Some(index) = posts.iter().position(|p| p.id == id) else {
            return Ok(None);
        };
        Ok(Some(posts.remove(index)))
    }
}
