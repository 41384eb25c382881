//! Persistence contract for posts.
//!
//! [`PostStore`] is what the handlers consume. Two implementations honor the
//! same contract and are swapped at the composition root:
//!
//! - [`MemoryStore`] — an ordered in-process list, insertion order preserved.
//! - [`PgStore`] — a PostgreSQL `posts` table via a `sqlx` pool.
//!
//! Absence is always `Ok(None)`. `Err` is reserved for infrastructure faults.

mod memory;
mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::post::{Post, PostInput};

pub use memory::MemoryStore;
pub use postgres::{ConnectOptions, PgStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<Post>>;

    /// Persists `input` under a fresh id and returns the stored post.
    async fn insert(&self, input: PostInput) -> StoreResult<Post>;

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>>;

    /// Replaces every mutable field of post `id`. Never creates a post.
    async fn replace(&self, id: i64, input: PostInput) -> StoreResult<Option<Post>>;

    /// Removes post `id`, returning what was removed.
    async fn remove_by_id(&self, id: i64) -> StoreResult<Option<Post>>;

    /// Cheap liveness check of the backing storage.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
