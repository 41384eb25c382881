//! PostgreSQL-backed post store.
//!
//! Expects an existing table shaped like
//!
//! ```sql
//! CREATE TABLE posts (
//!     id        SERIAL PRIMARY KEY,
//!     title     TEXT NOT NULL,
//!     content   TEXT NOT NULL,
//!     published BOOLEAN NOT NULL DEFAULT TRUE,
//!     rating    INTEGER            -- optional column
//! );
//! ```
//!
//! No schema is created here. The table is inspected once at startup: a
//! missing required column fails fast, and a table without `rating` is
//! served with `rating` always `null`. Columns are cast on the way out so
//! both `SERIAL` and `BIGSERIAL` ids decode into `i64`.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};

use super::{PostStore, StoreResult};
use crate::error::StoreError;
use crate::post::{Post, PostInput};

const REQUIRED_COLUMNS: [&str; 4] = ["id", "title", "content", "published"];

/// Pool and startup-retry settings for [`PgStore::connect_with_retry`].
#[derive(Clone, Debug)]
pub struct ConnectOptions {
    pub max_connections: u32,
    /// How long a single connection attempt may take.
    pub acquire_timeout: Duration,
    /// Fixed pause between failed connection attempts.
    pub retry_delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            retry_delay: Duration::from_secs(2),
            max_attempts: None,
        }
    }
}

/// Which optional columns the `posts` table carries.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct TableShape {
    has_rating: bool,
}

impl TableShape {
    fn from_columns(columns: &[String]) -> StoreResult<Self> {
        if columns.is_empty() {
            return Err(StoreError::Schema("table `posts` does not exist".to_owned()));
        }
        let missing: Vec<&str> = REQUIRED_COLUMNS
            .into_iter()
            .filter(|required| !columns.iter().any(|c| c == required))
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::Schema(format!(
                "table `posts` is missing column(s): {}",
                missing.join(", ")
            )));
        }
        Ok(Self { has_rating: columns.iter().any(|c| c == "rating") })
    }

    fn returning(self) -> &'static str {
        if self.has_rating {
            "id::int8 AS id, title, content, published, rating::int8 AS rating"
        } else {
            "id::int8 AS id, title, content, published, NULL::int8 AS rating"
        }
    }

    fn select_all(self) -> String {
        format!("SELECT {} FROM posts ORDER BY id", self.returning())
    }

    fn select_one(self) -> String {
        format!("SELECT {} FROM posts WHERE id = $1", self.returning())
    }

    /// Binds: title, content, published, then rating if present.
    fn insert(self) -> String {
        let (cols, params) = if self.has_rating {
            ("title, content, published, rating", "$1, $2, $3, $4")
        } else {
            ("title, content, published", "$1, $2, $3")
        };
        format!("INSERT INTO posts ({cols}) VALUES ({params}) RETURNING {}", self.returning())
    }

    /// Binds: title, content, published, id, then rating if present.
    fn update(self) -> String {
        let rating = if self.has_rating { ", rating = $5" } else { "" };
        format!(
            "UPDATE posts SET title = $1, content = $2, published = $3{rating} \
             WHERE id = $4 RETURNING {}",
            self.returning()
        )
    }

    fn delete(self) -> String {
        format!("DELETE FROM posts WHERE id = $1 RETURNING {}", self.returning())
    }
}

pub struct PgStore {
    pool: PgPool,
    shape: TableShape,
}

impl PgStore {
    /// Connects to `url`, retrying with a fixed delay until the database is
    /// reachable or `max_attempts` is exhausted, then checks the `posts`
    /// table. Only used at startup.
    pub async fn connect_with_retry(url: &str, opts: &ConnectOptions) -> StoreResult<Self> {
        let mut attempt = 0u32;
        let pool = loop {
            attempt += 1;
            let result = PgPoolOptions::new()
                .max_connections(opts.max_connections)
                .acquire_timeout(opts.acquire_timeout)
                .connect(url)
                .await;

            match result {
                Ok(pool) => {
                    info!(attempt, "database connection established");
                    break pool;
                }
                Err(source) if opts.max_attempts.is_some_and(|max| attempt >= max) => {
                    return Err(StoreError::Connect { attempts: attempt, source });
                }
                Err(e) => {
                    warn!(attempt, error = %e, retry_in = ?opts.retry_delay, "database connection failed");
                    tokio::time::sleep(opts.retry_delay).await;
                }
            }
        };

        let columns: Vec<String> = sqlx::query_scalar(
            "SELECT column_name::text FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = 'posts'",
        )
        .fetch_all(&pool)
        .await?;
        let shape = TableShape::from_columns(&columns)?;
        if !shape.has_rating {
            warn!("table `posts` has no `rating` column, ratings will not be stored");
        }

        Ok(Self { pool, shape })
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn list_all(&self) -> StoreResult<Vec<Post>> {
        let sql = self.shape.select_all();
        Ok(sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?)
    }

    async fn insert(&self, input: PostInput) -> StoreResult<Post> {
        let sql = self.shape.insert();
        let mut query = sqlx::query_as::<_, Post>(&sql)
            .bind(input.title)
            .bind(input.content)
            .bind(input.published);
        if self.shape.has_rating {
            query = query.bind(input.rating);
        }
        Ok(query.fetch_one(&self.pool).await?)
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let sql = self.shape.select_one();
        Ok(sqlx::query_as::<_, Post>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn replace(&self, id: i64, input: PostInput) -> StoreResult<Option<Post>> {
        let sql = self.shape.update();
        let mut query = sqlx::query_as::<_, Post>(&sql)
            .bind(input.title)
            .bind(input.content)
            .bind(input.published)
            .bind(id);
        if self.shape.has_rating {
            query = query.bind(input.rating);
        }
        Ok(query.fetch_optional(&self.pool).await?)
    }

    async fn remove_by_id(&self, id: i64) -> StoreResult<Option<Post>> {
        let sql = self.shape.delete();
        Ok(sqlx::query_as::<_, Post>(&sql).bind(id).fetch_optional(&self.pool).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|c| (*c).to_owned()).collect()
    }

    #[test]
    fn default_options_retry_forever_every_two_seconds() {
        let opts = ConnectOptions::default();
        assert_eq!(opts.retry_delay, Duration::from_secs(2));
        assert_eq!(opts.max_attempts, None);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let opts = ConnectOptions {
            max_connections: 1,
            acquire_timeout: Duration::from_millis(200),
            retry_delay: Duration::from_millis(10),
            max_attempts: Some(2),
        };
        // Nothing listens on port 1.
        let result = PgStore::connect_with_retry("postgres://u:p@127.0.0.1:1/db", &opts).await;
        assert!(matches!(result, Err(StoreError::Connect { attempts: 2, .. })));
    }

    #[test]
    fn four_column_table_reads_null_rating_and_never_writes_it() {
        let shape = TableShape::from_columns(&columns(&["id", "title", "content", "published"])).unwrap();
        assert!(!shape.has_rating);
        assert!(shape.select_all().contains("NULL::int8 AS rating"));
        assert_eq!(
            shape.insert(),
            "INSERT INTO posts (title, content, published) VALUES ($1, $2, $3) \
             RETURNING id::int8 AS id, title, content, published, NULL::int8 AS rating"
        );
        assert!(!shape.update().contains("rating ="));
    }

    #[test]
    fn rating_column_is_read_and_written() {
        let shape =
            TableShape::from_columns(&columns(&["id", "title", "content", "published", "rating"]))
                .unwrap();
        assert!(shape.has_rating);
        assert!(shape.insert().contains("VALUES ($1, $2, $3, $4)"));
        assert!(shape.update().contains("rating = $5 WHERE id = $4"));
        assert!(shape.select_one().contains("rating::int8 AS rating"));
    }

    #[test]
    fn missing_table_or_columns_fail_fast() {
        assert!(matches!(TableShape::from_columns(&[]), Err(StoreError::Schema(_))));
        let err = TableShape::from_columns(&columns(&["id", "title"])).unwrap_err();
        assert!(matches!(&err, StoreError::Schema(msg) if msg.contains("content, published")));
    }
}
