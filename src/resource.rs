//! The post handler set.
//!
//! [`PostResource`] holds the operations over a [`PostStore`]; the free
//! functions below adapt them to HTTP and are what the router registers.
//! Each operation is a single store call with no state kept between
//! requests.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /posts` | 200 `{"data": [..]}` | — |
//! | `POST /createposts` | 201 `{"data": post}` | 422 |
//! | `GET /posts/{id}` | 200 `{"post detail": post}` | 404, 422 |
//! | `PUT /posts/{id}` | 200 `{"data": post}` | 404, 422 |
//! | `DELETE /posts/{id}` | 204 | 404, 422 |
//!
//! An `{id}` that is not an integer is a 422. One made only of digits but too
//! large for `i64` cannot name a stored post and is a 404.

use std::num::IntErrorKind;
use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::error::ApiError;
use crate::post::{Post, PostInput};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;
use crate::store::PostStore;

/// Operations over the injected store. Cloning shares the store.
#[derive(Clone)]
pub struct PostResource {
    store: Arc<dyn PostStore>,
}

impl PostResource {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn PostStore {
        self.store.as_ref()
    }

    pub async fn list(&self) -> Result<Vec<Post>, ApiError> {
        Ok(self.store.list_all().await?)
    }

    pub async fn create(&self, input: PostInput) -> Result<Post, ApiError> {
        input.validate()?;
        let post = self.store.insert(input).await?;
        debug!(id = post.id, "post created");
        Ok(post)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Post, ApiError> {
        self.store.find_by_id(id).await?.ok_or_else(|| ApiError::not_found(id))
    }

    pub async fn update(&self, id: i64, input: PostInput) -> Result<Post, ApiError> {
        input.validate()?;
        self.store.replace(id, input).await?.ok_or_else(|| ApiError::not_found(id))
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        match self.store.remove_by_id(id).await? {
            Some(_) => {
                debug!(id, "post deleted");
                Ok(())
            }
            None => Err(ApiError::not_found(id)),
        }
    }
}

fn path_id(req: &Request) -> Result<i64, ApiError> {
    let raw = req.param("id").unwrap_or_default();
    match req.param_as::<i64>("id") {
        Some(Ok(id)) => Ok(id),
        Some(Err(e)) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(ApiError::not_found(raw))
        }
        _ => Err(ApiError::Validation(format!("id must be an integer, got `{raw}`"))),
    }
}

// ── HTTP adapters ─────────────────────────────────────────────────────────────

/// `GET /`
pub async fn root(_posts: PostResource, _req: Request) -> Response {
    Response::json_value(&json!({ "message": "This is my api development tutorial!!!" }))
}

/// `GET /posts`
pub async fn list_posts(posts: PostResource, _req: Request) -> Result<Response, ApiError> {
    let all = posts.list().await?;
    Ok(Response::json_value(&json!({ "data": all })))
}

/// `POST /createposts`
pub async fn create_post(posts: PostResource, req: Request) -> Result<Response, ApiError> {
    let input = PostInput::from_request(&req)?;
    let post = posts.create(input).await?;
    Ok(Response::builder()
        .status(Status::Created)
        .header("location", &format!("/posts/{}", post.id))
        .json_value(&json!({ "data": post })))
}

/// `GET /posts/{id}`
pub async fn get_post(posts: PostResource, req: Request) -> Result<Response, ApiError> {
    let post = posts.get_by_id(path_id(&req)?).await?;
    Ok(Response::json_value(&json!({ "post detail": post })))
}

/// `PUT /posts/{id}`
pub async fn update_post(posts: PostResource, req: Request) -> Result<Response, ApiError> {
    let id = path_id(&req)?;
    let input = PostInput::from_request(&req)?;
    let post = posts.update(id, input).await?;
    Ok(Response::json_value(&json!({ "data": post })))
}

/// `DELETE /posts/{id}`
pub async fn delete_post(posts: PostResource, req: Request) -> Result<Status, ApiError> {
    posts.delete(path_id(&req)?).await?;
    Ok(Status::NoContent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn resource() -> (PostResource, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (PostResource::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_returns_the_stored_copy() {
        let (posts, store) = resource();
        let created = posts.create(PostInput::new("a", "b")).await.unwrap();
        let stored = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(created, stored);
    }

    #[tokio::test]
    async fn invalid_create_stores_nothing() {
        let (posts, store) = resource();
        for input in [PostInput::new("", "b"), PostInput::new("a", "")] {
            let err = posts.create(input).await.unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)));
        }
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_after_delete_is_not_found() {
        let (posts, _) = resource();
        let post = posts.create(PostInput::new("a", "b")).await.unwrap();
        assert_eq!(posts.get_by_id(post.id).await.unwrap().title, "a");

        posts.delete(post.id).await.unwrap();
        assert!(matches!(posts.get_by_id(post.id).await, Err(ApiError::NotFound(id)) if id == post.id.to_string()));
        assert!(matches!(posts.delete(post.id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_missing_creates_nothing() {
        let (posts, store) = resource();
        let err = posts.update(41, PostInput::new("a", "b")).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(id) if id == "41"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    fn with_id(raw: &str) -> Request {
        Request::new(bytes::Bytes::new(), [("id".to_owned(), raw.to_owned())].into())
    }

    #[test]
    fn path_id_distinguishes_malformed_from_out_of_range() {
        assert_eq!(path_id(&with_id("12")).unwrap(), 12);
        assert!(matches!(path_id(&with_id("abc")), Err(ApiError::Validation(_))));
        assert!(matches!(
            path_id(&with_id("99999999999999999999")),
            Err(ApiError::NotFound(id)) if id == "99999999999999999999"
        ));
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let (posts, _) = resource();
        let err = posts.update(41, PostInput::new("a", " ")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
