//! Route table for the posts service.

use crate::health;
use crate::method::Method;
use crate::resource::{self, PostResource};
use crate::router::Router;

/// Builds the full application router over `posts`.
pub fn app(posts: PostResource) -> Router<PostResource> {
    Router::new(posts)
        .on(Method::Get,    "/",            resource::root)
        .on(Method::Get,    "/posts",       resource::list_posts)
        .on(Method::Post,   "/createposts", resource::create_post)
        .on(Method::Get,    "/posts/{id}",  resource::get_post)
        .on(Method::Put,    "/posts/{id}",  resource::update_post)
        .on(Method::Delete, "/posts/{id}",  resource::delete_post)
        .on(Method::Get,    "/healthz",     health::liveness)
        .on(Method::Get,    "/readyz",      health::readiness)
}
