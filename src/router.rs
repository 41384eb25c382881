//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. You register a path, you
//! get a handler, and the router hands it a clone of the application state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use matchit::Router as MatchitRouter;
use tracing::{info, warn};

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// The application router.
///
/// Build it once at startup with the shared state; pass it to
/// [`Server::serve`](crate::Server::serve). Each [`Router::on`] call returns
/// `self` so registrations chain naturally.
pub struct Router<S> {
    routes: HashMap<Method, MatchitRouter<BoxedHandler<S>>>,
    state: S,
}

impl<S> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    pub fn new(state: S) -> Self {
        Self { routes: HashMap::new(), state }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are fixed at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<S>) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(BoxedHandler<S>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    /// `true` if some *other* method has a route for `path`.
    fn path_known(&self, path: &str) -> bool {
        self.routes.values().any(|tree| tree.at(path).is_ok())
    }

    /// Routes one buffered request and produces one response.
    ///
    /// `HEAD` falls back to the `GET` route and drops the body. A path
    /// registered only under other methods answers `405`; an unknown path
    /// answers `404`. Emits one `info` event per request with the final
    /// status and latency.
    pub async fn handle(&self, method: Method, path: &str, body: Bytes) -> Response {
        let started = Instant::now();

        let matched = self.lookup(method, path).or_else(|| match method {
            Method::Head => self.lookup(Method::Get, path),
            _ => None,
        });

        let mut response = match matched {
            Some((handler, params)) => {
                handler.call(self.state.clone(), Request::new(body, params)).await
            }
            None if self.path_known(path) => Response::status(Status::MethodNotAllowed),
            None => Response::status(Status::NotFound),
        };
        if method == Method::Head {
            response.body.clear();
        }

        let status = response.status_code();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        if status >= 500 {
            warn!(%method, path, status, elapsed_ms, "request failed");
        } else {
            info!(%method, path, status, elapsed_ms, "request");
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo_id(prefix: &'static str, req: Request) -> Response {
        Response::text(format!("{prefix}{}", req.param("id").unwrap_or("-")))
    }

    fn router() -> Router<&'static str> {
        Router::new("post:").on(Method::Get, "/posts/{id}", echo_id)
    }

    #[tokio::test]
    async fn passes_state_and_params() {
        let res = router().handle(Method::Get, "/posts/9", Bytes::new()).await;
        assert_eq!(res.status_code(), 200);
        assert_eq!(res.body(), b"post:9");
    }

    #[tokio::test]
    async fn unknown_path_is_404_known_path_other_method_is_405() {
        let r = router();
        let missing = r.handle(Method::Get, "/nope", Bytes::new()).await;
        assert_eq!(missing.status_code(), 404);
        let wrong = r.handle(Method::Patch, "/posts/9", Bytes::new()).await;
        assert_eq!(wrong.status_code(), 405);
    }

    #[tokio::test]
    async fn head_uses_get_route_without_body() {
        let res = router().handle(Method::Head, "/posts/9", Bytes::new()).await;
        assert_eq!(res.status_code(), 200);
        assert!(res.body().is_empty());
        assert_eq!(res.header("content-type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_route_panics() {
        let _ = router().on(Method::Get, "/posts/{id}", echo_id);
    }
}
