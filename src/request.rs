//! Incoming HTTP request type.

use std::collections::HashMap;
use std::str::FromStr;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// An incoming HTTP request with its body fully buffered and path
/// parameters already extracted by the router.
pub struct Request {
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub(crate) fn new(body: Bytes, params: HashMap<String, String>) -> Self {
        Self { body, params }
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/posts/{id}`, `req.param("id")` on `/posts/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns a path parameter parsed as `T`. The outer `None` means the
    /// parameter is missing; the inner `Err` carries the parse failure.
    pub fn param_as<T: FromStr>(&self, key: &str) -> Option<Result<T, T::Err>> {
        self.param(key).map(str::parse)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
