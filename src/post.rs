//! The post entity and its validated input.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::request::Request;

/// A stored post. `id` is assigned by the store and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub published: bool,
    pub rating: Option<i64>,
}

impl Post {
    /// Materializes `input` under `id`.
    pub fn from_input(id: i64, input: PostInput) -> Self {
        Self {
            id,
            title: input.title,
            content: input.content,
            published: input.published,
            rating: input.rating,
        }
    }
}

/// Body of create and update requests.
///
/// Deserialization enforces presence and types; [`PostInput::validate`]
/// enforces non-empty `title` and `content`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(default = "published_default")]
    pub published: bool,
    #[serde(default)]
    pub rating: Option<i64>,
}

fn published_default() -> bool {
    true
}

impl PostInput {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            published: true,
            rating: None,
        }
    }

    /// Parses and validates the JSON body of `req`.
    pub fn from_request(req: &Request) -> Result<Self, ApiError> {
        let input: Self = req
            .json()
            .map_err(|e| ApiError::Validation(format!("invalid post body: {e}")))?;
        input.validate()?;
        Ok(input)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title must not be empty".to_owned()));
        }
        if self.content.trim().is_empty() {
            return Err(ApiError::Validation("content must not be empty".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::*;

    fn parse(body: &'static [u8]) -> Result<PostInput, ApiError> {
        PostInput::from_request(&Request::new(Bytes::from_static(body), HashMap::new()))
    }

    #[test]
    fn defaults_apply_when_optional_fields_are_absent() {
        let input = parse(br#"{"title":"a","content":"b"}"#).unwrap();
        assert!(input.published);
        assert_eq!(input.rating, None);
    }

    #[test]
    fn explicit_optional_fields_are_kept() {
        let input = parse(br#"{"title":"a","content":"b","published":false,"rating":4}"#).unwrap();
        assert!(!input.published);
        assert_eq!(input.rating, Some(4));
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        let err = parse(br#"{"title":"a"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg.contains("content")));
    }

    #[test]
    fn blank_title_is_rejected() {
        let err = parse(br#"{"title":"  ","content":"b"}"#).unwrap_err();
        assert!(matches!(err, ApiError::Validation(msg) if msg == "title must not be empty"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(parse(br#"{"title":"a","content":"b","rating":"five"}"#).is_err());
        assert!(parse(b"not json").is_err());
    }

    #[test]
    fn rating_beyond_i32_is_accepted() {
        let input = parse(br#"{"title":"a","content":"b","rating":3000000000}"#).unwrap();
        assert_eq!(input.rating, Some(3_000_000_000));
    }

    #[test]
    fn post_serializes_null_rating() {
        let post = Post::from_input(3, PostInput::new("t", "c"));
        let v = serde_json::to_value(&post).unwrap();
        assert_eq!(v["id"], 3);
        assert!(v["rating"].is_null());
        assert_eq!(v["published"], true);
    }
}
