//! # postboard
//!
//! A small CRUD service for a single `posts` resource, served by a minimal
//! hyper-based HTTP layer.
//!
//! ## Layout
//!
//! - HTTP layer: [`Router`] (radix tree per method via [`matchit`]),
//!   [`Request`], [`Response`] / [`IntoResponse`], [`Status`], [`Method`],
//!   and [`Server`] with graceful shutdown on SIGTERM / Ctrl-C.
//! - [`PostResource`]: list, create, get, update and delete over a
//!   [`store::PostStore`].
//! - [`store`]: the persistence contract plus in-memory and PostgreSQL
//!   implementations.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use postboard::store::MemoryStore;
//! use postboard::{PostResource, Server, routes};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), postboard::Error> {
//!     let posts = PostResource::new(Arc::new(MemoryStore::seeded()));
//!     Server::bind("0.0.0.0:8000")?.serve(routes::app(posts)).await
//! }
//! ```

mod error;
mod handler;
mod method;
mod post;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod config;
pub mod health;
pub mod resource;
pub mod routes;
pub mod store;

pub use error::{ApiError, Error, StoreError};
pub use handler::Handler;
pub use method::Method;
pub use post::{Post, PostInput};
pub use request::Request;
pub use resource::PostResource;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use status::Status;
