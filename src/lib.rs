//! Public front controller of a blog engine.
//!
//! Dispatches public requests to content handlers through a url-key ordered
//! route table, serves themed documents with Last-Modified and ETag
//! validation, accepts comments and pings, gates password-protected posts
//! and serves sandboxed static files.

// Core subsystems
pub mod config;
pub mod front;
pub mod http;
pub mod routing;

// Content
pub mod collab;
pub mod comments;
pub mod document;
pub mod files;
pub mod handlers;

// Cross-cutting concerns
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::FrontConfig;
pub use error::FrontError;
pub use front::{Front, Services};
pub use http::{HttpServer, PublicRequest};
pub use lifecycle::Shutdown;
