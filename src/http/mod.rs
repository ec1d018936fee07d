//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, timeout, request ID, tracing, body limit)
//!     → request.rs (buffered PublicRequest: query, form, cookies, client IP)
//!     → front controller on the blocking pool
//!     → Send to client
//! ```

pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, PublicRequest, X_REQUEST_ID};
pub use server::{AppState, HttpServer, ListenerError};
