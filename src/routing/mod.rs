//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path or query string)
//!     → site.rs (extract the remainder after the base path)
//!     → matcher.rs (scan routes, url key descending)
//!     → Return: matched route + captured args, or default handler + remainder
//!
//! Route table (at boot):
//!     register(type, url key, pattern, handler)
//!     → compile pattern
//!     → keep sorted by url key, descending
//!     → frozen inside the Front
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same remainder always resolves the same way
//! - Specificity comes from the url key, not registration order

pub mod matcher;
pub mod registry;
pub mod site;

pub use matcher::Resolution;
pub use registry::{RegistryError, Route, RouteRegistry};
pub use site::{percent_decode, Site};
