//! Sandboxed static file lookup.
//!
//! # Data Flow
//! ```text
//! files/{relative path}
//!     → reject empty, absolute and (unless allowed) `..` paths
//!     → candidate roots: theme files, module namespace roots, core dirs
//!     → first existing regular file that stays inside its root
//!     → extension allow-list ⇒ MIME type
//! ```
//!
//! # Design Decisions
//! - Every rejection is the same 404, whatever the reason
//! - Roots and candidates are canonicalized before the containment check

pub mod resolver;

pub use resolver::{mime_for, FileResolver, ResolvedFile};
