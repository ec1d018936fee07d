//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! post handler:
//!     → password.rs (gate protected posts: form field, then cookie)
//!
//! document server:
//!     → headers.rs (X-Frame-Options, Permissions-Policy)
//!
//! feed handler:
//!     → headers.rs (X-Robots-Tag from the robots policy)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a protected post is served only on a verified password
//! - No trust in client input: cookies are checked against the real secret
//! - Secret comparisons are constant time

pub mod headers;
pub mod password;

pub use headers::{apply_security_headers, robots_policy};
pub use password::{GateOutcome, PasswordCookie, PASSWORD_COOKIE};
