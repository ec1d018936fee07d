//! External collaborators of the front controller.
//!
//! # Data Flow
//! ```text
//! handlers
//!     → blog.rs      (posts, categories, archive, langs, comments)
//!     → templates.rs (resolve + render)
//!     → markup.rs    (comment markup + sanitize)
//!     → auth.rs      (permission + preview key checks)
//!     → pingback.rs  (trackback / webmention reception)
//!     → hooks.rs     (extension behaviors)
//! ```
//!
//! # Design Decisions
//! - Every collaborator is a `Send + Sync` trait object shared through `Arc`
//! - The bundled implementations are minimal; production deployments swap them
//! - Moderation and comment id assignment belong to the blog store

pub mod auth;
pub mod blog;
pub mod hooks;
pub mod markup;
pub mod memory;
pub mod pingback;
pub mod templates;

pub use auth::{Auth, Keyring};
pub use blog::{
    ArchiveMonth, Blog, BlogError, Category, CategoryFilter, Comment, CommentFilter, CommentStatus, DateFilter, Lang,
    LangFilter, NewComment, Post, PostFilter, PostStatus, StoredComment,
};
pub use hooks::{Behavior, Behaviors, PingArgs, PingKind, RenderedDocument};
pub use markup::{CommonMark, Markup, MarkupMode};
pub use memory::{BlogSeed, CommentPolicy, MemoryBlog};
pub use pingback::{PingReceiver, Pings};
pub use templates::{TemplateError, Templates, ThemeTemplates};
