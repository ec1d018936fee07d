//! Content handlers, one per route type.
//!
//! # Responsibilities
//! - Validate route arguments (malformed ⇒ NotFound)
//! - Resolve blog entities into the request context
//! - Pick the template and hand over to the document server
//!
//! # Design Decisions
//! - Handlers are a closed enum selected by the matched route, not stored callables
//! - Handlers compose (`lang` → `home`, `preview` → `post`) instead of duplicating
//! - NotFound always goes through the error-handler chain

pub mod feed;
pub mod files;
pub mod home;
pub mod listing;
pub mod not_found;
pub mod ping;
pub mod post;

use crate::error::FrontError;
use crate::front::{Env, Reply, RequestContext};

pub use not_found::{ErrorHandler, ThemedNotFound};

/// Handler attached to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    Home,
    StaticHome,
    Search,
    Lang,
    Category,
    Archive,
    Post,
    Preview,
    Feed,
    Trackback,
    Webmention,
    Rsd,
    Files,
}

impl Handler {
    pub fn run(
        self,
        env: &Env<'_>,
        ctx: &mut RequestContext,
        args: Option<&str>,
    ) -> Result<Reply, FrontError> {
        match self {
            Handler::Home => home::home(env, ctx, args),
            Handler::StaticHome => home::static_home(env, ctx, args),
            Handler::Search => home::search(env, ctx),
            Handler::Lang => listing::lang(env, ctx, args),
            Handler::Category => listing::category(env, ctx, args),
            Handler::Archive => listing::archive(env, ctx, args),
            Handler::Post => post::post(env, ctx, args),
            Handler::Preview => post::preview(env, ctx, args),
            Handler::Feed => feed::feed(env, ctx, args),
            Handler::Trackback => ping::trackback(env, args),
            Handler::Webmention => ping::webmention(env),
            Handler::Rsd => ping::rsd(env),
            Handler::Files => files::files(env, args),
        }
    }
}
