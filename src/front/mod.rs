//! The front controller.
//!
//! # Data Flow
//! ```text
//! PublicRequest
//!     → Site::remainder (path info or query string)
//!     → RouteRegistry::resolve (route + args, or default + remainder)
//!     → Handler::run (may use the password gate and comment pipeline)
//!     → document::serve (cache check, headers, render, ETag)
//!     → Reply::Done  → after_document hook → response
//!       Reply::Halt  → response as is
//!       FrontError   → error-handler chain → boundary
//! ```
//!
//! # Design Decisions
//! - One synchronous call per request, run on the blocking pool by the host
//! - Blog settings are snapshotted once per request
//! - "Terminate now" is a value (`Reply::Halt`), not an early process exit

pub mod context;

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::response::{IntoResponse, Response};

use crate::collab::{Auth, Behaviors, Blog, Markup, Pings, Templates};
use crate::config::BlogSettings;
use crate::error::FrontError;
use crate::files::FileResolver;
use crate::http::PublicRequest;
use crate::observability::metrics;
use crate::routing::{Resolution, RouteRegistry, Site};

pub use context::{CachePlan, RequestContext};

/// Collaborators shared by every request.
#[derive(Clone)]
pub struct Services {
    pub blog: Arc<dyn Blog>,
    pub templates: Arc<dyn Templates>,
    pub markup: Arc<dyn Markup>,
    pub auth: Arc<dyn Auth>,
    pub pings: Arc<dyn Pings>,
    pub behaviors: Behaviors,
}

/// Outcome of a handler.
#[derive(Debug)]
pub enum Reply {
    /// Normal completion; the after-document hook still runs.
    Done(Response),
    /// Terminate the cycle now: nothing else runs on this response.
    Halt(Response),
}

impl Reply {
    pub fn into_response(self) -> Response {
        match self {
            Reply::Done(response) | Reply::Halt(response) => response,
        }
    }
}

/// Everything a handler can reach during one request.
pub struct Env<'a> {
    pub front: &'a Front,
    pub req: &'a PublicRequest,
    pub settings: Arc<BlogSettings>,
}

impl Env<'_> {
    pub fn blog(&self) -> &dyn Blog {
        self.front.services.blog.as_ref()
    }

    pub fn services(&self) -> &Services {
        &self.front.services
    }

    pub fn behaviors(&self) -> &Behaviors {
        &self.front.services.behaviors
    }

    pub fn site(&self) -> &Site {
        &self.front.site
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.front.registry
    }

    pub fn files(&self) -> &FileResolver {
        &self.front.files
    }
}

/// Public front controller, immutable once booted.
pub struct Front {
    registry: RouteRegistry,
    site: Site,
    settings: Arc<ArcSwap<BlogSettings>>,
    services: Services,
    files: FileResolver,
}

impl Front {
    pub fn new(
        registry: RouteRegistry,
        site: Site,
        settings: Arc<ArcSwap<BlogSettings>>,
        services: Services,
        files: FileResolver,
    ) -> Self {
        Self {
            registry,
            site,
            settings,
            services,
            files,
        }
    }

    pub fn registry(&self) -> &RouteRegistry {
        &self.registry
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Shared handle to the hot-reloadable settings.
    pub fn settings(&self) -> Arc<ArcSwap<BlogSettings>> {
        self.settings.clone()
    }

    /// Serve one request.
    pub fn handle(&self, req: &PublicRequest) -> Response {
        let start = Instant::now();
        let remainder = self.site.remainder(req);
        let resolution = self.registry.resolve(&remainder);

        let (kind, handler) = match &resolution {
            Resolution::Route { route, .. } => (route.kind.as_str(), route.handler),
            Resolution::Default { .. } => ("default", self.registry.default_handler()),
        };
        let args = resolution.args().map(str::to_string);

        tracing::debug!(
            request_id = %req.request_id(),
            route = kind,
            args = ?args,
            "Dispatching request"
        );

        let env = Env {
            front: self,
            req,
            settings: self.settings.load_full(),
        };
        let mut ctx = RequestContext::new(kind, args.clone());
        ctx.blog_url = self.site.url().to_string();
        self.services.behaviors.before_document(req, &mut ctx);

        let response = match handler.run(&env, &mut ctx, args.as_deref()) {
            Ok(Reply::Done(mut response)) => {
                self.services.behaviors.after_document(&ctx, &mut response);
                response
            }
            Ok(Reply::Halt(response)) => response,
            Err(err) => self.recover(&env, &mut ctx, err),
        };

        metrics::record_request(kind, response.status().as_u16(), start);
        response
    }

    /// Walk the error-handler chain, then fall back to the boundary mapping.
    fn recover(&self, env: &Env<'_>, ctx: &mut RequestContext, err: FrontError) -> Response {
        if matches!(err, FrontError::NotFound) {
            tracing::debug!(path = %env.req.path(), route = %ctx.route, "Document not found");
        }
        for handler in self.registry.error_handlers() {
            if let Some(response) = handler.handle(env, ctx, &err) {
                return response;
            }
        }
        err.into_response()
    }
}
