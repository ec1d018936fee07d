//! Route registry.
//!
//! # Responsibilities
//! - Hold the route table: {type, url key, compiled pattern, handler}
//! - Keep routes ordered by url key, descending
//! - Hold the default handler and the error-handler chain
//!
//! # Design Decisions
//! - Built once at boot, immutable during dispatch
//! - Patterns compiled at registration, never in the hot path
//! - Ordering is by url key, not registration order

use std::sync::Arc;

use regex::Regex;

use crate::handlers::{ErrorHandler, Handler};

/// A single route.
#[derive(Debug, Clone)]
pub struct Route {
    pub kind: String,
    pub url_key: String,
    pub pattern: Regex,
    pub handler: Handler,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid pattern for route {kind}: {source}")]
    InvalidPattern {
        kind: String,
        #[source]
        source: regex::Error,
    },

    #[error("pattern for route {kind} has {groups} capture groups, at most one is allowed")]
    TooManyGroups { kind: String, groups: usize },
}

/// Ordered route table.
pub struct RouteRegistry {
    routes: Vec<Route>,
    default: Handler,
    error_handlers: Vec<Arc<dyn ErrorHandler>>,
}

impl RouteRegistry {
    pub fn new(default: Handler) -> Self {
        Self {
            routes: Vec::new(),
            default,
            error_handlers: Vec::new(),
        }
    }

    /// Insert or replace the route of type `kind`.
    pub fn register(
        &mut self,
        kind: &str,
        url_key: &str,
        pattern: &str,
        handler: Handler,
    ) -> Result<(), RegistryError> {
        let pattern = Regex::new(pattern).map_err(|source| RegistryError::InvalidPattern {
            kind: kind.to_string(),
            source,
        })?;
        let groups = pattern.captures_len() - 1;
        if groups > 1 {
            return Err(RegistryError::TooManyGroups {
                kind: kind.to_string(),
                groups,
            });
        }

        self.routes.retain(|r| r.kind != kind);
        self.routes.push(Route {
            kind: kind.to_string(),
            url_key: url_key.to_string(),
            pattern,
            handler,
        });
        self.routes.sort_by(|a, b| b.url_key.cmp(&a.url_key));

        tracing::debug!(route = kind, url_key, "Route registered");
        Ok(())
    }

    /// Remove a route. Returns whether it existed.
    pub fn unregister(&mut self, kind: &str) -> bool {
        let before = self.routes.len();
        self.routes.retain(|r| r.kind != kind);
        before != self.routes.len()
    }

    pub fn register_default(&mut self, handler: Handler) {
        self.default = handler;
    }

    /// Prepend to the error-handler chain; the latest registration runs first.
    pub fn register_error_handler(&mut self, handler: Arc<dyn ErrorHandler>) {
        self.error_handlers.insert(0, handler);
    }

    pub fn default_handler(&self) -> Handler {
        self.default
    }

    pub fn error_handlers(&self) -> &[Arc<dyn ErrorHandler>] {
        &self.error_handlers
    }

    pub fn route(&self, kind: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.kind == kind)
    }

    /// All routes, url key descending.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn url_key(&self, kind: &str) -> Option<&str> {
        self.route(kind).map(|r| r.url_key.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_sorted_by_url_key_descending() {
        let mut registry = RouteRegistry::new(Handler::Home);
        registry.register("archive", "archive", "^archive(/.+)?$", Handler::Archive).unwrap();
        registry.register("post", "post", "^post/(.+)$", Handler::Post).unwrap();
        registry.register("feed", "feed", "^feed/(.+)$", Handler::Feed).unwrap();

        let keys: Vec<_> = registry.routes().iter().map(|r| r.url_key.as_str()).collect();
        assert_eq!(keys, vec!["post", "feed", "archive"]);
    }

    #[test]
    fn test_register_upserts_by_type() {
        let mut registry = RouteRegistry::new(Handler::Home);
        registry.register("post", "post", "^post/(.+)$", Handler::Post).unwrap();
        registry.register("post", "entry", "^entry/(.+)$", Handler::Post).unwrap();

        assert_eq!(registry.routes().len(), 1);
        assert_eq!(registry.url_key("post"), Some("entry"));
    }

    #[test]
    fn test_rejects_bad_patterns() {
        let mut registry = RouteRegistry::new(Handler::Home);
        assert!(matches!(
            registry.register("post", "post", "^post/(.+$", Handler::Post),
            Err(RegistryError::InvalidPattern { .. })
        ));
        assert!(matches!(
            registry.register("post", "post", "^post/(.+)/(.+)$", Handler::Post),
            Err(RegistryError::TooManyGroups { groups: 2, .. })
        ));
        assert!(registry.routes().is_empty());
    }

    #[test]
    fn test_unregister_and_default() {
        let mut registry = RouteRegistry::new(Handler::Home);
        registry.register("rsd", "rsd", "^rsd$", Handler::Rsd).unwrap();
        assert!(registry.unregister("rsd"));
        assert!(!registry.unregister("rsd"));

        registry.register_default(Handler::StaticHome);
        assert_eq!(registry.default_handler(), Handler::StaticHome);
    }
}
