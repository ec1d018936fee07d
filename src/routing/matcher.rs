//! Route matching logic.
//!
//! # Responsibilities
//! - Resolve a path remainder to a route type and its captured argument
//! - Fall back to the default handler when nothing matches
//!
//! # Design Decisions
//! - Empty remainder goes straight to the default handler
//! - A remainder equal to a url key matches without arguments
//! - Otherwise the first pattern match in url-key-descending order wins
//! - "No capture" (`None`) and "empty capture" (`Some("")`) stay distinct
//! - No match is a normal outcome: the whole remainder becomes the default
//!   handler's argument

use crate::routing::registry::{Route, RouteRegistry};

/// Outcome of matching one remainder.
#[derive(Debug)]
pub enum Resolution<'a> {
    Route {
        route: &'a Route,
        args: Option<String>,
    },
    Default {
        args: Option<String>,
    },
}

impl Resolution<'_> {
    /// Route type, `default` for the fallback.
    pub fn kind(&self) -> &str {
        match self {
            Resolution::Route { route, .. } => &route.kind,
            Resolution::Default { .. } => "default",
        }
    }

    pub fn args(&self) -> Option<&str> {
        match self {
            Resolution::Route { args, .. } | Resolution::Default { args } => args.as_deref(),
        }
    }
}

impl RouteRegistry {
    pub fn resolve(&self, remainder: &str) -> Resolution<'_> {
        if remainder.is_empty() {
            return Resolution::Default { args: None };
        }

        for route in self.routes() {
            if route.url_key == remainder {
                return Resolution::Route { route, args: None };
            }
            if let Some(caps) = route.pattern.captures(remainder) {
                return Resolution::Route {
                    route,
                    args: caps.get(1).map(|m| m.as_str().to_string()),
                };
            }
        }

        Resolution::Default {
            args: Some(remainder.to_string()),
        }
    }
}
