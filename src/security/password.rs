//! Password gate for protected posts.
//!
//! Knowledge of the post password is the capability. The browser keeps a
//! cookie mapping post id to password so the password is asked once; the
//! cookie is always checked against the real password and never trusted on
//! its own.

use std::collections::BTreeMap;

use axum::http::HeaderValue;
use url::form_urlencoded;

use crate::collab::auth::constant_time_eq;
use crate::http::PublicRequest;
use crate::routing::percent_decode;

pub const PASSWORD_COOKIE: &str = "passwordCookie";

/// Form field carrying a submitted password.
pub const PASSWORD_FIELD: &str = "password";

/// Client-held map of post id to password.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordCookie {
    entries: BTreeMap<String, String>,
}

impl PasswordCookie {
    /// Decode the percent-encoded JSON value. Anything malformed is empty.
    pub fn decode(raw: &str) -> Self {
        let json = percent_decode(&raw.replace('+', " "));
        let entries = serde_json::from_str(&json).unwrap_or_default();
        Self { entries }
    }

    pub fn from_request(req: &PublicRequest) -> Self {
        req.cookie(PASSWORD_COOKIE)
            .map(Self::decode)
            .unwrap_or_default()
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_string(&self.entries).unwrap_or_else(|_| "{}".to_string());
        form_urlencoded::byte_serialize(json.as_bytes()).collect()
    }

    pub fn get(&self, post_id: u64) -> Option<&str> {
        self.entries.get(&post_id.to_string()).map(String::as_str)
    }

    pub fn upsert(&mut self, post_id: u64, password: &str) {
        self.entries.insert(post_id.to_string(), password.to_string());
    }

    /// `Set-Cookie` value scoped to the blog base path.
    pub fn set_cookie(&self, base_path: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&format!(
            "{PASSWORD_COOKIE}={}; Path={base_path}; HttpOnly; SameSite=Lax",
            self.encode()
        ))
        .ok()
    }
}

/// Result of checking a request against a post password.
#[derive(Debug)]
pub enum GateOutcome {
    /// Access granted; the refreshed cookie must be sent back.
    Open { set_cookie: Option<HeaderValue> },
    /// Ask for the password.
    Locked,
}

/// Check the submitted password field, then the cookie.
pub fn check(req: &PublicRequest, post_id: u64, password: &str, base_path: &str) -> GateOutcome {
    let submitted = req
        .form_field(PASSWORD_FIELD)
        .filter(|p| !p.is_empty())
        .is_some_and(|p| constant_time_eq(p.as_bytes(), password.as_bytes()));

    let mut cookie = PasswordCookie::from_request(req);
    let remembered = cookie
        .get(post_id)
        .is_some_and(|p| constant_time_eq(p.as_bytes(), password.as_bytes()));

    if submitted || remembered {
        cookie.upsert(post_id, password);
        GateOutcome::Open {
            set_cookie: cookie.set_cookie(base_path),
        }
    } else {
        GateOutcome::Locked
    }
}
