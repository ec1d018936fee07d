//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the blog
//! front. All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the blog front.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FrontConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Public site addressing.
    pub site: SiteConfig,

    /// Theme and template lookup.
    pub theme: ThemeConfig,

    /// Static file serving.
    pub files: FilesConfig,

    /// Blog settings (hot reloadable).
    pub blog: BlogSettings,

    /// Preview key holders.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes (comment forms, pings).
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 256 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Where the route remainder is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrlScan {
    /// `/blog/post/my-entry`
    #[default]
    PathInfo,
    /// `/blog/index?post/my-entry`
    QueryString,
}

/// Public site addressing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Absolute public URL of the blog, including the base path.
    pub url: String,

    /// Blog identifier, used in the XML-RPC endpoint URL.
    pub blog_id: String,

    /// Path prefix the blog is mounted under.
    pub base_path: String,

    /// Remainder extraction mode.
    pub url_scan: UrlScan,

    /// Origin allowed to frame previews (usually the admin origin).
    pub trusted_frame_origin: Option<String>,

    /// Route type -> url key overrides (e.g. `post = "entry"`).
    pub route_keys: HashMap<String, String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/".to_string(),
            blog_id: "default".to_string(),
            base_path: "/".to_string(),
            url_scan: UrlScan::PathInfo,
            trusted_frame_origin: None,
            route_keys: HashMap::new(),
        }
    }
}

/// Theme and template lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Directory holding all themes.
    pub dir: PathBuf,

    /// Active theme name.
    pub name: String,

    /// Optional parent theme whose templates are used as fallback.
    pub parent: Option<String>,

    /// Built-in templates used when no theme provides one.
    pub core_templates: PathBuf,
}

impl ThemeConfig {
    /// Directory of a theme by name.
    pub fn theme_root(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Template directories in lookup order.
    pub fn template_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.theme_root(&self.name).join("tpl")];
        if let Some(parent) = &self.parent {
            dirs.push(self.theme_root(parent).join("tpl"));
        }
        dirs.push(self.core_templates.clone());
        dirs
    }

    /// Public files directory of the active theme.
    pub fn files_dir(&self) -> PathBuf {
        self.theme_root(&self.name).join("files")
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("themes"),
            name: "default".to_string(),
            parent: None,
            core_templates: PathBuf::from("default-templates"),
        }
    }
}

/// Static file serving.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Accept `..` segments (resolved paths must still stay inside a root).
    pub allow_parent_segments: bool,

    /// Core and variable directories, searched last.
    pub core_dirs: Vec<PathBuf>,

    /// Module kind namespace -> aggregated roots (e.g. `plugins`).
    pub modules: HashMap<String, Vec<PathBuf>>,

    /// Client cache lifetime for served files.
    pub max_age_secs: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            allow_parent_segments: false,
            core_dirs: vec![PathBuf::from("public/js"), PathBuf::from("public/css"), PathBuf::from("var")],
            modules: HashMap::new(),
            max_age_secs: 7 * 24 * 60 * 60,
        }
    }
}

/// Blog-level settings.
///
/// These are swapped atomically on config reload; a request always sees a
/// single snapshot.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlogSettings {
    /// Serve `static.html` as home and move the post list under `posts`.
    pub static_home: bool,

    /// Emit `X-Frame-Options`.
    pub prevents_clickjacking: bool,

    /// Emit `Permissions-Policy: interest-cohort=()`.
    pub prevents_floc: bool,

    /// Rich markup for comments (restricted ruleset otherwise).
    pub wiki_comments: bool,

    /// Advertise the XML-RPC endpoint.
    pub enable_xmlrpc: bool,

    /// Base robots policy, e.g. "INDEX,FOLLOW".
    pub robots_policy: String,

    /// Disable the search page.
    pub no_search: bool,

    pub nb_post_per_page: u32,
    pub nb_post_per_feed: u32,
    pub nb_comment_per_feed: u32,

    /// Feeds carry excerpts only.
    pub short_feed_items: bool,

    /// Comments accepted at all.
    pub allow_comments: bool,

    /// Publish new comments immediately (moderate otherwise).
    pub comments_pub: bool,

    /// Close comments on posts older than this many days (0 = never).
    pub comments_ttl_days: u32,

    /// Trackbacks and webmentions accepted at all.
    pub allow_trackbacks: bool,

    /// Close trackbacks on posts older than this many days (0 = never).
    pub trackbacks_ttl_days: u32,

    /// JSON seed for the bundled in-memory store.
    pub data_file: Option<PathBuf>,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            static_home: false,
            prevents_clickjacking: true,
            prevents_floc: true,
            wiki_comments: false,
            enable_xmlrpc: true,
            robots_policy: "INDEX,FOLLOW".to_string(),
            no_search: false,
            nb_post_per_page: 20,
            nb_post_per_feed: 20,
            nb_comment_per_feed: 20,
            short_feed_items: false,
            allow_comments: true,
            comments_pub: true,
            comments_ttl_days: 0,
            allow_trackbacks: true,
            trackbacks_ttl_days: 0,
            data_file: None,
        }
    }
}

/// Preview key holders.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    pub users: Vec<UserConfig>,
}

/// A user allowed to generate preview links.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    /// Login identifier, first segment of preview URLs.
    pub id: String,

    /// Secret the 40-hex preview key is derived from.
    pub secret: String,

    /// Permission levels on this blog (e.g. "usage", "contentadmin", "admin").
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: FrontConfig = toml::from_str(
            r#"
            [site]
            url = "https://blog.example.org/"

            [blog]
            static_home = true
            "#,
        )
        .unwrap();

        assert_eq!(config.site.url, "https://blog.example.org/");
        assert_eq!(config.site.url_scan, UrlScan::PathInfo);
        assert!(config.blog.static_home);
        assert_eq!(config.blog.nb_post_per_page, 20);
        assert_eq!(config.files.max_age_secs, 604_800);
    }

    #[test]
    fn test_url_scan_and_modules_parse() {
        let config: FrontConfig = toml::from_str(
            r#"
            [site]
            url_scan = "query_string"

            [site.route_keys]
            post = "entry"

            [files.modules]
            plugins = ["plugins", "contrib/plugins"]
            "#,
        )
        .unwrap();

        assert_eq!(config.site.url_scan, UrlScan::QueryString);
        assert_eq!(config.site.route_keys.get("post").map(String::as_str), Some("entry"));
        assert_eq!(config.files.modules["plugins"].len(), 2);
    }

    #[test]
    fn test_template_dirs_order() {
        let theme = ThemeConfig {
            dir: PathBuf::from("/srv/themes"),
            name: "berlin".into(),
            parent: Some("ductile".into()),
            core_templates: PathBuf::from("/srv/core"),
        };
        assert_eq!(
            theme.template_dirs(),
            vec![
                PathBuf::from("/srv/themes/berlin/tpl"),
                PathBuf::from("/srv/themes/ductile/tpl"),
                PathBuf::from("/srv/core"),
            ]
        );
        assert_eq!(theme.files_dir(), PathBuf::from("/srv/themes/berlin/files"));
    }
}
