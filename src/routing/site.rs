//! Public addressing of the blog: remainder extraction and URL building.

use std::collections::HashMap;

use url::Url;

use crate::config::{SiteConfig, UrlScan};
use crate::http::PublicRequest;

/// Site addressing resolved at boot.
#[derive(Debug, Clone)]
pub struct Site {
    url: String,
    origin: String,
    blog_id: String,
    base_path: String,
    scan: UrlScan,
    trusted_frame_origin: Option<String>,
    route_keys: HashMap<String, String>,
}

impl Site {
    pub fn new(config: &SiteConfig) -> Self {
        let origin = Url::parse(&config.url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_default();
        Self {
            url: config.url.clone(),
            origin,
            blog_id: config.blog_id.clone(),
            base_path: config.base_path.clone(),
            scan: config.url_scan,
            trusted_frame_origin: config.trusted_frame_origin.clone(),
            route_keys: config.route_keys.clone(),
        }
    }

    /// Absolute blog URL, ending with `/`.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn blog_id(&self) -> &str {
        &self.blog_id
    }

    pub fn scan(&self) -> UrlScan {
        self.scan
    }

    pub fn trusted_frame_origin(&self) -> Option<&str> {
        self.trusted_frame_origin.as_deref()
    }

    /// Url key of a route type, honoring configured overrides.
    pub fn url_key(&self, kind: &str) -> String {
        self.route_keys
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }

    /// Public URL of a route type, with optional arguments.
    pub fn url_for(&self, kind: &str, args: &str) -> String {
        let key = self.url_key(kind);
        let prefix = match self.scan {
            UrlScan::PathInfo => self.url.clone(),
            UrlScan::QueryString => format!("{}?", self.url),
        };
        if args.is_empty() {
            format!("{prefix}{key}")
        } else {
            format!("{prefix}{key}/{args}")
        }
    }

    /// XML-RPC endpoint advertised for pingbacks and RSD.
    pub fn xmlrpc_url(&self) -> String {
        self.url_for("xmlrpc", &self.blog_id)
    }

    /// Separator between a redirect URL and extra query arguments.
    pub fn redirect_separator(&self) -> char {
        match self.scan {
            UrlScan::PathInfo => '?',
            UrlScan::QueryString => '&',
        }
    }

    /// The route remainder of a request, percent-decoded.
    ///
    /// In query-string mode the remainder is the first `&`-separated segment
    /// when it is not itself a `key=value` parameter.
    pub fn remainder(&self, req: &PublicRequest) -> String {
        match self.scan {
            UrlScan::PathInfo => {
                let path = req.path();
                let trimmed_base = self.base_path.trim_end_matches('/');
                let rest = path
                    .strip_prefix(self.base_path.as_str())
                    .or_else(|| (path == trimmed_base).then_some(""))
                    .unwrap_or_else(|| path.trim_start_matches('/'));
                percent_decode(rest)
            }
            UrlScan::QueryString => {
                let first = req
                    .query()
                    .and_then(|q| q.split('&').next())
                    .unwrap_or_default();
                if first.contains('=') {
                    String::new()
                } else {
                    percent_decode(first)
                }
            }
        }
    }

    /// Normalized absolute URL of the request, used in ETags.
    pub fn self_url(&self, req: &PublicRequest) -> String {
        let path_and_query = req
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        format!("{}{}", self.origin, path_and_query)
    }
}

/// Decode `%XX` escapes. Invalid escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(value) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(value);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(base_path: &str, scan: UrlScan) -> Site {
        Site::new(&SiteConfig {
            url: format!("https://blog.example.org{base_path}"),
            base_path: base_path.to_string(),
            url_scan: scan,
            ..Default::default()
        })
    }

    #[test]
    fn test_path_info_remainder() {
        let site = site("/blog/", UrlScan::PathInfo);
        assert_eq!(site.remainder(&PublicRequest::get("/blog/post/caf%C3%A9")), "post/café");
        assert_eq!(site.remainder(&PublicRequest::get("/blog/")), "");
        assert_eq!(site.remainder(&PublicRequest::get("/blog")), "");
        assert_eq!(site.remainder(&PublicRequest::get("/blog/page/2?q=x")), "page/2");
    }

    #[test]
    fn test_query_string_remainder() {
        let site = site("/", UrlScan::QueryString);
        assert_eq!(site.remainder(&PublicRequest::get("/index?post/hello&pub=1")), "post/hello");
        assert_eq!(site.remainder(&PublicRequest::get("/index?q=rust")), "");
        assert_eq!(site.remainder(&PublicRequest::get("/index")), "");
    }

    #[test]
    fn test_url_for_and_overrides() {
        let mut config = SiteConfig {
            url: "https://blog.example.org/".into(),
            blog_id: "main".into(),
            ..Default::default()
        };
        config.route_keys.insert("post".into(), "entry".into());
        let site = Site::new(&config);

        assert_eq!(site.url_for("post", "hello"), "https://blog.example.org/entry/hello");
        assert_eq!(site.url_for("feed", ""), "https://blog.example.org/feed");
        assert_eq!(site.xmlrpc_url(), "https://blog.example.org/xmlrpc/main");
        assert_eq!(site.redirect_separator(), '?');

        config.url_scan = UrlScan::QueryString;
        let site = Site::new(&config);
        assert_eq!(site.url_for("post", "hello"), "https://blog.example.org/?entry/hello");
        assert_eq!(site.redirect_separator(), '&');
    }

    #[test]
    fn test_self_url() {
        let site = site("/", UrlScan::PathInfo);
        assert_eq!(
            site.self_url(&PublicRequest::get("/post/hello?x=1")),
            "https://blog.example.org/post/hello?x=1"
        );
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("a%20b%2Fc"), "a b/c");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("a+b"), "a+b");
    }
}
