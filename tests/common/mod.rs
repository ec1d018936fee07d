//! Shared fixtures for the integration tests.
//!
//! A temporary theme with one template per document, a seeded in-memory blog
//! and helpers to drive the router without a socket.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use tower::ServiceExt;

use blog_front::collab::{
    Behaviors, BlogSeed, Category, CommentPolicy, CommonMark, Keyring, MemoryBlog, PingReceiver,
    Post, PostStatus, ThemeTemplates,
};
use blog_front::config::{FrontConfig, UserConfig};
use blog_front::front::Services;
use blog_front::lifecycle::boot_with_services;
use blog_front::HttpServer;

pub const BLOG_URL: &str = "http://blog.test/";
pub const PREVIEW_USER: &str = "editor";
pub const PREVIEW_SECRET: &str = "s3cret";

const TEMPLATES: &[(&str, &str)] = &[
    ("home.html", "HOME page={{ page }} lang={{ lang }} first={{ posts.0.title }}"),
    ("static.html", "STATIC {{ route }}"),
    ("search.html", "SEARCH q={{ search }} count={{ search_count }} first={{ posts.0.title }}"),
    ("category.html", "CATEGORY {{ category.title }} first={{ posts.0.title }}"),
    ("archive.html", "ARCHIVE {{ archives.0.year }}-{{ archives.0.month }}"),
    ("archive_month.html", "MONTH {{ archive.year }}-{{ archive.month }} first={{ posts.0.title }}"),
    (
        "post.html",
        "POST {{ post.title }} preview={{ preview }} error={{ form_error }} draft={{ comment_preview.content | raw }} body={{ post.content | raw }} comment={{ comments.0.author }}: {{ comments.0.content | raw }}",
    ),
    ("password-form.html", "PASSWORD {{ post_url }} title={{ post.title }}"),
    ("404.html", "NOT FOUND route={{ route }}"),
    ("atom.xml", "<feed>{{ posts.0.title }}{{ feed_subtitle }}</feed>"),
    ("rss2.xml", "<rss>{{ posts.0.title }}{{ feed_subtitle }}</rss>"),
    ("atom-comments.xml", "<feed comments>{{ feed_subtitle }}{{ comments.0.author }}</feed>"),
    ("rss2-comments.xml", "<rss comments>{{ feed_subtitle }}{{ comments.0.author }}</rss>"),
    ("rss2.xsl", "<xsl:stylesheet/>"),
];

/// A running test site: keep it alive for the duration of the test.
pub struct TestSite {
    pub dir: TempDir,
    pub config: FrontConfig,
    pub blog: Arc<MemoryBlog>,
    pub router: Router,
}

fn post(id: u64, url: &str, title: &str, lang: &str, category: Option<&str>) -> Post {
    Post {
        id,
        url: url.to_string(),
        title: title.to_string(),
        lang: lang.to_string(),
        category: category.map(str::to_string),
        password: None,
        status: PostStatus::Published,
        published_at: Utc.with_ymd_and_hms(2024, 5, id as u32, 10, 0, 0).unwrap(),
        comments_open: true,
        trackbacks_open: true,
        excerpt: String::new(),
        content: format!("<p>{title} body</p>"),
    }
}

pub fn seed() -> BlogSeed {
    let mut secret = post(2, "secret", "Secret", "en", None);
    secret.password = Some("hunter2".to_string());

    let mut draft = post(3, "draft", "Draft", "en", None);
    draft.status = PostStatus::Pending;

    let mut closed = post(4, "closed", "Closed", "en", None);
    closed.comments_open = false;
    closed.trackbacks_open = false;

    BlogSeed {
        posts: vec![
            post(1, "2024/05/hello", "Hello", "en", Some("rust")),
            secret,
            draft,
            closed,
            post(5, "bonjour", "Bonjour", "fr", Some("rust")),
        ],
        categories: vec![Category {
            id: 1,
            url: "rust".to_string(),
            title: "Rust".to_string(),
            post_count: 0,
        }],
    }
}

fn write_theme(root: &Path) {
    let tpl = root.join("themes/default/tpl");
    fs::create_dir_all(&tpl).unwrap();
    for (name, source) in TEMPLATES {
        fs::write(tpl.join(name), source).unwrap();
    }

    let files = root.join("themes/default/files");
    fs::create_dir_all(files.join("img")).unwrap();
    fs::write(files.join("style.css"), "body { color: black; }").unwrap();
    fs::write(files.join("img/logo.svg"), "<svg/>").unwrap();
    fs::write(files.join("notes.php"), "<?php echo 1;").unwrap();

    fs::create_dir_all(root.join("plugins/gallery")).unwrap();
    fs::write(root.join("plugins/gallery/gallery.js"), "console.log(1);").unwrap();

    fs::create_dir_all(root.join("core")).unwrap();
    fs::write(root.join("secret.txt"), "do not serve").unwrap();
}

pub fn config_for(root: &Path) -> FrontConfig {
    let mut config = FrontConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.site.url = BLOG_URL.to_string();
    config.site.base_path = "/".to_string();
    config.theme.dir = root.join("themes");
    config.theme.name = "default".to_string();
    config.theme.core_templates = root.join("core");
    config.files.core_dirs = vec![root.join("core")];
    config
        .files
        .modules
        .insert("plugins".to_string(), vec![root.join("plugins")]);
    config.auth.users.push(UserConfig {
        id: PREVIEW_USER.to_string(),
        secret: PREVIEW_SECRET.to_string(),
        permissions: vec!["usage".to_string()],
    });
    config
}

/// Build a site, letting the test adjust the configuration first.
pub fn site_with(adjust: impl FnOnce(&mut FrontConfig)) -> TestSite {
    let dir = TempDir::new().unwrap();
    write_theme(dir.path());
    let mut config = config_for(dir.path());
    adjust(&mut config);

    let blog = Arc::new(MemoryBlog::new(seed(), CommentPolicy::from_settings(&config.blog)));
    let services = Services {
        blog: blog.clone(),
        templates: Arc::new(ThemeTemplates::new(config.theme.template_dirs())),
        markup: Arc::new(CommonMark),
        auth: Arc::new(Keyring::from_config(&config.auth)),
        pings: Arc::new(PingReceiver::new(blog.clone(), format!("{BLOG_URL}post/"))),
        behaviors: Behaviors::new(),
    };
    let front = boot_with_services(&config, None, services).unwrap();
    let router = HttpServer::new(&config, front).router();

    TestSite {
        dir,
        config,
        blog,
        router,
    }
}

pub fn site() -> TestSite {
    site_with(|_| {})
}

impl TestSite {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        self.send(form_request(uri, body)).await
    }
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn header_str<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
