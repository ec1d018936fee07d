//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the collaborators from configuration
//! - Register the route table once, in a fixed order
//! - Assemble the immutable front controller
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Route url keys come from the site configuration; patterns follow the key
//! - The bundled store's comment policy is taken from the settings at boot

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::collab::{
    Behaviors, Blog, BlogSeed, CommentPolicy, CommonMark, Keyring, MemoryBlog, PingReceiver,
    ThemeTemplates,
};
use crate::config::{BlogSettings, FrontConfig};
use crate::files::FileResolver;
use crate::front::{Front, Services};
use crate::handlers::{Handler, ThemedNotFound};
use crate::routing::{RegistryError, RouteRegistry, Site};

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("route table: {0}")]
    Registry(#[from] RegistryError),

    #[error("failed to load blog data: {0}")]
    Io(#[from] std::io::Error),
}

/// Route types registered at boot, with their pattern shape.
///
/// `{key}` is replaced by the escaped url key of the type.
const ROUTES: &[(&str, &str, Handler)] = &[
    ("post", r"^{key}/(.+)$", Handler::Post),
    ("preview", r"^{key}/(.+)$", Handler::Preview),
    ("category", r"^{key}/(.+)$", Handler::Category),
    ("archive", r"^{key}(/.+)?$", Handler::Archive),
    ("feed", r"^{key}/(.+)$", Handler::Feed),
    ("trackback", r"^{key}/(.+)$", Handler::Trackback),
    ("webmention", r"^{key}(/.+)?$", Handler::Webmention),
    ("rsd", r"^{key}$", Handler::Rsd),
    ("files", r"^{key}/(.+)$", Handler::Files),
];

/// Language codes have no url key: `fr`, `pt-br`, `fr/page/2`.
const LANG_PATTERN: &str = r"^([a-zA-Z]{2}(?:-[a-z]{2})?(?:/page/[0-9]+)?)$";

/// Build the route table for a site.
pub fn default_registry(site: &Site, settings: &BlogSettings) -> Result<RouteRegistry, RegistryError> {
    let default = if settings.static_home {
        Handler::StaticHome
    } else {
        Handler::Home
    };
    let mut registry = RouteRegistry::new(default);

    registry.register("lang", "", LANG_PATTERN, Handler::Lang)?;
    if settings.static_home {
        let key = site.url_key("posts");
        let pattern = format!(r"^{}(/.+)?$", regex::escape(&key));
        registry.register("posts", &key, &pattern, Handler::Home)?;
    }
    for (kind, shape, handler) in ROUTES {
        let key = site.url_key(kind);
        let pattern = shape.replace("{key}", &regex::escape(&key));
        registry.register(kind, &key, &pattern, *handler)?;
    }

    registry.register_error_handler(Arc::new(ThemedNotFound));
    Ok(registry)
}

/// The bundled collaborators: in-memory store, theme templates, CommonMark,
/// configured keyring and ping receiver.
pub fn default_services(
    config: &FrontConfig,
    site: &Site,
    settings: &BlogSettings,
) -> Result<Services, BootError> {
    let policy = CommentPolicy::from_settings(settings);
    let blog: Arc<dyn Blog> = match &settings.data_file {
        Some(path) => Arc::new(MemoryBlog::load_from_file(path, policy)?),
        None => {
            tracing::warn!("No blog data file configured, starting with an empty blog");
            Arc::new(MemoryBlog::new(BlogSeed::default(), policy))
        }
    };

    let post_prefix = format!("{}/", site.url_for("post", ""));
    Ok(Services {
        blog: blog.clone(),
        templates: Arc::new(ThemeTemplates::new(config.theme.template_dirs())),
        markup: Arc::new(CommonMark),
        auth: Arc::new(Keyring::from_config(&config.auth)),
        pings: Arc::new(PingReceiver::new(blog, post_prefix)),
        behaviors: Behaviors::new(),
    })
}

/// Files whose modification invalidates every cached asset.
fn deploy_stamps(config_path: Option<&Path>) -> Vec<PathBuf> {
    let mut stamps: Vec<PathBuf> = std::env::current_exe().into_iter().collect();
    stamps.extend(config_path.map(Path::to_path_buf));
    stamps
}

/// Build the front controller with the bundled collaborators.
pub fn boot(config: &FrontConfig, config_path: Option<&Path>) -> Result<Front, BootError> {
    let services = {
        let site = Site::new(&config.site);
        default_services(config, &site, &config.blog)?
    };
    boot_with_services(config, config_path, services)
}

/// Build the front controller around caller-provided collaborators.
pub fn boot_with_services(
    config: &FrontConfig,
    config_path: Option<&Path>,
    services: Services,
) -> Result<Front, BootError> {
    let site = Site::new(&config.site);
    let registry = default_registry(&site, &config.blog)?;
    let files = FileResolver::from_config(&config.theme, &config.files, deploy_stamps(config_path));
    let settings = Arc::new(ArcSwap::from_pointee(config.blog.clone()));

    tracing::info!(
        url = %site.url(),
        routes = registry.routes().len(),
        static_home = config.blog.static_home,
        "Front controller ready"
    );
    Ok(Front::new(registry, site, settings, services, files))
}
