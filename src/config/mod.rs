//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → FrontConfig (validated, immutable)
//!     → routes/theme/files used once at boot
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of Arc<BlogSettings>
//!     → next request observes new settings
//! ```
//!
//! # Design Decisions
//! - Only `[blog]` settings are hot reloadable; routes are built once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, BlogSettings, FilesConfig, FrontConfig, ListenerConfig, ObservabilityConfig,
    SiteConfig, ThemeConfig, TimeoutConfig, UrlScan, UserConfig,
};
pub use watcher::SettingsWatcher;
