//! Hot reload of blog settings.
//!
//! Only the `[blog]` section is applied on change: the route table, theme and
//! listener are fixed at boot.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::config::loader::load_config;
use crate::config::schema::BlogSettings;

/// Watches the configuration file and swaps in new blog settings.
pub struct SettingsWatcher {
    path: PathBuf,
    settings: Arc<ArcSwap<BlogSettings>>,
}

impl SettingsWatcher {
    /// Create a watcher publishing into `settings`.
    pub fn new(path: &Path, settings: Arc<ArcSwap<BlogSettings>>) -> Self {
        Self {
            path: path.to_path_buf(),
            settings,
        }
    }

    /// Reload the file once. Invalid files keep the current settings.
    pub fn reload(&self) -> bool {
        match load_config(&self.path) {
            Ok(config) => {
                self.settings.store(Arc::new(config.blog));
                tracing::info!(path = ?self.path, "Blog settings reloaded");
                true
            }
            Err(e) => {
                tracing::error!(
                    path = ?self.path,
                    "Failed to reload config: {}. Keeping current settings.",
                    e
                );
                false
            }
        }
    }

    /// Start watching. The returned handle must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    tracing::debug!(kind = ?event.kind, "Config file change detected");
                    self.reload();
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}
