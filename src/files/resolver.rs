use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::config::{FilesConfig, ThemeConfig};

/// Extension allow-list and the served MIME types.
const MIME_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("js", "application/javascript"),
    ("mjs", "application/javascript"),
    ("json", "application/json"),
    ("map", "application/json"),
    ("xml", "application/xml"),
    ("xsl", "text/xml"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("htm", "text/html"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
    ("avif", "image/avif"),
    ("ico", "image/x-icon"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
    ("otf", "font/otf"),
    ("eot", "application/vnd.ms-fontobject"),
    ("mp3", "audio/mpeg"),
    ("mp4", "video/mp4"),
    ("webm", "video/webm"),
    ("pdf", "application/pdf"),
];

/// MIME type of an allowed extension.
pub fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(allowed, _)| *allowed == ext)
        .map(|(_, mime)| *mime)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub path: PathBuf,
    pub mime: &'static str,
}

/// Resolves `files` route arguments against the configured roots.
#[derive(Debug, Clone)]
pub struct FileResolver {
    theme_files: PathBuf,
    modules: HashMap<String, Vec<PathBuf>>,
    core_dirs: Vec<PathBuf>,
    allow_parent_segments: bool,
    max_age_secs: u64,
    deploy_stamps: Vec<PathBuf>,
}

impl FileResolver {
    /// `deploy_stamps` are files whose mtimes invalidate cached assets.
    pub fn from_config(theme: &ThemeConfig, files: &FilesConfig, deploy_stamps: Vec<PathBuf>) -> Self {
        Self {
            theme_files: theme.files_dir(),
            modules: files.modules.clone(),
            core_dirs: files.core_dirs.clone(),
            allow_parent_segments: files.allow_parent_segments,
            max_age_secs: files.max_age_secs,
            deploy_stamps,
        }
    }

    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }

    pub fn deploy_stamps(&self) -> &[PathBuf] {
        &self.deploy_stamps
    }

    /// Roots to try, each with the path to look up under it.
    fn candidates<'a>(&'a self, relative: &'a str) -> Vec<(&'a Path, &'a str)> {
        let mut candidates = vec![(self.theme_files.as_path(), relative)];

        if let Some((first, rest)) = relative.split_once('/') {
            if let Some(roots) = self.modules.get(first) {
                if !rest.is_empty() {
                    candidates.extend(roots.iter().map(|root| (root.as_path(), rest)));
                }
            }
        }

        candidates.extend(self.core_dirs.iter().map(|dir| (dir.as_path(), relative)));
        candidates
    }

    pub fn resolve(&self, relative: &str) -> Option<ResolvedFile> {
        if relative.is_empty()
            || relative.starts_with('/')
            || relative.contains('\\')
            || relative.contains('\0')
        {
            return None;
        }
        if !self.allow_parent_segments && relative.contains("..") {
            return None;
        }

        let path = self
            .candidates(relative)
            .into_iter()
            .find_map(|(root, rel)| contained_file(root, rel))?;
        let mime = mime_for(&path)?;
        Some(ResolvedFile { path, mime })
    }
}

/// The canonical path of `root/relative` when it is a readable regular file
/// inside `root`.
fn contained_file(root: &Path, relative: &str) -> Option<PathBuf> {
    let root = root.canonicalize().ok()?;
    let path = root.join(relative).canonicalize().ok()?;
    if !path.starts_with(&root) || !path.is_file() {
        return None;
    }
    File::open(&path).ok()?;
    Some(path)
}
