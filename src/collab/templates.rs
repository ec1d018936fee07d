//! Template collaborator and the theme directory loader.
//!
//! The loader looks templates up in the active theme, then its parent, then
//! the core set. Rendering is plain placeholder interpolation over the
//! serialized request context:
//!
//! - `{{ path.to.value }}` inserts the value HTML-escaped
//! - `{{ path.to.value | raw }}` inserts it verbatim
//!
//! Array elements are addressed by index (`{{ posts.0.title }}`). Unknown
//! paths render as the empty string.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::front::RequestContext;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*(\|\s*raw\s*)?\}\}")
        .expect("placeholder regex should compile")
});

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("template {0} not found")]
    NotFound(String),

    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize render context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Template resolution and rendering.
pub trait Templates: Send + Sync {
    /// Concrete file backing `name`, if any.
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    fn render(&self, name: &str, ctx: &RequestContext) -> Result<Vec<u8>, TemplateError>;
}

/// Templates read from theme directories on every render.
#[derive(Debug, Clone)]
pub struct ThemeTemplates {
    dirs: Vec<PathBuf>,
}

impl ThemeTemplates {
    /// Lookup happens in the order given.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }
}

impl Templates for ThemeTemplates {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() || name.contains("..") || name.starts_with('/') {
            return None;
        }
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|path| path.is_file())
    }

    fn render(&self, name: &str, ctx: &RequestContext) -> Result<Vec<u8>, TemplateError> {
        let path = self
            .resolve(name)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
        let source = std::fs::read_to_string(&path).map_err(|source| TemplateError::Io {
            path: path.clone(),
            source,
        })?;
        let data = serde_json::to_value(ctx)?;
        Ok(interpolate(&source, &data).into_bytes())
    }
}

/// Substitute every placeholder in `source` from `data`.
pub fn interpolate(source: &str, data: &Value) -> String {
    PLACEHOLDER
        .replace_all(source, |caps: &Captures| {
            let text = lookup(data, &caps[1]).map(display).unwrap_or_default();
            if caps.get(2).is_some() {
                text
            } else {
                escape_html(&text)
            }
        })
        .into_owned()
}

fn lookup<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(data, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Escape text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
