//! Comment markup: CommonMark to HTML plus an allow-list sanitizer.
//!
//! Raw HTML in the source is never passed through; it is rendered as text.
//! The restricted ruleset additionally flattens headings into paragraphs and
//! drops images, keeping their alt text.

use std::sync::LazyLock;

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use regex::{Captures, Regex};

/// Markup ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupMode {
    Rich,
    Restricted,
}

pub trait Markup: Send + Sync {
    fn to_html(&self, raw: &str, mode: MarkupMode) -> String;

    fn sanitize(&self, html: &str) -> String;
}

static DROPPED_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
        .expect("dropped block regex should compile")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([a-zA-Z][a-zA-Z0-9]*)([^>]*)>").expect("tag regex should compile")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute regex should compile")
});

const ALLOWED_TAGS: &[&str] = &[
    "a", "abbr", "b", "blockquote", "br", "cite", "code", "dd", "del", "dl", "dt", "em", "h1",
    "h2", "h3", "h4", "h5", "h6", "hr", "i", "ins", "li", "ol", "p", "pre", "q", "span", "strong",
    "sub", "sup", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

const VOID_TAGS: &[&str] = &["br", "hr"];

/// pulldown-cmark rendering with the regex sanitizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonMark;

impl Markup for CommonMark {
    fn to_html(&self, raw: &str, mode: MarkupMode) -> String {
        let options = match mode {
            MarkupMode::Rich => Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
            MarkupMode::Restricted => Options::empty(),
        };
        let restricted = mode == MarkupMode::Restricted;

        let events = Parser::new_ext(raw, options).filter_map(|event| match event {
            Event::Html(text) | Event::InlineHtml(text) => Some(Event::Text(text)),
            Event::Start(Tag::Heading { .. }) if restricted => Some(Event::Start(Tag::Paragraph)),
            Event::End(TagEnd::Heading(_)) if restricted => Some(Event::End(TagEnd::Paragraph)),
            Event::Start(Tag::Image { .. }) | Event::End(TagEnd::Image) if restricted => None,
            other => Some(other),
        });

        let mut out = String::with_capacity(raw.len() * 2);
        html::push_html(&mut out, events);
        out
    }

    fn sanitize(&self, html: &str) -> String {
        let stripped = DROPPED_BLOCKS.replace_all(html, "");
        TAG.replace_all(&stripped, |caps: &Captures| {
            let name = caps[2].to_ascii_lowercase();
            if !ALLOWED_TAGS.contains(&name.as_str()) {
                return String::new();
            }
            if !caps[1].is_empty() {
                return format!("</{name}>");
            }

            let mut tag = format!("<{name}");
            for attr in ATTRIBUTE.captures_iter(&caps[3]) {
                let key = attr[1].to_ascii_lowercase();
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .map_or("", |m| m.as_str());
                let keep = match key.as_str() {
                    "href" => name == "a" && is_safe_link(value),
                    "cite" => matches!(name.as_str(), "blockquote" | "q") && is_safe_link(value),
                    "title" => true,
                    _ => false,
                };
                if keep {
                    tag.push_str(&format!(" {key}=\"{}\"", value.replace('"', "&quot;")));
                }
            }
            if VOID_TAGS.contains(&name.as_str()) {
                tag.push_str(" /");
            }
            tag.push('>');
            tag
        })
        .into_owned()
    }
}

static CHAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#[xX]([0-9a-fA-F]+);?|&#([0-9]+);?|&([a-zA-Z]+);")
        .expect("character reference regex should compile")
});

/// Decode the character references a browser would resolve in an attribute.
fn decode_char_refs(value: &str) -> String {
    CHAR_REF
        .replace_all(value, |caps: &Captures| {
            let code = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse().ok()
            } else {
                match caps[3].to_ascii_lowercase().as_str() {
                    "colon" => Some(u32::from(':')),
                    "tab" => Some(u32::from('\t')),
                    "newline" => Some(u32::from('\n')),
                    "sol" => Some(u32::from('/')),
                    "amp" => Some(u32::from('&')),
                    _ => return caps[0].to_string(),
                }
            };
            code.and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
                .to_string()
        })
        .into_owned()
}

/// Relative links, fragments and http(s)/mailto only.
fn is_safe_link(value: &str) -> bool {
    let decoded: String = decode_char_refs(value)
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = decoded.find(':');
    let path_start = decoded.find(['/', '?', '#']);
    match (scheme_end, path_start) {
        (None, _) => true,
        (Some(colon), Some(path)) if path < colon => true,
        (Some(colon), _) => matches!(&decoded[..colon], "http" | "https" | "mailto"),
    }
}
