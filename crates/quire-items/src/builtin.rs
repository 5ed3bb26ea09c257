//! Item types shipped with Quire.

use std::sync::{Arc, OnceLock};

use quire_types::sanitize::escape_html;
use quire_types::Item;
use regex::Regex;
use serde_json::Value;

use crate::registry::ItemType;
use crate::text::{add_diff_lines_for_markup, add_diff_lines_for_text};

/// Every built-in type, ready for registration.
pub fn all() -> Vec<Arc<dyn ItemType>> {
    vec![
        Arc::new(RichText),
        Arc::new(NamedList::new("slideshow", "image")),
        Arc::new(NamedList::new("buttons", "image")),
        Arc::new(NamedList::new("files", "file")),
        Arc::new(Video),
        Arc::new(Pullquote),
        Arc::new(Code),
    ]
}

fn content(item: &Item) -> &str {
    item.str_field("content").unwrap_or_default()
}

fn unsafe_markup() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?is)<script\b.*?</script\s*>",
            r"(?is)<style\b.*?</style\s*>",
            r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#,
            r#"(?i)(href|src)\s*=\s*(["']?)\s*javascript:[^"'\s>]*(["']?)"#,
        ]
        .iter()
        .map(|p| Regex::new(p).expect("sanitizer pattern is valid"))
        .collect()
    })
}

/// Formatted text edited in place. Stored as markup in `content`.
pub struct RichText;

impl ItemType for RichText {
    fn name(&self) -> &str {
        "richText"
    }

    fn sanitize(&self, item: &mut Item) {
        let mut markup = content(item).to_string();
        for pattern in unsafe_markup() {
            markup = pattern.replace_all(&markup, "").into_owned();
        }
        item.set("content", markup.trim());
    }

    fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        add_diff_lines_for_markup(content(item), lines);
    }

    fn render(&self, item: &Item) -> Option<String> {
        Some(content(item).to_string())
    }
}

/// A widget holding a list of named sub-items (slideshow images, buttons,
/// file attachments). Each sub-item contributes `<label>: <name>`.
pub struct NamedList {
    tag: &'static str,
    label: &'static str,
}

impl NamedList {
    pub const fn new(tag: &'static str, label: &'static str) -> Self {
        Self { tag, label }
    }
}

impl ItemType for NamedList {
    fn name(&self) -> &str {
        self.tag
    }

    fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        for sub in item.sub_items() {
            let name = sub.get("name").and_then(Value::as_str).unwrap_or_default();
            lines.push(format!("{}: {name}", self.label));
        }
    }
}

/// Embedded video referenced by `url`.
pub struct Video;

impl ItemType for Video {
    fn name(&self) -> &str {
        "video"
    }

    fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        lines.push(format!("video: {}", item.str_field("url").unwrap_or_default()));
    }
}

/// A short plain-text quote.
pub struct Pullquote;

impl ItemType for Pullquote {
    fn name(&self) -> &str {
        "pullquote"
    }

    fn sanitize(&self, item: &mut Item) {
        let trimmed = content(item).trim().to_string();
        item.set("content", trimmed);
    }

    fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        lines.push(format!("pullquote: {}", content(item)));
    }

    fn render(&self, item: &Item) -> Option<String> {
        Some(format!(
            "<span class=\"quire-pullquote-text\">{}</span>",
            escape_html(content(item))
        ))
    }
}

/// A preformatted code sample.
pub struct Code;

impl ItemType for Code {
    fn name(&self) -> &str {
        "code"
    }

    fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        add_diff_lines_for_text(content(item), lines);
    }

    fn render(&self, item: &Item) -> Option<String> {
        Some(format!("<pre>{}</pre>", escape_html(content(item))))
    }
}
