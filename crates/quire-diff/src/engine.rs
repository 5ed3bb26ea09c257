//! Canonical page lines and page-to-page diffs.

use std::fmt;
use std::sync::Arc;

use quire_items::ItemTypeRegistry;
use quire_types::{DiffSegment, Page};

use crate::line_diff::diff_lines;

/// Contributes extra canonical lines for a page. Receives the page and the
/// lines accumulated so far.
pub type DiffListener = Box<dyn Fn(&Page, &mut Vec<String>) + Send + Sync>;

/// Turns pages into line sequences and diffs them.
///
/// Listeners are registered during setup and only read afterwards; share the
/// engine behind an `Arc` once built.
pub struct DiffEngine {
    registry: Arc<ItemTypeRegistry>,
    listeners: Vec<DiffListener>,
}

impl DiffEngine {
    pub fn new(registry: Arc<ItemTypeRegistry>) -> Self {
        Self {
            registry,
            listeners: Vec::new(),
        }
    }

    /// Append a listener. Listeners run in registration order, after the
    /// fixed metadata lines and before the area blocks.
    pub fn add_listener<F>(&mut self, listener: F) -> &mut Self
    where
        F: Fn(&Page, &mut Vec<String>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn registry(&self) -> &Arc<ItemTypeRegistry> {
        &self.registry
    }

    /// The canonical line sequence for `page`.
    pub fn page_lines(&self, page: &Page) -> Vec<String> {
        let mut lines = vec![
            format!("title: {}", page.title().unwrap_or_default()),
            format!("type: {}", page.page_type().unwrap_or_default()),
        ];
        if let Some(tags) = page.tags() {
            lines.push(format!("tags: {}", tags.join(",")));
        }

        for listener in &self.listeners {
            listener(page, &mut lines);
        }

        // BTreeMap iteration is already ascending by area name.
        for (area_name, area) in &page.areas {
            for item in &area.items {
                lines.push(format!("{area_name}: {}", item.item_type));
                self.registry.add_diff_lines(item, &mut lines);
            }
        }
        lines
    }

    /// Added and removed runs between `a` and `b`, unchanged runs omitted.
    pub fn diff_pages(&self, a: &Page, b: &Page) -> Vec<DiffSegment> {
        let old = self.page_lines(a);
        let new = self.page_lines(b);
        let diff = diff_lines(&old, &new);
        tracing::trace!(
            old_lines = old.len(),
            new_lines = new.len(),
            segments = diff.len(),
            "diffed page snapshots"
        );
        diff
    }
}

impl fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffEngine")
            .field("registry", &self.registry)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_types::{Area, Item};
    use serde_json::json;

    fn engine() -> DiffEngine {
        DiffEngine::new(Arc::new(ItemTypeRegistry::with_builtin_types()))
    }

    fn home() -> Page {
        Page::new("/")
            .with_field("title", "Home")
            .with_field("type", "home")
            .with_area(
                "body",
                Area::new(vec![Item::new("richText").with("content", "<p>Welcome</p>")]),
            )
    }

    #[test]
    fn fixed_lines_come_first() {
        let lines = engine().page_lines(&home());
        assert_eq!(lines[0], "title: Home");
        assert_eq!(lines[1], "type: home");
        assert_eq!(lines[2], "body: richText");
        assert_eq!(lines[3], "Welcome");
    }

    #[test]
    fn missing_metadata_renders_empty() {
        let lines = engine().page_lines(&Page::new("bare"));
        assert_eq!(lines, vec!["title: ".to_string(), "type: ".to_string()]);
    }

    #[test]
    fn tags_line_when_present() {
        let page = home().with_field("tags", json!(["news", "local"]));
        let lines = engine().page_lines(&page);
        assert_eq!(lines[2], "tags: news,local");
    }

    #[test]
    fn areas_in_name_order() {
        let page = Page::new("p")
            .with_area("zeta", Area::new(vec![Item::new("mystery")]))
            .with_area("alpha", Area::new(vec![Item::new("mystery")]));
        let lines = engine().page_lines(&page);
        assert_eq!(&lines[2..], &["alpha: mystery", "zeta: mystery"]);
    }

    #[test]
    fn listeners_run_in_order_before_areas() {
        let mut engine = engine();
        engine
            .add_listener(|page, lines| lines.push(format!("slug: {}", page.slug)))
            .add_listener(|_, lines| lines.push(format!("count: {}", lines.len())));
        let lines = engine.page_lines(&home());
        assert_eq!(lines[2], "slug: /");
        assert_eq!(lines[3], "count: 3");
        assert_eq!(lines[4], "body: richText");
    }

    #[test]
    fn identical_pages_have_empty_diff() {
        let page = home();
        assert!(engine().diff_pages(&page, &page.clone()).is_empty());
    }

    #[test]
    fn title_change_shows_both_sides() {
        let before = home();
        let after = home().with_field("title", "Start");
        let diff = engine().diff_pages(&before, &after);
        assert_eq!(
            diff,
            vec![DiffSegment::removed("title: Home"), DiffSegment::added("title: Start")]
        );
    }

    #[test]
    fn markup_only_changes_are_invisible() {
        let before = home();
        let after = home().with_area(
            "body",
            Area::new(vec![Item::new("richText").with("content", "<div><b>Welcome</b></div>")]),
        );
        assert!(engine().diff_pages(&before, &after).is_empty());
    }

    #[test]
    fn unknown_item_types_contribute_only_their_header() {
        let page = Page::new("p").with_area(
            "main",
            Area::new(vec![Item::new("mystery").with("content", "hidden")]),
        );
        let lines = engine().page_lines(&page);
        assert_eq!(lines.last().map(String::as_str), Some("main: mystery"));
    }

    #[test]
    fn multi_line_title_diffs_per_line() {
        let before = home().with_field("title", "Line1\nLine2");
        let after = home().with_field("title", "Line1\nLine3");
        assert_eq!(
            engine().diff_pages(&before, &after),
            vec![DiffSegment::removed("Line2"), DiffSegment::added("Line3")]
        );
    }

    #[test]
    fn multi_line_listener_output_diffs_per_line() {
        let mut engine = engine();
        engine.add_listener(|page, lines| {
            let body = page.text_field("body").unwrap_or_default();
            lines.push(format!("head\n{body}\ntail"));
        });
        let before = Page::new("p").with_field("body", "old");
        let after = Page::new("p").with_field("body", "new");
        assert_eq!(
            engine.diff_pages(&before, &after),
            vec![DiffSegment::removed("old"), DiffSegment::added("new")]
        );
    }
}
