use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use quire_types::{Context, Item};

use crate::builtin;
use crate::error::ItemError;

/// Capabilities of one item type, selected by the item's `type` tag.
///
/// Every capability defaults to a no-op, so a type only implements what it
/// needs.
#[async_trait]
pub trait ItemType: Send + Sync {
    /// The tag this type answers to.
    fn name(&self) -> &str;

    /// Clean up user-submitted fields in place before storage.
    fn sanitize(&self, _item: &mut Item) {}

    /// Whether [`load`](Self::load) does anything. Items of types without a
    /// loader are skipped by the fetch fan-out.
    fn has_loader(&self) -> bool {
        false
    }

    /// Pull external data into the item at fetch time.
    ///
    /// Loaders never fail the fetch: a loader that cannot do its job records
    /// that on the item so the renderer can show it.
    async fn load(&self, _context: &Context, _item: &mut Item) {}

    /// Append lines describing the item so that diffing two versions gives a
    /// readable summary of what changed.
    fn add_diff_lines(&self, _item: &Item, _lines: &mut Vec<String>) {}

    /// Render the item to markup, if this type renders without templates.
    fn render(&self, _item: &Item) -> Option<String> {
        None
    }
}

/// Lookup table from type tag to [`ItemType`].
///
/// Filled by explicit registration at startup, then shared behind an `Arc`
/// and only read.
#[derive(Clone, Default)]
pub struct ItemTypeRegistry {
    types: HashMap<String, Arc<dyn ItemType>>,
}

impl ItemTypeRegistry {
    /// An empty registry. Every tag is unknown.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in content types.
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        for item_type in builtin::all() {
            let name = item_type.name().to_string();
            registry.types.insert(name, item_type);
        }
        registry
    }

    /// Register a type under its own name. Names must be unique.
    pub fn register(&mut self, item_type: Arc<dyn ItemType>) -> Result<&mut Self, ItemError> {
        let name = item_type.name().to_string();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(ItemError::InvalidTypeName(name));
        }
        if self.types.contains_key(&name) {
            return Err(ItemError::DuplicateType(name));
        }
        tracing::debug!(item_type = %name, loader = item_type.has_loader(), "registered item type");
        self.types.insert(name, item_type);
        Ok(self)
    }

    pub fn get(&self, tag: &str) -> Option<&Arc<dyn ItemType>> {
        self.types.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.types.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The loader-bearing type for `item`, if any.
    pub fn loader_for(&self, item: &Item) -> Option<&Arc<dyn ItemType>> {
        self.get(&item.item_type).filter(|t| t.has_loader())
    }

    /// Run each known type's sanitizer over `items`.
    pub fn sanitize_items(&self, items: &mut [Item]) {
        for item in items {
            if let Some(item_type) = self.types.get(&item.item_type) {
                item_type.sanitize(item);
            }
        }
    }

    pub fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
        if let Some(item_type) = self.types.get(&item.item_type) {
            item_type.add_diff_lines(item, lines);
        }
    }

    pub fn render(&self, item: &Item) -> Option<String> {
        self.types.get(&item.item_type)?.render(item)
    }
}

impl fmt::Debug for ItemTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemTypeRegistry")
            .field("types", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Weather;

    #[async_trait]
    impl ItemType for Weather {
        fn name(&self) -> &str {
            "weather"
        }

        fn has_loader(&self) -> bool {
            true
        }

        async fn load(&self, _context: &Context, item: &mut Item) {
            item.set("forecast", "sunny");
        }

        fn add_diff_lines(&self, item: &Item, lines: &mut Vec<String>) {
            lines.push(format!("city: {}", item.str_field("city").unwrap_or_default()));
        }
    }

    struct Nameless;

    impl ItemType for Nameless {
        fn name(&self) -> &str {
            "has space"
        }
    }

    #[test]
    fn builtins_are_registered() {
        let registry = ItemTypeRegistry::with_builtin_types();
        for tag in ["richText", "slideshow", "buttons", "files", "video", "pullquote", "code"] {
            assert!(registry.contains(tag), "missing built-in {tag}");
        }
    }

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = ItemTypeRegistry::new();
        registry.register(Arc::new(Weather)).unwrap();
        let err = registry.register(Arc::new(Weather)).unwrap_err();
        assert_eq!(err, ItemError::DuplicateType("weather".into()));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut registry = ItemTypeRegistry::new();
        assert!(matches!(
            registry.register(Arc::new(Nameless)),
            Err(ItemError::InvalidTypeName(_))
        ));
    }

    #[test]
    fn unknown_tags_are_no_ops() {
        let registry = ItemTypeRegistry::with_builtin_types();
        let mut items = vec![Item::new("mystery").with("content", "  untouched  ")];
        registry.sanitize_items(&mut items);
        assert_eq!(items[0].str_field("content"), Some("  untouched  "));

        let mut lines = Vec::new();
        registry.add_diff_lines(&items[0], &mut lines);
        assert!(lines.is_empty());
        assert!(registry.render(&items[0]).is_none());
        assert!(registry.loader_for(&items[0]).is_none());
    }

    #[tokio::test]
    async fn custom_loader_runs() {
        let mut registry = ItemTypeRegistry::with_builtin_types();
        registry.register(Arc::new(Weather)).unwrap();

        let mut item = Item::new("weather").with("city", "Oslo");
        let loader = registry.loader_for(&item).cloned().expect("weather has a loader");
        loader.load(&Context::anonymous(), &mut item).await;
        assert_eq!(item.str_field("forecast"), Some("sunny"));

        let mut lines = Vec::new();
        registry.add_diff_lines(&item, &mut lines);
        assert_eq!(lines, vec!["city: Oslo"]);
    }

    #[test]
    fn builtins_have_no_loaders() {
        let registry = ItemTypeRegistry::with_builtin_types();
        assert!(registry.loader_for(&Item::new("video")).is_none());
    }

    #[test]
    fn debug_lists_names() {
        let registry = ItemTypeRegistry::with_builtin_types();
        let debug = format!("{registry:?}");
        assert!(debug.contains("richText"));
    }
}
