use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::id::PageId;
use crate::slug::is_tree_slug;

/// A stored page document.
///
/// Only `slug`, `path`, `rank`, `areas` and `trash` are structural. Any other
/// caller-defined property (title, type, tags, ...) lives in `fields` and is
/// carried through storage and versioning untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Stable identifier. Assigned on deserialization when absent.
    #[serde(default)]
    pub id: PageId,
    /// Hierarchical slug, unique across stored pages.
    #[serde(default)]
    pub slug: String,
    /// Materialized tree position. Only tree pages (slug starting with `/`) carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Sibling order within the page tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i64>,
    /// Named content areas, kept in name order.
    #[serde(default)]
    pub areas: BTreeMap<String, Area>,
    /// Soft-delete flag. Trashed pages are invisible to slug resolution.
    #[serde(default, skip_serializing_if = "is_false")]
    pub trash: bool,
    /// Caller-defined properties.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Page {
    /// A new, empty page with a fresh identifier.
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            id: PageId::new(),
            slug: slug.into(),
            path: None,
            rank: None,
            areas: BTreeMap::new(),
            trash: false,
            fields: Map::new(),
        }
    }

    /// Builder-style setter for a caller-defined field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style setter for a named area.
    pub fn with_area(mut self, name: impl Into<String>, area: Area) -> Self {
        self.areas.insert(name.into(), area);
        self
    }

    /// Builder-style setter for the materialized path.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// A caller-defined field rendered as text, if it is a string or number.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> Option<String> {
        self.text_field("title")
    }

    pub fn page_type(&self) -> Option<String> {
        self.text_field("type")
    }

    /// The `tags` field, when it is an array. Non-string entries are skipped.
    pub fn tags(&self) -> Option<Vec<String>> {
        let tags = self.fields.get("tags")?.as_array()?;
        Some(
            tags.iter()
                .filter_map(|t| match t {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
        )
    }

    /// Whether this page lives in the page tree (slug starts with `/`).
    pub fn is_tree_page(&self) -> bool {
        is_tree_slug(&self.slug)
    }
}

/// A named, ordered collection of content items attached to a page.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Area {
    /// Composite `pageSlug:areaName` key. Not authoritative: recomputed on read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Area {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            slug: None,
            items,
            fields: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single polymorphic content unit. Everything beyond `type` belongs to
/// the item type that owns the tag.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    pub fn new(item_type: impl Into<String>) -> Self {
        Self {
            item_type: item_type.into(),
            fields: Map::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Nested objects under the `items` field (slideshows, file lists, ...).
    pub fn sub_items(&self) -> impl Iterator<Item = &Map<String, Value>> {
        self.fields
            .get("items")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_id_is_assigned() {
        let page: Page = serde_json::from_value(json!({ "slug": "/about" })).unwrap();
        assert_eq!(page.slug, "/about");
        assert!(page.areas.is_empty());
        assert!(!page.trash);
    }

    #[test]
    fn extra_fields_are_kept() {
        let page: Page = serde_json::from_value(json!({
            "slug": "/about",
            "title": "About us",
            "type": "default",
            "tags": ["a", 2, null],
            "custom": { "nested": true }
        }))
        .unwrap();
        assert_eq!(page.title().as_deref(), Some("About us"));
        assert_eq!(page.page_type().as_deref(), Some("default"));
        assert_eq!(page.tags().unwrap(), vec!["a".to_string(), "2".to_string()]);
        assert_eq!(page.fields["custom"], json!({ "nested": true }));

        let back = serde_json::to_value(&page).unwrap();
        assert_eq!(back["custom"]["nested"], json!(true));
        assert!(back.get("trash").is_none());
        assert!(back.get("path").is_none());
    }

    #[test]
    fn item_type_tag_roundtrip() {
        let item: Item = serde_json::from_value(json!({
            "type": "video",
            "url": "https://example.com/v"
        }))
        .unwrap();
        assert_eq!(item.item_type, "video");
        assert_eq!(item.str_field("url"), Some("https://example.com/v"));
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["type"], "video");
    }

    #[test]
    fn sub_items_skip_non_objects() {
        let item = Item::new("slideshow").with(
            "items",
            json!([{ "name": "one.jpg" }, "junk", { "name": "two.jpg" }]),
        );
        let names: Vec<_> = item
            .sub_items()
            .filter_map(|i| i.get("name").and_then(Value::as_str))
            .collect();
        assert_eq!(names, vec!["one.jpg", "two.jpg"]);
    }

    #[test]
    fn tree_page_detection() {
        assert!(Page::new("/a/b").is_tree_page());
        assert!(!Page::new("blog-post").is_tree_page());
    }
}
