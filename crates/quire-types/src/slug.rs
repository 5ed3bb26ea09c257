//! Slug parsing helpers.
//!
//! Pages are addressed by slug. Slugs beginning with `/` live in the page
//! tree and take part in longest-prefix resolution; anything else (blog
//! posts, global virtual pages) only ever matches exactly. Areas are
//! addressed by the composite `pageSlug:areaName`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::TypeError;

/// Whether `slug` belongs to the page tree.
pub fn is_tree_slug(slug: &str) -> bool {
    slug.starts_with('/')
}

/// Every slug that could match `slug` during prefix resolution.
///
/// For tree slugs this is the root `/`, each ancestor path, and the slug
/// itself. Non-tree slugs only yield themselves.
///
/// ```
/// use quire_types::slug::candidate_slugs;
///
/// assert_eq!(
///     candidate_slugs("/a/b/c"),
///     vec!["/a/b/c", "/a/b", "/a", "/"],
/// );
/// assert_eq!(candidate_slugs("global"), vec!["global"]);
/// ```
pub fn candidate_slugs(slug: &str) -> Vec<String> {
    let mut candidates = vec![slug.to_string()];
    if let Some(rest) = slug.strip_prefix('/') {
        let components: Vec<&str> = rest.split('/').collect();
        let mut path = String::new();
        let mut ancestors = vec!["/".to_string()];
        for component in &components[..components.len().saturating_sub(1)] {
            path.push('/');
            path.push_str(component);
            ancestors.push(path.clone());
        }
        ancestors.reverse();
        for ancestor in ancestors {
            if !candidates.contains(&ancestor) {
                candidates.push(ancestor);
            }
        }
    }
    candidates
}

fn area_slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(.+?):([A-Za-z0-9_]+)$").expect("area slug pattern is valid")
    })
}

/// A parsed `pageSlug:areaName` composite key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AreaSlug {
    page_slug: String,
    area_name: String,
}

impl AreaSlug {
    /// Parse a composite area slug.
    ///
    /// The area name is the word after the last `:`; everything before it is
    /// the page slug, which may itself contain colons.
    pub fn parse(slug: &str) -> Result<Self, TypeError> {
        let caps = area_slug_pattern()
            .captures(slug)
            .ok_or_else(|| TypeError::InvalidAreaSlug(slug.to_string()))?;
        Ok(Self {
            page_slug: caps[1].to_string(),
            area_name: caps[2].to_string(),
        })
    }

    pub fn new(page_slug: impl Into<String>, area_name: impl Into<String>) -> Self {
        Self {
            page_slug: page_slug.into(),
            area_name: area_name.into(),
        }
    }

    pub fn page_slug(&self) -> &str {
        &self.page_slug
    }

    pub fn area_name(&self) -> &str {
        &self.area_name
    }
}

impl fmt::Display for AreaSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page_slug, self.area_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parse_simple() {
        let slug = AreaSlug::parse("/cats/about:sidebar").unwrap();
        assert_eq!(slug.page_slug(), "/cats/about");
        assert_eq!(slug.area_name(), "sidebar");
        assert_eq!(slug.to_string(), "/cats/about:sidebar");
    }

    #[test]
    fn parse_uses_last_colon() {
        let slug = AreaSlug::parse("a:b:main").unwrap();
        assert_eq!(slug.page_slug(), "a:b");
        assert_eq!(slug.area_name(), "main");
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(AreaSlug::parse("no-area-here").is_err());
        assert!(AreaSlug::parse("page:").is_err());
        assert!(AreaSlug::parse(":main").is_err());
        assert!(AreaSlug::parse("page:bad-name").is_err());
        assert!(AreaSlug::parse("page:main:").is_err());
    }

    #[test]
    fn candidates_for_root() {
        assert_eq!(candidate_slugs("/"), vec!["/"]);
    }

    #[test]
    fn candidates_with_trailing_slash() {
        assert_eq!(candidate_slugs("/a/b/"), vec!["/a/b/", "/a/b", "/a", "/"]);
    }

    #[test]
    fn non_tree_slug_matches_only_itself() {
        assert_eq!(candidate_slugs("news/today"), vec!["news/today"]);
    }

    proptest! {
        #[test]
        fn every_candidate_is_a_prefix(parts in proptest::collection::vec("[a-z]{1,4}", 1..6)) {
            let slug = format!("/{}", parts.join("/"));
            let candidates = candidate_slugs(&slug);
            prop_assert_eq!(candidates.len(), parts.len() + 1);
            for candidate in &candidates {
                prop_assert!(slug.starts_with(candidate.as_str()));
            }
        }

        #[test]
        fn greatest_candidate_is_the_longest(parts in proptest::collection::vec("[a-z]{1,4}", 1..6)) {
            let slug = format!("/{}", parts.join("/"));
            let candidates = candidate_slugs(&slug);
            let greatest = candidates.iter().max().unwrap();
            let longest = candidates.iter().max_by_key(|c| c.len()).unwrap();
            prop_assert_eq!(greatest, longest);
        }
    }
}
