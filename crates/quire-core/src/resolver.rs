//! Longest-prefix slug resolution over the page tree.

use std::sync::Arc;

use quire_store::PageCollection;
use quire_types::slug::candidate_slugs;
use quire_types::Page;

use crate::error::CoreResult;

/// Outcome of resolving a slug.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolution {
    /// The deepest non-trashed page whose slug is the requested slug or one
    /// of its ancestors.
    pub best: Option<Page>,
    /// Whether `best` has exactly the requested slug.
    pub is_exact: bool,
    /// What is left of the requested slug past `best.slug`, trailing `/`
    /// stripped. Empty when nothing matched.
    pub remainder: String,
}

impl Resolution {
    fn new(slug: &str, best: Option<Page>) -> Self {
        let (is_exact, remainder) = match &best {
            Some(page) => (
                page.slug == slug,
                slug.strip_prefix(page.slug.as_str())
                    .unwrap_or_default()
                    .trim_end_matches('/')
                    .to_string(),
            ),
            None => (false, String::new()),
        };
        Self {
            best,
            is_exact,
            remainder,
        }
    }

    /// The page only if it matched the requested slug verbatim.
    pub fn exact(&self) -> Option<&Page> {
        self.best.as_ref().filter(|_| self.is_exact)
    }
}

/// Resolves slugs against non-trashed pages.
///
/// Tree slugs (leading `/`) match their deepest existing ancestor; any other
/// slug matches only itself.
pub struct SlugResolver {
    pages: Arc<dyn PageCollection>,
}

impl SlugResolver {
    pub fn new(pages: Arc<dyn PageCollection>) -> Self {
        Self { pages }
    }

    pub async fn resolve(&self, slug: &str) -> CoreResult<Resolution> {
        let candidates = candidate_slugs(slug);
        let matches = self.pages.find_by_slugs(&candidates, false).await?;
        // Every candidate is a prefix of `slug`, so the lexicographically
        // greatest match is the longest one.
        let best = matches.into_iter().max_by(|a, b| a.slug.cmp(&b.slug));
        tracing::trace!(%slug, candidates = candidates.len(), best = ?best.as_ref().map(|p| &p.slug), "resolved slug");
        Ok(Resolution::new(slug, best))
    }
}
