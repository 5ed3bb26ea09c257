//! Version snapshots taken after every page mutation.

use std::sync::Arc;

use chrono::Utc;
use quire_diff::DiffEngine;
use quire_store::{PageCollection, VersionCollection};
use quire_types::{Context, DiffSegment, Page, PageId, Version, VersionId};
use tracing::debug;

use crate::error::CoreResult;
use crate::identity::IdentityAccessor;

/// The page to snapshot: fetched by slug, or already in hand.
#[derive(Clone, Copy, Debug)]
pub enum PageRef<'a> {
    Slug(&'a str),
    Page(&'a Page),
}

impl<'a> From<&'a Page> for PageRef<'a> {
    fn from(page: &'a Page) -> Self {
        Self::Page(page)
    }
}

impl<'a> From<&'a str> for PageRef<'a> {
    fn from(slug: &'a str) -> Self {
        Self::Slug(slug)
    }
}

/// Appends a [`Version`] per mutation, diffed against the page's previous
/// version.
///
/// Versions are written after the page itself and outside any transaction:
/// if the version write fails the page change stays.
pub struct VersionManager {
    pages: Arc<dyn PageCollection>,
    versions: Arc<dyn VersionCollection>,
    diff: Arc<DiffEngine>,
    identity: Arc<dyn IdentityAccessor>,
    unknown_author: String,
}

impl VersionManager {
    pub fn new(
        pages: Arc<dyn PageCollection>,
        versions: Arc<dyn VersionCollection>,
        diff: Arc<DiffEngine>,
        identity: Arc<dyn IdentityAccessor>,
        unknown_author: impl Into<String>,
    ) -> Self {
        Self {
            pages,
            versions,
            diff,
            identity,
            unknown_author: unknown_author.into(),
        }
    }

    /// Snapshot the current state of a page.
    ///
    /// Returns `None` only when a slug names no page.
    pub async fn version_page(&self, context: &Context, page: PageRef<'_>) -> CoreResult<Option<Version>> {
        let fetched;
        let page = match page {
            PageRef::Page(page) => page,
            PageRef::Slug(slug) => match self.pages.find_by_slug(slug).await? {
                Some(found) => {
                    fetched = found;
                    &fetched
                }
                None => return Ok(None),
            },
        };

        let prior = self.versions.latest_for_page(&page.id).await?;
        let diff = match &prior {
            Some(prior) => self.diff.diff_pages(&prior.page, page),
            None => vec![DiffSegment::new_page()],
        };
        let version = Version {
            id: VersionId::new(),
            page_id: page.id,
            created_at: Utc::now(),
            author: self
                .identity
                .current_author(context)
                .unwrap_or_else(|| self.unknown_author.clone()),
            diff,
            page: page.clone(),
        };
        self.versions.insert(&version).await?;
        debug!(
            page = %page.slug,
            version = %version.id,
            author = %version.author,
            segments = version.diff.len(),
            first = prior.is_none(),
            "version recorded"
        );
        Ok(Some(version))
    }

    /// Versions of a page, newest first.
    pub async fn history(&self, page_id: &PageId, limit: Option<usize>) -> CoreResult<Vec<Version>> {
        Ok(self.versions.list_for_page(page_id, limit).await?)
    }

    pub async fn get(&self, id: &VersionId) -> CoreResult<Option<Version>> {
        Ok(self.versions.get(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::ContextUser;
    use quire_items::ItemTypeRegistry;
    use quire_store::InMemoryStore;

    fn manager(store: &Arc<InMemoryStore>) -> VersionManager {
        let diff = DiffEngine::new(Arc::new(ItemTypeRegistry::with_builtin_types()));
        VersionManager::new(store.clone(), store.clone(), Arc::new(diff), Arc::new(ContextUser), "unknown")
    }

    #[tokio::test]
    async fn first_version_is_marked_new() {
        let store = Arc::new(InMemoryStore::new());
        let page = Page::new("/a").with_field("title", "A");
        let v = manager(&store)
            .version_page(&Context::anonymous(), PageRef::Page(&page))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(v.diff, vec![DiffSegment::added("[NEW]")]);
        assert!(v.is_initial());
        assert_eq!(v.author, "unknown");
        assert_eq!(v.page_id, page.id);
    }

    #[tokio::test]
    async fn later_versions_diff_against_latest() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let ctx = Context::user("ada");
        let mut page = Page::new("/a").with_field("title", "One");
        mgr.version_page(&ctx, (&page).into()).await.unwrap();
        page = page.with_field("title", "Two");
        mgr.version_page(&ctx, (&page).into()).await.unwrap();
        page = page.with_field("title", "Three");
        let v = mgr.version_page(&ctx, (&page).into()).await.unwrap().unwrap();

        assert_eq!(v.author, "ada");
        assert_eq!(
            v.diff,
            vec![DiffSegment::removed("title: Two"), DiffSegment::added("title: Three")]
        );
        let history = mgr.history(&page.id, None).await.unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].id, v.id);
        assert_eq!(mgr.get(&v.id).await.unwrap().unwrap().page.title().as_deref(), Some("Three"));
    }

    #[tokio::test]
    async fn slug_reference_reads_stored_page() {
        let store = Arc::new(InMemoryStore::new());
        let page = Page::new("global").with_field("title", "Footer");
        PageCollection::insert(store.as_ref(), &page).await.unwrap();
        let mgr = manager(&store);

        let v = mgr.version_page(&Context::anonymous(), "global".into()).await.unwrap().unwrap();
        assert_eq!(v.page, page);
        assert!(mgr.version_page(&Context::anonymous(), "missing".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unchanged_page_gives_empty_diff() {
        let store = Arc::new(InMemoryStore::new());
        let mgr = manager(&store);
        let page = Page::new("/same").with_field("title", "Same");
        mgr.version_page(&Context::anonymous(), (&page).into()).await.unwrap();
        let v = mgr.version_page(&Context::anonymous(), (&page).into()).await.unwrap().unwrap();
        assert!(v.diff.is_empty());
    }
}
