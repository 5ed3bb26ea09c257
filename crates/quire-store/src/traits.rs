use async_trait::async_trait;
use quire_types::{Area, Page, PageId, Redirect, Version, VersionId};

use crate::error::StoreResult;

/// The pages collection.
///
/// Implementations must satisfy these invariants:
/// - `id` and `slug` are unique across all stored pages, trashed or not.
/// - `path`, when present, is unique among pages that have one.
/// - Every single-document write is atomic.
#[async_trait]
pub trait PageCollection: Send + Sync {
    /// Fetch the page whose slug equals `slug` exactly.
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Page>>;

    /// Fetch every page whose slug is one of `slugs`. Trashed pages are
    /// skipped unless `include_trash` is set. Order is unspecified.
    async fn find_by_slugs(&self, slugs: &[String], include_trash: bool) -> StoreResult<Vec<Page>>;

    /// Fetch a single named area of the page with slug `page_slug`, without
    /// loading the rest of the page.
    ///
    /// Returns `Ok(None)` if either the page or the area does not exist.
    async fn find_area(&self, page_slug: &str, area_name: &str) -> StoreResult<Option<Area>>;

    /// Targeted update: set `slug` and `areas.<area_name>` on the page whose
    /// slug is `page_slug`, leaving every other field and area untouched.
    ///
    /// Returns the number of pages matched (0 or 1). Never inserts.
    async fn set_area(&self, page_slug: &str, area_name: &str, area: &Area) -> StoreResult<u64>;

    /// Insert a new page. Fails with a unique violation if the id, slug or
    /// path is taken.
    async fn insert(&self, page: &Page) -> StoreResult<()>;

    /// Write a whole page. The stored page whose slug is `slug` is replaced;
    /// if no page has that slug, the stored page with `page.id` is replaced;
    /// otherwise `page` is inserted.
    ///
    /// Fails with a unique violation if the page stored under `slug` has a
    /// different id, or if `page.slug`/`page.path` collide with another page.
    async fn upsert_by_slug(&self, slug: &str, page: &Page) -> StoreResult<()>;
}

/// The versions collection. Append-only.
#[async_trait]
pub trait VersionCollection: Send + Sync {
    async fn insert(&self, version: &Version) -> StoreResult<()>;

    /// The most recent version for `page_id` by `created_at`. Ties go to the
    /// later insert.
    async fn latest_for_page(&self, page_id: &PageId) -> StoreResult<Option<Version>> {
        Ok(self.list_for_page(page_id, Some(1)).await?.into_iter().next())
    }

    /// Versions for `page_id`, newest first, at most `limit` of them.
    async fn list_for_page(&self, page_id: &PageId, limit: Option<usize>) -> StoreResult<Vec<Version>>;

    async fn get(&self, id: &VersionId) -> StoreResult<Option<Version>>;
}

/// The redirects collection.
#[async_trait]
pub trait RedirectCollection: Send + Sync {
    /// Insert or replace the redirect keyed by `redirect.from`.
    async fn upsert(&self, redirect: &Redirect) -> StoreResult<()>;

    async fn find(&self, from: &str) -> StoreResult<Option<Redirect>>;

    /// All redirects, ordered by `from`.
    async fn list(&self) -> StoreResult<Vec<Redirect>>;
}
