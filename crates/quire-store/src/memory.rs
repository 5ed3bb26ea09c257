use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use quire_types::{Area, Page, PageId, Redirect, Version, VersionId};
use tracing::debug;

use crate::error::{StoreError, StoreResult, UniqueField};
use crate::snapshot::Snapshot;
use crate::traits::{PageCollection, RedirectCollection, VersionCollection};

/// In-memory store backing all three collections.
///
/// Intended for tests, embedding and the CLI. Each collection sits behind its
/// own `RwLock`; every write takes the lock once, so single-document updates
/// are atomic. Documents are cloned on read and write.
pub struct InMemoryStore {
    pages: RwLock<PageState>,
    versions: RwLock<Vec<Version>>,
    redirects: RwLock<BTreeMap<String, Redirect>>,
}

#[derive(Default)]
struct PageState {
    docs: HashMap<PageId, Page>,
    by_slug: HashMap<String, PageId>,
    by_path: HashMap<String, PageId>,
}

impl PageState {
    /// Reject `page` if its id, slug or path belongs to a page other than
    /// `owner`.
    fn check_unique(&self, page: &Page, owner: Option<PageId>) -> StoreResult<()> {
        if owner != Some(page.id) && self.docs.contains_key(&page.id) {
            return Err(StoreError::UniqueViolation {
                field: UniqueField::Id,
                value: page.id.to_string(),
            });
        }
        if let Some(other) = self.by_slug.get(&page.slug) {
            if Some(*other) != owner {
                return Err(StoreError::UniqueViolation {
                    field: UniqueField::Slug,
                    value: page.slug.clone(),
                });
            }
        }
        if let Some(path) = &page.path {
            if let Some(other) = self.by_path.get(path) {
                if Some(*other) != owner {
                    return Err(StoreError::UniqueViolation {
                        field: UniqueField::Path,
                        value: path.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn remove(&mut self, id: &PageId) {
        if let Some(old) = self.docs.remove(id) {
            self.by_slug.remove(&old.slug);
            if let Some(path) = &old.path {
                self.by_path.remove(path);
            }
        }
    }

    fn put(&mut self, page: Page) {
        self.by_slug.insert(page.slug.clone(), page.id);
        if let Some(path) = &page.path {
            self.by_path.insert(path.clone(), page.id);
        }
        self.docs.insert(page.id, page);
    }

    fn by_slug(&self, slug: &str) -> Option<&Page> {
        self.by_slug.get(slug).and_then(|id| self.docs.get(id))
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(PageState::default()),
            versions: RwLock::new(Vec::new()),
            redirects: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store from a snapshot, enforcing the same uniqueness rules as
    /// live writes.
    pub fn from_snapshot(snapshot: Snapshot) -> StoreResult<Self> {
        let store = Self::new();
        {
            let mut pages = store.write_pages()?;
            for page in snapshot.pages {
                pages.check_unique(&page, None)?;
                pages.put(page);
            }
        }
        store.write_versions()?.extend(snapshot.versions);
        {
            let mut redirects = store.write_redirects()?;
            for redirect in snapshot.redirects {
                redirects.insert(redirect.from.clone(), redirect);
            }
        }
        Ok(store)
    }

    /// Copy every collection out. Pages are ordered by slug, versions by
    /// insertion order.
    pub fn to_snapshot(&self) -> StoreResult<Snapshot> {
        let mut pages: Vec<Page> = self.read_pages()?.docs.values().cloned().collect();
        pages.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(Snapshot {
            pages,
            versions: self.read_versions()?.clone(),
            redirects: self.read_redirects()?.values().cloned().collect(),
        })
    }

    /// Number of stored pages, trashed ones included.
    pub fn page_count(&self) -> StoreResult<usize> {
        Ok(self.read_pages()?.docs.len())
    }

    /// Number of stored versions across all pages.
    pub fn version_count(&self) -> StoreResult<usize> {
        Ok(self.read_versions()?.len())
    }

    /// All pages, ordered by slug.
    pub fn all_pages(&self) -> StoreResult<Vec<Page>> {
        Ok(self.to_snapshot()?.pages)
    }

    fn read_pages(&self) -> StoreResult<RwLockReadGuard<'_, PageState>> {
        self.pages.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_pages(&self) -> StoreResult<RwLockWriteGuard<'_, PageState>> {
        self.pages.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn read_versions(&self) -> StoreResult<RwLockReadGuard<'_, Vec<Version>>> {
        self.versions.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_versions(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<Version>>> {
        self.versions.write().map_err(|_| StoreError::LockPoisoned)
    }

    fn read_redirects(&self) -> StoreResult<RwLockReadGuard<'_, BTreeMap<String, Redirect>>> {
        self.redirects.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write_redirects(&self) -> StoreResult<RwLockWriteGuard<'_, BTreeMap<String, Redirect>>> {
        self.redirects.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageCollection for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> StoreResult<Option<Page>> {
        Ok(self.read_pages()?.by_slug(slug).cloned())
    }

    async fn find_by_slugs(&self, slugs: &[String], include_trash: bool) -> StoreResult<Vec<Page>> {
        let pages = self.read_pages()?;
        Ok(slugs
            .iter()
            .filter_map(|slug| pages.by_slug(slug))
            .filter(|page| include_trash || !page.trash)
            .cloned()
            .collect())
    }

    async fn find_area(&self, page_slug: &str, area_name: &str) -> StoreResult<Option<Area>> {
        let pages = self.read_pages()?;
        Ok(pages
            .by_slug(page_slug)
            .and_then(|page| page.areas.get(area_name))
            .cloned())
    }

    async fn set_area(&self, page_slug: &str, area_name: &str, area: &Area) -> StoreResult<u64> {
        let mut pages = self.write_pages()?;
        let Some(id) = pages.by_slug.get(page_slug).copied() else {
            return Ok(0);
        };
        let Some(page) = pages.docs.get_mut(&id) else {
            return Err(StoreError::Backend(format!(
                "slug index points at missing page {id}"
            )));
        };
        page.slug = page_slug.to_string();
        page.areas.insert(area_name.to_string(), area.clone());
        debug!(page = %page_slug, area = %area_name, "area updated in place");
        Ok(1)
    }

    async fn insert(&self, page: &Page) -> StoreResult<()> {
        let mut pages = self.write_pages()?;
        pages.check_unique(page, None)?;
        pages.put(page.clone());
        debug!(page = %page.slug, id = %page.id, "page inserted");
        Ok(())
    }

    async fn upsert_by_slug(&self, slug: &str, page: &Page) -> StoreResult<()> {
        let mut pages = self.write_pages()?;
        let owner = match pages.by_slug.get(slug).copied() {
            Some(existing) if existing != page.id => {
                return Err(StoreError::UniqueViolation {
                    field: UniqueField::Id,
                    value: page.id.to_string(),
                });
            }
            Some(existing) => Some(existing),
            None if pages.docs.contains_key(&page.id) => Some(page.id),
            None => None,
        };
        pages.check_unique(page, owner)?;
        if let Some(owner) = owner {
            pages.remove(&owner);
        }
        pages.put(page.clone());
        debug!(key = %slug, page = %page.slug, id = %page.id, replaced = owner.is_some(), "page upserted");
        Ok(())
    }
}

#[async_trait]
impl VersionCollection for InMemoryStore {
    async fn insert(&self, version: &Version) -> StoreResult<()> {
        self.write_versions()?.push(version.clone());
        Ok(())
    }

    async fn list_for_page(&self, page_id: &PageId, limit: Option<usize>) -> StoreResult<Vec<Version>> {
        let versions = self.read_versions()?;
        // Walk newest insert first so the stable sort keeps later inserts
        // ahead of earlier ones with the same timestamp.
        let mut matching: Vec<&Version> = versions
            .iter()
            .rev()
            .filter(|v| v.page_id == *page_id)
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching
            .into_iter()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &VersionId) -> StoreResult<Option<Version>> {
        Ok(self.read_versions()?.iter().find(|v| v.id == *id).cloned())
    }
}

#[async_trait]
impl RedirectCollection for InMemoryStore {
    async fn upsert(&self, redirect: &Redirect) -> StoreResult<()> {
        self.write_redirects()?
            .insert(redirect.from.clone(), redirect.clone());
        Ok(())
    }

    async fn find(&self, from: &str) -> StoreResult<Option<Redirect>> {
        Ok(self.read_redirects()?.get(from).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Redirect>> {
        Ok(self.read_redirects()?.values().cloned().collect())
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("page_count", &self.page_count().unwrap_or(0))
            .field("version_count", &self.version_count().unwrap_or(0))
            .finish()
    }
}
