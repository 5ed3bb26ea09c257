//! Whole-page writes, resolution, rollback and rename.

use std::sync::Arc;

use quire_store::{PageCollection, StoreError, UniqueField};
use quire_types::{is_tree_slug, Context, Page, Version};
use rand::Rng;
use serde_json::Value;
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::loader::ItemLoader;
use crate::permissions::{require, Action, PermissionChecker, PermissionTarget};
use crate::redirects::RedirectTracker;
use crate::resolver::{Resolution, SlugResolver};
use crate::versions::{PageRef, VersionManager};

pub struct PageStore {
    pages: Arc<dyn PageCollection>,
    permissions: Arc<dyn PermissionChecker>,
    versions: Arc<VersionManager>,
    loader: Arc<ItemLoader>,
    resolver: SlugResolver,
    redirects: Arc<RedirectTracker>,
    max_slug_retries: u32,
}

impl PageStore {
    pub fn new(
        pages: Arc<dyn PageCollection>,
        permissions: Arc<dyn PermissionChecker>,
        versions: Arc<VersionManager>,
        loader: Arc<ItemLoader>,
        redirects: Arc<RedirectTracker>,
        max_slug_retries: u32,
    ) -> Self {
        Self {
            resolver: SlugResolver::new(pages.clone()),
            pages,
            permissions,
            versions,
            loader,
            redirects,
            max_slug_retries: max_slug_retries.max(1),
        }
    }

    /// Write a whole page, keyed by its current stored slug `slug`.
    ///
    /// An empty `page.slug` defaults to `slug`; a different one renames the
    /// page. When the slug or path is taken, one random digit is appended to
    /// both and the write is retried, up to the configured attempt count.
    /// Returns the page as stored, including any appended digits.
    pub async fn put_page(&self, context: &Context, slug: &str, mut page: Page) -> CoreResult<Page> {
        if page.slug.is_empty() {
            page.slug = slug.to_string();
        }
        let requested = page.slug.clone();
        let mut key = slug.to_string();

        for attempt in 1..=self.max_slug_retries {
            require(
                self.permissions.as_ref(),
                context,
                Action::EditPage,
                PermissionTarget::Page(&page),
            )
            .await?;

            match self.pages.upsert_by_slug(&key, &page).await {
                Ok(()) => {
                    self.versions.version_page(context, PageRef::Page(&page)).await?;
                    return Ok(page);
                }
                Err(err) if is_slug_conflict(&err) => {
                    if attempt == self.max_slug_retries {
                        break;
                    }
                    let digit: u8 = rand::thread_rng().gen_range(0..10);
                    warn!(slug = %page.slug, attempt, %digit, reason = %err, "slug taken, retrying with suffix");
                    page.slug.push(char::from(b'0' + digit));
                    // Pages outside the tree have no path to disambiguate.
                    if let Some(path) = page.path.as_mut() {
                        path.push(char::from(b'0' + digit));
                    }
                    key = page.slug.clone();
                }
                Err(err) => return Err(err.into()),
            }
        }

        warn!(slug = %requested, attempts = self.max_slug_retries, "giving up on slug conflict");
        Err(CoreError::Conflict {
            slug: requested,
            attempts: self.max_slug_retries,
        })
    }

    /// Resolve `slug` against non-trashed pages and run item loaders over
    /// the best match.
    pub async fn get_page(&self, context: &Context, slug: &str) -> CoreResult<Resolution> {
        let mut resolution = self.resolver.resolve(slug).await?;
        if let Some(best) = resolution.best.as_mut() {
            self.loader.load_page(context, best).await;
        }
        Ok(resolution)
    }

    /// Restore `page`'s content from `version` and store the result as a new
    /// version.
    ///
    /// The page keeps its id and slug. Tree pages also keep their path and
    /// rank, so the tree structure is never rolled back.
    pub async fn roll_back_page(&self, context: &Context, page: Page, version: &Version) -> CoreResult<Page> {
        let id = page.id;
        let slug = page.slug.clone();
        let path = page.path.clone();
        let rank = page.rank;

        let mut merged = serde_json::to_value(&page).map_err(StoreError::from)?;
        let snapshot = serde_json::to_value(&version.page).map_err(StoreError::from)?;
        deep_merge(&mut merged, snapshot);
        let mut restored: Page = serde_json::from_value(merged).map_err(StoreError::from)?;

        restored.id = id;
        restored.slug = slug.clone();
        if is_tree_slug(&slug) {
            restored.path = path;
            restored.rank = rank;
        }
        self.put_page(context, &slug, restored).await
    }

    /// Move the page at `old_slug` to `new_slug` and leave a redirect behind.
    ///
    /// The redirect points at the slug actually stored, which may carry
    /// digits added to avoid a collision. Returns `None` if no page lives at
    /// `old_slug`.
    pub async fn rename_page(&self, context: &Context, old_slug: &str, new_slug: &str) -> CoreResult<Option<Page>> {
        let Some(mut page) = self.pages.find_by_slug(old_slug).await? else {
            return Ok(None);
        };
        page.slug = new_slug.to_string();
        let stored = self.put_page(context, old_slug, page).await?;
        self.redirects.update_redirect(old_slug, &stored.slug).await?;
        Ok(Some(stored))
    }
}

fn is_slug_conflict(err: &StoreError) -> bool {
    matches!(
        err,
        StoreError::UniqueViolation {
            field: UniqueField::Slug | UniqueField::Path,
            ..
        }
    )
}

/// Merge `source` into `target`. Objects merge key by key, recursively;
/// anything else in `source` replaces what is in `target`.
fn deep_merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_objects_recursively() {
        let mut target = json!({"a": {"x": 1, "y": 2}, "keep": true});
        deep_merge(&mut target, json!({"a": {"y": 3, "z": 4}}));
        assert_eq!(target, json!({"a": {"x": 1, "y": 3, "z": 4}, "keep": true}));
    }

    #[test]
    fn deep_merge_replaces_arrays_and_scalars() {
        let mut target = json!({"items": [1, 2, 3], "title": "new"});
        deep_merge(&mut target, json!({"items": [9], "title": "old"}));
        assert_eq!(target, json!({"items": [9], "title": "old"}));
    }

    #[test]
    fn only_slug_and_path_collisions_retry() {
        let slug = StoreError::UniqueViolation {
            field: UniqueField::Slug,
            value: "/a".into(),
        };
        let id = StoreError::UniqueViolation {
            field: UniqueField::Id,
            value: "x".into(),
        };
        assert!(is_slug_conflict(&slug));
        assert!(!is_slug_conflict(&id));
        assert!(!is_slug_conflict(&StoreError::LockPoisoned));
    }
}
