//! The `Quire` facade: one handle over every core component.

use std::sync::Arc;

use quire_diff::{DiffEngine, DiffListener};
use quire_items::ItemTypeRegistry;
use quire_store::{PageCollection, RedirectCollection, VersionCollection};
use quire_types::{Area, Context, Page, PageId, Redirect, Version, VersionId};

use crate::areas::{AreaStore, GetAreaOptions};
use crate::config::CoreConfig;
use crate::error::CoreResult;
use crate::identity::{ContextUser, IdentityAccessor};
use crate::loader::ItemLoader;
use crate::pages::PageStore;
use crate::permissions::{AllowAll, PermissionChecker};
use crate::redirects::RedirectTracker;
use crate::resolver::Resolution;
use crate::versions::{PageRef, VersionManager};

/// Entry point for embedding Quire.
pub struct Quire {
    config: CoreConfig,
    registry: Arc<ItemTypeRegistry>,
    diff: Arc<DiffEngine>,
    versions: Arc<VersionManager>,
    redirects: Arc<RedirectTracker>,
    areas: AreaStore,
    pages: PageStore,
}

impl Quire {
    /// Start wiring a `Quire` over one backend serving all three collections.
    pub fn builder<S>(store: Arc<S>) -> QuireBuilder
    where
        S: PageCollection + VersionCollection + RedirectCollection + 'static,
    {
        QuireBuilder::new(store.clone(), store.clone(), store)
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ItemTypeRegistry> {
        &self.registry
    }

    pub fn diff_engine(&self) -> &Arc<DiffEngine> {
        &self.diff
    }

    pub fn areas(&self) -> &AreaStore {
        &self.areas
    }

    pub fn pages(&self) -> &PageStore {
        &self.pages
    }

    pub fn versions(&self) -> &VersionManager {
        &self.versions
    }

    pub fn redirects(&self) -> &RedirectTracker {
        &self.redirects
    }

    // ---- Areas ----

    pub async fn get_area(&self, context: &Context, slug: &str, options: GetAreaOptions) -> CoreResult<Option<Area>> {
        self.areas.get_area(context, slug, options).await
    }

    pub async fn put_area(&self, context: &Context, slug: &str, area: Area) -> CoreResult<Area> {
        self.areas.put_area(context, slug, area).await
    }

    // ---- Pages ----

    pub async fn get_page(&self, context: &Context, slug: &str) -> CoreResult<Resolution> {
        self.pages.get_page(context, slug).await
    }

    pub async fn put_page(&self, context: &Context, slug: &str, page: Page) -> CoreResult<Page> {
        self.pages.put_page(context, slug, page).await
    }

    pub async fn roll_back_page(&self, context: &Context, page: Page, version: &Version) -> CoreResult<Page> {
        self.pages.roll_back_page(context, page, version).await
    }

    pub async fn rename_page(&self, context: &Context, old_slug: &str, new_slug: &str) -> CoreResult<Option<Page>> {
        self.pages.rename_page(context, old_slug, new_slug).await
    }

    // ---- Versions ----

    pub async fn version_page(&self, context: &Context, page: PageRef<'_>) -> CoreResult<Option<Version>> {
        self.versions.version_page(context, page).await
    }

    pub async fn history(&self, page_id: &PageId, limit: Option<usize>) -> CoreResult<Vec<Version>> {
        self.versions.history(page_id, limit).await
    }

    pub async fn version(&self, id: &VersionId) -> CoreResult<Option<Version>> {
        self.versions.get(id).await
    }

    // ---- Redirects ----

    pub async fn lookup_redirect(&self, from: &str) -> CoreResult<Option<Redirect>> {
        self.redirects.lookup(from).await
    }
}

impl std::fmt::Debug for Quire {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quire")
            .field("config", &self.config)
            .field("diff", &self.diff)
            .finish()
    }
}

/// Collects collaborators for a [`Quire`]. Anything not supplied falls back
/// to a default: built-in item types, allow-all permissions, the context's
/// user as author, and [`CoreConfig::default`].
pub struct QuireBuilder {
    pages: Arc<dyn PageCollection>,
    versions: Arc<dyn VersionCollection>,
    redirects: Arc<dyn RedirectCollection>,
    registry: Option<ItemTypeRegistry>,
    listeners: Vec<DiffListener>,
    permissions: Option<Arc<dyn PermissionChecker>>,
    identity: Option<Arc<dyn IdentityAccessor>>,
    config: CoreConfig,
}

impl QuireBuilder {
    pub fn new(
        pages: Arc<dyn PageCollection>,
        versions: Arc<dyn VersionCollection>,
        redirects: Arc<dyn RedirectCollection>,
    ) -> Self {
        Self {
            pages,
            versions,
            redirects,
            registry: None,
            listeners: Vec::new(),
            permissions: None,
            identity: None,
            config: CoreConfig::default(),
        }
    }

    pub fn registry(mut self, registry: ItemTypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn diff_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&Page, &mut Vec<String>) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn permissions(mut self, checker: Arc<dyn PermissionChecker>) -> Self {
        self.permissions = Some(checker);
        self
    }

    pub fn identity(mut self, identity: Arc<dyn IdentityAccessor>) -> Self {
        self.identity = Some(identity);
        self
    }

    pub fn config(mut self, config: CoreConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Quire {
        let registry = Arc::new(self.registry.unwrap_or_else(ItemTypeRegistry::with_builtin_types));
        let mut diff = DiffEngine::new(registry.clone());
        for listener in self.listeners {
            diff.add_listener(listener);
        }
        let diff = Arc::new(diff);

        let permissions = self.permissions.unwrap_or_else(|| Arc::new(AllowAll));
        let identity = self.identity.unwrap_or_else(|| Arc::new(ContextUser));
        let loader = Arc::new(ItemLoader::new(registry.clone(), self.config.loader_timeout));
        let versions = Arc::new(VersionManager::new(
            self.pages.clone(),
            self.versions,
            diff.clone(),
            identity,
            self.config.unknown_author.clone(),
        ));
        let redirects = Arc::new(RedirectTracker::new(self.redirects));

        let areas = AreaStore::new(self.pages.clone(), permissions.clone(), versions.clone(), loader.clone());
        let pages = PageStore::new(
            self.pages,
            permissions,
            versions.clone(),
            loader,
            redirects.clone(),
            self.config.max_slug_retries,
        );

        Quire {
            config: self.config,
            registry,
            diff,
            versions,
            redirects,
            areas,
            pages,
        }
    }
}
