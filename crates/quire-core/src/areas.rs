//! Area reads and targeted area writes.

use std::sync::Arc;

use quire_store::PageCollection;
use quire_types::{Area, AreaSlug, Context, Page};
use tracing::info;

use crate::error::{CoreError, CoreResult};
use crate::loader::ItemLoader;
use crate::permissions::{require, Action, PermissionChecker, PermissionTarget};
use crate::versions::{PageRef, VersionManager};

/// Options for [`AreaStore::get_area`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GetAreaOptions {
    /// Run item loaders before returning.
    pub load: bool,
}

impl Default for GetAreaOptions {
    fn default() -> Self {
        Self { load: true }
    }
}

/// Reads and writes single areas addressed as `pageSlug:areaName`.
pub struct AreaStore {
    pages: Arc<dyn PageCollection>,
    permissions: Arc<dyn PermissionChecker>,
    versions: Arc<VersionManager>,
    loader: Arc<ItemLoader>,
}

impl AreaStore {
    pub fn new(
        pages: Arc<dyn PageCollection>,
        permissions: Arc<dyn PermissionChecker>,
        versions: Arc<VersionManager>,
        loader: Arc<ItemLoader>,
    ) -> Self {
        Self {
            pages,
            permissions,
            versions,
            loader,
        }
    }

    /// Fetch one area by exact page slug. No prefix resolution.
    ///
    /// The returned area's `slug` is always the live `pageSlug:areaName`,
    /// whatever was stored.
    pub async fn get_area(&self, context: &Context, slug: &str, options: GetAreaOptions) -> CoreResult<Option<Area>> {
        let target = parse_area_slug(slug)?;
        let Some(mut area) = self.pages.find_area(target.page_slug(), target.area_name()).await? else {
            return Ok(None);
        };
        area.slug = Some(target.to_string());
        if options.load {
            self.loader.load_area(context, &mut area).await;
        }
        Ok(Some(area))
    }

    /// Store `area` under `slug`, touching nothing else on the page.
    ///
    /// A missing page is created with just this area. If another writer
    /// creates the page first, the call fails with [`CoreError::Conflict`]
    /// instead of retrying.
    pub async fn put_area(&self, context: &Context, slug: &str, mut area: Area) -> CoreResult<Area> {
        let target = parse_area_slug(slug)?;
        let page_slug = target.page_slug();
        require(
            self.permissions.as_ref(),
            context,
            Action::EditPage,
            PermissionTarget::Slug(page_slug),
        )
        .await?;

        area.slug = Some(target.to_string());
        let matched = self.pages.set_area(page_slug, target.area_name(), &area).await?;
        if matched > 0 {
            self.versions.version_page(context, PageRef::Slug(page_slug)).await?;
            return Ok(area);
        }

        let page = Page::new(page_slug).with_area(target.area_name(), area.clone());
        match self.pages.insert(&page).await {
            Ok(()) => {}
            Err(err) if err.is_unique_violation() => {
                return Err(CoreError::Conflict {
                    slug: page_slug.to_string(),
                    attempts: 1,
                });
            }
            Err(err) => return Err(err.into()),
        }
        info!(page = %page_slug, area = %target.area_name(), id = %page.id, "created page for area");
        self.versions.version_page(context, PageRef::Page(&page)).await?;
        Ok(area)
    }
}

fn parse_area_slug(slug: &str) -> CoreResult<AreaSlug> {
    AreaSlug::parse(slug).map_err(|_| CoreError::InvalidSlugFormat(slug.to_string()))
}
