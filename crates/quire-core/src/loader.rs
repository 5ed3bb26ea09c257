//! Concurrent item loading at fetch time.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use quire_items::{ItemType, ItemTypeRegistry};
use quire_types::{Area, Context, Item, Page};
use tracing::{debug, warn};

/// Set to `true` on an item whose loader did not finish in time.
pub const LOAD_TIMED_OUT_FIELD: &str = "loadTimedOut";

/// Runs item loaders across all areas of a page, and across all items of an
/// area, concurrently. Loading never fails the fetch.
pub struct ItemLoader {
    registry: Arc<ItemTypeRegistry>,
    timeout: Option<Duration>,
}

impl ItemLoader {
    pub fn new(registry: Arc<ItemTypeRegistry>, timeout: Option<Duration>) -> Self {
        Self { registry, timeout }
    }

    pub async fn load_page(&self, context: &Context, page: &mut Page) {
        join_all(page.areas.values_mut().map(|area| self.load_area(context, area))).await;
    }

    pub async fn load_area(&self, context: &Context, area: &mut Area) {
        let slug = area.slug.clone();
        let pending: Vec<_> = area
            .items
            .iter_mut()
            .filter_map(|item| {
                let item_type = self.registry.loader_for(item)?.clone();
                Some(self.load_item(context, item_type, item))
            })
            .collect();
        if pending.is_empty() {
            return;
        }
        debug!(area = ?slug, loaders = pending.len(), "running item loaders");
        join_all(pending).await;
    }

    async fn load_item(&self, context: &Context, item_type: Arc<dyn ItemType>, item: &mut Item) {
        match self.timeout {
            Some(limit) => {
                if tokio::time::timeout(limit, item_type.load(context, item)).await.is_err() {
                    warn!(item_type = %item_type.name(), timeout_secs = limit.as_secs_f64(), "item loader timed out");
                    item.set(LOAD_TIMED_OUT_FIELD, true);
                }
            }
            None => item_type.load(context, item).await,
        }
    }
}
