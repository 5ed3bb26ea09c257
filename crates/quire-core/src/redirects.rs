use std::sync::Arc;

use quire_store::RedirectCollection;
use quire_types::Redirect;

use crate::error::CoreResult;

/// Records slug renames as one-hop redirects. Chains are never collapsed.
pub struct RedirectTracker {
    redirects: Arc<dyn RedirectCollection>,
}

impl RedirectTracker {
    pub fn new(redirects: Arc<dyn RedirectCollection>) -> Self {
        Self { redirects }
    }

    /// Point `original_slug` at `slug`. Returns `None` without writing when
    /// the two are identical.
    pub async fn update_redirect(&self, original_slug: &str, slug: &str) -> CoreResult<Option<Redirect>> {
        if original_slug == slug {
            return Ok(None);
        }
        let redirect = Redirect::new(original_slug, slug);
        self.redirects.upsert(&redirect).await?;
        tracing::info!(from = %original_slug, to = %slug, "redirect recorded");
        Ok(Some(redirect))
    }

    pub async fn lookup(&self, from: &str) -> CoreResult<Option<Redirect>> {
        Ok(self.redirects.find(from).await?)
    }

    pub async fn list(&self) -> CoreResult<Vec<Redirect>> {
        Ok(self.redirects.list().await?)
    }
}
