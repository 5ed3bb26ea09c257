use std::fs;
use std::path::Path;

use quire_types::{Page, Redirect, Version};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreResult;

/// Serializable image of every collection, used to persist an
/// [`InMemoryStore`](crate::InMemoryStore) between CLI runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default)]
    pub redirects: Vec<Redirect>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file. A missing file is an empty snapshot.
    pub fn load(path: &Path) -> StoreResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no snapshot file, starting empty");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Write the snapshot as pretty JSON, replacing the file atomically.
    pub fn save(&self, path: &Path) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), pages = self.pages.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryStore;
    use crate::traits::{PageCollection, RedirectCollection};
    use quire_types::{Area, Item};

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = Snapshot::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(snapshot, Snapshot::default());
    }

    #[tokio::test]
    async fn store_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");

        let store = InMemoryStore::new();
        let page = Page::new("/about")
            .with_field("title", "About")
            .with_area("main", Area::new(vec![Item::new("video").with("url", "u")]));
        PageCollection::insert(&store, &page).await.unwrap();
        store.upsert(&Redirect::new("/old", "/about")).await.unwrap();
        store.to_snapshot().unwrap().save(&path).unwrap();

        let reloaded = InMemoryStore::from_snapshot(Snapshot::load(&path).unwrap()).unwrap();
        let found = reloaded.find_by_slug("/about").await.unwrap().unwrap();
        assert_eq!(found, page);
        assert_eq!(reloaded.find("/old").await.unwrap().unwrap().to, "/about");
    }

    #[test]
    fn snapshot_with_duplicate_slugs_is_rejected() {
        let snapshot = Snapshot {
            pages: vec![Page::new("/dup"), Page::new("/dup")],
            ..Default::default()
        };
        let err = InMemoryStore::from_snapshot(snapshot).unwrap_err();
        assert!(err.is_unique_violation());
    }
}
