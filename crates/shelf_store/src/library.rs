use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use shelf_core::{Category, LibraryManga, MangaId, Source, SourceCount, SourceId};
use shelf_logging::shelf_debug;

use crate::StoreError;

/// Read side of the user's library plus the one mutation the inbox needs.
pub trait LibraryRepository: Send + Sync {
    /// Favorited manga only.
    fn library_manga(&self) -> Result<Vec<LibraryManga>, StoreError>;
    fn categories(&self) -> Result<Vec<Category>, StoreError>;
    fn sources(&self) -> Result<Vec<Source>, StoreError>;
    fn source(&self, id: SourceId) -> Result<Option<Source>, StoreError>;
    /// Installed sources with how many favorites each holds.
    fn sources_with_favorite_count(&self) -> Result<Vec<SourceCount>, StoreError>;
    /// Clears the favorite flag on every listed manga in one batch.
    fn unfavorite_all(&self, manga_ids: &[MangaId]) -> Result<usize, StoreError>;
}

/// On-disk shape of `library.ron`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySnapshot {
    pub categories: Vec<Category>,
    pub sources: Vec<Source>,
    pub library: Vec<LibraryManga>,
}

#[derive(Debug, Default)]
pub struct MemoryLibrary {
    inner: Mutex<LibrarySnapshot>,
}

impl MemoryLibrary {
    pub fn new(snapshot: LibrarySnapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }

    /// Current contents, including unfavorited manga.
    pub fn snapshot(&self) -> Result<LibrarySnapshot, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, LibrarySnapshot>, StoreError> {
        self.inner.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl LibraryRepository for MemoryLibrary {
    fn library_manga(&self) -> Result<Vec<LibraryManga>, StoreError> {
        Ok(self
            .lock()?
            .library
            .iter()
            .filter(|item| item.manga.favorite)
            .cloned()
            .collect())
    }

    fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.lock()?.categories.clone())
    }

    fn sources(&self) -> Result<Vec<Source>, StoreError> {
        Ok(self.lock()?.sources.clone())
    }

    fn source(&self, id: SourceId) -> Result<Option<Source>, StoreError> {
        Ok(self
            .lock()?
            .sources
            .iter()
            .find(|source| source.id == id)
            .cloned())
    }

    fn sources_with_favorite_count(&self) -> Result<Vec<SourceCount>, StoreError> {
        let snapshot = self.lock()?;
        let mut counts: BTreeMap<SourceId, i64> = BTreeMap::new();
        for item in snapshot.library.iter().filter(|item| item.manga.favorite) {
            *counts.entry(item.manga.source).or_default() += 1;
        }
        Ok(snapshot
            .sources
            .iter()
            .filter_map(|source| {
                counts.get(&source.id).map(|count| SourceCount {
                    source: source.clone(),
                    count: *count,
                })
            })
            .collect())
    }

    fn unfavorite_all(&self, manga_ids: &[MangaId]) -> Result<usize, StoreError> {
        let wanted: BTreeSet<MangaId> = manga_ids.iter().copied().collect();
        let mut snapshot = self.lock()?;
        let mut changed = 0;
        for item in snapshot.library.iter_mut() {
            if item.manga.favorite && wanted.contains(&item.manga.id) {
                item.manga.favorite = false;
                changed += 1;
            }
        }
        shelf_debug!("Unfavorited {} manga", changed);
        Ok(changed)
    }
}
