use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shelf_core::MangaId;
use shelf_logging::shelf_debug;

use crate::StoreError;

/// Cached cover images, one file per manga under `covers/` and `custom_covers/`.
#[derive(Debug, Clone)]
pub struct CoverCache {
    root: PathBuf,
}

impl CoverCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn cover_path(&self, manga_id: MangaId) -> PathBuf {
        self.root.join("covers").join(manga_id.to_string())
    }

    pub fn custom_cover_path(&self, manga_id: MangaId) -> PathBuf {
        self.root.join("custom_covers").join(manga_id.to_string())
    }

    /// Removes both cover files. Returns how many existed.
    pub fn remove(&self, manga_id: MangaId) -> Result<usize, StoreError> {
        let mut removed = 0;
        for path in [self.cover_path(manga_id), self.custom_cover_path(manga_id)] {
            if remove_if_present(&path)? {
                removed += 1;
            }
        }
        if removed > 0 {
            shelf_debug!("Dropped {} cover file(s) for manga {}", removed, manga_id);
        }
        Ok(removed)
    }
}

fn remove_if_present(path: &Path) -> Result<bool, StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}
