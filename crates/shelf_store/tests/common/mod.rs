#![allow(dead_code)]

use std::sync::{Arc, Once};

use shelf_core::{Category, LibraryManga, Manga, MangaId, Source};
use shelf_store::{
    ChapterStorage, CoverCache, LibrarySnapshot, MemoryLibrary, SqliteFailedUpdates, WorkerDeps,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(shelf_logging::initialize_for_tests);
}

pub fn manga(id: MangaId, title: &str, source: i64) -> Manga {
    Manga {
        id,
        title: title.to_string(),
        source,
        favorite: true,
    }
}

pub fn source(id: i64, name: &str, supports_downloads: bool) -> Source {
    Source {
        id,
        name: name.to_string(),
        lang: "en".to_string(),
        supports_downloads,
    }
}

/// Three favorites on a downloadable source, one on a local source.
pub fn sample_library() -> LibrarySnapshot {
    let item = |id, title, source, category| LibraryManga {
        id,
        manga: manga(id, title, source),
        category,
    };
    LibrarySnapshot {
        categories: vec![
            Category::uncategorized(),
            Category {
                id: 1,
                name: "Action".into(),
            },
        ],
        sources: vec![source(10, "MangaDex", true), source(0, "Local source", false)],
        library: vec![
            item(1, "Berserk", 10, 1),
            item(2, "Vagabond", 10, 0),
            item(3, "Blame!", 10, 1),
            item(4, "Homebrew", 0, 0),
        ],
    }
}

pub struct Fixture {
    pub temp: tempfile::TempDir,
    pub records: Arc<SqliteFailedUpdates>,
    pub library: Arc<MemoryLibrary>,
    pub covers: CoverCache,
    pub chapters: ChapterStorage,
}

impl Fixture {
    pub fn new() -> Self {
        init_logging();
        let temp = tempfile::TempDir::new().unwrap();
        Self {
            records: Arc::new(SqliteFailedUpdates::open(&temp.path().join("shelf.db")).unwrap()),
            library: Arc::new(MemoryLibrary::new(sample_library())),
            covers: CoverCache::new(temp.path().join("cache")),
            chapters: ChapterStorage::new(temp.path().join("downloads")),
            temp,
        }
    }

    pub fn deps(&self) -> WorkerDeps {
        WorkerDeps {
            records: self.records.clone(),
            library: self.library.clone(),
            covers: self.covers.clone(),
            chapters: self.chapters.clone(),
        }
    }
}
