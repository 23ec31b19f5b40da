mod common;

use pretty_assertions::assert_eq;
use shelf_core::{FailureRecord, Msg};
use shelf_store::{
    feed_messages, load_feed, LibraryRepository, LibrarySnapshot, MemoryLibrary, StoreError,
};

use common::{init_logging, sample_library};

fn record(manga_id: i64) -> FailureRecord {
    FailureRecord {
        manga_id,
        error_message: Some("boom".into()),
        simplified_error_message: None,
    }
}

#[test]
fn library_lists_favorites_only() {
    init_logging();
    let library = MemoryLibrary::new(sample_library());
    assert_eq!(library.unfavorite_all(&[2, 99]).unwrap(), 1);

    let ids: Vec<_> = library
        .library_manga()
        .unwrap()
        .iter()
        .map(|item| item.manga.id)
        .collect();
    assert_eq!(ids, vec![1, 3, 4]);

    let snapshot = library.snapshot().unwrap();
    assert_eq!(snapshot.library.len(), 4);
    assert!(!snapshot.library[1].manga.favorite);
}

#[test]
fn unfavorite_is_idempotent() {
    let library = MemoryLibrary::new(sample_library());
    assert_eq!(library.unfavorite_all(&[1, 3]).unwrap(), 2);
    assert_eq!(library.unfavorite_all(&[1, 3]).unwrap(), 0);
}

#[test]
fn favorite_counts_cover_sources_with_favorites() {
    let library = MemoryLibrary::new(sample_library());
    library.unfavorite_all(&[4]).unwrap();

    let counts: Vec<_> = library
        .sources_with_favorite_count()
        .unwrap()
        .into_iter()
        .map(|count| (count.source.name, count.count))
        .collect();
    assert_eq!(counts, vec![("MangaDex".to_string(), 3)]);
}

#[test]
fn source_lookup_by_id() {
    let library = MemoryLibrary::new(sample_library());
    assert_eq!(library.source(10).unwrap().map(|s| s.name), Some("MangaDex".into()));
    assert_eq!(library.source(77).unwrap(), None);
}

#[test]
fn load_feed_joins_records_with_library() {
    let library = MemoryLibrary::new(sample_library());
    let feed = load_feed(vec![record(1), record(3)], &library).unwrap();

    assert_eq!(feed.records.len(), 2);
    assert_eq!(feed.library.len(), 4);
    assert_eq!(feed.categories.len(), 2);
    assert_eq!(feed.sources_count.len(), 2);
}

struct BrokenCounts(MemoryLibrary);

impl LibraryRepository for BrokenCounts {
    fn library_manga(&self) -> Result<Vec<shelf_core::LibraryManga>, StoreError> {
        self.0.library_manga()
    }
    fn categories(&self) -> Result<Vec<shelf_core::Category>, StoreError> {
        self.0.categories()
    }
    fn sources(&self) -> Result<Vec<shelf_core::Source>, StoreError> {
        self.0.sources()
    }
    fn source(&self, id: i64) -> Result<Option<shelf_core::Source>, StoreError> {
        self.0.source(id)
    }
    fn sources_with_favorite_count(&self) -> Result<Vec<shelf_core::SourceCount>, StoreError> {
        Err(StoreError::Poisoned)
    }
    fn unfavorite_all(&self, manga_ids: &[i64]) -> Result<usize, StoreError> {
        self.0.unfavorite_all(manga_ids)
    }
}

#[test]
fn failing_source_counts_still_deliver_rows() {
    init_logging();
    let library = BrokenCounts(MemoryLibrary::new(sample_library()));
    let messages = feed_messages(vec![record(2)], &library);

    assert_eq!(messages.len(), 2);
    match &messages[0] {
        Msg::FeedUpdated(feed) => {
            assert_eq!(feed.records, vec![record(2)]);
            assert!(feed.sources_count.is_empty());
        }
        other => panic!("unexpected message {other:?}"),
    }
    assert_eq!(messages[1], Msg::SourcesCountFailed);
}

#[test]
fn healthy_library_yields_a_single_feed_message() {
    let library = MemoryLibrary::new(sample_library());
    let messages = feed_messages(vec![record(1)], &library);
    assert!(matches!(messages.as_slice(), [Msg::FeedUpdated(feed)] if feed.sources_count.len() == 2));
}

#[test]
fn library_snapshot_defaults_missing_sections() {
    let snapshot: LibrarySnapshot = ron::from_str("(categories: [])").unwrap();
    assert_eq!(snapshot, LibrarySnapshot::default());
}
