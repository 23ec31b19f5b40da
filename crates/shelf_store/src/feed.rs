use shelf_core::{FailureRecord, FeedSnapshot, Msg};
use shelf_logging::{shelf_error, shelf_warn};

use crate::{LibraryRepository, StoreError};

/// Joins one emission of the record store with the library metadata.
pub fn load_feed(
    records: Vec<FailureRecord>,
    library: &dyn LibraryRepository,
) -> Result<FeedSnapshot, StoreError> {
    let mut feed = feed_without_counts(records, library)?;
    feed.sources_count = library.sources_with_favorite_count()?;
    Ok(feed)
}

/// Messages for the engine after a record emission.
///
/// A failing source count still delivers the rows, followed by
/// `Msg::SourcesCountFailed`. Any other read failure delivers nothing.
pub fn feed_messages(records: Vec<FailureRecord>, library: &dyn LibraryRepository) -> Vec<Msg> {
    let mut feed = match feed_without_counts(records, library) {
        Ok(feed) => feed,
        Err(err) => {
            shelf_error!("Failed to read library for failed updates: {}", err);
            return Vec::new();
        }
    };

    match library.sources_with_favorite_count() {
        Ok(counts) => {
            feed.sources_count = counts;
            vec![Msg::FeedUpdated(feed)]
        }
        Err(err) => {
            shelf_warn!("Failed to count favorites per source: {}", err);
            vec![Msg::FeedUpdated(feed), Msg::SourcesCountFailed]
        }
    }
}

fn feed_without_counts(
    records: Vec<FailureRecord>,
    library: &dyn LibraryRepository,
) -> Result<FeedSnapshot, StoreError> {
    Ok(FeedSnapshot {
        records,
        library: library.library_manga()?,
        categories: library.categories()?,
        sources: library.sources()?,
        sources_count: Vec::new(),
    })
}
