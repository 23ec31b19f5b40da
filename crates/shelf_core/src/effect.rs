use crate::{Manga, MangaId, ViewPreferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PersistPreferences(ViewPreferences),
    RemoveFailureRecords { manga_ids: Vec<MangaId> },
    /// Unfavorite in one batch and drop cached covers.
    RemoveFromLibrary { mangas: Vec<Manga> },
    DeleteChapters { mangas: Vec<Manga> },
    Notify(Event),
}

/// One-shot notifications for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    FailedFetchingSourcesWithCount,
}
