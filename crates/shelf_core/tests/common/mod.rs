#![allow(dead_code)]

use std::sync::Once;

use shelf_core::{
    update, Category, FailedUpdatesState, FailureRecord, FeedSnapshot, LibraryManga, Manga,
    MangaId, Msg, Source, SourceCount,
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

pub fn library_item(id: MangaId, title: &str, source: i64, category: i64) -> LibraryManga {
    LibraryManga {
        id,
        manga: manga(id, title, source),
        category,
    }
}

pub fn record(manga_id: MangaId, message: &str) -> FailureRecord {
    FailureRecord {
        manga_id,
        error_message: Some(format!("raw: {message}")),
        simplified_error_message: Some(message.to_string()),
    }
}

pub fn source(id: i64, name: &str) -> Source {
    Source {
        id,
        name: name.to_string(),
        lang: "en".to_string(),
        supports_downloads: true,
    }
}

pub fn categories() -> Vec<Category> {
    vec![
        Category::uncategorized(),
        Category {
            id: 1,
            name: "Action".to_string(),
        },
        Category {
            id: 2,
            name: "Romance".to_string(),
        },
    ]
}

/// Five manga A..E in one source, all failing with the same message.
pub fn five_titles() -> FeedSnapshot {
    let titles = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"];
    let library: Vec<_> = titles
        .iter()
        .enumerate()
        .map(|(i, title)| library_item(i as i64 + 1, title, 10, 0))
        .collect();
    FeedSnapshot {
        records: library
            .iter()
            .map(|item| record(item.manga.id, "HTTP error 500"))
            .collect(),
        library,
        categories: categories(),
        sources: vec![source(10, "MangaDex")],
        sources_count: vec![SourceCount {
            source: source(10, "MangaDex"),
            count: 20,
        }],
    }
}

pub fn loaded(feed: FeedSnapshot) -> FailedUpdatesState {
    let (state, _) = update(FailedUpdatesState::new(), Msg::FeedUpdated(feed));
    state
}

pub fn ids_of(state: &FailedUpdatesState) -> Vec<MangaId> {
    state.entries().iter().map(|entry| entry.manga.id).collect()
}

pub fn selected_titles(state: &FailedUpdatesState) -> Vec<String> {
    state
        .selected()
        .into_iter()
        .map(|entry| entry.manga.title.clone())
        .collect()
}

pub fn long_press(state: FailedUpdatesState, manga_id: MangaId) -> FailedUpdatesState {
    update(
        state,
        Msg::ToggleSelection {
            manga_id,
            selected: true,
            user_initiated: true,
            from_long_press: true,
        },
    )
    .0
}

pub fn tap(state: FailedUpdatesState, manga_id: MangaId, selected: bool) -> FailedUpdatesState {
    update(
        state,
        Msg::ToggleSelection {
            manga_id,
            selected,
            user_initiated: true,
            from_long_press: false,
        },
    )
    .0
}

/// Selection flags and the id set must always agree.
pub fn assert_selection_consistent(state: &FailedUpdatesState) {
    let flagged: std::collections::BTreeSet<MangaId> = state
        .entries()
        .iter()
        .filter(|entry| entry.selected)
        .map(|entry| entry.manga.id)
        .collect();
    assert_eq!(&flagged, state.selected_ids());
}
