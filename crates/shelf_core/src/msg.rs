use crate::{FeedSnapshot, GroupByMode, GroupKey, MangaId, SortingMode, ViewPreferences};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Upstream records or library metadata changed; rebuild the rows.
    FeedUpdated(FeedSnapshot),
    /// The sources-with-favorite-count feed could not be read.
    SourcesCountFailed,
    /// Restore group/sort choices persisted by a previous run.
    RestorePreferences(ViewPreferences),
    /// User tapped or long-pressed a row.
    ToggleSelection {
        manga_id: MangaId,
        selected: bool,
        user_initiated: bool,
        from_long_press: bool,
    },
    /// Select all / clear selection.
    ToggleAll(bool),
    InvertSelection,
    /// User long-pressed a group header; flips every listed row.
    SelectGroup(Vec<MangaId>),
    GroupBy(GroupByMode),
    SortBy(SortingMode),
    /// User clicked a group or error-message header.
    ToggleExpanded(GroupKey),
    ExpandAll,
    ContractAll,
    /// Drop rows from the inbox without touching the library.
    Dismiss(Vec<MangaId>),
    DismissAll,
    /// Ask for confirmation before deleting the current selection.
    OpenDeleteDialog,
    OpenErrorMessage(String),
    CloseDialog,
    /// User confirmed the delete dialog.
    DeleteConfirmed {
        delete_from_library: bool,
        delete_chapters: bool,
    },
    /// Delete the given manga without going through the dialog.
    Delete {
        manga_ids: Vec<MangaId>,
        delete_from_library: bool,
        delete_chapters: bool,
    },
}
