//! Shelf core: pure failed-updates state machine and view-model helpers.
mod classify;
mod effect;
mod model;
mod msg;
mod settings;
mod state;
mod update;
mod view_model;

pub use classify::{classify, Connectivity, StaticConnectivity, SystemErrorKind, UpdateFailure};
pub use effect::{Effect, Event};
pub use model::{
    Category, CategoryId, FailedEntry, FailureRecord, FeedSnapshot, LibraryManga, Manga, MangaId,
    Source, SourceCount, SourceId,
};
pub use msg::Msg;
pub use settings::{
    AdvancedSettings, ApplyOutcome, DohProvider, PreferenceGroup, PreferenceItem, PreferenceKind,
    readable_size, validate_user_agent, SettingsError, DEFAULT_USER_AGENT,
};
pub use state::{
    Dialog, FailedUpdatesState, GroupByMode, GroupKey, SortingMode, ViewPreferences,
};
pub use update::update;
pub use view_model::{
    build_groups, compare_labels, EntryRow, ErrorGroupView, FailedUpdatesView, GroupView, Pill,
    DEFAULT_CATEGORY_LABEL,
};
