use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::{
    Dialog, FailedEntry, FailedUpdatesState, GroupByMode, GroupKey, MangaId, SortingMode,
    SourceId,
};

/// Label used for the implicit category.
pub const DEFAULT_CATEGORY_LABEL: &str = "Default";

/// Comparator shared by rows and group labels.
pub fn compare_labels(sort_mode: SortingMode, descending: bool, a: &str, b: &str) -> Ordering {
    let ordering = match sort_mode {
        SortingMode::Alphabetical => a.cmp(b),
    };
    if descending {
        ordering.reverse()
    } else {
        ordering
    }
}

/// Partitions entries into labelled buckets ordered by label.
///
/// Entries keep their relative order inside each bucket. Returns no groups
/// for `GroupByMode::None`.
pub fn build_groups(
    entries: &[FailedEntry],
    group_mode: GroupByMode,
    sort_mode: SortingMode,
    descending: bool,
) -> Vec<(String, Vec<FailedEntry>)> {
    let mut buckets: BTreeMap<String, Vec<FailedEntry>> = BTreeMap::new();
    for entry in entries {
        let label = match group_mode {
            GroupByMode::None => return Vec::new(),
            GroupByMode::ByCategory => category_label(entry),
            GroupByMode::BySource => entry.source.display_name(),
        };
        buckets.entry(label).or_default().push(entry.clone());
    }

    let mut groups: Vec<_> = buckets.into_iter().collect();
    groups.sort_by(|(a, _), (b, _)| compare_labels(sort_mode, descending, a, b));
    groups
}

fn category_label(entry: &FailedEntry) -> String {
    if entry.category.is_system() {
        DEFAULT_CATEGORY_LABEL.to_string()
    } else {
        entry.category.name.clone()
    }
}

/// Small rounded counter shown on group headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pill {
    pub text: String,
}

impl Pill {
    pub fn count(count: usize) -> Self {
        Self {
            text: count.to_string(),
        }
    }

    pub fn ratio(count: usize, total: i64) -> Self {
        Self {
            text: format!("{count}/{total}"),
        }
    }
}

impl fmt::Display for Pill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryRow {
    pub manga_id: MangaId,
    pub title: String,
    pub source: String,
    pub error_message: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorGroupView {
    pub message: Option<String>,
    pub expanded: bool,
    pub all_selected: bool,
    pub rows: Vec<EntryRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub label: String,
    /// Source language under a by-source header.
    pub subtitle: Option<String>,
    pub pill: Pill,
    pub expanded: bool,
    pub all_selected: bool,
    pub error_groups: Vec<ErrorGroupView>,
}

impl GroupView {
    pub fn manga_ids(&self) -> Vec<MangaId> {
        self.error_groups
            .iter()
            .flat_map(|group| group.rows.iter().map(|row| row.manga_id))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FailedUpdatesView {
    pub is_loading: bool,
    pub group_by_mode: GroupByMode,
    pub sort_mode: SortingMode,
    pub descending_order: bool,
    pub selection_mode: bool,
    pub selected_count: usize,
    pub total: usize,
    /// Flat rows; filled only when ungrouped.
    pub rows: Vec<EntryRow>,
    pub groups: Vec<GroupView>,
    #[serde(skip)]
    pub dialog: Option<Dialog>,
}

pub(crate) fn build_view(state: &FailedUpdatesState) -> FailedUpdatesView {
    let group_mode = state.group_by_mode();
    let groups = build_groups(
        state.entries(),
        group_mode,
        state.sort_mode(),
        state.descending_order(),
    );

    let rows = if group_mode == GroupByMode::None {
        state.entries().iter().map(row).collect()
    } else {
        Vec::new()
    };

    FailedUpdatesView {
        is_loading: state.is_loading(),
        group_by_mode: group_mode,
        sort_mode: state.sort_mode(),
        descending_order: state.descending_order(),
        selection_mode: state.selection_mode(),
        selected_count: state.selected_ids().len(),
        total: state.entries().len(),
        rows,
        groups: groups
            .into_iter()
            .map(|(label, entries)| group_view(state, group_mode, label, &entries))
            .collect(),
        dialog: state.dialog().cloned(),
    }
}

/// Every header key the current grouping produces.
pub(crate) fn group_keys(state: &FailedUpdatesState) -> Vec<GroupKey> {
    let groups = build_groups(
        state.entries(),
        state.group_by_mode(),
        state.sort_mode(),
        state.descending_order(),
    );
    let mut keys = Vec::new();
    for (label, entries) in groups {
        for (message, _) in split_by_message(&entries) {
            keys.push(GroupKey::ErrorMessage {
                group: label.clone(),
                message,
            });
        }
        keys.push(GroupKey::Group(label));
    }
    keys
}

fn group_view(
    state: &FailedUpdatesState,
    group_mode: GroupByMode,
    label: String,
    entries: &[FailedEntry],
) -> GroupView {
    let pill = match group_mode {
        GroupByMode::BySource => source_pill(state, entries),
        GroupByMode::ByCategory | GroupByMode::None => Pill::count(entries.len()),
    };

    let error_groups = split_by_message(entries)
        .into_iter()
        .map(|(message, members)| {
            let key = GroupKey::ErrorMessage {
                group: label.clone(),
                message: message.clone(),
            };
            ErrorGroupView {
                expanded: state.is_expanded(&key),
                all_selected: members.iter().all(|entry| entry.selected),
                rows: members.into_iter().map(row).collect(),
                message,
            }
        })
        .collect();

    let subtitle = match group_mode {
        GroupByMode::BySource => entries
            .first()
            .and_then(|entry| language_label(&entry.source.lang)),
        GroupByMode::ByCategory | GroupByMode::None => None,
    };

    GroupView {
        subtitle,
        expanded: state.is_expanded(&GroupKey::Group(label.clone())),
        all_selected: entries.iter().all(|entry| entry.selected),
        label,
        pill,
        error_groups,
    }
}

/// `all` and `other` are pseudo-languages of multi-language sources.
fn language_label(lang: &str) -> Option<String> {
    match lang {
        "" => None,
        "all" => Some("Multi".to_string()),
        "other" => Some("Other".to_string()),
        code => Some(code.to_string()),
    }
}

fn source_pill(state: &FailedUpdatesState, entries: &[FailedEntry]) -> Pill {
    let source_id: Option<SourceId> = entries.first().map(|entry| entry.source.id);
    let total = state
        .sources_count()
        .iter()
        .find(|count| Some(count.source.id) == source_id)
        .map(|count| count.count);
    match total {
        Some(total) => Pill::ratio(entries.len(), total),
        None => Pill::count(entries.len()),
    }
}

/// Splits a bucket by error message, keeping first-occurrence order.
fn split_by_message(entries: &[FailedEntry]) -> Vec<(Option<String>, Vec<&FailedEntry>)> {
    let mut split: Vec<(Option<String>, Vec<&FailedEntry>)> = Vec::new();
    for entry in entries {
        match split
            .iter_mut()
            .find(|(message, _)| *message == entry.error_message)
        {
            Some((_, members)) => members.push(entry),
            None => split.push((entry.error_message.clone(), vec![entry])),
        }
    }
    split
}

fn row(entry: &FailedEntry) -> EntryRow {
    EntryRow {
        manga_id: entry.manga.id,
        title: entry.manga.title.clone(),
        source: entry.source.display_name(),
        error_message: entry.error_message.clone(),
        selected: entry.selected,
    }
}
