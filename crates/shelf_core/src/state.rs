use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::view_model::{self, compare_labels, FailedUpdatesView};
use crate::{
    Category, FailedEntry, FailureRecord, FeedSnapshot, Manga, MangaId, Source, SourceCount,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GroupByMode {
    #[default]
    None,
    ByCategory,
    BySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortingMode {
    #[default]
    Alphabetical,
}

/// Group and sort choices that survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewPreferences {
    pub group_by_mode: GroupByMode,
    pub sort_mode: SortingMode,
    pub descending_order: bool,
}

/// Header identity used for expand/collapse bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Group(String),
    ErrorMessage {
        group: String,
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    DeleteManga(Vec<Manga>),
    ShowErrorMessage(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpdatesState {
    is_loading: bool,
    entries: Vec<FailedEntry>,
    prefs: ViewPreferences,
    selected_ids: BTreeSet<MangaId>,
    /// First and last index touched by the current range gesture.
    anchor: Option<(usize, usize)>,
    expanded: BTreeMap<GroupKey, bool>,
    dialog: Option<Dialog>,
    sources_count: Vec<SourceCount>,
    dirty: bool,
}

impl Default for FailedUpdatesState {
    fn default() -> Self {
        Self::new()
    }
}

impl FailedUpdatesState {
    pub fn new() -> Self {
        Self {
            is_loading: true,
            entries: Vec::new(),
            prefs: ViewPreferences::default(),
            selected_ids: BTreeSet::new(),
            anchor: None,
            expanded: BTreeMap::new(),
            dialog: None,
            sources_count: Vec::new(),
            dirty: false,
        }
    }

    pub fn view(&self) -> FailedUpdatesView {
        view_model::build_view(self)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn entries(&self) -> &[FailedEntry] {
        &self.entries
    }

    pub fn selected(&self) -> Vec<&FailedEntry> {
        self.entries.iter().filter(|entry| entry.selected).collect()
    }

    pub fn selected_ids(&self) -> &BTreeSet<MangaId> {
        &self.selected_ids
    }

    pub fn selection_mode(&self) -> bool {
        !self.selected_ids.is_empty()
    }

    pub fn preferences(&self) -> ViewPreferences {
        self.prefs
    }

    pub fn group_by_mode(&self) -> GroupByMode {
        self.prefs.group_by_mode
    }

    pub fn sort_mode(&self) -> SortingMode {
        self.prefs.sort_mode
    }

    pub fn descending_order(&self) -> bool {
        self.prefs.descending_order
    }

    pub fn anchor(&self) -> Option<(usize, usize)> {
        self.anchor
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn sources_count(&self) -> &[SourceCount] {
        &self.sources_count
    }

    /// Headers start collapsed until the user opens them.
    pub fn is_expanded(&self, key: &GroupKey) -> bool {
        self.expanded.get(key).copied().unwrap_or(false)
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_source(&mut self, feed: FeedSnapshot) {
        let FeedSnapshot {
            records,
            library,
            categories,
            sources,
            sources_count,
        } = feed;

        let records: HashMap<MangaId, FailureRecord> = records
            .into_iter()
            .map(|record| (record.manga_id, record))
            .collect();
        let categories: HashMap<_, Category> = categories
            .into_iter()
            .map(|category| (category.id, category))
            .collect();
        let sources: HashMap<_, Source> = sources
            .into_iter()
            .map(|source| (source.id, source))
            .collect();

        let mut entries: Vec<FailedEntry> = library
            .into_iter()
            .filter_map(|item| {
                let record = records.get(&item.manga.id)?;
                let source = sources
                    .get(&item.manga.source)
                    .cloned()
                    .unwrap_or_else(|| Source::unknown(item.manga.source));
                let category = categories
                    .get(&item.category)
                    .cloned()
                    .unwrap_or_else(Category::uncategorized);
                Some(FailedEntry {
                    library_item_id: item.id,
                    selected: self.selected_ids.contains(&item.manga.id),
                    error_message: record.display_message().map(ToOwned::to_owned),
                    manga: item.manga,
                    source,
                    category,
                })
            })
            .collect();

        self.sort_entries(&mut entries);
        self.selected_ids = entries
            .iter()
            .filter(|entry| entry.selected)
            .map(FailedEntry::manga_id)
            .collect();
        self.entries = entries;
        self.sources_count = sources_count;
        self.anchor = None;
        self.is_loading = false;
    }

    fn sort_entries(&self, entries: &mut [FailedEntry]) {
        let ViewPreferences {
            sort_mode,
            descending_order,
            ..
        } = self.prefs;
        entries.sort_by(|a, b| {
            compare_labels(sort_mode, descending_order, &a.manga.title, &b.manga.title)
        });
    }

    fn index_of(&self, manga_id: MangaId) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.manga.id == manga_id)
    }

    fn set_selected(&mut self, index: usize, selected: bool) {
        let entry = &mut self.entries[index];
        entry.selected = selected;
        if selected {
            self.selected_ids.insert(entry.manga.id);
        } else {
            self.selected_ids.remove(&entry.manga.id);
        }
    }

    /// Returns false when nothing changed.
    pub(crate) fn toggle_selection(
        &mut self,
        manga_id: MangaId,
        selected: bool,
        user_initiated: bool,
        from_long_press: bool,
    ) -> bool {
        let Some(index) = self.index_of(manga_id) else {
            return false;
        };
        if self.entries[index].selected == selected {
            return false;
        }

        let first_selection = self.selected_ids.is_empty();
        self.set_selected(index, selected);

        if selected && user_initiated && from_long_press {
            match self.anchor {
                Some((first, last)) if !first_selection => {
                    // Fill the gap between the anchor and the pressed row.
                    let gap = if index < first {
                        self.anchor = Some((index, last));
                        index + 1..first
                    } else if index > last {
                        self.anchor = Some((first, index));
                        last + 1..index
                    } else {
                        0..0
                    };
                    for between in gap {
                        if !self.entries[between].selected {
                            self.set_selected(between, true);
                        }
                    }
                }
                _ => self.anchor = Some((index, index)),
            }
        } else if user_initiated && !from_long_press {
            if selected {
                self.anchor = Some(match self.anchor {
                    Some((first, last)) => (first.min(index), last.max(index)),
                    None => (index, index),
                });
            } else if let Some((first, last)) = self.anchor {
                if index == first || index == last {
                    self.anchor = self.narrowed_anchor(index, first, last);
                }
            }
        }
        true
    }

    fn narrowed_anchor(&self, index: usize, first: usize, last: usize) -> Option<(usize, usize)> {
        let first_selected = self.entries.iter().position(|entry| entry.selected)?;
        let last_selected = self.entries.iter().rposition(|entry| entry.selected)?;
        let first = if index == first { first_selected } else { first };
        let last = if index == last { last_selected } else { last };
        Some((first.min(last), first.max(last)))
    }

    pub(crate) fn toggle_all(&mut self, selected: bool) {
        for index in 0..self.entries.len() {
            self.set_selected(index, selected);
        }
        self.anchor = None;
    }

    pub(crate) fn invert_selection(&mut self) {
        for index in 0..self.entries.len() {
            let flipped = !self.entries[index].selected;
            self.set_selected(index, flipped);
        }
        self.anchor = None;
    }

    pub(crate) fn select_group(&mut self, manga_ids: &[MangaId]) {
        let group: BTreeSet<MangaId> = manga_ids.iter().copied().collect();
        for index in 0..self.entries.len() {
            if group.contains(&self.entries[index].manga.id) {
                let flipped = !self.entries[index].selected;
                self.set_selected(index, flipped);
            }
        }
        self.anchor = None;
    }

    pub(crate) fn set_group_by(&mut self, mode: GroupByMode) {
        self.prefs.group_by_mode = mode;
    }

    /// Picking the active mode again flips the direction.
    pub(crate) fn sort_by(&mut self, mode: SortingMode) {
        self.prefs.descending_order = if self.prefs.sort_mode == mode {
            !self.prefs.descending_order
        } else {
            false
        };
        self.prefs.sort_mode = mode;
        self.resort();
    }

    pub(crate) fn apply_preferences(&mut self, prefs: ViewPreferences) {
        self.prefs = prefs;
        self.resort();
    }

    fn resort(&mut self) {
        let mut entries = std::mem::take(&mut self.entries);
        self.sort_entries(&mut entries);
        self.entries = entries;
        self.anchor = None;
    }

    /// Removes rows and their selection; returns the ids actually removed.
    pub(crate) fn remove_entries(&mut self, manga_ids: &BTreeSet<MangaId>) -> Vec<MangaId> {
        let mut removed = Vec::new();
        self.entries.retain(|entry| {
            let drop = manga_ids.contains(&entry.manga.id);
            if drop {
                removed.push(entry.manga.id);
            }
            !drop
        });
        for id in &removed {
            self.selected_ids.remove(id);
        }
        self.anchor = None;
        removed
    }

    pub(crate) fn mangas_for(&self, manga_ids: &BTreeSet<MangaId>) -> Vec<Manga> {
        self.entries
            .iter()
            .filter(|entry| manga_ids.contains(&entry.manga.id))
            .map(|entry| entry.manga.clone())
            .collect()
    }

    pub(crate) fn toggle_expanded(&mut self, key: GroupKey) {
        let expanded = self.expanded.entry(key).or_insert(false);
        *expanded = !*expanded;
    }

    pub(crate) fn set_all_expanded(&mut self, keys: Vec<GroupKey>, expanded: bool) {
        for key in keys {
            self.expanded.insert(key, expanded);
        }
    }

    pub(crate) fn set_dialog(&mut self, dialog: Option<Dialog>) {
        self.dialog = dialog;
    }

    pub(crate) fn take_dialog(&mut self) -> Option<Dialog> {
        self.dialog.take()
    }
}
