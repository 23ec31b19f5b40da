use std::collections::BTreeSet;

use crate::view_model::group_keys;
use crate::{Dialog, Effect, Event, FailedUpdatesState, MangaId, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: FailedUpdatesState, msg: Msg) -> (FailedUpdatesState, Vec<Effect>) {
    let effects = match msg {
        Msg::FeedUpdated(feed) => {
            state.set_source(feed);
            state.mark_dirty();
            Vec::new()
        }
        Msg::SourcesCountFailed => {
            vec![Effect::Notify(Event::FailedFetchingSourcesWithCount)]
        }
        Msg::RestorePreferences(prefs) => {
            state.apply_preferences(prefs);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ToggleSelection {
            manga_id,
            selected,
            user_initiated,
            from_long_press,
        } => {
            if state.toggle_selection(manga_id, selected, user_initiated, from_long_press) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ToggleAll(selected) => {
            state.toggle_all(selected);
            state.mark_dirty();
            Vec::new()
        }
        Msg::InvertSelection => {
            state.invert_selection();
            state.mark_dirty();
            Vec::new()
        }
        Msg::SelectGroup(manga_ids) => {
            state.select_group(&manga_ids);
            state.mark_dirty();
            Vec::new()
        }
        Msg::GroupBy(mode) => {
            state.set_group_by(mode);
            state.mark_dirty();
            vec![Effect::PersistPreferences(state.preferences())]
        }
        Msg::SortBy(mode) => {
            state.sort_by(mode);
            state.mark_dirty();
            vec![Effect::PersistPreferences(state.preferences())]
        }
        Msg::ToggleExpanded(key) => {
            state.toggle_expanded(key);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ExpandAll => set_all_expanded(&mut state, true),
        Msg::ContractAll => set_all_expanded(&mut state, false),
        Msg::Dismiss(manga_ids) => dismiss(&mut state, manga_ids),
        Msg::DismissAll => {
            let all = state.entries().iter().map(|entry| entry.manga.id).collect();
            dismiss(&mut state, all)
        }
        Msg::OpenDeleteDialog => {
            let selected: Vec<_> = state
                .selected()
                .into_iter()
                .map(|entry| entry.manga.clone())
                .collect();
            if selected.is_empty() {
                return (state, Vec::new());
            }
            state.set_dialog(Some(Dialog::DeleteManga(selected)));
            state.mark_dirty();
            Vec::new()
        }
        Msg::OpenErrorMessage(message) => {
            state.set_dialog(Some(Dialog::ShowErrorMessage(message)));
            state.mark_dirty();
            Vec::new()
        }
        Msg::CloseDialog => {
            if state.take_dialog().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DeleteConfirmed {
            delete_from_library,
            delete_chapters,
        } => match state.take_dialog() {
            Some(Dialog::DeleteManga(mangas)) => {
                let ids = mangas.iter().map(|manga| manga.id).collect();
                delete(&mut state, ids, delete_from_library, delete_chapters)
            }
            other => {
                // Confirmation without a pending delete dialog is stale input.
                state.set_dialog(other);
                Vec::new()
            }
        },
        Msg::Delete {
            manga_ids,
            delete_from_library,
            delete_chapters,
        } => delete(&mut state, manga_ids, delete_from_library, delete_chapters),
    };

    (state, effects)
}

fn set_all_expanded(state: &mut FailedUpdatesState, expanded: bool) -> Vec<Effect> {
    let keys = group_keys(state);
    state.set_all_expanded(keys, expanded);
    state.mark_dirty();
    Vec::new()
}

fn dismiss(state: &mut FailedUpdatesState, manga_ids: Vec<MangaId>) -> Vec<Effect> {
    let ids: BTreeSet<MangaId> = manga_ids.into_iter().collect();
    state.toggle_all(false);
    state.remove_entries(&ids);
    state.mark_dirty();
    if ids.is_empty() {
        return Vec::new();
    }
    vec![Effect::RemoveFailureRecords {
        manga_ids: ids.into_iter().collect(),
    }]
}

fn delete(
    state: &mut FailedUpdatesState,
    manga_ids: Vec<MangaId>,
    delete_from_library: bool,
    delete_chapters: bool,
) -> Vec<Effect> {
    let ids: BTreeSet<MangaId> = manga_ids.into_iter().collect();
    let mangas = state.mangas_for(&ids);
    state.toggle_all(false);
    state.mark_dirty();
    if mangas.is_empty() {
        return Vec::new();
    }

    let mut effects = Vec::with_capacity(3);
    if delete_from_library {
        effects.push(Effect::RemoveFromLibrary {
            mangas: mangas.clone(),
        });
    }
    if delete_chapters {
        effects.push(Effect::DeleteChapters {
            mangas: mangas.clone(),
        });
    }
    if delete_from_library {
        let removed = state.remove_entries(&ids);
        effects.push(Effect::RemoveFailureRecords { manga_ids: removed });
    }
    effects
}
