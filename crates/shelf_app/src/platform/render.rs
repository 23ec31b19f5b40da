//! Text rendering of views for the terminal.

use std::fmt::Write;

use shelf_core::{
    Dialog, EntryRow, FailedUpdatesView, GroupByMode, PreferenceGroup, PreferenceKind, SortingMode,
};
use shelf_store::LibrarySnapshot;

const NO_MESSAGE: &str = "(no message)";

pub fn render_view(view: &FailedUpdatesView) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Failed updates: {}  [group: {}, sort: {} {}]",
        view.total,
        group_label(view.group_by_mode),
        sort_label(view.sort_mode),
        if view.descending_order { "desc" } else { "asc" },
    );
    if view.selection_mode {
        let _ = writeln!(out, "Selected: {} of {}", view.selected_count, view.total);
    }
    if view.is_loading {
        out.push_str("Loading...\n");
        return out;
    }
    if view.total == 0 {
        out.push_str("No failed updates.\n");
    }

    for row in &view.rows {
        write_row(&mut out, row, 2, true);
    }

    for group in &view.groups {
        let _ = writeln!(
            out,
            "{} {} {}{}",
            marker(group.expanded),
            group.label,
            group.pill,
            if group.all_selected { " *" } else { "" },
        );
        if let Some(subtitle) = &group.subtitle {
            let _ = writeln!(out, "  {subtitle}");
        }
        if !group.expanded {
            continue;
        }
        for errors in &group.error_groups {
            let _ = writeln!(
                out,
                "    {} {} ({})",
                marker(errors.expanded),
                errors.message.as_deref().unwrap_or(NO_MESSAGE),
                errors.rows.len(),
            );
            if errors.expanded {
                for row in &errors.rows {
                    write_row(&mut out, row, 8, false);
                }
            }
        }
    }

    if let Some(dialog) = &view.dialog {
        out.push('\n');
        out.push_str(&render_dialog(dialog));
    }
    out
}

fn write_row(out: &mut String, row: &EntryRow, indent: usize, with_message: bool) {
    let check = if row.selected { "[x]" } else { "[ ]" };
    let _ = writeln!(
        out,
        "{:indent$}{} {} #{} - {}",
        "",
        check,
        row.title,
        row.manga_id,
        row.source,
    );
    if with_message {
        let _ = writeln!(
            out,
            "{:indent$}    {}",
            "",
            row.error_message.as_deref().unwrap_or(NO_MESSAGE),
        );
    }
}

pub fn render_dialog(dialog: &Dialog) -> String {
    match dialog {
        Dialog::DeleteManga(mangas) => {
            let titles: Vec<&str> = mangas.iter().map(|manga| manga.title.as_str()).collect();
            format!(
                "Delete {} manga? {}\n  confirm [library] [chapters] | cancel\n",
                mangas.len(),
                titles.join(", "),
            )
        }
        Dialog::ShowErrorMessage(message) => format!("Error:\n  {message}\n  cancel to close\n"),
    }
}

pub fn render_settings(groups: &[PreferenceGroup]) -> String {
    let mut out = String::new();
    for group in groups {
        let _ = writeln!(out, "{}", group.title);
        for item in &group.items {
            let value = match &item.kind {
                PreferenceKind::Switch(on) => (if *on { "on" } else { "off" }).to_string(),
                PreferenceKind::Text => String::new(),
                PreferenceKind::List { selected, .. } => selected.clone(),
                PreferenceKind::EditText(text) => text.clone(),
            };
            let _ = write!(out, "  {:<26} {}", item.key, item.title);
            if !value.is_empty() {
                let _ = write!(out, ": {value}");
            }
            if let Some(subtitle) = &item.subtitle {
                let _ = write!(out, " ({subtitle})");
            }
            if !item.enabled {
                out.push_str(" [disabled]");
            }
            out.push('\n');
            if let PreferenceKind::List { entries, .. } = &item.kind {
                let _ = writeln!(out, "  {:<26} choices: {}", "", entries.join(", "));
            }
        }
    }
    out
}

pub fn render_library(library: &LibrarySnapshot) -> String {
    let mut out = String::new();
    out.push_str("Sources\n");
    for source in &library.sources {
        let _ = writeln!(
            out,
            "  {:>6}  {} [{}]{}",
            source.id,
            source.display_name(),
            source.lang,
            if source.supports_downloads { " downloads" } else { "" },
        );
    }
    out.push_str("Categories\n");
    for category in &library.categories {
        let _ = writeln!(out, "  {:>6}  {}", category.id, category.name);
    }
    out.push_str("Manga\n");
    for item in &library.library {
        let _ = writeln!(
            out,
            "  {:>6}  {} (source {}, category {}){}",
            item.manga.id,
            item.manga.title,
            item.manga.source,
            item.category,
            if item.manga.favorite { "" } else { " [not in library]" },
        );
    }
    out
}

fn marker(expanded: bool) -> &'static str {
    if expanded {
        "v"
    } else {
        ">"
    }
}

fn group_label(mode: GroupByMode) -> &'static str {
    match mode {
        GroupByMode::None => "none",
        GroupByMode::ByCategory => "category",
        GroupByMode::BySource => "source",
    }
}

fn sort_label(mode: SortingMode) -> &'static str {
    match mode {
        SortingMode::Alphabetical => "alphabetical",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shelf_core::{ErrorGroupView, GroupView, Manga, Pill};

    fn row(id: i64, title: &str, selected: bool) -> EntryRow {
        EntryRow {
            manga_id: id,
            title: title.into(),
            source: "MangaDex".into(),
            error_message: Some("HTTP error 404".into()),
            selected,
        }
    }

    #[test]
    fn flat_view_lists_rows_with_messages() {
        let view = FailedUpdatesView {
            selection_mode: true,
            selected_count: 1,
            total: 2,
            rows: vec![row(1, "Alpha", true), row(2, "Bravo", false)],
            ..FailedUpdatesView::default()
        };
        assert_eq!(
            render_view(&view),
            "Failed updates: 2  [group: none, sort: alphabetical asc]\n\
             Selected: 1 of 2\n  \
             [x] Alpha #1 - MangaDex\n      \
             HTTP error 404\n  \
             [ ] Bravo #2 - MangaDex\n      \
             HTTP error 404\n"
        );
    }

    #[test]
    fn collapsed_groups_hide_their_rows() {
        let view = FailedUpdatesView {
            group_by_mode: GroupByMode::BySource,
            total: 1,
            groups: vec![
                GroupView {
                    label: "MangaDex".into(),
                    subtitle: Some("en".into()),
                    pill: Pill::ratio(1, 20),
                    expanded: true,
                    all_selected: false,
                    error_groups: vec![ErrorGroupView {
                        message: Some("HTTP error 404".into()),
                        expanded: true,
                        all_selected: false,
                        rows: vec![row(1, "Alpha", false)],
                    }],
                },
                GroupView {
                    label: "Comick".into(),
                    subtitle: Some("Multi".into()),
                    pill: Pill::count(3),
                    expanded: false,
                    all_selected: false,
                    error_groups: Vec::new(),
                },
            ],
            ..FailedUpdatesView::default()
        };
        let text = render_view(&view);
        assert!(text.contains("v MangaDex (1/20)\n  en\n"));
        assert!(text.contains("    v HTTP error 404 (1)\n"));
        assert!(text.contains("        [ ] Alpha #1 - MangaDex\n"));
        assert!(text.contains("> Comick (3)\n  Multi\n"));
    }

    #[test]
    fn loading_view_says_so() {
        let view = FailedUpdatesView {
            is_loading: true,
            ..FailedUpdatesView::default()
        };
        assert!(render_view(&view).ends_with("Loading...\n"));
    }

    #[test]
    fn delete_dialog_names_the_manga() {
        let dialog = Dialog::DeleteManga(vec![Manga {
            id: 1,
            title: "Alpha".into(),
            source: 10,
            favorite: true,
        }]);
        assert!(render_dialog(&dialog).starts_with("Delete 1 manga? Alpha\n"));
    }

    #[test]
    fn settings_show_disabled_items() {
        let groups = shelf_core::AdvancedSettings::default().preference_groups(0, 0);
        let text = render_settings(&groups);
        assert!(text.contains("clear_failed_updates"));
        assert!(text.contains("(0 recorded) [disabled]"));
        assert!(text.contains("Clear chapter cache (Used: 0 B)"));
        assert!(text.contains("choices: Disabled, Cloudflare"));
    }
}
