//! Line-oriented commands for `mangashelf watch`.

use shelf_core::{FailedUpdatesState, GroupByMode, GroupKey, MangaId, Msg, SortingMode};

pub const HELP: &str = "\
commands:
  tap <id>                 toggle one entry
  long <id>                long press: extend the range selection
  all | none | invert      select all, clear, invert
  select-group <label>     flip every entry of a group
  group none|category|source
  sort                     sort alphabetically; again to reverse
  expand <label>[ / <message>]
  expand-all | collapse-all
  dismiss [<id>...]        dismiss the given ids, or the selection
  dismiss-all
  delete                   ask before deleting the selection
  confirm [library] [chapters]
  cancel
  error <id>               show the full error of an entry
  refresh | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Send(Msg),
    Tap { manga_id: MangaId, long_press: bool },
    SelectGroup(String),
    DismissSelection,
    ShowError(MangaId),
    Refresh,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<Action, String> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let action = match command {
        "tap" | "long" => Action::Tap {
            manga_id: parse_id(rest)?,
            long_press: command == "long",
        },
        "all" => Action::Send(Msg::ToggleAll(true)),
        "none" => Action::Send(Msg::ToggleAll(false)),
        "invert" => Action::Send(Msg::InvertSelection),
        "select-group" => Action::SelectGroup(required(rest, "a group label")?.to_string()),
        "group" => Action::Send(Msg::GroupBy(parse_group(rest)?)),
        "sort" => Action::Send(Msg::SortBy(SortingMode::Alphabetical)),
        "expand" => Action::Send(Msg::ToggleExpanded(parse_key(rest)?)),
        "expand-all" => Action::Send(Msg::ExpandAll),
        "collapse-all" => Action::Send(Msg::ContractAll),
        "dismiss" if rest.is_empty() => Action::DismissSelection,
        "dismiss" => Action::Send(Msg::Dismiss(parse_ids(rest)?)),
        "dismiss-all" => Action::Send(Msg::DismissAll),
        "delete" => Action::Send(Msg::OpenDeleteDialog),
        "confirm" => {
            let mut delete_from_library = false;
            let mut delete_chapters = false;
            for word in rest.split_whitespace() {
                match word {
                    "library" => delete_from_library = true,
                    "chapters" => delete_chapters = true,
                    other => return Err(format!("unknown confirm option `{other}`")),
                }
            }
            Action::Send(Msg::DeleteConfirmed {
                delete_from_library,
                delete_chapters,
            })
        }
        "cancel" => Action::Send(Msg::CloseDialog),
        "error" => Action::ShowError(parse_id(rest)?),
        "refresh" | "" => Action::Refresh,
        "help" | "?" => Action::Help,
        "quit" | "exit" => Action::Quit,
        other => return Err(format!("unknown command `{other}`; try `help`")),
    };
    Ok(action)
}

/// Resolves actions that depend on the current state into a message.
pub fn to_msg(action: Action, state: &FailedUpdatesState) -> Result<Option<Msg>, String> {
    let msg = match action {
        Action::Send(msg) => msg,
        Action::Tap {
            manga_id,
            long_press,
        } => {
            if !state.entries().iter().any(|entry| entry.manga_id() == manga_id) {
                return Err(format!("no entry with id {manga_id}"));
            }
            Msg::ToggleSelection {
                manga_id,
                selected: !state.selected_ids().contains(&manga_id),
                user_initiated: true,
                from_long_press: long_press,
            }
        }
        Action::SelectGroup(label) => {
            let view = state.view();
            let group = view
                .groups
                .iter()
                .find(|group| group.label == label)
                .ok_or_else(|| format!("no group labelled `{label}`"))?;
            Msg::SelectGroup(group.manga_ids())
        }
        Action::DismissSelection => {
            if state.selected_ids().is_empty() {
                return Err("nothing selected".to_string());
            }
            Msg::Dismiss(state.selected_ids().iter().copied().collect())
        }
        Action::ShowError(manga_id) => {
            let entry = state
                .entries()
                .iter()
                .find(|entry| entry.manga_id() == manga_id)
                .ok_or_else(|| format!("no entry with id {manga_id}"))?;
            Msg::OpenErrorMessage(
                entry
                    .error_message
                    .clone()
                    .unwrap_or_else(|| "No error message recorded".to_string()),
            )
        }
        Action::Refresh | Action::Help | Action::Quit => return Ok(None),
    };
    Ok(Some(msg))
}

fn required<'a>(rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("expected {what}"))
    } else {
        Ok(rest)
    }
}

fn parse_id(rest: &str) -> Result<MangaId, String> {
    let rest = required(rest, "a manga id")?;
    rest.parse()
        .map_err(|_| format!("`{rest}` is not a manga id"))
}

fn parse_ids(rest: &str) -> Result<Vec<MangaId>, String> {
    rest.split_whitespace().map(parse_id).collect()
}

fn parse_group(rest: &str) -> Result<GroupByMode, String> {
    match rest {
        "none" => Ok(GroupByMode::None),
        "category" => Ok(GroupByMode::ByCategory),
        "source" => Ok(GroupByMode::BySource),
        other => Err(format!("unknown grouping `{other}`")),
    }
}

fn parse_key(rest: &str) -> Result<GroupKey, String> {
    let rest = required(rest, "a group label")?;
    Ok(match rest.split_once(" / ") {
        Some((group, message)) => GroupKey::ErrorMessage {
            group: group.trim().to_string(),
            message: Some(message.trim().to_string()),
        },
        None => GroupKey::Group(rest.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_messages() {
        assert_eq!(parse_line("invert"), Ok(Action::Send(Msg::InvertSelection)));
        assert_eq!(
            parse_line("group category"),
            Ok(Action::Send(Msg::GroupBy(GroupByMode::ByCategory)))
        );
        assert_eq!(parse_line("dismiss 3 4"), Ok(Action::Send(Msg::Dismiss(vec![3, 4]))));
        assert_eq!(parse_line("dismiss"), Ok(Action::DismissSelection));
    }

    #[test]
    fn parses_taps() {
        assert_eq!(
            parse_line("long 7"),
            Ok(Action::Tap {
                manga_id: 7,
                long_press: true
            })
        );
        assert!(parse_line("tap seven").is_err());
        assert!(parse_line("tap").is_err());
    }

    #[test]
    fn parses_confirm_options() {
        assert_eq!(
            parse_line("confirm chapters"),
            Ok(Action::Send(Msg::DeleteConfirmed {
                delete_from_library: false,
                delete_chapters: true,
            }))
        );
        assert!(parse_line("confirm everything").is_err());
    }

    #[test]
    fn parses_header_keys() {
        assert_eq!(
            parse_line("expand Action / HTTP error 404"),
            Ok(Action::Send(Msg::ToggleExpanded(GroupKey::ErrorMessage {
                group: "Action".into(),
                message: Some("HTTP error 404".into()),
            })))
        );
        assert_eq!(
            parse_line("expand Local source"),
            Ok(Action::Send(Msg::ToggleExpanded(GroupKey::Group(
                "Local source".into()
            ))))
        );
    }

    #[test]
    fn unknown_commands_are_rejected() {
        assert!(parse_line("frobnicate").is_err());
        assert_eq!(parse_line("   "), Ok(Action::Refresh));
    }

    #[test]
    fn taps_on_an_empty_inbox_are_rejected() {
        let state = FailedUpdatesState::new();
        let action = parse_line("tap 1").unwrap();
        assert!(to_msg(action, &state).is_err());
        assert!(to_msg(Action::DismissSelection, &state).is_err());
        assert_eq!(to_msg(Action::Help, &state), Ok(None));
    }
}
