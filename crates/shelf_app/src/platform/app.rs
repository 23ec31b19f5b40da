use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use shelf_core::{
    AdvancedSettings, Category, Event, FailedUpdatesView, LibraryManga, Manga, Msg, Source,
};
use shelf_logging::{shelf_info, shelf_warn};
use shelf_store::{
    record_failure, ChapterCache, FailedUpdatesRepository, SqliteFailedUpdates, StoreError,
};

use super::cli::{Command, LibraryAction, SelectArgs, SettingsAction};
use super::config::DataDir;
use super::connectivity::ProbeConnectivity;
use super::effects::describe;
use super::interactive::{self, Action};
use super::render;
use super::session::Session;

/// Everything a command needs from the outside world.
pub struct AppContext {
    pub data: DataDir,
    pub settings: AdvancedSettings,
    pub json: bool,
}

pub fn execute(ctx: &mut AppContext, command: Command) -> Result<()> {
    match command {
        Command::List { expand } => {
            let mut session = Session::open(&ctx.data)?;
            if expand {
                session.dispatch(Msg::ExpandAll);
            }
            finish(ctx, session)
        }
        Command::Watch => watch(ctx),
        Command::Record { manga_id, failure } => {
            let repo = open_records(&ctx.data)?;
            let connectivity = ProbeConnectivity::new(&ctx.settings.connectivity_probe);
            record_failure(&repo, manga_id, &failure.into_failure(), &connectivity)
                .with_context(|| format!("recording failure for manga {manga_id}"))?;
            shelf_info!("Recorded failed update for manga {}", manga_id);
            list_records(ctx, &repo)
        }
        Command::Succeed { manga_ids } => {
            let repo = open_records(&ctx.data)?;
            repo.remove_by_ids(&manga_ids);
            list_records(ctx, &repo)
        }
        Command::Dismiss { manga_ids } => run_msg(ctx, Msg::Dismiss(manga_ids)),
        Command::DismissAll => run_msg(ctx, Msg::DismissAll),
        Command::Delete {
            manga_ids,
            library,
            chapters,
        } => {
            if !library && !chapters {
                bail!("nothing to delete: pass --library and/or --chapters");
            }
            run_msg(
                ctx,
                Msg::Delete {
                    manga_ids,
                    delete_from_library: library,
                    delete_chapters: chapters,
                },
            )
        }
        Command::Group { mode } => run_msg(ctx, Msg::GroupBy(mode.into())),
        Command::Sort { mode } => run_msg(ctx, Msg::SortBy(mode.into())),
        Command::Select(args) => select(ctx, args),
        Command::Settings { action } => settings(ctx, action.unwrap_or(SettingsAction::Show)),
        Command::Library { action } => library(ctx, action.unwrap_or(LibraryAction::Show)),
    }
}

fn open_records(data: &DataDir) -> Result<SqliteFailedUpdates> {
    SqliteFailedUpdates::open(&data.database())
        .with_context(|| format!("opening {}", data.database().display()))
}

fn run_msg(ctx: &AppContext, msg: Msg) -> Result<()> {
    let mut session = Session::open(&ctx.data)?;
    session.dispatch(msg);
    finish(ctx, session)
}

fn finish(ctx: &AppContext, session: Session) -> Result<()> {
    let (view, notices) = session.finish();
    report_notices(&notices);
    print_view(ctx, &view)
}

fn select(ctx: &AppContext, args: SelectArgs) -> Result<()> {
    let mut session = Session::open(&ctx.data)?;
    if args.all {
        session.dispatch(Msg::ToggleAll(true));
    }
    for manga_id in args.manga_ids {
        let action = Action::Tap {
            manga_id,
            long_press: args.long_press,
        };
        if let Some(msg) = interactive::to_msg(action, session.state()).map_err(anyhow::Error::msg)? {
            session.dispatch(msg);
        }
    }
    if args.invert {
        session.dispatch(Msg::InvertSelection);
    }
    finish(ctx, session)
}

fn watch(ctx: &AppContext) -> Result<()> {
    let mut session = Session::open(&ctx.data)?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    print_view(ctx, &session.view())?;

    for line in stdin.lock().lines() {
        let line = line.context("reading stdin")?;
        let action = match interactive::parse_line(&line) {
            Ok(action) => action,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        match action {
            Action::Quit => break,
            Action::Help => {
                println!("{}", interactive::HELP);
                continue;
            }
            _ => {}
        }

        let mut dirty = match interactive::to_msg(action, session.state()) {
            Ok(Some(msg)) => session.dispatch(msg),
            Ok(None) => false,
            Err(err) => {
                eprintln!("{err}");
                false
            }
        };
        dirty |= session.pump();
        report_notices(&session.take_notices());
        if dirty {
            print_view(ctx, &session.view())?;
        }
        stdout.flush().context("flushing stdout")?;
    }

    let (view, notices) = session.finish();
    report_notices(&notices);
    print_view(ctx, &view)
}

fn settings(ctx: &mut AppContext, action: SettingsAction) -> Result<()> {
    match action {
        SettingsAction::Show => {}
        SettingsAction::Set { key, value } => {
            let outcome = ctx.settings.apply(&key, &value)?;
            ctx.data.save_settings(&ctx.settings)?;
            if outcome.requires_restart {
                eprintln!("{key} takes effect on the next run");
            }
        }
        SettingsAction::ResetUserAgent => {
            let outcome = ctx.settings.reset_user_agent();
            ctx.data.save_settings(&ctx.settings)?;
            if outcome.requires_restart {
                eprintln!("user agent reset; takes effect on the next run");
            }
        }
        SettingsAction::ClearFailedUpdates => {
            let repo = open_records(&ctx.data)?;
            let before = repo.records()?.len();
            repo.remove_all();
            eprintln!("Cleared {before} failed update(s)");
        }
        SettingsAction::ClearChapterCache => {
            let removed = clear_chapter_cache(&ctx.data).context("clearing chapter cache")?;
            eprintln!("Cache cleared, {removed} file(s) deleted");
        }
    }

    let failed = open_records(&ctx.data)?.records()?.len();
    let cache = ChapterCache::new(ctx.data.chapter_cache());
    let chapter_cache_bytes = cache.size().unwrap_or_else(|err| {
        shelf_warn!("Failed to measure chapter cache at {}: {}", cache.root().display(), err);
        0
    });
    if ctx.json {
        print_json(&SettingsReport {
            settings: &ctx.settings,
            failed_updates: failed,
            chapter_cache_bytes,
        })
    } else {
        let groups = ctx.settings.preference_groups(failed, chapter_cache_bytes);
        print!("{}", render::render_settings(&groups));
        Ok(())
    }
}

#[derive(Serialize)]
struct SettingsReport<'a> {
    settings: &'a AdvancedSettings,
    failed_updates: usize,
    chapter_cache_bytes: u64,
}

fn library(ctx: &AppContext, action: LibraryAction) -> Result<()> {
    let mut snapshot = ctx.data.load_library()?;
    let changed = match action {
        LibraryAction::Show => false,
        LibraryAction::AddSource {
            id,
            name,
            lang,
            downloads,
        } => {
            snapshot.sources.retain(|source| source.id != id);
            snapshot.sources.push(Source {
                id,
                name,
                lang,
                supports_downloads: downloads,
            });
            true
        }
        LibraryAction::AddCategory { id, name } => {
            if id == Category::UNCATEGORIZED_ID {
                bail!("category {id} is reserved for uncategorized manga");
            }
            snapshot.categories.retain(|category| category.id != id);
            snapshot.categories.push(Category { id, name });
            true
        }
        LibraryAction::AddManga {
            id,
            title,
            source,
            category,
        } => {
            snapshot.library.retain(|item| item.manga.id != id);
            snapshot.library.push(LibraryManga {
                id,
                manga: Manga {
                    id,
                    title,
                    source,
                    favorite: true,
                },
                category,
            });
            true
        }
    };
    if changed {
        ctx.data.save_library(&snapshot)?;
    }

    if ctx.json {
        print_json(&snapshot)
    } else {
        print!("{}", render::render_library(&snapshot));
        Ok(())
    }
}

fn list_records(ctx: &AppContext, repo: &SqliteFailedUpdates) -> Result<()> {
    let records = repo.records()?;
    if ctx.json {
        return print_json(&records);
    }
    for record in &records {
        println!(
            "{:>6}  {}",
            record.manga_id,
            record.display_message().unwrap_or("(no message)")
        );
    }
    Ok(())
}

/// Empties the chapter cache and returns the number of files deleted.
pub fn clear_chapter_cache(data: &DataDir) -> Result<usize, StoreError> {
    ChapterCache::new(data.chapter_cache()).clear()
}

fn report_notices(notices: &[Event]) {
    for notice in notices {
        eprintln!("warning: {}", describe(*notice));
    }
}

fn print_view(ctx: &AppContext, view: &FailedUpdatesView) -> Result<()> {
    if ctx.json {
        print_json(view)
    } else {
        print!("{}", render::render_view(view));
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("serializing output")?;
    println!("{text}");
    Ok(())
}
