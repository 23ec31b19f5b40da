use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use shelf_core::{GroupByMode, MangaId, SortingMode, SourceId, SystemErrorKind, UpdateFailure};

#[derive(Parser, Debug)]
#[command(name = "mangashelf")]
#[command(about = "Inbox of manga whose library update failed", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory holding the database, settings and library files
    #[arg(long, global = true, env = "MANGASHELF_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Where log output goes
    #[arg(long, global = true, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    File,
    Terminal,
    Both,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the failed updates with the saved grouping and sorting
    List {
        /// Expand every group and error header
        #[arg(long)]
        expand: bool,
    },

    /// Interactive session; reads one action per line from stdin
    Watch,

    /// Record a failed update for a manga
    Record {
        manga_id: MangaId,
        #[command(subcommand)]
        failure: FailureArg,
    },

    /// Clear the records of manga that updated successfully
    Succeed {
        #[arg(required = true)]
        manga_ids: Vec<MangaId>,
    },

    /// Drop entries from the inbox without touching the library
    Dismiss {
        #[arg(required = true)]
        manga_ids: Vec<MangaId>,
    },

    /// Drop every entry from the inbox
    DismissAll,

    /// Remove manga from the library and/or delete their downloaded chapters
    Delete {
        #[arg(required = true)]
        manga_ids: Vec<MangaId>,
        /// Remove from the library
        #[arg(long)]
        library: bool,
        /// Delete downloaded chapters
        #[arg(long)]
        chapters: bool,
    },

    /// Change how entries are grouped
    Group {
        #[arg(value_enum)]
        mode: GroupArg,
    },

    /// Sort entries; repeating the active mode flips the direction
    Sort {
        #[arg(value_enum, default_value_t = SortArg::Alphabetical)]
        mode: SortArg,
    },

    /// Preview a selection gesture sequence
    Select(SelectArgs),

    /// Inspect or change advanced settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// Inspect or edit the library catalog
    Library {
        #[command(subcommand)]
        action: Option<LibraryAction>,
    },
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Manga ids tapped in order
    pub manga_ids: Vec<MangaId>,
    /// Treat every tap as a long press (range selection)
    #[arg(long)]
    pub long_press: bool,
    /// Select every entry first
    #[arg(long)]
    pub all: bool,
    /// Invert the selection after the taps
    #[arg(long)]
    pub invert: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FailureArg {
    /// Server answered with an HTTP error status
    Http { code: u16 },
    /// Host name could not be resolved
    UnknownHost { host: String },
    NoResults,
    NotInstalled { source_id: SourceId },
    Licensed,
    /// Any other failure, by kind name (e.g. SocketException)
    System {
        kind: String,
        message: Option<String>,
    },
}

impl FailureArg {
    pub fn into_failure(self) -> UpdateFailure {
        match self {
            FailureArg::Http { code } => UpdateFailure::Http { code },
            FailureArg::UnknownHost { host } => UpdateFailure::UnknownHost { host },
            FailureArg::NoResults => UpdateFailure::NoResults,
            FailureArg::NotInstalled { source_id } => UpdateFailure::SourceNotInstalled { source_id },
            FailureArg::Licensed => UpdateFailure::LicensedChapters,
            FailureArg::System { kind, message } => UpdateFailure::System {
                kind: SystemErrorKind::from_name(&kind),
                message,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupArg {
    None,
    Category,
    Source,
}

impl From<GroupArg> for GroupByMode {
    fn from(arg: GroupArg) -> Self {
        match arg {
            GroupArg::None => GroupByMode::None,
            GroupArg::Category => GroupByMode::ByCategory,
            GroupArg::Source => GroupByMode::BySource,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortArg {
    Alphabetical,
}

impl From<SortArg> for SortingMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Alphabetical => SortingMode::Alphabetical,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    Show,
    Set { key: String, value: String },
    ResetUserAgent,
    /// Remove every failed-update record
    ClearFailedUpdates,
    /// Delete cached chapter pages
    ClearChapterCache,
}

#[derive(Subcommand, Debug)]
pub enum LibraryAction {
    Show,
    AddSource {
        id: SourceId,
        name: String,
        #[arg(long, default_value = "en")]
        lang: String,
        /// Source keeps downloaded chapters on disk
        #[arg(long)]
        downloads: bool,
    },
    AddCategory {
        id: i64,
        name: String,
    },
    AddManga {
        id: MangaId,
        title: String,
        #[arg(long)]
        source: SourceId,
        #[arg(long, default_value_t = 0)]
        category: i64,
    },
}
