use serde::{Deserialize, Serialize};

pub type MangaId = i64;
pub type SourceId = i64;
pub type CategoryId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manga {
    pub id: MangaId,
    pub title: String,
    pub source: SourceId,
    #[serde(default = "default_true")]
    pub favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    /// Implicit category holding manga the user never filed anywhere.
    pub const UNCATEGORIZED_ID: CategoryId = 0;

    pub fn uncategorized() -> Self {
        Self {
            id: Self::UNCATEGORIZED_ID,
            name: String::new(),
        }
    }

    pub fn is_system(&self) -> bool {
        self.id == Self::UNCATEGORIZED_ID
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: SourceId,
    pub name: String,
    #[serde(default)]
    pub lang: String,
    /// Network-backed sources own downloaded chapters that can be deleted.
    #[serde(default)]
    pub supports_downloads: bool,
}

impl Source {
    /// Placeholder for a source that is no longer installed.
    pub fn unknown(id: SourceId) -> Self {
        Self {
            id,
            name: id.to_string(),
            lang: String::new(),
            supports_downloads: false,
        }
    }

    pub fn display_name(&self) -> String {
        if self.name.trim().is_empty() {
            self.id.to_string()
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryManga {
    pub id: i64,
    pub manga: Manga,
    #[serde(default)]
    pub category: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: Source,
    pub count: i64,
}

/// Last failed update of one manga, as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub manga_id: MangaId,
    pub error_message: Option<String>,
    pub simplified_error_message: Option<String>,
}

impl FailureRecord {
    /// Message shown to the user: the classified one when available.
    pub fn display_message(&self) -> Option<&str> {
        self.simplified_error_message
            .as_deref()
            .or(self.error_message.as_deref())
    }
}

/// One row of the failed-updates inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedEntry {
    pub library_item_id: i64,
    pub manga: Manga,
    pub source: Source,
    pub category: Category,
    pub error_message: Option<String>,
    pub selected: bool,
}

impl FailedEntry {
    pub fn manga_id(&self) -> MangaId {
        self.manga.id
    }
}

/// Everything the inbox needs from one upstream emission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedSnapshot {
    pub records: Vec<FailureRecord>,
    pub library: Vec<LibraryManga>,
    pub categories: Vec<Category>,
    pub sources: Vec<Source>,
    pub sources_count: Vec<SourceCount>,
}

fn default_true() -> bool {
    true
}
