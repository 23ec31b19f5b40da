use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use shelf_core::{Manga, Source};
use shelf_logging::shelf_info;

use crate::StoreError;

const MAX_DIR_NAME_LEN: usize = 240;

/// Downloaded chapters, laid out as `{root}/{source}/{manga title}/`.
#[derive(Debug, Clone)]
pub struct ChapterStorage {
    root: PathBuf,
}

impl ChapterStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn manga_dir(&self, manga: &Manga, source: &Source) -> PathBuf {
        self.root
            .join(sanitize_dir_name(&source.display_name()))
            .join(sanitize_dir_name(&manga.title))
    }

    /// Deletes every downloaded chapter of `manga`. Returns whether anything was there.
    pub fn delete_manga(&self, manga: &Manga, source: &Source) -> Result<bool, StoreError> {
        let dir = self.manga_dir(manga, source);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                shelf_info!("Deleted downloads of '{}' at {}", manga.title, dir.display());
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Pages of chapters read online, kept apart from downloads.
#[derive(Debug, Clone)]
pub struct ChapterCache {
    root: PathBuf,
}

impl ChapterCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Bytes used by cached files. A missing cache is empty.
    pub fn size(&self) -> Result<u64, StoreError> {
        Ok(dir_size(&self.root)?)
    }

    /// Deletes every cached file and returns how many were removed.
    ///
    /// The cache directory itself stays in place.
    pub fn clear(&self) -> Result<usize, StoreError> {
        let removed = remove_contents(&self.root)?;
        shelf_info!("Cleared {} cached file(s) from {}", removed, self.root.display());
        Ok(removed)
    }
}

fn dir_size(dir: &Path) -> io::Result<u64> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut total = 0;
    for entry in entries {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            total += dir_size(&entry.path())?;
        } else {
            total += entry.metadata()?.len();
        }
    }
    Ok(total)
}

fn remove_contents(dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            removed += remove_contents(&path)?;
            fs::remove_dir(&path)?;
        } else {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Filesystem-safe directory name for a title or source name.
pub fn sanitize_dir_name(input: &str) -> String {
    let cleaned: String = input
        .chars()
        .map(|c| if is_forbidden(c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches(&['_', ' ', '.'][..]);

    let mut compacted = String::with_capacity(cleaned.len());
    let mut prev_underscore = false;
    for c in cleaned.chars() {
        if c == '_' && prev_underscore {
            continue;
        }
        prev_underscore = c == '_';
        compacted.push(c);
    }

    if compacted.len() > MAX_DIR_NAME_LEN {
        let mut cut = MAX_DIR_NAME_LEN;
        while !compacted.is_char_boundary(cut) {
            cut -= 1;
        }
        compacted.truncate(cut);
    }
    if compacted.is_empty() {
        compacted.push_str("unknown");
    }
    compacted
}

fn is_forbidden(c: char) -> bool {
    matches!(c, '\\' | '/' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0'..='\u{1F}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_separators_and_collapses_underscores() {
        assert_eq!(sanitize_dir_name("Re:Zero / Arc 2"), "Re_Zero _ Arc 2");
        assert_eq!(sanitize_dir_name("a::b"), "a_b");
    }

    #[test]
    fn empty_names_get_a_placeholder() {
        assert_eq!(sanitize_dir_name(" ..//.. "), "unknown");
    }

    #[test]
    fn long_names_are_cut_on_char_boundaries() {
        let name = "é".repeat(200);
        let sanitized = sanitize_dir_name(&name);
        assert!(sanitized.len() <= MAX_DIR_NAME_LEN);
        assert!(sanitized.chars().all(|c| c == 'é'));
    }
}
