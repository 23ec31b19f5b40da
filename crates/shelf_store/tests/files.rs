mod common;

use std::fs;

use shelf_store::{
    ensure_dir, read_optional, AtomicFileWriter, ChapterCache, ChapterStorage, CoverCache,
};
use tempfile::TempDir;

use common::{manga, source};

#[test]
fn creates_missing_data_dir() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("data");
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}

#[test]
fn data_dir_must_be_a_directory() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("file");
    fs::write(&file, "x").unwrap();
    assert!(ensure_dir(&file).is_err());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("settings.ron", "(a: 1)").unwrap();
    let second = writer.write("settings.ron", "(a: 2)").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(a: 2)");
}

#[test]
fn read_optional_treats_missing_file_as_none() {
    let temp = TempDir::new().unwrap();
    assert_eq!(read_optional(temp.path(), "nope.ron").unwrap(), None);
    fs::write(temp.path().join("yes.ron"), "()").unwrap();
    assert_eq!(read_optional(temp.path(), "yes.ron").unwrap().as_deref(), Some("()"));
}

#[test]
fn cover_removal_deletes_both_files_and_tolerates_missing_ones() {
    let temp = TempDir::new().unwrap();
    let covers = CoverCache::new(temp.path());
    fs::create_dir_all(temp.path().join("covers")).unwrap();
    fs::create_dir_all(temp.path().join("custom_covers")).unwrap();
    fs::write(covers.cover_path(1), b"jpg").unwrap();
    fs::write(covers.custom_cover_path(1), b"png").unwrap();
    fs::write(covers.cover_path(2), b"jpg").unwrap();

    assert_eq!(covers.remove(1).unwrap(), 2);
    assert_eq!(covers.remove(2).unwrap(), 1);
    assert_eq!(covers.remove(3).unwrap(), 0);
    assert!(!covers.cover_path(1).exists());
    assert!(!covers.custom_cover_path(1).exists());
}

#[test]
fn chapter_storage_removes_the_manga_directory() {
    let temp = TempDir::new().unwrap();
    let storage = ChapterStorage::new(temp.path());
    let berserk = manga(1, "Berserk: Deluxe", 10);
    let dex = source(10, "MangaDex", true);

    let dir = storage.manga_dir(&berserk, &dex);
    assert_eq!(dir, temp.path().join("MangaDex").join("Berserk_ Deluxe"));
    fs::create_dir_all(dir.join("Chapter 1")).unwrap();
    fs::write(dir.join("Chapter 1").join("001.jpg"), b"page").unwrap();

    assert!(storage.delete_manga(&berserk, &dex).unwrap());
    assert!(!dir.exists());
    assert!(temp.path().join("MangaDex").exists());
    assert!(!storage.delete_manga(&berserk, &dex).unwrap());
}

#[test]
fn chapter_cache_reports_size_and_counts_cleared_files() {
    let temp = TempDir::new().unwrap();
    let cache = ChapterCache::new(temp.path().join("chapters"));
    assert_eq!(cache.size().unwrap(), 0);
    assert_eq!(cache.clear().unwrap(), 0);

    let chapter = cache.root().join("4f2a");
    fs::create_dir_all(&chapter).unwrap();
    fs::write(chapter.join("001.jpg"), vec![0u8; 1000]).unwrap();
    fs::write(chapter.join("002.jpg"), vec![0u8; 24]).unwrap();
    fs::write(cache.root().join("journal"), "abc").unwrap();
    assert_eq!(cache.size().unwrap(), 1027);

    assert_eq!(cache.clear().unwrap(), 3);
    assert_eq!(cache.size().unwrap(), 0);
    assert!(cache.root().is_dir());
    assert!(!chapter.exists());
}
