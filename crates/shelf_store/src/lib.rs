//! Shelf store: persistence and background side effects for the inbox.
mod chapters;
mod covers;
mod error;
mod failed_updates;
mod feed;
mod library;
mod persist;
mod worker;

pub use chapters::{sanitize_dir_name, ChapterCache, ChapterStorage};
pub use covers::CoverCache;
pub use error::StoreError;
pub use failed_updates::{record_failure, FailedUpdatesRepository, SqliteFailedUpdates};
pub use feed::{feed_messages, load_feed};
pub use library::{LibraryRepository, LibrarySnapshot, MemoryLibrary};
pub use persist::{ensure_dir, read_optional, AtomicFileWriter, PersistError};
pub use worker::{EffectWorker, WorkerDeps, WorkerEvent, WorkerJob};
