use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use shelf_core::{Manga, MangaId};
use shelf_logging::{shelf_debug, shelf_error, shelf_warn};

use crate::{ChapterStorage, CoverCache, FailedUpdatesRepository, LibraryRepository, StoreError};

/// Side effects requested by the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerJob {
    RemoveRecords(Vec<MangaId>),
    /// Unfavorite in one batch, then drop cached covers.
    RemoveFromLibrary(Vec<Manga>),
    DeleteChapters(Vec<Manga>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    RecordsRemoved { requested: usize },
    RemovedFromLibrary { unfavorited: usize, covers_removed: usize },
    ChaptersDeleted { deleted: usize, skipped: usize },
    JobFailed { job: &'static str, error: String },
}

#[derive(Clone)]
pub struct WorkerDeps {
    pub records: Arc<dyn FailedUpdatesRepository>,
    pub library: Arc<dyn LibraryRepository>,
    pub covers: CoverCache,
    pub chapters: ChapterStorage,
}

/// Runs jobs on a background thread that owns a tokio runtime.
///
/// Every job is an independent blocking task; jobs are never cancelled once
/// submitted and `shutdown` waits for all of them.
pub struct EffectWorker {
    cmd_tx: Option<mpsc::Sender<WorkerJob>>,
    event_rx: mpsc::Receiver<WorkerEvent>,
    thread: Option<JoinHandle<()>>,
}

impl EffectWorker {
    pub fn spawn(deps: WorkerDeps) -> Result<Self, StoreError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<WorkerJob>();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("shelf-worker")
            .build()?;

        let thread = thread::Builder::new()
            .name("shelf-effects".into())
            .spawn(move || {
                let mut pending: Vec<tokio::task::JoinHandle<()>> = Vec::new();
                while let Ok(job) = cmd_rx.recv() {
                    let deps = deps.clone();
                    let event_tx = event_tx.clone();
                    pending.retain(|handle| !handle.is_finished());
                    pending.push(runtime.spawn_blocking(move || {
                        let _ = event_tx.send(run_job(&deps, job));
                    }));
                }
                for handle in pending {
                    if let Err(err) = runtime.block_on(handle) {
                        shelf_error!("Worker task did not complete: {}", err);
                    }
                }
            })?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            thread: Some(thread),
        })
    }

    pub fn submit(&self, job: WorkerJob) {
        if let Some(tx) = &self.cmd_tx {
            if tx.send(job).is_err() {
                shelf_error!("Effect worker is gone; job dropped");
            }
        }
    }

    pub fn try_recv(&self) -> Option<WorkerEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Waits for every submitted job and returns the events not yet received.
    pub fn shutdown(mut self) -> Vec<WorkerEvent> {
        self.stop();
        self.event_rx.try_iter().collect()
    }

    fn stop(&mut self) {
        self.cmd_tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                shelf_error!("Effect worker thread panicked");
            }
        }
    }
}

impl Drop for EffectWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_job(deps: &WorkerDeps, job: WorkerJob) -> WorkerEvent {
    match job {
        WorkerJob::RemoveRecords(manga_ids) => {
            deps.records.remove_by_ids(&manga_ids);
            WorkerEvent::RecordsRemoved {
                requested: manga_ids.len(),
            }
        }
        WorkerJob::RemoveFromLibrary(mangas) => remove_from_library(deps, &mangas),
        WorkerJob::DeleteChapters(mangas) => delete_chapters(deps, &mangas),
    }
}

fn remove_from_library(deps: &WorkerDeps, mangas: &[Manga]) -> WorkerEvent {
    let ids: Vec<MangaId> = mangas.iter().map(|manga| manga.id).collect();
    let unfavorited = match deps.library.unfavorite_all(&ids) {
        Ok(count) => count,
        Err(err) => {
            shelf_error!("Failed to remove {} manga from the library: {}", ids.len(), err);
            return WorkerEvent::JobFailed {
                job: "remove_from_library",
                error: err.to_string(),
            };
        }
    };

    let mut covers_removed = 0;
    for manga in mangas {
        match deps.covers.remove(manga.id) {
            Ok(removed) => covers_removed += removed,
            Err(err) => shelf_warn!("Failed to drop cover of manga {}: {}", manga.id, err),
        }
    }
    WorkerEvent::RemovedFromLibrary {
        unfavorited,
        covers_removed,
    }
}

fn delete_chapters(deps: &WorkerDeps, mangas: &[Manga]) -> WorkerEvent {
    let mut deleted = 0;
    let mut skipped = 0;
    for manga in mangas {
        let source = match deps.library.source(manga.source) {
            Ok(Some(source)) if source.supports_downloads => source,
            Ok(_) => {
                shelf_debug!("Source {} has no downloads; skipping '{}'", manga.source, manga.title);
                skipped += 1;
                continue;
            }
            Err(err) => {
                shelf_warn!("Failed to look up source {}: {}", manga.source, err);
                skipped += 1;
                continue;
            }
        };
        match deps.chapters.delete_manga(manga, &source) {
            Ok(true) => deleted += 1,
            Ok(false) => {}
            Err(err) => shelf_error!("Failed to delete chapters of '{}': {}", manga.title, err),
        }
    }
    WorkerEvent::ChaptersDeleted { deleted, skipped }
}
