use std::sync::Arc;

use shelf_core::{Effect, Event};
use shelf_logging::{shelf_error, shelf_info};
use shelf_store::{EffectWorker, MemoryLibrary, WorkerEvent, WorkerJob};

use super::config::DataDir;

/// Maps effects from the core onto background jobs and config writes.
pub struct EffectRunner {
    worker: EffectWorker,
    data: DataDir,
    library: Arc<MemoryLibrary>,
}

impl EffectRunner {
    pub fn new(worker: EffectWorker, data: DataDir, library: Arc<MemoryLibrary>) -> Self {
        Self {
            worker,
            data,
            library,
        }
    }

    /// Starts every effect and returns the notifications meant for the user.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Event> {
        let mut events = Vec::new();
        for effect in effects {
            match effect {
                Effect::PersistPreferences(prefs) => {
                    if let Err(err) = self.data.save_view_prefs(&prefs) {
                        shelf_error!("Failed to save view preferences: {:#}", err);
                    }
                }
                Effect::RemoveFailureRecords { manga_ids } => {
                    shelf_info!("Removing {} failed-update record(s)", manga_ids.len());
                    self.worker.submit(WorkerJob::RemoveRecords(manga_ids));
                }
                Effect::RemoveFromLibrary { mangas } => {
                    shelf_info!("Removing {} manga from the library", mangas.len());
                    self.worker.submit(WorkerJob::RemoveFromLibrary(mangas));
                }
                Effect::DeleteChapters { mangas } => {
                    shelf_info!("Deleting downloads of {} manga", mangas.len());
                    self.worker.submit(WorkerJob::DeleteChapters(mangas));
                }
                Effect::Notify(event) => events.push(event),
            }
        }
        events
    }

    /// Drains finished jobs. Returns true when the library changed.
    pub fn poll(&self) -> bool {
        let mut library_changed = false;
        while let Some(event) = self.worker.try_recv() {
            library_changed |= self.handle(&event);
        }
        library_changed
    }

    /// Waits for outstanding jobs. Returns true when the library changed.
    pub fn shutdown(self) -> bool {
        let Self {
            worker,
            data,
            library,
        } = self;
        let runner_events = worker.shutdown();
        let mut library_changed = false;
        for event in &runner_events {
            library_changed |= handle_event(&data, &library, event);
        }
        library_changed
    }

    fn handle(&self, event: &WorkerEvent) -> bool {
        handle_event(&self.data, &self.library, event)
    }
}

fn handle_event(data: &DataDir, library: &MemoryLibrary, event: &WorkerEvent) -> bool {
    match event {
        WorkerEvent::RemovedFromLibrary { unfavorited, .. } => {
            let saved = library
                .snapshot()
                .map_err(anyhow::Error::from)
                .and_then(|snapshot| data.save_library(&snapshot));
            if let Err(err) = saved {
                shelf_error!("Failed to save the library after removing manga: {:#}", err);
            }
            *unfavorited > 0
        }
        WorkerEvent::JobFailed { job, error } => {
            shelf_error!("Background job {} failed: {}", job, error);
            false
        }
        WorkerEvent::RecordsRemoved { .. } | WorkerEvent::ChaptersDeleted { .. } => false,
    }
}

pub fn describe(event: Event) -> &'static str {
    match event {
        Event::FailedFetchingSourcesWithCount => "Failed to fetch sources with favorite counts",
    }
}
