use std::sync::mpsc::Receiver;
use std::sync::Arc;

use anyhow::{Context, Result};
use shelf_core::{update, Effect, Event, FailedUpdatesState, FailedUpdatesView, FailureRecord, Msg};
use shelf_logging::{shelf_debug, shelf_error, shelf_warn};
use shelf_store::{
    feed_messages, ChapterStorage, CoverCache, EffectWorker, FailedUpdatesRepository,
    MemoryLibrary, SqliteFailedUpdates, WorkerDeps,
};

use super::config::DataDir;
use super::effects::EffectRunner;

/// Engine state wired to the record store and the effect worker.
pub struct Session {
    state: FailedUpdatesState,
    records: Arc<SqliteFailedUpdates>,
    records_rx: Receiver<Vec<FailureRecord>>,
    library: Arc<MemoryLibrary>,
    runner: Option<EffectRunner>,
    notices: Vec<Event>,
}

impl Session {
    pub fn open(data: &DataDir) -> Result<Self> {
        let records = Arc::new(
            SqliteFailedUpdates::open(&data.database())
                .with_context(|| format!("opening {}", data.database().display()))?,
        );
        let library = Arc::new(MemoryLibrary::new(data.load_library()?));
        let worker = EffectWorker::spawn(WorkerDeps {
            records: records.clone(),
            library: library.clone(),
            covers: CoverCache::new(data.cover_root()),
            chapters: ChapterStorage::new(data.downloads()),
        })
        .context("starting the effect worker")?;

        let records_rx = records.subscribe();
        let mut session = Self {
            state: FailedUpdatesState::new(),
            records,
            records_rx,
            library: library.clone(),
            runner: Some(EffectRunner::new(worker, data.clone(), library)),
            notices: Vec::new(),
        };
        session.dispatch(Msg::RestorePreferences(data.load_view_prefs()));
        session.pump();
        Ok(session)
    }

    /// Runs one message through `update` and starts its effects.
    /// Returns whether the view changed.
    pub fn dispatch(&mut self, msg: Msg) -> bool {
        shelf_debug!("dispatch {}", msg_name(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        match &self.runner {
            Some(runner) => {
                let notices = runner.enqueue(effects);
                self.notices.extend(notices);
            }
            None => {
                for effect in effects {
                    match effect {
                        Effect::Notify(event) => self.notices.push(event),
                        other => shelf_warn!("Effect after shutdown dropped: {:?}", other),
                    }
                }
            }
        }
        dirty
    }

    /// Applies pending store emissions and finished jobs.
    pub fn pump(&mut self) -> bool {
        let mut latest = None;
        while let Ok(records) = self.records_rx.try_recv() {
            latest = Some(records);
        }
        let library_changed = self.runner.as_ref().is_some_and(EffectRunner::poll);
        if library_changed && latest.is_none() {
            latest = Some(self.current_records());
        }
        match latest {
            Some(records) => self.feed(records),
            None => false,
        }
    }

    pub fn view(&self) -> FailedUpdatesView {
        self.state.view()
    }

    pub fn state(&self) -> &FailedUpdatesState {
        &self.state
    }

    pub fn take_notices(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.notices)
    }

    /// Waits for background jobs and folds their results into the state.
    pub fn finish(mut self) -> (FailedUpdatesView, Vec<Event>) {
        let library_changed = match self.runner.take() {
            Some(runner) => runner.shutdown(),
            None => false,
        };
        let mut latest = None;
        while let Ok(records) = self.records_rx.try_recv() {
            latest = Some(records);
        }
        if library_changed && latest.is_none() {
            latest = Some(self.current_records());
        }
        if let Some(records) = latest {
            self.feed(records);
        }
        (self.state.view(), self.notices)
    }

    fn feed(&mut self, records: Vec<FailureRecord>) -> bool {
        let mut dirty = false;
        for msg in feed_messages(records, self.library.as_ref()) {
            dirty |= self.dispatch(msg);
        }
        dirty
    }

    fn current_records(&self) -> Vec<FailureRecord> {
        self.records.records().unwrap_or_else(|err| {
            shelf_error!("Failed to re-read failed updates: {}", err);
            Vec::new()
        })
    }
}

fn msg_name(msg: &Msg) -> &'static str {
    match msg {
        Msg::FeedUpdated(_) => "FeedUpdated",
        Msg::SourcesCountFailed => "SourcesCountFailed",
        Msg::RestorePreferences(_) => "RestorePreferences",
        Msg::ToggleSelection { .. } => "ToggleSelection",
        Msg::ToggleAll(_) => "ToggleAll",
        Msg::InvertSelection => "InvertSelection",
        Msg::SelectGroup(_) => "SelectGroup",
        Msg::GroupBy(_) => "GroupBy",
        Msg::SortBy(_) => "SortBy",
        Msg::ToggleExpanded(_) => "ToggleExpanded",
        Msg::ExpandAll => "ExpandAll",
        Msg::ContractAll => "ContractAll",
        Msg::Dismiss(_) => "Dismiss",
        Msg::DismissAll => "DismissAll",
        Msg::OpenDeleteDialog => "OpenDeleteDialog",
        Msg::OpenErrorMessage(_) => "OpenErrorMessage",
        Msg::CloseDialog => "CloseDialog",
        Msg::DeleteConfirmed { .. } => "DeleteConfirmed",
        Msg::Delete { .. } => "Delete",
    }
}
