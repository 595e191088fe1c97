//! Periodic content sync for the note being edited.
//!
//! The editor reports every content change with [`SyncScheduler::edit`]; a
//! background task started with [`SyncScheduler::start`] writes the latest
//! snapshot back to the service once per interval. Only one flush is ever in
//! flight; a failed or cancelled flush leaves the content dirty and is retried
//! on the next tick.

mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::api::NotesClient;
use crate::error::Result;
use crate::models::{Note, NoteId, UpdateNote};

pub use state::{FlushOutcome, SyncState};

/// Writes a note's title and content back to the service.
#[async_trait]
pub trait NoteSaver: Send + Sync + 'static {
    async fn save_content(&self, id: NoteId, title: &str, content: &str) -> Result<()>;
}

#[async_trait]
impl NoteSaver for NotesClient {
    async fn save_content(&self, id: NoteId, title: &str, content: &str) -> Result<()> {
        self.update(id, &UpdateNote::content_snapshot(title, content))
            .await
            .map(|_| ())
    }
}

/// Unsaved content dropped by switching or closing the open note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardedEdit {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

#[derive(Debug)]
struct DirtyContent {
    id: NoteId,
    title: String,
    content: String,
    needs_flush: bool,
    flushing: bool,
    /// Bumped on every edit; a flush only cleans the revision it sent.
    revision: u64,
    /// Identifies this open session; bumped on every open/close.
    generation: u64,
}

#[derive(Debug, Default)]
struct SchedulerState {
    open: Option<DirtyContent>,
    generation: u64,
}

struct FlushTicket {
    id: NoteId,
    title: String,
    content: String,
    revision: u64,
    generation: u64,
}

/// Shared handle over the open note's dirty-content record.
///
/// Clones share the same record, so the background task and the editor see
/// the same state.
pub struct SyncScheduler<S: NoteSaver> {
    saver: Arc<S>,
    state: Arc<Mutex<SchedulerState>>,
    interval: Duration,
}

impl<S: NoteSaver> Clone for SyncScheduler<S> {
    fn clone(&self) -> Self {
        Self {
            saver: Arc::clone(&self.saver),
            state: Arc::clone(&self.state),
            interval: self.interval,
        }
    }
}

impl<S: NoteSaver> SyncScheduler<S> {
    pub fn new(saver: S, interval: Duration) -> Self {
        Self {
            saver: Arc::new(saver),
            state: Arc::new(Mutex::new(SchedulerState::default())),
            interval,
        }
    }

    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Start editing `note`. A previously open note is dropped without a
    /// final flush; its unsaved content, if any, is returned.
    pub fn open(&self, note: &Note) -> Option<DiscardedEdit> {
        let mut state = self.lock();
        let discarded = discard(&mut state);
        state.generation += 1;
        state.open = Some(DirtyContent {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            needs_flush: false,
            flushing: false,
            revision: 0,
            generation: state.generation,
        });
        tracing::debug!("Opened note {} for editing", note.id);
        discarded
    }

    /// Record new content for the open note.
    pub fn edit(&self, content: impl Into<String>) {
        let mut state = self.lock();
        let Some(open) = state.open.as_mut() else {
            tracing::debug!("Ignoring edit with no open note");
            return;
        };
        open.content = content.into();
        open.needs_flush = true;
        open.revision += 1;
    }

    /// Stop editing; unsaved content is dropped and returned.
    pub fn close(&self) -> Option<DiscardedEdit> {
        let mut state = self.lock();
        let discarded = discard(&mut state);
        state.generation += 1;
        discarded
    }

    pub fn state(&self) -> Option<SyncState> {
        self.lock().open.as_ref().map(|open| {
            if open.flushing {
                SyncState::Flushing
            } else if open.needs_flush {
                SyncState::Dirty
            } else {
                SyncState::Clean
            }
        })
    }

    pub fn open_note(&self) -> Option<NoteId> {
        self.lock().open.as_ref().map(|open| open.id)
    }

    /// Current local content of the open note.
    pub fn content(&self) -> Option<String> {
        self.lock().open.as_ref().map(|open| open.content.clone())
    }

    /// Perform at most one flush of the open note.
    pub async fn tick(&self) -> FlushOutcome {
        let Some(ticket) = self.begin_flush() else {
            return FlushOutcome::Skipped;
        };

        let mut guard = FlushGuard {
            state: &self.state,
            generation: ticket.generation,
            armed: true,
        };
        let result = self
            .saver
            .save_content(ticket.id, &ticket.title, &ticket.content)
            .await;
        guard.armed = false;
        self.finish_flush(&ticket, result)
    }

    /// Spawn the periodic flush loop. The first tick runs one full interval
    /// after start; the loop stops when the returned task is stopped or dropped.
    pub fn start(&self) -> SyncTask {
        let scheduler = self.clone();
        let interval = self.interval;
        tracing::debug!("Starting content sync every {:?}", interval);

        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                scheduler.tick().await;
            }
        });
        SyncTask { handle }
    }

    fn begin_flush(&self) -> Option<FlushTicket> {
        let mut state = self.lock();
        let open = state.open.as_mut()?;
        if !open.needs_flush || open.flushing {
            return None;
        }

        open.flushing = true;
        Some(FlushTicket {
            id: open.id,
            title: open.title.clone(),
            content: open.content.clone(),
            revision: open.revision,
            generation: open.generation,
        })
    }

    fn finish_flush(&self, ticket: &FlushTicket, result: Result<()>) -> FlushOutcome {
        let mut state = self.lock();
        let Some(open) = state
            .open
            .as_mut()
            .filter(|open| open.generation == ticket.generation)
        else {
            if let Err(error) = result {
                tracing::warn!("Save of note {} failed after it was closed: {}", ticket.id, error);
            }
            return FlushOutcome::Superseded;
        };

        open.flushing = false;
        match result {
            Ok(()) => {
                if open.revision == ticket.revision {
                    open.needs_flush = false;
                }
                tracing::debug!("Saved note {}", ticket.id);
                FlushOutcome::Flushed
            }
            Err(error) => {
                tracing::error!("Failed to save note {}: {}", ticket.id, error);
                FlushOutcome::Failed
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn discard(state: &mut SchedulerState) -> Option<DiscardedEdit> {
    let previous = state.open.take()?;
    if !previous.needs_flush {
        return None;
    }

    tracing::warn!(
        "Discarding unsaved edits to note {} ({} chars)",
        previous.id,
        previous.content.chars().count()
    );
    Some(DiscardedEdit {
        id: previous.id,
        title: previous.title,
        content: previous.content,
    })
}

/// Clears the in-flight flag when a flush is dropped before it completes.
/// The content stays dirty so the next tick sends it again.
struct FlushGuard<'a> {
    state: &'a Mutex<SchedulerState>,
    generation: u64,
    armed: bool,
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(open) = state
            .open
            .as_mut()
            .filter(|open| open.generation == self.generation)
        {
            open.flushing = false;
            tracing::debug!("Save of note {} was cancelled", open.id);
        }
    }
}

/// Running flush loop; aborted on [`SyncTask::stop`] or drop.
#[derive(Debug)]
pub struct SyncTask {
    handle: JoinHandle<()>,
}

impl SyncTask {
    pub fn stop(self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SyncTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use pretty_assertions::assert_eq;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::error::Error;
    use crate::models::{NoteStatus, UserId};
    use crate::test_support::{json_response, TestHarness};

    const INTERVAL: Duration = Duration::from_millis(3000);

    #[derive(Clone, Default)]
    struct RecordingSaver {
        saves: Arc<Mutex<Vec<(NoteId, String, String)>>>,
        failing: Arc<AtomicBool>,
        gate: Option<Arc<Semaphore>>,
    }

    impl RecordingSaver {
        fn gated() -> (Self, Arc<Semaphore>) {
            let gate = Arc::new(Semaphore::new(0));
            (
                Self {
                    gate: Some(Arc::clone(&gate)),
                    ..Self::default()
                },
                gate,
            )
        }

        fn saves(&self) -> Vec<(NoteId, String, String)> {
            self.saves.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl NoteSaver for RecordingSaver {
        async fn save_content(&self, id: NoteId, title: &str, content: &str) -> Result<()> {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Network("offline".to_string()));
            }
            self.saves
                .lock()
                .unwrap()
                .push((id, title.to_string(), content.to_string()));
            Ok(())
        }
    }

    fn note(id: i64, content: &str) -> Note {
        Note {
            id: NoteId(id),
            parent_id: None,
            user_id: UserId(1),
            title: format!("Note {id}"),
            content: content.to_string(),
            icon: None,
            is_favorite: 0,
            position: 0,
            status: NoteStatus::Normal,
            created_at: String::new(),
            updated_at: None,
        }
    }

    async fn wait_for_flushing<S: NoteSaver>(scheduler: &SyncScheduler<S>) {
        while scheduler.state() != Some(SyncState::Flushing) {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn tick_skips_when_nothing_to_flush() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);

        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);
        assert_eq!(scheduler.state(), None);

        scheduler.open(&note(1, "hello"));
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);
        assert!(saver.saves().is_empty());
    }

    #[tokio::test]
    async fn edit_without_open_note_is_ignored() {
        let scheduler = SyncScheduler::new(RecordingSaver::default(), INTERVAL);
        scheduler.edit("orphan");
        assert_eq!(scheduler.state(), None);
        assert_eq!(scheduler.content(), None);
    }

    #[tokio::test]
    async fn flush_sends_latest_snapshot_and_cleans() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, "v0"));

        scheduler.edit("v1");
        scheduler.edit("v2");
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));

        assert_eq!(scheduler.tick().await, FlushOutcome::Flushed);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(
            saver.saves(),
            vec![(NoteId(1), "Note 1".to_string(), "v2".to_string())]
        );
        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);
    }

    #[tokio::test]
    async fn failure_keeps_content_dirty_until_next_tick() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("draft");

        saver.set_failing(true);
        assert_eq!(scheduler.tick().await, FlushOutcome::Failed);
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));

        saver.set_failing(false);
        assert_eq!(scheduler.tick().await, FlushOutcome::Flushed);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(saver.saves().len(), 1);
    }

    #[tokio::test]
    async fn only_one_flush_is_in_flight() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("first");

        let background = scheduler.clone();
        let in_flight = tokio::spawn(async move { background.tick().await });
        wait_for_flushing(&scheduler).await;

        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);

        gate.add_permits(1);
        assert_eq!(in_flight.await.unwrap(), FlushOutcome::Flushed);
        assert_eq!(saver.saves().len(), 1);
    }

    #[tokio::test]
    async fn edits_during_flush_stay_dirty() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("first");

        let background = scheduler.clone();
        let in_flight = tokio::spawn(async move { background.tick().await });
        wait_for_flushing(&scheduler).await;
        scheduler.edit("second");

        gate.add_permits(1);
        assert_eq!(in_flight.await.unwrap(), FlushOutcome::Flushed);
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));

        gate.add_permits(1);
        assert_eq!(scheduler.tick().await, FlushOutcome::Flushed);
        let contents: Vec<String> = saver.saves().into_iter().map(|(_, _, c)| c).collect();
        assert_eq!(contents, vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn switching_notes_discards_unsaved_edits() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        assert_eq!(scheduler.open(&note(1, "a")), None);
        scheduler.edit("unsaved");

        let discarded = scheduler.open(&note(2, "b"));

        assert_eq!(
            discarded,
            Some(DiscardedEdit {
                id: NoteId(1),
                title: "Note 1".to_string(),
                content: "unsaved".to_string(),
            })
        );
        assert_eq!(scheduler.open_note(), Some(NoteId(2)));
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);
        assert!(saver.saves().is_empty());
    }

    #[tokio::test]
    async fn flush_finishing_after_switch_leaves_new_note_alone() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("old");

        let background = scheduler.clone();
        let in_flight = tokio::spawn(async move { background.tick().await });
        wait_for_flushing(&scheduler).await;

        scheduler.open(&note(2, "fresh"));
        scheduler.edit("new edit");
        gate.add_permits(1);

        assert_eq!(in_flight.await.unwrap(), FlushOutcome::Superseded);
        assert_eq!(scheduler.open_note(), Some(NoteId(2)));
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));
    }

    #[tokio::test]
    async fn close_drops_the_record() {
        let scheduler = SyncScheduler::new(RecordingSaver::default(), INTERVAL);
        scheduler.open(&note(1, ""));
        assert_eq!(scheduler.close(), None);
        assert_eq!(scheduler.open_note(), None);

        scheduler.open(&note(1, ""));
        scheduler.edit("pending");
        assert!(scheduler.close().is_some());
        assert_eq!(scheduler.tick().await, FlushOutcome::Skipped);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_flushes_once_per_interval() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("typed");

        let task = scheduler.start();

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(saver.saves().is_empty());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(saver.saves().len(), 1);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));

        scheduler.edit("more");
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(saver.saves().len(), 2);

        task.stop();
        scheduler.edit("after stop");
        tokio::time::sleep(INTERVAL * 3).await;
        assert_eq!(saver.saves().len(), 2);
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_task_cancels_loop() {
        let saver = RecordingSaver::default();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("typed");

        drop(scheduler.start());
        tokio::time::sleep(INTERVAL * 2).await;

        assert!(saver.saves().is_empty());
    }

    #[tokio::test]
    async fn cancelled_flush_is_retried_on_next_tick() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("typed");

        let timed_out = tokio::time::timeout(Duration::from_millis(10), scheduler.tick()).await;
        assert!(timed_out.is_err());
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));

        gate.add_permits(1);
        assert_eq!(scheduler.tick().await, FlushOutcome::Flushed);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(
            saver.saves(),
            vec![(NoteId(1), "Note 1".to_string(), "typed".to_string())]
        );
    }

    #[tokio::test]
    async fn cancelled_flush_of_previous_note_leaves_current_flush_alone() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("old");

        let background = scheduler.clone();
        let stale = tokio::spawn(async move { background.tick().await });
        wait_for_flushing(&scheduler).await;

        scheduler.open(&note(2, ""));
        scheduler.edit("new");
        let background = scheduler.clone();
        let current = tokio::spawn(async move { background.tick().await });
        wait_for_flushing(&scheduler).await;

        stale.abort();
        assert!(stale.await.unwrap_err().is_cancelled());
        assert_eq!(scheduler.state(), Some(SyncState::Flushing));

        gate.add_permits(1);
        assert_eq!(current.await.unwrap(), FlushOutcome::Flushed);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
        assert_eq!(
            saver.saves(),
            vec![(NoteId(2), "Note 2".to_string(), "new".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_mid_flush_lets_a_restarted_task_save() {
        let (saver, gate) = RecordingSaver::gated();
        let scheduler = SyncScheduler::new(saver.clone(), INTERVAL);
        scheduler.open(&note(1, ""));
        scheduler.edit("typed");

        let task = scheduler.start();
        tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;
        assert_eq!(scheduler.state(), Some(SyncState::Flushing));

        task.stop();
        while scheduler.state() == Some(SyncState::Flushing) {
            tokio::task::yield_now().await;
        }
        assert_eq!(scheduler.state(), Some(SyncState::Dirty));

        gate.add_permits(1);
        let _task = scheduler.start();
        tokio::time::sleep(INTERVAL + Duration::from_millis(10)).await;

        assert_eq!(saver.saves().len(), 1);
        assert_eq!(scheduler.state(), Some(SyncState::Clean));
    }

    #[tokio::test]
    async fn notes_client_saves_title_and_content() {
        let harness = TestHarness::new();
        harness
            .backend
            .push(json_response(200, &serde_json::json!({"updatedAt": "now"})));
        let scheduler = SyncScheduler::new(NotesClient::new(harness.transport.clone()), INTERVAL);
        scheduler.open(&note(8, ""));
        scheduler.edit("# Heading");

        assert_eq!(scheduler.tick().await, FlushOutcome::Flushed);

        let sent = harness.backend.last_request();
        assert_eq!(sent.method, reqwest::Method::PUT);
        assert_eq!(sent.url, "https://notes.example.com/api/v1/notes/8");
        assert_eq!(
            harness.backend.last_json_body(),
            serde_json::json!({"title": "Note 8", "content": "# Heading"})
        );
    }
}
