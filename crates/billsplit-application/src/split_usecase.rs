//! Split workflow use case.
//!
//! Orchestrates the active session, the allocation engine, persistence,
//! the extraction service, reference sync, and the swipe-delete gesture
//! state. All session mutations run under one state lock and are written
//! through to the repository immediately, one upsert per logical change.

use billsplit_core::error::{BillsplitError, Result};
use billsplit_core::receipt::demo_receipt;
use billsplit_core::session::{SessionManager, SessionRepository, StoredSession};
use billsplit_core::split::SplitSummary;
use billsplit_core::swipe::{MOVED_CLEAR_GRACE, SwipeDeleteController, SwipeOutcome, TapAction};
use billsplit_core::sync::{ReferenceSync, ReferenceUpdate};
use billsplit_extraction::{API_KEY_ENV, ExtractionClient, ReceiptExtractor};
use billsplit_infrastructure::{JsonSessionRepository, load_config};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// How an upload resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The extracted receipt became the active session, with this id
    Loaded(String),
    /// A newer upload started before this one resolved; its result was
    /// discarded without touching session state
    Superseded,
}

/// Active-session state guarded by one lock.
///
/// The reference sync protocol lives next to the manager because its
/// last-known-active-id cache must observe the same sequence of active-id
/// changes the manager produces.
struct ActiveState {
    manager: SessionManager,
    reference_sync: ReferenceSync,
}

/// Use case driving the whole bill-splitting workflow.
///
/// The presentation layer calls these operations; totals are recomputed
/// on every read, and every observable mutation of the active session is
/// persisted before the operation returns.
pub struct SplitUseCase {
    /// Repository for session persistence
    session_repository: Arc<dyn SessionRepository>,
    /// Client for the receipt extraction service
    extractor: Arc<dyn ReceiptExtractor>,
    /// Active session plus reference-sync cache
    state: Mutex<ActiveState>,
    /// Per-row gesture state, shared with spawned grace-delay tasks
    swipes: Arc<Mutex<SwipeDeleteController>>,
    /// Upload generation counter; stale extraction results are discarded
    upload_generation: AtomicU64,
}

impl SplitUseCase {
    /// Creates a use case over the given repository and extractor.
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        extractor: Arc<dyn ReceiptExtractor>,
    ) -> Self {
        Self {
            session_repository,
            extractor,
            state: Mutex::new(ActiveState {
                manager: SessionManager::new(),
                reference_sync: ReferenceSync::new(None),
            }),
            swipes: Arc::new(Mutex::new(SwipeDeleteController::new())),
            upload_generation: AtomicU64::new(0),
        }
    }

    /// Builds the default wiring: the JSON file repository at its
    /// configured (or default) location and the extraction client from
    /// config plus the secret-key environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error when the config file is unreadable, the storage
    /// directory cannot be created, or the extraction client is not fully
    /// configured.
    pub fn try_default() -> Result<Self> {
        let config = load_config()?;

        let repository = match &config.storage_path {
            Some(path) => JsonSessionRepository::new(path),
            None => JsonSessionRepository::default_location(),
        }
        .map_err(|e| BillsplitError::data_access(format!("{e:#}")))?;

        let extractor = match config.extraction {
            Some(extraction) => {
                let api_key = std::env::var(API_KEY_ENV)
                    .map_err(|_| BillsplitError::config(format!("{API_KEY_ENV} not set")))?;
                ExtractionClient::new(extraction.endpoint, api_key)
            }
            None => ExtractionClient::try_from_env()?,
        };

        Ok(Self::new(Arc::new(repository), Arc::new(extractor)))
    }

    // ------------------------------------------------------------------
    // Receipt lifecycle
    // ------------------------------------------------------------------

    /// Loads the built-in demo receipt as a fresh session.
    ///
    /// Always mints a new session id; the demo never overwrites an
    /// unrelated previous session.
    pub async fn load_demo_receipt(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        let id = state.manager.load_receipt(demo_receipt())?.to_string();
        self.persist(&mut state.manager).await?;
        tracing::info!(session_id = %id, "loaded demo receipt");
        Ok(id)
    }

    /// Uploads receipt image bytes for extraction.
    ///
    /// Uploads carry a generation number: if a newer upload starts before
    /// this one resolves, this one's result (success or failure) is
    /// discarded and `Superseded` is returned, so overlapping uploads can
    /// never interleave partial session state.
    ///
    /// # Errors
    ///
    /// Propagates extraction and validation failures for the newest
    /// upload; no partial session is created or persisted on failure.
    pub async fn upload_receipt(&self, jpeg_bytes: &[u8]) -> Result<UploadOutcome> {
        let generation = self.upload_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let result = self.extractor.extract(jpeg_bytes).await;

        // The generation check happens under the state lock: a newer
        // upload bumps the counter before its extraction starts, so once
        // this upload holds the lock a matching generation means nothing
        // newer can commit ahead of it.
        let mut state = self.state.lock().await;
        if self.upload_generation.load(Ordering::SeqCst) != generation {
            tracing::info!(generation, "discarding superseded upload");
            return Ok(UploadOutcome::Superseded);
        }

        let receipt = result?;
        let id = state.manager.load_receipt(receipt)?.to_string();
        self.persist(&mut state.manager).await?;
        tracing::info!(session_id = %id, "uploaded receipt");

        Ok(UploadOutcome::Loaded(id))
    }

    /// Clears the active session. The stored record is untouched; only
    /// the in-memory workflow resets.
    pub async fn reset_all(&self) {
        let mut state = self.state.lock().await;
        state.manager.reset();
        tracing::debug!("reset active session");
    }

    // ------------------------------------------------------------------
    // People and assignments
    // ------------------------------------------------------------------

    /// Appends a blank person entry, returning its index.
    pub async fn add_person(&self) -> Result<usize> {
        let mut state = self.state.lock().await;
        let index = state.manager.add_person();
        self.persist(&mut state.manager).await?;
        Ok(index)
    }

    /// Renames the person at `index`, cascading through assignments.
    pub async fn update_person_name(&self, index: usize, name: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.manager.update_person_name(index, name)?;
        self.persist(&mut state.manager).await
    }

    /// Removes the person at `index`, cascading through assignments.
    pub async fn remove_person(&self, index: usize) -> Result<()> {
        let mut state = self.state.lock().await;
        state.manager.remove_person(index)?;
        self.persist(&mut state.manager).await
    }

    /// Toggles the assignment of an item to a person.
    pub async fn toggle_assignment(&self, item_id: u32, person: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.manager.toggle_assignment(item_id, person)?;
        self.persist(&mut state.manager).await
    }

    /// Computes the current allocation state, `None` without a receipt.
    pub async fn totals(&self) -> Option<SplitSummary> {
        self.state.lock().await.manager.totals()
    }

    /// Returns the active session id, if any.
    pub async fn active_session_id(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .manager
            .session_id()
            .map(str::to_string)
    }

    // ------------------------------------------------------------------
    // Stored sessions
    // ------------------------------------------------------------------

    /// Lists stored sessions, most recently edited first.
    pub async fn list_sessions(&self) -> Result<Vec<StoredSession>> {
        let mut sessions = self
            .session_repository
            .list_all()
            .await
            .map_err(|e| BillsplitError::data_access(format!("{e:#}")))?;
        sessions.sort_by(|a, b| b.last_edited_at.cmp(&a.last_edited_at));
        Ok(sessions)
    }

    /// Loads a stored session as the active one.
    ///
    /// Returns `false` when the id is unknown; the current state is left
    /// untouched.
    pub async fn load_session(&self, session_id: &str) -> Result<bool> {
        let stored = self
            .session_repository
            .find_by_id(session_id)
            .await
            .map_err(|e| BillsplitError::data_access(format!("{e:#}")))?;

        match stored {
            Some(stored) => {
                let mut state = self.state.lock().await;
                state.manager.load_stored(stored);
                tracing::info!(%session_id, "loaded stored session");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Deletes a stored session after the user confirmed the delete
    /// affordance. Resets the active session when it is the one deleted,
    /// and drops the row's gesture state.
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.session_repository
            .delete(session_id)
            .await
            .map_err(|e| BillsplitError::data_access(format!("{e:#}")))?;

        self.swipes.lock().await.remove(session_id);

        let mut state = self.state.lock().await;
        if state.manager.session_id() == Some(session_id) {
            state.manager.reset();
        }

        tracing::info!(%session_id, "deleted session");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reference sync
    // ------------------------------------------------------------------

    /// Reference-to-session direction: reacts to an external reference
    /// change (navigation, deep link).
    ///
    /// Returns `true` when a session was loaded from the reference. A
    /// reference naming an unknown id is silently ignored, as is the one
    /// cycle that follows an application-initiated reset.
    pub async fn handle_reference_change(&self, reference: Option<&str>) -> Result<bool> {
        let mut state = self.state.lock().await;
        let active = state.manager.session_id().map(str::to_string);

        let Some(target) = state
            .reference_sync
            .observe_reference(reference, active.as_deref())
        else {
            return Ok(false);
        };

        let stored = self
            .session_repository
            .find_by_id(&target)
            .await
            .map_err(|e| BillsplitError::data_access(format!("{e:#}")))?;

        match stored {
            Some(stored) => {
                state.manager.load_stored(stored);
                tracing::info!(session_id = %target, "restored session from reference");
                Ok(true)
            }
            None => {
                tracing::debug!(session_id = %target, "ignoring stale reference");
                Ok(false)
            }
        }
    }

    /// Session-to-reference direction: the update the caller should apply
    /// to the external reference so it matches the active session id, or
    /// `None` when they already agree.
    pub async fn reference_update(&self, reference: Option<&str>) -> Option<ReferenceUpdate> {
        let state = self.state.lock().await;
        ReferenceSync::reconcile_reference(state.manager.session_id(), reference)
    }

    // ------------------------------------------------------------------
    // Swipe gestures
    // ------------------------------------------------------------------

    /// Begins a drag on a stored-session row. Both touch and left-button
    /// mouse input feed this same operation.
    pub async fn swipe_start(&self, session_id: &str, pointer_x: f32) {
        self.swipes.lock().await.start(session_id, pointer_x);
    }

    /// Tracks pointer movement during a drag.
    pub async fn swipe_drag(&self, session_id: &str, pointer_x: f32) {
        self.swipes.lock().await.drag(session_id, pointer_x);
    }

    /// Ends a drag, snapping the row open or closed.
    ///
    /// A snap-close schedules a grace-delay task to clear the row's
    /// `moved` flag; a gesture that starts before the task fires takes
    /// precedence over it.
    pub async fn swipe_end(&self, session_id: &str) {
        let outcome = self.swipes.lock().await.end(session_id);

        if let SwipeOutcome::Closed { grace_seq } = outcome {
            let swipes = Arc::clone(&self.swipes);
            let id = session_id.to_string();
            tokio::spawn(async move {
                tokio::time::sleep(MOVED_CLEAR_GRACE).await;
                swipes.lock().await.clear_moved(&id, grace_seq);
            });
        }
    }

    /// Handles a tap on a stored-session row.
    ///
    /// A tap trailing a drag is ignored; at rest, a closed row loads the
    /// session and an open row collapses every open row.
    pub async fn row_tap(&self, session_id: &str) -> Result<TapAction> {
        let action = self.swipes.lock().await.tap(session_id);

        match action {
            TapAction::Activate => {
                self.load_session(session_id).await?;
            }
            TapAction::Collapse => self.swipes.lock().await.clear_all(),
            TapAction::Ignore => {}
        }

        Ok(action)
    }

    /// Returns a row's current swipe offset for rendering.
    pub async fn row_offset(&self, session_id: &str) -> f32 {
        self.swipes.lock().await.offset(session_id)
    }

    /// Resets every row to closed; called on any interaction outside the
    /// row list.
    pub async fn clear_swipes(&self) {
        self.swipes.lock().await.clear_all();
    }

    async fn persist(&self, manager: &mut SessionManager) -> Result<()> {
        let Some(snapshot) = manager.snapshot() else {
            return Ok(());
        };

        self.session_repository
            .upsert(&snapshot)
            .await
            .map_err(|e| BillsplitError::data_access(format!("{e:#}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use billsplit_core::receipt::Receipt;
    use billsplit_core::split::ASSIGNMENT_EPSILON;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    struct MockRepository {
        sessions: StdMutex<Vec<StoredSession>>,
    }

    impl MockRepository {
        fn new() -> Self {
            Self {
                sessions: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SessionRepository for MockRepository {
        async fn upsert(&self, session: &StoredSession) -> anyhow::Result<()> {
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.iter().position(|s| s.id == session.id) {
                Some(index) => sessions[index] = session.clone(),
                None => sessions.push(session.clone()),
            }
            Ok(())
        }

        async fn find_by_id(&self, session_id: &str) -> anyhow::Result<Option<StoredSession>> {
            let sessions = self.sessions.lock().unwrap();
            Ok(sessions.iter().find(|s| s.id == session_id).cloned())
        }

        async fn list_all(&self) -> anyhow::Result<Vec<StoredSession>> {
            Ok(self.sessions.lock().unwrap().clone())
        }

        async fn delete(&self, session_id: &str) -> anyhow::Result<()> {
            self.sessions.lock().unwrap().retain(|s| s.id != session_id);
            Ok(())
        }
    }

    struct MockExtractor {
        receipt: Receipt,
        delay: Duration,
    }

    #[async_trait]
    impl ReceiptExtractor for MockExtractor {
        async fn extract(&self, _jpeg_bytes: &[u8]) -> billsplit_core::error::Result<Receipt> {
            tokio::time::sleep(self.delay).await;
            Ok(self.receipt.clone())
        }
    }

    /// Extractor whose calls take per-call delays, in call order.
    struct SequencedExtractor {
        receipt: Receipt,
        delays: StdMutex<Vec<Duration>>,
    }

    #[async_trait]
    impl ReceiptExtractor for SequencedExtractor {
        async fn extract(&self, _jpeg_bytes: &[u8]) -> billsplit_core::error::Result<Receipt> {
            let delay = {
                let mut delays = self.delays.lock().unwrap();
                if delays.is_empty() {
                    Duration::ZERO
                } else {
                    delays.remove(0)
                }
            };
            tokio::time::sleep(delay).await;
            Ok(self.receipt.clone())
        }
    }

    fn usecase() -> Arc<SplitUseCase> {
        usecase_with_delay(Duration::ZERO)
    }

    fn usecase_with_delay(delay: Duration) -> Arc<SplitUseCase> {
        Arc::new(SplitUseCase::new(
            Arc::new(MockRepository::new()),
            Arc::new(MockExtractor {
                receipt: demo_receipt(),
                delay,
            }),
        ))
    }

    async fn demo_with_people(usecase: &SplitUseCase, names: &[&str]) -> String {
        let id = usecase.load_demo_receipt().await.unwrap();
        for (index, name) in names.iter().enumerate() {
            usecase.add_person().await.unwrap();
            usecase.update_person_name(index, name).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn test_every_mutation_writes_through() {
        let usecase = usecase();
        let id = demo_with_people(&usecase, &["Al"]).await;
        usecase.toggle_assignment(1, "Al").await.unwrap();

        let stored = usecase.list_sessions().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
        assert!(stored[0].assignments.contains(1, "Al"));
        assert_eq!(stored[0].people, ["Al"]);
    }

    #[tokio::test]
    async fn test_new_receipt_never_overwrites_previous_session() {
        let usecase = usecase();
        let first = usecase.load_demo_receipt().await.unwrap();
        let second = usecase.load_demo_receipt().await.unwrap();

        assert_ne!(first, second);
        assert_eq!(usecase.list_sessions().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_upload_loads_extracted_receipt() {
        let usecase = usecase();
        let outcome = usecase.upload_receipt(b"jpeg").await.unwrap();

        let UploadOutcome::Loaded(id) = outcome else {
            panic!("expected loaded outcome");
        };
        assert_eq!(usecase.active_session_id().await, Some(id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_upload_is_superseded() {
        let usecase = usecase_with_delay(Duration::from_millis(100));

        let slow = {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move { usecase.upload_receipt(b"first").await })
        };
        tokio::task::yield_now().await;

        // Second upload starts while the first is still in flight. Its
        // mock resolves after the same delay, but by then it is the
        // newest generation.
        let fast = {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move { usecase.upload_receipt(b"second").await })
        };
        tokio::task::yield_now().await;

        let slow_outcome = slow.await.unwrap().unwrap();
        let fast_outcome = fast.await.unwrap().unwrap();

        assert_eq!(slow_outcome, UploadOutcome::Superseded);
        assert!(matches!(fast_outcome, UploadOutcome::Loaded(_)));
        assert_eq!(usecase.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_upload_cannot_overwrite_committed_newer_one() {
        // First upload resolves slowly, second quickly: the newer upload
        // has fully committed by the time the stale one wakes up, and the
        // stale one must leave that committed session alone.
        let usecase = Arc::new(SplitUseCase::new(
            Arc::new(MockRepository::new()),
            Arc::new(SequencedExtractor {
                receipt: demo_receipt(),
                delays: StdMutex::new(vec![
                    Duration::from_millis(100),
                    Duration::from_millis(10),
                ]),
            }),
        ));

        let slow = {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move { usecase.upload_receipt(b"first").await })
        };
        tokio::task::yield_now().await;

        let fast = {
            let usecase = Arc::clone(&usecase);
            tokio::spawn(async move { usecase.upload_receipt(b"second").await })
        };

        let slow_outcome = slow.await.unwrap().unwrap();
        let fast_outcome = fast.await.unwrap().unwrap();

        assert_eq!(slow_outcome, UploadOutcome::Superseded);
        let UploadOutcome::Loaded(fast_id) = fast_outcome else {
            panic!("expected loaded outcome");
        };
        assert_eq!(usecase.active_session_id().await, Some(fast_id));
        assert_eq!(usecase.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_demo_split() {
        let usecase = usecase();
        demo_with_people(&usecase, &["Al", "Bo"]).await;

        for (item, person) in [(1, "Al"), (2, "Bo"), (3, "Al"), (4, "Bo"), (5, "Al"), (5, "Bo")] {
            usecase.toggle_assignment(item, person).await.unwrap();
        }

        let summary = usecase.totals().await.unwrap();
        assert!(summary.is_fully_assigned);
        assert!((summary.assigned_total - 36.56).abs() < ASSIGNMENT_EPSILON);
        assert!((summary.totals["Al"].total - 17.28).abs() < 0.01);
        assert!((summary.totals["Bo"].total - 19.28).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_delete_active_session_resets_workflow() {
        let usecase = usecase();
        let id = demo_with_people(&usecase, &["Al"]).await;

        usecase.delete_session(&id).await.unwrap();

        assert_eq!(usecase.active_session_id().await, None);
        assert!(usecase.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_other_session_keeps_active() {
        let usecase = usecase();
        let first = usecase.load_demo_receipt().await.unwrap();
        let second = usecase.load_demo_receipt().await.unwrap();

        usecase.delete_session(&first).await.unwrap();

        assert_eq!(usecase.active_session_id().await, Some(second));
    }

    #[tokio::test]
    async fn test_reference_change_restores_session() {
        let usecase = usecase();
        let id = demo_with_people(&usecase, &["Al"]).await;
        usecase.reset_all().await;

        // One cycle of suppression right after the reset.
        assert!(!usecase.handle_reference_change(Some(&id)).await.unwrap());
        // The next observation of the same reference loads the session.
        assert!(usecase.handle_reference_change(Some(&id)).await.unwrap());
        assert_eq!(usecase.active_session_id().await, Some(id));
    }

    #[tokio::test]
    async fn test_stale_reference_is_ignored() {
        let usecase = usecase();
        assert!(!usecase.handle_reference_change(Some("missing")).await.unwrap());
        assert_eq!(usecase.active_session_id().await, None);
    }

    #[tokio::test]
    async fn test_reference_update_follows_active_id() {
        let usecase = usecase();
        assert_eq!(usecase.reference_update(None).await, None);

        let id = usecase.load_demo_receipt().await.unwrap();
        assert_eq!(
            usecase.reference_update(None).await,
            Some(ReferenceUpdate::Set(id.clone()))
        );
        assert_eq!(usecase.reference_update(Some(&id)).await, None);

        usecase.reset_all().await;
        assert_eq!(
            usecase.reference_update(Some(&id)).await,
            Some(ReferenceUpdate::Clear)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_row_tap_after_cancelled_drag_activates_session() {
        let usecase = usecase();
        let id = usecase.load_demo_receipt().await.unwrap();
        usecase.reset_all().await;

        // A short drag snaps closed; the trailing tap is suppressed.
        usecase.swipe_start(&id, 200.0).await;
        usecase.swipe_drag(&id, 180.0).await;
        usecase.swipe_end(&id).await;
        assert_eq!(usecase.row_tap(&id).await.unwrap(), TapAction::Ignore);

        // After the grace delay a genuine tap loads the session again.
        tokio::time::sleep(MOVED_CLEAR_GRACE * 2).await;
        assert_eq!(usecase.row_tap(&id).await.unwrap(), TapAction::Activate);
        assert_eq!(usecase.active_session_id().await, Some(id));
    }

    #[tokio::test]
    async fn test_open_row_tap_collapses_without_activating() {
        let usecase = usecase();
        let id = usecase.load_demo_receipt().await.unwrap();
        usecase.reset_all().await;

        usecase.swipe_start(&id, 200.0).await;
        usecase.swipe_drag(&id, 110.0).await;
        usecase.swipe_end(&id).await;
        assert_eq!(usecase.row_offset(&id).await, 80.0);

        // The click ending the drag is suppressed; the next tap collapses.
        assert_eq!(usecase.row_tap(&id).await.unwrap(), TapAction::Ignore);
        assert_eq!(usecase.row_tap(&id).await.unwrap(), TapAction::Collapse);
        assert_eq!(usecase.row_offset(&id).await, 0.0);
        assert_eq!(usecase.active_session_id().await, None);
    }

    #[tokio::test]
    async fn test_list_sessions_sorted_by_last_edit() {
        let usecase = usecase();
        let first = usecase.load_demo_receipt().await.unwrap();
        let second = usecase.load_demo_receipt().await.unwrap();

        // Editing the first session bumps it above the second.
        let mut sessions = usecase.list_sessions().await.unwrap();
        let mut stored = sessions.iter_mut().find(|s| s.id == first).unwrap().clone();
        stored.last_edited_at += 10_000;
        usecase.session_repository.upsert(&stored).await.unwrap();

        let sorted = usecase.list_sessions().await.unwrap();
        assert_eq!(sorted[0].id, first);
        assert_eq!(sorted[1].id, second);
    }
}
