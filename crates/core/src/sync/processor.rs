//! Background sync processor: drains the outbox to the remote backend in
//! strict FIFO order while enabled and online.

use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, warn};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

use super::{
    backoff_seconds, ConnectivityMonitor, OutboxRepositoryTrait, SyncBackendClient, SyncStatus,
};
use crate::errors::Result;

#[derive(Debug, Clone)]
pub struct SyncProcessorOptions {
    /// Cadence between drain passes while online with an empty queue.
    pub drain_interval_secs: u64,
    /// Shortened recheck delay while entries remain pending.
    pub pending_recheck_secs: u64,
    /// Maximum entries pulled per pass.
    pub drain_batch_limit: i64,
    /// Attempts after which an entry counts as stuck in `SyncStatus`.
    pub stuck_attempts_threshold: i32,
}

impl Default for SyncProcessorOptions {
    fn default() -> Self {
        Self {
            drain_interval_secs: 45,
            pending_recheck_secs: 2,
            drain_batch_limit: 500,
            stuck_attempts_threshold: 10,
        }
    }
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainStatus {
    /// Nothing was pending.
    Empty,
    /// Every pending entry was delivered.
    Drained,
    /// A delivery failed; the pass halted to preserve ordering.
    Failed,
    /// Connectivity dropped mid-pass.
    WentOffline,
    /// The processor was disabled mid-pass.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainPassResult {
    pub status: DrainStatus,
    pub delivered: usize,
    pub queue_length: i64,
}

struct ProcessorShared {
    outbox: Arc<dyn OutboxRepositoryTrait>,
    backend: Arc<dyn SyncBackendClient>,
    online_rx: watch::Receiver<bool>,
    enabled: AtomicBool,
    is_syncing: AtomicBool,
    consecutive_failures: AtomicI32,
    last_error: Mutex<Option<String>>,
    wake: Notify,
    /// Serializes drain passes; a manual drain never overlaps the loop's.
    drain_lock: tokio::sync::Mutex<()>,
    options: SyncProcessorOptions,
}

/// Replays locally committed writes to the remote backend.
///
/// One entry at a time, oldest first; a failed delivery halts the pass so
/// dependent writes (a set log referencing a not-yet-synced session) are
/// never applied out of order. Failures are recorded on the entry and
/// retried on later passes indefinitely.
pub struct SyncProcessor {
    shared: Arc<ProcessorShared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncProcessor {
    pub fn new(
        outbox: Arc<dyn OutboxRepositoryTrait>,
        backend: Arc<dyn SyncBackendClient>,
        connectivity: &ConnectivityMonitor,
        options: SyncProcessorOptions,
    ) -> Self {
        Self {
            shared: Arc::new(ProcessorShared {
                outbox,
                backend,
                online_rx: connectivity.subscribe(),
                enabled: AtomicBool::new(true),
                is_syncing: AtomicBool::new(false),
                consecutive_failures: AtomicI32::new(0),
                last_error: Mutex::new(None),
                wake: Notify::new(),
                drain_lock: tokio::sync::Mutex::new(()),
                options,
            }),
            task: Mutex::new(None),
        }
    }

    /// Spawns the background loop. A second call while the loop is alive is
    /// a no-op.
    pub fn start(&self) {
        let mut guard = self.task.lock().unwrap();
        if let Some(handle) = guard.as_ref() {
            if !handle.is_finished() {
                return;
            }
        }
        let shared = Arc::clone(&self.shared);
        *guard = Some(tokio::spawn(Self::run_loop(shared)));
    }

    pub fn stop(&self) {
        if let Some(handle) = self.task.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Gates the loop without tearing it down. Disabling stops new remote
    /// calls promptly; an in-flight call is left to finish or fail.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.enabled.store(enabled, Ordering::SeqCst);
        if enabled {
            self.shared.wake.notify_one();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.shared.enabled.load(Ordering::SeqCst)
    }

    /// Nudges the loop out of its wait, e.g. right after a local mutation
    /// was enqueued.
    pub fn request_drain(&self) {
        self.shared.wake.notify_one();
    }

    /// Runs one drain pass now, independent of the background cadence.
    pub async fn run_drain_pass(&self) -> Result<DrainPassResult> {
        Self::drain_pass(&self.shared).await
    }

    pub fn status(&self) -> Result<SyncStatus> {
        Ok(SyncStatus {
            is_syncing: self.shared.is_syncing.load(Ordering::SeqCst),
            is_online: *self.shared.online_rx.borrow(),
            queue_length: self.shared.outbox.count_pending()?,
            consecutive_failures: self.shared.consecutive_failures.load(Ordering::SeqCst),
            last_error: self.shared.last_error.lock().unwrap().clone(),
            stuck_count: self
                .shared
                .outbox
                .count_stuck(self.shared.options.stuck_attempts_threshold)?,
        })
    }

    async fn run_loop(shared: Arc<ProcessorShared>) {
        let mut online_rx = shared.online_rx.clone();
        loop {
            // Idle until enabled and online.
            while !(shared.enabled.load(Ordering::SeqCst) && *online_rx.borrow_and_update()) {
                tokio::select! {
                    changed = online_rx.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = shared.wake.notified() => {}
                }
            }

            let pass = Self::drain_pass(&shared).await;

            let mut delay_secs = match &pass {
                Ok(result) => match result.status {
                    DrainStatus::Failed => {
                        backoff_seconds(shared.consecutive_failures.load(Ordering::SeqCst)).max(1)
                            as u64
                    }
                    _ => shared.options.drain_interval_secs,
                },
                Err(err) => {
                    warn!("Sync drain pass errored locally: {err}");
                    shared.options.drain_interval_secs
                }
            };

            // Entries already waiting (enqueued mid-pass) shorten the wait,
            // unless we are backing off after a failure.
            let failed = matches!(&pass, Ok(r) if r.status == DrainStatus::Failed);
            if !failed {
                if let Ok(pending) = shared.outbox.count_pending() {
                    if pending > 0 {
                        delay_secs = delay_secs.min(shared.options.pending_recheck_secs);
                    }
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(delay_secs)) => {}
                changed = online_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = shared.wake.notified() => {}
            }
        }
    }

    async fn drain_pass(shared: &ProcessorShared) -> Result<DrainPassResult> {
        let _pass_guard = shared.drain_lock.lock().await;
        shared.is_syncing.store(true, Ordering::SeqCst);
        let result = Self::drain_inner(shared).await;
        shared.is_syncing.store(false, Ordering::SeqCst);

        match &result {
            Ok(pass) => match pass.status {
                DrainStatus::Empty | DrainStatus::Drained => {
                    shared.consecutive_failures.store(0, Ordering::SeqCst);
                    *shared.last_error.lock().unwrap() = None;
                    let _ = shared.outbox.mark_drain_outcome("ok".to_string(), None).await;
                }
                DrainStatus::Failed => {
                    shared.consecutive_failures.fetch_add(1, Ordering::SeqCst);
                    let error = shared.last_error.lock().unwrap().clone();
                    let _ = shared
                        .outbox
                        .mark_drain_outcome("error".to_string(), error)
                        .await;
                }
                DrainStatus::WentOffline => {
                    let error = shared.last_error.lock().unwrap().clone();
                    let _ = shared
                        .outbox
                        .mark_drain_outcome("offline".to_string(), error)
                        .await;
                }
                DrainStatus::Disabled => {}
            },
            Err(err) => {
                let _ = shared
                    .outbox
                    .mark_drain_outcome("error".to_string(), Some(err.to_string()))
                    .await;
            }
        }

        result
    }

    async fn drain_inner(shared: &ProcessorShared) -> Result<DrainPassResult> {
        let pending = shared.outbox.list_pending(shared.options.drain_batch_limit)?;
        if pending.is_empty() {
            return Ok(DrainPassResult {
                status: DrainStatus::Empty,
                delivered: 0,
                queue_length: 0,
            });
        }

        let mut online_rx = shared.online_rx.clone();
        let mut delivered = 0usize;
        for entry in pending {
            if !shared.enabled.load(Ordering::SeqCst) {
                return Ok(DrainPassResult {
                    status: DrainStatus::Disabled,
                    delivered,
                    queue_length: shared.outbox.count_pending()?,
                });
            }
            if !*online_rx.borrow_and_update() {
                return Ok(DrainPassResult {
                    status: DrainStatus::WentOffline,
                    delivered,
                    queue_length: shared.outbox.count_pending()?,
                });
            }

            let delivery = tokio::select! {
                result = shared.backend.apply_mutation(&entry) => Some(result),
                _ = wait_until_offline(&mut online_rx) => None,
            };

            match delivery {
                None => {
                    // Aborted mid-call: counts as a failed attempt for the
                    // entry, which stays queued at its position.
                    let message = "Connectivity lost during delivery".to_string();
                    warn!(
                        "Sync delivery aborted offline for outbox entry {}",
                        entry.id
                    );
                    shared.outbox.record_failure(entry.id, message.clone()).await?;
                    *shared.last_error.lock().unwrap() = Some(message);
                    return Ok(DrainPassResult {
                        status: DrainStatus::WentOffline,
                        delivered,
                        queue_length: shared.outbox.count_pending()?,
                    });
                }
                Some(Ok(())) => {
                    debug!(
                        "Delivered outbox entry {} ({:?} {:?} {})",
                        entry.id, entry.op, entry.entity, entry.entity_id
                    );
                    shared.outbox.remove(entry.id).await?;
                    delivered += 1;
                }
                Some(Err(err)) => {
                    warn!(
                        "Sync delivery failed for outbox entry {} ({:?}): {}",
                        entry.id, err.class, err.message
                    );
                    shared
                        .outbox
                        .record_failure(entry.id, err.message.clone())
                        .await?;
                    *shared.last_error.lock().unwrap() = Some(err.message);
                    return Ok(DrainPassResult {
                        status: DrainStatus::Failed,
                        delivered,
                        queue_length: shared.outbox.count_pending()?,
                    });
                }
            }
        }

        Ok(DrainPassResult {
            status: DrainStatus::Drained,
            delivered,
            queue_length: shared.outbox.count_pending()?,
        })
    }
}

async fn wait_until_offline(online_rx: &mut watch::Receiver<bool>) {
    if online_rx.wait_for(|online| !*online).await.is_err() {
        // Monitor dropped; park so the delivery future wins the race.
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::{
        NewOutboxEntry, OutboxEntry, SyncApplyError, SyncEngineState, SyncEntity, SyncOperation,
        SyncRetryClass,
    };
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::AtomicI64;

    struct MemoryOutbox {
        entries: Mutex<Vec<OutboxEntry>>,
        next_id: AtomicI64,
        state: Mutex<SyncEngineState>,
    }

    impl MemoryOutbox {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                next_id: AtomicI64::new(1),
                state: Mutex::new(SyncEngineState::default()),
            }
        }

        fn entry_ids(&self) -> Vec<String> {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .map(|entry| entry.entity_id.clone())
                .collect()
        }

        fn attempts_of(&self, entity_id: &str) -> i32 {
            self.entries
                .lock()
                .unwrap()
                .iter()
                .find(|entry| entry.entity_id == entity_id)
                .map(|entry| entry.attempts)
                .unwrap_or(0)
        }
    }

    #[async_trait]
    impl OutboxRepositoryTrait for MemoryOutbox {
        async fn add(&self, entry: NewOutboxEntry) -> Result<i64> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.entries.lock().unwrap().push(OutboxEntry {
                id,
                entity: entry.entity,
                entity_id: entry.entity_id,
                op: entry.op,
                payload: entry.payload.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                attempts: 0,
                last_error: None,
            });
            Ok(id)
        }

        fn list_pending(&self, limit: i64) -> Result<Vec<OutboxEntry>> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .take(limit as usize)
                .cloned()
                .collect())
        }

        fn count_pending(&self) -> Result<i64> {
            Ok(self.entries.lock().unwrap().len() as i64)
        }

        fn count_stuck(&self, attempts_threshold: i32) -> Result<i64> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| entry.attempts >= attempts_threshold)
                .count() as i64)
        }

        async fn remove(&self, entry_id: i64) -> Result<()> {
            self.entries
                .lock()
                .unwrap()
                .retain(|entry| entry.id != entry_id);
            Ok(())
        }

        async fn record_failure(&self, entry_id: i64, message: String) -> Result<()> {
            if let Some(entry) = self
                .entries
                .lock()
                .unwrap()
                .iter_mut()
                .find(|entry| entry.id == entry_id)
            {
                entry.attempts += 1;
                entry.last_error = Some(message);
            }
            Ok(())
        }

        async fn clear(&self) -> Result<usize> {
            let mut entries = self.entries.lock().unwrap();
            let removed = entries.len();
            entries.clear();
            Ok(removed)
        }

        fn engine_state(&self) -> Result<SyncEngineState> {
            Ok(self.state.lock().unwrap().clone())
        }

        async fn mark_drain_outcome(&self, status: String, error: Option<String>) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.last_drain_status = Some(status);
            state.last_error = error;
            Ok(())
        }
    }

    struct ScriptedBackend {
        failing: Mutex<HashSet<String>>,
        hanging: Mutex<HashSet<String>>,
        delivered: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                failing: Mutex::new(HashSet::new()),
                hanging: Mutex::new(HashSet::new()),
                delivered: Mutex::new(Vec::new()),
            }
        }

        fn fail_on(&self, entity_id: &str) {
            self.failing.lock().unwrap().insert(entity_id.to_string());
        }

        fn recover(&self, entity_id: &str) {
            self.failing.lock().unwrap().remove(entity_id);
        }

        fn hang_on(&self, entity_id: &str) {
            self.hanging.lock().unwrap().insert(entity_id.to_string());
        }
    }

    #[async_trait]
    impl SyncBackendClient for ScriptedBackend {
        async fn apply_mutation(
            &self,
            entry: &OutboxEntry,
        ) -> std::result::Result<(), SyncApplyError> {
            if self.hanging.lock().unwrap().contains(&entry.entity_id) {
                std::future::pending::<()>().await;
            }
            if self.failing.lock().unwrap().contains(&entry.entity_id) {
                return Err(SyncApplyError::new(
                    format!("remote rejected {}", entry.entity_id),
                    SyncRetryClass::Retryable,
                ));
            }
            self.delivered.lock().unwrap().push(entry.entity_id.clone());
            Ok(())
        }
    }

    fn entry(entity_id: &str) -> NewOutboxEntry {
        NewOutboxEntry::new(
            SyncEntity::WorkoutSession,
            entity_id,
            SyncOperation::Create,
            serde_json::json!({ "id": entity_id }),
        )
    }

    struct Fixture {
        outbox: Arc<MemoryOutbox>,
        backend: Arc<ScriptedBackend>,
        monitor: ConnectivityMonitor,
        processor: SyncProcessor,
    }

    fn fixture(online: bool) -> Fixture {
        let outbox = Arc::new(MemoryOutbox::new());
        let backend = Arc::new(ScriptedBackend::new());
        let monitor = ConnectivityMonitor::new(online);
        let processor = SyncProcessor::new(
            outbox.clone(),
            backend.clone(),
            &monitor,
            SyncProcessorOptions {
                drain_interval_secs: 1,
                pending_recheck_secs: 1,
                ..SyncProcessorOptions::default()
            },
        );
        Fixture {
            outbox,
            backend,
            monitor,
            processor,
        }
    }

    #[tokio::test]
    async fn drains_to_empty_in_fifo_order() {
        let f = fixture(true);
        for id in ["a", "b", "c"] {
            f.outbox.add(entry(id)).await.unwrap();
        }

        let pass = f.processor.run_drain_pass().await.unwrap();

        assert_eq!(pass.status, DrainStatus::Drained);
        assert_eq!(pass.delivered, 3);
        assert_eq!(pass.queue_length, 0);
        assert_eq!(*f.backend.delivered.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(f.processor.status().unwrap().queue_length, 0);
    }

    #[tokio::test]
    async fn failure_halts_pass_and_retains_position() {
        let f = fixture(true);
        for id in ["a", "b", "c"] {
            f.outbox.add(entry(id)).await.unwrap();
        }
        f.backend.fail_on("b");

        let pass = f.processor.run_drain_pass().await.unwrap();
        assert_eq!(pass.status, DrainStatus::Failed);
        assert_eq!(pass.delivered, 1);
        assert_eq!(f.outbox.entry_ids(), vec!["b", "c"]);
        assert_eq!(f.outbox.attempts_of("b"), 1);
        assert_eq!(f.processor.status().unwrap().consecutive_failures, 1);

        // Next pass retries from the head; "c" was never skipped ahead.
        f.backend.recover("b");
        let pass = f.processor.run_drain_pass().await.unwrap();
        assert_eq!(pass.status, DrainStatus::Drained);
        assert_eq!(*f.backend.delivered.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(f.processor.status().unwrap().consecutive_failures, 0);
    }

    #[tokio::test]
    async fn going_offline_mid_call_records_failure_and_aborts() {
        let f = fixture(true);
        for id in ["a", "b", "c"] {
            f.outbox.add(entry(id)).await.unwrap();
        }
        f.backend.hang_on("b");

        let drain = f.processor.run_drain_pass();
        let flip_offline = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            f.monitor.set_online(false);
        };
        let (pass, ()) = tokio::join!(drain, flip_offline);
        let pass = pass.unwrap();

        assert_eq!(pass.status, DrainStatus::WentOffline);
        assert_eq!(pass.delivered, 1);
        assert_eq!(f.outbox.entry_ids(), vec!["b", "c"]);
        assert_eq!(f.outbox.attempts_of("b"), 1);
    }

    #[tokio::test]
    async fn disabled_processor_does_not_issue_calls() {
        let f = fixture(true);
        f.outbox.add(entry("a")).await.unwrap();
        f.processor.set_enabled(false);

        let pass = f.processor.run_drain_pass().await.unwrap();
        assert_eq!(pass.status, DrainStatus::Disabled);
        assert!(f.backend.delivered.lock().unwrap().is_empty());
        assert_eq!(f.processor.status().unwrap().queue_length, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn background_loop_drains_after_reconnect() {
        let f = fixture(false);
        for id in ["a", "b"] {
            f.outbox.add(entry(id)).await.unwrap();
        }
        f.processor.start();

        // Offline: nothing moves.
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(f.processor.status().unwrap().queue_length, 2);

        f.monitor.set_online(true);
        for _ in 0..50 {
            if f.processor.status().unwrap().queue_length == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(f.processor.status().unwrap().queue_length, 0);
        assert_eq!(*f.backend.delivered.lock().unwrap(), vec!["a", "b"]);
        f.processor.stop();
    }
}
