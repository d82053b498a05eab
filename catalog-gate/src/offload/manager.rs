use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use catalog_core::{CacheKey, GateLabel};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span, warn};

use super::policy::{OffloadConfig, TimeoutPolicy};
use crate::metrics;

#[derive(Debug)]
struct Running {
    id: u64,
    handle: JoinHandle<()>,
}

impl Running {
    fn is_done(&self) -> bool {
        self.handle.is_finished()
    }
}

#[derive(Debug)]
struct Shared {
    label: GateLabel,
    config: OffloadConfig,
    running: DashMap<CacheKey, Running>,
    next_id: AtomicU64,
    finished: Notify,
}

/// Removes a refresh from the table when its task ends, whether it
/// completed, was aborted or panicked.
struct Finish {
    shared: Arc<Shared>,
    key: CacheKey,
    id: u64,
}

impl Drop for Finish {
    fn drop(&mut self) {
        self.shared
            .running
            .remove_if(&self.key, |_, running| running.id == self.id);
        self.shared.finished.notify_waiters();
    }
}

/// Runs the background refreshes of one gate, at most one per cache key.
///
/// Clones share the same table of running refreshes.
#[derive(Clone, Debug)]
pub struct OffloadManager {
    shared: Arc<Shared>,
}

impl OffloadManager {
    /// Manager for the gate named `label`.
    pub fn new(label: GateLabel, config: OffloadConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                label,
                config,
                running: DashMap::new(),
                next_id: AtomicU64::new(0),
                finished: Notify::new(),
            }),
        }
    }

    /// Spawns `refresh` for `key` on the current tokio runtime.
    ///
    /// With deduplication on, a refresh for a key whose previous refresh is
    /// still running is dropped unpolled. Returns whether `refresh` was
    /// spawned.
    pub fn spawn_with_key<F>(&self, key: CacheKey, refresh: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shared = &self.shared;
        match shared.running.entry(key.clone()) {
            Entry::Occupied(running) if shared.config.deduplicate && !running.get().is_done() => {
                debug!(gate = %shared.label, %key, "Refresh already running, skipped");
                metrics::offload_deduplicated(&shared.label);
                false
            }
            Entry::Occupied(mut finished) => {
                finished.insert(self.spawn(key, refresh));
                true
            }
            Entry::Vacant(vacant) => {
                vacant.insert(self.spawn(key, refresh));
                true
            }
        }
    }

    /// Whether a refresh for `key` is running.
    pub fn is_in_flight(&self, key: &CacheKey) -> bool {
        self.shared
            .running
            .get(key)
            .is_some_and(|running| !running.is_done())
    }

    /// Number of refreshes still running.
    pub fn running(&self) -> usize {
        self.shared
            .running
            .iter()
            .filter(|running| !running.is_done())
            .count()
    }

    /// Aborts every running refresh.
    pub fn cancel_all(&self) {
        let running: Vec<_> = self
            .shared
            .running
            .iter()
            .map(|running| running.handle.abort_handle())
            .collect();
        for handle in running {
            handle.abort();
        }
    }

    /// Resolves once no refresh is running. Meant for tests and shutdown.
    pub async fn wait_all(&self) {
        loop {
            let mut finished = std::pin::pin!(self.shared.finished.notified());
            // Registered before the check so a task ending in between is seen.
            finished.as_mut().enable();

            self.shared.running.retain(|_, running| !running.is_done());
            if self.shared.running.is_empty() {
                return;
            }
            finished.await;
        }
    }

    /// [`wait_all`](Self::wait_all) bounded by `timeout`. Returns `false` on
    /// timeout.
    pub async fn wait_all_timeout(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wait_all()).await.is_ok()
    }

    // Called with the table entry of `key` held: the task cannot remove
    // itself before its handle is stored.
    fn spawn<F>(&self, key: CacheKey, refresh: F) -> Running
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let span = info_span!("gate_refresh", gate = %self.shared.label, %key);
        metrics::offload_spawned(&self.shared.label);
        // Moved into the task so it drops even if the task is never polled.
        let finish = Finish {
            shared: self.shared.clone(),
            key,
            id,
        };

        let handle = tokio::spawn(
            async move {
                let shared = &finish.shared;
                let start = Instant::now();
                run_with_timeout(refresh, shared.config.timeout_policy, &shared.label).await;
                metrics::offload_completed(&shared.label, start.elapsed());
            }
            .instrument(span),
        );

        Running { id, handle }
    }
}

async fn run_with_timeout<F>(refresh: F, policy: TimeoutPolicy, label: &GateLabel)
where
    F: Future<Output = ()>,
{
    match policy {
        TimeoutPolicy::None => refresh.await,
        TimeoutPolicy::Cancel(limit) => {
            if tokio::time::timeout(limit, refresh).await.is_err() {
                warn!(limit_ms = limit.as_millis(), "Refresh timed out and was cancelled");
                metrics::offload_timeout(label);
            }
        }
        TimeoutPolicy::Warn(limit) => {
            let start = Instant::now();
            refresh.await;
            let elapsed = start.elapsed();
            if elapsed > limit {
                warn!(
                    elapsed_ms = elapsed.as_millis(),
                    limit_ms = limit.as_millis(),
                    "Refresh was slow"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn manager(config: OffloadConfig) -> OffloadManager {
        OffloadManager::new(GateLabel::new_static("test"), config)
    }

    #[tokio::test]
    async fn test_one_refresh_per_key() {
        let manager = manager(OffloadConfig::default());
        let key = CacheKey::single("id", "1");
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        assert!(manager.spawn_with_key(key.clone(), async move {
            let _ = wait.await;
        }));
        assert!(
            !manager.spawn_with_key(key.clone(), async {}),
            "second refresh for a running key must be skipped"
        );
        assert!(manager.spawn_with_key(CacheKey::single("id", "2"), async {}));
        assert!(manager.is_in_flight(&key));

        release.send(()).unwrap();
        manager.wait_all().await;
        assert!(!manager.is_in_flight(&key));
        assert_eq!(manager.running(), 0);
    }

    #[tokio::test]
    async fn test_without_deduplication_every_refresh_is_spawned() {
        let manager = manager(OffloadConfig::builder().deduplicate(false).build());
        let key = CacheKey::single("id", "1");
        let (release, wait) = tokio::sync::oneshot::channel::<()>();

        assert!(manager.spawn_with_key(key.clone(), async move {
            let _ = wait.await;
        }));
        assert!(manager.spawn_with_key(key.clone(), async {}));

        release.send(()).unwrap();
        manager.wait_all().await;
        assert_eq!(manager.running(), 0);
    }

    #[tokio::test]
    async fn test_cancel_timeout_aborts_refresh() {
        let manager = manager(
            OffloadConfig::builder()
                .timeout(Duration::from_millis(10))
                .build(),
        );
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();

        manager.spawn_with_key(CacheKey::single("id", "slow"), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(manager.wait_all_timeout(Duration::from_secs(5)).await);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_all_lets_paused_clock_advance() {
        let manager = manager(OffloadConfig::default());
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();

        manager.spawn_with_key(CacheKey::single("id", "slow"), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.wait_all().await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(manager.running(), 0);
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let manager = manager(OffloadConfig::default());
        manager.spawn_with_key(CacheKey::single("id", "1"), std::future::pending());

        manager.cancel_all();
        assert!(manager.wait_all_timeout(Duration::from_secs(5)).await);
    }
}
