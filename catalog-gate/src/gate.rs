//! The memoized call gate.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use catalog_core::{
    CacheKey, CacheState, CallStatus, GateLabel, Producer, SystemTimeProvider, TimeProvider,
};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use tracing::{debug, warn};

use crate::error::GateError;
use crate::key::{JsonKey, KeyError, KeyFn};
use crate::metrics;
use crate::offload::{OffloadConfig, OffloadManager};
use crate::policy::GatePolicy;
use crate::slot::{InFlight, Lookup, Slot};

type Slots<V, E> = DashMap<CacheKey, Slot<V, E>>;

/// Observable state of the entry for a set of arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// A value is cached and no refresh is running.
    Fresh,
    /// A value is cached and a background refresh is running.
    Refreshing,
    /// Nothing usable is cached.
    Evicted,
}

/// Memoizes an expensive producer.
///
/// Calls with equal keys share one cached result for the policy's ttl. Once
/// `ttl * refresh_fraction` has elapsed the cached result is still served
/// while a single background call refreshes it. Concurrent misses on one key
/// share a single producer call. A failed call is never cached: every caller
/// attached to it receives the error and the entry is evicted.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use catalog_gate::{CallStatus, Gate, GatePolicy};
/// use catalog_core::producer_fn;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let gate = Gate::builder(producer_fn(|page: u32| async move {
///     Ok::<_, std::io::Error>(vec![page; 3])
/// }))
/// .label("pages")
/// .policy(GatePolicy::new(Duration::from_secs(60)))
/// .build();
///
/// assert_eq!(gate.call_with_status(1).await.unwrap(), (vec![1, 1, 1], CallStatus::Miss));
/// assert_eq!(gate.call_with_status(1).await.unwrap(), (vec![1, 1, 1], CallStatus::Hit));
/// # }
/// ```
pub struct Gate<Args, P, K = JsonKey>
where
    P: Producer<Args>,
{
    producer: Arc<P>,
    key_fn: K,
    policy: GatePolicy,
    label: GateLabel,
    slots: Arc<Slots<P::Output, P::Error>>,
    offload: OffloadManager,
    time: Arc<dyn TimeProvider>,
    next_id: AtomicU64,
    _args: PhantomData<fn(Args)>,
}

/// Builder for [`Gate`].
pub struct GateBuilder<Args, P, K = JsonKey> {
    producer: P,
    key_fn: K,
    policy: GatePolicy,
    label: GateLabel,
    time: Arc<dyn TimeProvider>,
    offload: OffloadConfig,
    _args: PhantomData<fn(Args)>,
}

impl<Args, P, K> GateBuilder<Args, P, K> {
    /// Use `key_fn` instead of [`JsonKey`].
    pub fn key_fn<K2>(self, key_fn: K2) -> GateBuilder<Args, P, K2> {
        GateBuilder {
            producer: self.producer,
            key_fn,
            policy: self.policy,
            label: self.label,
            time: self.time,
            offload: self.offload,
            _args: PhantomData,
        }
    }

    /// Set the memoization policy.
    pub fn policy(self, policy: GatePolicy) -> Self {
        Self { policy, ..self }
    }

    /// Set the label used as key prefix and in logs and metrics.
    pub fn label(self, label: impl Into<GateLabel>) -> Self {
        Self {
            label: label.into(),
            ..self
        }
    }

    /// Set the clock.
    pub fn time_provider(self, time: impl TimeProvider + 'static) -> Self {
        Self {
            time: Arc::new(time),
            ..self
        }
    }

    /// Set the background refresh configuration.
    pub fn offload(self, offload: OffloadConfig) -> Self {
        Self { offload, ..self }
    }

    /// Build the gate.
    pub fn build(self) -> Gate<Args, P, K>
    where
        P: Producer<Args>,
    {
        Gate {
            producer: Arc::new(self.producer),
            key_fn: self.key_fn,
            policy: self.policy,
            offload: OffloadManager::new(self.label.clone(), self.offload),
            label: self.label,
            slots: Arc::new(DashMap::new()),
            time: self.time,
            next_id: AtomicU64::new(0),
            _args: PhantomData,
        }
    }
}

impl<Args, P> Gate<Args, P, JsonKey>
where
    P: Producer<Args>,
{
    /// Starts building a gate around `producer`.
    pub fn builder(producer: P) -> GateBuilder<Args, P, JsonKey> {
        GateBuilder {
            producer,
            key_fn: JsonKey,
            policy: GatePolicy::default(),
            label: GateLabel::new_static("gate"),
            time: Arc::new(SystemTimeProvider),
            offload: OffloadConfig::default(),
            _args: PhantomData,
        }
    }

    /// Gate keyed by [`JsonKey`] on the system clock.
    pub fn new(producer: P, policy: GatePolicy) -> Self {
        Self::builder(producer).policy(policy).build()
    }
}

impl<Args, P, K> Gate<Args, P, K>
where
    Args: Send + 'static,
    P: Producer<Args>,
    P::Output: Clone + Send + Sync + 'static,
    P::Error: fmt::Display + Send + Sync + 'static,
    K: KeyFn<Args>,
{
    /// Calls the producer through the cache.
    pub async fn call(&self, args: Args) -> Result<P::Output, GateError<P::Error>> {
        self.call_with_status(args).await.map(|(value, _)| value)
    }

    /// Like [`call`](Self::call), also reporting how the call was answered.
    pub async fn call_with_status(
        &self,
        args: Args,
    ) -> Result<(P::Output, CallStatus), GateError<P::Error>> {
        let key = self.key(&args)?;

        let (result, status) = match self.lookup(key.clone(), args) {
            Lookup::Hit(value) => (Ok(value), CallStatus::Hit),
            Lookup::Refresh(value, args) => {
                self.spawn_refresh(key.clone(), args);
                (Ok(value), CallStatus::Stale)
            }
            Lookup::Await(call) => (call.await, CallStatus::Coalesced),
            Lookup::Proceed(call) => (call.await, CallStatus::Miss),
        };

        debug!(gate = %self.label, %key, status = status.as_str(), "Gate call answered");
        metrics::call(&self.label, status);
        result.map(|value| (value, status))
    }

    /// Drops the entry for `args`. Returns whether there was one.
    ///
    /// A call in flight for `args` still answers its attached callers but
    /// its result is not cached.
    pub fn invalidate(&self, args: &Args) -> Result<bool, KeyError> {
        let key = self.key(args)?;
        Ok(self.slots.remove(&key).is_some())
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.slots.clear();
    }

    /// Drops expired entries and returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.time.now();
        let mut purged = 0;
        self.slots.retain(|_, slot| {
            let expired = slot.is_expired(now);
            purged += usize::from(expired);
            !expired
        });
        purged
    }

    /// Number of cached entries, expired ones included until purged.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| entry.cached().is_some())
            .count()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// State of the entry for `args`.
    pub fn entry_state(&self, args: &Args) -> Result<EntryState, KeyError> {
        let key = self.key(args)?;
        let now = self.time.now();

        Ok(match self.slots.get(&key).as_deref() {
            Some(slot @ Slot::Cached { refreshing, .. }) if !slot.is_expired(now) => {
                if *refreshing {
                    EntryState::Refreshing
                } else {
                    EntryState::Fresh
                }
            }
            _ => EntryState::Evicted,
        })
    }

    /// Whether a producer call for `args` is running, in the foreground or
    /// as a background refresh.
    pub fn is_in_flight(&self, args: &Args) -> Result<bool, KeyError> {
        let key = self.key(args)?;
        let pending = self
            .slots
            .get(&key)
            .is_some_and(|slot| matches!(*slot, Slot::Pending { .. }));
        Ok(pending || self.offload.is_in_flight(&key))
    }

    fn key(&self, args: &Args) -> Result<CacheKey, KeyError> {
        let parts = self.key_fn.key(args).inspect_err(|err| {
            warn!(gate = %self.label, error = %err, "Cannot derive cache key");
        })?;
        Ok(CacheKey::new(self.label.as_smol_str().clone(), parts))
    }

    // Everything here runs under the shard lock of `key`.
    fn lookup(&self, key: CacheKey, args: Args) -> Lookup<P::Output, P::Error, Args> {
        let now = self.time.now();

        match self.slots.entry(key) {
            Entry::Occupied(mut occupied) => {
                match occupied.get_mut() {
                    Slot::Pending { call, .. } => return Lookup::Await(call.clone()),
                    Slot::Cached { value, refreshing } => match value.cache_state(now) {
                        CacheState::Actual(value) => return Lookup::Hit(value.data().clone()),
                        CacheState::Stale(value) if *refreshing => {
                            return Lookup::Hit(value.data().clone());
                        }
                        CacheState::Stale(value) => {
                            let data = value.data().clone();
                            *refreshing = true;
                            return Lookup::Refresh(data, args);
                        }
                        CacheState::Expired(_) => {}
                    },
                }
                let (slot, call) = self.start(occupied.key().clone(), args);
                occupied.insert(slot);
                Lookup::Proceed(call)
            }
            Entry::Vacant(vacant) => {
                let (slot, call) = self.start(vacant.key().clone(), args);
                vacant.insert(slot);
                Lookup::Proceed(call)
            }
        }
    }

    /// Creates the shared call for a miss. Settlement happens inside the
    /// shared future, so it runs once no matter which caller polls it.
    fn start(
        &self,
        key: CacheKey,
        args: Args,
    ) -> (
        Slot<P::Output, P::Error>,
        InFlight<P::Output, P::Error>,
    ) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let producer = self.producer.clone();
        let slots = Arc::downgrade(&self.slots);
        let time = self.time.clone();
        let policy = self.policy;
        let label = self.label.clone();

        let call = async move {
            let start = Instant::now();
            let result = producer.call(args).await;
            metrics::producer(&label, start.elapsed(), result.is_err());

            let Some(slots) = slots.upgrade() else {
                return result.map_err(|err| GateError::Producer(Arc::new(err)));
            };

            match result {
                Ok(value) => {
                    let stored = match slots.get_mut(&key) {
                        Some(mut slot) if slot.is_pending(id) => {
                            *slot = Slot::Cached {
                                value: policy.entry(value.clone(), time.now()),
                                refreshing: false,
                            };
                            true
                        }
                        _ => false,
                    };
                    if stored {
                        enforce_capacity(&slots, &policy, &key, &label);
                    }
                    debug!(gate = %label, %key, stored, "Producer settled");
                    Ok(value)
                }
                Err(err) => {
                    slots.remove_if(&key, |_, slot| slot.is_pending(id));
                    warn!(gate = %label, %key, error = %err, "Producer failed, entry evicted");
                    Err(GateError::Producer(Arc::new(err)))
                }
            }
        }
        .boxed()
        .shared();

        (
            Slot::Pending {
                id,
                call: call.clone(),
            },
            call,
        )
    }

    fn spawn_refresh(&self, key: CacheKey, args: Args) {
        let producer = self.producer.clone();
        let time = self.time.clone();
        let policy = self.policy;
        let label = self.label.clone();
        let task_key = key.clone();
        let mut claim = RefreshClaim {
            slots: Arc::downgrade(&self.slots),
            key: key.clone(),
            settled: false,
        };

        let task = async move {
            let start = Instant::now();
            let result = producer.call(args).await;
            metrics::producer(&label, start.elapsed(), result.is_err());
            claim.settled = true;

            let Some(slots) = claim.slots.upgrade() else {
                return;
            };
            let Some(mut slot) = slots.get_mut(&task_key) else {
                debug!(gate = %label, key = %task_key, "Entry dropped during refresh");
                return;
            };
            let Slot::Cached { refreshing, .. } = &mut *slot else {
                debug!(gate = %label, key = %task_key, "Entry replaced during refresh");
                return;
            };
            match result {
                Ok(value) => {
                    *slot = Slot::Cached {
                        value: policy.entry(value, time.now()),
                        refreshing: false,
                    };
                    debug!(gate = %label, key = %task_key, "Entry refreshed");
                }
                Err(err) => {
                    *refreshing = false;
                    warn!(
                        gate = %label,
                        key = %task_key,
                        error = %err,
                        "Background refresh failed, keeping cached value"
                    );
                }
            }
        };

        // A deduplicated task is dropped unpolled and its claim releases the flag.
        self.offload.spawn_with_key(key, task);
    }
}

/// Refresh claim on a cached entry.
///
/// Dropped before the producer settled (deduplicated, timed out, aborted or
/// panicked), it clears the entry's `refreshing` flag so that the next stale
/// read starts a new refresh.
struct RefreshClaim<V, E> {
    slots: Weak<Slots<V, E>>,
    key: CacheKey,
    settled: bool,
}

impl<V, E> Drop for RefreshClaim<V, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Some(slots) = self.slots.upgrade() else {
            return;
        };
        if let Some(mut slot) = slots.get_mut(&self.key) {
            if let Slot::Cached { refreshing, .. } = &mut *slot {
                *refreshing = false;
                debug!(key = %self.key, "Refresh abandoned, entry may be refreshed again");
            }
        }
    }
}

impl<Args, P, K> Gate<Args, P, K>
where
    P: Producer<Args>,
{
    /// The memoization policy.
    pub fn policy(&self) -> &GatePolicy {
        &self.policy
    }

    /// The gate label.
    pub fn label(&self) -> &GateLabel {
        &self.label
    }

    /// The manager running background refreshes.
    pub fn offload(&self) -> &OffloadManager {
        &self.offload
    }

    /// The wrapped producer.
    pub fn producer(&self) -> &P {
        &self.producer
    }
}

fn enforce_capacity<V, E>(
    slots: &Slots<V, E>,
    policy: &GatePolicy,
    keep: &CacheKey,
    label: &GateLabel,
) {
    let Some(max_entries) = policy.max_entries else {
        return;
    };

    loop {
        let cached = slots.iter().filter(|e| e.cached().is_some()).count();
        if cached <= max_entries.get() {
            return;
        }
        let victim = slots
            .iter()
            .filter(|e| e.key() != keep)
            .filter_map(|e| e.cached().map(|value| (e.key().clone(), value.expire())))
            .min_by_key(|(_, expire)| *expire)
            .map(|(key, _)| key);
        let Some(victim) = victim else {
            return;
        };
        if slots
            .remove_if(&victim, |_, slot| slot.cached().is_some())
            .is_some()
        {
            debug!(gate = %label, key = %victim, "Entry evicted, max_entries reached");
            metrics::eviction(label);
        }
    }
}

impl<Args, P, K> Drop for Gate<Args, P, K>
where
    P: Producer<Args>,
{
    fn drop(&mut self) {
        self.offload.cancel_all();
    }
}

impl<Args, P, K> fmt::Debug for Gate<Args, P, K>
where
    P: Producer<Args>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("label", &self.label)
            .field("policy", &self.policy)
            .field("slots", &self.slots.len())
            .field("time", &self.time)
            .finish_non_exhaustive()
    }
}
