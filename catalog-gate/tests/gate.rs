use std::io;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use catalog_core::KeyPart;
use catalog_core::time::MockTimeProvider;
use catalog_gate::offload::OffloadConfig;
use catalog_gate::{
    CallStatus, EntryState, Gate, GateError, GatePolicy, KeyError, Producer, RefreshFraction,
    producer_fn,
};
use pretty_assertions::assert_eq;

const TTL: Duration = Duration::from_secs(60);

/// Producer counting its invocations and answering `"{n}#{invocation}"`.
///
/// Invocations listed in `failing` return an error instead.
fn counting(
    delay: Option<Duration>,
    failing: &'static [usize],
) -> (
    impl Producer<u32, Output = String, Error = io::Error>,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let producer = producer_fn(move |n: u32| {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if failing.contains(&call) {
                Err(io::Error::other(format!("call {call} failed")))
            } else {
                Ok(format!("{n}#{call}"))
            }
        }
    });
    (producer, calls)
}

fn mocked_gate<P>(producer: P, clock: &MockTimeProvider) -> Gate<u32, P>
where
    P: Producer<u32>,
{
    Gate::builder(producer)
        .label("test")
        .policy(GatePolicy::new(TTL))
        .time_provider(clock.clone())
        .build()
}

#[tokio::test]
async fn test_second_call_within_ttl_is_a_hit() {
    let (producer, calls) = counting(None, &[]);
    let gate = Gate::new(producer, GatePolicy::new(TTL));

    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Miss)
    );
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Hit)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1, "producer must run once");

    gate.call(2).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2, "other arguments miss");
    assert_eq!(gate.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_share_one_producer_call() {
    let (producer, calls) = counting(Some(Duration::from_millis(50)), &[]);
    let gate = Gate::new(producer, GatePolicy::new(TTL));

    let (first, second) = tokio::join!(gate.call_with_status(7), gate.call_with_status(7));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.unwrap(), ("7#1".to_string(), CallStatus::Miss));
    assert_eq!(second.unwrap(), ("7#1".to_string(), CallStatus::Coalesced));
}

#[tokio::test(start_paused = true)]
async fn test_attached_callers_share_the_failure() {
    let (producer, calls) = counting(Some(Duration::from_millis(50)), &[1]);
    let gate = Gate::new(producer, GatePolicy::new(TTL));

    let (first, second) = tokio::join!(gate.call(3), gate.call(3));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    match (first, second) {
        (Err(GateError::Producer(a)), Err(GateError::Producer(b))) => {
            assert!(Arc::ptr_eq(&a, &b), "both callers must see the same error");
            assert_eq!(a.to_string(), "call 1 failed");
        }
        other => panic!("expected two producer errors, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let (producer, calls) = counting(None, &[1]);
    let gate = Gate::new(producer, GatePolicy::new(TTL));

    assert!(gate.call(1).await.is_err());
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Evicted);

    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#2".to_string(), CallStatus::Miss)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2, "failed call must be retried");
}

#[tokio::test]
async fn test_stale_value_is_served_while_refreshing_once() {
    let clock = MockTimeProvider::new();
    let (producer, calls) = counting(None, &[]);
    let gate = mocked_gate(producer, &clock);

    gate.call(1).await.unwrap();
    clock.advance(Duration::from_secs(31));

    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Stale)
    );
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Refreshing);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Hit),
        "a second stale read must not start another refresh"
    );

    gate.offload().wait_all().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2, "exactly one background refresh");
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Fresh);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#2".to_string(), CallStatus::Hit)
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_value() {
    let clock = MockTimeProvider::new();
    let (producer, calls) = counting(None, &[2]);
    let gate = mocked_gate(producer, &clock);

    gate.call(1).await.unwrap();
    clock.advance(Duration::from_secs(31));

    assert_eq!(gate.call(1).await.unwrap(), "1#1");
    gate.offload().wait_all().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Fresh);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Stale),
        "the entry survives and may be refreshed again"
    );
    gate.offload().wait_all().await;
    assert_eq!(gate.call(1).await.unwrap(), "1#3");
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_refresh_releases_entry() {
    let clock = MockTimeProvider::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let producer = producer_fn(move |n: u32| {
        let call = counter.fetch_add(1, Ordering::SeqCst) + 1;
        async move {
            if call == 2 {
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Ok::<_, io::Error>(format!("{n}#{call}"))
        }
    });
    let gate = Gate::builder(producer)
        .label("test")
        .policy(GatePolicy::new(TTL))
        .offload(
            OffloadConfig::builder()
                .timeout(Duration::from_millis(10))
                .build(),
        )
        .time_provider(clock.clone())
        .build();

    gate.call(1).await.unwrap();
    clock.advance(Duration::from_secs(31));
    assert_eq!(gate.call_with_status(1).await.unwrap().1, CallStatus::Stale);
    gate.offload().wait_all().await;

    assert!(!gate.is_in_flight(&1).unwrap());
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Fresh);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#1".to_string(), CallStatus::Stale),
        "an abandoned refresh must not block the next one"
    );
    gate.offload().wait_all().await;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#3".to_string(), CallStatus::Hit)
    );
}

#[tokio::test]
async fn test_expired_entry_is_produced_again() {
    let clock = MockTimeProvider::new();
    let (producer, calls) = counting(None, &[]);
    let gate = mocked_gate(producer, &clock);

    gate.call(1).await.unwrap();
    clock.advance(TTL);

    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Evicted);
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#2".to_string(), CallStatus::Miss)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalid_key_skips_producer() {
    let (producer, calls) = counting(None, &[]);
    let gate = Gate::builder(producer)
        .key_fn(|_: &u32| -> Result<Vec<KeyPart>, KeyError> { Err(KeyError::new("unkeyable")) })
        .build();

    match gate.call(1).await {
        Err(GateError::InvalidKey(err)) => assert_eq!(err.message(), "unkeyable"),
        other => panic!("expected an invalid key error, got {other:?}"),
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_max_entries_evicts_soonest_expiring() {
    let clock = MockTimeProvider::new();
    let (producer, _calls) = counting(None, &[]);
    let gate = Gate::builder(producer)
        .policy(GatePolicy::new(TTL).max_entries(NonZeroUsize::new(2).unwrap()))
        .time_provider(clock.clone())
        .build();

    for n in 1..=3 {
        gate.call(n).await.unwrap();
        clock.advance(Duration::from_secs(1));
    }

    assert_eq!(gate.len(), 2);
    assert_eq!(gate.entry_state(&1).unwrap(), EntryState::Evicted);
    assert_eq!(gate.entry_state(&3).unwrap(), EntryState::Fresh);
}

#[tokio::test]
async fn test_invalidate_and_purge() {
    let clock = MockTimeProvider::new();
    let (producer, calls) = counting(None, &[]);
    let gate = mocked_gate(producer, &clock);

    gate.call(1).await.unwrap();
    gate.call(2).await.unwrap();

    assert!(gate.invalidate(&1).unwrap());
    assert!(!gate.invalidate(&1).unwrap());
    assert_eq!(
        gate.call_with_status(1).await.unwrap(),
        ("1#3".to_string(), CallStatus::Miss)
    );

    clock.advance(TTL);
    assert_eq!(gate.purge_expired(), 2);
    assert!(gate.is_empty());

    gate.call(1).await.unwrap();
    gate.clear();
    assert!(gate.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_flight_across_threads() {
    let (producer, calls) = counting(Some(Duration::from_millis(50)), &[]);
    let gate = Arc::new(Gate::new(producer, GatePolicy::new(TTL)));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.call(9).await })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "9#1");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!gate.is_in_flight(&9).unwrap());
}

#[test]
fn test_policy_deserialize() {
    let yaml = r#"
ttl: 30s
refresh_fraction: 0.25
max_entries: 100
"#;

    let policy: GatePolicy = serde_saphyr::from_str(yaml).expect("failed to deserialize");

    assert_eq!(policy.ttl, Duration::from_secs(30));
    assert_eq!(policy.refresh_fraction, RefreshFraction::new(0.25).unwrap());
    assert_eq!(policy.max_entries, NonZeroUsize::new(100));
    assert_eq!(policy.refresh_after(), Duration::from_millis(7500));

    let defaults: GatePolicy = serde_saphyr::from_str("{}").expect("failed to deserialize");
    assert_eq!(defaults, GatePolicy::default());

    assert!(serde_saphyr::from_str::<GatePolicy>("refresh_fraction: 1.5").is_err());
}
