//! Concurrency stress tests for the channel registries and the dispatcher.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::time::Duration;

use crate::{event_type, EventDispatcher, EventStatus, ObservableEvent, Receiver};

#[derive(Debug, Clone)]
struct Ping {
    seq: usize,
}

#[async_trait::async_trait]
impl ObservableEvent for Ping {
    const EVENT_TYPE: &'static str = event_type!(Ping);
    type Output = usize;

    async fn processing(&self) -> anyhow::Result<usize> {
        // Small random delay so invocations resolve out of order.
        let jitter = fastrand::u64(0..3);
        tokio::time::sleep(Duration::from_millis(jitter)).await;
        Ok(self.seq)
    }
}

// Same shape as Ping, distinct event type.
#[derive(Debug, Clone)]
struct Pong {
    seq: usize,
}

#[async_trait::async_trait]
impl ObservableEvent for Pong {
    const EVENT_TYPE: &'static str = event_type!(Pong);
    type Output = usize;

    async fn processing(&self) -> anyhow::Result<usize> {
        Ok(self.seq)
    }
}

#[test]
fn stress_concurrent_first_requests_share_one_channel() {
    const THREADS: usize = 32;

    for _ in 0..20 {
        let dispatcher = EventDispatcher::builder().show_log(false).build();
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let dispatcher = dispatcher.clone();
                let barrier = barrier.clone();
                std::thread::spawn(move || {
                    barrier.wait();
                    if fastrand::bool() {
                        std::thread::yield_now();
                    }
                    (
                        dispatcher.start_channel::<Ping>(),
                        dispatcher.completed_channel::<Ping>(),
                    )
                })
            })
            .collect();

        let channels: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();

        let (first_start, first_completed) = &channels[0];
        for (start, completed) in &channels {
            assert!(start.same_channel(first_start));
            assert!(completed.same_channel(first_completed));
        }
        assert_eq!(dispatcher.registry(EventStatus::Start).len(), 1);
        assert_eq!(dispatcher.registry(EventStatus::Completed).len(), 1);
        assert!(dispatcher.registry(EventStatus::Success).is_empty());
    }
}

#[test]
fn stress_concurrent_requests_for_distinct_types() {
    const THREADS: usize = 16;

    let dispatcher = EventDispatcher::new();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            let barrier = barrier.clone();
            std::thread::spawn(move || {
                barrier.wait();
                if i % 2 == 0 {
                    dispatcher.success_channel::<Ping>().subscribe();
                } else {
                    dispatcher.success_channel::<Pong>().subscribe();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(dispatcher.registry(EventStatus::Success).len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_concurrent_invocations_publish_every_lifecycle() {
    const INVOCATIONS: usize = 200;

    let dispatcher = EventDispatcher::builder().show_log(false).build();
    let mut start = Ping::start(&dispatcher).subscribe();
    let mut success = Ping::success(&dispatcher).subscribe();
    let mut completed = Ping::completed(&dispatcher).subscribe();
    let mut pong_completed = Pong::completed(&dispatcher).subscribe();

    let tasks: Vec<_> = (0..INVOCATIONS)
        .map(|seq| {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                let handle = Ping { seq }.run(&dispatcher);
                let id = handle.execution_id();
                assert_eq!(handle.await.unwrap(), seq);
                id
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap());
    }
    dispatcher.wait_idle().await;
    assert_eq!(ids.len(), INVOCATIONS);

    let mut started = HashSet::new();
    let mut succeeded = HashSet::new();
    let mut finished = HashSet::new();
    for _ in 0..INVOCATIONS {
        started.insert(start.try_recv().unwrap().execution_id);
        let s = success.try_recv().unwrap();
        assert_eq!(s.output, s.event.seq);
        succeeded.insert(s.execution_id);
        let c = completed.try_recv().unwrap();
        assert_eq!(c.output(), Some(&c.event.seq));
        finished.insert(c.execution_id);
    }

    assert_eq!(started, ids);
    assert_eq!(succeeded, ids);
    assert_eq!(finished, ids);
    assert!(start.try_recv().is_err());
    assert!(pong_completed.try_recv().is_err());
}

fn drain_all<T>(rx: &mut Receiver<T>) -> Vec<T> {
    std::iter::from_fn(|| rx.try_recv().ok()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn stress_undrained_subscribers_receive_every_notification() {
    const INVOCATIONS: usize = 2_000;

    let dispatcher = EventDispatcher::new();
    dispatcher.set_show_log(false);

    // Two independent subscribers per channel, none read until the end.
    let mut starts = [
        Pong::start(&dispatcher).subscribe(),
        Pong::start(&dispatcher).subscribe(),
    ];
    let mut successes = [
        Pong::success(&dispatcher).subscribe(),
        Pong::success(&dispatcher).subscribe(),
    ];
    let mut failures = [
        Pong::failure(&dispatcher).subscribe(),
        Pong::failure(&dispatcher).subscribe(),
    ];
    let mut completions = [
        Pong::completed(&dispatcher).subscribe(),
        Pong::completed(&dispatcher).subscribe(),
    ];

    let handles: Vec<_> = (0..INVOCATIONS)
        .map(|seq| Pong { seq }.run(&dispatcher))
        .collect();
    for (seq, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), seq);
    }
    dispatcher.wait_idle().await;

    for rx in &mut starts {
        let started = drain_all(rx);
        assert_eq!(started.len(), INVOCATIONS);
        let seqs: HashSet<usize> = started.iter().map(|s| s.event.seq).collect();
        assert_eq!(seqs.len(), INVOCATIONS);
    }
    for rx in &mut successes {
        let succeeded = drain_all(rx);
        assert_eq!(succeeded.len(), INVOCATIONS);
        let seqs: HashSet<usize> = succeeded.iter().map(|s| s.output).collect();
        assert_eq!(seqs.len(), INVOCATIONS);
    }
    for rx in &mut completions {
        let done = drain_all(rx);
        assert_eq!(done.len(), INVOCATIONS);
        assert!(done.iter().all(|c| c.output() == Some(&c.event.seq)));
    }
    for rx in &mut failures {
        assert!(drain_all(rx).is_empty());
    }
}
