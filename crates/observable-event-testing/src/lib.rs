//! Testing utilities for observable-event.
//!
//! [`LifecycleRecorder`] subscribes to all four channels of one event type
//! and collects what they publish, so tests can assert on complete
//! lifecycles instead of juggling four receivers.
//!
//! ```rust,ignore
//! let dispatcher = EventDispatcher::new();
//! let mut recorder = LifecycleRecorder::<Login>::attach(&dispatcher);
//!
//! login.run(&dispatcher).await?;
//!
//! let recorded = recorder.collect(1, Duration::from_secs(1)).await?;
//! recorded.verify()?;
//! assert_eq!(recorded.successes.len(), 1);
//! ```

use std::time::Duration;

use anyhow::{bail, ensure, Result};
use observable_event::{
    EventDispatcher, EventStatus, ExecutionCompleted, ExecutionId, ExecutionStart, ObservableEvent,
    ReceivedError, ReceivedOutput, Receiver, TryRecvError,
};

/// Receivers for every lifecycle channel of `E`.
///
/// Only notifications published after [`attach`](Self::attach) are seen.
pub struct LifecycleRecorder<E: ObservableEvent> {
    start: Receiver<ExecutionStart<E>>,
    success: Receiver<ReceivedOutput<E>>,
    failure: Receiver<ReceivedError<E>>,
    completed: Receiver<ExecutionCompleted<E>>,
}

impl<E: ObservableEvent> LifecycleRecorder<E> {
    pub fn attach(dispatcher: &EventDispatcher) -> Self {
        Self {
            start: E::start(dispatcher).subscribe(),
            success: E::success(dispatcher).subscribe(),
            failure: E::failure(dispatcher).subscribe(),
            completed: E::completed(dispatcher).subscribe(),
        }
    }

    /// Everything already received, without waiting.
    pub fn drain(&mut self) -> Recorded<E> {
        let mut closed = Vec::new();
        let starts = drain(&mut self.start, EventStatus::Start, &mut closed);
        let successes = drain(&mut self.success, EventStatus::Success, &mut closed);
        let failures = drain(&mut self.failure, EventStatus::Failure, &mut closed);
        let completions = drain(&mut self.completed, EventStatus::Completed, &mut closed);
        Recorded {
            starts,
            successes,
            failures,
            completions,
            closed,
        }
    }

    /// Waits for `completions` completed notifications, then drains the rest.
    ///
    /// Success, failure and start are published before completed, so once the
    /// completions are in, their counterparts are too.
    pub async fn collect(&mut self, completions: usize, timeout: Duration) -> Result<Recorded<E>> {
        let mut done = Vec::with_capacity(completions);
        while done.len() < completions {
            match tokio::time::timeout(timeout, self.completed.recv()).await {
                Ok(Some(completed)) => done.push(completed),
                Ok(None) => bail!("completed channel closed after {} completions", done.len()),
                Err(_) => bail!(
                    "timed out after {:?} with {} of {} completions",
                    timeout,
                    done.len(),
                    completions
                ),
            }
        }

        let mut recorded = self.drain();
        done.append(&mut recorded.completions);
        recorded.completions = done;
        Ok(recorded)
    }
}

fn drain<T>(rx: &mut Receiver<T>, status: EventStatus, closed: &mut Vec<EventStatus>) -> Vec<T> {
    let mut items = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(item) => items.push(item),
            Err(TryRecvError::Empty) => break,
            Err(TryRecvError::Disconnected) => {
                closed.push(status);
                break;
            }
        }
    }
    items
}

/// Notifications captured by a [`LifecycleRecorder`].
#[derive(Debug)]
pub struct Recorded<E: ObservableEvent> {
    pub starts: Vec<ExecutionStart<E>>,
    pub successes: Vec<ReceivedOutput<E>>,
    pub failures: Vec<ReceivedError<E>>,
    pub completions: Vec<ExecutionCompleted<E>>,
    /// Channels that were closed while draining. Nothing published after
    /// that point could be observed.
    pub closed: Vec<EventStatus>,
}

impl<E: ObservableEvent> Recorded<E> {
    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
            && self.successes.is_empty()
            && self.failures.is_empty()
            && self.completions.is_empty()
    }

    /// Outputs of every successful completion, in arrival order.
    pub fn outputs(&self) -> Vec<&E::Output> {
        self.completions.iter().filter_map(|c| c.output()).collect()
    }

    /// Checks the lifecycle of every completed invocation.
    ///
    /// Each completion must have exactly one start, exactly one success or
    /// failure, and carry that same payload. No success or failure may exist
    /// without its completion, and no channel may have closed while recording.
    pub fn verify(&self) -> Result<()> {
        ensure!(
            self.closed.is_empty(),
            "channels closed while recording: {:?}",
            self.closed
        );

        for completed in &self.completions {
            let id = completed.execution_id;

            let starts = self.starts.iter().filter(|s| s.execution_id == id).count();
            ensure!(starts == 1, "{id}: expected 1 start, saw {starts}");

            let successes: Vec<_> = self.successes.iter().filter(|s| s.execution_id == id).collect();
            let failures: Vec<_> = self.failures.iter().filter(|f| f.execution_id == id).collect();

            match (&completed.result, successes.as_slice(), failures.as_slice()) {
                (Ok(output), [success], []) => ensure!(
                    format!("{output:?}") == format!("{:?}", success.output),
                    "{id}: completed output differs from success output"
                ),
                (Err(error), [], [failure]) => ensure!(
                    error.ptr_eq(&failure.error),
                    "{id}: completed error differs from failure error"
                ),
                _ => bail!(
                    "{id}: completed {} with {} successes and {} failures",
                    if completed.is_success() { "ok" } else { "err" },
                    successes.len(),
                    failures.len()
                ),
            }
        }

        let orphan = self
            .successes
            .iter()
            .map(|s| s.execution_id)
            .chain(self.failures.iter().map(|f| f.execution_id))
            .find(|id| !self.completed(*id));
        if let Some(id) = orphan {
            bail!("{id}: outcome published without completion");
        }

        Ok(())
    }

    fn completed(&self, id: ExecutionId) -> bool {
        self.completions.iter().any(|c| c.execution_id == id)
    }
}
