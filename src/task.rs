//! Queued tasks and the handles through which their outcomes arrive.

use crate::{TaskError, TaskResult};
use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, TryRecvError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Unique identifier for a submitted task.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

impl TaskId {
    pub(crate) fn new() -> Self {
        TaskId(NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric ID value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// What the worker loop pulls off the queue.
pub(crate) enum Command<T> {
    /// Run one task against the owned value.
    Run(Task<T>),
    /// Exit the loop without running anything further.
    ///
    /// Pushed exactly once, by the executor's `Drop`; FIFO order makes it
    /// the last command the worker ever observes.
    Stop,
}

/// One queued unit of work against the owned value.
///
/// The boxed operation already contains the outcome delivery: it runs the
/// caller's closure under `catch_unwind` and sends either the value or the
/// captured panic through the one-shot channel. A `Task` is consumed by
/// exactly one execution.
pub(crate) struct Task<T> {
    op: Box<dyn FnOnce(&mut T) + Send>,
}

impl<T> Task<T> {
    /// Pair a caller operation with a fresh one-shot outcome channel.
    pub(crate) fn new<R, F>(op: F) -> (Self, TaskHandle<R>)
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let id = TaskId::new();
        let (outcome_tx, outcome_rx) = bounded(1);
        let boxed = Box::new(move |value: &mut T| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| op(value)))
                .map_err(|payload| TaskError::Panicked(panic_message(payload.as_ref())));
            // A dropped handle means nobody is waiting; the task still ran.
            let _ = outcome_tx.send(outcome);
        });
        (
            Self { op: boxed },
            TaskHandle {
                id,
                outcome: outcome_rx,
            },
        )
    }

    /// Execute against the owned value, delivering the outcome as a side
    /// effect. Never unwinds.
    pub(crate) fn run(self, value: &mut T) {
        (self.op)(value);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "opaque panic payload".to_string()
    }
}

/// Handle for awaiting one submitted task's outcome.
///
/// The handle's lifetime is independent of the [`Steward`](crate::Steward)
/// it came from: because drop drains the queue, a task submitted before the
/// executor was dropped has always run by the time the drop returns, and its
/// handle still resolves afterwards.
pub struct TaskHandle<R> {
    id: TaskId,
    outcome: Receiver<TaskResult<R>>,
}

impl<R> TaskHandle<R> {
    /// The task's unique ID.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until the task has executed and yield its outcome.
    ///
    /// Waits for every task queued ahead of this one first; execution is
    /// strictly FIFO.
    pub fn wait(self) -> TaskResult<R> {
        self.outcome.recv().unwrap_or(Err(TaskError::Lost))
    }

    /// Poll for the outcome without blocking.
    ///
    /// Returns `None` while the task has not executed yet. Polling after
    /// the single outcome was consumed yields `Some(Err(TaskError::Lost))`.
    pub fn try_wait(&self) -> Option<TaskResult<R>> {
        match self.outcome.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(TaskError::Lost)),
        }
    }

    /// Block for at most `timeout`, yielding the outcome if it arrived.
    ///
    /// A timeout does not affect the queue: the task still executes, and a
    /// later wait on the same handle can still observe the outcome.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<TaskResult<R>> {
        match self.outcome.recv_timeout(timeout) {
            Ok(outcome) => Some(outcome),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(Err(TaskError::Lost)),
        }
    }
}
