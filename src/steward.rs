//! The serialized executor: a value with a private worker thread.

use crate::task::{Command, Task, TaskHandle};
use crate::worker::Worker;
use crossbeam::channel::{self, Sender};

/// A value with exclusive single-threaded access, fed by a FIFO queue.
///
/// All operations submitted through [`submit`](Steward::submit) run on one
/// dedicated worker thread, in submission order, so no two operations ever
/// observe the value concurrently. Submission never blocks; waiting happens
/// only on the returned [`TaskHandle`].
///
/// Dropping the `Steward` pushes a stop command behind everything already
/// queued and joins the worker, so drop does not return until every
/// previously submitted operation has run (drain-on-exit).
///
/// `Steward` is `Send` and `Sync` for any `T`: it holds only the queue's
/// sender and the worker's join handle, never the value itself. It cannot
/// be cloned; the worker binding is exclusive.
///
/// # Examples
///
/// ```
/// use steward::Steward;
///
/// let counter = Steward::new(0u64);
/// let handles: Vec<_> = (0..10).map(|_| counter.submit(|n| { *n += 1; *n })).collect();
/// let last = handles.into_iter().last().unwrap();
/// assert_eq!(last.wait().unwrap(), 10);
/// ```
pub struct Steward<T> {
    commands: Sender<Command<T>>,
    worker: Worker,
}

impl<T: 'static> Steward<T> {
    /// Wrap an existing value, moving it to the worker thread.
    ///
    /// Never blocks on queue activity.
    pub fn new(value: T) -> Self
    where
        T: Send,
    {
        Self::from_fn(move || value)
    }

    /// Construct the value in place on the worker thread.
    ///
    /// Because the value is born and dies on the worker, it never crosses
    /// a thread boundary and `T` does not need to be `Send`:
    ///
    /// ```
    /// use std::rc::Rc;
    /// use steward::Steward;
    ///
    /// let cell = Steward::from_fn(|| Rc::new(5));
    /// assert_eq!(cell.submit(|rc| **rc).wait().unwrap(), 5);
    /// ```
    pub fn from_fn<F>(init: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (commands, queue) = channel::unbounded();
        let worker = Worker::spawn(init, queue);
        Self { commands, worker }
    }

    /// Queue an operation against the value and return a handle to its
    /// eventual outcome.
    ///
    /// Callable concurrently from any number of threads; never blocks on
    /// the operation's execution. Operations run in the exact order their
    /// queue pushes completed. A panicking operation resolves its own
    /// handle with [`TaskError::Panicked`](crate::TaskError::Panicked) and
    /// leaves the worker and all later operations untouched.
    pub fn submit<R, F>(&self, op: F) -> TaskHandle<R>
    where
        F: FnOnce(&mut T) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (task, handle) = Task::new(op);
        // The worker keeps its receiver until it has observed the stop
        // command, which drop pushes behind every submit; a live Steward
        // therefore always has a connected queue.
        self.commands
            .send(Command::Run(task))
            .expect("steward worker disconnected its queue");
        handle
    }
}

impl<T> Drop for Steward<T> {
    fn drop(&mut self) {
        // FIFO order puts the stop command behind all queued tasks, and
        // the join blocks until the worker has run them all.
        let _ = self.commands.send(Command::Stop);
        self.worker.join();
    }
}
