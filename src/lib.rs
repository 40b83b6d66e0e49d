//! Serialized executor for arbitrary values.
//!
//! [`Steward<T>`] gives a value a private worker thread: every operation
//! submitted against the value runs on that one thread, in submission order,
//! so the value needs no locking of its own. Callers on any thread submit
//! closures and get back a [`TaskHandle`] through which the outcome
//! eventually arrives. Dropping the `Steward` drains the queue before it
//! returns, so no submitted operation is ever lost.
//!
//! ```
//! use steward::Steward;
//!
//! let text = Steward::new(String::from("start"));
//! let handle = text.submit(|s| {
//!     s.push_str(" received message");
//!     s.clone()
//! });
//! assert_eq!(handle.wait().unwrap(), "start received message");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod steward;
mod task;
mod worker;

pub use steward::Steward;
pub use task::{TaskHandle, TaskId};

/// Failure delivered through a [`TaskHandle`] instead of a value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaskError {
    /// The operation panicked while running on the worker thread.
    ///
    /// The panic is caught at the execution site; it never unwinds the
    /// worker loop, so later tasks still run.
    #[error("operation panicked: {0}")]
    Panicked(String),

    /// The outcome channel yielded nothing.
    ///
    /// Seen when a handle is read a second time after its single outcome
    /// was already consumed.
    #[error("task outcome already consumed or never delivered")]
    Lost,
}

/// Outcome of one submitted operation.
pub type TaskResult<R> = Result<R, TaskError>;
