//! Worker thread that owns the value and drains the command queue.

use crate::task::Command;
use crossbeam::channel::Receiver;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

/// Loop state. The only transition is `Running` -> `Terminating`, taken
/// when the stop command arrives; the thread then exits.
enum State {
    Running,
    Terminating,
}

/// Handle to the single background thread serializing access to the value.
pub(crate) struct Worker {
    handle: Option<thread::JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
}

impl Worker {
    /// Spawn the worker thread.
    ///
    /// `init` runs on the worker thread, so the value is born there and
    /// never crosses a thread boundary afterwards. The value also dies
    /// there, after the loop has drained.
    pub(crate) fn spawn<T, F>(init: F, commands: Receiver<Command<T>>) -> Self
    where
        T: 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let id = NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed);
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let handle = thread::Builder::new()
            .name(format!("steward-worker-{}", id))
            .spawn(move || {
                let mut value = init();
                Self::run_loop(&mut value, &commands);
                drop(value);
                flag.store(true, Ordering::Release);

                #[cfg(debug_assertions)]
                eprintln!("steward-worker-{} shut down", id);
            })
            .expect("failed to spawn steward worker thread");

        Self {
            handle: Some(handle),
            stopped,
        }
    }

    /// Worker thread main loop.
    ///
    /// Blocks on the queue, runs each task in push order, and exits on the
    /// stop command. A disconnected queue is treated the same way; it
    /// cannot carry further work either.
    fn run_loop<T>(value: &mut T, commands: &Receiver<Command<T>>) {
        let mut state = State::Running;
        while let State::Running = state {
            match commands.recv() {
                Ok(Command::Run(task)) => task.run(value),
                Ok(Command::Stop) | Err(_) => state = State::Terminating,
            }
        }
    }

    /// Whether the worker thread is still alive and processing commands.
    pub(crate) fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stopped.load(Ordering::Acquire)
    }

    /// Block until the worker thread has exited.
    pub(crate) fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("failed to join steward worker thread");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;
    use crossbeam::channel::unbounded;
    use std::time::Duration;

    #[test]
    fn test_worker_executes_tasks_in_order() {
        let (tx, rx) = unbounded();
        let mut worker = Worker::spawn(Vec::new, rx);

        let (task1, h1) = Task::new(|v: &mut Vec<u32>| v.push(1));
        let (task2, h2) = Task::new(|v: &mut Vec<u32>| v.push(2));
        let (read, contents) = Task::new(|v: &mut Vec<u32>| v.clone());

        tx.send(Command::Run(task1)).unwrap();
        tx.send(Command::Run(task2)).unwrap();
        tx.send(Command::Run(read)).unwrap();

        assert_eq!(h1.wait(), Ok(()));
        assert_eq!(h2.wait(), Ok(()));
        assert_eq!(contents.wait(), Ok(vec![1, 2]));

        tx.send(Command::Stop).unwrap();
        worker.join();
    }

    #[test]
    fn test_worker_stops_on_stop_command() {
        let (tx, rx) = unbounded::<Command<i32>>();
        let mut worker = Worker::spawn(|| 0, rx);
        assert!(worker.is_running());

        tx.send(Command::Stop).unwrap();
        worker.join();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_worker_stops_on_disconnect() {
        let (tx, rx) = unbounded::<Command<i32>>();
        let mut worker = Worker::spawn(|| 0, rx);

        drop(tx);
        worker.join();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_stop_skips_nothing_queued_before_it() {
        let (tx, rx) = unbounded();
        let mut worker = Worker::spawn(|| 0u64, rx);

        let mut handles = Vec::new();
        for _ in 0..100 {
            let (task, handle) = Task::new(|n: &mut u64| {
                std::thread::sleep(Duration::from_millis(1));
                *n += 1;
                *n
            });
            tx.send(Command::Run(task)).unwrap();
            handles.push(handle);
        }
        tx.send(Command::Stop).unwrap();
        worker.join();

        // Every task queued ahead of the stop command ran.
        assert_eq!(handles.pop().unwrap().wait(), Ok(100));
    }
}
