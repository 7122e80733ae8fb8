//! Bounded-concurrency task runner.
//!
//! Runs one closure per repository across a fixed pool of worker threads.
//! Results come back in input order regardless of completion order, and an
//! optional progress callback fires once per completed task, in completion
//! order, from the calling thread's side of a channel.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Mutex, PoisonError};
use std::thread;

use crate::types::RepoResult;

/// Type-erased per-repository operation.
type Op<T> = Box<dyn FnOnce() -> T + Send>;

/// A named unit of work for one repository.
pub struct Task {
    /// Repository name, echoed into progress output.
    pub name: String,
    /// The operation to run.
    op: Op<RepoResult>,
}

impl Task {
    /// Create a task from a name and an operation.
    pub fn new(name: impl Into<String>, op: impl FnOnce() -> RepoResult + Send + 'static) -> Self {
        Self {
            name: name.into(),
            op: Box::new(op),
        }
    }
}

/// Run all tasks with at most `concurrency` in flight, returning results in
/// task order. A `concurrency` of zero is treated as one.
pub fn run(tasks: Vec<Task>, concurrency: usize) -> Vec<RepoResult> {
    run_with_progress(tasks, concurrency, |_, _, _, _| {})
}

/// Like [`run`], but invokes `progress(completed, total, name, result)` after
/// each task finishes, where `name` is the completed task's name. Calls
/// arrive in completion order, never concurrently, and `completed` counts
/// from 1 to `total`.
pub fn run_with_progress<F>(
    tasks: Vec<Task>,
    concurrency: usize,
    mut progress: F,
) -> Vec<RepoResult>
where
    F: FnMut(usize, usize, &str, &RepoResult),
{
    let (names, ops): (Vec<String>, Vec<Op<RepoResult>>) = tasks
        .into_iter()
        .map(|task| (task.name, task.op))
        .unzip();
    execute(ops, concurrency, &mut |completed, total, index, result| {
        progress(completed, total, &names[index], result);
    })
}

/// Pool engine shared by [`run_with_progress`] and the status gatherer.
///
/// Workers pop `(index, op)` pairs off a shared queue and send
/// `(index, value)` back over a channel; the receiving side fills the
/// index-addressed slot vector and drives the completion callback with
/// `(completed, total, index, value)`. Each index is produced exactly once,
/// so every slot is filled when the channel closes.
pub(crate) fn execute<T: Send>(
    ops: Vec<Op<T>>,
    concurrency: usize,
    on_complete: &mut dyn FnMut(usize, usize, usize, &T),
) -> Vec<T> {
    let total = ops.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = concurrency.max(1).min(total);
    let queue: Mutex<VecDeque<(usize, Op<T>)>> = Mutex::new(ops.into_iter().enumerate().collect());
    let (sender, receiver) = mpsc::channel::<(usize, T)>();

    let mut slots: Vec<Option<T>> = Vec::with_capacity(total);
    slots.resize_with(total, || None);

    thread::scope(|scope| {
        for _ in 0..workers {
            let sender = sender.clone();
            let queue = &queue;
            scope.spawn(move || {
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, op)) = next else {
                        break;
                    };
                    // A send failure means the receiver is gone; nothing
                    // useful remains to do on this worker.
                    if sender.send((index, op())).is_err() {
                        break;
                    }
                }
            });
        }
        drop(sender);

        let mut completed = 0;
        for (index, value) in receiver {
            completed += 1;
            on_complete(completed, total, index, &value);
            slots[index] = Some(value);
        }
    });

    slots.into_iter().flatten().collect()
}
