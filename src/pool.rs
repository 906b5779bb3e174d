//! A fixed-size pool of persistent worker threads fed by a bounded FIFO queue.

use crate::error::Error;
use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace, warn};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Persistent workers draining a bounded task queue.
///
/// There are no priorities, no per-task cancellation, and no result channel;
/// callers that need results bring their own channel.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    closed: AtomicBool,
    size: usize,
    capacity: usize,
}

impl WorkerPool {
    /// Start `size` workers sharing a queue that holds at most `capacity` pending tasks.
    pub fn new(size: usize, capacity: usize) -> Result<Self, Error> {
        if size == 0 {
            return Err(Error::InvalidPoolSize);
        }
        if capacity == 0 {
            return Err(Error::InvalidQueueCapacity);
        }

        let (sender, receiver) = bounded::<Task>(capacity);
        let mut workers = Vec::with_capacity(size);
        for id in 0..size {
            let receiver = receiver.clone();
            let spawned = thread::Builder::new()
                .name(format!("cmap-worker-{}", id))
                .spawn(move || run_worker(id, receiver));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Disconnect the queue so the workers already started exit.
                    drop(sender);
                    for handle in workers {
                        let _ = handle.join();
                    }
                    return Err(Error::WorkerSpawn(e.to_string()));
                }
            }
        }

        debug!(workers = size, queue_capacity = capacity, "worker pool started");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            closed: AtomicBool::new(false),
            size,
            capacity,
        })
    }

    /// Queue a task for execution on some worker.
    ///
    /// Blocks while the queue is full. Returns `Err(Error::PoolClosed)`
    /// without running the task once [`close`](Self::close) has been called.
    pub fn submit<F>(&self, task: F) -> Result<(), Error>
    where
        F: FnOnce() + Send + 'static,
    {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }

        // Clone out of the lock so a blocking send never holds up close().
        let sender = match self.sender.lock().as_ref() {
            Some(sender) => sender.clone(),
            None => return Err(Error::PoolClosed),
        };

        sender
            .send(Box::new(task))
            .map_err(|_| Error::PoolClosed)
    }

    /// Stop accepting tasks, let queued and running ones finish, then join the workers.
    ///
    /// Only the first call does anything. Calling this from inside a task is
    /// allowed; the calling worker is simply not joined.
    pub fn close(&self) {
        if self
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        drop(self.sender.lock().take());

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        for handle in workers {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("worker thread exited abnormally");
            }
        }

        debug!(workers = self.size, "worker pool closed");
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of workers.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Maximum number of queued tasks before `submit` blocks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn run_worker(id: usize, tasks: Receiver<Task>) {
    trace!(worker = id, "worker started");
    // Ends once every sender is dropped and the queue is drained.
    for task in tasks.iter() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            error!(worker = id, "pool task panicked");
        }
    }
    trace!(worker = id, "worker exiting");
}
