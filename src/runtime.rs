//! Runtime abstraction layer for async operations
//!
//! The overlay is loaded by a future that must run somewhere. Hosts pick the
//! executor by handing the controller a [`TaskSpawner`]: the tokio one for
//! native applications, or [`QueuedSpawner`] for hosts that drive
//! everything from a single frame loop.

use futures::future::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

pub type BoxTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait TaskSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxTask) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience wrapper that boxes the future for the spawner
pub fn spawn<F>(spawner: &dyn TaskSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

#[cfg(feature = "tokio-runtime")]
pub mod tokio_impl {
    use super::*;
    use ::tokio::runtime::Handle;
    use ::tokio::task::JoinHandle;

    /// Tokio-based async spawner
    pub struct TokioSpawner {
        handle: Handle,
    }

    impl TokioSpawner {
        /// Spawner bound to the runtime the caller is running in.
        ///
        /// Returns `None` outside a tokio runtime.
        pub fn current() -> Option<Self> {
            Handle::try_current().ok().map(|handle| Self { handle })
        }

        pub fn with_handle(handle: Handle) -> Self {
            Self { handle }
        }
    }

    impl TaskSpawner for TokioSpawner {
        fn spawn_boxed(&self, future: BoxTask) -> Box<dyn AsyncHandle> {
            let handle = self.handle.spawn(future);
            Box::new(TokioHandle(handle))
        }
    }

    struct TokioHandle(JoinHandle<()>);

    impl AsyncHandle for TokioHandle {
        fn is_finished(&self) -> bool {
            self.0.is_finished()
        }

        fn cancel(&self) {
            self.0.abort();
        }
    }
}

#[derive(Default)]
struct TaskFlags {
    finished: AtomicBool,
    cancelled: AtomicBool,
}

struct QueuedTask {
    future: BoxTask,
    flags: Arc<TaskFlags>,
}

/// Single-threaded spawner whose tasks only make progress when the owner
/// calls [`QueuedSpawner::run_until_stalled`].
///
/// Tasks are polled with a no-op waker, so a pending task is simply polled
/// again on the next call.
#[derive(Default)]
pub struct QueuedSpawner {
    tasks: Mutex<Vec<QueuedTask>>,
}

impl QueuedSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks that have not completed yet
    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }

    /// Polls queued tasks until none of them can make further progress.
    /// Returns how many tasks completed.
    pub fn run_until_stalled(&self) -> usize {
        let waker = futures::task::noop_waker();
        let mut cx = Context::from_waker(&waker);
        let mut completed = 0;

        loop {
            let batch = match self.tasks.lock() {
                Ok(mut tasks) => std::mem::take(&mut *tasks),
                Err(_) => return completed,
            };
            if batch.is_empty() {
                return completed;
            }

            let mut still_pending = Vec::new();
            let mut progressed = false;
            for mut task in batch {
                if task.flags.cancelled.load(Ordering::Acquire) {
                    task.flags.finished.store(true, Ordering::Release);
                    progressed = true;
                    continue;
                }
                match task.future.poll_unpin(&mut cx) {
                    Poll::Ready(()) => {
                        task.flags.finished.store(true, Ordering::Release);
                        completed += 1;
                        progressed = true;
                    }
                    Poll::Pending => still_pending.push(task),
                }
            }

            let spawned_meanwhile = match self.tasks.lock() {
                Ok(mut tasks) => {
                    let spawned = std::mem::replace(&mut *tasks, still_pending);
                    let any_spawned = !spawned.is_empty();
                    tasks.extend(spawned);
                    any_spawned
                }
                Err(_) => return completed,
            };
            if !progressed && !spawned_meanwhile {
                return completed;
            }
        }
    }
}

impl TaskSpawner for QueuedSpawner {
    fn spawn_boxed(&self, future: BoxTask) -> Box<dyn AsyncHandle> {
        let flags = Arc::new(TaskFlags::default());
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(QueuedTask {
                future,
                flags: flags.clone(),
            });
        } else {
            log::warn!("task queue poisoned; dropping spawned task");
            flags.finished.store(true, Ordering::Release);
        }
        Box::new(QueuedHandle(flags))
    }
}

struct QueuedHandle(Arc<TaskFlags>);

impl AsyncHandle for QueuedHandle {
    fn is_finished(&self) -> bool {
        self.0.finished.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_queued_spawner_runs_on_demand() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let handle = spawn(&spawner, async move {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(!handle.is_finished());
        assert_eq!(spawner.run_until_stalled(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.is_finished());
        assert_eq!(spawner.pending(), 0);
    }

    #[test]
    fn test_pending_task_waits_for_signal() {
        let spawner = QueuedSpawner::new();
        let (tx, rx) = futures::channel::oneshot::channel::<u32>();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        spawn(&spawner, async move {
            if let Ok(value) = rx.await {
                s.store(value as usize, Ordering::SeqCst);
            }
        });

        assert_eq!(spawner.run_until_stalled(), 0);
        assert_eq!(spawner.pending(), 1);
        tx.send(7).unwrap();
        assert_eq!(spawner.run_until_stalled(), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_cancelled_task_never_runs() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let c = counter.clone();
        let handle = spawn(&spawner, async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        spawner.run_until_stalled();
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(handle.is_finished());
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let spawner = tokio_impl::TokioSpawner::current().unwrap();
        let handle = spawn(&spawner, async {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(10)).await;
        });

        assert!(!handle.is_finished());
        ::tokio::time::sleep(::tokio::time::Duration::from_millis(50)).await;
        assert!(handle.is_finished());
    }
}
