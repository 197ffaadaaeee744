//! Where chunk generation runs.
//!
//! The manager reserves a placeholder record before handing a job to the
//! scheduler, and results always come back through a channel that only the
//! manager drains. A scheduler therefore decides *when* and *where* content
//! is generated, never who mutates the registry.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use tokio::runtime::{Builder, Handle, Runtime};

use crate::core::types::Result;

/// Deferred generation work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Runs jobs off the critical path
pub trait Scheduler: Send + Sync {
    fn schedule(&self, job: Job);

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Runs every job inline, before `schedule` returns.
///
/// Used at startup and in tests; results are still finalized through the
/// manager's completion channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn schedule(&self, job: Job) {
        job();
    }

    fn name(&self) -> &'static str {
        "immediate"
    }
}

/// Cooperative scheduler: jobs wait until the host has idle time.
///
/// Share it with `Arc` between the manager and the host loop, which calls
/// [`IdleScheduler::run_idle`] after presenting a frame.
#[derive(Default)]
pub struct IdleScheduler {
    jobs: Mutex<VecDeque<Job>>,
}

impl IdleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of jobs waiting for idle time
    pub fn pending(&self) -> usize {
        self.lock().len()
    }

    /// Run queued jobs until `budget` has elapsed. At least one job runs if
    /// any are queued. Returns the number of jobs run.
    pub fn run_idle(&self, budget: Duration) -> usize {
        let start = Instant::now();
        let mut ran = 0;
        loop {
            if ran > 0 && start.elapsed() >= budget {
                break;
            }
            // Lock is released before the job runs so jobs may schedule more work
            let Some(job) = self.lock().pop_front() else {
                break;
            };
            job();
            ran += 1;
        }
        ran
    }

    /// Run every queued job, including jobs queued while running
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        loop {
            let Some(job) = self.lock().pop_front() else {
                break;
            };
            job();
            ran += 1;
        }
        ran
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Job>> {
        self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for IdleScheduler {
    fn schedule(&self, job: Job) {
        self.lock().push_back(job);
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Generates on tokio's blocking thread pool.
pub struct WorkerScheduler {
    handle: Handle,
    /// Owned runtime, if this scheduler created one
    _runtime: Option<Runtime>,
}

impl WorkerScheduler {
    /// Create a dedicated runtime with `threads` blocking workers
    pub fn new(threads: usize) -> Result<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(threads.max(1))
            .thread_name("metrogrid-gen")
            .build()?;

        log::debug!("worker scheduler started with {} generation threads", threads.max(1));

        Ok(Self {
            handle: runtime.handle().clone(),
            _runtime: Some(runtime),
        })
    }

    /// Use a runtime the caller already owns
    pub fn with_handle(handle: Handle) -> Self {
        Self {
            handle,
            _runtime: None,
        }
    }
}

impl Scheduler for WorkerScheduler {
    fn schedule(&self, job: Job) {
        // Completion is reported through the manager's channel, not the JoinHandle
        drop(self.handle.spawn_blocking(job));
    }

    fn name(&self) -> &'static str {
        "worker"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_job(counter: &Arc<AtomicUsize>) -> Job {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_immediate_runs_inline() {
        let counter = Arc::new(AtomicUsize::new(0));
        ImmediateScheduler.schedule(counting_job(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_idle_defers_until_run() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = IdleScheduler::new();
        for _ in 0..3 {
            scheduler.schedule(counting_job(&counter));
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 3);

        assert_eq!(scheduler.run_all(), 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_idle_budget_runs_at_least_one() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = IdleScheduler::new();
        for _ in 0..4 {
            scheduler.schedule(counting_job(&counter));
        }
        assert_eq!(scheduler.run_idle(Duration::ZERO), 1);
        assert_eq!(scheduler.pending(), 3);
    }

    #[test]
    fn test_idle_job_can_schedule_more() {
        let counter = Arc::new(AtomicUsize::new(0));
        let scheduler = Arc::new(IdleScheduler::new());

        let inner = Arc::clone(&scheduler);
        let follow_up = counting_job(&counter);
        scheduler.schedule(Box::new(move || inner.schedule(follow_up)));

        assert_eq!(scheduler.run_all(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_worker_runs_jobs() {
        let scheduler = WorkerScheduler::new(2).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        for i in 0..4 {
            let tx = tx.clone();
            scheduler.schedule(Box::new(move || {
                let _ = tx.send(i);
            }));
        }
        let mut seen: Vec<i32> = (0..4).map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap()).collect();
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_worker_on_caller_runtime() {
        let runtime = Builder::new_multi_thread().worker_threads(1).build().unwrap();
        let scheduler = WorkerScheduler::with_handle(runtime.handle().clone());
        assert_eq!(scheduler.name(), "worker");

        let (tx, rx) = std::sync::mpsc::channel();
        for i in 0..3 {
            let tx = tx.clone();
            scheduler.schedule(Box::new(move || {
                let _ = tx.send((i, std::thread::current().id()));
            }));
        }
        let mut seen: Vec<i32> = Vec::new();
        for _ in 0..3 {
            let (i, thread) = rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert_ne!(thread, std::thread::current().id());
            seen.push(i);
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2]);

        // The scheduler borrows the runtime; dropping it leaves the runtime usable
        drop(scheduler);
        assert_eq!(runtime.block_on(async { 5 }), 5);
    }
}
