//! Shared agent state.
//!
//! One `AgentState` is constructed at startup and handed to every component
//! as an `Arc`. `active_jobs` is incremented by the router (on the session
//! task, when a lease is admitted) and decremented by the job executor (on
//! its own task, when the job terminates) — the source this is grounded on
//! does this update without synchronization, which is a latent race; here
//! it is a single `AtomicUsize` so both sides are safe regardless of which
//! task performs which half.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::AgentConfig;
use crate::queue::OutboundQueue;

pub struct AgentState {
    pub config: AgentConfig,
    pub agent_id: String,
    pub outbound: OutboundQueue,
    active_jobs: AtomicUsize,
    should_exit: AtomicBool,
    job_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl AgentState {
    pub fn new(config: AgentConfig, outbound: OutboundQueue) -> Arc<Self> {
        let agent_id = config.agent_id();
        Arc::new(Self {
            config,
            agent_id,
            outbound,
            active_jobs: AtomicUsize::new(0),
            should_exit: AtomicBool::new(false),
            job_handles: Mutex::new(Vec::new()),
        })
    }

    /// Retains a spawned job's handle so it can be joined on shutdown
    /// instead of left to run fire-and-forget.
    pub async fn track_job(&self, handle: JoinHandle<()>) {
        self.job_handles.lock().await.push(handle);
    }

    /// Joins every tracked job handle, dropping ones that already
    /// finished. Called once by the supervisor during shutdown.
    pub async fn join_all_jobs(&self) {
        let handles: Vec<_> = self.job_handles.lock().await.drain(..).collect();
        for handle in handles {
            let _ = handle.await;
        }
    }

    /// Current number of running jobs.
    pub fn active_jobs(&self) -> usize {
        self.active_jobs.load(Ordering::SeqCst)
    }

    /// Applies the admission rule: if at capacity, returns `false` and
    /// leaves the counter untouched (the lease is dropped by the caller).
    /// Otherwise increments the counter and returns `true`.
    pub fn try_admit_job(&self) -> bool {
        loop {
            let current = self.active_jobs.load(Ordering::SeqCst);
            if current >= self.config.concurrency() {
                return false;
            }
            if self
                .active_jobs
                .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return true;
            }
        }
    }

    /// Releases a job slot. Called exactly once per admitted job, when it
    /// terminates (success, failure, or timeout).
    pub fn release_job(&self) {
        self.active_jobs.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn should_exit(&self) -> bool {
        self.should_exit.load(Ordering::SeqCst)
    }

    pub fn set_should_exit(&self) {
        self.should_exit.store(true, Ordering::SeqCst);
    }
}
