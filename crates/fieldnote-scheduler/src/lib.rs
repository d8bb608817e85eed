//! Fieldnote Admission Scheduler
//!
//! A single-flight FIFO gate: at most one engine invocation executes at a
//! time across all users. Callers enroll in a process-wide wait list, poll
//! until they reach the head and the slot is free, and hold an RAII
//! [`AdmissionGuard`] while they run. Dropping the guard releases the slot
//! and dequeues the caller, so a panic mid-operation cannot wedge the
//! system. Waiting past the timeout evicts the request with an advisory
//! "resubmit" error; an already admitted request is never evicted.
//!
//! Enrollment and admission are separate steps so that queue order is
//! determined by [`AdmissionScheduler::enroll`] calls, not by task
//! scheduling.
//!
//! # Examples
//!
//! ```no_run
//! # async fn demo() -> Result<(), fieldnote_scheduler::SchedulerError> {
//! use fieldnote_scheduler::AdmissionScheduler;
//!
//! let scheduler = AdmissionScheduler::new();
//! let ticket = scheduler.enroll("session-1");
//! let guard = ticket.wait(|position, total| {
//!     println!("waiting: {position}/{total}");
//! }).await?;
//! // ... run the engine operation ...
//! drop(guard);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from the admission scheduler.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SchedulerError {
    /// The request waited past the timeout and was evicted from the list.
    /// Advisory: the caller should simply resubmit.
    #[error("timed out waiting for the engine after {0:?}; please resubmit")]
    TimedOut(Duration),
}

/// Scheduler tuning knobs.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// How often a waiting request re-checks its position.
    pub poll_interval: Duration,

    /// How long a request may wait before eviction.
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug)]
struct Waiter {
    ticket_id: u64,
    session_id: String,
}

#[derive(Debug, Default)]
struct QueueState {
    waiting: VecDeque<Waiter>,
    executing: bool,
    next_ticket: u64,
}

#[derive(Debug)]
struct Inner {
    state: Mutex<QueueState>,
    config: SchedulerConfig,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn dequeue(&self, ticket_id: u64) {
        let mut state = self.lock();
        state.waiting.retain(|w| w.ticket_id != ticket_id);
    }
}

/// Process-wide single-slot FIFO scheduler. Cheap to clone; clones share
/// one queue.
#[derive(Clone)]
pub struct AdmissionScheduler {
    inner: Arc<Inner>,
}

impl AdmissionScheduler {
    /// Scheduler with the default 2 s poll / 120 s timeout policy.
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Scheduler with explicit tuning.
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(QueueState::default()),
                config,
            }),
        }
    }

    /// Join the wait list. Queue position is fixed at this point; call
    /// [`Ticket::wait`] to poll for admission.
    pub fn enroll(&self, session_id: &str) -> Ticket {
        let mut state = self.inner.lock();
        let ticket_id = state.next_ticket;
        state.next_ticket += 1;
        state.waiting.push_back(Waiter {
            ticket_id,
            session_id: session_id.to_string(),
        });
        debug!(session_id, position = state.waiting.len(), "request enrolled");
        Ticket {
            inner: Arc::clone(&self.inner),
            ticket_id,
            session_id: session_id.to_string(),
            enrolled_at: Instant::now(),
            settled: false,
        }
    }

    /// Number of requests currently waiting (admitted head included).
    pub fn queue_len(&self) -> usize {
        self.inner.lock().waiting.len()
    }
}

impl Default for AdmissionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// An enrolled, not-yet-admitted request. Dropping it without waiting
/// withdraws it from the queue.
pub struct Ticket {
    inner: Arc<Inner>,
    ticket_id: u64,
    session_id: String,
    enrolled_at: Instant,
    settled: bool,
}

impl Ticket {
    /// Poll until admitted or evicted.
    ///
    /// `on_status` fires with `(position, total)` (position is 1-based)
    /// whenever either number changes while waiting. The callback runs
    /// outside the queue lock, so it may inspect the scheduler.
    pub async fn wait<F>(mut self, mut on_status: F) -> Result<AdmissionGuard, SchedulerError>
    where
        F: FnMut(usize, usize),
    {
        let mut last_status: Option<(usize, usize)> = None;

        loop {
            let status = {
                let mut state = self.inner.lock();
                let position = state
                    .waiting
                    .iter()
                    .position(|w| w.ticket_id == self.ticket_id)
                    // Only a guard or timeout removes the entry; it is
                    // still here while `self` exists.
                    .unwrap_or(0);

                if position == 0 && !state.executing {
                    state.executing = true;
                    info!(session_id = %self.session_id, "request admitted");
                    self.settled = true;
                    return Ok(AdmissionGuard {
                        inner: Arc::clone(&self.inner),
                        ticket_id: self.ticket_id,
                    });
                }

                (position + 1, state.waiting.len())
            };

            // Invoked with the lock released, so re-entrant callbacks
            // cannot deadlock.
            if last_status != Some(status) {
                on_status(status.0, status.1);
                last_status = Some(status);
            }

            if self.enrolled_at.elapsed() >= self.inner.config.timeout {
                warn!(session_id = %self.session_id, "request evicted after timeout");
                self.inner.dequeue(self.ticket_id);
                self.settled = true;
                return Err(SchedulerError::TimedOut(self.inner.config.timeout));
            }

            tokio::time::sleep(self.inner.config.poll_interval).await;
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if !self.settled {
            self.inner.dequeue(self.ticket_id);
        }
    }
}

/// Possession of the execution slot. The caller stays at the head of the
/// queue while it runs; dropping the guard dequeues it and frees the slot.
#[derive(Debug)]
pub struct AdmissionGuard {
    inner: Arc<Inner>,
    ticket_id: u64,
}

impl Drop for AdmissionGuard {
    fn drop(&mut self) {
        let mut state = self.inner.lock();
        state.waiting.retain(|w| w.ticket_id != self.ticket_id);
        state.executing = false;
        debug!("execution slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    fn fast_scheduler(timeout_ms: u64) -> AdmissionScheduler {
        AdmissionScheduler::with_config(SchedulerConfig {
            poll_interval: Duration::from_millis(5),
            timeout: Duration::from_millis(timeout_ms),
        })
    }

    #[tokio::test]
    async fn test_first_enrollee_is_admitted_immediately() {
        let scheduler = fast_scheduler(1_000);
        let guard = scheduler.enroll("a").wait(|_, _| {}).await.unwrap();
        assert_eq!(scheduler.queue_len(), 1, "admitted head stays enqueued");
        drop(guard);
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fifo_admission_order() {
        let scheduler = fast_scheduler(5_000);
        let order = Arc::new(StdMutex::new(Vec::new()));

        // Enroll in a fixed order before any task starts waiting; queue
        // position is decided at enrollment, not at poll time.
        let tickets: Vec<Ticket> = ["a", "b", "c"]
            .iter()
            .map(|s| scheduler.enroll(s))
            .collect();

        let mut handles = Vec::new();
        for (name, ticket) in ["a", "b", "c"].iter().zip(tickets) {
            let order = Arc::clone(&order);
            let name = name.to_string();
            // B's work would finish fastest; order must still be a, b, c.
            let hold = match name.as_str() {
                "a" => 50,
                "b" => 1,
                _ => 20,
            };
            handles.push(tokio::spawn(async move {
                let guard = ticket.wait(|_, _| {}).await.unwrap();
                order.lock().unwrap().push(name);
                tokio::time::sleep(Duration::from_millis(hold)).await;
                drop(guard);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_waiting_request_times_out_with_advisory() {
        let scheduler = fast_scheduler(50);
        let guard = scheduler.enroll("a").wait(|_, _| {}).await.unwrap();

        let err = scheduler.enroll("b").wait(|_, _| {}).await.unwrap_err();
        assert!(matches!(err, SchedulerError::TimedOut(_)));
        assert!(err.to_string().contains("resubmit"));

        // The evicted request left the queue; the admitted one did not.
        assert_eq!(scheduler.queue_len(), 1);
        drop(guard);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_admitted_request_is_immune_to_eviction() {
        let scheduler = fast_scheduler(30);
        let guard = scheduler.enroll("a").wait(|_, _| {}).await.unwrap();
        // Hold the slot far past the timeout.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(scheduler.queue_len(), 1);
        drop(guard);
        assert_eq!(scheduler.queue_len(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_status_callback_fires_on_change_only() {
        let scheduler = fast_scheduler(5_000);
        let guard = scheduler.enroll("a").wait(|_, _| {}).await.unwrap();

        let updates = Arc::new(StdMutex::new(Vec::new()));
        let updates_clone = Arc::clone(&updates);
        let ticket = scheduler.enroll("b");
        let waiter = tokio::spawn(async move {
            ticket
                .wait(move |position, total| {
                    updates_clone.lock().unwrap().push((position, total));
                })
                .await
        });

        // Let it poll several times at an unchanged position.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*updates.lock().unwrap(), vec![(2, 2)]);

        drop(guard);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_status_callback_may_inspect_the_scheduler() {
        let scheduler = fast_scheduler(5_000);
        let guard = scheduler.enroll("a").wait(|_, _| {}).await.unwrap();

        // A callback that re-enters the scheduler must not deadlock on
        // the queue lock.
        let observer = scheduler.clone();
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let ticket = scheduler.enroll("b");
        let waiter = tokio::spawn(async move {
            ticket
                .wait(move |_, _| {
                    seen_clone.lock().unwrap().push(observer.queue_len());
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        drop(guard);
        waiter.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_dropping_a_ticket_withdraws_it() {
        let scheduler = fast_scheduler(1_000);
        let ticket = scheduler.enroll("a");
        assert_eq!(scheduler.queue_len(), 1);
        drop(ticket);
        assert_eq!(scheduler.queue_len(), 0);
    }
}
