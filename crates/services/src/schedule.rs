use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const WAITING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// A single delayed job that later calls can replace or call off.
///
/// Scheduling again cancels whatever was still waiting. Once the delay has
/// elapsed the job runs to completion and is no longer cancellable. Jobs that
/// have fired run one at a time, in the order they fired. Dropping the handle
/// cancels a job that has not fired yet.
///
/// Must be used from within a tokio runtime.
#[derive(Default)]
pub struct ScheduledTask {
    pending: Option<Pending>,
    fired: Vec<JoinHandle<()>>,
    turn: Arc<Mutex<()>>,
}

struct Pending {
    state: Arc<AtomicU8>,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `job` after `delay`, replacing any job still waiting.
    pub fn schedule<F>(&mut self, delay: Duration, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.retire_pending();
        self.fired.retain(|handle| !handle.is_finished());

        let state = Arc::new(AtomicU8::new(WAITING));
        let gate = Arc::clone(&state);
        let turn = Arc::clone(&self.turn);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if gate
                .compare_exchange(WAITING, FIRED, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                let _turn = turn.lock().await;
                job.await;
            }
        });
        self.pending = Some(Pending { state, handle });
    }

    /// Call off a job that has not fired yet.
    ///
    /// Returns `true` if a waiting job was cancelled. A job already running
    /// is left to finish.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };
        let cancelled = pending
            .state
            .compare_exchange(WAITING, CANCELLED, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok();
        if cancelled {
            pending.handle.abort();
            self.pending = None;
        }
        cancelled
    }

    /// Cancel a waiting job and wait for every job that already fired.
    ///
    /// Afterwards nothing scheduled through this handle is in flight.
    pub async fn settle(&mut self) {
        self.cancel();
        self.retire_pending();
        for handle in self.fired.drain(..) {
            // A panicking job has nothing left to report here.
            let _ = handle.await;
        }
    }

    /// `true` while a job is waiting for its delay to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.state.load(Ordering::SeqCst) == WAITING)
    }

    /// Move a job that could not be cancelled over to the fired list.
    fn retire_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            self.fired.push(pending.handle);
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.cancel();
    }
}
