//! Cancellable delayed tasks
//!
//! All choreography delays (paper close, pause grace, intro hold/fade, finale)
//! go through the [`Scheduler`]. Tasks fire from inside `tick`, earliest due
//! time first, ties in scheduling order. A handle can be cancelled at any
//! point before it fires, so a stale timer never acts on a newer interaction.

use super::state::EnvelopeId;

/// Work the scheduler can run later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Finish a dismiss after the paper close animation
    ZoomOut(EnvelopeId),
    /// End the post zoom-out grace period
    ReleasePause,
    /// Start fading the boss intro panel
    FadeIntro,
    /// Intro is gone, release the gold envelope
    BeginBoss,
    /// Gold letter read, roll the credits
    Finale,
}

/// Opaque handle to a scheduled task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Scheduled {
    handle: TimerHandle,
    due_ms: f64,
    task: Task,
}

/// Pending delayed tasks
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    next_handle: u64,
    pending: Vec<Scheduled>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay_ms` has elapsed after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64, task: Task) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Scheduled {
            handle,
            due_ms: now_ms + delay_ms.max(0.0),
            task,
        });
        handle
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|s| s.handle != handle);
        self.pending.len() != before
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|s| s.handle == handle)
    }

    /// Remove and return the earliest task due at `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<(TimerHandle, Task)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(i, _)| i)?;
        let s = self.pending.remove(idx);
        Some((s.handle, s.task))
    }

    /// Due time of a pending task
    pub fn due_ms(&self, handle: TimerHandle) -> Option<f64> {
        self.pending
            .iter()
            .find(|s| s.handle == handle)
            .map(|s| s.due_ms)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
