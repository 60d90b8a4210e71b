//! One-shot deferred tasks on the simulation clock.
//!
//! The clock only moves when the simulation ticks, so delays are measured
//! in simulated seconds and replays are deterministic.

/// Slack for accumulated tick-sum rounding when comparing deadlines.
const DUE_EPSILON: f64 = 1e-9;

/// Deferred work the environment runs on the simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    /// Avatar combo window elapsed
    ResetJumpCombo,
    RevertCourtMaterial,
    ClearScoreMessage,
}

/// Handle to a scheduled task, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Pending<T> {
    id: TimerId,
    due: f64,
    task: T,
}

#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    now: f64,
    next_id: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Current simulated time in seconds
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Run `task` once, `delay` seconds from now.
    pub fn schedule(&mut self, delay: f64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending {
            id,
            due: self.now + delay.max(0.0),
            task,
        });
        id
    }

    /// Drop a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.pending.iter().position(|p| p.id == id) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Advance the clock and return every task that came due, earliest
    /// first (ties in scheduling order).
    pub fn advance(&mut self, dt: f64) -> Vec<T> {
        self.now += dt;
        let limit = self.now + DUE_EPSILON;

        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= limit);
        self.pending = rest;

        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|p| p.task).collect()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
