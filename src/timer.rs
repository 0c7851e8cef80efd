use core::fmt;

use heapless::Vec;

/// Opaque token for one scheduled callback. Handles are never reused within
/// a queue's lifetime, so cancelling an already-fired handle is a no-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerError {
    QueueFull { capacity: usize },
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QueueFull { capacity } => {
                write!(f, "timer queue full (capacity {capacity})")
            }
        }
    }
}

impl std::error::Error for TimerError {}

#[derive(Clone, Copy, Debug)]
struct PendingTimer<T> {
    handle: TimerHandle,
    due_ms: u64,
    token: T,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer<T> {
    pub handle: TimerHandle,
    pub due_ms: u64,
    pub token: T,
}

/// Fixed-capacity set of cancellable delayed callbacks driven by the host
/// clock. Nothing fires on its own: the owner pops due entries when it is
/// handed a `now_ms` at or past their deadline.
pub struct TimerQueue<T, const N: usize> {
    pending: Vec<PendingTimer<T>, N>,
    next_id: u32,
}

impl<T: Copy, const N: usize> Default for TimerQueue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize> TimerQueue<T, N> {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 1,
        }
    }

    pub fn schedule(
        &mut self,
        now_ms: u64,
        delay_ms: u64,
        token: T,
    ) -> Result<TimerHandle, TimerError> {
        let handle = TimerHandle(self.next_id);
        let entry = PendingTimer {
            handle,
            due_ms: now_ms.saturating_add(delay_ms),
            token,
        };
        self.pending
            .push(entry)
            .map_err(|_| TimerError::QueueFull { capacity: N })?;
        self.next_id = self.next_id.wrapping_add(1);
        Ok(handle)
    }

    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|p| p.handle == handle) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|p| p.handle == handle)
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|p| p.due_ms).min()
    }

    /// Removes and returns the earliest timer due at or before `now_ms`.
    /// Timers sharing a deadline come out in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer<T>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by_key(|(_, p)| (p.due_ms, p.handle.0))
            .map(|(idx, _)| idx)?;
        let fired = self.pending.swap_remove(idx);
        Some(FiredTimer {
            handle: fired.handle,
            due_ms: fired.due_ms,
            token: fired.token,
        })
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
