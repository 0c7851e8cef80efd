use crate::timer::{TimerError, TimerHandle, TimerQueue};

pub const TEARDOWN_TIMER_SLOTS: usize = 2;

pub type TeardownQueue = TimerQueue<TeardownTimer, TEARDOWN_TIMER_SLOTS>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TeardownTimer {
    generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    Registered,
    GracePending,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Registration {
    /// No callback was live; the recognizer listener must be attached.
    Attached,
    /// A callback was already live (possibly in its grace window) and was
    /// replaced in place.
    Reused,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Delivery<H> {
    pub handler: H,
    /// The consuming overlay had already closed when the result arrived.
    pub late: bool,
}

/// Holds the single live recognition-result callback and its deferred
/// teardown.
///
/// Closing the overlay does not drop the callback: the recognizer can still
/// deliver one result after it was told to stop, so a teardown timer is armed
/// instead and any result arriving before it fires is still delivered.
pub struct VoiceResultChannel<H> {
    handler: Option<H>,
    teardown: Option<TimerHandle>,
    generation: u32,
}

impl<H> Default for VoiceResultChannel<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> VoiceResultChannel<H> {
    pub const fn new() -> Self {
        Self {
            handler: None,
            teardown: None,
            generation: 0,
        }
    }

    pub fn state(&self) -> ChannelState {
        match (&self.handler, self.teardown) {
            (None, _) => ChannelState::Idle,
            (Some(_), None) => ChannelState::Registered,
            (Some(_), Some(_)) => ChannelState::GracePending,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.handler.is_some()
    }

    pub fn handler(&self) -> Option<&H> {
        self.handler.as_ref()
    }

    pub fn register(&mut self, handler: H, timers: &mut TeardownQueue) -> Registration {
        self.cancel_teardown(timers);
        let previous = self.handler.replace(handler);
        if previous.is_some() {
            Registration::Reused
        } else {
            Registration::Attached
        }
    }

    /// Drops the callback immediately. Returns whether one was live.
    pub fn clear(&mut self, timers: &mut TeardownQueue) -> bool {
        self.cancel_teardown(timers);
        self.generation = self.generation.wrapping_add(1);
        self.handler.take().is_some()
    }

    /// Arms the late-result teardown. Returns `Ok(false)` when there is no
    /// callback to keep alive or a teardown is already pending.
    pub fn overlay_closed(
        &mut self,
        now_ms: u64,
        grace_ms: u64,
        timers: &mut TeardownQueue,
    ) -> Result<bool, TimerError> {
        if self.handler.is_none() || self.teardown.is_some() {
            return Ok(false);
        }
        self.generation = self.generation.wrapping_add(1);
        let token = TeardownTimer {
            generation: self.generation,
        };
        self.teardown = Some(timers.schedule(now_ms, grace_ms, token)?);
        Ok(true)
    }

    /// Hands the live callback to the caller and returns the channel to idle.
    /// `None` means nothing is listening and the result is dropped.
    pub fn deliver(&mut self, timers: &mut TeardownQueue) -> Option<Delivery<H>> {
        let handler = self.handler.take()?;
        let late = self.cancel_teardown(timers);
        self.generation = self.generation.wrapping_add(1);
        Some(Delivery { handler, late })
    }

    /// Returns `true` when the timer was the live teardown and the channel
    /// has been cleared by it.
    pub fn teardown_fired(&mut self, timer: TeardownTimer) -> bool {
        if self.teardown.is_none() || timer.generation != self.generation {
            return false;
        }
        self.teardown = None;
        self.handler = None;
        self.generation = self.generation.wrapping_add(1);
        true
    }

    fn cancel_teardown(&mut self, timers: &mut TeardownQueue) -> bool {
        match self.teardown.take() {
            Some(handle) => {
                timers.cancel(handle);
                true
            }
            None => false,
        }
    }
}
