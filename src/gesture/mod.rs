use core::mem;

use statig::blocking::IntoStateMachineExt as _;

mod hsm;
mod trace;
mod track;
mod utils;

use hsm::ArbiterHsm;

use crate::{
    config::{ConfigError, GestureConfig},
    timer::TimerQueue,
    types::{Activation, GestureKind, TouchFrame, TouchPoint},
};

pub use trace::{ArbiterStateId, ArbiterTrace, RejectReason};
pub use track::{Contact, ContactTable, GestureTrack, TrackState};

pub(crate) use utils::centroid;

/// One disambiguation plus one long-press timer per track, with headroom for
/// a superseded track's entries while they are being cancelled.
pub const GESTURE_TIMER_SLOTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerPhase {
    Disambiguation,
    LongPress,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureTimer {
    pub phase: TimerPhase,
    pub generation: u32,
}

type GestureTimers = TimerQueue<GestureTimer, GESTURE_TIMER_SLOTS>;

#[derive(Clone, Copy, Debug)]
enum ArbiterEvent {
    Touch {
        now_ms: u64,
        frame: TouchFrame,
        origin_valid: bool,
    },
    Timer {
        now_ms: u64,
        timer: GestureTimer,
    },
}

struct DispatchContext {
    timers: GestureTimers,
    overlay_open: bool,
    activation: Option<Activation>,
    reject_reason: RejectReason,
}

impl DispatchContext {
    fn new(timers: GestureTimers, overlay_open: bool) -> Self {
        Self {
            timers,
            overlay_open,
            activation: None,
            reject_reason: RejectReason::None,
        }
    }

    fn reject(&mut self, reason: RejectReason) {
        self.reject_reason = reason;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArbiterOutput {
    pub activation: Option<Activation>,
    pub trace: ArbiterTrace,
}

/// What the presentation layer needs to draw an in-progress indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureIndicator {
    pub pending: bool,
    pub kind: Option<GestureKind>,
    pub points: [Option<TouchPoint>; 2],
    pub centroid: Option<TouchPoint>,
    pub down_ms: Option<u64>,
    /// Set once the long-press timer is running.
    pub armed_ms: Option<u64>,
}

/// Routes raw touch events and timer expirations to the single active
/// gesture track.
///
/// The arbiter only observes: it never claims or rewrites a frame.
pub struct GestureArbiter {
    machine: statig::blocking::StateMachine<ArbiterHsm>,
    timers: GestureTimers,
    last_trace: ArbiterTrace,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::from_validated(GestureConfig::default())
    }
}

impl GestureArbiter {
    pub fn new(config: GestureConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    pub(crate) fn from_validated(config: GestureConfig) -> Self {
        Self {
            machine: ArbiterHsm::new(config).state_machine(),
            timers: GestureTimers::new(),
            last_trace: ArbiterTrace::default(),
        }
    }

    /// `origin_valid` is the touch-validity verdict for the frame's origin.
    /// It only matters for a `Start` frame or the first frame that reports a
    /// second contact.
    pub fn handle_touch(
        &mut self,
        now_ms: u64,
        frame: &TouchFrame,
        origin_valid: bool,
        overlay_open: bool,
    ) -> ArbiterOutput {
        self.dispatch(
            ArbiterEvent::Touch {
                now_ms,
                frame: *frame,
                origin_valid,
            },
            overlay_open,
        )
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.timers.next_due_ms()
    }

    /// Fires the earliest timer due at or before `now_ms`, using its own
    /// deadline as the clock. Returns `None` when nothing is due.
    pub fn fire_due(&mut self, now_ms: u64, overlay_open: bool) -> Option<ArbiterOutput> {
        let fired = self.timers.pop_due(now_ms)?;
        Some(self.dispatch(
            ArbiterEvent::Timer {
                now_ms: fired.due_ms,
                timer: fired.token,
            },
            overlay_open,
        ))
    }

    pub fn state_id(&self) -> ArbiterStateId {
        self.machine.inner().state_id
    }

    pub fn track(&self) -> Option<&GestureTrack> {
        self.machine.inner().track.as_ref()
    }

    pub fn contacts(&self) -> &ContactTable {
        &self.machine.inner().contacts
    }

    pub fn last_trace(&self) -> ArbiterTrace {
        self.last_trace
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn indicator(&self) -> GestureIndicator {
        let hsm = self.machine.inner();
        let live = hsm.track.filter(|track| track.state.is_live());
        GestureIndicator {
            pending: live.is_some(),
            kind: live.map(|track| track.kind),
            points: hsm.contacts.positions(),
            centroid: hsm.contacts.centroid(),
            down_ms: live.map(|track| track.down_ms),
            armed_ms: live.and_then(|track| track.armed_ms),
        }
    }

    #[cfg(test)]
    fn inject_timer(&mut self, now_ms: u64, timer: GestureTimer) -> ArbiterOutput {
        self.dispatch(ArbiterEvent::Timer { now_ms, timer }, false)
    }

    fn dispatch(&mut self, event: ArbiterEvent, overlay_open: bool) -> ArbiterOutput {
        let now_ms = match event {
            ArbiterEvent::Touch { now_ms, .. } | ArbiterEvent::Timer { now_ms, .. } => now_ms,
        };
        let mut context = DispatchContext::new(mem::take(&mut self.timers), overlay_open);
        self.machine.handle_with_context(&event, &mut context);
        self.timers = context.timers;

        let hsm = self.machine.inner();
        self.last_trace = ArbiterTrace {
            now_ms,
            state_id: hsm.state_id,
            reject_reason: context.reject_reason,
            generation: hsm.generation,
            touch_count: hsm.contacts.count(),
        };
        ArbiterOutput {
            activation: context.activation,
            trace: self.last_trace,
        }
    }
}
