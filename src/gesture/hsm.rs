use log::{debug, info, warn};
use statig::prelude::*;

use super::utils::{centroid, exceeds_threshold};
use super::*;
use crate::{timer::TimerError, types::TouchPhase};

pub(super) struct ArbiterHsm {
    pub(super) config: GestureConfig,
    pub(super) contacts: ContactTable,
    pub(super) track: Option<GestureTrack>,
    pub(super) generation: u32,
    pub(super) state_id: ArbiterStateId,
}

impl ArbiterHsm {
    pub(super) fn new(config: GestureConfig) -> Self {
        Self {
            config,
            contacts: ContactTable::default(),
            track: None,
            generation: 0,
            state_id: ArbiterStateId::Idle,
        }
    }

    fn go(&mut self, id: ArbiterStateId) -> Outcome<State> {
        if self.state_id != id {
            debug!(
                "gesture: {:?} -> {:?} gen={}",
                self.state_id, id, self.generation
            );
        }
        self.state_id = id;
        Transition(match id {
            ArbiterStateId::Idle => State::idle(),
            ArbiterStateId::SinglePending => State::single_pending(),
            ArbiterStateId::SingleArmed => State::single_armed(),
            ArbiterStateId::DualArmed => State::dual_armed(),
            ArbiterStateId::Completed => State::completed(),
            ArbiterStateId::Cancelled => State::cancelled(),
        })
    }

    fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn begin_single(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        point: TouchPoint,
    ) -> Result<(), TimerError> {
        let generation = self.next_generation();
        let handle = context.timers.schedule(
            now_ms,
            self.config.second_finger_grace_ms,
            GestureTimer {
                phase: TimerPhase::Disambiguation,
                generation,
            },
        )?;
        self.track = Some(GestureTrack {
            kind: GestureKind::Single,
            state: TrackState::Pending,
            origin: point,
            down_ms: now_ms,
            armed_ms: None,
            generation,
            disambiguation: Some(handle),
            long_press: None,
        });
        Ok(())
    }

    /// Remaining long-press time is measured from `down_ms`, so a promoted
    /// gesture completes at the same moment the single one would have.
    fn begin_dual(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        down_ms: u64,
        points: [TouchPoint; 2],
    ) -> Result<(), TimerError> {
        let generation = self.next_generation();
        let elapsed = now_ms.saturating_sub(down_ms);
        let delay = self.config.long_press_delay_ms.saturating_sub(elapsed);
        let handle = context.timers.schedule(
            now_ms,
            delay,
            GestureTimer {
                phase: TimerPhase::LongPress,
                generation,
            },
        )?;
        self.track = Some(GestureTrack {
            kind: GestureKind::Dual,
            state: TrackState::Armed,
            origin: centroid(points[0], points[1]),
            down_ms,
            armed_ms: Some(now_ms),
            generation,
            disambiguation: None,
            long_press: Some(handle),
        });
        Ok(())
    }

    fn arm_single(&mut self, context: &mut DispatchContext, now_ms: u64) -> Result<(), TimerError> {
        let delay = self
            .config
            .long_press_delay_ms
            .saturating_sub(self.config.second_finger_grace_ms);
        let generation = self.generation;
        let handle = context.timers.schedule(
            now_ms,
            delay,
            GestureTimer {
                phase: TimerPhase::LongPress,
                generation,
            },
        )?;
        if let Some(track) = self.track.as_mut() {
            track.state = TrackState::Armed;
            track.armed_ms = Some(now_ms);
            track.long_press = Some(handle);
        }
        Ok(())
    }

    fn release_timers(track: &mut GestureTrack, context: &mut DispatchContext) {
        if let Some(handle) = track.disambiguation.take() {
            context.timers.cancel(handle);
        }
        if let Some(handle) = track.long_press.take() {
            context.timers.cancel(handle);
        }
    }

    fn cancel_track(&mut self, context: &mut DispatchContext, reason: RejectReason) {
        if let Some(track) = self.track.as_mut() {
            if track.state.is_live() {
                Self::release_timers(track, context);
                track.state = TrackState::Cancelled;
                debug!(
                    "gesture: cancel kind={:?} gen={} reason={:?}",
                    track.kind, track.generation, reason
                );
            }
        }
        self.next_generation();
        context.reject(reason);
    }

    fn complete_track(&mut self, context: &mut DispatchContext, now_ms: u64) {
        let Some(track) = self.track.as_mut() else {
            return;
        };
        Self::release_timers(track, context);
        track.state = TrackState::Completed;
        let activation = Activation {
            kind: track.kind,
            t_ms: now_ms,
            down_ms: track.down_ms,
            origin: track.origin,
        };
        info!(
            "gesture: complete kind={:?} held_ms={} x={} y={}",
            activation.kind,
            activation.held_ms(),
            activation.origin.x,
            activation.origin.y
        );
        context.activation = Some(activation);
        self.next_generation();
    }

    /// True only for a timer scheduled by the live track for `phase`. Clears
    /// the handle since the queue has already dropped the entry.
    fn claim_timer(&mut self, timer: &GestureTimer, phase: TimerPhase) -> bool {
        let Some(track) = self.track.as_mut() else {
            return false;
        };
        if !track.state.is_live() || track.generation != timer.generation || timer.phase != phase
        {
            return false;
        }
        match phase {
            TimerPhase::Disambiguation => track.disambiguation = None,
            TimerPhase::LongPress => track.long_press = None,
        }
        true
    }

    fn single_moved(&self, frame: &TouchFrame) -> bool {
        self.track.is_some_and(|track| {
            exceeds_threshold(
                track.origin,
                frame.points[0],
                self.config.movement_threshold_px,
            )
        })
    }

    /// Either the centroid or one finger on its own drifting past the
    /// threshold ends a two-finger hold.
    fn dual_moved(&self, frame: &TouchFrame) -> bool {
        let threshold = self.config.movement_threshold_px;
        let current = centroid(frame.points[0], frame.points[1]);
        let centroid_moved = self
            .track
            .is_some_and(|track| exceeds_threshold(track.origin, current, threshold));
        centroid_moved
            || (0..2).any(|slot| {
                self.contacts.contact(slot).is_some_and(|contact| {
                    exceeds_threshold(contact.origin, contact.position, threshold)
                })
            })
    }

    fn timer_unavailable(
        &mut self,
        context: &mut DispatchContext,
        err: TimerError,
    ) -> Outcome<State> {
        warn!("gesture: {err}; dropping gesture");
        self.cancel_track(context, RejectReason::TimerUnavailable);
        self.go(ArbiterStateId::Cancelled)
    }

    fn start_from_idle(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        frame: &TouchFrame,
        origin_valid: bool,
    ) -> Outcome<State> {
        if context.overlay_open {
            context.reject(RejectReason::OverlayOpen);
            return self.go(ArbiterStateId::Cancelled);
        }
        if frame.touch_count > 2 {
            context.reject(RejectReason::ExtraContact);
            return self.go(ArbiterStateId::Cancelled);
        }
        if !origin_valid {
            context.reject(RejectReason::InvalidOrigin);
            return self.go(ArbiterStateId::Cancelled);
        }

        let started = if frame.touch_count == 1 {
            self.begin_single(context, now_ms, frame.points[0])
                .map(|()| ArbiterStateId::SinglePending)
        } else {
            self.begin_dual(context, now_ms, now_ms, frame.points)
                .map(|()| ArbiterStateId::DualArmed)
        };
        match started {
            Ok(id) => self.go(id),
            Err(err) => self.timer_unavailable(context, err),
        }
    }

    /// A second contact showed up while the single track was live: the single
    /// interpretation is cancelled and the dual one takes over.
    fn promote(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        frame: &TouchFrame,
        origin_valid: bool,
    ) -> Outcome<State> {
        let down_ms = self.track.map_or(now_ms, |track| track.down_ms);
        self.cancel_track(context, RejectReason::Superseded);
        if !origin_valid {
            context.reject(RejectReason::InvalidOrigin);
            return self.go(ArbiterStateId::Cancelled);
        }
        match self.begin_dual(context, now_ms, down_ms, frame.points) {
            Ok(()) => {
                context.reject(RejectReason::None);
                self.go(ArbiterStateId::DualArmed)
            }
            Err(err) => self.timer_unavailable(context, err),
        }
    }

    fn single_touch(
        &mut self,
        context: &mut DispatchContext,
        now_ms: u64,
        frame: &TouchFrame,
        origin_valid: bool,
    ) -> Outcome<State> {
        if frame.phase == TouchPhase::Cancel {
            return Super;
        }
        match frame.touch_count {
            1 => {
                self.contacts.update(frame);
                if self.single_moved(frame) {
                    self.cancel_track(context, RejectReason::Moved);
                    return self.go(ArbiterStateId::Cancelled);
                }
                Handled
            }
            2 => {
                self.contacts.update(frame);
                self.promote(context, now_ms, frame, origin_valid)
            }
            _ => Super,
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl ArbiterHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch {
                now_ms,
                frame,
                origin_valid,
            } => {
                self.contacts.update(frame);
                if frame.touch_count == 0 || frame.phase != TouchPhase::Start {
                    return Handled;
                }
                self.start_from_idle(context, *now_ms, frame, *origin_valid)
            }
            ArbiterEvent::Timer { .. } => {
                context.reject(RejectReason::StaleTimer);
                Handled
            }
        }
    }

    #[state(superstate = "tracking")]
    fn single_pending(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
    ) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch {
                now_ms,
                frame,
                origin_valid,
            } => self.single_touch(context, *now_ms, frame, *origin_valid),
            ArbiterEvent::Timer { now_ms, timer }
                if self.claim_timer(timer, TimerPhase::Disambiguation) =>
            {
                match self.arm_single(context, *now_ms) {
                    Ok(()) => self.go(ArbiterStateId::SingleArmed),
                    Err(err) => self.timer_unavailable(context, err),
                }
            }
            ArbiterEvent::Timer { .. } => Super,
        }
    }

    #[state(superstate = "tracking")]
    fn single_armed(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
    ) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch {
                now_ms,
                frame,
                origin_valid,
            } => self.single_touch(context, *now_ms, frame, *origin_valid),
            ArbiterEvent::Timer { now_ms, timer }
                if self.claim_timer(timer, TimerPhase::LongPress) =>
            {
                self.complete_track(context, *now_ms);
                self.go(ArbiterStateId::Completed)
            }
            ArbiterEvent::Timer { .. } => Super,
        }
    }

    #[state(superstate = "tracking")]
    fn dual_armed(
        &mut self,
        context: &mut DispatchContext,
        event: &ArbiterEvent,
    ) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch { frame, .. } if frame.phase != TouchPhase::Cancel => {
                match frame.touch_count {
                    2 => {
                        self.contacts.update(frame);
                        if self.dual_moved(frame) {
                            self.cancel_track(context, RejectReason::Moved);
                            return self.go(ArbiterStateId::Cancelled);
                        }
                        Handled
                    }
                    1 => {
                        self.contacts.update(frame);
                        self.cancel_track(context, RejectReason::Lifted);
                        self.go(ArbiterStateId::Cancelled)
                    }
                    _ => Super,
                }
            }
            ArbiterEvent::Timer { now_ms, timer }
                if self.claim_timer(timer, TimerPhase::LongPress) =>
            {
                self.complete_track(context, *now_ms);
                self.go(ArbiterStateId::Completed)
            }
            _ => Super,
        }
    }

    #[state(superstate = "settled")]
    fn completed(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        let _ = (context, event);
        Super
    }

    #[state(superstate = "settled")]
    fn cancelled(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        let _ = (context, event);
        Super
    }

    /// Shared exits for every live track: full release, system cancel, a
    /// third contact, and timers that no longer belong to anyone.
    #[superstate]
    fn tracking(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch { frame, .. } => {
                self.contacts.update(frame);
                if frame.phase == TouchPhase::Cancel {
                    self.cancel_track(context, RejectReason::SystemCancel);
                } else if frame.touch_count == 0 {
                    self.cancel_track(context, RejectReason::Lifted);
                } else if frame.touch_count > 2 {
                    self.cancel_track(context, RejectReason::ExtraContact);
                } else {
                    return Handled;
                }
                if frame.touch_count == 0 {
                    self.track = None;
                    self.go(ArbiterStateId::Idle)
                } else {
                    self.go(ArbiterStateId::Cancelled)
                }
            }
            ArbiterEvent::Timer { timer, .. } => {
                debug!(
                    "gesture: stale timer phase={:?} gen={} current={}",
                    timer.phase, timer.generation, self.generation
                );
                context.reject(RejectReason::StaleTimer);
                Handled
            }
        }
    }

    /// The attempt is over; wait for every finger to lift before arming
    /// again.
    #[superstate]
    fn settled(&mut self, context: &mut DispatchContext, event: &ArbiterEvent) -> Outcome<State> {
        match event {
            ArbiterEvent::Touch { frame, .. } => {
                self.contacts.update(frame);
                if frame.touch_count == 0 {
                    self.track = None;
                    return self.go(ArbiterStateId::Idle);
                }
                Handled
            }
            ArbiterEvent::Timer { .. } => {
                context.reject(RejectReason::StaleTimer);
                Handled
            }
        }
    }
}
