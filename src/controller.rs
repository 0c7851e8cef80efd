use heapless::Vec;
use log::warn;

use crate::{
    config::{validate_config, ConfigError, HoldgateConfig},
    dispatch::{ActivationDispatcher, DispatchOutcome, VoiceOutcome},
    gesture::{centroid, ArbiterTrace, GestureArbiter, GestureIndicator},
    platform::Platform,
    types::{Activation, ScreenContext, TouchFrame, TouchPhase},
    voice::{CloseReason, DirectNavigation, VoiceCommandResolver, VoiceResult},
};

pub const OUTPUT_SLOTS: usize = 4;

/// Everything that happened during one controller call, timers included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerOutput {
    pub activations: Vec<Activation, OUTPUT_SLOTS>,
    pub dispatched: Vec<DispatchOutcome, OUTPUT_SLOTS>,
    pub trace: Option<ArbiterTrace>,
    pub voice: Option<VoiceOutcome>,
    /// A close request found its overlay open.
    pub closed: bool,
    pub grace_expired: bool,
}

/// Single-threaded front door for the host: touch frames, recognizer results,
/// overlay closes and clock ticks all enter here, each stamped with `now_ms`.
///
/// Timers that are due at or before an event's timestamp always fire before
/// the event itself, earliest first, gesture timers before voice timers on a
/// tie.
pub struct GestureController<P, R = DirectNavigation> {
    arbiter: GestureArbiter,
    dispatcher: ActivationDispatcher,
    resolver: R,
    platform: P,
    screen: ScreenContext,
}

impl<P: Platform> GestureController<P> {
    pub fn new(config: &HoldgateConfig, platform: P) -> Result<Self, ConfigError> {
        Self::with_resolver(config, platform, DirectNavigation)
    }
}

impl<P, R> GestureController<P, R>
where
    P: Platform,
    R: VoiceCommandResolver,
{
    /// Fails when `config` would not pass [`validate_config`].
    pub fn with_resolver(
        config: &HoldgateConfig,
        platform: P,
        resolver: R,
    ) -> Result<Self, ConfigError> {
        validate_config(config)?;
        Ok(Self {
            arbiter: GestureArbiter::from_validated(config.gesture),
            dispatcher: ActivationDispatcher::new(config),
            resolver,
            platform,
            screen: ScreenContext::default(),
        })
    }

    pub fn on_touch(&mut self, now_ms: u64, frame: &TouchFrame) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.run_due(now_ms, &mut out);

        let origin_valid = self.origin_valid(frame);
        let output = self.arbiter.handle_touch(
            now_ms,
            frame,
            origin_valid,
            self.dispatcher.overlay_open(),
        );
        out.trace = Some(output.trace);
        if let Some(activation) = output.activation {
            self.activate(activation, &mut out);
        }

        self.run_due(now_ms, &mut out);
        out
    }

    pub fn tick(&mut self, now_ms: u64) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.run_due(now_ms, &mut out);
        out
    }

    pub fn on_voice_result(&mut self, now_ms: u64, result: &VoiceResult) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.run_due(now_ms, &mut out);
        out.voice = Some(self.dispatcher.on_voice_result(
            now_ms,
            result,
            &mut self.resolver,
            &mut self.platform,
        ));
        self.run_due(now_ms, &mut out);
        out
    }

    pub fn close_navigation_menu(&mut self, now_ms: u64) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.run_due(now_ms, &mut out);
        out.closed = self.dispatcher.close_navigation_menu(&mut self.platform);
        out
    }

    pub fn close_voice_overlay(&mut self, now_ms: u64, reason: CloseReason) -> ControllerOutput {
        let mut out = ControllerOutput::default();
        self.run_due(now_ms, &mut out);
        out.closed = self
            .dispatcher
            .close_voice_overlay(now_ms, reason, &mut self.platform);
        self.run_due(now_ms, &mut out);
        out
    }

    /// When the host should call [`tick`](Self::tick) next.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match (
            self.arbiter.next_deadline_ms(),
            self.dispatcher.next_deadline_ms(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn set_screen_context(&mut self, screen: ScreenContext) {
        self.screen = screen;
    }

    pub fn screen_context(&self) -> &ScreenContext {
        &self.screen
    }

    pub fn indicator(&self) -> GestureIndicator {
        self.arbiter.indicator()
    }

    pub fn arbiter(&self) -> &GestureArbiter {
        &self.arbiter
    }

    pub fn dispatcher(&self) -> &ActivationDispatcher {
        &self.dispatcher
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn into_platform(self) -> P {
        self.platform
    }

    /// A second finger may first show up on a `Move` frame, which promotes
    /// the track just like a `Start` would.
    fn origin_valid(&self, frame: &TouchFrame) -> bool {
        let second_contact = frame.touch_count == 2 && self.arbiter.contacts().count() < 2;
        if frame.phase != TouchPhase::Start && !second_contact {
            return true;
        }
        match frame.touch_count {
            0 => true,
            1 => self.platform.is_touch_origin_valid(frame.points[0], 1),
            _ => self
                .platform
                .is_touch_origin_valid(centroid(frame.points[0], frame.points[1]), 2),
        }
    }

    fn activate(&mut self, activation: Activation, out: &mut ControllerOutput) {
        let outcome = self
            .dispatcher
            .dispatch(&activation, &self.screen, &mut self.platform);
        if out.activations.push(activation).is_err() || out.dispatched.push(outcome).is_err() {
            warn!("controller: output full, dropping record t_ms={}", activation.t_ms);
        }
    }

    fn run_due(&mut self, now_ms: u64, out: &mut ControllerOutput) {
        loop {
            let gesture = self.arbiter.next_deadline_ms().filter(|due| *due <= now_ms);
            let voice = self
                .dispatcher
                .next_deadline_ms()
                .filter(|due| *due <= now_ms);
            let gesture_first = match (gesture, voice) {
                (Some(g), Some(v)) => g <= v,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => return,
            };

            if gesture_first {
                let overlay_open = self.dispatcher.overlay_open();
                if let Some(output) = self.arbiter.fire_due(now_ms, overlay_open) {
                    if let Some(activation) = output.activation {
                        self.activate(activation, out);
                    }
                }
            } else if self.dispatcher.fire_due(now_ms, &mut self.platform) == Some(true) {
                out.grace_expired = true;
            }
        }
    }
}
