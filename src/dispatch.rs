//! Turns completed long-presses into overlay requests and owns the voice
//! session lifecycle that follows a dual-press.

use std::string::String;

use log::{debug, info, warn};

use crate::{
    config::{FeedbackConfig, HoldgateConfig, MenuConfig, VoiceConfig},
    platform::{MenuRequest, Platform},
    types::{Activation, GestureKind, ScreenContext},
    voice::{
        ChannelState, CloseReason, Registration, TeardownQueue, VoiceCommand,
        VoiceCommandResolver, VoiceResult, VoiceResultChannel, VoiceSession,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// One of the two overlays is already showing; first request wins.
    OverlayOpen,
    VoiceDisabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    MenuOpened,
    VoiceStarted { session_id: u32 },
    Ignored(IgnoreReason),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceOutcome {
    Navigated(String),
    ActionRun,
    /// The overlay stays open and the recognizer listens again.
    Retrying,
    Closed,
    /// No callback was live, or a late result resolved to something other
    /// than navigation.
    Dropped,
}

pub struct ActivationDispatcher {
    voice: VoiceConfig,
    menu: MenuConfig,
    feedback: FeedbackConfig,
    menu_visible: bool,
    voice_visible: bool,
    listening: bool,
    next_session_id: u32,
    channel: VoiceResultChannel<VoiceSession>,
    teardown_timers: TeardownQueue,
}

impl Default for ActivationDispatcher {
    fn default() -> Self {
        Self::new(&HoldgateConfig::default())
    }
}

impl ActivationDispatcher {
    pub fn new(config: &HoldgateConfig) -> Self {
        Self {
            voice: config.voice,
            menu: config.menu,
            feedback: config.feedback,
            menu_visible: false,
            voice_visible: false,
            listening: false,
            next_session_id: 1,
            channel: VoiceResultChannel::new(),
            teardown_timers: TeardownQueue::new(),
        }
    }

    pub fn overlay_open(&self) -> bool {
        self.menu_visible || self.voice_visible
    }

    pub fn menu_visible(&self) -> bool {
        self.menu_visible
    }

    pub fn voice_visible(&self) -> bool {
        self.voice_visible
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn channel_state(&self) -> ChannelState {
        self.channel.state()
    }

    pub fn active_session(&self) -> Option<&VoiceSession> {
        self.channel.handler()
    }

    pub fn next_deadline_ms(&self) -> Option<u64> {
        self.teardown_timers.next_due_ms()
    }

    pub fn dispatch<P: Platform>(
        &mut self,
        activation: &Activation,
        screen: &ScreenContext,
        platform: &mut P,
    ) -> DispatchOutcome {
        if self.overlay_open() {
            debug!(
                "dispatch: ignored kind={:?} menu={} voice={}",
                activation.kind, self.menu_visible, self.voice_visible
            );
            return DispatchOutcome::Ignored(IgnoreReason::OverlayOpen);
        }

        match activation.kind {
            GestureKind::Single => {
                self.haptic(platform);
                let request = MenuRequest {
                    screen: screen.clone(),
                    blur_intensity: self.menu.blur_intensity,
                    dismiss_margin_px: self.menu.dismiss_margin_px,
                };
                platform.open_navigation_menu(&request);
                self.menu_visible = true;
                info!(
                    "dispatch: menu open screen={} t_ms={}",
                    screen.route(),
                    activation.t_ms
                );
                DispatchOutcome::MenuOpened
            }
            GestureKind::Dual if !self.voice.enabled => {
                debug!("dispatch: dual press discarded, voice disabled");
                DispatchOutcome::Ignored(IgnoreReason::VoiceDisabled)
            }
            GestureKind::Dual => {
                self.haptic(platform);
                let session = VoiceSession {
                    id: self.next_session_id,
                    screen: screen.clone(),
                    opened_ms: activation.t_ms,
                };
                self.next_session_id = self.next_session_id.wrapping_add(1);
                let session_id = session.id;

                // The callback must exist before the recognizer can produce
                // anything.
                self.attach(session, platform);
                platform.open_voice_overlay();
                self.voice_visible = true;
                platform.start_listening(self.voice.language);
                self.listening = true;
                info!(
                    "dispatch: voice start session={} lang={} t_ms={}",
                    session_id,
                    self.voice.language.code(),
                    activation.t_ms
                );
                DispatchOutcome::VoiceStarted { session_id }
            }
        }
    }

    /// Returns `false` when the menu was not showing.
    pub fn close_navigation_menu<P: Platform>(&mut self, platform: &mut P) -> bool {
        if !self.menu_visible {
            return false;
        }
        self.menu_visible = false;
        platform.close_navigation_menu();
        debug!("dispatch: menu closed");
        true
    }

    /// Hides the voice overlay and stops the recognizer. The result callback
    /// stays registered for the late-result grace window.
    pub fn close_voice_overlay<P: Platform>(
        &mut self,
        now_ms: u64,
        reason: CloseReason,
        platform: &mut P,
    ) -> bool {
        if !self.voice_visible {
            return false;
        }
        self.voice_visible = false;
        platform.close_voice_overlay();
        self.stop_listening(platform);

        match self.channel.overlay_closed(
            now_ms,
            self.voice.late_result_grace_ms,
            &mut self.teardown_timers,
        ) {
            Ok(armed) => info!(
                "voice: overlay closed reason={:?} grace_armed={} t_ms={}",
                reason, armed, now_ms
            ),
            Err(err) => {
                warn!("voice: {err}; dropping result callback now");
                self.reset_recognizer(platform);
            }
        }
        true
    }

    pub fn on_voice_result<P, R>(
        &mut self,
        now_ms: u64,
        result: &VoiceResult,
        resolver: &mut R,
        platform: &mut P,
    ) -> VoiceOutcome
    where
        P: Platform,
        R: VoiceCommandResolver + ?Sized,
    {
        let Some(delivery) = self.channel.deliver(&mut self.teardown_timers) else {
            debug!("voice: result dropped, no listener kind={:?}", result.kind);
            return VoiceOutcome::Dropped;
        };
        platform.set_result_listener(false);
        let session = delivery.handler;
        let command = resolver.resolve(&session, result);
        debug!(
            "voice: result session={} kind={:?} late={} command={:?}",
            session.id, result.kind, delivery.late, command
        );

        if delivery.late || !self.voice_visible {
            return match command {
                VoiceCommand::Navigate(destination) => {
                    platform.navigate_to(&destination);
                    info!("voice: late navigate to={destination}");
                    VoiceOutcome::Navigated(destination)
                }
                _ => VoiceOutcome::Dropped,
            };
        }

        match command {
            VoiceCommand::Navigate(destination) => {
                self.close_voice_overlay(now_ms, CloseReason::CommandCompleted, platform);
                platform.navigate_to(&destination);
                info!("voice: navigate to={destination}");
                VoiceOutcome::Navigated(destination)
            }
            VoiceCommand::RunAction => {
                platform.run_voice_action(result);
                self.close_voice_overlay(now_ms, CloseReason::CommandCompleted, platform);
                VoiceOutcome::ActionRun
            }
            VoiceCommand::Close => {
                self.close_voice_overlay(now_ms, CloseReason::Dismissed, platform);
                VoiceOutcome::Closed
            }
            VoiceCommand::Retry => {
                self.attach(session, platform);
                self.stop_listening(platform);
                platform.start_listening(self.voice.language);
                self.listening = true;
                debug!("voice: retry raw={:?}", result.raw_text);
                VoiceOutcome::Retrying
            }
        }
    }

    /// Fires the earliest teardown due at or before `now_ms`. `Some(true)`
    /// means the grace window expired and the recognizer was reset.
    pub fn fire_due<P: Platform>(&mut self, now_ms: u64, platform: &mut P) -> Option<bool> {
        let fired = self.teardown_timers.pop_due(now_ms)?;
        let expired = self.channel.teardown_fired(fired.token);
        if expired {
            info!("voice: grace expired t_ms={}", fired.due_ms);
            self.reset_recognizer(platform);
        }
        Some(expired)
    }

    fn attach<P: Platform>(&mut self, session: VoiceSession, platform: &mut P) {
        if self.channel.register(session, &mut self.teardown_timers) == Registration::Attached {
            platform.set_result_listener(true);
        }
    }

    fn stop_listening<P: Platform>(&mut self, platform: &mut P) {
        if self.listening {
            platform.stop_listening();
            self.listening = false;
        }
    }

    fn reset_recognizer<P: Platform>(&mut self, platform: &mut P) {
        self.stop_listening(platform);
        platform.set_result_listener(false);
        self.channel.clear(&mut self.teardown_timers);
    }

    fn haptic<P: Platform>(&self, platform: &mut P) {
        if self.feedback.haptics_enabled {
            platform.trigger_haptic_feedback();
        }
    }
}

#[cfg(test)]
mod tests;
