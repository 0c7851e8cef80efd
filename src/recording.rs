//! A `Platform` that records every call instead of performing it. Used by the
//! scenario tests and the host replay tool.

use std::{string::String, vec::Vec};

use crate::{
    platform::{EdgeExclusion, Haptics, MenuRequest, Overlays, SpeechRecognizer, TouchValidity},
    types::TouchPoint,
    voice::{RecognizerLanguage, VoiceResult},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlatformCall {
    Haptic,
    OpenMenu(MenuRequest),
    CloseMenu,
    OpenVoice,
    CloseVoice,
    StartListening(RecognizerLanguage),
    StopListening,
    ResultListener(bool),
    Navigate(String),
    RunAction(String),
}

impl PlatformCall {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Haptic => "haptic",
            Self::OpenMenu(_) => "menu_open",
            Self::CloseMenu => "menu_close",
            Self::OpenVoice => "voice_open",
            Self::CloseVoice => "voice_close",
            Self::StartListening(_) => "listen_start",
            Self::StopListening => "listen_stop",
            Self::ResultListener(true) => "listener_attach",
            Self::ResultListener(false) => "listener_detach",
            Self::Navigate(_) => "navigate",
            Self::RunAction(_) => "action",
        }
    }

    /// Free-form argument column for traces; empty when the call has none.
    pub fn detail(&self) -> String {
        match self {
            Self::OpenMenu(request) => request.screen.route().into(),
            Self::StartListening(language) => language.code().into(),
            Self::Navigate(destination) => destination.clone(),
            Self::RunAction(raw) => raw.clone(),
            _ => String::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordingPlatform {
    pub calls: Vec<PlatformCall>,
    pub exclusion: Option<EdgeExclusion>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusion(exclusion: EdgeExclusion) -> Self {
        Self {
            calls: Vec::new(),
            exclusion: Some(exclusion),
        }
    }

    pub fn take_calls(&mut self) -> Vec<PlatformCall> {
        core::mem::take(&mut self.calls)
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.calls.iter().map(PlatformCall::label).collect()
    }

    pub fn count(&self, label: &str) -> usize {
        self.calls.iter().filter(|call| call.label() == label).count()
    }
}

impl TouchValidity for RecordingPlatform {
    fn is_touch_origin_valid(&self, point: TouchPoint, contact_count: u8) -> bool {
        self.exclusion
            .is_none_or(|filter| filter.is_touch_origin_valid(point, contact_count))
    }
}

impl Haptics for RecordingPlatform {
    fn trigger_haptic_feedback(&mut self) {
        self.calls.push(PlatformCall::Haptic);
    }
}

impl SpeechRecognizer for RecordingPlatform {
    fn start_listening(&mut self, language: RecognizerLanguage) {
        self.calls.push(PlatformCall::StartListening(language));
    }

    fn stop_listening(&mut self) {
        self.calls.push(PlatformCall::StopListening);
    }

    fn set_result_listener(&mut self, attached: bool) {
        self.calls.push(PlatformCall::ResultListener(attached));
    }
}

impl Overlays for RecordingPlatform {
    fn open_navigation_menu(&mut self, request: &MenuRequest) {
        self.calls.push(PlatformCall::OpenMenu(request.clone()));
    }

    fn close_navigation_menu(&mut self) {
        self.calls.push(PlatformCall::CloseMenu);
    }

    fn open_voice_overlay(&mut self) {
        self.calls.push(PlatformCall::OpenVoice);
    }

    fn close_voice_overlay(&mut self) {
        self.calls.push(PlatformCall::CloseVoice);
    }

    fn navigate_to(&mut self, destination: &str) {
        self.calls.push(PlatformCall::Navigate(destination.into()));
    }

    fn run_voice_action(&mut self, result: &VoiceResult) {
        self.calls.push(PlatformCall::RunAction(result.raw_text.clone()));
    }
}
