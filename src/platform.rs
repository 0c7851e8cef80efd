//! Collaborators the gesture core drives but does not own.

use crate::{
    types::{ScreenContext, TouchPoint},
    voice::{RecognizerLanguage, VoiceResult},
};

pub trait TouchValidity {
    fn is_touch_origin_valid(&self, point: TouchPoint, contact_count: u8) -> bool;
}

pub trait Haptics {
    /// Fire and forget.
    fn trigger_haptic_feedback(&mut self);
}

pub trait SpeechRecognizer {
    fn start_listening(&mut self, language: RecognizerLanguage);
    fn stop_listening(&mut self);
    /// Attaches or detaches the result callback on the platform side.
    fn set_result_listener(&mut self, attached: bool);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuRequest {
    pub screen: ScreenContext,
    pub blur_intensity: u8,
    pub dismiss_margin_px: u16,
}

pub trait Overlays {
    fn open_navigation_menu(&mut self, request: &MenuRequest);
    fn close_navigation_menu(&mut self);
    fn open_voice_overlay(&mut self);
    fn close_voice_overlay(&mut self);
    fn navigate_to(&mut self, destination: &str);
    fn run_voice_action(&mut self, result: &VoiceResult) {
        log::debug!("voice: action ignored raw={:?}", result.raw_text);
    }
}

pub trait Platform: TouchValidity + Haptics + SpeechRecognizer + Overlays {}

impl<T> Platform for T where T: TouchValidity + Haptics + SpeechRecognizer + Overlays {}

#[derive(Clone, Copy, Debug, Default)]
pub struct AnyOrigin;

impl TouchValidity for AnyOrigin {
    fn is_touch_origin_valid(&self, _point: TouchPoint, _contact_count: u8) -> bool {
        true
    }
}

/// Rejects gestures that start inside reserved screen edges (system bars,
/// back-swipe zones).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeExclusion {
    pub width: u16,
    pub height: u16,
    pub top_px: u16,
    pub bottom_px: u16,
    pub side_px: u16,
}

impl TouchValidity for EdgeExclusion {
    fn is_touch_origin_valid(&self, point: TouchPoint, _contact_count: u8) -> bool {
        point.y >= self.top_px
            && point.y < self.height.saturating_sub(self.bottom_px)
            && point.x >= self.side_px
            && point.x < self.width.saturating_sub(self.side_px)
    }
}
