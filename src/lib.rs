//! Long-press gesture arbitration: one sustained finger opens the navigation
//! menu, two sustained fingers start a voice command, and every touch still
//! reaches the content underneath.
//!
//! The crate never reads a clock. The host feeds [`GestureController`] touch
//! frames, recognizer results and overlay closes stamped with a monotonic
//! `now_ms`, and calls [`GestureController::tick`] at
//! [`GestureController::next_deadline_ms`].

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod gesture;
pub mod platform;
pub mod recording;
pub mod tap;
pub mod timer;
pub mod types;
pub mod voice;

pub use config::{load_config, parse_config, ConfigError, HoldgateConfig};
pub use controller::{ControllerOutput, GestureController};
pub use dispatch::{ActivationDispatcher, DispatchOutcome, IgnoreReason, VoiceOutcome};
pub use gesture::{ArbiterStateId, ArbiterTrace, GestureArbiter, GestureIndicator, RejectReason};
pub use platform::{
    AnyOrigin, EdgeExclusion, Haptics, MenuRequest, Overlays, Platform, SpeechRecognizer,
    TouchValidity,
};
pub use tap::{PassiveTap, TouchSink};
pub use types::{
    Activation, GestureKind, ScreenContext, TouchFrame, TouchPhase, TouchPoint,
};
pub use voice::{
    CloseReason, DirectNavigation, RecognizerLanguage, VoiceCommand, VoiceCommandResolver,
    VoiceResult, VoiceResultKind, VoiceSession,
};
