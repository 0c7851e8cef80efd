use std::string::String;

use serde::Deserialize;

use crate::types::ScreenContext;

/// Languages the platform speech module can transcribe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum RecognizerLanguage {
    #[default]
    #[serde(rename = "nl-NL")]
    Dutch,
    #[serde(rename = "en-US")]
    English,
    #[serde(rename = "de-DE")]
    German,
    #[serde(rename = "fr-FR")]
    French,
    #[serde(rename = "es-ES")]
    Spanish,
}

impl RecognizerLanguage {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Dutch => "nl-NL",
            Self::English => "en-US",
            Self::German => "de-DE",
            Self::French => "fr-FR",
            Self::Spanish => "es-ES",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceResultKind {
    Navigation,
    Action,
    Unknown,
}

/// Payload delivered by the recognizer's result callback.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceResult {
    #[serde(rename = "type")]
    pub kind: VoiceResultKind,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub raw_text: String,
}

impl VoiceResult {
    pub fn navigation(destination: &str, raw_text: &str) -> Self {
        Self {
            kind: VoiceResultKind::Navigation,
            destination: Some(destination.into()),
            contact_name: None,
            raw_text: raw_text.into(),
        }
    }

    pub fn action(contact_name: &str, raw_text: &str) -> Self {
        Self {
            kind: VoiceResultKind::Action,
            destination: None,
            contact_name: Some(contact_name.into()),
            raw_text: raw_text.into(),
        }
    }

    pub fn unknown(raw_text: &str) -> Self {
        Self {
            kind: VoiceResultKind::Unknown,
            destination: None,
            contact_name: None,
            raw_text: raw_text.into(),
        }
    }

    /// Recognizer failures are surfaced as unrecognized speech.
    pub fn error(message: &str) -> Self {
        Self::unknown(message)
    }
}

/// The activation a registered result callback belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoiceSession {
    pub id: u32,
    pub screen: ScreenContext,
    pub opened_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceCommand {
    Navigate(String),
    RunAction,
    Close,
    Retry,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    Dismissed,
    CommandCompleted,
    Cancelled,
}
