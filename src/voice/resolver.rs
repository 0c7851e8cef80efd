use super::types::{VoiceCommand, VoiceResult, VoiceResultKind, VoiceSession};

/// Maps a recognized utterance to what the dispatcher should do with it.
pub trait VoiceCommandResolver {
    fn resolve(&mut self, session: &VoiceSession, result: &VoiceResult) -> VoiceCommand;
}

impl<F> VoiceCommandResolver for F
where
    F: FnMut(&VoiceSession, &VoiceResult) -> VoiceCommand,
{
    fn resolve(&mut self, session: &VoiceSession, result: &VoiceResult) -> VoiceCommand {
        self(session, result)
    }
}

/// Trusts the recognizer's own classification: navigation results that name
/// a destination navigate, actions are handed to the presentation layer and
/// everything else asks the user to try again.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectNavigation;

impl VoiceCommandResolver for DirectNavigation {
    fn resolve(&mut self, _session: &VoiceSession, result: &VoiceResult) -> VoiceCommand {
        match result.kind {
            VoiceResultKind::Navigation => match result.destination.as_deref().map(str::trim) {
                Some(destination) if !destination.is_empty() => {
                    VoiceCommand::Navigate(destination.into())
                }
                _ => VoiceCommand::Retry,
            },
            VoiceResultKind::Action => VoiceCommand::RunAction,
            VoiceResultKind::Unknown => VoiceCommand::Retry,
        }
    }
}
