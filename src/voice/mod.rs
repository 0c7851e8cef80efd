mod channel;
mod resolver;
mod types;

pub use channel::{
    ChannelState, Delivery, Registration, TeardownQueue, TeardownTimer, VoiceResultChannel,
    TEARDOWN_TIMER_SLOTS,
};
pub use resolver::{DirectNavigation, VoiceCommandResolver};
pub use types::{
    CloseReason, RecognizerLanguage, VoiceCommand, VoiceResult, VoiceResultKind, VoiceSession,
};
