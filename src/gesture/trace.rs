#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum ArbiterStateId {
    #[default]
    Idle = 0,
    SinglePending = 1,
    SingleArmed = 2,
    DualArmed = 3,
    Completed = 4,
    Cancelled = 5,
}

/// Why the last event ended, skipped or ignored a gesture attempt.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[repr(u8)]
pub enum RejectReason {
    #[default]
    None = 0,
    Moved = 1,
    Lifted = 2,
    ExtraContact = 3,
    SystemCancel = 4,
    InvalidOrigin = 5,
    OverlayOpen = 6,
    TimerUnavailable = 7,
    StaleTimer = 8,
    Superseded = 9,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ArbiterTrace {
    pub now_ms: u64,
    pub state_id: ArbiterStateId,
    pub reject_reason: RejectReason,
    pub generation: u32,
    pub touch_count: u8,
}
