use heapless::String;

pub const SCREEN_ROUTE_MAX: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

impl TouchPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// One raw event from the root input surface.
///
/// `touch_count` is the number of contacts still down after the event, so an
/// `End` that lifts the last finger carries `touch_count == 0`. Only the first
/// two contact positions are carried; a third contact shows up in the count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TouchFrame {
    pub phase: TouchPhase,
    pub touch_count: u8,
    pub points: [TouchPoint; 2],
}

impl TouchFrame {
    pub const fn one(phase: TouchPhase, point: TouchPoint) -> Self {
        Self {
            phase,
            touch_count: 1,
            points: [point, TouchPoint::new(0, 0)],
        }
    }

    pub const fn two(phase: TouchPhase, first: TouchPoint, second: TouchPoint) -> Self {
        Self {
            phase,
            touch_count: 2,
            points: [first, second],
        }
    }

    pub const fn many(phase: TouchPhase, touch_count: u8, points: [TouchPoint; 2]) -> Self {
        Self {
            phase,
            touch_count,
            points,
        }
    }

    pub const fn released(phase: TouchPhase) -> Self {
        Self {
            phase,
            touch_count: 0,
            points: [TouchPoint::new(0, 0), TouchPoint::new(0, 0)],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Single,
    Dual,
}

/// A completed long-press, reported at the moment its timer fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    pub kind: GestureKind,
    pub t_ms: u64,
    pub down_ms: u64,
    pub origin: TouchPoint,
}

impl Activation {
    pub fn held_ms(&self) -> u64 {
        self.t_ms.saturating_sub(self.down_ms)
    }
}

/// The screen the user was on when the gesture started, so the menu can
/// pre-highlight the active destination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScreenContext {
    route: String<SCREEN_ROUTE_MAX>,
}

impl ScreenContext {
    pub fn new(route: &str) -> Self {
        let mut out = String::new();
        for ch in route.chars() {
            if out.push(ch).is_err() {
                break;
            }
        }
        Self { route: out }
    }

    pub fn route(&self) -> &str {
        self.route.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_context_truncates_long_routes() {
        let long = "settings/accessibility/voice-commands/language";
        let screen = ScreenContext::new(long);
        assert_eq!(screen.route().len(), SCREEN_ROUTE_MAX);
        assert!(long.starts_with(screen.route()));
    }

    #[test]
    fn activation_reports_hold_duration() {
        let activation = Activation {
            kind: GestureKind::Single,
            t_ms: 2_500,
            down_ms: 1_000,
            origin: TouchPoint::new(10, 10),
        };
        assert_eq!(activation.held_ms(), 1_500);
    }
}
