use crate::{
    timer::TimerHandle,
    types::{GestureKind, TouchFrame, TouchPoint},
};

use super::utils::centroid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackState {
    Pending,
    Armed,
    Cancelled,
    Completed,
}

impl TrackState {
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Pending | Self::Armed)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub slot: u8,
    pub origin: TouchPoint,
    pub position: TouchPoint,
}

/// Positions of the (at most two) contacts currently down. Slots follow the
/// frame's point order; a slot keeps its origin for as long as it stays down.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContactTable {
    slots: [Option<Contact>; 2],
    count: u8,
}

impl ContactTable {
    pub fn update(&mut self, frame: &TouchFrame) {
        self.count = frame.touch_count;
        for (idx, slot) in self.slots.iter_mut().enumerate() {
            if idx >= frame.touch_count as usize {
                *slot = None;
                continue;
            }
            let position = frame.points[idx];
            match slot {
                Some(contact) => contact.position = position,
                None => {
                    *slot = Some(Contact {
                        slot: idx as u8,
                        origin: position,
                        position,
                    })
                }
            }
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn contact(&self, slot: usize) -> Option<&Contact> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub fn positions(&self) -> [Option<TouchPoint>; 2] {
        self.slots.map(|slot| slot.map(|c| c.position))
    }

    pub fn centroid(&self) -> Option<TouchPoint> {
        match self.slots {
            [Some(a), Some(b)] => Some(centroid(a.position, b.position)),
            _ => None,
        }
    }
}

/// One interpretation of one physical gesture attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureTrack {
    pub kind: GestureKind,
    pub state: TrackState,
    /// Start position for a single track, start centroid for a dual one.
    pub origin: TouchPoint,
    /// First contact's touch-down, carried over when a single track is
    /// promoted so activation latency is measured from the first finger.
    pub down_ms: u64,
    pub armed_ms: Option<u64>,
    pub generation: u32,
    pub(super) disambiguation: Option<TimerHandle>,
    pub(super) long_press: Option<TimerHandle>,
}

impl GestureTrack {
    pub fn has_pending_timers(&self) -> bool {
        self.disambiguation.is_some() || self.long_press.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TouchPhase;

    #[test]
    fn contact_origin_survives_moves() {
        let mut contacts = ContactTable::default();
        contacts.update(&TouchFrame::one(TouchPhase::Start, TouchPoint::new(10, 10)));
        contacts.update(&TouchFrame::one(TouchPhase::Move, TouchPoint::new(14, 12)));

        let contact = contacts.contact(0).unwrap();
        assert_eq!(contact.origin, TouchPoint::new(10, 10));
        assert_eq!(contact.position, TouchPoint::new(14, 12));
        assert!(contacts.centroid().is_none());
    }

    #[test]
    fn second_slot_appears_and_disappears() {
        let mut contacts = ContactTable::default();
        let a = TouchPoint::new(100, 100);
        let b = TouchPoint::new(120, 100);
        contacts.update(&TouchFrame::one(TouchPhase::Start, a));
        contacts.update(&TouchFrame::two(TouchPhase::Start, a, b));
        assert_eq!(contacts.centroid(), Some(TouchPoint::new(110, 100)));
        assert_eq!(contacts.contact(1).unwrap().origin, b);

        contacts.update(&TouchFrame::one(TouchPhase::End, a));
        assert_eq!(contacts.count(), 1);
        assert_eq!(contacts.positions(), [Some(a), None]);
    }
}
