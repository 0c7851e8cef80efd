use crate::types::TouchPoint;

pub(crate) fn squared_distance(a: TouchPoint, b: TouchPoint) -> i32 {
    let dx = a.x as i32 - b.x as i32;
    let dy = a.y as i32 - b.y as i32;
    dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
}

/// Strictly greater than the threshold; a contact resting exactly on the
/// boundary still counts as stationary.
pub(crate) fn exceeds_threshold(a: TouchPoint, b: TouchPoint, threshold_px: u16) -> bool {
    let limit = threshold_px as i32;
    squared_distance(a, b) > limit.saturating_mul(limit)
}

pub(crate) fn centroid(a: TouchPoint, b: TouchPoint) -> TouchPoint {
    TouchPoint {
        x: ((a.x as u32 + b.x as u32) / 2) as u16,
        y: ((a.y as u32 + b.y as u32) / 2) as u16,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let origin = TouchPoint::new(100, 100);
        assert!(!exceeds_threshold(origin, TouchPoint::new(110, 100), 10));
        assert!(!exceeds_threshold(origin, TouchPoint::new(106, 108), 10));
        assert!(exceeds_threshold(origin, TouchPoint::new(107, 108), 10));
    }

    #[test]
    fn centroid_does_not_overflow() {
        let c = centroid(TouchPoint::new(u16::MAX, 0), TouchPoint::new(u16::MAX, 10));
        assert_eq!(c, TouchPoint::new(u16::MAX, 5));
    }
}
