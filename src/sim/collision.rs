//! Collision detection and response for axis-aligned boxes
//!
//! Every hitbox in the game is a rectangle anchored at its top-left corner.
//! Boxes must interpenetrate by more than an inward margin on both axes, so
//! sprites whose edges merely graze each other don't count as a hit.

use glam::Vec2;

use crate::consts::COLLISION_MARGIN;

/// An axis-aligned rectangle (top-left anchored, +y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Overlap test with an inward margin
    ///
    /// True when the boxes overlap by more than `margin` along both axes.
    /// Symmetric: `a.overlaps_with_margin(&b, m) == b.overlaps_with_margin(&a, m)`.
    pub fn overlaps_with_margin(&self, other: &Rect, margin: f32) -> bool {
        // Swapping the boxes swaps the paired terms, so the test is exactly symmetric
        other.right() - self.left() > margin
            && self.right() - other.left() > margin
            && other.bottom() - self.top() > margin
            && self.bottom() - other.top() > margin
    }
}

/// Game-wide hit test with the standard margin
#[inline]
pub fn collides(a: &Rect, b: &Rect) -> bool {
    a.overlaps_with_margin(b, COLLISION_MARGIN)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_rect() -> impl Strategy<Value = Rect> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..200.0,
            1.0f32..200.0,
        )
            .prop_map(|(x, y, w, h)| Rect::new(Vec2::new(x, y), Vec2::new(w, h)))
    }

    proptest! {
        #[test]
        fn collision_is_symmetric(a in arb_rect(), b in arb_rect()) {
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }

        #[test]
        fn margin_only_removes_hits(a in arb_rect(), b in arb_rect()) {
            // Anything that collides with the margin also overlaps without it
            if collides(&a, &b) {
                prop_assert!(a.overlaps_with_margin(&b, 0.0));
            }
        }
    }
}
