//! Vertical follow camera
//!
//! The camera only ever moves up (toward negative y). Falling never scrolls
//! the view back down, which is what makes dropping off the bottom edge a
//! real threat.

use crate::consts::{CAMERA_LEAD_FRACTION, START_HEIGHT_FRACTION};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World y of the top of the viewport
    pub y: f32,
}

impl Camera {
    /// Camera framing the player's spawn point
    pub fn new(viewport_height: f32) -> Self {
        Self {
            y: viewport_height * START_HEIGHT_FRACTION - viewport_height * CAMERA_LEAD_FRACTION,
        }
    }

    /// Keep the player 70% of the way down the screen, never scrolling back
    pub fn follow(&mut self, player_y: f32, viewport_height: f32) {
        let target = player_y - viewport_height * CAMERA_LEAD_FRACTION;
        if target < self.y {
            self.y = target;
        }
    }

    /// World y of the bottom edge of the viewport
    pub fn bottom(&self, viewport_height: f32) -> f32 {
        self.y + viewport_height
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn camera_never_moves_down(ys in prop::collection::vec(-5000.0f32..5000.0, 1..100)) {
            let mut camera = Camera::new(720.0);
            let mut last = camera.y;
            for y in ys {
                camera.follow(y, 720.0);
                prop_assert!(camera.y <= last);
                last = camera.y;
            }
        }
    }
}
