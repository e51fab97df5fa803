//! Fuel canisters and coins

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::particle::Tracer;
use crate::consts::COLLECTIBLE_SIZE;

const FALL_SPEED: f32 = 2.0;
const WOBBLE_SPEED: f32 = 0.1;
const BOB_SPEED: f32 = 0.1;
const BOB_AMPLITUDE: f32 = 0.5;
/// Falling canisters stay this far inside the viewport edges
const FALL_EDGE_INSET: f32 = 15.0;
const FALL_TRACER_INTERVAL: u32 = 3;
const FALL_TRACERS_PER_EMIT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    /// Refills the jetpack
    Fuel,
    /// Score only
    Coin,
}

/// How a collectible moves
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectibleMotion {
    /// Hovers in place with a gentle bob
    Static { bob_phase: f32 },
    /// Falls at a constant speed, wobbling sideways
    Falling {
        fall_speed: f32,
        wobble: f32,
        wobble_speed: f32,
        tracer_timer: u32,
    },
}

#[derive(Debug, Clone)]
pub struct Collectible {
    /// Top-left corner
    pub pos: Vec2,
    pub kind: CollectibleKind,
    pub motion: CollectibleMotion,
    pub collected: bool,
}

impl Collectible {
    pub const SIZE: Vec2 = Vec2::splat(COLLECTIBLE_SIZE);

    /// A bobbing collectible with a random starting phase
    pub fn hovering(pos: Vec2, kind: CollectibleKind, rng: &mut impl Rng) -> Self {
        Self {
            pos,
            kind,
            motion: CollectibleMotion::Static {
                bob_phase: rng.random::<f32>() * TAU,
            },
            collected: false,
        }
    }

    /// A fuel canister falling toward the player
    pub fn falling_fuel(pos: Vec2) -> Self {
        Self {
            pos,
            kind: CollectibleKind::Fuel,
            motion: CollectibleMotion::Falling {
                fall_speed: FALL_SPEED,
                wobble: 0.0,
                wobble_speed: WOBBLE_SPEED,
                tracer_timer: 0,
            },
            collected: false,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Self::SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Self::SIZE * 0.5
    }

    /// Advance one tick; falling canisters shed tracers into `tracers`
    pub fn update(&mut self, viewport_width: f32, tracers: &mut Vec<Tracer>, rng: &mut impl Rng) {
        match &mut self.motion {
            CollectibleMotion::Static { bob_phase } => {
                *bob_phase += BOB_SPEED;
                self.pos.y += bob_phase.sin() * BOB_AMPLITUDE;
            }
            CollectibleMotion::Falling {
                fall_speed,
                wobble,
                wobble_speed,
                tracer_timer,
            } => {
                self.pos.y += *fall_speed;
                *wobble += *wobble_speed;
                self.pos.x += wobble.sin() * 0.5;
                self.pos.x = self
                    .pos
                    .x
                    .min(viewport_width - FALL_EDGE_INSET)
                    .max(FALL_EDGE_INSET);

                *tracer_timer = tracer_timer.wrapping_add(1);
                if *tracer_timer % FALL_TRACER_INTERVAL == 0 {
                    let center = self.pos + Self::SIZE * 0.5;
                    for _ in 0..FALL_TRACERS_PER_EMIT {
                        tracers.push(Tracer::fuel_trail(center, *fall_speed, rng));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_hovering_bobs_in_place() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut tracers = Vec::new();
        let mut coin = Collectible::hovering(Vec2::new(100.0, 100.0), CollectibleKind::Coin, &mut rng);
        for _ in 0..500 {
            coin.update(800.0, &mut tracers, &mut rng);
            // sin-driven bob integrates to a bounded offset (amplitude 0.5 / 0.1 rad)
            assert!((coin.pos.y - 100.0).abs() < 11.0);
        }
        assert_eq!(coin.pos.x, 100.0);
        assert!(tracers.is_empty());
    }

    #[test]
    fn test_falling_fuel_falls_and_sheds_tracers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut tracers = Vec::new();
        let mut fuel = Collectible::falling_fuel(Vec2::new(400.0, 0.0));
        assert_eq!(fuel.kind, CollectibleKind::Fuel);
        for _ in 0..30 {
            fuel.update(800.0, &mut tracers, &mut rng);
        }
        assert!((fuel.pos.y - 60.0).abs() < 1e-3);
        assert_eq!(tracers.len(), 20);
    }

    #[test]
    fn test_falling_fuel_stays_on_screen() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut tracers = Vec::new();
        let mut fuel = Collectible::falling_fuel(Vec2::new(0.0, 0.0));
        fuel.update(800.0, &mut tracers, &mut rng);
        assert_eq!(fuel.pos.x, FALL_EDGE_INSET);

        let mut fuel = Collectible::falling_fuel(Vec2::new(900.0, 0.0));
        fuel.update(800.0, &mut tracers, &mut rng);
        assert_eq!(fuel.pos.x, 800.0 - FALL_EDGE_INSET);
    }
}
