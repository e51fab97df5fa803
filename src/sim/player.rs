//! Zinsco, the player character
//!
//! Jetpack thrust burns fuel against constant gravity; lateral steering comes
//! from the pointer (outside a dead zone) and from the arrow keys, which add
//! together. Lateral speed decays by friction so the player drifts to a stop.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::particle::Tracer;
use crate::consts::*;
use crate::tuning::Tuning;

/// Minimum speed before movement tracers appear
const TRACER_SPEED: f32 = 1.0;
/// Tracers are shed every this many ticks
const TRACER_INTERVAL: u32 = 2;
const TRACERS_PER_EMIT: usize = 3;

/// The player
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0..=100
    pub fuel: f32,
    /// Jetpack firing (level input)
    pub thrust: bool,
    pub move_left: bool,
    pub move_right: bool,
    tracer_timer: u32,
}

impl Player {
    pub const SIZE: Vec2 = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);

    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            pos: Self::spawn_point(viewport_width, viewport_height),
            vel: Vec2::ZERO,
            fuel: MAX_FUEL,
            thrust: false,
            move_left: false,
            move_right: false,
            tracer_timer: 0,
        }
    }

    /// Horizontally centered, 20% down the first screen
    pub fn spawn_point(viewport_width: f32, viewport_height: f32) -> Vec2 {
        Vec2::new(
            viewport_width / 2.0 - PLAYER_WIDTH / 2.0,
            viewport_height * START_HEIGHT_FRACTION,
        )
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, Self::SIZE)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Self::SIZE * 0.5
    }

    /// Where exhaust leaves the jetpack
    pub fn nozzle(&self) -> Vec2 {
        Vec2::new(self.pos.x + PLAYER_WIDTH / 2.0, self.pos.y + PLAYER_HEIGHT)
    }

    /// Jetpack is actually producing thrust
    pub fn is_burning(&self) -> bool {
        self.thrust && self.fuel > 0.0
    }

    /// Add fuel, capped at a full tank
    pub fn refuel(&mut self, amount: f32) {
        self.fuel = (self.fuel + amount).min(MAX_FUEL);
    }

    /// Advance one tick of physics
    pub fn step(&mut self, pointer_x: Option<f32>, tuning: &Tuning, viewport_width: f32) {
        if self.is_burning() {
            self.vel.y += tuning.jetpack_power;
            self.fuel = (self.fuel - tuning.fuel_consumption).max(0.0);
        }

        self.vel.y += tuning.gravity;

        // Pointer steering (dead zone prevents jitter around the player)
        if let Some(pointer_x) = pointer_x {
            let offset = pointer_x - self.center().x;
            if offset < -tuning.pointer_dead_zone {
                self.vel.x -= tuning.horizontal_acceleration;
            } else if offset > tuning.pointer_dead_zone {
                self.vel.x += tuning.horizontal_acceleration;
            }
        }

        // Keys stack on top of the pointer
        if self.move_left {
            self.vel.x -= tuning.horizontal_acceleration;
        }
        if self.move_right {
            self.vel.x += tuning.horizontal_acceleration;
        }

        self.vel.x *= tuning.friction;

        self.vel.y = self
            .vel
            .y
            .clamp(-tuning.max_velocity, tuning.max_velocity);
        self.vel.x = self
            .vel
            .x
            .clamp(-tuning.max_horizontal_velocity, tuning.max_horizontal_velocity);

        self.pos += self.vel;
        self.pos.x = self.pos.x.clamp(0.0, (viewport_width - PLAYER_WIDTH).max(0.0));
    }

    /// Shed movement tracers on alternate ticks while moving
    pub fn shed_tracers(&mut self, tracers: &mut Vec<Tracer>, rng: &mut impl Rng) {
        self.tracer_timer = self.tracer_timer.wrapping_add(1);
        let speed = self.vel.length();
        if self.tracer_timer % TRACER_INTERVAL != 0 || speed <= TRACER_SPEED {
            return;
        }
        let center = self.center();
        for _ in 0..TRACERS_PER_EMIT {
            tracers.push(Tracer::movement(center, Self::SIZE, self.vel, speed, rng));
        }
    }
}
