//! Cosmetic particles and tracers
//!
//! Nothing here affects gameplay. Particles are short-lived sprites
//! (jetpack exhaust, fuel sparkle, ricochet sparks); tracers are the glowing
//! streaks left by fast movement and pickup bursts. Both fade linearly over
//! their lifetime and are culled when it runs out.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::centered_random;

/// Particle behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Jetpack exhaust, pulled down by gravity
    Exhaust,
    /// Fuel pickup sparkle, slows to a stop
    Fuel,
    /// Ricochet bounce spark
    Spark,
}

impl ParticleKind {
    fn lifetime(self) -> f32 {
        match self {
            ParticleKind::Exhaust => 20.0,
            ParticleKind::Fuel | ParticleKind::Spark => 30.0,
        }
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    /// Ticks left
    pub life: f32,
    pub max_life: f32,
}

impl Particle {
    pub fn new(kind: ParticleKind, pos: Vec2, vel: Vec2) -> Self {
        let life = kind.lifetime();
        Self {
            pos,
            vel,
            kind,
            life,
            max_life: life,
        }
    }

    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= 1.0;
        match self.kind {
            ParticleKind::Exhaust | ParticleKind::Spark => self.vel.y += 0.1,
            ParticleKind::Fuel => self.vel *= 0.95,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Remaining life in 0..=1 (drives size and alpha)
    pub fn fade(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// A glowing streak
#[derive(Debug, Clone)]
pub struct Tracer {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// HSL hue in degrees
    pub hue: f32,
    /// Glow boost 0..=1 (faster movement glows brighter)
    pub intensity: f32,
    /// Velocity multiplier per tick
    pub damping: f32,
}

impl Tracer {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.life -= 1.0;
        self.vel *= self.damping;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }

    /// Streak shed behind a moving player
    pub fn movement(center: Vec2, extent: Vec2, vel: Vec2, speed: f32, rng: &mut impl Rng) -> Self {
        let offset = Vec2::new(
            centered_random(rng, extent.x),
            centered_random(rng, extent.y),
        );
        let life = 30.0 + rng.random::<f32>() * 20.0;
        Self {
            pos: center + offset,
            vel: -vel * 0.3 + Vec2::new(centered_random(rng, 2.0), centered_random(rng, 2.0)),
            life,
            max_life: life,
            size: 2.0 + rng.random::<f32>() * 3.0,
            hue: rng.random::<f32>() * 360.0,
            intensity: (speed / 5.0).min(1.0),
            damping: 0.98,
        }
    }

    /// Sparkle shed by a falling fuel canister
    pub fn fuel_trail(center: Vec2, fall_speed: f32, rng: &mut impl Rng) -> Self {
        let life = 20.0 + rng.random::<f32>() * 15.0;
        Self {
            pos: center + Vec2::new(centered_random(rng, 20.0), centered_random(rng, 20.0)),
            vel: Vec2::new(
                centered_random(rng, 1.0),
                -fall_speed * 0.5 + centered_random(rng, 1.0),
            ),
            life,
            max_life: life,
            size: 1.5 + rng.random::<f32>() * 2.0,
            hue: 60.0 + rng.random::<f32>() * 60.0,
            intensity: 0.5,
            damping: 0.99,
        }
    }
}

/// Shape of a radial pickup burst
#[derive(Debug, Clone, Copy)]
pub struct BurstStyle {
    pub count: u32,
    /// (min, random span) for each parameter
    pub speed: (f32, f32),
    pub life: (f32, f32),
    pub size: (f32, f32),
    pub hue: (f32, f32),
}

/// Green/yellow burst for fuel canisters
pub const FUEL_BURST: BurstStyle = BurstStyle {
    count: 15,
    speed: (3.0, 4.0),
    life: (40.0, 20.0),
    size: (3.0, 4.0),
    hue: (80.0, 40.0),
};

/// Gold/orange burst for coins
pub const COIN_BURST: BurstStyle = BurstStyle {
    count: 12,
    speed: (2.5, 3.5),
    life: (35.0, 15.0),
    size: (2.5, 3.0),
    hue: (35.0, 25.0),
};

/// Evenly spaced tracers fanning out from `center`
pub fn radial_burst(center: Vec2, style: &BurstStyle, rng: &mut impl Rng) -> Vec<Tracer> {
    (0..style.count)
        .map(|i| {
            let angle = i as f32 / style.count as f32 * TAU;
            let speed = roll(rng, style.speed);
            let life = roll(rng, style.life);
            Tracer {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * speed,
                life,
                max_life: life,
                size: roll(rng, style.size),
                hue: roll(rng, style.hue),
                intensity: (speed / 5.0).min(1.0),
                damping: 0.98,
            }
        })
        .collect()
}

fn roll(rng: &mut impl Rng, (min, span): (f32, f32)) -> f32 {
    min + rng.random::<f32>() * span
}

/// Slow-fading sparkle cloud around a fuel pickup
pub fn fuel_sparkles(center: Vec2, rng: &mut impl Rng) -> Vec<Particle> {
    (0..8)
        .map(|_| {
            let vel = Vec2::new(centered_random(rng, 4.0), centered_random(rng, 4.0));
            Particle::new(ParticleKind::Fuel, center, vel)
        })
        .collect()
}
