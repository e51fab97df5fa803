//! Asteroids
//!
//! Two kinds share one body: drifting asteroids slide sideways and wrap
//! around the screen edges, ricochet asteroids fly fast and bounce off the
//! viewport and off drifting asteroids until they run out of bounces.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;

use super::centered_random;
use super::collision::{Rect, collides, reflect_velocity};

/// Bounce factor applied to ricochet velocity on every contact
const RICOCHET_DAMPING: f32 = 0.85;
/// Ricochets slower than this have spent their energy
const RICOCHET_MIN_SPEED: f32 = 0.5;
/// How far past the visible edges ricochets may bounce vertically
pub const RICOCHET_VERTICAL_SLACK: f32 = 200.0;
/// Trail points are dropped on alternate steps
const TRAIL_INTERVAL: u32 = 2;

/// Asteroid size bucket (drives colouring)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    /// 30% small, 40% medium, 30% large
    pub fn roll(rng: &mut impl Rng) -> Self {
        let r: f32 = rng.random();
        if r < 0.3 {
            SizeClass::Small
        } else if r < 0.7 {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    /// (min, span) of each side in pixels
    fn extent(self) -> (f32, f32) {
        match self {
            SizeClass::Small => (20.0, 20.0),
            SizeClass::Medium => (45.0, 30.0),
            SizeClass::Large => (80.0, 40.0),
        }
    }
}

/// Rendering-only outline parameters
#[derive(Debug, Clone, Copy)]
pub struct AsteroidShape {
    /// Outline vertices (8..=15)
    pub points: u32,
    /// Radial irregularity
    pub variation: f32,
    /// Angular offset of the first vertex
    pub offset: f32,
    /// Vertical squash (oval vs round)
    pub aspect: f32,
    pub crater_seed: f32,
    pub crater_density: f32,
}

impl AsteroidShape {
    pub fn roll(rng: &mut impl Rng) -> Self {
        Self {
            points: rng.random_range(8..16),
            variation: 0.3 + rng.random::<f32>() * 0.4,
            offset: rng.random::<f32>() * TAU,
            aspect: 0.7 + rng.random::<f32>() * 0.6,
            crater_seed: rng.random::<f32>() * 1000.0,
            crater_density: 0.5 + rng.random::<f32>() * 1.0,
        }
    }
}

/// Fading point behind a ricochet asteroid
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl TrailPoint {
    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Ricochet-specific state
#[derive(Debug, Clone)]
pub struct Ricochet {
    pub vel: Vec2,
    pub bounces: u32,
    pub max_bounces: u32,
    pub damping: f32,
    /// Oldest first
    pub trail: Vec<TrailPoint>,
    /// Pulsing glow in 0.3..=1
    pub glow: f32,
    glow_rising: bool,
    trail_timer: u32,
}

/// Obstacle behavior
#[derive(Debug, Clone)]
pub enum ObstacleKind {
    /// Slides sideways at `speed` px/tick, wrapping at the screen edges
    Drifting { speed: f32 },
    Ricochet(Ricochet),
}

/// An asteroid
#[derive(Debug, Clone)]
pub struct Obstacle {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub size_class: SizeClass,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub shape: AsteroidShape,
    pub kind: ObstacleKind,
}

/// Arena a ricochet bounces around in, sampled once per tick
#[derive(Debug, Clone, Copy)]
pub struct RicochetBounds {
    pub width: f32,
    /// World y of the upper bounce wall
    pub top: f32,
    /// World y of the lower bounce wall
    pub bottom: f32,
    pub player_y: f32,
    /// Ricochets further than this from the player (vertically) are dropped
    pub max_player_gap: f32,
}

impl RicochetBounds {
    pub fn new(width: f32, height: f32, camera_y: f32, player_y: f32) -> Self {
        Self {
            width,
            top: camera_y - RICOCHET_VERTICAL_SLACK,
            bottom: camera_y + height + RICOCHET_VERTICAL_SLACK,
            player_y,
            max_player_gap: height * 2.0,
        }
    }
}

/// Outcome of one ricochet step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RicochetStep {
    /// False once the asteroid should be removed
    pub alive: bool,
    /// Where a bounce spark should appear, if the asteroid bounced
    pub spark: Option<Vec2>,
}

impl Obstacle {
    /// A drifting asteroid with a rolled size class
    pub fn drifting(pos: Vec2, rng: &mut impl Rng) -> Self {
        let size_class = SizeClass::roll(rng);
        let (min, span) = size_class.extent();
        let size = Vec2::new(
            min + rng.random::<f32>() * span,
            min + rng.random::<f32>() * span,
        );
        let shape = AsteroidShape::roll(rng);
        let speed = centered_random(rng, 2.0);
        Self {
            pos,
            size,
            size_class,
            rotation: 0.0,
            rotation_speed: centered_random(rng, 0.05),
            shape,
            kind: ObstacleKind::Drifting { speed },
        }
    }

    /// A fast bouncing asteroid (50..80 px, 4..10 px/tick in any direction)
    pub fn ricochet(pos: Vec2, rng: &mut impl Rng) -> Self {
        let mut obstacle = Self::drifting(pos, rng);
        obstacle.size = Vec2::new(
            50.0 + rng.random::<f32>() * 30.0,
            50.0 + rng.random::<f32>() * 30.0,
        );
        let speed = 4.0 + rng.random::<f32>() * 6.0;
        let angle = rng.random::<f32>() * TAU;
        obstacle.rotation_speed = centered_random(rng, 0.15);
        obstacle.kind = ObstacleKind::Ricochet(Ricochet {
            vel: Vec2::new(angle.cos(), angle.sin()) * speed,
            bounces: 0,
            max_bounces: 8 + rng.random_range(0..12),
            damping: RICOCHET_DAMPING,
            trail: Vec::new(),
            glow: 0.0,
            glow_rising: true,
            trail_timer: 0,
        });
        obstacle
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_ricochet(&self) -> bool {
        matches!(self.kind, ObstacleKind::Ricochet(_))
    }

    /// Advance a drifting asteroid, wrapping at the viewport edges
    ///
    /// Ricochet asteroids are left untouched; they move in [`Obstacle::step_ricochet`].
    pub fn drift(&mut self, viewport_width: f32) {
        let ObstacleKind::Drifting { speed } = self.kind else {
            return;
        };
        self.pos.x += speed;
        self.rotation += self.rotation_speed;

        if self.pos.x < -self.size.x {
            self.pos.x = viewport_width;
        } else if self.pos.x > viewport_width {
            self.pos.x = -self.size.x;
        }
    }

    /// Advance a ricochet asteroid against a snapshot of drifting asteroid boxes
    ///
    /// Drifting asteroids are never mutated here; the caller applies the
    /// returned spark and removes the asteroid when `alive` is false.
    pub fn step_ricochet(
        &mut self,
        drifting: &[Rect],
        bounds: &RicochetBounds,
        rng: &mut impl Rng,
    ) -> RicochetStep {
        let ObstacleKind::Ricochet(ricochet) = &mut self.kind else {
            return RicochetStep {
                alive: true,
                spark: None,
            };
        };

        self.pos += ricochet.vel;
        self.rotation += self.rotation_speed;

        let mut bounced = false;

        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            ricochet.vel.x = ricochet.vel.x.abs();
            bounced = true;
        }
        if self.pos.x + self.size.x > bounds.width {
            self.pos.x = bounds.width - self.size.x;
            ricochet.vel.x = -ricochet.vel.x.abs();
            bounced = true;
        }
        if self.pos.y < bounds.top {
            self.pos.y = bounds.top;
            ricochet.vel.y = ricochet.vel.y.abs();
            bounced = true;
        }
        if self.pos.y + self.size.y > bounds.bottom {
            self.pos.y = bounds.bottom - self.size.y;
            ricochet.vel.y = -ricochet.vel.y.abs();
            bounced = true;
        }

        if (self.pos.y - bounds.player_y).abs() > bounds.max_player_gap {
            return RicochetStep {
                alive: false,
                spark: None,
            };
        }

        for other in drifting {
            let own = Rect::new(self.pos, self.size);
            if !collides(&own, other) {
                continue;
            }
            let delta = own.center() - other.center();
            let dist = delta.length();
            if dist <= 0.0 {
                continue;
            }
            let normal = delta / dist;
            ricochet.vel = reflect_velocity(ricochet.vel, normal);
            // Jitter keeps it from settling into a loop
            ricochet.vel += Vec2::new(centered_random(rng, 1.0), centered_random(rng, 1.0));

            let overlap = (self.size.x + other.size.x) / 2.0 - dist;
            if overlap > 0.0 {
                self.pos += normal * overlap;
            }
            bounced = true;
        }

        let mut spark = None;
        if bounced {
            ricochet.bounces += 1;
            ricochet.vel *= ricochet.damping;
            spark = Some(self.pos + self.size * 0.5);
        }

        ricochet.pulse_glow();
        ricochet.advance_trail(self.pos + self.size * 0.5, self.size);

        let speed = ricochet.vel.length();
        let alive = ricochet.bounces < ricochet.max_bounces && speed >= RICOCHET_MIN_SPEED;
        if !alive {
            log::debug!(
                "Ricochet asteroid removed: bounces={}/{}, speed={:.2}",
                ricochet.bounces,
                ricochet.max_bounces,
                speed
            );
        }
        RicochetStep { alive, spark }
    }
}

impl Ricochet {
    fn pulse_glow(&mut self) {
        if self.glow_rising {
            self.glow += 0.05;
            if self.glow > 1.0 {
                self.glow = 1.0;
                self.glow_rising = false;
            }
        } else {
            self.glow -= 0.05;
            if self.glow < 0.3 {
                self.glow = 0.3;
                self.glow_rising = true;
            }
        }
    }

    fn advance_trail(&mut self, center: Vec2, size: Vec2) {
        self.trail_timer = self.trail_timer.wrapping_add(1);
        if self.trail_timer % TRAIL_INTERVAL == 0 {
            let life = 20.0 + self.vel.length() * 2.0;
            self.trail.push(TrailPoint {
                pos: center,
                life,
                max_life: life,
                size: (size.x + size.y) / 4.0,
            });
        }
        for point in &mut self.trail {
            point.life -= 1.0;
        }
        self.trail.retain(|p| p.life > 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn bounds() -> RicochetBounds {
        RicochetBounds::new(800.0, 600.0, -300.0, 0.0)
    }

    fn ricochet_at(pos: Vec2, vel: Vec2) -> Obstacle {
        let mut rng = Pcg32::seed_from_u64(11);
        let mut obstacle = Obstacle::ricochet(pos, &mut rng);
        obstacle.size = Vec2::splat(60.0);
        if let ObstacleKind::Ricochet(r) = &mut obstacle.kind {
            r.vel = vel;
            r.max_bounces = 10;
        }
        obstacle
    }

    fn bounces(obstacle: &Obstacle) -> u32 {
        match &obstacle.kind {
            ObstacleKind::Ricochet(r) => r.bounces,
            ObstacleKind::Drifting { .. } => 0,
        }
    }

    #[test]
    fn test_size_classes() {
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..200 {
            let obstacle = Obstacle::drifting(Vec2::ZERO, &mut rng);
            let (min, span) = obstacle.size_class.extent();
            assert!(obstacle.size.x >= min && obstacle.size.x < min + span);
            assert!(obstacle.size.y >= min && obstacle.size.y < min + span);
            assert!((8..16).contains(&obstacle.shape.points));
            let ObstacleKind::Drifting { speed } = obstacle.kind else {
                panic!("expected drifting asteroid");
            };
            assert!((-1.0..1.0).contains(&speed));
        }
    }

    #[test]
    fn test_ricochet_spawn_ranges() {
        let mut rng = Pcg32::seed_from_u64(9);
        for _ in 0..200 {
            let obstacle = Obstacle::ricochet(Vec2::ZERO, &mut rng);
            assert!(obstacle.size.x >= 50.0 && obstacle.size.x < 80.0);
            let ObstacleKind::Ricochet(r) = &obstacle.kind else {
                panic!("expected ricochet asteroid");
            };
            let speed = r.vel.length();
            assert!(speed > 3.99 && speed < 10.01);
            assert!((8..20).contains(&r.max_bounces));
        }
    }

    #[test]
    fn test_drift_wraps() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut obstacle = Obstacle::drifting(Vec2::new(799.5, 0.0), &mut rng);
        obstacle.kind = ObstacleKind::Drifting { speed: 1.0 };
        obstacle.drift(800.0);
        assert_eq!(obstacle.pos.x, -obstacle.size.x);

        // Drifting left from the left edge reappears on the right
        obstacle.kind = ObstacleKind::Drifting { speed: -1.0 };
        obstacle.drift(800.0);
        assert_eq!(obstacle.pos.x, 800.0);
    }

    #[test]
    fn test_wall_bounce_counts_and_sparks() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut obstacle = ricochet_at(Vec2::new(2.0, 0.0), Vec2::new(-6.0, 0.0));
        let step = obstacle.step_ricochet(&[], &bounds(), &mut rng);
        assert!(step.alive);
        assert!(step.spark.is_some());
        assert_eq!(obstacle.pos.x, 0.0);
        assert_eq!(bounces(&obstacle), 1);
        let ObstacleKind::Ricochet(r) = &obstacle.kind else {
            unreachable!()
        };
        assert!((r.vel.x - 6.0 * RICOCHET_DAMPING).abs() < 1e-5);
    }

    #[test]
    fn test_free_flight_does_not_bounce() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(5.0, 0.0));
        let step = obstacle.step_ricochet(&[], &bounds(), &mut rng);
        assert_eq!(step, RicochetStep { alive: true, spark: None });
        assert_eq!(obstacle.pos, Vec2::new(305.0, 0.0));
    }

    #[test]
    fn test_bounces_off_drifting_asteroid() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(5.0, 0.0));
        let rock = Rect::new(Vec2::new(350.0, 0.0), Vec2::splat(60.0));
        let step = obstacle.step_ricochet(&[rock], &bounds(), &mut rng);
        assert!(step.spark.is_some());
        assert_eq!(bounces(&obstacle), 1);
        // Reflected back to the left (jitter is at most 0.5)
        let ObstacleKind::Ricochet(r) = &obstacle.kind else {
            unreachable!()
        };
        assert!(r.vel.x < 0.0);
        // Pushed out of the rock
        assert!(obstacle.pos.x < 305.0);
    }

    #[test]
    fn test_removed_after_max_bounces() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(5.0, 0.0));
        if let ObstacleKind::Ricochet(r) = &mut obstacle.kind {
            r.bounces = r.max_bounces;
        }
        let step = obstacle.step_ricochet(&[], &bounds(), &mut rng);
        assert!(!step.alive);
    }

    #[test]
    fn test_removed_when_too_slow() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(0.3, 0.0));
        assert!(!obstacle.step_ricochet(&[], &bounds(), &mut rng).alive);
    }

    #[test]
    fn test_removed_far_from_player() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(5.0, 0.0));
        let far = RicochetBounds {
            player_y: 5000.0,
            bottom: 10_000.0,
            ..bounds()
        };
        assert!(!obstacle.step_ricochet(&[], &far, &mut rng).alive);
    }

    #[test]
    fn test_trail_and_glow() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut obstacle = ricochet_at(Vec2::new(300.0, 0.0), Vec2::new(1.0, 0.0));
        for _ in 0..40 {
            obstacle.step_ricochet(&[], &bounds(), &mut rng);
        }
        let ObstacleKind::Ricochet(r) = &obstacle.kind else {
            unreachable!()
        };
        assert!(!r.trail.is_empty());
        assert!(r.trail.len() <= 20);
        assert!(r.glow >= 0.3 && r.glow <= 1.0);
    }

    #[test]
    fn test_drifting_ignores_ricochet_step() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut obstacle = Obstacle::drifting(Vec2::new(100.0, 100.0), &mut rng);
        let step = obstacle.step_ricochet(&[], &bounds(), &mut rng);
        assert!(step.alive);
        assert_eq!(obstacle.pos, Vec2::new(100.0, 100.0));
    }
}
