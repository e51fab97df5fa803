//! Background stars
//!
//! Purely cosmetic and owned by the renderer, so it has its own RNG and
//! never touches the run's seeded stream. Besides the fixed star layer there
//! is the occasional shooting star, stepped once per simulation tick.

use std::collections::VecDeque;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

pub const STAR_COUNT: usize = 200;
/// Stars are scattered over this many screen heights around the start
const SPREAD_SCREENS: f32 = 20.0;
/// Recycled stars reappear this far above the camera
const RESPAWN_ABOVE: f32 = 20.0;

/// Ticks between shooting stars: 10 to 30 seconds
const SHOOTING_INTERVAL_MIN: f32 = 600.0;
const SHOOTING_INTERVAL_SPAN: f32 = 1200.0;
/// Longest a shooting star can live; its fade is measured against this
const SHOOTING_LIFE_MAX: f32 = 300.0;
/// Shooting stars this far below the visible bottom are dropped
const SHOOTING_CULL_BELOW: f32 = 200.0;

#[derive(Debug, Clone, Copy)]
pub struct Star {
    pub pos: Vec2,
    /// Side length in pixels (0..2); also drives brightness
    pub size: f32,
}

impl Star {
    pub fn alpha(&self) -> f32 {
        self.size / 2.0
    }
}

/// A rare white streak crossing the background
#[derive(Debug, Clone)]
pub struct ShootingStar {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Ticks left
    pub life: f32,
    /// Recent head positions, newest first
    pub trail: VecDeque<Vec2>,
    trail_len: usize,
    pub brightness: f32,
    pub size: f32,
}

impl ShootingStar {
    fn spawn(camera_y: f32, width: f32, rng: &mut impl Rng) -> Self {
        Self {
            pos: Vec2::new(
                -50.0 + rng.random::<f32>() * width * 0.3,
                camera_y - 100.0 + rng.random::<f32>() * 200.0,
            ),
            vel: Vec2::new(
                3.0 + rng.random::<f32>() * 4.0,
                2.0 + rng.random::<f32>() * 3.0,
            ),
            life: 180.0 + rng.random::<f32>() * 120.0,
            trail: VecDeque::new(),
            trail_len: 15 + rng.random_range(0..10),
            brightness: 0.8 + rng.random::<f32>() * 0.2,
            size: 2.0 + rng.random::<f32>() * 2.0,
        }
    }

    fn update(&mut self) {
        self.pos += self.vel;
        self.trail.push_front(self.pos);
        self.trail.truncate(self.trail_len);
        self.life -= 1.0;
    }

    /// Overall opacity; kept faint so it stays in the background
    pub fn alpha(&self) -> f32 {
        (self.life / SHOOTING_LIFE_MAX).clamp(0.0, 1.0) * self.brightness * 0.4
    }
}

pub struct Starfield {
    pub stars: Vec<Star>,
    pub shooting_stars: Vec<ShootingStar>,
    /// Ticks since the last shooting star
    shooting_timer: u32,
    shooting_interval: u32,
    rng: Pcg32,
}

impl Starfield {
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                pos: Vec2::new(
                    rng.random::<f32>() * width,
                    rng.random::<f32>() * height * SPREAD_SCREENS - height * SPREAD_SCREENS / 2.0,
                ),
                size: rng.random::<f32>() * 2.0,
            })
            .collect();
        let shooting_interval = next_interval(&mut rng);
        Self {
            stars,
            shooting_stars: Vec::new(),
            shooting_timer: 0,
            shooting_interval,
            rng,
        }
    }

    /// Move stars that dropped below the screen back above the camera
    pub fn recycle(&mut self, camera_y: f32, width: f32, height: f32) {
        let rng = &mut self.rng;
        for star in &mut self.stars {
            if star.pos.y - camera_y > height {
                star.pos.y = camera_y - RESPAWN_ABOVE;
                star.pos.x = rng.random::<f32>() * width;
            }
        }
    }

    /// Advance shooting stars by one tick, launching a new one when due
    pub fn step_shooting_stars(&mut self, camera_y: f32, width: f32, height: f32) {
        self.shooting_timer += 1;
        if self.shooting_timer >= self.shooting_interval {
            let star = ShootingStar::spawn(camera_y, width, &mut self.rng);
            log::debug!("Shooting star at ({:.0}, {:.0})", star.pos.x, star.pos.y);
            self.shooting_stars.push(star);
            self.shooting_timer = 0;
            self.shooting_interval = next_interval(&mut self.rng);
        }

        let cull_y = camera_y + height + SHOOTING_CULL_BELOW;
        self.shooting_stars.retain_mut(|star| {
            star.update();
            star.life > 0.0 && star.pos.y <= cull_y
        });
    }
}

fn next_interval(rng: &mut impl Rng) -> u32 {
    (SHOOTING_INTERVAL_MIN + rng.random::<f32>() * SHOOTING_INTERVAL_SPAN) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_spread() {
        let field = Starfield::new(1, 800.0, 600.0);
        assert_eq!(field.stars.len(), STAR_COUNT);
        for star in &field.stars {
            assert!((0.0..800.0).contains(&star.pos.x));
            assert!((-6000.0..6000.0).contains(&star.pos.y));
            assert!((0.0..=1.0).contains(&star.alpha()));
        }
    }

    #[test]
    fn test_recycle_moves_stars_above_camera() {
        let mut field = Starfield::new(2, 800.0, 600.0);
        let camera_y = -5000.0;
        field.recycle(camera_y, 800.0, 600.0);
        assert!(field.stars.iter().all(|s| s.pos.y - camera_y <= 600.0));
        assert!(
            field
                .stars
                .iter()
                .any(|s| s.pos.y == camera_y - RESPAWN_ABOVE)
        );
    }

    #[test]
    fn test_shooting_stars_are_rare() {
        let mut field = Starfield::new(3, 800.0, 600.0);
        for _ in 0..SHOOTING_INTERVAL_MIN as u32 - 1 {
            field.step_shooting_stars(0.0, 800.0, 600.0);
        }
        assert!(field.shooting_stars.is_empty());

        // Some star is due within the longest interval
        let mut launched = false;
        for _ in 0..SHOOTING_INTERVAL_SPAN as u32 + 1 {
            field.step_shooting_stars(0.0, 800.0, 600.0);
            launched |= !field.shooting_stars.is_empty();
        }
        assert!(launched);
    }

    #[test]
    fn test_shooting_star_trail_and_cull() {
        let mut field = Starfield::new(4, 800.0, 600.0);
        let mut rng = Pcg32::seed_from_u64(4);
        let star = ShootingStar::spawn(0.0, 800.0, &mut rng);
        let trail_len = star.trail_len;
        field.shooting_stars.push(star);

        for _ in 0..30 {
            field.step_shooting_stars(0.0, 800.0, 600.0);
        }
        let star = &field.shooting_stars[0];
        assert_eq!(star.trail.len(), trail_len);
        assert_eq!(star.trail[0], star.pos);
        assert!(star.alpha() > 0.0 && star.alpha() <= 0.4);

        // Camera far above: the star is now well below the screen
        field.step_shooting_stars(-5000.0, 800.0, 600.0);
        assert!(field.shooting_stars.is_empty());
    }
}
