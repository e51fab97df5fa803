//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering
//! and platform dependencies:
//! - Fixed timestep only (one call to [`tick`] per 1/60 s)
//! - Seeded RNG only (owned by [`GameState`])
//! - Side effects leave as [`GameEvent`]s for the driver to drain

pub mod camera;
pub mod collectible;
pub mod collision;
pub mod obstacle;
pub mod particle;
pub mod player;
pub mod spawner;
pub mod state;
pub mod tick;

use rand::Rng;

pub use camera::Camera;
pub use collectible::{Collectible, CollectibleKind, CollectibleMotion};
pub use collision::{Rect, collides, reflect_velocity};
pub use obstacle::{
    AsteroidShape, Obstacle, ObstacleKind, Ricochet, RicochetBounds, RicochetStep, SizeClass,
    TrailPoint,
};
pub use particle::{Particle, ParticleKind, Tracer};
pub use player::Player;
pub use spawner::{SpawnFault, SpawnReport, Spawner, difficulty_tier};
pub use state::{
    BorderWarning, FuelTier, GameEvent, GameOverReason, GamePhase, GameState, HudState, Moon,
    SoundCue, Viewport,
};
pub use tick::{TickInput, tick};

/// Uniform sample in `[-span/2, span/2)`
#[inline]
pub(crate) fn centered_random(rng: &mut impl Rng, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}
