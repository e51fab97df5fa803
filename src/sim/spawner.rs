//! Viewport spawner and despawner
//!
//! Content is generated in fixed-height chunks just above the camera as it
//! climbs, and dropped once it falls far enough below the visible bottom.
//! The spawner runs under an explicit work budget: a bounded number of
//! chunks per tick, a bounded number of invocations per window, and hard
//! population caps.

use glam::Vec2;
use rand::Rng;
use thiserror::Error;

use super::collectible::{Collectible, CollectibleKind};
use super::obstacle::Obstacle;
use super::state::GameState;
use crate::tuning::DIFFICULTY_TIERS;

/// Reasons the spawner refused to do its work
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpawnFault {
    #[error(
        "non-finite spawn coordinates (spawn_y={spawn_y}, last_spawn_y={last_spawn_y}, camera_y={camera_y})"
    )]
    NonFinite {
        spawn_y: f32,
        last_spawn_y: f32,
        camera_y: f32,
    },
    #[error("camera position is no longer finite ({camera_y})")]
    CameraLost { camera_y: f32 },
    #[error("{chunks} chunks requested in one tick (limit {limit})")]
    ChunkOverflow { chunks: u32, limit: u32 },
    #[error("spawner invoked {calls} times in one budget window")]
    Runaway { calls: u32 },
}

impl SpawnFault {
    /// Fatal faults end the run; the rest skip spawning for one tick
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SpawnFault::NonFinite { .. })
    }
}

/// What one spawner pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub chunks: u32,
    pub obstacles: u32,
    pub collectibles: u32,
    /// Entities dropped below the despawn line
    pub despawned: usize,
}

/// Invocation counter over a sliding window of ticks
#[derive(Debug, Clone, Default)]
pub struct SpawnBudget {
    pub calls: u32,
    pub window_start: u64,
}

impl SpawnBudget {
    fn charge(&mut self, now: u64, window_ticks: u64, max_calls: u32) -> Result<(), SpawnFault> {
        if now.saturating_sub(self.window_start) >= window_ticks {
            self.window_start = now;
            self.calls = 0;
        }
        self.calls += 1;
        if self.calls > max_calls {
            return Err(SpawnFault::Runaway { calls: self.calls });
        }
        Ok(())
    }
}

/// Spawner bookkeeping (lives in [`GameState`])
#[derive(Debug, Clone, Default)]
pub struct Spawner {
    /// World y of the highest generated chunk boundary
    pub last_spawn_y: f32,
    pub budget: SpawnBudget,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Difficulty tier 0..=5 from progress toward the Moon (20% buckets)
pub fn difficulty_tier(distance: u32, moon_distance: u32) -> usize {
    let progress = (distance as f32 / moon_distance.max(1) as f32 * 100.0).min(100.0);
    ((progress / 20.0).floor() as usize).min(DIFFICULTY_TIERS - 1)
}

/// Generate content above the camera and drop content far below it
///
/// A [`SpawnFault::NonFinite`] still runs the despawn pass before returning.
/// A [`SpawnFault::CameraLost`] touches nothing: the camera never recovers on
/// its own, so the caller has to end the run.
pub fn manage(state: &mut GameState) -> Result<SpawnReport, SpawnFault> {
    state.spawner.budget.charge(
        state.frame_count,
        state.tuning.spawner_window_ticks,
        state.tuning.max_spawner_calls,
    )?;

    let camera_y = state.camera.y;
    if !camera_y.is_finite() {
        return Err(SpawnFault::CameraLost { camera_y });
    }

    let spawn_y = camera_y - state.tuning.spawn_buffer;
    let last_spawn_y = state.spawner.last_spawn_y;

    if !spawn_y.is_finite() || !last_spawn_y.is_finite() {
        if spawn_y.is_finite() {
            state.spawner.last_spawn_y = spawn_y;
        }
        despawn(state);
        return Err(SpawnFault::NonFinite {
            spawn_y,
            last_spawn_y,
            camera_y,
        });
    }

    let mut report = SpawnReport::default();

    if spawn_y < last_spawn_y {
        let chunk_size = state.tuning.chunk_size;
        let chunks = ((last_spawn_y - spawn_y) / chunk_size).ceil() as u32;
        if chunks > state.tuning.chunk_overflow_limit {
            return Err(SpawnFault::ChunkOverflow {
                chunks,
                limit: state.tuning.chunk_overflow_limit,
            });
        }

        let budgeted = chunks.min(state.tuning.max_chunks_per_tick);
        let tier = difficulty_tier(state.distance, state.tuning.moon_distance);
        for i in 0..budgeted {
            let chunk_y = last_spawn_y - (i + 1) as f32 * chunk_size;
            spawn_chunk(state, chunk_y, tier, &mut report);
        }
        report.chunks = budgeted;
        state.spawner.last_spawn_y = spawn_y;

        log::debug!(
            "Spawned {} chunk(s) at tier {}: +{} obstacles, +{} collectibles ({}/{} live)",
            budgeted,
            tier,
            report.obstacles,
            report.collectibles,
            state.obstacles.len(),
            state.collectibles.len()
        );
    }

    report.despawned = despawn(state);
    Ok(report)
}

fn spawn_chunk(state: &mut GameState, chunk_y: f32, tier: usize, report: &mut SpawnReport) {
    let tuning = &state.tuning;
    if state.obstacles.len() >= tuning.max_obstacles
        || state.collectibles.len() >= tuning.max_collectibles
    {
        return;
    }

    let width = state.viewport.width;
    let chunk_size = tuning.chunk_size;
    let rng = &mut state.rng;

    if rng.random::<f32>() < tuning.asteroid_chances[tier]
        && state.obstacles.len() < tuning.max_obstacles
    {
        let pos = Vec2::new(
            rng.random::<f32>() * (width - 100.0) + 50.0,
            chunk_y + rng.random::<f32>() * chunk_size,
        );
        let obstacle = if rng.random::<f32>() < tuning.ricochet_chances[tier] {
            Obstacle::ricochet(pos, rng)
        } else {
            Obstacle::drifting(pos, rng)
        };
        state.obstacles.push(obstacle);
        report.obstacles += 1;
    }

    if rng.random::<f32>() < tuning.fuel_chances[tier]
        && state.collectibles.len() < tuning.max_collectibles
    {
        let pos = Vec2::new(
            rng.random::<f32>() * (width - 40.0) + 20.0,
            chunk_y + rng.random::<f32>() * chunk_size,
        );
        let fuel = if rng.random::<f32>() < tuning.falling_fuel_chance {
            Collectible::falling_fuel(pos)
        } else {
            Collectible::hovering(pos, CollectibleKind::Fuel, rng)
        };
        state.collectibles.push(fuel);
        report.collectibles += 1;
    }

    if rng.random::<f32>() < tuning.coin_chance
        && state.collectibles.len() < tuning.max_collectibles
    {
        let pos = Vec2::new(
            rng.random::<f32>() * (width - 40.0) + 20.0,
            chunk_y + rng.random::<f32>() * chunk_size,
        );
        state
            .collectibles
            .push(Collectible::hovering(pos, CollectibleKind::Coin, rng));
        report.collectibles += 1;
    }
}

/// Drop everything at or past the despawn line; returns how many went
fn despawn(state: &mut GameState) -> usize {
    let despawn_y = state.camera.bottom(state.viewport.height) + state.tuning.despawn_buffer;
    if !despawn_y.is_finite() {
        return 0;
    }
    let before = state.obstacles.len()
        + state.collectibles.len()
        + state.particles.len()
        + state.tracers.len();

    state.obstacles.retain(|o| o.pos.y < despawn_y);
    state.collectibles.retain(|c| c.pos.y < despawn_y);
    state.particles.retain(|p| p.pos.y < despawn_y);
    state.tracers.retain(|t| t.pos.y < despawn_y);

    let after = state.obstacles.len()
        + state.collectibles.len()
        + state.particles.len()
        + state.tracers.len();
    let removed = before - after;
    if removed > 0 {
        log::debug!("Cleanup: removed {removed} entities below y={despawn_y:.0}");
    }
    removed
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::sim::state::Viewport;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn caps_never_exceeded(seed in any::<u64>(), climbs in prop::collection::vec(0.0f32..4000.0, 1..60)) {
            let mut tuning = Tuning::desktop();
            tuning.asteroid_chances = [0.9; DIFFICULTY_TIERS];
            tuning.fuel_chances = [0.9; DIFFICULTY_TIERS];
            tuning.coin_chance = 0.9;
            let mut state = GameState::new(seed, Viewport::new(800.0, 600.0), tuning).unwrap();
            state.start_run();
            for climb in climbs {
                state.camera.y -= climb;
                state.frame_count += 1;
                manage(&mut state).unwrap();
                prop_assert!(state.obstacles.len() <= state.tuning.max_obstacles);
                prop_assert!(state.collectibles.len() <= state.tuning.max_collectibles);
            }
        }
    }
}
