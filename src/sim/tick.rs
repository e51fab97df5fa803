//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation by one 1/60 s step.

use glam::Vec2;
use rand::Rng;

use super::centered_random;
use super::collectible::CollectibleKind;
use super::collision::{Rect, collides};
use super::obstacle::{Obstacle, RicochetBounds};
use super::particle::{self, COIN_BURST, FUEL_BURST, Particle, ParticleKind};
use super::spawner;
use super::state::{GameEvent, GameOverReason, GamePhase, GameState, SoundCue, Viewport};
use crate::consts::*;

/// Chance per tick that a burning jetpack puffs exhaust
const EXHAUST_CHANCE: f32 = 0.8;

/// Input for a single tick
///
/// `thrust`, `move_left`, `move_right` and `pointer_x` are levels (held
/// state). `start`, `toggle_pause` and `return_to_menu` are one-shot
/// commands; the driver clears them once a tick has consumed them.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub thrust: bool,
    pub move_left: bool,
    pub move_right: bool,
    /// Pointer x in viewport pixels, if a pointer is steering
    pub pointer_x: Option<f32>,
    /// Begin a new run (menu, retry, play again)
    pub start: bool,
    pub toggle_pause: bool,
    pub return_to_menu: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    apply_commands(state, input);

    if state.phase != GamePhase::Playing || state.paused {
        return;
    }

    step(state, input);
    state.refresh_hud();
}

fn apply_commands(state: &mut GameState, input: &TickInput) {
    if input.return_to_menu
        && matches!(
            state.phase,
            GamePhase::Playing | GamePhase::GameOver | GamePhase::Victory
        )
    {
        state.phase = GamePhase::Menu;
        state.paused = false;
        state.player.thrust = false;
        log::info!("Returned to menu");
    }

    if input.start
        && matches!(
            state.phase,
            GamePhase::Menu | GamePhase::GameOver | GamePhase::Victory
        )
    {
        state.start_run();
    }

    if input.toggle_pause && state.phase == GamePhase::Playing {
        state.paused = !state.paused;
        if state.paused {
            state.player.thrust = false;
        }
        log::info!("{}", if state.paused { "Paused" } else { "Resumed" });
    }
}

fn step(state: &mut GameState, input: &TickInput) {
    let Viewport { width, height } = state.viewport;

    state.frame_count += 1;

    // Player
    state.player.thrust = input.thrust;
    state.player.move_left = input.move_left;
    state.player.move_right = input.move_right;
    state.player.step(input.pointer_x, &state.tuning, width);
    state.player.shed_tracers(&mut state.tracers, &mut state.rng);

    // Camera
    state.camera.follow(state.player.pos.y, height);

    // Spawning
    match spawner::manage(state) {
        Ok(_) => {}
        Err(fault) if fault.is_fatal() => {
            log::error!("Spawner fault, stopping run: {fault}");
            state.game_over(GameOverReason::SpawnerFault);
            return;
        }
        Err(fault) => log::warn!("Spawner skipped a tick: {fault}"),
    }

    // Distance
    let climbed = ((state.start_y() - state.player.pos.y) / PIXELS_PER_METER).floor();
    state.distance = climbed.max(0.0) as u32;
    state.max_distance = state.max_distance.max(state.distance);

    if let Some(reason) = update_obstacles(state) {
        state.emit(GameEvent::Sound(SoundCue::Collision));
        state.game_over(reason);
        return;
    }

    update_collectibles(state);

    // Effects
    for particle in &mut state.particles {
        particle.update();
    }
    state.particles.retain(Particle::is_alive);
    for tracer in &mut state.tracers {
        tracer.update();
    }
    state.tracers.retain(|t| t.is_alive());

    if state.player.is_burning() && state.rng.random::<f32>() < EXHAUST_CHANCE {
        let vel = Vec2::new(
            centered_random(&mut state.rng, 2.0),
            state.rng.random::<f32>() * 2.0 + 1.0,
        );
        let nozzle = state.player.nozzle();
        state
            .particles
            .push(Particle::new(ParticleKind::Exhaust, nozzle, vel));
    }

    state.moon.update(state.distance);

    if state.distance >= state.tuning.moon_distance {
        state.victory();
        return;
    }

    // Below the visible bottom: count down
    if state.player.pos.y > state.camera.bottom(height) {
        state.below_border_ticks += 1;
        if state.below_border_ticks >= state.tuning.border_warning_ticks {
            let reason = if state.player.fuel <= 0.0 {
                GameOverReason::OutOfFuelOutOfBounds
            } else {
                GameOverReason::OutOfBounds
            };
            state.game_over(reason);
        }
    } else {
        state.below_border_ticks = 0;
    }
}

/// Move asteroids; returns the game over reason if one hit the player
fn update_obstacles(state: &mut GameState) -> Option<GameOverReason> {
    let Viewport { width, height } = state.viewport;
    let despawn_y = state.camera.bottom(height) + state.tuning.despawn_buffer;
    let bounds = RicochetBounds::new(width, height, state.camera.y, state.player.pos.y);

    for obstacle in &mut state.obstacles {
        obstacle.drift(width);
    }

    // Ricochets bounce off where drifting asteroids are now
    let drifting: Vec<Rect> = state
        .obstacles
        .iter()
        .filter(|o| !o.is_ricochet())
        .map(Obstacle::rect)
        .collect();

    let mut sparks = Vec::new();
    let rng = &mut state.rng;
    state.obstacles.retain_mut(|obstacle| {
        if obstacle.is_ricochet() {
            let step = obstacle.step_ricochet(&drifting, &bounds, &mut *rng);
            sparks.extend(step.spark);
            step.alive
        } else {
            obstacle.pos.y < despawn_y
        }
    });

    for at in sparks {
        let vel = Vec2::new(
            centered_random(&mut state.rng, 8.0),
            centered_random(&mut state.rng, 8.0),
        );
        state
            .particles
            .push(Particle::new(ParticleKind::Spark, at, vel));
    }

    if state.frame_count <= state.tuning.collision_grace_ticks {
        return None;
    }

    let player = state.player.rect();
    state
        .obstacles
        .iter()
        .find(|o| collides(&player, &o.rect()))
        .map(|o| {
            if o.is_ricochet() {
                GameOverReason::HitRicochetAsteroid
            } else {
                GameOverReason::HitAsteroid
            }
        })
}

/// Move collectibles and apply pickups; collected items never survive the pass
fn update_collectibles(state: &mut GameState) {
    let Viewport { width, height } = state.viewport;
    let cull_y = state.camera.bottom(height) + COLLECTIBLE_CULL_MARGIN;
    let player = state.player.rect();

    let mut picked = Vec::new();
    let rng = &mut state.rng;
    let tracers = &mut state.tracers;
    state.collectibles.retain_mut(|item| {
        item.update(width, tracers, &mut *rng);
        if item.pos.y > cull_y {
            return false;
        }
        if !item.collected && collides(&player, &item.rect()) {
            item.collected = true;
            picked.push((item.kind, item.center()));
        }
        !item.collected
    });

    for (kind, center) in picked {
        match kind {
            CollectibleKind::Fuel => {
                let before = state.player.fuel;
                state.player.refuel(state.tuning.fuel_refill);
                state.score += FUEL_SCORE;
                let sparkles = particle::fuel_sparkles(center, &mut state.rng);
                state.particles.extend(sparkles);
                let burst = particle::radial_burst(center, &FUEL_BURST, &mut state.rng);
                state.tracers.extend(burst);
                state.emit(GameEvent::Sound(SoundCue::FuelPickup));
                log::debug!("Fuel collected: {before:.1} -> {:.1}", state.player.fuel);
            }
            CollectibleKind::Coin => {
                state.score += COIN_SCORE;
                let burst = particle::radial_burst(center, &COIN_BURST, &mut state.rng);
                state.tracers.extend(burst);
                state.emit(GameEvent::Sound(SoundCue::CoinPickup));
                log::debug!("Coin collected, score {}", state.score);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collectible::Collectible;
    use crate::sim::obstacle::ObstacleKind;
    use crate::tuning::{DIFFICULTY_TIERS, Tuning};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// A run with no random content, so tests place everything themselves
    fn quiet_tuning() -> Tuning {
        Tuning {
            asteroid_chances: [0.0; DIFFICULTY_TIERS],
            fuel_chances: [0.0; DIFFICULTY_TIERS],
            coin_chance: 0.0,
            ..Tuning::desktop()
        }
    }

    fn playing(tuning: Tuning) -> GameState {
        let mut state = GameState::new(12345, Viewport::new(800.0, 600.0), tuning).unwrap();
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        state.drain_events();
        state
    }

    fn thrust() -> TickInput {
        TickInput {
            thrust: true,
            ..Default::default()
        }
    }

    fn still_obstacle(pos: Vec2) -> Obstacle {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut obstacle = Obstacle::drifting(pos, &mut rng);
        obstacle.size = Vec2::splat(60.0);
        obstacle.kind = ObstacleKind::Drifting { speed: 0.0 };
        obstacle
    }

    #[test]
    fn test_menu_to_playing() {
        let mut state = GameState::new(1, Viewport::new(800.0, 600.0), quiet_tuning()).unwrap();
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.frame_count, 0);

        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.frame_count, 1);
        assert_eq!(state.drain_events(), vec![GameEvent::Started]);
    }

    #[test]
    fn test_full_tank_drains_in_exact_ticks() {
        let mut state = playing(quiet_tuning());
        // The start tick already ran one step without thrust
        let ticks = state.tuning.thrust_ticks_per_tank();
        for _ in 1..ticks {
            tick(&mut state, &thrust());
            assert!(state.player.fuel > 0.0);
        }
        tick(&mut state, &thrust());
        assert_eq!(state.player.fuel, 0.0);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_out_of_bounds_with_fuel() {
        let mut state = playing(quiet_tuning());
        state.player.pos.y = state.camera.bottom(600.0) + 100.0;
        let limit = state.tuning.border_warning_ticks;
        for _ in 1..limit {
            tick(&mut state, &TickInput::default());
            assert_eq!(state.phase, GamePhase::Playing);
        }
        assert!(state.hud.border_warning.is_some());
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.last_game_over, Some(GameOverReason::OutOfBounds));
    }

    #[test]
    fn test_out_of_bounds_without_fuel() {
        let mut state = playing(quiet_tuning());
        state.player.fuel = 0.0;
        state.player.pos.y = state.camera.bottom(600.0) + 100.0;
        for _ in 0..state.tuning.border_warning_ticks {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(
            state.last_game_over,
            Some(GameOverReason::OutOfFuelOutOfBounds)
        );
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::GameOver {
                reason: GameOverReason::OutOfFuelOutOfBounds
            }]
        );
    }

    #[test]
    fn test_back_in_bounds_resets_timer() {
        let mut state = playing(quiet_tuning());
        let bottom = state.camera.bottom(600.0);
        state.player.pos.y = bottom + 10.0;
        for _ in 0..100 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.below_border_ticks, 100);
        state.player.pos.y = bottom - 300.0;
        state.player.vel.y = 0.0;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.below_border_ticks, 0);
        assert!(state.hud.border_warning.is_none());
    }

    #[test]
    fn test_victory_adds_fuel_bonus() {
        let mut state = playing(Tuning {
            moon_distance: 5,
            ..quiet_tuning()
        });
        state.score = 250;
        state.player.fuel = 55.5;
        state.player.vel = Vec2::ZERO;
        state.player.pos.y = state.start_y() - 60.0;
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::Victory);
        assert_eq!(state.distance, 5);
        assert_eq!(state.score, 250 + 555);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Victory {
                score: 805,
                fuel_bonus: 555
            }]
        );
    }

    #[test]
    fn test_asteroid_hit_after_grace() {
        let mut state = playing(quiet_tuning());
        state.frame_count = state.tuning.collision_grace_ticks + 1;
        let pos = state.player.pos;
        state.obstacles.push(still_obstacle(pos));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.last_game_over, Some(GameOverReason::HitAsteroid));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Sound(SoundCue::Collision)));
    }

    #[test]
    fn test_asteroid_ignored_during_grace() {
        let mut state = playing(quiet_tuning());
        let pos = state.player.pos;
        state.obstacles.push(still_obstacle(pos));
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_ricochet_hit_reason() {
        let mut state = playing(quiet_tuning());
        state.frame_count = 500;
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ricochet = Obstacle::ricochet(state.player.pos, &mut rng);
        if let ObstacleKind::Ricochet(r) = &mut ricochet.kind {
            r.vel = Vec2::new(1.0, 0.0);
        }
        state.obstacles.push(ricochet);
        tick(&mut state, &TickInput::default());
        assert_eq!(
            state.last_game_over,
            Some(GameOverReason::HitRicochetAsteroid)
        );
    }

    #[test]
    fn test_spent_ricochet_removed() {
        let mut state = playing(quiet_tuning());
        let mut rng = Pcg32::seed_from_u64(3);
        let pos = state.player.pos + Vec2::new(-300.0, -200.0);
        let mut ricochet = Obstacle::ricochet(pos, &mut rng);
        if let ObstacleKind::Ricochet(r) = &mut ricochet.kind {
            r.bounces = r.max_bounces;
        }
        state.obstacles.push(ricochet);
        tick(&mut state, &TickInput::default());
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_coin_pickup_removed_same_tick() {
        let mut state = playing(quiet_tuning());
        let mut rng = Pcg32::seed_from_u64(5);
        let pos = state.player.pos + Vec2::new(5.0, 10.0);
        state
            .collectibles
            .push(Collectible::hovering(pos, CollectibleKind::Coin, &mut rng));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.score, COIN_SCORE);
        assert!(state.collectibles.is_empty());
        assert_eq!(state.tracers.len(), COIN_BURST.count as usize);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Sound(SoundCue::CoinPickup)]
        );

        // Nothing left to collect twice
        tick(&mut state, &TickInput::default());
        assert_eq!(state.score, COIN_SCORE);
    }

    #[test]
    fn test_fuel_pickup_refuels() {
        let mut state = playing(quiet_tuning());
        state.player.fuel = 80.0;
        let pos = state.player.pos + Vec2::new(5.0, 10.0);
        state.collectibles.push(Collectible::falling_fuel(pos));
        tick(&mut state, &TickInput::default());

        assert_eq!(state.player.fuel, MAX_FUEL);
        assert_eq!(state.score, FUEL_SCORE);
        assert_eq!(state.hud.score, FUEL_SCORE);
        assert!(state.collectibles.is_empty());
        assert!(
            state
                .particles
                .iter()
                .filter(|p| p.kind == ParticleKind::Fuel)
                .count()
                == 8
        );
    }

    #[test]
    fn test_collectible_culled_below_screen() {
        let mut state = playing(quiet_tuning());
        let mut rng = Pcg32::seed_from_u64(5);
        let y = state.camera.bottom(600.0) + 60.0;
        state.collectibles.push(Collectible::hovering(
            Vec2::new(100.0, y),
            CollectibleKind::Fuel,
            &mut rng,
        ));
        tick(&mut state, &TickInput::default());
        assert!(state.collectibles.is_empty());
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_pause_freezes_and_clears_thrust() {
        let mut state = playing(quiet_tuning());
        tick(&mut state, &thrust());
        assert!(state.player.thrust);

        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                thrust: true,
                ..Default::default()
            },
        );
        assert!(state.paused);
        assert!(!state.player.thrust);
        let frozen = (state.frame_count, state.player.pos, state.player.fuel);

        for _ in 0..10 {
            tick(&mut state, &thrust());
        }
        assert_eq!(
            (state.frame_count, state.player.pos, state.player.fuel),
            frozen
        );

        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert!(!state.paused);
        assert_eq!(state.frame_count, frozen.0 + 1);
    }

    #[test]
    fn test_return_to_menu_and_restart() {
        let mut state = playing(quiet_tuning());
        tick(
            &mut state,
            &TickInput {
                return_to_menu: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Menu);

        // Pause is meaningless outside a run
        tick(
            &mut state,
            &TickInput {
                toggle_pause: true,
                ..Default::default()
            },
        );
        assert!(!state.paused);

        state.phase = GamePhase::GameOver;
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut state = playing(quiet_tuning());
        for _ in 0..5 {
            tick(&mut state, &thrust());
        }
        let frames = state.frame_count;
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
        );
        assert_eq!(state.frame_count, frames + 1);
    }

    #[test]
    fn test_chunk_overflow_ends_run() {
        let mut state = playing(quiet_tuning());
        state.spawner.last_spawn_y = 1.0e7;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.last_game_over, Some(GameOverReason::SpawnerFault));
    }

    #[test]
    fn test_lost_camera_ends_run() {
        let mut state = playing(quiet_tuning());
        let mut rng = Pcg32::seed_from_u64(5);
        let pos = state.player.pos + Vec2::new(200.0, -100.0);
        state
            .collectibles
            .push(Collectible::hovering(pos, CollectibleKind::Coin, &mut rng));
        state.camera.y = f32::NAN;
        tick(&mut state, &TickInput::default());

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.last_game_over, Some(GameOverReason::SpawnerFault));
        assert_eq!(state.collectibles.len(), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::GameOver {
                reason: GameOverReason::SpawnerFault
            }]
        );
    }

    #[test]
    fn test_drifting_obstacles_dropped_past_despawn_line() {
        let mut state = playing(quiet_tuning());
        let despawn_y = state.camera.bottom(600.0) + state.tuning.despawn_buffer;
        state.obstacles.push(still_obstacle(Vec2::new(100.0, despawn_y)));
        state.obstacles.push(still_obstacle(Vec2::new(300.0, despawn_y - 1.0)));

        assert_eq!(update_obstacles(&mut state), None);
        assert_eq!(state.obstacles.len(), 1);
        assert_eq!(state.obstacles[0].pos.y, despawn_y - 1.0);
    }

    #[test]
    fn test_non_finite_spawn_state_recovers() {
        let mut state = playing(quiet_tuning());
        state.spawner.last_spawn_y = f32::NAN;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.spawner.last_spawn_y.is_finite());
    }

    #[test]
    fn test_distance_and_hud() {
        let mut state = playing(quiet_tuning());
        for _ in 0..120 {
            tick(&mut state, &thrust());
        }
        assert!(state.distance > 0);
        assert_eq!(state.max_distance, state.distance);
        assert_eq!(state.hud.distance, state.distance);
        assert_eq!(state.hud.remaining, 100_000 - state.distance);
        assert!(state.particles.iter().any(|p| p.kind == ParticleKind::Exhaust));

        // Coast up, then fall back: the best distance is kept
        let climbed = state.max_distance;
        for _ in 0..60 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.max_distance > climbed);
        assert!(state.distance < state.max_distance);
    }

    #[test]
    fn test_determinism() {
        let mut a = GameState::new(99999, Viewport::new(800.0, 600.0), Tuning::desktop()).unwrap();
        let mut b = GameState::new(99999, Viewport::new(800.0, 600.0), Tuning::desktop()).unwrap();

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut a, &start);
        tick(&mut b, &start);
        for i in 0..600 {
            let input = TickInput {
                thrust: i % 3 != 0,
                pointer_x: Some((i as f32 * 7.0) % 800.0),
                ..Default::default()
            };
            tick(&mut a, &input);
            tick(&mut b, &input);
        }

        assert_eq!(a.frame_count, b.frame_count);
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.obstacles.len(), b.obstacles.len());
        assert_eq!(a.collectibles.len(), b.collectibles.len());
        assert_eq!(a.score, b.score);
    }
}
