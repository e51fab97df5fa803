//! Game state and core simulation types
//!
//! [`GameState`] owns every entity collection and the run's RNG. The
//! presentation layer reads it by reference and only ever changes it through
//! [`super::TickInput`] commands and [`GameState::set_viewport`].

use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collectible::Collectible;
use super::obstacle::Obstacle;
use super::particle::{Particle, Tracer};
use super::player::Player;
use super::spawner::Spawner;
use crate::consts::*;
use crate::tuning::{Tuning, TuningError};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen
    Menu,
    /// Active run (may be paused)
    Playing,
    /// Run ended in failure
    GameOver,
    /// Reached the Moon
    Victory,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOverReason {
    HitAsteroid,
    HitRicochetAsteroid,
    OutOfBounds,
    OutOfFuelOutOfBounds,
    /// The spawner hit a fatal fault and the run was stopped
    SpawnerFault,
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            GameOverReason::HitAsteroid => "Hit an asteroid!",
            GameOverReason::HitRicochetAsteroid => "Hit a ricochet asteroid!",
            GameOverReason::OutOfBounds => "Fell out of bounds!",
            GameOverReason::OutOfFuelOutOfBounds => "Ran out of fuel and fell out of bounds!",
            GameOverReason::SpawnerFault => "Simulation fault: spawning halted",
        };
        f.write_str(text)
    }
}

/// Sound effects the simulation asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Collision,
    FuelPickup,
    CoinPickup,
    MenuClick,
}

/// Side effects for the driver, drained after ticking
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A new run began
    Started,
    /// Run ended in failure
    GameOver { reason: GameOverReason },
    /// Reached the Moon; `score` includes the fuel bonus
    Victory { score: u64, fuel_bonus: u64 },
    /// Play a sound
    Sound(SoundCue),
}

/// Host viewport in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The target, parked at a fixed height above the start
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moon {
    pub y: f32,
    pub size: f32,
}

impl Moon {
    pub fn new(moon_distance: u32) -> Self {
        Self {
            y: -(moon_distance as f32) * PIXELS_PER_METER,
            size: MOON_SIZE,
        }
    }

    /// The Moon doesn't move; kept as a hook in the update order
    pub fn update(&mut self, _distance: u32) {}
}

/// Fuel gauge colour band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelTier {
    /// Below 20%
    Critical,
    /// Below 50%
    Low,
    Full,
}

impl FuelTier {
    pub fn from_fuel(fuel: f32) -> Self {
        if fuel < 20.0 {
            FuelTier::Critical
        } else if fuel < 50.0 {
            FuelTier::Low
        } else {
            FuelTier::Full
        }
    }

    /// CSS colour for the gauge
    pub fn color(self) -> &'static str {
        match self {
            FuelTier::Critical => "#ff4444",
            FuelTier::Low => "#ffaa00",
            FuelTier::Full => "#00ff88",
        }
    }
}

/// Countdown shown while the player is below the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderWarning {
    pub seconds_left: u32,
    pub out_of_fuel: bool,
}

/// Snapshot for the heads-up display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudState {
    pub score: u64,
    /// Meters climbed
    pub distance: u32,
    /// Meters left to the Moon
    pub remaining: u32,
    /// 0..=100
    pub fuel_percent: f32,
    pub fuel_tier: FuelTier,
    pub border_warning: Option<BorderWarning>,
}

impl Default for HudState {
    fn default() -> Self {
        Self {
            score: 0,
            distance: 0,
            remaining: 0,
            fuel_percent: MAX_FUEL,
            fuel_tier: FuelTier::Full,
            border_warning: None,
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    pub viewport: Viewport,
    pub phase: GamePhase,
    /// Only meaningful while `Playing`
    pub paused: bool,
    pub score: u64,
    /// Meters above the start line
    pub distance: u32,
    pub max_distance: u32,
    /// Ticks since the run started
    pub frame_count: u64,
    pub camera: Camera,
    pub player: Player,
    pub moon: Moon,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    /// Visual only
    pub particles: Vec<Particle>,
    /// Visual only
    pub tracers: Vec<Tracer>,
    pub spawner: Spawner,
    /// Consecutive ticks spent below the visible bottom
    pub below_border_ticks: u32,
    pub hud: HudState,
    /// Set when the last run ended in failure
    pub last_game_over: Option<GameOverReason>,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game sitting on the menu
    ///
    /// Fails if `tuning` does not pass [`Tuning::validate`].
    pub fn new(seed: u64, viewport: Viewport, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(viewport.width, viewport.height),
            camera: Camera::new(viewport.height),
            moon: Moon::new(tuning.moon_distance),
            tuning,
            viewport,
            phase: GamePhase::Menu,
            paused: false,
            score: 0,
            distance: 0,
            max_distance: 0,
            frame_count: 0,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            particles: Vec::new(),
            tracers: Vec::new(),
            spawner: Spawner::new(),
            below_border_ticks: 0,
            hud: HudState::default(),
            last_game_over: None,
            events: Vec::new(),
        };
        state.refresh_hud();
        Ok(state)
    }

    /// Record a new host viewport size
    ///
    /// Entities keep their world positions; the next tick samples the new size.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("Ignoring invalid viewport {width}x{height}");
            return;
        }
        self.viewport = Viewport::new(width, height);
    }

    /// Reset every piece of run state and begin playing
    pub fn start_run(&mut self) {
        let Viewport { width, height } = self.viewport;
        self.phase = GamePhase::Playing;
        self.paused = false;
        self.score = 0;
        self.distance = 0;
        self.max_distance = 0;
        self.frame_count = 0;
        self.camera = Camera::new(height);
        self.player = Player::new(width, height);
        self.moon = Moon::new(self.tuning.moon_distance);
        self.obstacles.clear();
        self.collectibles.clear();
        self.particles.clear();
        self.tracers.clear();
        self.spawner = Spawner::new();
        self.below_border_ticks = 0;
        self.last_game_over = None;
        self.refresh_hud();
        self.events.push(GameEvent::Started);
        log::info!("Run started ({width}x{height}, seed {})", self.seed);
    }

    /// World y of the start line (distance zero)
    pub fn start_y(&self) -> f32 {
        self.viewport.height * START_HEIGHT_FRACTION
    }

    /// Meters left to the Moon
    pub fn remaining(&self) -> u32 {
        self.tuning.moon_distance.saturating_sub(self.distance)
    }

    /// End the run in failure
    pub(crate) fn game_over(&mut self, reason: GameOverReason) {
        self.phase = GamePhase::GameOver;
        self.player.thrust = false;
        self.last_game_over = Some(reason);
        self.events.push(GameEvent::GameOver { reason });
        log::info!(
            "Game over: {reason} (score {}, best distance {}m)",
            self.score,
            self.max_distance
        );
    }

    /// End the run at the Moon, awarding leftover fuel
    pub(crate) fn victory(&mut self) {
        let fuel_bonus = (self.player.fuel * 10.0).floor() as u64;
        self.score += fuel_bonus;
        self.phase = GamePhase::Victory;
        self.player.thrust = false;
        self.events.push(GameEvent::Victory {
            score: self.score,
            fuel_bonus,
        });
        log::info!("Reached the Moon! score {} (fuel bonus {fuel_bonus})", self.score);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recompute the HUD snapshot
    pub fn refresh_hud(&mut self) {
        let fuel = self.player.fuel.clamp(0.0, MAX_FUEL);
        let border_warning = (self.below_border_ticks > 0).then(|| {
            let ticks_left = self
                .tuning
                .border_warning_ticks
                .saturating_sub(self.below_border_ticks);
            BorderWarning {
                seconds_left: ticks_left.div_ceil(TICKS_PER_SECOND),
                out_of_fuel: self.player.fuel <= 0.0,
            }
        });
        self.hud = HudState {
            score: self.score,
            distance: self.distance,
            remaining: self.remaining(),
            fuel_percent: fuel,
            fuel_tier: FuelTier::from_fuel(self.player.fuel),
            border_warning,
        };
    }

    /// Center of the player in world space
    pub fn player_center(&self) -> Vec2 {
        self.player.center()
    }
}
