//! Data-driven game balance
//!
//! Every rate the simulation applies per tick lives in [`Tuning`]. The
//! defaults are the desktop profile; touch devices get a slower lateral
//! profile. A tuning file can override any subset of fields as JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of difficulty tiers (progress is bucketed in 20% steps, 0..=5)
pub const DIFFICULTY_TIERS: usize = 6;

/// Errors raised while loading or validating a tuning profile
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning parameter `{name}`: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Physics and spawning parameters (per-tick units at 60 Hz)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player physics ===
    /// Downward acceleration applied every tick
    pub gravity: f32,
    /// Upward (negative) acceleration while the jetpack fires
    pub jetpack_power: f32,
    /// Vertical speed clamp
    pub max_velocity: f32,
    /// Fuel burned per tick of thrust
    pub fuel_consumption: f32,
    /// Fuel restored by a canister
    pub fuel_refill: f32,
    /// Lateral acceleration from pointer or keys
    pub horizontal_acceleration: f32,
    /// Lateral speed clamp
    pub max_horizontal_velocity: f32,
    /// Multiplicative lateral decay per tick
    pub friction: f32,
    /// Pointer offsets within this many pixels of the player center are ignored
    pub pointer_dead_zone: f32,

    // === Run ===
    /// Meters to the Moon
    pub moon_distance: u32,
    /// Ticks the player may stay below the screen before the run ends
    pub border_warning_ticks: u32,
    /// Ticks after start during which obstacle hits are ignored
    pub collision_grace_ticks: u64,

    // === Spawner ===
    /// How far above the camera content is generated
    pub spawn_buffer: f32,
    /// How far below the visible bottom content survives
    pub despawn_buffer: f32,
    /// Height of one generation slice
    pub chunk_size: f32,
    /// Chunks generated in a single tick at most
    pub max_chunks_per_tick: u32,
    /// A gap needing more chunks than this is treated as a runaway
    pub chunk_overflow_limit: u32,
    /// Spawner invocations allowed per budget window
    pub max_spawner_calls: u32,
    /// Length of the spawner budget window in ticks
    pub spawner_window_ticks: u64,
    /// Live obstacle cap (backpressure)
    pub max_obstacles: usize,
    /// Live collectible cap (backpressure)
    pub max_collectibles: usize,
    /// Per-chunk asteroid chance by difficulty tier
    pub asteroid_chances: [f32; DIFFICULTY_TIERS],
    /// Share of spawned asteroids that ricochet, by tier
    pub ricochet_chances: [f32; DIFFICULTY_TIERS],
    /// Per-chunk fuel canister chance by tier
    pub fuel_chances: [f32; DIFFICULTY_TIERS],
    /// Share of fuel canisters that fall instead of bobbing
    pub falling_fuel_chance: f32,
    /// Per-chunk coin chance
    pub coin_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::desktop()
    }
}

impl Tuning {
    /// Desktop profile
    pub fn desktop() -> Self {
        Self {
            gravity: 0.4,
            jetpack_power: -1.0,
            max_velocity: 8.0,
            fuel_consumption: 0.08,
            fuel_refill: 40.0,
            horizontal_acceleration: 0.6,
            max_horizontal_velocity: 6.0,
            friction: 0.9,
            pointer_dead_zone: 30.0,

            moon_distance: 100_000,
            border_warning_ticks: 180,
            collision_grace_ticks: 120,

            spawn_buffer: 400.0,
            despawn_buffer: 200.0,
            chunk_size: 800.0,
            max_chunks_per_tick: 5,
            chunk_overflow_limit: 20,
            max_spawner_calls: 200,
            spawner_window_ticks: 60,
            max_obstacles: 15,
            max_collectibles: 20,
            asteroid_chances: [0.005, 0.01, 0.015, 0.02, 0.025, 0.03],
            ricochet_chances: [0.0, 0.10, 0.15, 0.20, 0.25, 0.30],
            fuel_chances: [0.02, 0.025, 0.03, 0.035, 0.04, 0.045],
            falling_fuel_chance: 0.25,
            coin_chance: 0.008,
        }
    }

    /// Touch profile: 30% slower lateral handling on small screens
    pub fn mobile() -> Self {
        const MOBILE_SPEED_MODIFIER: f32 = 0.7;
        Self {
            horizontal_acceleration: 0.42 * MOBILE_SPEED_MODIFIER,
            max_horizontal_velocity: 4.0 * MOBILE_SPEED_MODIFIER,
            ..Self::desktop()
        }
    }

    /// Pick the profile for a platform
    pub fn for_platform(mobile: bool) -> Self {
        if mobile { Self::mobile() } else { Self::desktop() }
    }

    /// Parse a (possibly partial) JSON override on top of the desktop profile
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Ticks of continuous thrust that drain a full tank
    pub fn thrust_ticks_per_tank(&self) -> u32 {
        (crate::consts::MAX_FUEL / self.fuel_consumption).ceil() as u32
    }

    /// Reject profiles the simulation cannot run safely
    pub fn validate(&self) -> Result<(), TuningError> {
        let floats = [
            ("gravity", self.gravity),
            ("jetpack_power", self.jetpack_power),
            ("max_velocity", self.max_velocity),
            ("fuel_consumption", self.fuel_consumption),
            ("fuel_refill", self.fuel_refill),
            ("horizontal_acceleration", self.horizontal_acceleration),
            ("max_horizontal_velocity", self.max_horizontal_velocity),
            ("friction", self.friction),
            ("pointer_dead_zone", self.pointer_dead_zone),
            ("spawn_buffer", self.spawn_buffer),
            ("despawn_buffer", self.despawn_buffer),
            ("chunk_size", self.chunk_size),
            ("falling_fuel_chance", self.falling_fuel_chance),
            ("coin_chance", self.coin_chance),
        ];
        for (name, value) in floats {
            if !value.is_finite() {
                return Err(invalid(name, format!("{value} is not finite")));
            }
        }

        if self.max_velocity <= 0.0 {
            return Err(invalid("max_velocity", "must be positive".into()));
        }
        if self.max_horizontal_velocity <= 0.0 {
            return Err(invalid("max_horizontal_velocity", "must be positive".into()));
        }
        if self.fuel_consumption <= 0.0 {
            return Err(invalid("fuel_consumption", "must be positive".into()));
        }
        if !(0.0..1.0).contains(&self.friction) {
            return Err(invalid("friction", format!("{} not in [0, 1)", self.friction)));
        }
        if self.chunk_size <= 0.0 {
            return Err(invalid("chunk_size", "must be positive".into()));
        }
        if self.moon_distance == 0 {
            return Err(invalid("moon_distance", "must be positive".into()));
        }
        if self.max_chunks_per_tick == 0 || self.max_chunks_per_tick > self.chunk_overflow_limit {
            return Err(invalid(
                "max_chunks_per_tick",
                format!(
                    "{} not in 1..={}",
                    self.max_chunks_per_tick, self.chunk_overflow_limit
                ),
            ));
        }
        if self.spawner_window_ticks == 0 {
            return Err(invalid("spawner_window_ticks", "must be positive".into()));
        }

        let tables = [
            ("asteroid_chances", &self.asteroid_chances),
            ("ricochet_chances", &self.ricochet_chances),
            ("fuel_chances", &self.fuel_chances),
        ];
        for (name, table) in tables {
            if let Some(p) = table.iter().find(|p| !is_probability(**p)) {
                return Err(invalid(name, format!("{p} is not a probability")));
            }
        }
        for (name, p) in [
            ("falling_fuel_chance", self.falling_fuel_chance),
            ("coin_chance", self.coin_chance),
        ] {
            if !is_probability(p) {
                return Err(invalid(name, format!("{p} is not a probability")));
            }
        }

        Ok(())
    }
}

fn is_probability(p: f32) -> bool {
    (0.0..=1.0).contains(&p)
}

fn invalid(name: &'static str, reason: String) -> TuningError {
    TuningError::Invalid { name, reason }
}
