//! Moonward - fly Zinsco to the Moon
//!
//! Core modules:
//! - `sim`: Fixed-timestep simulation (physics, spawning, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `platform`: Browser/native platform detection
//! - `settings`: Persisted volume preferences
//! - `ui`: Screen selection and menu key routing
//! - `renderer`: Canvas2D pass (wasm32) over natively testable geometry
//! - `audio`: Web Audio cues and music (wasm32 only)

pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod audio;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz; all per-tick tuning assumes this rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Ticks per second of simulated time
    pub const TICKS_PER_SECOND: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Player bounding box
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 50.0;
    /// Player starts 20% down from the top of the viewport
    pub const START_HEIGHT_FRACTION: f32 = 0.2;
    pub const MAX_FUEL: f32 = 100.0;

    /// Camera keeps the player 70% of the way down the viewport
    pub const CAMERA_LEAD_FRACTION: f32 = 0.7;

    /// Collectible bounding box (square)
    pub const COLLECTIBLE_SIZE: f32 = 30.0;
    pub const FUEL_SCORE: u64 = 50;
    pub const COIN_SCORE: u64 = 100;
    /// Collectibles this far below the visible bottom are dropped
    pub const COLLECTIBLE_CULL_MARGIN: f32 = 50.0;

    /// Inward margin applied to both boxes in AABB tests
    pub const COLLISION_MARGIN: f32 = 5.0;

    /// World pixels per meter of distance
    pub const PIXELS_PER_METER: f32 = 10.0;

    /// Moon disc size
    pub const MOON_SIZE: f32 = 200.0;
}
