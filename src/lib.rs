//! Kings Dash - a single-lane obstacle-dodging runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, run state)
//! - `game`: Session controller (menu state, run lifecycle, progress, audio cues)
//! - `scaling`: Logical world space to viewport transform
//! - `renderer`: WebGPU rendering of simulation snapshots
//! - `platform`: Browser/native platform abstraction (input, storage)
//! - `persistence`: Unlocked-level progress

pub mod audio;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod scaling;
pub mod settings;
pub mod sim;

pub use game::{AppState, MenuView, Session, Snapshot, StartError};
pub use scaling::ScalingTransform;
pub use settings::Settings;

/// Game configuration constants
///
/// All values are in logical world units; one unit per frame for speeds.
pub mod consts {
    /// Logical world width
    pub const WORLD_WIDTH: f32 = 1000.0;
    /// Logical world height
    pub const WORLD_HEIGHT: f32 = 500.0;
    /// Ground line (top edge of the ground strip)
    pub const GROUND_Y: f32 = 430.0;

    /// Character defaults
    pub const CHARACTER_X: f32 = 120.0;
    pub const CHARACTER_WIDTH: f32 = 35.0;
    pub const CHARACTER_HEIGHT: f32 = 45.0;
    pub const GRAVITY: f32 = 0.7;
    /// Negative is upward
    pub const JUMP_POWER: f32 = -13.0;
    /// Ducked height as a fraction of nominal height
    pub const DUCK_HEIGHT_RATIO: f32 = 0.6;

    /// Collision inset applied to every box on all sides
    pub const HITBOX_INSET: f32 = 5.0;

    /// Points per obstacle passed
    pub const PASS_AWARD: u32 = 10;

    /// A new obstacle may only spawn once the previous one is left of this
    pub const SPAWN_CLEARANCE: f32 = WORLD_WIDTH - 200.0;
    /// Obstacles are culled once their trailing edge is left of this
    pub const CULL_MARGIN: f32 = -50.0;

    /// Nominal frame period used when the host clock is unavailable
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
}
