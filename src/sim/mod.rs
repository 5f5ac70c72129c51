//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per frame, logical world units only
//! - Seeded RNG only
//! - Host time enters only through `TickInput`
//! - No rendering or platform dependencies

pub mod character;
pub mod collision;
pub mod level;
pub mod obstacle;
pub mod state;
pub mod tick;

pub use character::{Character, Motion};
pub use collision::{Rect, arch_parts, character_hitbox, check_collision};
pub use level::{GameMode, LEVEL_COUNT, LEVELS, LevelConfig, clue_for};
pub use obstacle::{Obstacle, ObstacleKind, ObstacleSpawner};
pub use state::{GameEvent, Particle, RunPhase, SimulationState, Star};
pub use tick::{Action, TickInput, tick};
