//! Run state and core simulation types
//!
//! Everything a run owns lives in `SimulationState`; nothing is shared.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::character::Character;
use super::level::{GameMode, LevelConfig};
use super::obstacle::{Obstacle, ObstacleSpawner};
use crate::consts::*;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Not started
    Idle,
    /// Active gameplay
    Running,
    /// Hit an obstacle
    Failed,
    /// Reached the distance target
    Cleared,
}

impl RunPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunPhase::Failed | RunPhase::Cleared)
    }
}

/// Something that happened during a tick, consumed by audio and progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A jump was taken
    Jumped,
    /// An obstacle's trailing edge cleared the character
    ObstaclePassed { id: u32 },
    /// Run failed on this obstacle
    Collided { id: u32 },
    /// Distance target reached
    LevelCleared,
    /// Rhythm beat crossed
    Beat { accent: bool },
}

/// A particle for pass feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Frames remaining
    pub life: u32,
    pub size: f32,
    /// Obstacle kind for color lookup
    pub color: u32,
}

impl Particle {
    pub fn update(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += PARTICLE_GRAVITY;
        self.life = self.life.saturating_sub(1);
    }
}

/// Parallax background star
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub speed: f32,
}

impl Star {
    /// Drift left and wrap to the right edge
    pub fn update(&mut self) {
        self.x -= self.speed;
        if self.x < 0.0 {
            self.x = WORLD_WIDTH;
        }
    }
}

/// Maximum live particles
pub const MAX_PARTICLES: usize = 128;
/// Particles emitted per passed obstacle
pub const PASS_BURST: usize = 8;
/// Particle lifetime range in frames
pub const PARTICLE_LIFE: std::ops::Range<u32> = 20..40;
pub const PARTICLE_GRAVITY: f32 = 0.15;
/// Background star count
pub const STAR_COUNT: usize = 50;

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Independent stream for one consumer
    pub fn stream(&self, salt: u64) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

/// Complete state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Run seed for reproducibility
    pub rng_state: RngState,
    pub mode: GameMode,
    pub config: LevelConfig,
    pub phase: RunPhase,
    pub character: Character,
    /// Live obstacles, oldest first
    pub obstacles: Vec<Obstacle>,
    /// Cumulative distance; never decreases within a run
    pub distance: f32,
    pub score: u32,
    /// Ticks since run start
    pub frame_count: u64,
    /// Host clock at run start (ms)
    pub start_time_ms: f64,
    /// Last rhythm beat announced
    #[serde(default)]
    pub last_beat: Option<u64>,
    /// Speed used on the most recent tick
    #[serde(default)]
    pub current_speed: f32,
    /// Visual particles (not gameplay-affecting)
    #[serde(skip)]
    pub particles: Vec<Particle>,
    /// Background decoration
    #[serde(skip)]
    pub stars: Vec<Star>,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    #[serde(skip, default = "default_spawner")]
    pub(crate) spawner: ObstacleSpawner,
    #[serde(skip, default = "default_fx_rng")]
    pub(crate) fx_rng: Pcg32,
    next_id: u32,
}

fn default_spawner() -> ObstacleSpawner {
    ObstacleSpawner::new(0)
}

fn default_fx_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

const SPAWN_STREAM: u64 = 1;
const FX_STREAM: u64 = 2;

impl SimulationState {
    /// Fresh run state for `config`; phase starts `Idle`
    pub fn new(mode: GameMode, config: LevelConfig, seed: u64) -> Self {
        let rng_state = RngState::new(seed);
        let spawner = ObstacleSpawner::new(rng_state.stream(SPAWN_STREAM).random());
        let mut fx_rng = rng_state.stream(FX_STREAM);
        let stars = (0..STAR_COUNT)
            .map(|_| Star {
                x: fx_rng.random_range(0.0..WORLD_WIDTH),
                y: fx_rng.random_range(0.0..GROUND_Y - 50.0),
                size: fx_rng.random_range(1.0..3.0),
                speed: fx_rng.random_range(0.2..0.7),
            })
            .collect();
        let current_speed = config.speed;

        Self {
            rng_state,
            mode,
            config,
            phase: RunPhase::Idle,
            character: Character::default(),
            obstacles: Vec::new(),
            distance: 0.0,
            score: 0,
            frame_count: 0,
            start_time_ms: 0.0,
            last_beat: None,
            current_speed,
            particles: Vec::new(),
            stars,
            events: Vec::new(),
            spawner,
            fx_rng,
            next_id: 1,
        }
    }

    /// Reset every run-scoped value and enter `Running`
    pub fn start(&mut self, now_ms: f64) {
        *self = Self::new(self.mode, self.config.clone(), self.rng_state.seed);
        self.start_time_ms = now_ms;
        self.phase = RunPhase::Running;
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Fraction of the distance target covered, 0..=1
    pub fn progress(&self) -> f32 {
        if self.config.level_distance <= 0.0 {
            return 1.0;
        }
        (self.distance / self.config.level_distance).clamp(0.0, 1.0)
    }

    /// Burst of particles from an obstacle's trailing edge
    pub fn emit_pass_burst(&mut self, x: f32, y: f32, color: u32) {
        for _ in 0..PASS_BURST {
            if self.particles.len() >= MAX_PARTICLES {
                break;
            }
            let angle = self.fx_rng.random_range(0.0..std::f32::consts::TAU);
            let speed = self.fx_rng.random_range(1.0..3.5);
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed - 1.5,
                life: self.fx_rng.random_range(PARTICLE_LIFE),
                size: self.fx_rng.random_range(2.0..5.0),
                color,
            });
        }
    }

    /// Advance decorations one frame
    pub fn update_effects(&mut self) {
        for star in &mut self.stars {
            star.update();
        }
        for particle in &mut self.particles {
            particle.update();
        }
        self.particles.retain(|p| p.life > 0);
    }
}
