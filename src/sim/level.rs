//! Level and mode configuration
//!
//! Story levels are fixed; alternate modes add a speed ramp or a rhythm pulse.

use serde::{Deserialize, Serialize};

/// Additive speed increase with distance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRamp {
    /// Extra speed per distance unit travelled
    pub per_unit: f32,
    /// Cap on the extra speed
    pub max: f32,
}

/// Beat-synced speed pulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rhythm {
    /// Beat interval in milliseconds
    pub beat_ms: f64,
    /// Peak deviation of the factor from 1.0 (must stay below 1.0)
    pub amplitude: f32,
    /// Every n-th beat is accented
    pub accent_every: u64,
}

impl Rhythm {
    /// Speed multiplier at `elapsed_ms` into the run
    ///
    /// Peaks on each beat and dips halfway between beats.
    pub fn factor(&self, elapsed_ms: f64) -> f32 {
        let phase = (elapsed_ms.max(0.0) % self.beat_ms) / self.beat_ms;
        1.0 + self.amplitude * (std::f64::consts::TAU * phase).cos() as f32
    }

    /// Zero-based beat counter at `elapsed_ms`
    pub fn beat_index(&self, elapsed_ms: f64) -> u64 {
        (elapsed_ms.max(0.0) / self.beat_ms).floor() as u64
    }

    pub fn is_accent(&self, beat: u64) -> bool {
        beat % self.accent_every.max(1) == 0
    }
}

/// Tuning for a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Base scroll speed (units per frame)
    pub speed: f32,
    /// Spawn frequency divisor (frames)
    pub obstacle_freq: f32,
    /// Difficulty multiplier; higher spawns more often
    pub difficulty: f32,
    /// Distance needed to clear the run
    pub level_distance: f32,
    #[serde(default)]
    pub ramp: Option<SpeedRamp>,
    #[serde(default)]
    pub rhythm: Option<Rhythm>,
}

impl LevelConfig {
    const fn story(speed: f32, obstacle_freq: f32, difficulty: f32) -> Self {
        Self {
            speed,
            obstacle_freq,
            difficulty,
            level_distance: STORY_DISTANCE,
            ramp: None,
            rhythm: None,
        }
    }

    /// Capped additive ramp at `distance`
    pub fn ramp_term(&self, distance: f32) -> f32 {
        match self.ramp {
            Some(ramp) => (distance * ramp.per_unit).clamp(0.0, ramp.max),
            None => 0.0,
        }
    }

    pub fn rhythm_factor(&self, elapsed_ms: f64) -> f32 {
        self.rhythm.map_or(1.0, |r| r.factor(elapsed_ms))
    }

    /// Instantaneous scroll speed: `(base + ramp) * rhythm`
    pub fn speed_at(&self, distance: f32, elapsed_ms: f64) -> f32 {
        (self.speed + self.ramp_term(distance)) * self.rhythm_factor(elapsed_ms)
    }
}

/// Distance target for story levels
pub const STORY_DISTANCE: f32 = 5000.0;

/// Story levels, 1-indexed by level id
pub const LEVELS: [LevelConfig; 5] = [
    LevelConfig::story(2.5, 180.0, 0.5),
    LevelConfig::story(3.0, 170.0, 0.6),
    LevelConfig::story(3.5, 160.0, 0.7),
    LevelConfig::story(4.0, 150.0, 0.8),
    LevelConfig::story(4.5, 140.0, 0.9),
];

pub const LEVEL_NAMES: [&str; 5] = [
    "Road to Bethlehem",
    "Valley of Stars",
    "Golden Desert",
    "Snowy Mountains",
    "Gate of Bethlehem",
];

/// Treasure clue revealed when a level is cleared
pub const LEVEL_CLUES: [&str; 5] = [
    "Clue 1: The Kings left their first clue in...",
    "Clue 2: Look where the holiday lights shine...",
    "Clue 3: Melchior says: count 20 steps from the tree...",
    "Clue 4: Caspar points: the gift is close to the water...",
    "Clue 5: Balthazar reveals: under the golden star!",
];

/// Number of story levels
pub const LEVEL_COUNT: u32 = LEVELS.len() as u32;

/// What the player chose to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Story level by 1-based id
    Story(u32),
    /// Endless-style run that speeds up with distance
    Marathon,
    /// Speed pulses with a beat
    Rhythm,
}

impl GameMode {
    /// Configuration for this mode, `None` for an unknown level id
    pub fn config(self) -> Option<LevelConfig> {
        match self {
            GameMode::Story(level) => level
                .checked_sub(1)
                .and_then(|i| LEVELS.get(i as usize))
                .cloned(),
            GameMode::Marathon => Some(LevelConfig {
                speed: 3.0,
                obstacle_freq: 160.0,
                difficulty: 0.7,
                level_distance: 10_000.0,
                ramp: Some(SpeedRamp {
                    per_unit: 0.0004,
                    max: 3.0,
                }),
                rhythm: None,
            }),
            GameMode::Rhythm => Some(LevelConfig {
                speed: 3.5,
                obstacle_freq: 150.0,
                difficulty: 0.75,
                level_distance: 8000.0,
                ramp: None,
                rhythm: Some(Rhythm {
                    beat_ms: 500.0,
                    amplitude: 0.35,
                    accent_every: 4,
                }),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameMode::Story(level) => level
                .checked_sub(1)
                .and_then(|i| LEVEL_NAMES.get(i as usize))
                .copied()
                .unwrap_or("Unknown"),
            GameMode::Marathon => "Marathon",
            GameMode::Rhythm => "Rhythm",
        }
    }

    /// Level id recorded in progress on clear; alternate modes record nothing
    pub fn level_id(self) -> Option<u32> {
        match self {
            GameMode::Story(level) => Some(level),
            _ => None,
        }
    }
}

/// Clue text for a cleared level
pub fn clue_for(level: u32) -> Option<&'static str> {
    level
        .checked_sub(1)
        .and_then(|i| LEVEL_CLUES.get(i as usize))
        .copied()
}
