//! Obstacle catalog and procedural spawner

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::level::LevelConfig;
use crate::consts::*;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low box on the ground, jump over
    Gift,
    /// Narrow and tall on the ground, jump over
    Palm,
    /// Wide and mid-height on the ground, jump over
    Camel,
    /// Floating; high placement is harmless, low placement needs a duck
    Star,
    /// Gateway; duck under the whole structure
    Arch,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Gift,
        ObstacleKind::Palm,
        ObstacleKind::Camel,
        ObstacleKind::Star,
        ObstacleKind::Arch,
    ];

    /// Width and height
    pub fn size(self) -> (f32, f32) {
        match self {
            ObstacleKind::Gift => (30.0, 35.0),
            ObstacleKind::Palm => (25.0, 70.0),
            ObstacleKind::Camel => (50.0, 55.0),
            ObstacleKind::Star => (50.0, 50.0),
            ObstacleKind::Arch => (90.0, 70.0),
        }
    }

    /// Whether collision uses the multi-rect gateway rule
    pub fn is_compound(self) -> bool {
        self == ObstacleKind::Arch
    }

    /// Index used by the renderer for color lookup
    pub fn color_index(self) -> u32 {
        match self {
            ObstacleKind::Gift => 0,
            ObstacleKind::Palm => 1,
            ObstacleKind::Camel => 2,
            ObstacleKind::Star => 3,
            ObstacleKind::Arch => 4,
        }
    }
}

/// Star placement heights above the ground line
pub const STAR_HIGH_OFFSET: f32 = 140.0;
pub const STAR_LOW_OFFSET: f32 = 80.0;
/// Arch top above the ground line
pub const ARCH_OFFSET: f32 = 130.0;

/// A scrolling obstacle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    /// Left edge; decreases every frame
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Set once when the trailing edge clears the character
    pub passed: bool,
}

impl Obstacle {
    /// Build an obstacle at `x` with the catalog geometry for `kind`
    ///
    /// `high` only matters for stars.
    pub fn new(id: u32, kind: ObstacleKind, x: f32, high: bool) -> Self {
        let (width, height) = kind.size();
        let y = match kind {
            ObstacleKind::Gift | ObstacleKind::Palm | ObstacleKind::Camel => GROUND_Y - height,
            ObstacleKind::Star if high => GROUND_Y - STAR_HIGH_OFFSET,
            ObstacleKind::Star => GROUND_Y - STAR_LOW_OFFSET,
            ObstacleKind::Arch => GROUND_Y - ARCH_OFFSET,
        };
        Self {
            id,
            kind,
            x,
            y,
            width,
            height,
            passed: false,
        }
    }

    /// Right edge
    #[inline]
    pub fn trailing_edge(&self) -> f32 {
        self.x + self.width
    }

    /// Fully scrolled past the cull margin
    pub fn is_offscreen(&self) -> bool {
        self.trailing_edge() <= CULL_MARGIN
    }
}

/// Spawns obstacles off the right edge on a frequency gate
#[derive(Debug, Clone)]
pub struct ObstacleSpawner {
    rng: Pcg32,
}

impl ObstacleSpawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Frames between spawn attempts
    pub fn period(config: &LevelConfig) -> u64 {
        let period = (config.obstacle_freq / config.difficulty).floor();
        if period.is_finite() && period >= 1.0 {
            period as u64
        } else {
            1
        }
    }

    /// Whether the gate is open on `frame` given the newest live obstacle
    pub fn gate_open(config: &LevelConfig, frame: u64, newest: Option<&Obstacle>) -> bool {
        frame % Self::period(config) == 0 && newest.is_none_or(|o| o.x < SPAWN_CLEARANCE)
    }

    /// Try to spawn on `frame`; the caller assigns ids
    pub fn try_spawn(
        &mut self,
        config: &LevelConfig,
        frame: u64,
        newest: Option<&Obstacle>,
        id: u32,
    ) -> Option<Obstacle> {
        if !Self::gate_open(config, frame, newest) {
            return None;
        }
        Some(self.spawn(id))
    }

    /// Unconditionally create a random obstacle at the right edge
    pub fn spawn(&mut self, id: u32) -> Obstacle {
        let kind = ObstacleKind::ALL[self.rng.random_range(0..ObstacleKind::ALL.len())];
        let high = self.rng.random_bool(0.5);
        Obstacle::new(id, kind, WORLD_WIDTH, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::level::LEVELS;

    #[test]
    fn test_catalog_geometry() {
        let gift = Obstacle::new(1, ObstacleKind::Gift, 500.0, false);
        assert_eq!(gift.y + gift.height, GROUND_Y);
        let palm = Obstacle::new(2, ObstacleKind::Palm, 500.0, false);
        assert_eq!(palm.y + palm.height, GROUND_Y);
        let high = Obstacle::new(3, ObstacleKind::Star, 500.0, true);
        let low = Obstacle::new(4, ObstacleKind::Star, 500.0, false);
        assert!(high.y < low.y);
        let arch = Obstacle::new(5, ObstacleKind::Arch, 500.0, true);
        assert_eq!(arch.y, GROUND_Y - ARCH_OFFSET);
        assert!(arch.kind.is_compound());
    }

    #[test]
    fn test_period_floors() {
        // floor(170 / 0.6) = 283
        assert_eq!(ObstacleSpawner::period(&LEVELS[1]), 283);
        // floor(180 / 0.5) = 360
        assert_eq!(ObstacleSpawner::period(&LEVELS[0]), 360);
    }

    #[test]
    fn test_period_never_zero() {
        let mut config = LEVELS[0].clone();
        config.obstacle_freq = 0.5;
        config.difficulty = 2.0;
        assert_eq!(ObstacleSpawner::period(&config), 1);
    }

    #[test]
    fn test_spawns_at_right_edge_unpassed() {
        let mut spawner = ObstacleSpawner::new(7);
        let obs = spawner.try_spawn(&LEVELS[1], 0, None, 1).unwrap();
        assert_eq!(obs.x, WORLD_WIDTH);
        assert!(!obs.passed);
    }

    #[test]
    fn test_gate_waits_for_modulo() {
        let mut spawner = ObstacleSpawner::new(7);
        assert!(spawner.try_spawn(&LEVELS[1], 282, None, 1).is_none());
        assert!(spawner.try_spawn(&LEVELS[1], 283, None, 1).is_some());
    }

    #[test]
    fn test_gate_waits_for_clearance() {
        let config = &LEVELS[1];
        let mut spawner = ObstacleSpawner::new(7);

        // Obstacle spawned on frame 0 sits at 1000 - 283*3 = 151 by frame 283
        let prior = Obstacle::new(1, ObstacleKind::Gift, WORLD_WIDTH - 283.0 * 3.0, false);
        assert_eq!(prior.x, 151.0);
        assert!(spawner.try_spawn(config, 283, Some(&prior), 2).is_some());

        // Still inside the clearance zone
        let close = Obstacle::new(1, ObstacleKind::Gift, SPAWN_CLEARANCE + 1.0, false);
        assert!(spawner.try_spawn(config, 283, Some(&close), 2).is_none());
        let edge = Obstacle::new(1, ObstacleKind::Gift, SPAWN_CLEARANCE, false);
        assert!(spawner.try_spawn(config, 283, Some(&edge), 2).is_none());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = ObstacleSpawner::new(42);
        let mut b = ObstacleSpawner::new(42);
        for id in 0..32 {
            let (x, y) = (a.spawn(id), b.spawn(id));
            assert_eq!(x.kind, y.kind);
            assert_eq!(x.y, y.y);
        }
    }

    #[test]
    fn test_all_kinds_eventually_spawn() {
        let mut spawner = ObstacleSpawner::new(3);
        let mut seen = std::collections::HashSet::new();
        for id in 0..200 {
            seen.insert(spawner.spawn(id).kind);
        }
        assert_eq!(seen.len(), ObstacleKind::ALL.len());
    }
}
