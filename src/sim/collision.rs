//! Collision detection between the runner and obstacles
//!
//! Everything is axis-aligned boxes. Most obstacles are a single box; the
//! arch decomposes into two pillars and a top bar so the player can duck
//! under it.

use glam::Vec2;

use super::character::Character;
use super::obstacle::{Obstacle, ObstacleKind};
use crate::consts::{GROUND_Y, HITBOX_INSET};

/// Axis-aligned box, `min` is the top-left corner (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            min: Vec2::new(left, top),
            max: Vec2::new(right, bottom),
        }
    }

    /// Shrink by `amount` on every side
    pub fn inset(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    /// Strict overlap on both axes; touching edges do not collide
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Padding of the arch parts from its bounding box
pub const ARCH_PADDING: f32 = 6.0;
/// Pillar thickness
pub const ARCH_PILLAR_WIDTH: f32 = 8.0;
/// Distance from the arch top down to where the pillars start
pub const ARCH_TOP_HEIGHT: f32 = 40.0;

/// Character box for the current pose, before inset
pub fn character_box(character: &Character) -> Rect {
    Rect::new(
        character.x,
        character.effective_top(),
        character.width,
        character.effective_height(),
    )
}

/// Character box used for collision
pub fn character_hitbox(character: &Character) -> Rect {
    character_box(character).inset(HITBOX_INSET)
}

/// Arch parts: left pillar, right pillar, top bar
///
/// Pillars run from the bottom of the top bar down to the ground; the top bar
/// spans the padded width.
pub fn arch_parts(obstacle: &Obstacle) -> [Rect; 3] {
    let left = obstacle.x + ARCH_PADDING;
    let right = obstacle.x + obstacle.width - ARCH_PADDING;
    let top = obstacle.y + ARCH_PADDING;
    let bar_bottom = obstacle.y + ARCH_TOP_HEIGHT;

    [
        Rect::from_edges(left, bar_bottom, left + ARCH_PILLAR_WIDTH, GROUND_Y),
        Rect::from_edges(right - ARCH_PILLAR_WIDTH, bar_bottom, right, GROUND_Y),
        Rect::from_edges(left, top, right, bar_bottom),
    ]
}

/// Obstacle box used for collision (single-box kinds)
pub fn obstacle_hitbox(obstacle: &Obstacle) -> Rect {
    Rect::new(obstacle.x, obstacle.y, obstacle.width, obstacle.height).inset(HITBOX_INSET)
}

/// Whether `character` touches `obstacle`
///
/// No part of an arch collides while ducking.
pub fn check_collision(character: &Character, obstacle: &Obstacle) -> bool {
    let hitbox = character_hitbox(character);
    match obstacle.kind {
        ObstacleKind::Arch => {
            !character.is_ducking() && arch_parts(obstacle).iter().any(|p| hitbox.overlaps(p))
        }
        ObstacleKind::Gift | ObstacleKind::Palm | ObstacleKind::Camel | ObstacleKind::Star => {
            hitbox.overlaps(&obstacle_hitbox(obstacle))
        }
    }
}
