//! Logical world space to viewport mapping
//!
//! The simulation runs in a fixed 1000×500 space. The viewport is fitted
//! with a uniform scale and letterboxed, so world units never depend on the
//! canvas size. Conversion happens only at the drawing and pointer
//! boundaries.

use glam::Vec2;

use crate::consts::{WORLD_HEIGHT, WORLD_WIDTH};

/// Uniform scale plus letterbox offset from world units to pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingTransform {
    /// Pixels per world unit
    pub scale: f32,
    /// Pixel offset of the world origin inside the viewport
    pub offset: Vec2,
    /// Viewport size in pixels
    pub viewport: Vec2,
}

impl Default for ScalingTransform {
    fn default() -> Self {
        Self::fit(WORLD_WIDTH, WORLD_HEIGHT)
    }
}

impl ScalingTransform {
    /// Fit the world into a `width`×`height` pixel viewport
    pub fn fit(width: f32, height: f32) -> Self {
        let viewport = Vec2::new(width.max(1.0), height.max(1.0));
        let scale = (viewport.x / WORLD_WIDTH).min(viewport.y / WORLD_HEIGHT);
        let world_px = Vec2::new(WORLD_WIDTH, WORLD_HEIGHT) * scale;
        Self {
            scale,
            offset: (viewport - world_px) * 0.5,
            viewport,
        }
    }

    /// Refit after a viewport resize
    pub fn resize(&mut self, width: f32, height: f32) {
        *self = Self::fit(width, height);
    }

    /// World point to viewport pixels
    #[inline]
    pub fn to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    /// Viewport pixels to world point (pointer input)
    #[inline]
    pub fn to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.scale
    }

    /// World point to normalized device coordinates (y up, -1..1)
    pub fn to_clip(&self, world: Vec2) -> Vec2 {
        let px = self.to_screen(world);
        Vec2::new(
            px.x / self.viewport.x * 2.0 - 1.0,
            1.0 - px.y / self.viewport.y * 2.0,
        )
    }

    /// Whether a viewport pixel lies inside the drawn world area
    pub fn contains_screen(&self, screen: Vec2) -> bool {
        let world = self.to_world(screen);
        (0.0..=WORLD_WIDTH).contains(&world.x) && (0.0..=WORLD_HEIGHT).contains(&world.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_identity_at_native_size() {
        let t = ScalingTransform::default();
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.offset, Vec2::ZERO);
        assert!(close(t.to_screen(Vec2::new(120.0, 430.0)), Vec2::new(120.0, 430.0)));
    }

    #[test]
    fn test_wide_viewport_letterboxes_horizontally() {
        let t = ScalingTransform::fit(2000.0, 500.0);
        assert_eq!(t.scale, 1.0);
        assert_eq!(t.offset, Vec2::new(500.0, 0.0));
    }

    #[test]
    fn test_tall_viewport_letterboxes_vertically() {
        let t = ScalingTransform::fit(500.0, 1000.0);
        assert_eq!(t.scale, 0.5);
        assert_eq!(t.offset, Vec2::new(0.0, 375.0));
        assert!(close(t.to_screen(Vec2::new(1000.0, 500.0)), Vec2::new(500.0, 625.0)));
    }

    #[test]
    fn test_round_trip_non_integer_scale() {
        let t = ScalingTransform::fit(733.0, 411.0);
        let p = Vec2::new(321.5, 402.25);
        assert!(close(t.to_world(t.to_screen(p)), p));
    }

    #[test]
    fn test_clip_corners() {
        let t = ScalingTransform::fit(1000.0, 500.0);
        assert!(close(t.to_clip(Vec2::ZERO), Vec2::new(-1.0, 1.0)));
        assert!(close(
            t.to_clip(Vec2::new(WORLD_WIDTH, WORLD_HEIGHT)),
            Vec2::new(1.0, -1.0)
        ));
    }

    #[test]
    fn test_contains_screen_excludes_letterbox() {
        let t = ScalingTransform::fit(2000.0, 500.0);
        assert!(!t.contains_screen(Vec2::new(100.0, 100.0)));
        assert!(t.contains_screen(Vec2::new(1000.0, 250.0)));
    }

    #[test]
    fn test_degenerate_viewport() {
        let t = ScalingTransform::fit(0.0, 0.0);
        assert!(t.scale > 0.0);
    }
}
