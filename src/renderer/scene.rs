//! Scene building from a simulation snapshot
//!
//! Read-only over `SimulationState`. Draw order: sky, starfield, ground,
//! obstacles, character, particles.

use glam::Vec2;

use super::shapes;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::scaling::ScalingTransform;
use crate::settings::Settings;
use crate::sim::state::PARTICLE_LIFE;
use crate::sim::{Character, Obstacle, ObstacleKind, SimulationState, arch_parts};

/// Presentation switches derived from settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub starfield: bool,
    pub max_particles: usize,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SceneOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            starfield: settings.quality.starfield_enabled() && !settings.reduced_motion,
            max_particles: settings.max_particles(),
        }
    }
}

/// Build world-space triangles for one frame
pub fn build_scene(state: &SimulationState, options: &SceneOptions) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(4096);

    vertices.extend(shapes::gradient_rect(
        Vec2::ZERO,
        Vec2::new(WORLD_WIDTH, GROUND_Y),
        colors::SKY,
        colors::HORIZON,
    ));

    if options.starfield {
        for star in &state.stars {
            vertices.extend(shapes::circle(
                Vec2::new(star.x, star.y),
                star.size,
                colors::BACKGROUND_STAR,
                6,
            ));
        }
    }

    vertices.extend(shapes::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
        colors::GROUND,
    ));
    vertices.extend(shapes::rect(
        Vec2::new(0.0, GROUND_Y),
        Vec2::new(WORLD_WIDTH, GROUND_Y + 3.0),
        colors::GROUND_EDGE,
    ));

    for obstacle in &state.obstacles {
        obstacle_vertices(obstacle, &mut vertices);
    }

    character_vertices(&state.character, &mut vertices);

    for particle in state.particles.iter().take(options.max_particles) {
        let alpha = particle.life as f32 / PARTICLE_LIFE.end as f32;
        let half = Vec2::splat(particle.size * 0.5);
        let center = Vec2::new(particle.x, particle.y);
        vertices.extend(shapes::rect(
            center - half,
            center + half,
            colors::with_alpha(colors::obstacle(particle.color), alpha),
        ));
    }

    vertices
}

fn obstacle_vertices(obstacle: &Obstacle, out: &mut Vec<Vertex>) {
    let min = Vec2::new(obstacle.x, obstacle.y);
    let max = min + Vec2::new(obstacle.width, obstacle.height);
    let center = (min + max) * 0.5;

    match obstacle.kind {
        ObstacleKind::Gift => {
            out.extend(shapes::rect(min, max, colors::GIFT));
            out.extend(shapes::rect(
                Vec2::new(center.x - 3.0, min.y),
                Vec2::new(center.x + 3.0, max.y),
                colors::RIBBON,
            ));
            out.extend(shapes::rect(
                Vec2::new(min.x, center.y - 3.0),
                Vec2::new(max.x, center.y + 3.0),
                colors::RIBBON,
            ));
        }
        ObstacleKind::Palm => {
            out.extend(shapes::rect(
                Vec2::new(center.x - 4.0, min.y + 15.0),
                Vec2::new(center.x + 4.0, max.y),
                colors::PALM_TRUNK,
            ));
            out.extend(shapes::circle(
                Vec2::new(center.x, min.y + 12.0),
                obstacle.width * 0.6,
                colors::PALM_LEAVES,
                12,
            ));
        }
        ObstacleKind::Camel => {
            let body_top = min.y + obstacle.height * 0.35;
            let leg_top = min.y + obstacle.height * 0.7;
            out.extend(shapes::rect(
                Vec2::new(min.x, body_top),
                Vec2::new(max.x - 10.0, leg_top),
                colors::CAMEL,
            ));
            out.extend(shapes::circle(
                Vec2::new(center.x - 5.0, body_top),
                10.0,
                colors::CAMEL,
                10,
            ));
            out.extend(shapes::rect(
                Vec2::new(max.x - 12.0, min.y),
                Vec2::new(max.x, body_top + 5.0),
                colors::CAMEL,
            ));
            for leg_x in [min.x + 4.0, max.x - 20.0] {
                out.extend(shapes::rect(
                    Vec2::new(leg_x, leg_top),
                    Vec2::new(leg_x + 6.0, max.y),
                    colors::CAMEL,
                ));
            }
        }
        ObstacleKind::Star => {
            let radius = obstacle.width.min(obstacle.height) * 0.5;
            out.extend(shapes::star(center, radius, radius * 0.45, 5, colors::STAR));
        }
        ObstacleKind::Arch => {
            for part in arch_parts(obstacle) {
                out.extend(shapes::fill_rect(&part, colors::ARCH));
            }
        }
    }
}

fn character_vertices(character: &Character, out: &mut Vec<Vertex>) {
    let top = character.effective_top();
    let height = character.effective_height();
    let min = Vec2::new(character.x, top);
    let max = Vec2::new(character.x + character.width, top + height);
    let head_h = height * 0.35;

    out.extend(shapes::rect(Vec2::new(min.x, min.y + head_h), max, colors::ROBE));
    out.extend(shapes::rect(
        Vec2::new(min.x + 6.0, min.y),
        Vec2::new(max.x - 6.0, min.y + head_h),
        colors::FACE,
    ));

    // Three-point crown above the head
    let crown_base = min.y;
    let crown_h = 8.0;
    let step = (character.width - 12.0) / 3.0;
    for i in 0..3 {
        let left = min.x + 6.0 + step * i as f32;
        out.extend(shapes::triangle(
            Vec2::new(left, crown_base),
            Vec2::new(left + step, crown_base),
            Vec2::new(left + step * 0.5, crown_base - crown_h),
            colors::CROWN,
        ));
    }
}

/// Map world-space vertices to clip space
pub fn to_clip_space(vertices: &[Vertex], transform: &ScalingTransform) -> Vec<Vertex> {
    vertices
        .iter()
        .map(|v| {
            let p = transform.to_clip(Vec2::from(v.position));
            Vertex::new(p.x, p.y, v.color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameMode, LEVELS};

    fn running_state() -> SimulationState {
        let mut state = SimulationState::new(GameMode::Story(1), LEVELS[0].clone(), 3);
        state.start(0.0);
        state
    }

    fn bounds(vertices: &[Vertex]) -> (Vec2, Vec2) {
        vertices.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), v| {
                let p = Vec2::from(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn test_scene_is_triangle_list() {
        let mut state = running_state();
        for (i, kind) in ObstacleKind::ALL.into_iter().enumerate() {
            let id = state.next_entity_id();
            state
                .obstacles
                .push(Obstacle::new(id, kind, 300.0 + i as f32 * 120.0, false));
        }
        state.emit_pass_burst(400.0, 300.0, 1);
        let vertices = build_scene(&state, &SceneOptions::default());
        assert!(!vertices.is_empty());
        assert_eq!(vertices.len() % 3, 0);
    }

    #[test]
    fn test_ducked_character_drawn_lower() {
        let mut standing = Vec::new();
        let mut character = Character::default();
        character_vertices(&character, &mut standing);
        character.set_ducking(true);
        let mut ducked = Vec::new();
        character_vertices(&character, &mut ducked);

        let (s_lo, s_hi) = bounds(&standing);
        let (d_lo, d_hi) = bounds(&ducked);
        assert!(d_lo.y > s_lo.y);
        assert!((d_hi.y - GROUND_Y).abs() < 1e-3);
        assert!((s_hi.y - GROUND_Y).abs() < 1e-3);
    }

    #[test]
    fn test_arch_drawn_from_collision_parts() {
        let obstacle = Obstacle::new(1, ObstacleKind::Arch, 500.0, false);
        let mut vertices = Vec::new();
        obstacle_vertices(&obstacle, &mut vertices);
        assert_eq!(vertices.len(), 18);
        let (lo, hi) = bounds(&vertices);
        let parts = arch_parts(&obstacle);
        assert_eq!(lo.x, parts[0].min.x);
        assert_eq!(hi.x, parts[1].max.x);
        assert_eq!(hi.y, GROUND_Y);
    }

    #[test]
    fn test_particle_cap_and_starfield_toggle() {
        let mut state = running_state();
        for _ in 0..4 {
            state.emit_pass_burst(200.0, 200.0, 0);
        }
        let full = build_scene(
            &state,
            &SceneOptions {
                starfield: true,
                max_particles: 128,
            },
        );
        let bare = build_scene(
            &state,
            &SceneOptions {
                starfield: false,
                max_particles: 0,
            },
        );
        let stars = state.stars.len() * 18;
        let particles = state.particles.len() * 6;
        assert_eq!(full.len() - bare.len(), stars + particles);
    }

    #[test]
    fn test_clip_space_letterboxed() {
        let transform = ScalingTransform::fit(2000.0, 500.0);
        let world = shapes::rect(
            Vec2::ZERO,
            Vec2::new(WORLD_WIDTH, WORLD_HEIGHT),
            colors::SKY,
        );
        let clip = to_clip_space(&world, &transform);
        let (lo, hi) = bounds(&clip);
        assert!((lo.x + 0.5).abs() < 1e-5);
        assert!((hi.x - 0.5).abs() < 1e-5);
        assert!((lo.y + 1.0).abs() < 1e-5);
        assert!((hi.y - 1.0).abs() < 1e-5);
    }
}
