//! Shape generation for 2D primitives
//!
//! All shapes are emitted in world units; the pipeline maps them to clip
//! space.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;
use crate::sim::Rect;

/// Axis-aligned filled rectangle
pub fn rect(min: Vec2, max: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Filled collision rectangle
pub fn fill_rect(r: &Rect, color: [f32; 4]) -> Vec<Vertex> {
    rect(r.min, r.max, color)
}

/// Rectangle with vertical color gradient (top to bottom)
pub fn gradient_rect(min: Vec2, max: Vec2, top: [f32; 4], bottom: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(min.x, min.y, top),
        Vertex::new(max.x, min.y, top),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(max.x, min.y, top),
        Vertex::new(max.x, max.y, bottom),
    ]
}

/// Filled triangle
pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Five-pointed (or `points`-pointed) star, first tip pointing up
pub fn star(
    center: Vec2,
    outer_radius: f32,
    inner_radius: f32,
    points: u32,
    color: [f32; 4],
) -> Vec<Vertex> {
    let corners = points * 2;
    let mut vertices = Vec::with_capacity((corners * 3) as usize);

    let corner = |i: u32| {
        let r = if i % 2 == 0 { outer_radius } else { inner_radius };
        // Screen y grows downward, so -PI/2 is straight up
        let theta = -PI / 2.0 + (i as f32 / corners as f32) * 2.0 * PI;
        center + Vec2::new(r * theta.cos(), r * theta.sin())
    };

    for i in 0..corners {
        let p1 = corner(i);
        let p2 = corner((i + 1) % corners);
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(p1.x, p1.y, color));
        vertices.push(Vertex::new(p2.x, p2.y, color));
    }

    vertices
}
