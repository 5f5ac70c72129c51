//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    pub const LETTERBOX: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const SKY: [f32; 4] = [0.05, 0.05, 0.18, 1.0];
    pub const HORIZON: [f32; 4] = [0.25, 0.15, 0.35, 1.0];
    pub const BACKGROUND_STAR: [f32; 4] = [1.0, 1.0, 0.9, 0.8];
    pub const GROUND: [f32; 4] = [0.76, 0.6, 0.35, 1.0];
    pub const GROUND_EDGE: [f32; 4] = [0.55, 0.42, 0.22, 1.0];

    pub const ROBE: [f32; 4] = [0.55, 0.15, 0.6, 1.0];
    pub const FACE: [f32; 4] = [0.95, 0.8, 0.65, 1.0];
    pub const CROWN: [f32; 4] = [1.0, 0.84, 0.0, 1.0];

    pub const GIFT: [f32; 4] = [0.85, 0.15, 0.2, 1.0];
    pub const RIBBON: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
    pub const PALM_TRUNK: [f32; 4] = [0.55, 0.35, 0.15, 1.0];
    pub const PALM_LEAVES: [f32; 4] = [0.15, 0.6, 0.2, 1.0];
    pub const CAMEL: [f32; 4] = [0.8, 0.6, 0.35, 1.0];
    pub const STAR: [f32; 4] = [1.0, 0.9, 0.3, 1.0];
    pub const ARCH: [f32; 4] = [0.7, 0.65, 0.6, 1.0];

    /// Obstacle color by `ObstacleKind::color_index`
    pub const OBSTACLE: [[f32; 4]; 5] = [GIFT, PALM_LEAVES, CAMEL, STAR, ARCH];

    pub fn obstacle(index: u32) -> [f32; 4] {
        OBSTACLE
            .get(index as usize)
            .copied()
            .unwrap_or([1.0, 1.0, 1.0, 1.0])
    }

    /// Same color with a different alpha
    pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
        [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
    }
}
