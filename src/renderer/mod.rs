//! WebGPU rendering module
//!
//! Builds flat-colored triangles from a simulation snapshot in world units,
//! then maps them through the `ScalingTransform` at upload time.

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{SceneOptions, build_scene, to_clip_space};
pub use vertex::Vertex;
