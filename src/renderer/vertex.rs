//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::color::Rgba;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: Rgba,
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: Rgba) -> Self {
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

/// Colors for the arena
pub mod colors {
    use crate::color::Rgba;

    /// Outside the world
    pub const BACKGROUND: Rgba = [0.0, 0.0, 0.0, 1.0];
    pub const FLOOR: Rgba = [0.067, 0.067, 0.067, 1.0];
    pub const GRID: Rgba = [0.133, 0.133, 0.133, 1.0];
    pub const BORDER: Rgba = [1.0, 0.0, 0.0, 1.0];
    pub const VIRUS_RIM: Rgba = [0.0, 0.4, 0.0, 1.0];
    pub const INVINCIBLE_RING: Rgba = [1.0, 1.0, 1.0, 0.6];
}
