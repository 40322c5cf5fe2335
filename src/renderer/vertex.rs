//! Vertex types for 2D map rendering

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

/// Colors for map elements
pub mod colors {
    pub const BACKGROUND: [f32; 4] = [0.09, 0.11, 0.09, 1.0];
    pub const CACHE_FULL: [f32; 4] = [0.95, 0.75, 0.2, 1.0];
    pub const CACHE_EMPTY: [f32; 4] = [0.45, 0.45, 0.5, 0.6];
    pub const CACHE_OPENED: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const VISIBILITY: [f32; 4] = [0.3, 0.6, 1.0, 0.8];
    pub const TRAIL: [f32; 4] = [0.9, 0.3, 0.3, 0.7];
    pub const PLAYER: [f32; 4] = [0.2, 0.5, 1.0, 1.0];
    pub const PLAYER_RING: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}
