//! # Vertex Module
//!
//! This module provides the `Vertex` struct, the vertex buffer layout the pipeline reads it with,
//! and the generator for the rectangle that the render loop spins.
//!
//! # Overview
//!
//! ## Structs
//!
//! - [`Vertex`]: A single position in 3D space, three `f32` components, 12 bytes.
//!
//! ## Functions
//!
//! - [`rectangle`]: The six vertices (two triangles, no index buffer) of an axis-aligned rectangle
//!   with one corner at the origin.
//! - [`Vertex::description`]: The `wgpu::VertexBufferLayout` matching `@location(0) vec3<f32>` in the
//!   vertex shader.
//!
//! ## Usage
//!
//! ```rust
//! use wgpu::util::DeviceExt;
//! use rotate_y_core::vertex::rectangle;
//!
//! # fn upload(device: &wgpu::Device) -> wgpu::Buffer {
//! let vertices = rectangle(0.64, 0.36);
//! device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
//!     label: Some("Vertex Buffer"),
//!     contents: bytemuck::cast_slice(&vertices),
//!     usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
//! })
//! # }
//! ```
//!
//! # Crate Dependencies
//!
//! - `wgpu` for the vertex attributes and layouts.
//! - `bytemuck` for casting vertex slices to bytes.

/// Number of vertices emitted by [`rectangle`]: two triangles, the shared diagonal duplicated.
pub const RECTANGLE_VERTEX_COUNT: u32 = 6;

/// Represents a single vertex: a position in 3D space.
///
/// The struct is `#[repr(C)]` and `Pod`, so a slice of vertices can be copied into a
/// vertex buffer as-is. Each vertex occupies 12 bytes (`3 x f32`), which is also the stride
/// declared in [`Vertex::description`].
///
/// # Example
///
/// ```rust
/// use rotate_y_core::Vertex;
///
/// let vertex = Vertex::new(0.0, 0.36, 0.0);
/// assert_eq!(vertex.position, [0.0, 0.36, 0.0]);
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// The `x`, `y` and `z` coordinates. The shader appends `w = 1.0` itself.
    pub position: [f32; 3],
}

impl Vertex {
    /// The vertex attributes read by the vertex stage: a single `Float32x3` position at
    /// shader location 0, offset 0.
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }

    /// Returns the vertex buffer layout for the `Vertex` struct.
    ///
    /// # Returns
    ///
    /// A `wgpu::VertexBufferLayout` with:
    ///
    /// - `array_stride`: 12 bytes, the size of one `Vertex`.
    /// - `step_mode`: `wgpu::VertexStepMode::Vertex`, one element per vertex.
    /// - `attributes`: [`Vertex::ATTRIBUTES`].
    pub fn description() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Returns the vertices of a `width` x `height` rectangle in the `z = 0` plane.
///
/// One corner sits at the origin and the opposite one at `(width, height, 0)`. The rectangle is
/// made of two triangles emitted in draw order, with the vertices along the shared diagonal
/// repeated:
///
/// ```text
/// (0,0,0) (0,h,0) (w,0,0)    first triangle
/// (0,h,0) (w,h,0) (w,0,0)    second triangle
/// ```
///
/// Both triangles have the same winding. The order is fixed: front-face culling depends on it.
pub fn rectangle(width: f32, height: f32) -> [Vertex; RECTANGLE_VERTEX_COUNT as usize] {
    [
        Vertex::new(0.0, 0.0, 0.0),
        Vertex::new(0.0, height, 0.0),
        Vertex::new(width, 0.0, 0.0),
        Vertex::new(0.0, height, 0.0),
        Vertex::new(width, height, 0.0),
        Vertex::new(width, 0.0, 0.0),
    ]
}
