//! # Uniform Transform
//!
//! This module defines [`UniformTransform`], the CPU-side image of the single uniform the vertex
//! shader reads:
//!
//! ```wgsl
//! @group(0) @binding(0)
//! var<uniform> transform: mat4x4<f32>;
//! ```
//!
//! ## Memory Layout
//!
//! The struct is `#[repr(C)]` and wraps one [`Matrix4`], which stores its 16 floats column by
//! column. That is exactly the layout WGSL expects for a `mat4x4<f32>` in the uniform address space,
//! so the value can be handed to `queue.write_buffer` through `bytemuck::bytes_of` without any
//! repacking. The size is 64 bytes, which also satisfies the 16-byte alignment uniform buffers need.
//!
//! ## Example
//!
//! ```rust
//! use rotate_y_core::transform::rotation_y;
//! use rotate_y_core::UniformTransform;
//!
//! let uniform = UniformTransform::new(rotation_y(30.0));
//! assert_eq!(bytemuck::bytes_of(&uniform).len(), UniformTransform::SIZE as usize);
//! ```

use crate::transform::Matrix4;

/// The per-frame transform uploaded to the vertex stage.
#[repr(C)]
#[derive(Default, Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformTransform {
    /// Applied to every vertex position as `transform * vec4(position, 1.0)`.
    pub transform: Matrix4,
}

impl UniformTransform {
    /// Size in bytes of one uniform, as allocated on the GPU.
    pub const SIZE: wgpu::BufferAddress = std::mem::size_of::<Self>() as wgpu::BufferAddress;

    pub fn new(transform: Matrix4) -> Self {
        Self { transform }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::translation;

    #[test]
    fn test_size_matches_wgsl_mat4() {
        assert_eq!(UniformTransform::SIZE, 64);
        assert_eq!(UniformTransform::SIZE % 16, 0);
    }

    #[test]
    fn test_default_is_identity() {
        assert_eq!(UniformTransform::default().transform, Matrix4::IDENTITY);
    }

    #[test]
    fn test_bytes_are_column_major() {
        let uniform = UniformTransform::new(translation(1.0, 2.0, 3.0));
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&uniform));
        // Translation lives in the last column, i.e. the last four floats.
        assert_eq!(&floats[12..], &[1.0, 2.0, 3.0, 1.0]);
        assert_eq!(&floats[..4], &[1.0, 0.0, 0.0, 0.0]);
    }
}
