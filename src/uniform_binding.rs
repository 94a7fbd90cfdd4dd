//! # Uniform Binding
//!
//! A small pool of uniform buffers, each already bound into its own bind group, that the frame
//! loop cycles through instead of allocating a fresh buffer and bind group every frame.
//!
//! ## Lifecycle
//!
//! All slots are created up front against the group-0 layout of the render pipeline (the layout
//! wgpu derives from the vertex shader's `@group(0) @binding(0)` declaration). On each frame
//! [`UniformRing::write`] picks the next slot round-robin, overwrites its 64 bytes at offset 0 with
//! `queue.write_buffer` and returns the bind group to use for the draw. Writes are ordered on the
//! queue before the frame's command buffer, so reusing a slot never changes a frame that has
//! already been submitted.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rotate_y_core::transform::rotation_y;
//! use rotate_y_core::{UniformRing, UniformTransform};
//!
//! # fn frame(device: &wgpu::Device, queue: &wgpu::Queue, pipeline: &wgpu::RenderPipeline,
//! #          pass: &mut wgpu::RenderPass<'_>) {
//! let mut ring = UniformRing::new(device, &pipeline.get_bind_group_layout(0), 3);
//! let bind_group = ring.write(queue, UniformTransform::new(rotation_y(45.0)));
//! pass.set_bind_group(0, bind_group, &[]);
//! # }
//! ```

use crate::uniform_buffer::UniformTransform;

struct UniformSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Round-robin pool of uniform buffers and their bind groups.
pub struct UniformRing {
    slots: Vec<UniformSlot>,
    next: usize,
}

impl UniformRing {
    /// Allocates `slots` uniform buffers (at least one), each initialised to the identity transform
    /// and bound at binding 0 of `layout`.
    pub fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, slots: usize) -> Self {
        let slots = (0..slots.max(1))
            .map(|index| {
                let buffer = wgpu::util::DeviceExt::create_buffer_init(
                    device,
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("Uniform Buffer {index}")),
                        contents: bytemuck::bytes_of(&UniformTransform::default()),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    },
                );

                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                    label: Some(&format!("uniform_bind_group_{index}")),
                });

                UniformSlot { buffer, bind_group }
            })
            .collect();

        Self { slots, next: 0 }
    }

    /// Writes `uniform` into the next slot and returns that slot's bind group.
    pub fn write(&mut self, queue: &wgpu::Queue, uniform: UniformTransform) -> &wgpu::BindGroup {
        let index = self.advance();
        let slot = &self.slots[index];
        queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&uniform));
        &slot.bind_group
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn advance(&mut self) -> usize {
        let index = self.next;
        self.next = next_slot(index, self.slots.len());
        index
    }
}

fn next_slot(current: usize, len: usize) -> usize {
    (current + 1) % len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_cycle() {
        let visited: Vec<usize> = std::iter::successors(Some(0), |&i| Some(next_slot(i, 3)))
            .take(7)
            .collect();
        assert_eq!(visited, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_single_slot_is_reused() {
        assert_eq!(next_slot(0, 1), 0);
    }
}
