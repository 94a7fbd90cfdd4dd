//! # Frame Scheduler
//!
//! The per-frame half of the renderer. [`FrameScheduler`] holds everything a frame needs (the
//! pipeline, the static vertex buffer, the uniform ring and the rotation angle) and exposes one
//! loop body, [`FrameScheduler::tick`]. The host calls it once per display refresh; tests call it
//! directly against an offscreen texture.
//!
//! ## States
//!
//! ```text
//! Ready --start()--> Rendering --stop requested, or device fault--> Stopped
//! ```
//!
//! A scheduler is `Ready` as soon as it is constructed, since construction uploads the vertex
//! buffer and takes ownership of a built pipeline. `Stopped` is final. A stop requested through
//! [`FrameScheduler::stop`] or a [`StopToken`] is observed at the start of the next tick, which
//! then draws nothing.
//!
//! ## One Tick
//!
//! 1. Check the stop token and the device's health.
//! 2. Build `rotation_y(angle)` and write it into the next uniform slot.
//! 3. Encode a render pass that clears the target, binds the pipeline, the vertex buffer and the
//!    slot's bind group, and draws the rectangle's six vertices.
//! 4. Submit, then advance the angle by the configured step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::gpu::Gpu;
use crate::pipeline::PipelineManager;
use crate::transform::{rotation_y, Matrix4};
use crate::uniform_binding::UniformRing;
use crate::uniform_buffer::UniformTransform;
use crate::vertex::{rectangle, RECTANGLE_VERTEX_COUNT};

/// Cloneable handle that asks a running scheduler to stop.
#[derive(Clone, Debug, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Ready,
    Rendering,
    Stopped,
}

/// What a call to [`FrameScheduler::tick`] did.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// A frame was encoded and submitted.
    Drawn,
    /// The scheduler is stopped; nothing was submitted.
    Stopped,
    /// The surface had no image for this frame; nothing was submitted.
    Skipped,
}

/// Rotation about the y axis that advances by a fixed step per frame.
///
/// The angle is kept in `[0, 360)` so it does not lose precision over long runs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RotationAnimation {
    angle: f32,
    step: f32,
}

impl RotationAnimation {
    pub fn new(step: f32) -> Self {
        Self { angle: 0.0, step }
    }

    /// Current angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn transform(&self) -> Matrix4 {
        rotation_y(self.angle)
    }

    pub fn advance(&mut self) {
        self.angle = (self.angle + self.step).rem_euclid(360.0);
    }
}

/// Drives the rectangle's animation, one frame per [`tick`](FrameScheduler::tick).
pub struct FrameScheduler {
    pipeline: PipelineManager,
    vertex_buffer: wgpu::Buffer,
    uniforms: UniformRing,
    animation: RotationAnimation,
    clear_color: wgpu::Color,
    state: SchedulerState,
    stop: StopToken,
}

impl FrameScheduler {
    /// Uploads the rectangle described by `config` and prepares the uniform slots.
    pub fn new(gpu: &Gpu, pipeline: PipelineManager, config: &RenderConfig) -> Self {
        let vertices = rectangle(config.rectangle_width, config.rectangle_height);
        let vertex_buffer = wgpu::util::DeviceExt::create_buffer_init(
            &gpu.device,
            &wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );

        let uniforms = UniformRing::new(
            &gpu.device,
            pipeline.uniform_layout(),
            config.uniform_slots,
        );

        Self {
            pipeline,
            vertex_buffer,
            uniforms,
            animation: RotationAnimation::new(config.angle_step),
            clear_color: config.clear_color,
            state: SchedulerState::Ready,
            stop: StopToken::default(),
        }
    }

    /// Enters `Rendering` and returns a token that can stop the loop from elsewhere.
    ///
    /// Has no effect on a scheduler that is already rendering or has stopped.
    pub fn start(&mut self) -> StopToken {
        if self.state == SchedulerState::Ready {
            log::info!("Frame loop started");
            self.state = SchedulerState::Rendering;
        }
        self.stop.clone()
    }

    /// Requests a stop. A scheduler that never started stops right away.
    pub fn stop(&mut self) {
        self.stop.cancel();
        if self.state == SchedulerState::Ready {
            self.state = SchedulerState::Stopped;
        }
    }

    pub fn stop_handle(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// `false` as soon as a stop has been requested, even before a tick has observed it.
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Rendering && !self.stop.is_cancelled()
    }

    /// Current rotation angle in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f32 {
        self.animation.angle()
    }

    pub fn pipeline(&self) -> &PipelineManager {
        &self.pipeline
    }

    /// Renders one frame into `target`, which must have the pipeline's target format.
    ///
    /// # Errors
    /// - [`RenderError::NotStarted`] if [`start`](Self::start) was never called.
    /// - [`RenderError::DeviceFault`] if the device reported a fault since the last tick. The
    ///   scheduler is stopped before the error is returned.
    pub fn tick(&mut self, gpu: &Gpu, target: &wgpu::TextureView) -> RenderResult<TickOutcome> {
        match self.state {
            SchedulerState::Ready => return Err(RenderError::NotStarted),
            SchedulerState::Stopped => return Ok(TickOutcome::Stopped),
            SchedulerState::Rendering => {}
        }

        if self.stop.is_cancelled() {
            log::info!("Frame loop stopped");
            self.state = SchedulerState::Stopped;
            return Ok(TickOutcome::Stopped);
        }

        if let Err(error) = gpu.check_health() {
            log::error!("Halting frame loop: {error}");
            self.state = SchedulerState::Stopped;
            return Err(error);
        }

        let transform = self.animation.transform();
        let bind_group = self
            .uniforms
            .write(&gpu.queue, UniformTransform::new(transform));

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(self.pipeline.pipeline());
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_bind_group(0, bind_group, &[]);
            render_pass.draw(0..RECTANGLE_VERTEX_COUNT, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));

        log::trace!("Drew frame at {:.1} degrees", self.animation.angle());
        self.animation.advance();

        Ok(TickOutcome::Drawn)
    }
}
