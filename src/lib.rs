//! # Rotate Y
//!
//! This library renders a single flat red rectangle that keeps spinning about the vertical axis,
//! using the WebGPU API through `wgpu`. It runs natively (see `src/main.rs`) and in the browser,
//! where it attaches to a `<canvas id="canvas">` element.
//!
//! ## Modules
//!
//! - [`transform`]: 4x4 matrices and homogeneous vectors: translation, scaling, axis rotations
//!   and composition.
//! - [`vertex`]: the vertex type, its buffer layout and the rectangle generator.
//! - [`format`]: resolves the host's colour format name into a renderable texture format.
//! - [`pipeline`]: builds the render pipeline once from the WGSL programs below.
//! - [`uniform_buffer`], [`uniform_binding`]: the per-frame transform and the pool of uniform
//!   buffers it is written into.
//! - [`scheduler`]: the frame loop body, its start/stop lifecycle and the rotation animation.
//! - [`gpu`]: the adapter/device/queue context and the window surface.
//! - [`renderer`]: glues the above to a window surface.
//! - [`app`]: the `winit` application handler.
//! - [`config`], [`error`]: settings and the error type.
//!
//! ## Example
//!
//! Rendering one frame offscreen, without a window:
//!
//! ```rust,no_run
//! use rotate_y_core::{FrameScheduler, Gpu, PipelineManager, RenderConfig, RenderResult};
//!
//! async fn one_frame(target: &wgpu::TextureView) -> RenderResult<()> {
//!     let gpu = Gpu::new_headless().await?;
//!     let pipeline = PipelineManager::new(&gpu, wgpu::TextureFormat::Rgba8Unorm).await?;
//!     let mut scheduler = FrameScheduler::new(&gpu, pipeline, &RenderConfig::default());
//!     scheduler.start();
//!     scheduler.tick(&gpu, target)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Dependencies
//!
//! - `wgpu`: GPU access, pipelines and resource management.
//! - `winit`: window and event loop.
//! - `bytemuck`: casting vertices and matrices to bytes.
//! - `log`, with `env_logger` natively and `console_log` on the web.
//! - `thiserror`: the [`RenderError`] type.

pub mod app;
pub mod config;
pub mod error;
pub mod format;
pub mod gpu;
pub mod pipeline;
pub mod renderer;
pub mod scheduler;
pub mod transform;
pub mod uniform_binding;
pub mod uniform_buffer;
pub mod vertex;

pub use crate::app::App;
pub use crate::config::RenderConfig;
pub use crate::error::{RenderError, RenderResult};
pub use crate::gpu::{Canvas, DeviceHealth, Gpu};
pub use crate::pipeline::PipelineManager;
pub use crate::renderer::Renderer;
pub use crate::scheduler::{FrameScheduler, SchedulerState, StopToken, TickOutcome};
pub use crate::transform::{Matrix4, Vector4};
pub use crate::uniform_binding::UniformRing;
pub use crate::uniform_buffer::UniformTransform;
pub use crate::vertex::Vertex;

/// WGSL source of the vertex stage.
///
/// Reads one `vec3<f32>` position at `@location(0)` and a `mat4x4<f32>` uniform at
/// `@group(0) @binding(0)`, and outputs `transform * vec4(position, 1.0)` as the clip-space position.
/// The entry point is `main`.
pub const VERTEX_SHADER_SOURCE: &str = include_str!("vertex.wgsl");

/// WGSL source of the fragment stage: takes no inputs and writes opaque red. The entry point is
/// `main`.
pub const FRAGMENT_SHADER_SOURCE: &str = include_str!("fragment.wgsl");

/// Browser entry point: sets up logging and hands an [`App`] to the event loop.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() -> Result<(), wasm_bindgen::JsValue> {
    use winit::platform::web::EventLoopExtWebSys;

    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info)
        .map_err(|error| wasm_bindgen::JsValue::from_str(&error.to_string()))?;

    let event_loop = winit::event_loop::EventLoop::new()
        .map_err(|error| wasm_bindgen::JsValue::from_str(&error.to_string()))?;
    event_loop.spawn_app(App::new(RenderConfig::default()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_sources_declare_entry_points() {
        assert!(VERTEX_SHADER_SOURCE.contains("@vertex"));
        assert!(VERTEX_SHADER_SOURCE.contains("fn main"));
        assert!(VERTEX_SHADER_SOURCE.contains("@group(0) @binding(0)"));
        assert!(FRAGMENT_SHADER_SOURCE.contains("@fragment"));
        assert!(FRAGMENT_SHADER_SOURCE.contains("vec4<f32>(1.0, 0.0, 0.0, 1.0)"));
    }
}
