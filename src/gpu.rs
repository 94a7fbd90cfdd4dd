//! # GPU Context Module
//!
//! The `gpu` module owns the handles every other part of the renderer borrows: the adapter, the
//! logical device and its queue. It also wraps the drawable surface of a window in [`Canvas`].
//!
//! ## Overview
//!
//! - [`Gpu`]: created once, then passed by reference to the pipeline and the frame scheduler.
//!   [`Gpu::new_async`] asks for an adapter compatible with a surface, [`Gpu::new_headless`] asks for
//!   any adapter, which is what offscreen rendering and tests need.
//! - [`DeviceHealth`]: records the first uncaptured error or device loss reported by wgpu. Those
//!   callbacks fire outside the frame loop, so the loop polls [`Gpu::check_health`] at the start of
//!   each frame instead.
//! - [`Canvas`]: a configured surface plus its configuration. It resolves the colour format the
//!   host asked for and hands out frame images, skipping frames the surface cannot provide.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rotate_y_core::{Canvas, Gpu, RenderResult};
//!
//! async fn connect(window: std::sync::Arc<winit::window::Window>) -> RenderResult<(Gpu, Canvas)> {
//!     let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
//!     let surface = instance.create_surface(window)?;
//!     let gpu = Gpu::new_async(&instance, Some(&surface)).await?;
//!     let canvas = Canvas::new(surface, &gpu, 800, 600, None)?;
//!     Ok((gpu, canvas))
//! }
//! ```

use std::sync::{Arc, Mutex};

use crate::error::{RenderError, RenderResult};
use crate::format::resolve_target_format;

/// Shared record of the first fault wgpu reported for a device.
#[derive(Clone, Default, Debug)]
pub struct DeviceHealth {
    fault: Arc<Mutex<Option<String>>>,
}

impl DeviceHealth {
    /// Stores `message` unless an earlier fault is already recorded.
    pub fn record(&self, message: impl Into<String>) {
        let mut fault = self.fault.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if fault.is_none() {
            *fault = Some(message.into());
        }
    }

    pub fn fault(&self) -> Option<String> {
        self.fault
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn check(&self) -> RenderResult<()> {
        match self.fault() {
            Some(message) => Err(RenderError::DeviceFault(message)),
            None => Ok(()),
        }
    }
}

/// The adapter, device and queue shared by the pipeline and the frame loop.
///
/// # Fields
/// - `adapter` (`wgpu::Adapter`): the physical GPU the device was requested from.
/// - `device` (`wgpu::Device`): creates buffers, shader modules, pipelines and encoders.
/// - `queue` (`wgpu::Queue`): receives buffer writes and command buffer submissions.
/// - `health` ([`DeviceHealth`]): faults reported asynchronously by the device.
pub struct Gpu {
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub health: DeviceHealth,
}

impl Gpu {
    /// Requests an adapter and a device from `instance`.
    ///
    /// When `surface` is given the adapter must be able to present to it. The device gets an
    /// uncaptured-error handler and a device-lost callback that both feed [`Gpu::health`].
    ///
    /// # Errors
    /// - [`RenderError::AdapterUnavailable`] if no adapter matches.
    /// - [`RenderError::DeviceCreationFailed`] if the adapter refuses the device request.
    pub async fn new_async(
        instance: &wgpu::Instance,
        surface: Option<&wgpu::Surface<'_>>,
    ) -> RenderResult<Self> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or(RenderError::AdapterUnavailable)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);
        log::debug!("WGPU Adapter Features: {:#?}", adapter.features());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("WGPU Device"),
                    memory_hints: wgpu::MemoryHints::default(),
                    required_features: wgpu::Features::default(),
                    required_limits: required_limits(&adapter),
                },
                None,
            )
            .await?;

        let health = DeviceHealth::default();
        watch_device(&device, &health);

        Ok(Self {
            adapter,
            device,
            queue,
            health,
        })
    }

    /// Creates a context without any surface, for offscreen rendering.
    pub async fn new_headless() -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self::new_async(&instance, None).await
    }

    /// Fails with [`RenderError::DeviceFault`] once the device has reported a fault.
    pub fn check_health(&self) -> RenderResult<()> {
        self.health.check()
    }
}

fn required_limits(adapter: &wgpu::Adapter) -> wgpu::Limits {
    #[cfg(not(all(target_arch = "wasm32", feature = "webgl")))]
    let limits = wgpu::Limits::default();
    #[cfg(all(target_arch = "wasm32", feature = "webgl"))]
    let limits = wgpu::Limits::downlevel_webgl2_defaults();

    limits.using_resolution(adapter.limits())
}

fn watch_device(device: &wgpu::Device, health: &DeviceHealth) {
    let errors = health.clone();
    device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
        log::error!("Uncaptured WGPU error: {error}");
        errors.record(error.to_string());
    }));

    let lost = health.clone();
    device.set_device_lost_callback(move |reason: wgpu::DeviceLostReason, message: String| {
        // Dropping the device reports a loss as well.
        if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
            return;
        }
        log::error!("WGPU device lost ({reason:?}): {message}");
        lost.record(format!("device lost: {message}"));
    });
}

/// A window surface configured for rendering.
pub struct Canvas {
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl Canvas {
    /// Configures `surface` for `gpu` at `width` x `height`.
    ///
    /// `preferred` is the host's colour format name. Without one the surface's first (native)
    /// format is used; with one it must be supported by the surface, otherwise this fails with
    /// [`RenderError::UnsupportedFormat`].
    pub fn new(
        surface: wgpu::Surface<'static>,
        gpu: &Gpu,
        width: u32,
        height: u32,
        preferred: Option<&str>,
    ) -> RenderResult<Self> {
        let capabilities = surface.get_capabilities(&gpu.adapter);
        let format =
            resolve_target_format(preferred, &capabilities.formats, gpu.device.features())?;
        log::info!("Surface format: {format:?}");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: capabilities
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &config);

        Ok(Self { surface, config })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the next frame image, or `None` when this frame has to be skipped.
    ///
    /// A timeout skips the frame. An outdated or lost surface is reconfigured with the current
    /// configuration and the frame is skipped. Any other error is returned.
    pub fn acquire(&self, gpu: &Gpu) -> RenderResult<Option<wgpu::SurfaceTexture>> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timed out, skipping frame");
                Ok(None)
            }
            Err(error @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
                log::warn!("Surface {error}, reconfiguring and skipping frame");
                self.surface.configure(&gpu.device, &self.config);
                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_starts_clean() {
        let health = DeviceHealth::default();
        assert!(health.fault().is_none());
        assert!(health.check().is_ok());
    }

    #[test]
    fn test_health_keeps_first_fault() {
        let health = DeviceHealth::default();
        let handle = health.clone();
        handle.record("validation error");
        handle.record("device lost");

        assert_eq!(health.fault().as_deref(), Some("validation error"));
        match health.check() {
            Err(RenderError::DeviceFault(message)) => assert_eq!(message, "validation error"),
            other => panic!("expected DeviceFault, got {other:?}"),
        }
    }
}
