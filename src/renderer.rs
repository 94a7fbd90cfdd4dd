//! # Renderer Module
//!
//! The `Renderer` ties the pieces together for an on-screen window: the GPU context, the window's
//! [`Canvas`], and the [`FrameScheduler`] that draws into it.
//!
//! ## Setup
//!
//! [`Renderer::new`] runs the whole initialisation in order and stops at the first failure:
//!
//! 1. create the surface for the window,
//! 2. request an adapter and a device able to present to it,
//! 3. configure the surface with the resolved colour format,
//! 4. build the pipeline for that format,
//! 5. upload the rectangle and allocate the uniform slots.
//!
//! Nothing is drawn until all of it succeeded, so the first tick never runs against missing
//! resources.
//!
//! ## Frames
//!
//! [`Renderer::render_frame`] acquires the surface's next image, lets the scheduler draw into it and
//! presents it. Frame rate statistics are logged at `debug` level about once per second.

use web_time::{Duration, Instant};

use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};
use crate::gpu::{Canvas, Gpu};
use crate::pipeline::PipelineManager;
use crate::scheduler::{FrameScheduler, SchedulerState, StopToken, TickOutcome};

pub struct Renderer {
    gpu: Gpu,
    canvas: Canvas,
    scheduler: FrameScheduler,
    stats: FrameStats,
}

impl Renderer {
    /// Initialises everything needed to draw into `window`.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        config: &RenderConfig,
    ) -> RenderResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let gpu = Gpu::new_async(&instance, Some(&surface)).await?;
        let canvas = Canvas::new(
            surface,
            &gpu,
            width,
            height,
            config.surface_format.as_deref(),
        )?;
        let pipeline = PipelineManager::new(&gpu, canvas.format()).await?;
        let scheduler = FrameScheduler::new(&gpu, pipeline, config);

        Ok(Self {
            gpu,
            canvas,
            scheduler,
            stats: FrameStats::new(Instant::now()),
        })
    }

    pub fn start(&mut self) -> StopToken {
        self.stats = FrameStats::new(Instant::now());
        self.scheduler.start()
    }

    pub fn stop(&mut self) {
        self.scheduler.stop();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    /// Draws and presents one frame.
    ///
    /// Returns [`TickOutcome::Skipped`] when the surface had no image for this frame.
    pub fn render_frame(&mut self) -> RenderResult<TickOutcome> {
        match self.scheduler.state() {
            SchedulerState::Ready => return Err(RenderError::NotStarted),
            SchedulerState::Stopped => return Ok(TickOutcome::Stopped),
            SchedulerState::Rendering => {}
        }

        let Some(surface_texture) = self.canvas.acquire(&self.gpu)? else {
            return Ok(TickOutcome::Skipped);
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let outcome = self.scheduler.tick(&self.gpu, &surface_texture_view)?;
        if outcome == TickOutcome::Drawn {
            surface_texture.present();
            if let Some(fps) = self.stats.record(Instant::now()) {
                log::debug!("{fps:.1} fps");
            }
        }
        Ok(outcome)
    }
}

/// Counts presented frames and reports the rate once per interval.
#[derive(Debug)]
pub struct FrameStats {
    window_start: Instant,
    frames: u32,
    interval: Duration,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            interval: Duration::from_secs(1),
        }
    }

    /// Records a presented frame. Returns the frame rate once a full interval has passed.
    pub fn record(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.duration_since(self.window_start);
        if elapsed < self.interval {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_wait_for_full_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for i in 1..60 {
            assert_eq!(stats.record(start + Duration::from_millis(i * 16)), None);
        }
    }

    #[test]
    fn test_stats_report_rate_and_reset() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start);
        for _ in 0..59 {
            stats.record(start + Duration::from_millis(500));
        }
        let fps = stats.record(start + Duration::from_secs(1)).unwrap();
        assert!((fps - 60.0).abs() < 1e-9);

        // The next report covers only frames after the reset.
        let fps = stats.record(start + Duration::from_secs(2)).unwrap();
        assert!((fps - 1.0).abs() < 1e-9);
    }
}
