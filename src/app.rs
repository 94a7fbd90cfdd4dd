//! # Application Core (`app.rs`)
//!
//! The `App` struct is the `winit` application handler that hosts the renderer: it creates the
//! window, initialises the [`Renderer`] for it, and turns redraw requests into frames.
//!
//! ## Lifecycle
//!
//! - **`resumed`**: creates the window (on the web, attaches to the page's `<canvas id="canvas">`)
//!   and starts initialising the renderer. Until that finishes the app holds no renderer and no
//!   frame is drawn.
//! - **`RedrawRequested`**: renders one frame and, while the frame loop is still running, requests
//!   the next redraw. This is the per-frame callback that keeps the rectangle spinning.
//! - **`CloseRequested`** and **`exiting`**: stop the frame loop. Closing the window also exits the
//!   event loop.
//!
//! Initialisation and frame errors are logged and end the event loop.
//!
//! ## Platform-Specific Notes
//!
//! - **Desktop**: the renderer is initialised synchronously with `pollster::block_on`.
//! - **WebAssembly**: initialisation runs on the browser's executor through
//!   `wasm_bindgen_futures::spawn_local` and the result comes back over a `futures` oneshot channel,
//!   which the app polls on every window event until it resolves.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use std::sync::Arc;
use winit::{application::ApplicationHandler, event::WindowEvent, window::Window};

use crate::config::RenderConfig;
use crate::renderer::Renderer;
use crate::scheduler::TickOutcome;

#[cfg(target_arch = "wasm32")]
use crate::error::RenderResult;

#[derive(Default)]
pub struct App {
    config: RenderConfig,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    #[cfg(target_arch = "wasm32")]
    renderer_receiver: Option<futures::channel::oneshot::Receiver<RenderResult<Renderer>>>,
}

impl App {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn install(&mut self, mut renderer: Renderer) {
        renderer.start();
        self.renderer = Some(renderer);
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_renderer(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        let Some(receiver) = self.renderer_receiver.as_mut() else {
            return;
        };
        match receiver.try_recv() {
            Ok(Some(Ok(renderer))) => {
                self.renderer_receiver = None;
                self.install(renderer);
            }
            Ok(Some(Err(error))) => {
                self.renderer_receiver = None;
                log::error!("Failed to initialize renderer: {error}");
                event_loop.exit();
            }
            Ok(None) => {
                // Still initialising; come back on the next frame.
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }
            Err(_) => {
                self.renderer_receiver = None;
                log::error!("Renderer initialization was cancelled");
                event_loop.exit();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &winit::event_loop::ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut attributes = Window::default_attributes().with_title(self.config.window_title.as_str());

        #[cfg(target_arch = "wasm32")]
        let canvas_size = {
            use winit::platform::web::WindowAttributesExtWebSys;
            let Some(canvas) = find_canvas() else {
                log::error!("No <canvas id=\"canvas\"> element found");
                event_loop.exit();
                return;
            };
            let size = (canvas.width(), canvas.height());
            attributes = attributes.with_canvas(Some(canvas));
            size
        };

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(error) => {
                log::error!("Failed to create window: {error}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let size = window.inner_size();
            log::info!("Window dimensions: ({} x {})", size.width, size.height);
            let result = pollster::block_on(Renderer::new(
                window,
                size.width,
                size.height,
                &self.config,
            ));
            match result {
                Ok(renderer) => self.install(renderer),
                Err(error) => {
                    log::error!("Failed to initialize renderer: {error}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let (canvas_width, canvas_height) = canvas_size;
            log::info!("Canvas dimensions: ({canvas_width} x {canvas_height})");
            let (sender, receiver) = futures::channel::oneshot::channel();
            self.renderer_receiver = Some(receiver);
            let config = self.config.clone();
            let target = window.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let renderer = Renderer::new(target, canvas_width, canvas_height, &config).await;
                if sender.send(renderer).is_err() {
                    log::error!("Failed to send renderer!");
                }
            });
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &winit::event_loop::ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        #[cfg(target_arch = "wasm32")]
        self.poll_renderer(event_loop);

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested. Exiting...");
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.stop();
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let (Some(renderer), Some(window)) = (self.renderer.as_mut(), self.window.as_ref())
                else {
                    return;
                };
                match renderer.render_frame() {
                    Ok(TickOutcome::Stopped) => {}
                    Ok(TickOutcome::Drawn | TickOutcome::Skipped) => {
                        if renderer.is_running() {
                            window.request_redraw();
                        }
                    }
                    Err(error) => {
                        log::error!("Frame failed, stopping: {error}");
                        renderer.stop();
                        event_loop.exit();
                    }
                }
            }
            _ => (),
        }
    }

    fn exiting(&mut self, _event_loop: &winit::event_loop::ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.stop();
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn find_canvas() -> Option<wgpu::web_sys::HtmlCanvasElement> {
    wgpu::web_sys::window()?
        .document()?
        .get_element_by_id("canvas")?
        .dyn_into::<wgpu::web_sys::HtmlCanvasElement>()
        .ok()
}
