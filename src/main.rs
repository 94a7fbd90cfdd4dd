#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), winit::error::EventLoopError> {
    use rotate_y_core::{App, RenderConfig};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let event_loop = winit::event_loop::EventLoop::new()?;
    let mut app = App::new(RenderConfig::from_env());
    event_loop.run_app(&mut app)
}

// The browser build starts from `rotate_y_core::start`.
#[cfg(target_arch = "wasm32")]
fn main() {}
