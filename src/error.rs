//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while setting up or driving the render loop.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No adapter matched the request (no GPU, or no compatible backend).
    #[error("no suitable graphics adapter available")]
    AdapterUnavailable,

    /// Failed to create the wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the drawable surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The requested colour format is unknown, not renderable, or not supported by the surface.
    #[error("unsupported target color format `{0}`")]
    UnsupportedFormat(String),

    /// Shader compilation failed.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Pipeline creation failed.
    #[error("pipeline creation failed: {0}")]
    PipelineCreationFailed(String),

    /// The surface could not hand out a frame image.
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquisitionFailed(#[from] wgpu::SurfaceError),

    /// The device was lost or reported an uncaptured error.
    #[error("device fault: {0}")]
    DeviceFault(String),

    /// `tick` was called before `start`.
    #[error("frame scheduler has not been started")]
    NotStarted,
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
