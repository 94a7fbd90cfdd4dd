//! Render configuration.

/// Environment variable a native host can use to name the surface format, e.g. `bgra8unorm`.
pub const ENV_SURFACE_FORMAT: &str = "ROTATE_Y_SURFACE_FORMAT";

/// Settings for the spinning rectangle and the surface it is drawn into.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Rectangle extent along x, in clip-space units.
    pub rectangle_width: f32,

    /// Rectangle extent along y, in clip-space units.
    pub rectangle_height: f32,

    /// Rotation about the y axis added after every frame, in degrees.
    pub angle_step: f32,

    /// Background the render pass clears to.
    pub clear_color: wgpu::Color,

    /// WebGPU name of the colour format to render into. `None` uses the surface's own preference.
    pub surface_format: Option<String>,

    /// Number of uniform buffers cycled between frames.
    pub uniform_slots: usize,

    pub window_title: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            rectangle_width: 0.64,
            rectangle_height: 0.36,
            angle_step: 1.0,
            clear_color: wgpu::Color {
                r: 0.5,
                g: 0.5,
                b: 0.5,
                a: 1.0,
            },
            surface_format: None,
            uniform_slots: 3,
            window_title: "Rotate Y".to_string(),
        }
    }
}

impl RenderConfig {
    /// Defaults, with the surface format taken from [`ENV_SURFACE_FORMAT`] when it is set.
    pub fn from_env() -> Self {
        Self::default().with_surface_format(env_override(ENV_SURFACE_FORMAT))
    }

    /// Replaces the preferred surface format. Blank names count as no preference.
    pub fn with_surface_format(mut self, name: Option<String>) -> Self {
        self.surface_format = name.filter(|name| !name.trim().is_empty());
        self
    }
}

fn env_override(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.rectangle_width, 0.64);
        assert_eq!(config.rectangle_height, 0.36);
        assert_eq!(config.angle_step, 1.0);
        assert_eq!(config.clear_color.r, 0.5);
        assert_eq!(config.clear_color.a, 1.0);
        assert_eq!(config.surface_format, None);
        assert_eq!(config.uniform_slots, 3);
    }

    #[test]
    fn test_surface_format_override() {
        let config = RenderConfig::default().with_surface_format(Some("rgba8unorm".into()));
        assert_eq!(config.surface_format.as_deref(), Some("rgba8unorm"));

        let config = config.with_surface_format(Some("  ".into()));
        assert_eq!(config.surface_format, None);
    }
}
