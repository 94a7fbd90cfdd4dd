//! Colour target format resolution.
//!
//! Hosts name the format they want to render into with its WebGPU spelling (`bgra8unorm`,
//! `rgba8unorm-srgb`, ...). These helpers turn such a name into a [`wgpu::TextureFormat`] and make
//! sure it can actually back the pipeline's colour target. A format that fails any of the checks is
//! reported as [`RenderError::UnsupportedFormat`]; no other format is ever picked in its place.

use crate::error::{RenderError, RenderResult};

const FORMAT_NAMES: &[(&str, wgpu::TextureFormat)] = &[
    ("r8unorm", wgpu::TextureFormat::R8Unorm),
    ("r8snorm", wgpu::TextureFormat::R8Snorm),
    ("r8uint", wgpu::TextureFormat::R8Uint),
    ("r8sint", wgpu::TextureFormat::R8Sint),
    ("r16uint", wgpu::TextureFormat::R16Uint),
    ("r16sint", wgpu::TextureFormat::R16Sint),
    ("r16float", wgpu::TextureFormat::R16Float),
    ("rg8unorm", wgpu::TextureFormat::Rg8Unorm),
    ("rg8snorm", wgpu::TextureFormat::Rg8Snorm),
    ("rg8uint", wgpu::TextureFormat::Rg8Uint),
    ("rg8sint", wgpu::TextureFormat::Rg8Sint),
    ("r32uint", wgpu::TextureFormat::R32Uint),
    ("r32sint", wgpu::TextureFormat::R32Sint),
    ("r32float", wgpu::TextureFormat::R32Float),
    ("rg16uint", wgpu::TextureFormat::Rg16Uint),
    ("rg16sint", wgpu::TextureFormat::Rg16Sint),
    ("rg16float", wgpu::TextureFormat::Rg16Float),
    ("rgba8unorm", wgpu::TextureFormat::Rgba8Unorm),
    ("rgba8unorm-srgb", wgpu::TextureFormat::Rgba8UnormSrgb),
    ("rgba8snorm", wgpu::TextureFormat::Rgba8Snorm),
    ("rgba8uint", wgpu::TextureFormat::Rgba8Uint),
    ("rgba8sint", wgpu::TextureFormat::Rgba8Sint),
    ("bgra8unorm", wgpu::TextureFormat::Bgra8Unorm),
    ("bgra8unorm-srgb", wgpu::TextureFormat::Bgra8UnormSrgb),
    ("rgb10a2uint", wgpu::TextureFormat::Rgb10a2Uint),
    ("rgb10a2unorm", wgpu::TextureFormat::Rgb10a2Unorm),
    ("rg11b10ufloat", wgpu::TextureFormat::Rg11b10Ufloat),
    ("rgb9e5ufloat", wgpu::TextureFormat::Rgb9e5Ufloat),
    ("rg32uint", wgpu::TextureFormat::Rg32Uint),
    ("rg32sint", wgpu::TextureFormat::Rg32Sint),
    ("rg32float", wgpu::TextureFormat::Rg32Float),
    ("rgba16uint", wgpu::TextureFormat::Rgba16Uint),
    ("rgba16sint", wgpu::TextureFormat::Rgba16Sint),
    ("rgba16float", wgpu::TextureFormat::Rgba16Float),
    ("rgba32uint", wgpu::TextureFormat::Rgba32Uint),
    ("rgba32sint", wgpu::TextureFormat::Rgba32Sint),
    ("rgba32float", wgpu::TextureFormat::Rgba32Float),
    ("stencil8", wgpu::TextureFormat::Stencil8),
    ("depth16unorm", wgpu::TextureFormat::Depth16Unorm),
    ("depth24plus", wgpu::TextureFormat::Depth24Plus),
    ("depth24plus-stencil8", wgpu::TextureFormat::Depth24PlusStencil8),
    ("depth32float", wgpu::TextureFormat::Depth32Float),
    ("depth32float-stencil8", wgpu::TextureFormat::Depth32FloatStencil8),
];

/// Looks up a texture format by its WebGPU name. Matching ignores case and surrounding whitespace.
pub fn parse_color_format(name: &str) -> RenderResult<wgpu::TextureFormat> {
    let wanted = name.trim().to_ascii_lowercase();
    FORMAT_NAMES
        .iter()
        .find(|(known, _)| *known == wanted)
        .map(|(_, format)| *format)
        .ok_or_else(|| RenderError::UnsupportedFormat(name.to_string()))
}

/// The WebGPU name of `format`, if it is one of the formats [`parse_color_format`] knows.
pub fn format_name(format: wgpu::TextureFormat) -> Option<&'static str> {
    FORMAT_NAMES
        .iter()
        .find(|(_, known)| *known == format)
        .map(|(name, _)| *name)
}

/// Fails unless `format` can be used as a colour render attachment with the given device features.
///
/// Depth and stencil formats are rejected even though they are renderable, since the pipeline has
/// a single colour output and no depth attachment.
pub fn check_color_target(
    format: wgpu::TextureFormat,
    features: wgpu::Features,
) -> RenderResult<()> {
    let renderable = format
        .guaranteed_format_features(features)
        .allowed_usages
        .contains(wgpu::TextureUsages::RENDER_ATTACHMENT);

    if format.is_depth_stencil_format() || !renderable {
        return Err(RenderError::UnsupportedFormat(describe(format)));
    }
    Ok(())
}

/// Picks the colour target format for a surface.
///
/// `supported` is the surface's format list in order of preference. Without a `preferred` name the
/// first entry wins. With one, the named format must parse, pass [`check_color_target`] and appear
/// in `supported`, otherwise the call fails.
pub fn resolve_target_format(
    preferred: Option<&str>,
    supported: &[wgpu::TextureFormat],
    features: wgpu::Features,
) -> RenderResult<wgpu::TextureFormat> {
    let Some(name) = preferred else {
        let native = supported
            .first()
            .copied()
            .ok_or_else(|| RenderError::UnsupportedFormat("<none offered by surface>".into()))?;
        check_color_target(native, features)?;
        return Ok(native);
    };

    let format = parse_color_format(name)?;
    check_color_target(format, features)?;
    if !supported.contains(&format) {
        log::error!(
            "Surface does not support `{name}`, supported formats: {:?}",
            supported
        );
        return Err(RenderError::UnsupportedFormat(name.to_string()));
    }
    Ok(format)
}

fn describe(format: wgpu::TextureFormat) -> String {
    format_name(format)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{format:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SURFACE: [wgpu::TextureFormat; 2] = [
        wgpu::TextureFormat::Bgra8UnormSrgb,
        wgpu::TextureFormat::Bgra8Unorm,
    ];

    #[test]
    fn test_parse_known_names() {
        assert_eq!(
            parse_color_format("bgra8unorm").unwrap(),
            wgpu::TextureFormat::Bgra8Unorm
        );
        assert_eq!(
            parse_color_format(" RGBA8Unorm-SRGB ").unwrap(),
            wgpu::TextureFormat::Rgba8UnormSrgb
        );
        assert_eq!(format_name(wgpu::TextureFormat::Rgba16Float), Some("rgba16float"));
    }

    #[test]
    fn test_packed_format_names() {
        assert_eq!(
            parse_color_format("rgb10a2uint").unwrap(),
            wgpu::TextureFormat::Rgb10a2Uint
        );
        assert_eq!(
            parse_color_format("rg11b10ufloat").unwrap(),
            wgpu::TextureFormat::Rg11b10Ufloat
        );
        assert!(check_color_target(wgpu::TextureFormat::Rgb10a2Uint, wgpu::Features::empty()).is_ok());
        // Only renderable where the device enables it.
        assert!(check_color_target(wgpu::TextureFormat::Rg11b10Ufloat, wgpu::Features::empty()).is_err());
        assert!(check_color_target(
            wgpu::TextureFormat::Rg11b10Ufloat,
            wgpu::Features::RG11B10UFLOAT_RENDERABLE
        )
        .is_ok());
    }

    #[test]
    fn test_every_name_maps_back_to_itself() {
        for (name, format) in FORMAT_NAMES {
            assert_eq!(parse_color_format(name).unwrap(), *format);
            assert_eq!(format_name(*format), Some(*name));
        }
    }

    #[test]
    fn test_parse_unknown_name() {
        match parse_color_format("rgb565") {
            Err(RenderError::UnsupportedFormat(name)) => assert_eq!(name, "rgb565"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_color_targets() {
        let features = wgpu::Features::empty();
        assert!(check_color_target(wgpu::TextureFormat::Rgba8Unorm, features).is_ok());
        assert!(check_color_target(wgpu::TextureFormat::Bgra8Unorm, features).is_ok());
        assert!(check_color_target(wgpu::TextureFormat::Depth32Float, features).is_err());
        assert!(check_color_target(wgpu::TextureFormat::Depth24PlusStencil8, features).is_err());
        assert!(check_color_target(wgpu::TextureFormat::Bc1RgbaUnorm, features).is_err());
    }

    #[test]
    fn test_resolve_without_preference_takes_native() {
        let format = resolve_target_format(None, &SURFACE, wgpu::Features::empty()).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(resolve_target_format(None, &[], wgpu::Features::empty()).is_err());
    }

    #[test]
    fn test_resolve_supported_preference() {
        let format =
            resolve_target_format(Some("bgra8unorm"), &SURFACE, wgpu::Features::empty()).unwrap();
        assert_eq!(format, wgpu::TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn test_resolve_never_substitutes() {
        let features = wgpu::Features::empty();
        // Renderable, but not offered by this surface.
        assert!(matches!(
            resolve_target_format(Some("rgba8unorm"), &SURFACE, features),
            Err(RenderError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            resolve_target_format(Some("depth32float"), &SURFACE, features),
            Err(RenderError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            resolve_target_format(Some("not-a-format"), &SURFACE, features),
            Err(RenderError::UnsupportedFormat(_))
        ));
    }
}
