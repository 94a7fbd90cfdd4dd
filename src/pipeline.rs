//! # Pipeline Module
//!
//! Builds the one render pipeline the application uses, from the vertex and fragment programs in
//! [`VERTEX_SHADER_SOURCE`] and [`FRAGMENT_SHADER_SOURCE`].
//!
//! The pipeline has no explicit layout. wgpu derives it from the vertex program's
//! `@group(0) @binding(0)` uniform, and [`PipelineManager::uniform_layout`] hands the derived group-0
//! layout to whoever creates the matching bind groups.
//!
//! Shader and pipeline creation run inside validation error scopes, so invalid WGSL or an unusable
//! colour target comes back as an error instead of reaching the device's uncaptured-error handler.

use std::borrow::Cow;

use crate::error::{RenderError, RenderResult};
use crate::format::check_color_target;
use crate::gpu::Gpu;
use crate::vertex::Vertex;
use crate::{FRAGMENT_SHADER_SOURCE, VERTEX_SHADER_SOURCE};

/// Owns the immutable render pipeline and the bind group layout derived from it.
pub struct PipelineManager {
    pipeline: wgpu::RenderPipeline,
    uniform_layout: wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
}

impl PipelineManager {
    /// Builds the pipeline for colour targets of `target_format`.
    pub async fn new(gpu: &Gpu, target_format: wgpu::TextureFormat) -> RenderResult<Self> {
        Self::with_sources(gpu, target_format, VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE).await
    }

    /// Builds the pipeline from the given WGSL programs. Both use `main` as their entry point.
    ///
    /// # Errors
    /// - [`RenderError::UnsupportedFormat`] if `target_format` cannot be a colour attachment.
    /// - [`RenderError::ShaderCompilationFailed`] if either program fails validation.
    /// - [`RenderError::PipelineCreationFailed`] if the stages, vertex layout and target do not fit.
    pub async fn with_sources(
        gpu: &Gpu,
        target_format: wgpu::TextureFormat,
        vertex_source: &str,
        fragment_source: &str,
    ) -> RenderResult<Self> {
        check_color_target(target_format, gpu.device.features())?;

        let device = &gpu.device;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(vertex_source)),
        });
        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(fragment_source)),
        });
        if let Some(error) = device.pop_error_scope().await {
            log::error!("Shader compilation failed: {error}");
            return Err(RenderError::ShaderCompilationFailed(error.to_string()));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline =
            Self::create_pipeline(device, &vertex_module, &fragment_module, target_format);
        let uniform_layout = pipeline.get_bind_group_layout(0);
        if let Some(error) = device.pop_error_scope().await {
            log::error!("Pipeline creation failed: {error}");
            return Err(RenderError::PipelineCreationFailed(error.to_string()));
        }

        log::info!("Render pipeline built for {target_format:?}");
        Ok(Self {
            pipeline,
            uniform_layout,
            target_format,
        })
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// The group-0 layout wgpu derived from the vertex program's uniform declaration.
    pub fn uniform_layout(&self) -> &wgpu::BindGroupLayout {
        &self.uniform_layout
    }

    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.target_format
    }

    fn create_pipeline(
        device: &wgpu::Device,
        vertex_module: &wgpu::ShaderModule,
        fragment_module: &wgpu::ShaderModule,
        target_format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Rectangle Pipeline"),
            layout: None, // Derived from the shaders' resource declarations.
            vertex: wgpu::VertexState {
                module: vertex_module,
                entry_point: Some("main"),
                buffers: &[Vertex::description()], // One Float32x3 position per 12-byte vertex.
                compilation_options: Default::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList, // Every 3 vertices form a triangle.
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw, // The rectangle's triangles wind clockwise.
                cull_mode: None, // Both faces stay visible while the rectangle turns.
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
                unclipped_depth: false,
            },
            depth_stencil: None, // No depth testing.
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment_module,
                entry_point: Some("main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: Some(wgpu::BlendState::REPLACE), // Opaque output.
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            multiview: None,
            cache: None,
        })
    }
}
