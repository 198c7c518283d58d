//! The six render pipelines of the frame graph.
//!
//! All pipelines are compiled eagerly at renderer construction — the bloom
//! branch can be toggled between frames, so both branches must be ready.
//! Each pipeline is an immutable (shader stages, binding layouts, color
//! targets) triple; an unsupported combination is a wgpu validation error
//! and fatal to startup.

use crate::gpu::pipeline_helpers::create_fullscreen_pipeline;
use crate::gpu::shaders;
use crate::renderer::attachments::{DEPTH_FORMAT, GBUFFER_FORMAT};
use crate::renderer::bindings::FrameBindings;
use crate::scene::{SceneLayouts, Vertex};

fn color_target(format: wgpu::TextureFormat) -> Option<wgpu::ColorTargetState> {
    Some(wgpu::ColorTargetState {
        format,
        blend: None,
        write_mask: wgpu::ColorWrites::ALL,
    })
}

/// The six compiled pipelines.
pub struct PipelineSet {
    /// Mesh → G-buffer, depth write, less-than test.
    pub geometry: wgpu::RenderPipeline,
    /// Fullscreen clustered shading → surface.
    pub direct_composite: wgpu::RenderPipeline,
    /// Fullscreen shading → accumulation + bright pass.
    pub bloom_extraction: wgpu::RenderPipeline,
    /// Horizontal blur: blur 1 → blur 2.
    pub blur_horizontal: wgpu::RenderPipeline,
    /// Vertical blur: blur 2 → blur 1.
    pub blur_vertical: wgpu::RenderPipeline,
    /// Additive combine → surface.
    pub bloom_combine: wgpu::RenderPipeline,
}

impl PipelineSet {
    /// Compile all six pipelines.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        bindings: &FrameBindings,
        scene_layouts: &SceneLayouts,
    ) -> Self {
        let geometry = Self::create_geometry_pipeline(
            device,
            bindings,
            scene_layouts,
        );

        let shading_shader = shaders::create_shader(
            device,
            "Deferred Shading Shader",
            shaders::DEFERRED_SHADING,
        );
        let direct_composite = create_fullscreen_pipeline(
            device,
            "Direct Composite",
            &shading_shader,
            "fs_main",
            &[color_target(surface_format)],
            &[&bindings.scene_layout, &bindings.gbuffer_layout],
        );

        let extract_shader = shaders::create_shader(
            device,
            "Bloom Extract Shader",
            shaders::BLOOM_EXTRACT,
        );
        let bloom_extraction = create_fullscreen_pipeline(
            device,
            "Bloom Extraction",
            &extract_shader,
            "fs_main",
            &[color_target(GBUFFER_FORMAT), color_target(GBUFFER_FORMAT)],
            &[&bindings.scene_layout, &bindings.gbuffer_layout],
        );

        let blur_shader = shaders::create_shader(
            device,
            "Bloom Blur Shader",
            shaders::BLOOM_BLUR,
        );
        let blur_horizontal = create_fullscreen_pipeline(
            device,
            "Blur Horizontal",
            &blur_shader,
            "fs_horizontal",
            &[color_target(GBUFFER_FORMAT)],
            &[&bindings.blur_layout],
        );
        let blur_vertical = create_fullscreen_pipeline(
            device,
            "Blur Vertical",
            &blur_shader,
            "fs_vertical",
            &[color_target(GBUFFER_FORMAT)],
            &[&bindings.blur_layout],
        );

        let combine_shader = shaders::create_shader(
            device,
            "Bloom Combine Shader",
            shaders::BLOOM_COMBINE,
        );
        let bloom_combine = create_fullscreen_pipeline(
            device,
            "Bloom Combine",
            &combine_shader,
            "fs_main",
            &[color_target(surface_format)],
            &[&bindings.bloom_layout],
        );

        Self {
            geometry,
            direct_composite,
            bloom_extraction,
            blur_horizontal,
            blur_vertical,
            bloom_combine,
        }
    }

    fn create_geometry_pipeline(
        device: &wgpu::Device,
        bindings: &FrameBindings,
        scene_layouts: &SceneLayouts,
    ) -> wgpu::RenderPipeline {
        let shader = shaders::create_shader(
            device,
            "Geometry Shader",
            shaders::GEOMETRY,
        );
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Geometry Pipeline Layout"),
                bind_group_layouts: &[
                    Some(&bindings.scene_layout),
                    Some(&scene_layouts.model),
                    Some(&scene_layouts.material),
                ],
                immediate_size: 0,
            });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Geometry Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[
                    color_target(GBUFFER_FORMAT),
                    color_target(GBUFFER_FORMAT),
                    color_target(GBUFFER_FORMAT),
                ],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: Some(true),
                depth_compare: Some(wgpu::CompareFunction::Less),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}
