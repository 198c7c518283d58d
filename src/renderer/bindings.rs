//! Binding topology: the four bind-group-layout shapes shared across the
//! frame pipeline, and their concrete instances against the attachment
//! store and scene buffers.
//!
//! Every bind group here points at a specific texture view or buffer; when
//! an attachment is reallocated (resize) or a scene buffer grows, the
//! affected groups must be rebuilt via [`FrameBindings::rebuild`].

use crate::gpu::pipeline_helpers::{
    storage_buffer_read_only, texture_2d, texture_entry, uniform_buffer,
};
use crate::renderer::attachments::FrameAttachments;

/// Scene buffers the bindings are built against.
pub struct SceneBuffers<'a> {
    /// Camera uniform buffer (slot 0).
    pub camera: &'a wgpu::Buffer,
    /// Light-set storage buffer (slot 1).
    pub lights: &'a wgpu::Buffer,
    /// Cluster-set storage buffer (slot 2).
    pub clusters: &'a wgpu::Buffer,
}

/// Bind-group layouts and their instances for one attachment generation.
pub struct FrameBindings {
    /// Scene shape: camera uniform + light set + cluster set.
    pub scene_layout: wgpu::BindGroupLayout,
    /// G-buffer read shape: position/normal/albedo images.
    pub gbuffer_layout: wgpu::BindGroupLayout,
    /// Bloom read shape: accumulation + blur image.
    pub bloom_layout: wgpu::BindGroupLayout,
    /// Single-image blur shape.
    pub blur_layout: wgpu::BindGroupLayout,

    /// Scene bindings instance.
    pub scene: wgpu::BindGroup,
    /// G-buffer read instance.
    pub gbuffer: wgpu::BindGroup,
    /// Bloom read instance (accumulation + blur 1).
    pub bloom: wgpu::BindGroup,
    /// Horizontal blur input (reads blur 1).
    pub blur_horizontal: wgpu::BindGroup,
    /// Vertical blur input (reads blur 2).
    pub blur_vertical: wgpu::BindGroup,
}

impl FrameBindings {
    /// Create the four layouts and build their instances.
    #[must_use]
    pub fn new(
        device: &wgpu::Device,
        attachments: &FrameAttachments,
        buffers: &SceneBuffers<'_>,
    ) -> Self {
        let scene_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Scene Bind Group Layout"),
                entries: &[
                    // Camera visible to both stages; the geometry vertex
                    // stage transforms with it, every fragment stage reads
                    // the cluster metadata.
                    uniform_buffer(
                        0,
                        wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ),
                    storage_buffer_read_only(1),
                    storage_buffer_read_only(2),
                ],
            });
        let gbuffer_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("G-Buffer Bind Group Layout"),
                entries: &[texture_2d(0), texture_2d(1), texture_2d(2)],
            });
        let bloom_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Bloom Bind Group Layout"),
                entries: &[texture_2d(0), texture_2d(1)],
            });
        let blur_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Blur Bind Group Layout"),
                entries: &[texture_2d(0)],
            });

        let (scene, gbuffer, bloom, blur_horizontal, blur_vertical) =
            Self::create_groups(
                device,
                &scene_layout,
                &gbuffer_layout,
                &bloom_layout,
                &blur_layout,
                attachments,
                buffers,
            );

        Self {
            scene_layout,
            gbuffer_layout,
            bloom_layout,
            blur_layout,
            scene,
            gbuffer,
            bloom,
            blur_horizontal,
            blur_vertical,
        }
    }

    /// Rebuild every bind-group instance against the current attachments
    /// and buffers. Layouts are immutable and survive.
    ///
    /// Called after attachment reallocation (resize) and after a scene
    /// buffer grows.
    pub fn rebuild(
        &mut self,
        device: &wgpu::Device,
        attachments: &FrameAttachments,
        buffers: &SceneBuffers<'_>,
    ) {
        let (scene, gbuffer, bloom, blur_horizontal, blur_vertical) =
            Self::create_groups(
                device,
                &self.scene_layout,
                &self.gbuffer_layout,
                &self.bloom_layout,
                &self.blur_layout,
                attachments,
                buffers,
            );
        self.scene = scene;
        self.gbuffer = gbuffer;
        self.bloom = bloom;
        self.blur_horizontal = blur_horizontal;
        self.blur_vertical = blur_vertical;
    }

    fn create_groups(
        device: &wgpu::Device,
        scene_layout: &wgpu::BindGroupLayout,
        gbuffer_layout: &wgpu::BindGroupLayout,
        bloom_layout: &wgpu::BindGroupLayout,
        blur_layout: &wgpu::BindGroupLayout,
        attachments: &FrameAttachments,
        buffers: &SceneBuffers<'_>,
    ) -> (
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
        wgpu::BindGroup,
    ) {
        let scene = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: scene_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffers.camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: buffers.lights.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: buffers.clusters.as_entire_binding(),
                },
            ],
        });

        let gbuffer = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("G-Buffer Bind Group"),
            layout: gbuffer_layout,
            entries: &[
                texture_entry(0, &attachments.position.view),
                texture_entry(1, &attachments.normal.view),
                texture_entry(2, &attachments.albedo.view),
            ],
        });

        let bloom = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Bloom Bind Group"),
            layout: bloom_layout,
            entries: &[
                texture_entry(0, &attachments.accumulation.view),
                texture_entry(1, &attachments.blur1.view),
            ],
        });

        let blur_horizontal =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blur Horizontal Bind Group"),
                layout: blur_layout,
                entries: &[texture_entry(0, &attachments.blur1.view)],
            });

        let blur_vertical =
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Blur Vertical Bind Group"),
                layout: blur_layout,
                entries: &[texture_entry(0, &attachments.blur2.view)],
            });

        (scene, gbuffer, bloom, blur_horizontal, blur_vertical)
    }
}
