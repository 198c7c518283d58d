//! The per-frame orchestrator.
//!
//! [`DeferredRenderer::draw`] sequences the fixed pass graph: a geometry
//! pass fills the G-buffer, then either a direct composite or the bloom
//! branch (extraction → ping-pong blur loop → combine) writes the surface.
//! Every pass is submitted as its own command buffer; the single queue's
//! in-order execution is the only synchronization between them, including
//! between the two sub-passes of each blur iteration.

use crate::camera::{Camera, CameraState};
use crate::error::Error;
use crate::gpu::render_context::RenderContext;
use crate::lights::{ClusterGrid, ClusterSet, GpuLight, LightSet};
use crate::options::Options;
use crate::renderer::attachments::FrameAttachments;
use crate::renderer::bindings::{FrameBindings, SceneBuffers};
use crate::renderer::pipelines::PipelineSet;
use crate::scene::{Material, Node, Primitive, Scene, SceneLayouts, SceneVisitor};

/// The closed set of pass sequences a frame can take, selected once at the
/// start of [`DeferredRenderer::draw`] from the render state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    /// Geometry → direct composite.
    Direct,
    /// Geometry → extraction → blur loop → combine.
    Bloom {
        /// Number of blur iterations; each runs two ordered sub-passes.
        blur_iterations: u32,
    },
}

impl FramePlan {
    /// Select the branch for this frame.
    #[must_use]
    pub fn select(bloom_enabled: bool, bloom_strength: f32) -> Self {
        if bloom_enabled {
            Self::Bloom {
                blur_iterations: Self::blur_iterations(bloom_strength),
            }
        } else {
            Self::Direct
        }
    }

    /// Blur iteration count for a strength value: the number of times an
    /// integer counter stays strictly below it. Fractional strengths round
    /// up, integral strengths are exact, zero (or anything clamped to it)
    /// yields an unblurred bright pass.
    #[must_use]
    pub fn blur_iterations(strength: f32) -> u32 {
        if strength <= 0.0 {
            0
        } else {
            strength.ceil() as u32
        }
    }

    /// Total command buffers submitted for this plan.
    #[must_use]
    pub fn submission_count(self) -> u32 {
        match self {
            Self::Direct => 2,
            Self::Bloom { blur_iterations } => 3 + 2 * blur_iterations,
        }
    }
}

/// Binds each drawable's resources into the active geometry render pass.
struct GeometryVisitor<'a, 'b> {
    pass: &'a mut wgpu::RenderPass<'b>,
}

impl SceneVisitor for GeometryVisitor<'_, '_> {
    fn node(&mut self, node: &Node) {
        self.pass.set_bind_group(1, &node.bind_group, &[]);
    }

    fn material(&mut self, material: &Material) {
        self.pass.set_bind_group(2, &material.bind_group, &[]);
    }

    fn primitive(&mut self, primitive: &Primitive) {
        self.pass
            .set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
        self.pass.set_index_buffer(
            primitive.index_buffer.slice(..),
            wgpu::IndexFormat::Uint32,
        );
        self.pass.draw_indexed(0..primitive.index_count, 0, 0..1);
    }
}

fn clear_attachment(
    view: &wgpu::TextureView,
) -> Option<wgpu::RenderPassColorAttachment<'_>> {
    Some(wgpu::RenderPassColorAttachment {
        view,
        resolve_target: None,
        ops: wgpu::Operations {
            load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
            store: wgpu::StoreOp::Store,
        },
        depth_slice: None,
    })
}

/// The clustered-deferred renderer: owns the attachment store, binding
/// topology, pipeline set, and scene buffers, and sequences them into
/// frames.
pub struct DeferredRenderer {
    /// GPU context. Public so hosts can reach the device/queue for their
    /// own uploads.
    pub context: RenderContext,
    camera: CameraState,
    lights: LightSet,
    clusters: ClusterSet,
    scene_layouts: SceneLayouts,
    attachments: FrameAttachments,
    bindings: FrameBindings,
    pipelines: PipelineSet,
    bloom_enabled: bool,
    bloom_strength: f32,
}

impl DeferredRenderer {
    /// Build the renderer: scene buffers, attachments, bindings, and all
    /// six pipelines, eagerly.
    ///
    /// Configuration the GPU rejects (format/layout combinations) surfaces
    /// as a wgpu validation error here and aborts startup; there is no
    /// partially usable renderer.
    #[must_use]
    pub fn new(context: RenderContext) -> Self {
        let camera = CameraState::new(&context.device);
        let lights = LightSet::new(&context);
        let clusters = ClusterSet::new(&context, ClusterGrid::default());
        let scene_layouts = SceneLayouts::new(&context.device);

        let attachments = FrameAttachments::new(
            &context.device,
            context.width(),
            context.height(),
        );
        let bindings = FrameBindings::new(
            &context.device,
            &attachments,
            &SceneBuffers {
                camera: &camera.buffer,
                lights: lights.buffer(),
                clusters: clusters.buffer(),
            },
        );
        let pipelines = PipelineSet::new(
            &context.device,
            context.format(),
            &bindings,
            &scene_layouts,
        );

        log::info!(
            "deferred renderer ready: {}x{}, surface {:?}",
            attachments.width(),
            attachments.height(),
            context.format()
        );

        Self {
            context,
            camera,
            lights,
            clusters,
            scene_layouts,
            attachments,
            bindings,
            pipelines,
            bloom_enabled: false,
            bloom_strength: 1.0,
        }
    }

    /// Layouts for creating scene nodes and materials.
    #[must_use]
    pub fn scene_layouts(&self) -> &SceneLayouts {
        &self.scene_layouts
    }

    /// The cluster grid the cluster buffer was allocated for.
    #[must_use]
    pub fn cluster_grid(&self) -> &ClusterGrid {
        self.clusters.grid()
    }

    /// Whether the bloom branch runs on the next frame.
    #[must_use]
    pub fn bloom_enabled(&self) -> bool {
        self.bloom_enabled
    }

    /// Current bloom strength.
    #[must_use]
    pub fn bloom_strength(&self) -> f32 {
        self.bloom_strength
    }

    /// Enable or disable the bloom branch.
    pub fn set_bloom_enabled(&mut self, enabled: bool) {
        self.bloom_enabled = enabled;
    }

    /// Set the bloom strength. Negative values clamp to zero (zero blur
    /// iterations: the bright pass reaches the combine unblurred).
    pub fn set_bloom_strength(&mut self, strength: f32) {
        if strength < 0.0 {
            log::warn!("bloom strength {strength} clamped to 0");
        }
        self.bloom_strength = strength.max(0.0);
    }

    /// Apply TOML-backed options to the render state.
    pub fn apply_options(&mut self, options: &Options) {
        self.set_bloom_enabled(options.bloom.enabled);
        self.set_bloom_strength(options.bloom.strength);
    }

    /// Refresh the camera uniform from the given camera and push it to the
    /// GPU. Call once per frame before [`draw`](Self::draw).
    pub fn update_camera(&mut self, camera: &Camera) {
        self.camera.uniform.update(
            camera,
            (self.context.width(), self.context.height()),
            self.clusters.grid(),
        );
        self.camera.update_gpu(&self.context.queue);
    }

    /// Upload the frame's light set.
    ///
    /// If the upload grows the light buffer, every scene bind group built
    /// against the old buffer is stale; they are rebuilt here before the
    /// next pass can see them.
    pub fn update_lights(&mut self, lights: &[GpuLight]) {
        if self.lights.write(&self.context, lights) {
            self.rebuild_bindings();
        }
    }

    /// Upload raw cluster records produced by an external clustering pass.
    pub fn upload_clusters(&self, data: &[u8]) {
        self.clusters.write_raw(&self.context, data);
    }

    /// Fill the cluster buffer with the unculled identity mapping
    /// (placeholder for hosts without a clustering pass).
    pub fn upload_unculled_clusters(&self) {
        self.clusters
            .write_unculled(&self.context, self.lights.count());
    }

    /// Rebuild the attachment store and every dependent bind group for a
    /// new output resolution. Pipelines are resolution-independent and
    /// survive.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.attachments = FrameAttachments::new(
            &self.context.device,
            self.context.width(),
            self.context.height(),
        );
        self.rebuild_bindings();
    }

    fn rebuild_bindings(&mut self) {
        self.bindings.rebuild(
            &self.context.device,
            &self.attachments,
            &SceneBuffers {
                camera: &self.camera.buffer,
                lights: self.lights.buffer(),
                clusters: self.clusters.buffer(),
            },
        );
    }

    /// Render one frame.
    ///
    /// Runs the geometry pass, then exactly one of the direct composite or
    /// the bloom branch, selected by the bloom flag read once at entry.
    /// Each pass submits its own command buffer; the call returns once all
    /// commands are enqueued, without waiting for GPU completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Surface`] if the presentable image cannot be
    /// acquired. GPU faults after submission surface through wgpu's device
    /// error machinery; no pass is retried.
    pub fn draw(&mut self, scene: &Scene) -> Result<(), Error> {
        let plan = FramePlan::select(self.bloom_enabled, self.bloom_strength);

        self.run_geometry_pass(scene);

        match plan {
            FramePlan::Direct => {
                let frame = self.context.acquire_frame()?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.run_direct_pass(&view);
                frame.present();
            }
            FramePlan::Bloom { blur_iterations } => {
                self.run_extraction_pass();
                self.run_blur_loop(blur_iterations);
                let frame = self.context.acquire_frame()?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.run_combine_pass(&view);
                frame.present();
            }
        }
        Ok(())
    }

    /// Geometry pass: clear the G-buffer and depth, then draw every scene
    /// primitive in traversal order. One submission.
    fn run_geometry_pass(&self, scene: &Scene) {
        let mut encoder = self.context.create_encoder("Geometry Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Geometry Pass"),
                    color_attachments: &[
                        clear_attachment(&self.attachments.position.view),
                        clear_attachment(&self.attachments.normal.view),
                        clear_attachment(&self.attachments.albedo.view),
                    ],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.attachments.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Store,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    ..Default::default()
                });
            pass.set_pipeline(&self.pipelines.geometry);
            pass.set_bind_group(0, &self.bindings.scene, &[]);
            scene.iterate(&mut GeometryVisitor { pass: &mut pass });
        }
        self.context.submit(encoder);
    }

    /// Direct composite: fullscreen clustered shading straight to the
    /// surface. One submission.
    fn run_direct_pass(&self, target: &wgpu::TextureView) {
        let mut encoder = self.context.create_encoder("Direct Composite Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Direct Composite Pass"),
                    color_attachments: &[clear_attachment(target)],
                    depth_stencil_attachment: None,
                    ..Default::default()
                });
            pass.set_pipeline(&self.pipelines.direct_composite);
            pass.set_bind_group(0, &self.bindings.scene, &[]);
            pass.set_bind_group(1, &self.bindings.gbuffer, &[]);
            pass.draw(0..3, 0..1);
        }
        self.context.submit(encoder);
    }

    /// Bloom extraction: one fullscreen draw writes the lit image and the
    /// bright pass simultaneously. One submission.
    fn run_extraction_pass(&self) {
        let mut encoder = self.context.create_encoder("Bloom Extraction Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Bloom Extraction Pass"),
                    color_attachments: &[
                        clear_attachment(&self.attachments.accumulation.view),
                        clear_attachment(&self.attachments.blur1.view),
                    ],
                    depth_stencil_attachment: None,
                    ..Default::default()
                });
            pass.set_pipeline(&self.pipelines.bloom_extraction);
            pass.set_bind_group(0, &self.bindings.scene, &[]);
            pass.set_bind_group(1, &self.bindings.gbuffer, &[]);
            pass.draw(0..3, 0..1);
        }
        self.context.submit(encoder);
    }

    /// Ping-pong blur loop: each iteration blurs blur 1 → blur 2
    /// horizontally, then blur 2 → blur 1 vertically, as two ordered
    /// submissions. No fences — the queue executes submissions in order,
    /// which is the only guarantee the read-after-write chain needs. The
    /// converged result always ends in blur 1 because every iteration's
    /// final sub-pass writes there.
    fn run_blur_loop(&self, iterations: u32) {
        for _ in 0..iterations {
            let mut encoder =
                self.context.create_encoder("Blur Horizontal Encoder");
            {
                let mut pass =
                    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Blur Horizontal Pass"),
                        color_attachments: &[clear_attachment(
                            &self.attachments.blur2.view,
                        )],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });
                pass.set_pipeline(&self.pipelines.blur_horizontal);
                pass.set_bind_group(0, &self.bindings.blur_horizontal, &[]);
                pass.draw(0..3, 0..1);
            }
            self.context.submit(encoder);

            let mut encoder =
                self.context.create_encoder("Blur Vertical Encoder");
            {
                let mut pass =
                    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("Blur Vertical Pass"),
                        color_attachments: &[clear_attachment(
                            &self.attachments.blur1.view,
                        )],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    });
                pass.set_pipeline(&self.pipelines.blur_vertical);
                pass.set_bind_group(0, &self.bindings.blur_vertical, &[]);
                pass.draw(0..3, 0..1);
            }
            self.context.submit(encoder);
        }
    }

    /// Bloom combine: additively composite accumulation + blurred bright
    /// pass onto the surface. One submission.
    fn run_combine_pass(&self, target: &wgpu::TextureView) {
        let mut encoder = self.context.create_encoder("Bloom Combine Encoder");
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Bloom Combine Pass"),
                    color_attachments: &[clear_attachment(target)],
                    depth_stencil_attachment: None,
                    ..Default::default()
                });
            pass.set_pipeline(&self.pipelines.bloom_combine);
            pass.set_bind_group(0, &self.bindings.bloom, &[]);
            pass.draw(0..3, 0..1);
        }
        self.context.submit(encoder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_iterations_from_strength() {
        assert_eq!(FramePlan::blur_iterations(0.0), 0);
        assert_eq!(FramePlan::blur_iterations(1.0), 1);
        assert_eq!(FramePlan::blur_iterations(2.0), 2);
        assert_eq!(FramePlan::blur_iterations(2.5), 3);
        assert_eq!(FramePlan::blur_iterations(0.1), 1);
        assert_eq!(FramePlan::blur_iterations(-3.0), 0);
    }

    #[test]
    fn branch_selection_is_exclusive() {
        assert_eq!(FramePlan::select(false, 5.0), FramePlan::Direct);
        assert_eq!(
            FramePlan::select(true, 2.5),
            FramePlan::Bloom { blur_iterations: 3 }
        );
        // Strength is irrelevant when bloom is off.
        assert_eq!(FramePlan::select(false, 0.0), FramePlan::Direct);
    }

    #[test]
    fn submission_counts() {
        assert_eq!(FramePlan::Direct.submission_count(), 2);
        assert_eq!(
            FramePlan::Bloom { blur_iterations: 0 }.submission_count(),
            3
        );
        assert_eq!(
            FramePlan::Bloom { blur_iterations: 3 }.submission_count(),
            9
        );
    }

    #[test]
    fn zero_strength_bloom_still_takes_bloom_branch() {
        // The bright pass reaches the combine unblurred.
        assert_eq!(
            FramePlan::select(true, 0.0),
            FramePlan::Bloom { blur_iterations: 0 }
        );
    }
}
