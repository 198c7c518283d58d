//! Standalone demo window backed by winit.
//!
//! Opens a window, builds a small demo scene (a spinning cube over a
//! floor, orbited by bright point lights), and drives the renderer once
//! per frame. Space toggles bloom; Up/Down adjust its strength.
//!
//! ```no_run
//! # use lustre::Viewer;
//! Viewer::builder().with_title("demo").build().run().unwrap();
//! ```

use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Vec3};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::Camera;
use crate::error::Error;
use crate::gpu::render_context::RenderContext;
use crate::lights::GpuLight;
use crate::options::Options;
use crate::renderer::DeferredRenderer;
use crate::scene::{Draw, Material, Node, Primitive, Scene, Vertex};

/// Number of orbiting demo lights.
const DEMO_LIGHT_COUNT: usize = 6;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: "Lustre".into(),
        }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options,
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window running the demo scene.
pub struct Viewer {
    options: Option<Options>,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    pub fn run(self) -> Result<(), Error> {
        let event_loop =
            EventLoop::new().map_err(|e| Error::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            state: None,
            options: self.options.unwrap_or_default(),
            title: self.title,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| Error::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct DemoState {
    renderer: DeferredRenderer,
    scene: Scene,
    camera: Camera,
    /// Index of the spinning cube node.
    cube_node: usize,
    started: Instant,
}

struct ViewerApp {
    window: Option<Arc<Window>>,
    state: Option<DemoState>,
    options: Options,
    title: String,
}

impl ViewerApp {
    fn build_state(&self, window: &Arc<Window>) -> Result<DemoState, Error> {
        let size = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window.clone(),
            (size.width, size.height),
        ))?;
        let mut renderer = DeferredRenderer::new(context);
        renderer.apply_options(&self.options);

        let mut scene = Scene::new();
        let white = scene.add_material(Material::from_color(
            &renderer.context,
            renderer.scene_layouts(),
            "White Material",
            [230, 230, 230, 255],
        ));
        let slate = scene.add_material(Material::from_color(
            &renderer.context,
            renderer.scene_layouts(),
            "Slate Material",
            [90, 100, 110, 255],
        ));

        let mut cube = Node::new(
            &renderer.context,
            renderer.scene_layouts(),
            "Cube Node",
            Mat4::IDENTITY,
        );
        cube.draws.push(Draw {
            material: white,
            primitive: cube_primitive(&renderer.context),
        });
        let cube_node = scene.add_node(cube);

        let mut floor = Node::new(
            &renderer.context,
            renderer.scene_layouts(),
            "Floor Node",
            Mat4::from_translation(Vec3::new(0.0, -1.0, 0.0)),
        );
        floor.draws.push(Draw {
            material: slate,
            primitive: floor_primitive(&renderer.context),
        });
        let _ = scene.add_node(floor);

        let camera = Camera {
            fovy: self.options.camera.fovy,
            znear: self.options.camera.znear,
            zfar: self.options.camera.zfar,
            aspect: size.width.max(1) as f32 / size.height.max(1) as f32,
            ..Camera::default()
        };

        Ok(DemoState {
            renderer,
            scene,
            camera,
            cube_node,
            started: Instant::now(),
        })
    }

    fn render_frame(&mut self, window_size: (u32, u32)) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let t = state.started.elapsed().as_secs_f32();

        // Spin the cube.
        if let Some(node) = state.scene.nodes.get(state.cube_node) {
            node.set_transform(
                &state.renderer.context.queue,
                Mat4::from_rotation_y(t * 0.7),
            );
        }

        // Orbit bright lights around the cube. Colors above 1.0 cross the
        // bloom threshold.
        let lights: Vec<GpuLight> = (0..DEMO_LIGHT_COUNT)
            .map(|i| {
                let phase = t * 0.5
                    + i as f32 * std::f32::consts::TAU / DEMO_LIGHT_COUNT as f32;
                let position =
                    Vec3::new(phase.cos() * 3.0, 1.5, phase.sin() * 3.0);
                let hue = i as f32 / DEMO_LIGHT_COUNT as f32;
                let color = Vec3::new(
                    2.0 + (hue * std::f32::consts::TAU).cos(),
                    2.0,
                    2.0 + (hue * std::f32::consts::TAU).sin(),
                );
                GpuLight::new(position, color)
            })
            .collect();
        state.renderer.update_lights(&lights);
        state.renderer.upload_unculled_clusters();

        state.camera.aspect =
            window_size.0.max(1) as f32 / window_size.1.max(1) as f32;
        state.renderer.update_camera(&state.camera);

        match state.renderer.draw(&state.scene) {
            Ok(()) => {}
            Err(Error::Surface(
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
            )) => {
                state.renderer.resize(window_size.0, window_size.1);
            }
            Err(e) => log::error!("render error: {e}"),
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes().with_title(&self.title);
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.build_state(&window) {
            Ok(state) => {
                window.request_redraw();
                self.window = Some(window);
                self.state = Some(state);
            }
            Err(e) => {
                log::error!("renderer startup failed: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(state) = self.state.as_mut() {
                    state.renderer.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                let size = self
                    .window
                    .as_ref()
                    .map_or((1, 1), |w| {
                        let s = w.inner_size();
                        (s.width, s.height)
                    });
                self.render_frame(size);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(state) = self.state.as_mut() else {
                    return;
                };
                match event.physical_key {
                    PhysicalKey::Code(KeyCode::Space) => {
                        let enabled = !state.renderer.bloom_enabled();
                        state.renderer.set_bloom_enabled(enabled);
                        log::info!("bloom {}", if enabled { "on" } else { "off" });
                    }
                    PhysicalKey::Code(KeyCode::ArrowUp) => {
                        let strength = state.renderer.bloom_strength() + 0.5;
                        state.renderer.set_bloom_strength(strength);
                        log::info!("bloom strength {strength}");
                    }
                    PhysicalKey::Code(KeyCode::ArrowDown) => {
                        let strength = state.renderer.bloom_strength() - 0.5;
                        state.renderer.set_bloom_strength(strength);
                        log::info!(
                            "bloom strength {}",
                            state.renderer.bloom_strength()
                        );
                    }
                    _ => {}
                }
            }

            _ => {}
        }
    }
}

// ── Demo geometry ────────────────────────────────────────────────────────

fn quad(
    vertices: &mut Vec<Vertex>,
    indices: &mut Vec<u32>,
    corners: [Vec3; 4],
    normal: Vec3,
) {
    let base = vertices.len() as u32;
    let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    for (corner, uv) in corners.iter().zip(uvs) {
        vertices.push(Vertex {
            position: corner.to_array(),
            normal: normal.to_array(),
            uv,
        });
    }
    indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
}

/// Unit cube centered at the origin.
fn cube_primitive(context: &RenderContext) -> Primitive {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    let h = 0.5;

    // +X, -X, +Y, -Y, +Z, -Z faces.
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(h, h, h),
            Vec3::new(h, -h, h),
        ],
        Vec3::X,
    );
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-h, -h, h),
            Vec3::new(-h, h, h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, -h),
        ],
        -Vec3::X,
    );
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-h, h, -h),
            Vec3::new(-h, h, h),
            Vec3::new(h, h, h),
            Vec3::new(h, h, -h),
        ],
        Vec3::Y,
    );
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-h, -h, h),
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, -h, h),
        ],
        -Vec3::Y,
    );
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ],
        Vec3::Z,
    );
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(h, -h, -h),
            Vec3::new(-h, -h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(h, h, -h),
        ],
        -Vec3::Z,
    );

    Primitive::new(context, "Cube", &vertices, &indices)
}

/// Flat 10x10 floor quad facing up.
fn floor_primitive(context: &RenderContext) -> Primitive {
    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    let s = 5.0;
    quad(
        &mut vertices,
        &mut indices,
        [
            Vec3::new(-s, 0.0, s),
            Vec3::new(s, 0.0, s),
            Vec3::new(s, 0.0, -s),
            Vec3::new(-s, 0.0, -s),
        ],
        Vec3::Y,
    );
    Primitive::new(context, "Floor", &vertices, &indices)
}
