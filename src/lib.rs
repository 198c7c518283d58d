//! Clustered-deferred 3D rendering core with bloom post-processing, built
//! on wgpu.
//!
//! Lustre renders a scene in two stages: a geometry pass fills a G-buffer
//! (world position, normal, albedo), then a fullscreen shading pass
//! evaluates clustered lighting against a precomputed light-cluster buffer.
//! An optional bloom branch replaces the direct composite with a bright-pass
//! extraction, a ping-pong separable Gaussian blur loop, and an additive
//! combine.
//!
//! # Key entry points
//!
//! - [`renderer::DeferredRenderer`] — the per-frame orchestrator
//! - [`scene::Scene`] — drawable container with node → material → primitive
//!   traversal
//! - [`options::Options`] — runtime configuration (bloom, camera)
//!
//! # Architecture
//!
//! All GPU work is issued from a single thread to a single queue; each
//! render pass is submitted as its own command buffer, and the queue's
//! in-order execution is the only synchronization the ping-pong blur loop
//! relies on. Intermediate attachments always match the output resolution;
//! [`renderer::DeferredRenderer::resize`] rebuilds them and every dependent
//! bind group atomically.

pub mod camera;
pub mod error;
pub mod gpu;
pub mod lights;
pub mod options;
pub mod renderer;
pub mod scene;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use error::Error;
pub use renderer::DeferredRenderer;
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
