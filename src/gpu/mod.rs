//! GPU plumbing: device/queue/surface context, bind-layout helpers, shader
//! module creation, and grow-on-write buffers.

pub mod dynamic_buffer;
pub mod pipeline_helpers;
pub mod render_context;
pub mod shaders;

pub use render_context::{RenderContext, RenderContextError};
