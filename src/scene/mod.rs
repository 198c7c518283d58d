//! Minimal scene container with the node → material → primitive traversal
//! consumed by the geometry pass.
//!
//! The renderer does not walk an asset graph; it asks the scene to
//! [`iterate`](Scene::iterate) its drawables in a fixed nesting order,
//! handing back the model bind group per node, the material bind group per
//! draw, and the indexed vertex data per primitive.

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::gpu::pipeline_helpers::{
    filtering_sampler, texture_2d_filterable, uniform_buffer,
};
use crate::gpu::render_context::RenderContext;

/// Interleaved mesh vertex: position, normal, texture coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
    /// Texture coordinates.
    pub uv: [f32; 2],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
    ];

    /// The vertex buffer layout used by the geometry pipeline.
    #[must_use]
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-node model uniform.
///
/// NOTE: must match the `ModelUniforms` WGSL struct layout exactly.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniform {
    /// Object-to-world transform.
    pub model: [[f32; 4]; 4],
}

/// Bind-group layouts for per-node and per-material resources.
///
/// These sit alongside the renderer's scene layout in the geometry
/// pipeline: group 0 scene, group 1 model, group 2 material.
pub struct SceneLayouts {
    /// Model uniform layout (vertex-visible).
    pub model: wgpu::BindGroupLayout,
    /// Material layout: base-color texture + sampler (fragment-visible).
    pub material: wgpu::BindGroupLayout,
}

impl SceneLayouts {
    /// Create both layouts.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let model =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_buffer(0, wgpu::ShaderStages::VERTEX)],
            });
        let material =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Material Bind Group Layout"),
                entries: &[texture_2d_filterable(0), filtering_sampler(1)],
            });
        Self { model, material }
    }
}

/// Indexed mesh data for one draw call. Indices are 32-bit.
pub struct Primitive {
    /// Interleaved vertex buffer.
    pub vertex_buffer: wgpu::Buffer,
    /// 32-bit index buffer.
    pub index_buffer: wgpu::Buffer,
    /// Number of indices to draw.
    pub index_count: u32,
}

impl Primitive {
    /// Upload vertex and index data.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        label: &str,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Self {
        let vertex_buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertices")),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            },
        );
        let index_buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Indices")),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            },
        );
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// A material: base-color texture + sampler bound as one group.
pub struct Material {
    texture: wgpu::Texture,
    /// The bind group the geometry pass binds at group 2.
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    /// Material from raw RGBA8 pixels.
    #[must_use]
    pub fn from_rgba8(
        context: &RenderContext,
        layouts: &SceneLayouts,
        label: &str,
        pixels: &[u8],
        width: u32,
        height: u32,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = context.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        context.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = context.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group =
            context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &layouts.material,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(&view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });

        Self {
            texture,
            bind_group,
        }
    }

    /// Solid-color material backed by a 1x1 texture.
    #[must_use]
    pub fn from_color(
        context: &RenderContext,
        layouts: &SceneLayouts,
        label: &str,
        rgba: [u8; 4],
    ) -> Self {
        Self::from_rgba8(context, layouts, label, &rgba, 1, 1)
    }

    /// The underlying texture.
    #[must_use]
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }
}

/// One drawable inside a node: a material reference plus a primitive.
pub struct Draw {
    /// Index into [`Scene::materials`].
    pub material: usize,
    /// The mesh data.
    pub primitive: Primitive,
}

/// A scene node: model transform + its drawables.
pub struct Node {
    buffer: wgpu::Buffer,
    /// The bind group the geometry pass binds at group 1.
    pub bind_group: wgpu::BindGroup,
    /// Drawables owned by this node.
    pub draws: Vec<Draw>,
}

impl Node {
    /// Create a node with the given object-to-world transform.
    #[must_use]
    pub fn new(
        context: &RenderContext,
        layouts: &SceneLayouts,
        label: &str,
        transform: Mat4,
    ) -> Self {
        let uniform = ModelUniform {
            model: transform.to_cols_array_2d(),
        };
        let buffer = context.device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            },
        );
        let bind_group =
            context
                .device
                .create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(label),
                    layout: &layouts.model,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
        Self {
            buffer,
            bind_group,
            draws: Vec::new(),
        }
    }

    /// Update the node's object-to-world transform.
    pub fn set_transform(&self, queue: &wgpu::Queue, transform: Mat4) {
        let uniform = ModelUniform {
            model: transform.to_cols_array_2d(),
        };
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[uniform]));
    }
}

/// Drawable container traversed once per geometry pass.
#[derive(Default)]
pub struct Scene {
    /// Materials referenced by index from [`Draw`]s.
    pub materials: Vec<Material>,
    /// Scene nodes in draw order.
    pub nodes: Vec<Node>,
}

impl Scene {
    /// Empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material and return its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a node and return its index.
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Visit every drawable in fixed node → material → primitive nesting
    /// order.
    ///
    /// Draws referencing a missing material are skipped with a warning
    /// rather than aborting the frame.
    pub fn iterate<V: SceneVisitor>(&self, visitor: &mut V) {
        for node in &self.nodes {
            visitor.node(node);
            for draw in &node.draws {
                let Some(material) = self.materials.get(draw.material) else {
                    log::warn!(
                        "draw references missing material {}",
                        draw.material
                    );
                    continue;
                };
                visitor.material(material);
                visitor.primitive(&draw.primitive);
            }
        }
    }
}

/// Visitor invoked by [`Scene::iterate`] in node → material → primitive
/// nesting order.
///
/// One visitor value holds whatever mutable state the traversal needs
/// (typically the active render pass), so the three stages can share it.
pub trait SceneVisitor {
    /// Entering a node: bind its model resources.
    fn node(&mut self, node: &Node);
    /// A draw's material: bind its material resources.
    fn material(&mut self, material: &Material);
    /// A draw's primitive: bind buffers and issue the draw.
    fn primitive(&mut self, primitive: &Primitive);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_struct() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn model_uniform_is_one_mat4() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }
}
