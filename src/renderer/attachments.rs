//! Off-screen attachment store.
//!
//! Owns every intermediate image the frame pipeline renders through: the
//! geometry depth buffer, the three G-buffer channels, the bloom
//! accumulation image, and the two ping-pong blur images. All of them are
//! allocated at the current output resolution; when that resolution
//! changes the whole store is rebuilt (and dependent bind groups with it).

/// Format of every deferred/bloom color intermediate.
pub const GBUFFER_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Format of the geometry pass depth buffer.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24Plus;

/// An off-screen image plus its default view.
pub struct Attachment {
    /// The owned texture.
    pub texture: wgpu::Texture,
    /// Read-only default view over the whole texture.
    pub view: wgpu::TextureView,
}

impl Attachment {
    fn new(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { texture, view }
    }
}

/// All off-screen attachments for one output resolution.
pub struct FrameAttachments {
    /// Geometry pass depth buffer.
    pub depth: Attachment,
    /// G-buffer: world-space position.
    pub position: Attachment,
    /// G-buffer: world-space normal.
    pub normal: Attachment,
    /// G-buffer: albedo.
    pub albedo: Attachment,
    /// Undecorated lit image written by the bloom extraction pass.
    pub accumulation: Attachment,
    /// Blur image 1: extraction bright target, vertical blur destination,
    /// and the converged blur result read by the combine pass.
    pub blur1: Attachment,
    /// Blur image 2: horizontal blur destination.
    pub blur2: Attachment,
    width: u32,
    height: u32,
}

impl FrameAttachments {
    /// Allocate every attachment at the given output resolution
    /// (clamped to at least 1x1).
    #[must_use]
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);

        let sampled = wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING;

        let color = |label| {
            Attachment::new(device, label, width, height, GBUFFER_FORMAT, sampled)
        };

        Self {
            depth: Attachment::new(
                device,
                "Depth Attachment",
                width,
                height,
                DEPTH_FORMAT,
                wgpu::TextureUsages::RENDER_ATTACHMENT,
            ),
            position: color("G-Buffer Position"),
            normal: color("G-Buffer Normal"),
            albedo: color("G-Buffer Albedo"),
            accumulation: color("Bloom Accumulation"),
            blur1: color("Bloom Blur 1"),
            blur2: color("Bloom Blur 2"),
            width,
            height,
        }
    }

    /// Width every attachment was allocated at.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height every attachment was allocated at.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
}
