//! Light-set and cluster-set GPU buffers consumed by the shading passes.
//!
//! The light set is a storage buffer holding a count header plus a runtime
//! array of point lights. The cluster set is a storage buffer of fixed-size
//! per-cluster records mapping view-frustum cells to the lights affecting
//! them; its contents are produced by an external clustering pass — this
//! module only owns the allocation and the upload path.

use glam::Vec3;

use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;

/// Capacity of each cluster's light index list.
///
/// NOTE: must match `MAX_LIGHTS_PER_CLUSTER` in the WGSL sources. The value
/// makes each cluster record exactly 512 bytes.
pub const MAX_LIGHTS_PER_CLUSTER: u32 = 127;

/// Initial light-set capacity in lights.
const INITIAL_LIGHT_CAPACITY: usize = 1024;

/// A point light as laid out in the light-set storage buffer.
///
/// NOTE: must match the `Light` WGSL struct layout exactly (32 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GpuLight {
    /// World-space position.
    pub position: [f32; 3],
    /// Padding for GPU alignment.
    pub _pad0: f32,
    /// Linear RGB color/intensity. Values above 1.0 cross the bloom
    /// threshold.
    pub color: [f32; 3],
    /// Padding for GPU alignment.
    pub _pad1: f32,
}

impl GpuLight {
    /// Build a light from position and color vectors.
    #[must_use]
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position: position.to_array(),
            _pad0: 0.0,
            color: color.to_array(),
            _pad1: 0.0,
        }
    }
}

/// Byte offset of the runtime light array inside the light-set buffer.
///
/// The WGSL struct is `{ count: u32, lights: array<Light> }`; the runtime
/// array is 16-byte aligned, so the header occupies 16 bytes.
const LIGHT_SET_HEADER_BYTES: usize = 16;

/// The light-set storage buffer: count header + light array.
///
/// Bound read-only at scene slot 1. Content is refreshed per frame by the
/// caller; a write that grows the buffer invalidates the scene bind group
/// (the renderer rebuilds it when [`write`](Self::write) reports
/// reallocation).
pub struct LightSet {
    buffer: DynamicBuffer,
    count: u32,
}

impl LightSet {
    /// Allocate the buffer with its initial capacity.
    #[must_use]
    pub fn new(context: &RenderContext) -> Self {
        let capacity = LIGHT_SET_HEADER_BYTES
            + std::mem::size_of::<GpuLight>() * INITIAL_LIGHT_CAPACITY;
        let buffer = DynamicBuffer::new(
            &context.device,
            "Light Set Buffer",
            capacity,
            wgpu::BufferUsages::STORAGE,
        );
        Self { buffer, count: 0 }
    }

    /// Upload a new set of lights.
    ///
    /// Returns `true` if the buffer was reallocated, in which case the
    /// scene bind group must be rebuilt before the next draw.
    pub fn write(
        &mut self,
        context: &RenderContext,
        lights: &[GpuLight],
    ) -> bool {
        self.count = lights.len() as u32;

        let mut bytes = Vec::with_capacity(
            LIGHT_SET_HEADER_BYTES
                + std::mem::size_of_val(lights),
        );
        bytes.extend_from_slice(bytemuck::bytes_of(&[self.count, 0, 0, 0]));
        bytes.extend_from_slice(bytemuck::cast_slice(lights));

        self.buffer
            .write_bytes(&context.device, &context.queue, &bytes)
    }

    /// Number of lights currently uploaded.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// The underlying storage buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        self.buffer.buffer()
    }
}

/// Dimensions of the view-frustum cluster grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterGrid {
    /// Cluster counts along screen x, screen y, and depth.
    pub dims: [u32; 3],
}

impl ClusterGrid {
    /// Default grid: 16 x 9 screen tiles, 24 logarithmic depth slices.
    pub const DEFAULT_DIMS: [u32; 3] = [16, 9, 24];

    /// Total number of clusters.
    #[must_use]
    pub fn cluster_count(&self) -> u32 {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Byte size of one cluster record: a count word plus the index list.
    #[must_use]
    pub fn cluster_stride() -> usize {
        std::mem::size_of::<u32>() * (1 + MAX_LIGHTS_PER_CLUSTER as usize)
    }

    /// Total byte size of the cluster-set buffer.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        Self::cluster_stride() * self.cluster_count() as usize
    }
}

impl Default for ClusterGrid {
    fn default() -> Self {
        Self {
            dims: Self::DEFAULT_DIMS,
        }
    }
}

/// The cluster-set storage buffer, bound read-only at scene slot 2.
///
/// Allocated once at fixed capacity; never resized within a session.
pub struct ClusterSet {
    grid: ClusterGrid,
    buffer: wgpu::Buffer,
}

impl ClusterSet {
    /// Allocate the buffer for the given grid.
    #[must_use]
    pub fn new(context: &RenderContext, grid: ClusterGrid) -> Self {
        let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Cluster Set Buffer"),
            size: grid.buffer_size() as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Self { grid, buffer }
    }

    /// The grid this buffer was allocated for.
    #[must_use]
    pub fn grid(&self) -> &ClusterGrid {
        &self.grid
    }

    /// The underlying storage buffer.
    #[must_use]
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Upload raw cluster records produced by an external clustering pass.
    ///
    /// `data` must be at most the allocated buffer size and laid out as
    /// `cluster_count` records of [`ClusterGrid::cluster_stride`] bytes.
    pub fn write_raw(&self, context: &RenderContext, data: &[u8]) {
        debug_assert!(data.len() <= self.grid.buffer_size());
        context.queue.write_buffer(&self.buffer, 0, data);
    }

    /// Fill every cluster with the identity light list `0..light_count`.
    ///
    /// Placeholder upload for hosts without a clustering pass: correct but
    /// unculled, so every pixel iterates every light. `light_count` is
    /// clamped to [`MAX_LIGHTS_PER_CLUSTER`].
    pub fn write_unculled(&self, context: &RenderContext, light_count: u32) {
        let count = if light_count > MAX_LIGHTS_PER_CLUSTER {
            log::warn!(
                "unculled cluster upload truncated to {} of {} lights",
                MAX_LIGHTS_PER_CLUSTER,
                light_count
            );
            MAX_LIGHTS_PER_CLUSTER
        } else {
            light_count
        };

        let words_per_cluster = 1 + MAX_LIGHTS_PER_CLUSTER as usize;
        let mut record = vec![0u32; words_per_cluster];
        record[0] = count;
        for i in 0..count as usize {
            record[1 + i] = i as u32;
        }

        let mut data =
            Vec::with_capacity(words_per_cluster * self.grid.cluster_count() as usize);
        for _ in 0..self.grid.cluster_count() {
            data.extend_from_slice(&record);
        }
        context
            .queue
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(&data));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpu_light_size_matches_wgsl_layout() {
        // Light in WGSL is two vec3f slots, 16-byte aligned each.
        assert_eq!(std::mem::size_of::<GpuLight>(), 32);
    }

    #[test]
    fn cluster_record_is_512_bytes() {
        assert_eq!(ClusterGrid::cluster_stride(), 512);
    }

    #[test]
    fn default_grid_buffer_size() {
        let grid = ClusterGrid::default();
        assert_eq!(grid.cluster_count(), 16 * 9 * 24);
        assert_eq!(
            grid.buffer_size(),
            512 * (16 * 9 * 24) as usize
        );
    }

    #[test]
    fn light_set_header_precedes_aligned_array() {
        // The runtime array<Light> is 16-byte aligned in WGSL, so the
        // count header occupies one full 16-byte slot.
        assert_eq!(LIGHT_SET_HEADER_BYTES, 16);
        assert_eq!(LIGHT_SET_HEADER_BYTES % 16, 0);
    }
}
