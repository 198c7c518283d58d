//! Perspective camera and its GPU uniform state.

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::lights::ClusterGrid;

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 8.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

impl Camera {
    /// Build the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Build the combined view-projection matrix.
    ///
    /// `perspective_rh` already uses the [0, 1] depth range (wgpu/Vulkan
    /// convention).
    #[must_use]
    pub fn view_proj_matrix(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        );
        proj * self.view_matrix()
    }
}

/// GPU uniform holding camera matrices plus the screen and cluster-grid
/// metadata the clustered shading passes need.
///
/// NOTE: must match the `CameraUniforms` WGSL struct layout exactly
/// (176 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix.
    pub view_proj: [[f32; 4]; 4],
    /// View matrix (for view-space depth in the cluster lookup).
    pub view: [[f32; 4]; 4],
    /// Camera world-space position.
    pub position: [f32; 3],
    /// Near clipping plane distance.
    pub znear: f32,
    /// Output dimensions in pixels.
    pub screen_size: [f32; 2],
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Padding for GPU alignment.
    pub _pad: f32,
    /// Cluster grid dimensions (x, y, depth slices).
    pub cluster_dims: [u32; 3],
    /// Capacity of each cluster's light index list.
    pub max_lights_per_cluster: u32,
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            view: Mat4::IDENTITY.to_cols_array_2d(),
            position: [0.0; 3],
            znear: 0.1,
            screen_size: [1.0, 1.0],
            zfar: 1000.0,
            _pad: 0.0,
            cluster_dims: ClusterGrid::DEFAULT_DIMS,
            max_lights_per_cluster: crate::lights::MAX_LIGHTS_PER_CLUSTER,
        }
    }
}

impl CameraUniform {
    /// Refresh matrices and metadata from the given camera state.
    pub fn update(
        &mut self,
        camera: &Camera,
        screen_size: (u32, u32),
        grid: &ClusterGrid,
    ) {
        self.view_proj = camera.view_proj_matrix().to_cols_array_2d();
        self.view = camera.view_matrix().to_cols_array_2d();
        self.position = camera.eye.to_array();
        self.znear = camera.znear;
        self.zfar = camera.zfar;
        self.screen_size = [screen_size.0 as f32, screen_size.1 as f32];
        self.cluster_dims = grid.dims;
        self.max_lights_per_cluster = crate::lights::MAX_LIGHTS_PER_CLUSTER;
    }
}

/// Camera uniform buffer: CPU-side state plus its GPU buffer.
///
/// Created once at renderer construction; content refreshed per frame.
pub struct CameraState {
    /// CPU copy of the uniform contents.
    pub uniform: CameraUniform,
    /// The GPU uniform buffer bound at scene slot 0.
    pub buffer: wgpu::Buffer,
}

impl CameraState {
    /// Allocate the uniform buffer with default contents.
    #[must_use]
    pub fn new(device: &wgpu::Device) -> Self {
        let uniform = CameraUniform::default();
        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Uniform Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });
        Self { uniform, buffer }
    }

    /// Push the CPU-side uniform contents to the GPU.
    pub fn update_gpu(&self, queue: &wgpu::Queue) {
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_size_matches_wgsl_layout() {
        // CameraUniforms in the WGSL sources is 176 bytes.
        assert_eq!(std::mem::size_of::<CameraUniform>(), 176);
    }

    #[test]
    fn view_proj_maps_target_to_center() {
        let camera = Camera::default();
        let clip = camera.view_proj_matrix()
            * camera.target.extend(1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }
}
