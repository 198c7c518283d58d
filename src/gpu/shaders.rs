//! Embedded WGSL sources and shader-module creation.
//!
//! Sources are compiled straight from WGSL at pipeline construction; a
//! CPU-side test validates every source through naga so shader breakage is
//! caught without a GPU device.

use std::borrow::Cow;

/// Geometry pass: mesh transform vertex stage + G-buffer fragment stage.
pub const GEOMETRY: &str = include_str!("../../assets/shaders/geometry.wgsl");
/// Direct composite: fullscreen clustered shading to the surface.
pub const DEFERRED_SHADING: &str =
    include_str!("../../assets/shaders/deferred_shading.wgsl");
/// Bloom extraction: fullscreen shading writing lit + bright targets.
pub const BLOOM_EXTRACT: &str =
    include_str!("../../assets/shaders/bloom_extract.wgsl");
/// Separable Gaussian blur with horizontal/vertical entry points.
pub const BLOOM_BLUR: &str =
    include_str!("../../assets/shaders/bloom_blur.wgsl");
/// Additive combine of lit image and blurred bright pass.
pub const BLOOM_COMBINE: &str =
    include_str!("../../assets/shaders/bloom_combine.wgsl");

/// Compile a WGSL source into a shader module.
#[must_use]
pub fn create_shader(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_sources() -> [(&'static str, &'static str); 5] {
        [
            (GEOMETRY, "geometry.wgsl"),
            (DEFERRED_SHADING, "deferred_shading.wgsl"),
            (BLOOM_EXTRACT, "bloom_extract.wgsl"),
            (BLOOM_BLUR, "bloom_blur.wgsl"),
            (BLOOM_COMBINE, "bloom_combine.wgsl"),
        ]
    }

    #[test]
    fn all_shaders_parse_and_validate() {
        for (source, name) in all_sources() {
            let module = naga::front::wgsl::parse_str(source)
                .unwrap_or_else(|e| {
                    panic!("shader '{}' failed to parse: {}", name, e)
                });
            let mut validator = naga::valid::Validator::new(
                naga::valid::ValidationFlags::all(),
                naga::valid::Capabilities::all(),
            );
            validator.validate(&module).unwrap_or_else(|e| {
                panic!("shader '{}' failed to validate: {:?}", name, e)
            });
        }
    }

    #[test]
    fn blur_shader_has_both_direction_entry_points() {
        let module = naga::front::wgsl::parse_str(BLOOM_BLUR).unwrap();
        let names: Vec<&str> = module
            .entry_points
            .iter()
            .map(|ep| ep.name.as_str())
            .collect();
        assert!(names.contains(&"fs_horizontal"));
        assert!(names.contains(&"fs_vertical"));
    }
}
