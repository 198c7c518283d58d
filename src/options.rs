//! Runtime rendering options with TOML preset support.
//!
//! All sub-structs use `#[serde(default)]` so partial TOML files (e.g.
//! only overriding `[bloom]`) work correctly. Apply to a renderer with
//! [`crate::DeferredRenderer::apply_options`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Bloom post-process parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BloomOptions {
    /// Whether the bloom branch runs at all.
    pub enabled: bool,
    /// Blur strength; the iteration count is the ceiling of this value.
    pub strength: f32,
}

impl Default for BloomOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            strength: 1.0,
        }
    }
}

/// Camera projection parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraOptions {
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Options {
    /// Bloom post-process parameters.
    pub bloom: BloomOptions,
    /// Camera projection parameters.
    pub camera: CameraOptions,
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        toml::from_str(&content)
            .map_err(|e| Error::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), Error> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }
        std::fs::write(path, content).map_err(Error::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed: Options = toml::from_str(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r"
[bloom]
enabled = true
strength = 2.5
";
        let opts: Options = toml::from_str(toml_str).unwrap();
        assert!(opts.bloom.enabled);
        assert_eq!(opts.bloom.strength, 2.5);
        // Everything else should be default
        assert_eq!(opts.camera.fovy, 45.0);
        assert_eq!(opts.camera.zfar, 1000.0);
    }

    #[test]
    fn bloom_defaults_match_render_state_defaults() {
        let opts = BloomOptions::default();
        assert!(!opts.enabled);
        assert_eq!(opts.strength, 1.0);
    }
}
