use glam::Vec3;
use glowgrid_common::Color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or validating a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(String),
    #[error("invalid config: {0}")]
    Validation(String),
}

/// Upper bound on spheres in the grid.
const MAX_GRID_INSTANCES: u64 = 1 << 20;

/// Complete scene description. Every field defaults to the stock scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub fog: FogConfig,
    pub rect_light: LightConfig,
    pub mouse_light: LightConfig,
    pub grid: GridConfig,
    pub material: MaterialConfig,
    pub bloom: BloomSettings,
    pub animation: AnimationConfig,
    pub renderer: RendererConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let navy = Color::from_u32(0x1a237e);
        Self {
            camera: CameraConfig::default(),
            fog: FogConfig::default(),
            rect_light: LightConfig {
                color: navy,
                intensity: 1.0,
                width: 30.0,
                height: 30.0,
                position: Vec3::new(0.0, 0.0, -1.0),
                yaw_degrees: 180.0,
            },
            mouse_light: LightConfig {
                color: navy,
                intensity: 6.0,
                width: 5.0,
                height: 5.0,
                position: Vec3::new(0.0, 0.0, -1.0),
                yaw_degrees: 180.0,
            },
            grid: GridConfig::default(),
            material: MaterialConfig::default(),
            bloom: BloomSettings::default(),
            animation: AnimationConfig::default(),
            renderer: RendererConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fixed camera distance along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 200.0,
            distance: 30.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FogConfig {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            near: 30.0,
            far: 40.0,
        }
    }
}

/// A rectangular area light. All fields are required when a light is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightConfig {
    pub color: Color,
    pub intensity: f32,
    pub width: f32,
    pub height: f32,
    pub position: Vec3,
    pub yaw_degrees: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Spheres are placed at `i, j` in `-half_extent..=half_extent`.
    pub half_extent: i32,
    pub spacing: f32,
    pub sphere_radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            half_extent: 10,
            spacing: 4.0,
            sphere_radius: 2.0,
            width_segments: 32,
            height_segments: 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MaterialConfig {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            color: Color::from_u32(0x1a237e),
            roughness: 1.0,
            metalness: 0.0,
        }
    }
}

/// Bloom post-process parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BloomSettings {
    pub strength: f32,
    /// Blend between tight (0) and wide (1) mip weighting.
    pub radius: f32,
    /// Luminance below which pixels do not bloom.
    pub threshold: f32,
}

impl Default for BloomSettings {
    fn default() -> Self {
        Self {
            strength: 1.5,
            radius: 0.0,
            threshold: 0.0,
        }
    }
}

/// Per-frame animation constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Area light growth in units per second, before saturation.
    pub growth_rate: f32,
    pub intensity_amplitude: f32,
    pub intensity_floor: f32,
    /// Client pixels per unit of mouse offset.
    pub pointer_divisor: f32,
    /// Mouse light travel per unit of mouse offset.
    pub mouse_light_gain: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            growth_rate: 2.0,
            intensity_amplitude: 2.0,
            intensity_floor: 0.8,
            pointer_divisor: 100.0,
            mouse_light_gain: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RendererConfig {
    pub max_pixel_ratio: f32,
    /// 4 for anti-aliased output, 1 to disable MSAA.
    pub msaa_samples: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            max_pixel_ratio: 2.0,
            msaa_samples: 4,
        }
    }
}

impl SceneConfig {
    /// Load a config from a `.yaml`, `.yml` or `.json` file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let config: Self = match ext.as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&text)?,
            "json" => serde_json::from_str(&text)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        tracing::debug!("loaded scene config from {}", path.display());
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check numeric ranges the scene and renderer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ensure_finite()?;

        let c = &self.camera;
        ensure(c.fov_degrees > 0.0 && c.fov_degrees < 180.0, "camera.fov_degrees must be in (0, 180)")?;
        ensure(c.near > 0.0 && c.far > c.near, "camera requires 0 < near < far")?;
        ensure(c.distance > 0.0, "camera.distance must be positive")?;
        ensure(self.fog.near >= 0.0 && self.fog.far > self.fog.near, "fog requires 0 <= near < far")?;

        for (name, light) in [("rect_light", &self.rect_light), ("mouse_light", &self.mouse_light)] {
            if light.intensity < 0.0 || light.width < 0.0 || light.height < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "{name} intensity and size must be non-negative"
                )));
            }
        }

        let g = &self.grid;
        ensure(g.half_extent >= 0, "grid.half_extent must be non-negative")?;
        let side = 2 * g.half_extent as u64 + 1;
        ensure(
            side * side <= MAX_GRID_INSTANCES,
            "grid.half_extent exceeds the instance limit",
        )?;
        ensure(g.spacing > 0.0, "grid.spacing must be positive")?;
        ensure(g.sphere_radius > 0.0, "grid.sphere_radius must be positive")?;
        ensure(
            g.width_segments >= 3 && g.height_segments >= 2,
            "sphere needs at least 3 width and 2 height segments",
        )?;
        let vertices = (g.width_segments as u64 + 1) * (g.height_segments as u64 + 1);
        ensure(vertices <= u16::MAX as u64 + 1, "sphere segments exceed 16-bit index range")?;

        let m = &self.material;
        ensure((0.0..=1.0).contains(&m.roughness), "material.roughness must be in [0, 1]")?;
        ensure((0.0..=1.0).contains(&m.metalness), "material.metalness must be in [0, 1]")?;

        let b = &self.bloom;
        ensure(b.strength >= 0.0, "bloom.strength must be non-negative")?;
        ensure((0.0..=1.0).contains(&b.radius), "bloom.radius must be in [0, 1]")?;
        ensure(b.threshold >= 0.0, "bloom.threshold must be non-negative")?;

        let a = &self.animation;
        ensure(a.pointer_divisor.abs() > 0.0, "animation.pointer_divisor must be non-zero")?;
        ensure(a.growth_rate >= 0.0, "animation.growth_rate must be non-negative")?;

        let r = &self.renderer;
        ensure(r.max_pixel_ratio > 0.0, "renderer.max_pixel_ratio must be positive")?;
        ensure(matches!(r.msaa_samples, 1 | 4), "renderer.msaa_samples must be 1 or 4")?;
        Ok(())
    }

    /// Reject NaN and infinities, which YAML accepts as `.nan` / `.inf`.
    fn ensure_finite(&self) -> Result<(), ConfigError> {
        let c = &self.camera;
        let g = &self.grid;
        let m = &self.material;
        let b = &self.bloom;
        let a = &self.animation;
        let fields = [
            ("camera.fov_degrees", c.fov_degrees),
            ("camera.near", c.near),
            ("camera.far", c.far),
            ("camera.distance", c.distance),
            ("fog.near", self.fog.near),
            ("fog.far", self.fog.far),
            ("grid.spacing", g.spacing),
            ("grid.sphere_radius", g.sphere_radius),
            ("material.roughness", m.roughness),
            ("material.metalness", m.metalness),
            ("bloom.strength", b.strength),
            ("bloom.radius", b.radius),
            ("bloom.threshold", b.threshold),
            ("animation.growth_rate", a.growth_rate),
            ("animation.intensity_amplitude", a.intensity_amplitude),
            ("animation.intensity_floor", a.intensity_floor),
            ("animation.pointer_divisor", a.pointer_divisor),
            ("animation.mouse_light_gain", a.mouse_light_gain),
            ("renderer.max_pixel_ratio", self.renderer.max_pixel_ratio),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Validation(format!("{name} must be finite")));
        }

        for (name, light) in [("rect_light", &self.rect_light), ("mouse_light", &self.mouse_light)] {
            let finite = [light.intensity, light.width, light.height, light.yaw_degrees]
                .iter()
                .all(|v| v.is_finite())
                && light.position.is_finite();
            if !finite {
                return Err(ConfigError::Validation(format!("{name} values must be finite")));
            }
        }
        Ok(())
    }
}

fn ensure(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = SceneConfig::default();
        config.validate().unwrap();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.rect_light.intensity, 1.0);
        assert_eq!(config.mouse_light.intensity, 6.0);
        assert_eq!(config.bloom.strength, 1.5);
        assert_eq!(config.renderer.max_pixel_ratio, 2.0);
    }

    #[test]
    fn yaml_defaults_round_trip() {
        let config = SceneConfig::default();
        let yaml = config.to_yaml().unwrap();
        let file = write_temp(".yaml", &yaml);
        let loaded = SceneConfig::load(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let file = write_temp(".json", r##"{ "bloom": { "strength": 0.5 }, "fog": { "color": "#101010" } }"##);
        let loaded = SceneConfig::load(file.path()).unwrap();
        assert_eq!(loaded.bloom.strength, 0.5);
        assert_eq!(loaded.bloom.radius, 0.0);
        assert_eq!(loaded.fog.color.to_u32(), 0x101010);
        assert_eq!(loaded.fog.near, 30.0);
        assert_eq!(loaded.grid, GridConfig::default());
    }

    #[test]
    fn rejects_unknown_extension() {
        let file = write_temp(".toml", "");
        assert!(matches!(
            SceneConfig::load(file.path()),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn rejects_unknown_fields() {
        let file = write_temp(".yaml", "grid:\n  spokes: 3\n");
        assert!(matches!(SceneConfig::load(file.path()), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = SceneConfig::default();
        config.grid.spacing = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SceneConfig::default();
        config.fog.far = 10.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.renderer.msaa_samples = 2;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.grid.width_segments = 300;
        config.grid.height_segments = 300;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.mouse_light.width = -1.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.camera.distance = 0.0;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.grid.half_extent = 1 << 20;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.grid.half_extent = 511;
        config.validate().unwrap();

        let mut config = SceneConfig::default();
        config.material.metalness = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut config = SceneConfig::default();
        config.animation.pointer_divisor = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = SceneConfig::default();
        config.grid.spacing = f32::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.animation.mouse_light_gain = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = SceneConfig::default();
        config.rect_light.position = Vec3::new(0.0, f32::NAN, -1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn invalid_file_values_fail_validation() {
        let file = write_temp(".yml", "bloom:\n  radius: 2.0\n");
        assert!(matches!(
            SceneConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));

        let file = write_temp(".yaml", "animation:\n  pointer_divisor: .nan\n");
        assert!(matches!(
            SceneConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));

        let file = write_temp(".yaml", "camera:\n  distance: .inf\n");
        assert!(matches!(
            SceneConfig::load(file.path()),
            Err(ConfigError::Validation(_))
        ));
    }
}
