//! Scene graph: camera, area lights, a shared sphere geometry instanced on a
//! grid, fog, and the post-process chain.
//!
//! # Invariants
//! - Geometry and materials are stored once; instances refer to them by handle.
//! - Renderers read the scene, never write it.
//! - A scene built from config has passed [`SceneConfig::validate`].

mod camera;
mod config;
mod geometry;
mod light;
mod renderer;
mod scene;

pub use camera::PerspectiveCamera;
pub use config::{
    AnimationConfig, BloomSettings, CameraConfig, ConfigError, FogConfig, GridConfig,
    LightConfig, MaterialConfig, RendererConfig, SceneConfig,
};
pub use geometry::{MeshData, SphereGeometry, StandardMaterial};
pub use light::AreaLight;
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{Fog, MaterialHandle, MeshHandle, MeshInstance, PostPass, Scene, grid_positions};

pub fn crate_info() -> &'static str {
    "glowgrid-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
