use crate::scene::{PostPass, Scene};
use std::fmt::Write;

/// Renderer-agnostic interface.
///
/// A renderer reads the scene and produces output. It never mutates the
/// scene; the animator owns all per-frame writes.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given scene.
    fn render(&self, scene: &Scene) -> Self::Output;
}

/// Human-readable dump of the scene graph.
///
/// Used by the CLI and in tests where no GPU is available.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    list_meshes: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also print one line per mesh instance.
    pub fn with_meshes(mut self, list_meshes: bool) -> Self {
        self.list_meshes = list_meshes;
        self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene) -> String {
        let mut out = String::new();
        let cam = &scene.camera;
        let _ = writeln!(
            out,
            "=== Scene (meshes={}, geometries={}, materials={}) ===",
            scene.meshes().len(),
            scene.geometries().len(),
            scene.materials().len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.3}",
            cam.position.x,
            cam.position.y,
            cam.position.z,
            cam.target.x,
            cam.target.y,
            cam.target.z,
            cam.fov_degrees,
            cam.aspect
        );
        let _ = writeln!(
            out,
            "Fog: color={} near={:.1} far={:.1}",
            scene.fog.color, scene.fog.near, scene.fog.far
        );
        for (name, light) in [("rect_light", &scene.rect_light), ("mouse_light", &scene.mouse_light)] {
            let p = light.position();
            let _ = writeln!(
                out,
                "{name}: color={} intensity={:.2} size={:.2}x{:.2} area={:.2} pos=({:.2}, {:.2}, {:.2})",
                light.color,
                light.intensity,
                light.width,
                light.height,
                light.area(),
                p.x,
                p.y,
                p.z
            );
        }
        for (i, geometry) in scene.geometries().iter().enumerate() {
            let _ = writeln!(
                out,
                "geometry[{i}]: sphere r={:.2} segments={}x{}",
                geometry.radius, geometry.width_segments, geometry.height_segments
            );
        }
        for (i, material) in scene.materials().iter().enumerate() {
            let _ = writeln!(
                out,
                "material[{i}]: standard color={} roughness={:.2} metalness={:.2}",
                material.color, material.roughness, material.metalness
            );
        }
        let passes: Vec<String> = scene
            .passes()
            .iter()
            .map(|pass| match pass {
                PostPass::Render => "render".to_string(),
                PostPass::Bloom(b) => format!(
                    "bloom(strength={:.2}, radius={:.2}, threshold={:.2})",
                    b.strength, b.radius, b.threshold
                ),
            })
            .collect();
        let _ = writeln!(out, "Passes: {}", passes.join(" -> "));

        if self.list_meshes {
            for mesh in scene.meshes() {
                let p = mesh.transform.position;
                let _ = writeln!(
                    out,
                    "  mesh={} material={} pos=({:.1}, {:.1}, {:.1})",
                    mesh.mesh.0, mesh.material.0, p.x, p.y, p.z
                );
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;

    fn scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), 1.0).unwrap()
    }

    #[test]
    fn summary_lists_scene_parts() {
        let output = DebugTextRenderer::new().render(&scene());
        assert!(output.contains("meshes=441"));
        assert!(output.contains("geometries=1"));
        assert!(output.contains("rect_light: color=#1a237e"));
        assert!(output.contains("mouse_light: color=#1a237e intensity=6.00"));
        assert!(output.contains("size=30.00x30.00 area=900.00"));
        assert!(output.contains("Passes: render -> bloom(strength=1.50"));
        assert!(!output.contains("  mesh="));
    }

    #[test]
    fn mesh_listing_is_opt_in() {
        let output = DebugTextRenderer::new().with_meshes(true).render(&scene());
        assert_eq!(output.matches("  mesh=0 material=0").count(), 441);
        assert!(output.contains("pos=(-40.0, -40.0, 0.0)"));
    }
}
