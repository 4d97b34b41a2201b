use crate::camera::PerspectiveCamera;
use crate::config::{BloomSettings, ConfigError, SceneConfig};
use crate::geometry::{SphereGeometry, StandardMaterial};
use crate::light::AreaLight;
use glam::Vec3;
use glowgrid_common::{Color, Transform};

/// A handle referencing a geometry stored in the [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// A handle referencing a material stored in the [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialHandle(pub u32);

/// One drawn object. Geometry and material are shared through handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshInstance {
    pub transform: Transform,
    pub mesh: MeshHandle,
    pub material: MaterialHandle,
}

/// Linear distance fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Color,
    pub near: f32,
    pub far: f32,
}

/// One stage of the frame composition, in execution order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PostPass {
    /// Draw the scene into the HDR target.
    Render,
    /// Extract, blur and add bright regions.
    Bloom(BloomSettings),
}

/// Everything drawn each frame.
///
/// Geometry and materials are stored once; instances only hold handles.
/// Lights and camera are public because the animator rewrites them every
/// frame.
#[derive(Debug, Clone)]
pub struct Scene {
    pub fog: Fog,
    pub camera: PerspectiveCamera,
    pub rect_light: AreaLight,
    pub mouse_light: AreaLight,
    geometries: Vec<SphereGeometry>,
    materials: Vec<StandardMaterial>,
    meshes: Vec<MeshInstance>,
    passes: Vec<PostPass>,
}

impl Scene {
    /// An empty scene with the given camera, lights and fog.
    pub fn new(
        camera: PerspectiveCamera,
        rect_light: AreaLight,
        mouse_light: AreaLight,
        fog: Fog,
    ) -> Self {
        Self {
            fog,
            camera,
            rect_light,
            mouse_light,
            geometries: Vec::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            passes: vec![PostPass::Render],
        }
    }

    /// Build the sphere grid scene described by `config`.
    pub fn from_config(config: &SceneConfig, aspect: f32) -> Result<Self, ConfigError> {
        config.validate()?;

        let c = &config.camera;
        let mut camera = PerspectiveCamera::new(c.fov_degrees, aspect, c.near, c.far);
        camera.position = Vec3::new(0.0, 0.0, c.distance);
        camera.look_at(Vec3::ZERO);

        let fog = Fog {
            color: config.fog.color,
            near: config.fog.near,
            far: config.fog.far,
        };
        let mut scene = Self::new(
            camera,
            AreaLight::from_config(&config.rect_light),
            AreaLight::from_config(&config.mouse_light),
            fog,
        );

        let g = &config.grid;
        let mesh = scene.add_geometry(SphereGeometry::new(
            g.sphere_radius,
            g.width_segments,
            g.height_segments,
        ));
        let material = scene.add_material(StandardMaterial {
            color: config.material.color,
            roughness: config.material.roughness,
            metalness: config.material.metalness,
        });
        for position in grid_positions(g.half_extent, g.spacing) {
            scene.add_mesh(MeshInstance {
                transform: Transform::from_position(position),
                mesh,
                material,
            });
        }
        scene.add_pass(PostPass::Bloom(config.bloom));

        tracing::debug!(
            meshes = scene.meshes.len(),
            passes = scene.passes.len(),
            "scene built"
        );
        Ok(scene)
    }

    pub fn add_geometry(&mut self, geometry: SphereGeometry) -> MeshHandle {
        self.geometries.push(geometry);
        MeshHandle(self.geometries.len() as u32 - 1)
    }

    pub fn add_material(&mut self, material: StandardMaterial) -> MaterialHandle {
        self.materials.push(material);
        MaterialHandle(self.materials.len() as u32 - 1)
    }

    pub fn add_mesh(&mut self, instance: MeshInstance) {
        self.meshes.push(instance);
    }

    pub fn add_pass(&mut self, pass: PostPass) {
        self.passes.push(pass);
    }

    pub fn geometry(&self, handle: MeshHandle) -> Option<&SphereGeometry> {
        self.geometries.get(handle.0 as usize)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&StandardMaterial> {
        self.materials.get(handle.0 as usize)
    }

    pub fn geometries(&self) -> &[SphereGeometry] {
        &self.geometries
    }

    pub fn materials(&self) -> &[StandardMaterial] {
        &self.materials
    }

    pub fn meshes(&self) -> &[MeshInstance] {
        &self.meshes
    }

    pub fn passes(&self) -> &[PostPass] {
        &self.passes
    }

    pub fn lights(&self) -> [&AreaLight; 2] {
        [&self.rect_light, &self.mouse_light]
    }

    /// Settings of the first bloom pass, if the chain has one.
    pub fn bloom(&self) -> Option<BloomSettings> {
        self.passes.iter().find_map(|pass| match pass {
            PostPass::Bloom(settings) => Some(*settings),
            PostPass::Render => None,
        })
    }
}

/// Grid positions `(spacing * j, spacing * i, 0)` for `i, j` in
/// `-half_extent..=half_extent`, rows (`i`) outermost.
pub fn grid_positions(half_extent: i32, spacing: f32) -> impl Iterator<Item = Vec3> {
    (-half_extent..=half_extent).flat_map(move |i| {
        (-half_extent..=half_extent)
            .map(move |j| Vec3::new(j as f32 * spacing, i as f32 * spacing, 0.0))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn default_scene() -> Scene {
        Scene::from_config(&SceneConfig::default(), 16.0 / 9.0).unwrap()
    }

    #[test]
    fn grid_has_441_spheres_at_expected_positions() {
        let scene = default_scene();
        assert_eq!(scene.meshes().len(), 441);

        let expected: HashSet<(i32, i32)> = (-10..=10)
            .flat_map(|i| (-10..=10).map(move |j| (4 * j, 4 * i)))
            .collect();
        let actual: HashSet<(i32, i32)> = scene
            .meshes()
            .iter()
            .map(|m| {
                let p = m.transform.position;
                assert_eq!(p.z, 0.0);
                (p.x as i32, p.y as i32)
            })
            .collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn grid_order_is_row_major() {
        let positions: Vec<Vec3> = grid_positions(1, 4.0).collect();
        assert_eq!(positions.len(), 9);
        assert_eq!(positions[0], Vec3::new(-4.0, -4.0, 0.0));
        assert_eq!(positions[1], Vec3::new(0.0, -4.0, 0.0));
        assert_eq!(positions[8], Vec3::new(4.0, 4.0, 0.0));
    }

    #[test]
    fn instances_share_one_geometry_and_material() {
        let scene = default_scene();
        assert_eq!(scene.geometries().len(), 1);
        assert_eq!(scene.materials().len(), 1);
        let first = scene.meshes()[0];
        assert!(
            scene
                .meshes()
                .iter()
                .all(|m| m.mesh == first.mesh && m.material == first.material)
        );
        let sphere = scene.geometry(first.mesh).unwrap();
        assert_eq!(sphere.radius, 2.0);
        assert_eq!(sphere.width_segments, 32);
        assert_eq!(scene.material(first.material).unwrap().color.to_u32(), 0x1a237e);
        assert!(scene.geometry(MeshHandle(7)).is_none());
    }

    #[test]
    fn camera_starts_on_axis_looking_at_origin() {
        let scene = default_scene();
        assert_eq!(scene.camera.position, Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(scene.camera.target, Vec3::ZERO);
        assert_eq!(scene.camera.fov_degrees, 75.0);
        assert_eq!(scene.camera.far, 200.0);
    }

    #[test]
    fn pass_chain_is_render_then_bloom() {
        let scene = default_scene();
        assert_eq!(scene.passes().len(), 2);
        assert_eq!(scene.passes()[0], PostPass::Render);
        assert!(matches!(scene.passes()[1], PostPass::Bloom(_)));
        assert_eq!(scene.bloom(), Some(BloomSettings::default()));
    }

    #[test]
    fn fog_and_lights_from_defaults() {
        let scene = default_scene();
        assert_eq!(scene.fog.color, Color::BLACK);
        assert_eq!((scene.fog.near, scene.fog.far), (30.0, 40.0));
        let [rect, mouse] = scene.lights();
        assert_eq!((rect.width, rect.height, rect.intensity), (30.0, 30.0, 1.0));
        assert_eq!((mouse.width, mouse.height, mouse.intensity), (5.0, 5.0, 6.0));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = SceneConfig::default();
        config.camera.near = 0.0;
        assert!(Scene::from_config(&config, 1.0).is_err());
    }
}
