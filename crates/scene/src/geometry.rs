use glowgrid_common::Color;
use std::f32::consts::PI;

/// CPU-side triangle mesh ready for upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u16>,
}

/// UV sphere description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments,
            height_segments,
        }
    }

    pub fn vertex_count(&self) -> usize {
        (self.width_segments as usize + 1) * (self.height_segments as usize + 1)
    }

    /// Pole rows contribute one triangle per segment instead of two.
    pub fn index_count(&self) -> usize {
        3 * self.width_segments as usize * (2 * self.height_segments as usize - 2)
    }

    /// Generate vertices row by row from the +Y pole down, with a seam
    /// column duplicated at `u = 1`. Triangles wind counter-clockwise seen
    /// from outside.
    pub fn build(&self) -> MeshData {
        let w = self.width_segments;
        let h = self.height_segments;
        let mut mesh = MeshData {
            positions: Vec::with_capacity(self.vertex_count()),
            normals: Vec::with_capacity(self.vertex_count()),
            indices: Vec::with_capacity(self.index_count()),
        };

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * 2.0 * PI;
                let x = -phi.cos() * theta.sin();
                let y = theta.cos();
                let z = phi.sin() * theta.sin();
                mesh.positions
                    .push([x * self.radius, y * self.radius, z * self.radius]);
                mesh.normals.push([x, y, z]);
            }
        }

        let row = w + 1;
        let index = |ix: u32, iy: u32| (iy * row + ix) as u16;
        for iy in 0..h {
            for ix in 0..w {
                let a = index(ix + 1, iy);
                let b = index(ix, iy);
                let c = index(ix, iy + 1);
                let d = index(ix + 1, iy + 1);
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        mesh
    }
}

/// Physically based surface parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardMaterial {
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_match_formula() {
        let sphere = SphereGeometry::new(2.0, 32, 32);
        let mesh = sphere.build();
        assert_eq!(mesh.positions.len(), 33 * 33);
        assert_eq!(mesh.normals.len(), mesh.positions.len());
        assert_eq!(mesh.indices.len(), 3 * 32 * 62);
        assert_eq!(mesh.indices.len(), sphere.index_count());
    }

    #[test]
    fn vertices_lie_on_radius() {
        let mesh = SphereGeometry::new(2.0, 16, 8).build();
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - 2.0).abs() < 1e-4);
            let n_len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((n_len - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        let mesh = SphereGeometry::new(1.0, 3, 2).build();
        let max = mesh.positions.len() as u16;
        assert!(mesh.indices.iter().all(|&i| i < max));
        assert_eq!(mesh.indices.len(), 3 * 3 * 2);
    }

    #[test]
    fn triangles_face_outward() {
        let mesh = SphereGeometry::new(1.0, 12, 6).build();
        for tri in mesh.indices.chunks(3) {
            let p = |i: u16| glam::Vec3::from(mesh.positions[i as usize]);
            let (a, b, c) = (p(tri[0]), p(tri[1]), p(tri[2]));
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }
}
