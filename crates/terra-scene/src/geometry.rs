//! Procedural geometry: UV spheres and helper rings.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use terra_render::{VertexPosition, VertexPositionNormalUv};

/// Sphere parameters. Segment counts are clamped to the minimum that forms a closed surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereGeometry {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

/// CPU-side triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<VertexPositionNormalUv>,
    pub indices: Vec<u32>,
}

impl SphereGeometry {
    pub fn new(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        Self {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        }
    }

    /// Build a latitude/longitude sphere.
    ///
    /// Produces `(w + 1) × (h + 1)` vertices: the seam column is duplicated so
    /// `u` runs 0..1 without wrapping, and each pole row is a ring of
    /// coincident vertices with distinct `u`. `v = 1` is the north pole.
    /// Triangles wind counter-clockwise seen from outside.
    pub fn build(&self) -> MeshData {
        let w = self.width_segments;
        let h = self.height_segments;
        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * TAU;
                let normal = Vec3::new(
                    -phi.cos() * theta.sin(),
                    theta.cos(),
                    phi.sin() * theta.sin(),
                );
                vertices.push(VertexPositionNormalUv {
                    position: (normal * self.radius).to_array(),
                    normal: normal.to_array(),
                    uv: [u, 1.0 - v],
                });
            }
        }

        let row = w + 1;
        let mut indices = Vec::with_capacity((w * h * 6) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // Degenerate triangles at the poles are skipped.
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        MeshData { vertices, indices }
    }
}

/// Three orthogonal circles of `radius` centred on the origin, as a line list.
pub fn ring_lines(radius: f32, segments: u32) -> Vec<VertexPosition> {
    let segments = segments.max(3);
    let mut lines = Vec::with_capacity((segments * 6) as usize);
    let point = |axis: usize, angle: f32| -> Vec3 {
        let (s, c) = angle.sin_cos();
        (match axis {
            0 => Vec3::new(c, s, 0.0),
            1 => Vec3::new(c, 0.0, s),
            _ => Vec3::new(0.0, c, s),
        }) * radius
    };

    for axis in 0..3 {
        for i in 0..segments {
            let a0 = i as f32 / segments as f32 * TAU;
            let a1 = (i + 1) as f32 / segments as f32 * TAU;
            lines.push(VertexPosition {
                position: point(axis, a0).to_array(),
            });
            lines.push(VertexPosition {
                position: point(axis, a1).to_array(),
            });
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_count() {
        let mesh = SphereGeometry::new(0.6, 32, 32).build();
        assert_eq!(mesh.vertices.len(), 33 * 33);

        let mesh = SphereGeometry::new(1.0, 8, 4).build();
        assert_eq!(mesh.vertices.len(), 9 * 5);
    }

    #[test]
    fn test_triangle_count_skips_pole_degenerates() {
        let (w, h) = (32, 32);
        let mesh = SphereGeometry::new(1.0, w, h).build();
        // Each pole row contributes one triangle per segment, interior rows two.
        assert_eq!(mesh.indices.len() as u32 / 3, 2 * w * (h - 2) + 2 * w);
    }

    #[test]
    fn test_vertices_lie_on_radius_with_unit_normals() {
        let radius = 0.63;
        let mesh = SphereGeometry::new(radius, 32, 32).build();
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!((p.length() - radius).abs() < 1e-5);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!((p / radius - n).length() < 1e-5);
        }
    }

    #[test]
    fn test_uv_range_and_poles() {
        let mesh = SphereGeometry::new(1.0, 16, 8).build();
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
        let first = mesh.vertices.first().unwrap();
        let last = mesh.vertices.last().unwrap();
        assert!((first.position[1] - 1.0).abs() < 1e-6);
        assert_eq!(first.uv[1], 1.0);
        assert!((last.position[1] + 1.0).abs() < 1e-6);
        assert_eq!(last.uv[1], 0.0);
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = SphereGeometry::new(0.1, 32, 32).build();
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.indices.len() % 3, 0);
    }

    #[test]
    fn test_outward_winding() {
        let mesh = SphereGeometry::new(1.0, 16, 16).build();
        for tri in mesh.indices.chunks(3) {
            let a = Vec3::from(mesh.vertices[tri[0] as usize].position);
            let b = Vec3::from(mesh.vertices[tri[1] as usize].position);
            let c = Vec3::from(mesh.vertices[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0, "inward-facing triangle {tri:?}");
        }
    }

    #[test]
    fn test_segment_minimums() {
        let sphere = SphereGeometry::new(1.0, 0, 0);
        assert_eq!(sphere.width_segments, 3);
        assert_eq!(sphere.height_segments, 2);
    }

    #[test]
    fn test_ring_lines() {
        let lines = ring_lines(0.1, 24);
        assert_eq!(lines.len(), 3 * 24 * 2);
        for v in &lines {
            assert!((Vec3::from(v.position).length() - 0.1).abs() < 1e-6);
        }
    }
}
