use glam::Vec3;

use crate::stl::TriMesh;

/// Axis-aligned box centered on the origin, one face per side with flat
/// normals.
pub fn box_mesh(size: Vec3) -> TriMesh {
    let h = size * 0.5;
    let faces: [(Vec3, [Vec3; 4]); 6] = [
        (
            Vec3::Z,
            [
                Vec3::new(-h.x, -h.y, h.z),
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(h.x, h.y, h.z),
                Vec3::new(-h.x, h.y, h.z),
            ],
        ),
        (
            Vec3::NEG_Z,
            [
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(-h.x, h.y, -h.z),
                Vec3::new(h.x, h.y, -h.z),
            ],
        ),
        (
            Vec3::NEG_X,
            [
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(-h.x, -h.y, h.z),
                Vec3::new(-h.x, h.y, h.z),
                Vec3::new(-h.x, h.y, -h.z),
            ],
        ),
        (
            Vec3::X,
            [
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(h.x, h.y, -h.z),
                Vec3::new(h.x, h.y, h.z),
            ],
        ),
        (
            Vec3::NEG_Y,
            [
                Vec3::new(-h.x, -h.y, -h.z),
                Vec3::new(h.x, -h.y, -h.z),
                Vec3::new(h.x, -h.y, h.z),
                Vec3::new(-h.x, -h.y, h.z),
            ],
        ),
        (
            Vec3::Y,
            [
                Vec3::new(-h.x, h.y, h.z),
                Vec3::new(h.x, h.y, h.z),
                Vec3::new(h.x, h.y, -h.z),
                Vec3::new(-h.x, h.y, -h.z),
            ],
        ),
    ];

    let mut vertices = Vec::with_capacity(24 * 6);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = (vertices.len() / 6) as u32;
        for corner in corners {
            vertices.extend_from_slice(&[corner.x, corner.y, corner.z]);
            vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    TriMesh { vertices, indices }
}

/// UV sphere centered on the origin with smooth normals.
pub fn sphere_mesh(radius: f32, sectors: u32, stacks: u32) -> TriMesh {
    let sectors = sectors.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::new();
    for stack in 0..=stacks {
        let phi = std::f32::consts::PI * stack as f32 / stacks as f32;
        let y = phi.cos();
        let ring = phi.sin();
        for sector in 0..=sectors {
            let theta = std::f32::consts::TAU * sector as f32 / sectors as f32;
            let normal = Vec3::new(ring * theta.cos(), y, ring * theta.sin());
            let position = normal * radius;
            vertices.extend_from_slice(&[position.x, position.y, position.z]);
            vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
        }
    }

    let stride = sectors + 1;
    let mut indices = Vec::new();
    for stack in 0..stacks {
        for sector in 0..sectors {
            let a = stack * stride + sector;
            let b = a + stride;
            if stack != 0 {
                indices.extend_from_slice(&[a, b, a + 1]);
            }
            if stack != stacks - 1 {
                indices.extend_from_slice(&[a + 1, b, b + 1]);
            }
        }
    }

    TriMesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_has_24_vertices_and_12_triangles() {
        let mesh = box_mesh(Vec3::new(2.0, 1.0, 0.5));
        assert_eq!(mesh.vertices.len() / 6, 24);
        assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn box_extents_match_size() {
        let mesh = box_mesh(Vec3::new(40.0, 0.5, 40.0));
        let max_x = mesh
            .positions()
            .iter()
            .map(|p| p.x)
            .fold(f32::MIN, f32::max);
        let max_y = mesh
            .positions()
            .iter()
            .map(|p| p.y)
            .fold(f32::MIN, f32::max);
        assert_eq!(max_x, 20.0);
        assert_eq!(max_y, 0.25);
    }

    #[test]
    fn sphere_points_lie_on_the_radius() {
        let mesh = sphere_mesh(0.0078, 12, 8);
        for position in mesh.positions() {
            assert!((position.length() - 0.0078).abs() < 1e-5);
        }
        assert!(!mesh.indices.is_empty());
    }

    #[test]
    fn sphere_normals_are_unit_length() {
        let mesh = sphere_mesh(1.0, 8, 6);
        for chunk in mesh.vertices.chunks_exact(6) {
            let normal = Vec3::new(chunk[3], chunk[4], chunk[5]);
            assert!((normal.length() - 1.0).abs() < 1e-4);
        }
    }
}
