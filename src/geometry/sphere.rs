use std::f32::consts::PI;

use super::Mesh;

pub const MIN_RESOLUTION: u32 = 3;
/// Keeps `(n + 1)^2` vertices addressable with u16 indices
pub const MAX_RESOLUTION: u32 = 128;

/// Unit sphere tessellated into `resolution` latitude and longitude bands
pub fn generate(resolution: u32) -> Mesh {
    let n = resolution.clamp(MIN_RESOLUTION, MAX_RESOLUTION);
    let m = n;
    let vertex_count = ((n + 1) * (m + 1)) as usize;

    let mut mesh = Mesh {
        positions: Vec::with_capacity(vertex_count),
        normals: Vec::with_capacity(vertex_count),
        tex_coords: Vec::with_capacity(vertex_count),
        triangles: Vec::with_capacity((n * m * 6) as usize),
        lines: Vec::with_capacity((n * m * 4) as usize),
    };

    for i in 0..=n {
        let theta = i as f32 * PI / n as f32;
        for j in 0..=m {
            let phi = j as f32 * 2.0 * PI / m as f32;

            let x = theta.sin() * phi.cos();
            let y = theta.cos();
            let z = -theta.sin() * phi.sin();

            mesh.positions.push([x, y, z]);
            mesh.normals.push([x, y, z]);
            mesh.tex_coords.push([j as f32 / m as f32, i as f32 / n as f32]);
        }
    }

    let index = |i: u32, j: u32| (i * (m + 1) + j) as u16;

    for i in 0..n {
        for j in 0..m {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);

            mesh.triangles.extend_from_slice(&[a, b, c, a, c, d]);
            mesh.lines.extend_from_slice(&[a, b, a, d]);
        }
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_sphere_counts() {
        let mesh = generate(8);
        assert_eq!(mesh.vertex_count(), 81);
        assert_eq!(mesh.normals.len(), 81);
        assert_eq!(mesh.tex_coords.len(), 81);
        assert_eq!(mesh.triangles.len(), 8 * 8 * 6);
        assert_eq!(mesh.lines.len(), 8 * 8 * 4);
    }

    #[test]
    fn test_sphere_resolution_clamped() {
        assert_eq!(generate(0).vertex_count(), 16);
        let max = generate(10_000);
        assert_eq!(max.vertex_count(), 129 * 129);
        assert!(max.vertex_count() <= u16::MAX as usize);
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let mesh = generate(16);
        let count = mesh.vertex_count() as u16;
        assert!(mesh.triangles.iter().all(|&i| i < count));
        assert!(mesh.lines.iter().all(|&i| i < count));
    }

    #[test]
    fn test_sphere_vertices_on_unit_sphere() {
        let mesh = generate(12);
        for p in &mesh.positions {
            assert!((Vec3::from_array(*p).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_sphere_triangles_face_outward() {
        let mesh = generate(12);
        for tri in mesh.triangles.chunks(3) {
            let a = Vec3::from_array(mesh.positions[tri[0] as usize]);
            let b = Vec3::from_array(mesh.positions[tri[1] as usize]);
            let c = Vec3::from_array(mesh.positions[tri[2] as usize]);
            let normal = (b - a).cross(c - a);
            // Pole triangles collapse to zero area
            if normal.length() < 1e-6 {
                continue;
            }
            let centroid = (a + b + c) / 3.0;
            assert!(normal.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn test_sphere_tex_coords_in_unit_square() {
        let mesh = generate(6);
        assert!(mesh
            .tex_coords
            .iter()
            .all(|uv| (0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1])));
    }
}
