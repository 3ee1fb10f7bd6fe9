pub mod sphere;

use crate::model::Geometry;

/// CPU-side vertex and index data for one geometry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    /// Triangle list, counter-clockwise seen from outside
    pub triangles: Vec<u16>,
    /// Line list for wireframe drawing
    pub lines: Vec<u16>,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Build the mesh for a geometry tag
pub fn create_vertex_data(geometry: Geometry, resolution: u32) -> Mesh {
    match geometry {
        Geometry::Sphere => sphere::generate(resolution),
    }
}
