use std::io::{Read, Seek};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::{bvh::BoundingBox, Pos};

/// A triangle mesh, immutable once ingested. Index validity is checked
/// here, exactly once; the slicing pipeline relies on it.
#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Box<[Pos]>,
    faces: Box<[[u32; 3]]>,
}

impl Mesh {
    /// Creates a mesh from vertex positions and a face index list,
    /// failing if any index points outside the vertex buffer.
    pub fn new(vertices: Vec<Pos>, faces: Vec<[u32; 3]>) -> Result<Self> {
        let count = vertices.len() as u32;
        for face in faces.iter() {
            if face.iter().any(|&idx| idx >= count) {
                bail!("face {face:?} is out of bounds for {count} vertices");
            }
        }

        Ok(Self {
            vertices: vertices.into_boxed_slice(),
            faces: faces.into_boxed_slice(),
        })
    }

    /// Creates a mesh from bare triangle soup, synthesizing the identity
    /// face list. Every three consecutive positions form one triangle.
    pub fn from_positions(vertices: Vec<Pos>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            bail!(
                "vertex count {} is not a multiple of three",
                vertices.len()
            );
        }

        let faces = (0..vertices.len() as u32 / 3)
            .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
            .collect();
        Self::new(vertices, faces)
    }

    pub fn vertices(&self) -> &[Pos] {
        self.vertices.as_ref()
    }

    pub fn faces(&self) -> &[[u32; 3]] {
        self.faces.as_ref()
    }

    /// The three corner positions of a face.
    pub fn face(&self, index: usize) -> [Pos; 3] {
        let face = self.faces[index];
        [
            self.vertices[face[0] as usize],
            self.vertices[face[1] as usize],
            self.vertices[face[2] as usize],
        ]
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounding box over every vertex. An empty mesh gets
    /// the zero box.
    pub fn bounds(&self) -> BoundingBox {
        if self.vertices.is_empty() {
            return BoundingBox::default();
        }

        let mut bounds = BoundingBox::new();
        for &vertex in self.vertices.iter() {
            bounds.expand_point(vertex);
        }

        bounds
    }
}

/// Loads a binary or ascii STL file into a mesh.
pub fn load_mesh<T: Read + Seek>(mut reader: T) -> Result<Mesh> {
    let stl = stl_io::read_stl(&mut reader).context("failed to parse stl")?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Pos::new(v[0], v[1], v[2]))
        .collect::<Vec<_>>();
    let faces = stl
        .faces
        .iter()
        .map(|f| f.vertices.map(|idx| idx as u32))
        .collect::<Vec<_>>();

    info!(
        vertices = vertices.len(),
        faces = faces.len(),
        "loaded stl mesh"
    );
    Mesh::new(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_bounds_face() {
        let vertices = vec![Pos::zeros(), Pos::x(), Pos::y()];
        let result = Mesh::new(vertices, vec![[0, 1, 3]]);
        assert!(result.is_err());
    }

    #[test]
    fn synthesizes_identity_faces() {
        let vertices = vec![
            Pos::zeros(),
            Pos::x(),
            Pos::y(),
            Pos::z(),
            Pos::x() * 2.0,
            Pos::y() * 2.0,
        ];
        let mesh = Mesh::from_positions(vertices).unwrap();

        assert_eq!(mesh.face_count(), 2);
        assert_eq!(mesh.faces()[0], [0, 1, 2]);
        assert_eq!(mesh.faces()[1], [3, 4, 5]);
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = Mesh::from_positions(vec![
            Pos::new(-1.0, 2.0, 0.5),
            Pos::new(3.0, -4.0, 0.0),
            Pos::new(0.0, 0.0, 7.0),
        ])
        .unwrap();

        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Pos::new(-1.0, -4.0, 0.0));
        assert_eq!(bounds.max, Pos::new(3.0, 2.0, 7.0));
    }
}
