use crate::{mesh::Mesh, Pos};

/// Axis-aligned box in 3D, used both for the mesh extents and for every
/// node of the spatial index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Pos,
    pub max: Pos,
}

impl BoundingBox {
    /// An inverted box that any expanded point will overwrite.
    pub fn new() -> Self {
        Self {
            min: Pos::repeat(f32::MAX),
            max: Pos::repeat(f32::MIN),
        }
    }

    pub fn center(&self) -> Pos {
        (self.min + self.max) / 2.0
    }

    pub fn longest_axis(&self) -> usize {
        let lengths = (self.max - self.min).abs();

        if lengths.x > lengths.y && lengths.x > lengths.z {
            return 0;
        }

        if lengths.y > lengths.z {
            return 1;
        }

        2
    }

    /// Length of the main diagonal. Every numeric tolerance in the
    /// pipeline is derived from this.
    pub fn diagonal(&self) -> f32 {
        (self.max - self.min).norm()
    }

    /// Whether a plane at `position` along `axis` passes through this
    /// box, boundary included. Subtrees failing this test cannot
    /// contribute intersection segments.
    pub fn straddles(&self, axis: usize, position: f32) -> bool {
        self.min[axis] <= position && position <= self.max[axis]
    }

    pub fn expand_point(&mut self, point: Pos) {
        self.min = Pos::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Pos::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    pub fn expand_face(&mut self, mesh: &Mesh, face_idx: usize) {
        for point in mesh.face(face_idx) {
            self.expand_point(point);
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min: Pos::zeros(),
            max: Pos::zeros(),
        }
    }
}
