use ordered_float::OrderedFloat;
use tracing::debug;

use crate::{intersection::Axis, mesh::Mesh};

pub mod bounding_box;
pub use bounding_box::BoundingBox;

const LEAF_SIZE: usize = 8;

/// Bounding volume hierarchy over the mesh's triangles, stored as a
/// flat arena with the root in the last slot. Built once per mesh and
/// read-only afterwards; a changed mesh needs a fresh build.
pub struct Bvh {
    nodes: Vec<BvhNode>,
}

enum BvhNode {
    Leaf {
        faces: Box<[usize]>,
        bounds: BoundingBox,
    },
    Node {
        left: usize,
        right: usize,
        bounds: BoundingBox,
    },
}

impl Bvh {
    pub fn build(mesh: &Mesh) -> Self {
        if mesh.face_count() == 0 {
            return Self { nodes: Vec::new() };
        }

        let mut arena = Vec::new();
        let face_indices = (0..mesh.face_count()).collect::<Vec<_>>();

        let root = build_bvh_node(&mut arena, mesh, face_indices);
        arena.push(root);

        debug!(nodes = arena.len(), "built bvh");
        Self { nodes: arena }
    }

    /// Collects the indices of every face whose own extent straddles
    /// `position` along `axis`. Subtrees that cannot straddle the plane
    /// are pruned without being visited, which keeps a single plane
    /// query sub-linear in the face count.
    pub fn faces_at_plane(&self, mesh: &Mesh, axis: Axis, position: f32, out: &mut Vec<usize>) {
        if let Some(root) = self.nodes.last() {
            root.faces_at_plane(&self.nodes, mesh, axis.index(), position, out);
        }
    }
}

impl BvhNode {
    fn bounds(&self) -> &BoundingBox {
        match self {
            BvhNode::Leaf { bounds, .. } | BvhNode::Node { bounds, .. } => bounds,
        }
    }

    fn faces_at_plane(
        &self,
        arena: &[BvhNode],
        mesh: &Mesh,
        axis: usize,
        position: f32,
        out: &mut Vec<usize>,
    ) {
        if !self.bounds().straddles(axis, position) {
            return;
        }

        match self {
            BvhNode::Leaf { faces, .. } => {
                for &face in faces.iter() {
                    let heights = mesh.face(face).map(|v| v[axis]);
                    let min = heights[0].min(heights[1]).min(heights[2]);
                    let max = heights[0].max(heights[1]).max(heights[2]);
                    if min <= position && position <= max {
                        out.push(face);
                    }
                }
            }
            BvhNode::Node { left, right, .. } => {
                arena[*left].faces_at_plane(arena, mesh, axis, position, out);
                arena[*right].faces_at_plane(arena, mesh, axis, position, out);
            }
        }
    }
}

// We can expect there to be a total of roughly 2n / LEAF_SIZE nodes in
// the final bvh, one leaf per group of triangles plus the inner nodes.
fn build_bvh_node(arena: &mut Vec<BvhNode>, mesh: &Mesh, mut face_indices: Vec<usize>) -> BvhNode {
    let mut bounds = BoundingBox::new();
    for &face in face_indices.iter() {
        bounds.expand_face(mesh, face);
    }

    if face_indices.len() <= LEAF_SIZE {
        return BvhNode::Leaf {
            faces: face_indices.into_boxed_slice(),
            bounds,
        };
    }

    let longest_axis = bounds.longest_axis();
    face_indices.sort_by_cached_key(|&x| {
        let mut bounds = BoundingBox::new();
        bounds.expand_face(mesh, x);
        OrderedFloat(bounds.center()[longest_axis])
    });

    let (left_indices, right_indices) = face_indices.split_at(face_indices.len() / 2);

    let push_idx = |arena: &mut Vec<BvhNode>, val| {
        arena.push(val);
        arena.len() - 1
    };

    let left = build_bvh_node(arena, mesh, left_indices.to_vec());
    let left = push_idx(arena, left);

    let right = build_bvh_node(arena, mesh, right_indices.to_vec());
    let right = push_idx(arena, right);

    BvhNode::Node {
        left,
        right,
        bounds,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pos;

    // A column of triangles stacked along z, each spanning half a unit.
    fn stacked_triangles(count: usize) -> Mesh {
        let mut vertices = Vec::new();
        for i in 0..count {
            let z = i as f32;
            vertices.push(Pos::new(0.0, 0.0, z));
            vertices.push(Pos::new(1.0, 0.0, z + 0.5));
            vertices.push(Pos::new(0.0, 1.0, z));
        }
        Mesh::from_positions(vertices).unwrap()
    }

    #[test]
    fn query_returns_only_straddling_faces() {
        let mesh = stacked_triangles(64);
        let bvh = Bvh::build(&mesh);

        let mut faces = Vec::new();
        bvh.faces_at_plane(&mesh, Axis::Z, 10.25, &mut faces);

        // Only the triangle spanning z in [10, 10.5] can intersect.
        assert_eq!(faces, vec![10]);
    }

    #[test]
    fn query_matches_linear_scan() {
        let mesh = stacked_triangles(32);
        let bvh = Bvh::build(&mesh);

        for position in [0.0, 0.25, 15.5, 31.5] {
            let mut faces = Vec::new();
            bvh.faces_at_plane(&mesh, Axis::Z, position, &mut faces);
            faces.sort_unstable();

            let expected = (0..mesh.face_count())
                .filter(|&face| {
                    let mut bounds = BoundingBox::new();
                    bounds.expand_face(&mesh, face);
                    bounds.straddles(2, position)
                })
                .collect::<Vec<_>>();

            assert_eq!(faces, expected, "at position {position}");
        }
    }

    #[test]
    fn empty_mesh_builds_empty_index() {
        let mesh = Mesh::from_positions(Vec::new()).unwrap();
        let bvh = Bvh::build(&mesh);

        let mut faces = Vec::new();
        bvh.faces_at_plane(&mesh, Axis::Z, 0.0, &mut faces);
        assert!(faces.is_empty());
    }
}
