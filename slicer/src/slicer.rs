use anyhow::{ensure, Result};
use tracing::{debug, info};

use crate::{
    bvh::{BoundingBox, Bvh},
    contour::build_paths,
    intersection::{self, Axis, Segment},
    layer::{Layer, PathBounds},
    mesh::Mesh,
    tolerance::Tolerances,
};

/// Per-run slicing context: the mesh, its spatial index and the
/// scale-derived tolerances, bundled so concurrent runs over different
/// meshes cannot interfere. Nothing here is mutated by a run, which
/// makes stale results from a superseded run safe to drop.
pub struct Slicer<'a> {
    mesh: &'a Mesh,
    bvh: Bvh,
    bounds: BoundingBox,
    tolerances: Tolerances,
}

impl<'a> Slicer<'a> {
    /// Builds the spatial index and tolerances for a mesh. A mesh with
    /// no vertex data is a caller error, reported here once rather than
    /// per slice.
    pub fn new(mesh: &'a Mesh) -> Result<Self> {
        ensure!(mesh.vertex_count() > 0, "mesh has no vertex data");

        let bounds = mesh.bounds();
        let tolerances = Tolerances::from_diagonal(bounds.diagonal());
        let bvh = Bvh::build(mesh);

        Ok(Self {
            mesh,
            bvh,
            bounds,
            tolerances,
        })
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn tolerances(&self) -> &Tolerances {
        &self.tolerances
    }

    /// Raw intersection segments for a single plane. Deterministic for a
    /// fixed mesh and plane; the segment order carries no meaning.
    pub fn slice_at(&self, axis: Axis, position: f32) -> Vec<Segment> {
        let mut faces = Vec::new();
        self.bvh.faces_at_plane(self.mesh, axis, position, &mut faces);

        let mut segments = Vec::with_capacity(faces.len());
        for face in faces {
            if let Some(segment) =
                intersection::triangle_plane(self.mesh.face(face), axis, position)
            {
                segments.push(segment);
            }
        }

        segments
    }

    /// Slices the whole model into evenly spaced layers along `axis`.
    ///
    /// The requested thickness determines the layer count; the actual
    /// spacing is then readjusted so the first and last layers land
    /// exactly on the model's extremes. `on_progress` receives the
    /// completion percentage after each layer, ending at 100.
    pub fn slice_model(
        &self,
        axis: Axis,
        layer_thickness: f32,
        mut on_progress: impl FnMut(f32),
    ) -> Result<Vec<Layer>> {
        ensure!(
            layer_thickness > 0.0,
            "layer thickness must be positive, got {layer_thickness}"
        );

        let start = self.bounds.min[axis.index()];
        let range = self.bounds.max[axis.index()] - start;

        let count = ((range / layer_thickness).ceil() as usize).max(2);
        let step = range / (count - 1) as f32;

        info!(%axis, layers = count, step, "slicing model");

        let mut layers = Vec::with_capacity(count);
        for index in 0..count {
            let position = start + step * index as f32;

            let segments = self.slice_at(axis, position);
            let paths = build_paths(&segments, &self.tolerances);
            let bounds = PathBounds::of(&paths);

            layers.push(Layer {
                index,
                position,
                paths,
                bounds,
            });
            on_progress((index + 1) as f32 / count as f32 * 100.0);
        }

        debug!(layers = layers.len(), "slicing complete");
        Ok(layers)
    }
}
