/// Floor for the bounding box diagonal, guarding the derived thresholds
/// against zero-size models.
const MIN_DIAGONAL: f32 = 1e-6;

/// Scale-aware numerical thresholds, derived once per slicing run from
/// the mesh bounding box diagonal. A fixed tolerance breaks on
/// sub-millimeter or multi-meter models; these scale with the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Quantization grid for treating near-identical 2D points as the
    /// same graph node.
    pub merge: f32,
    /// Segments shorter than this are noise and never enter the graph.
    pub min_segment: f32,
    /// Traced paths with a perimeter below this are discarded.
    pub min_path: f32,
    /// Neighbor search radius for the segment-pairing fallback.
    pub fallback_radius: f32,
}

impl Tolerances {
    pub fn from_diagonal(diagonal: f32) -> Self {
        let diagonal = diagonal.max(MIN_DIAGONAL);

        Self {
            merge: diagonal * 1e-5,
            min_segment: diagonal * 1e-6,
            min_path: diagonal * 1e-3,
            fallback_radius: diagonal * 1e-4,
        }
    }
}
