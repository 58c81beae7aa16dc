//! Slices a triangle mesh into stacks of 2D contour paths, one per layer,
//! ready for laser-cut export. See [`slicer::Slicer`] for the entry point.

use nalgebra::{Vector2, Vector3};

pub mod bvh;
pub mod contour;
pub mod format;
pub mod intersection;
pub mod layer;
pub mod mesh;
pub mod slicer;
pub mod tolerance;

pub type Pos = Vector3<f32>;
pub type Point2 = Vector2<f32>;
