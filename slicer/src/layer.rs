use crate::{contour::Path, Point2};

/// Axis-aligned 2D bounds of a layer's paths, computed once when the
/// layer is assembled. Preview rendering, fit-to-view and export all
/// read this cached value instead of rescanning the geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl PathBounds {
    /// Single scan over every point. No points at all gives the all-zero
    /// sentinel, which is how empty layers are represented.
    pub fn of(paths: &[Path]) -> Self {
        let mut points = paths.iter().flatten();
        let Some(first) = points.next() else {
            return Self::default();
        };

        let mut bounds = Self {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
        };

        for point in points {
            bounds.min_x = bounds.min_x.min(point.x);
            bounds.max_x = bounds.max_x.max(point.x);
            bounds.min_y = bounds.min_y.min(point.y);
            bounds.max_y = bounds.max_y.max(point.y);
        }

        bounds
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// One slice's full result: the traced paths at one scalar position
/// along the slicing axis, plus their cached bounds.
#[derive(Debug, Clone)]
pub struct Layer {
    pub index: usize,
    pub position: f32,
    pub paths: Vec<Path>,
    pub bounds: PathBounds,
}

impl Layer {
    /// A slice plane can miss the model entirely; that is a valid layer,
    /// not an error.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Output coordinate frame for a layer drawing: the cached bounds with
/// uniform padding on all sides. The origin anchors the frame so the
/// geometry sits centered no matter where the model lives in space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub origin: Point2,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(bounds: &PathBounds, padding: f32) -> Self {
        Self {
            origin: Point2::new(bounds.min_x - padding, bounds.min_y - padding),
            width: bounds.width() + 2.0 * padding,
            height: bounds.height() + 2.0 * padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_track_every_path() {
        let paths = vec![
            vec![Point2::new(-5.0, 2.0), Point2::new(3.0, 4.0)],
            vec![Point2::new(0.0, -1.0), Point2::new(7.0, 0.0)],
        ];

        let bounds = PathBounds::of(&paths);
        assert_eq!(bounds.min_x, -5.0);
        assert_eq!(bounds.max_x, 7.0);
        assert_eq!(bounds.min_y, -1.0);
        assert_eq!(bounds.max_y, 4.0);
        assert_eq!(bounds.width(), 12.0);
        assert_eq!(bounds.height(), 5.0);
    }

    #[test]
    fn no_points_gives_zero_sentinel() {
        assert_eq!(PathBounds::of(&[]), PathBounds::default());
        assert_eq!(PathBounds::of(&[Vec::new()]), PathBounds::default());
    }

    #[test]
    fn frame_pads_uniformly_around_bounds() {
        let bounds = PathBounds {
            min_x: 10.0,
            max_x: 110.0,
            min_y: -20.0,
            max_y: 30.0,
        };

        let frame = Frame::new(&bounds, 2.0);
        assert_eq!(frame.origin, Point2::new(8.0, -22.0));
        assert_eq!(frame.width, 104.0);
        assert_eq!(frame.height, 54.0);
    }
}
