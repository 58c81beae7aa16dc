use svg::{
    node::element::{Polygon, Polyline},
    Document,
};

use crate::{
    contour,
    layer::{Frame, Layer},
};

const STROKE_WIDTH: &str = "0.1";

/// Renders one layer as a standalone SVG document, sized in mm.
///
/// The viewport comes straight from the layer's cached bounds: origin
/// at `(min_x - padding, min_y - padding)` and dimensions of the bounds
/// plus padding on both sides, so the geometry is framed uniformly no
/// matter where the model sits in space. Closed paths become polygons,
/// open paths polylines; neither is ever force-closed here.
pub fn document(layer: &Layer, padding: f32) -> Document {
    let frame = Frame::new(&layer.bounds, padding);

    let mut doc = Document::new()
        .set(
            "viewBox",
            (frame.origin.x, frame.origin.y, frame.width, frame.height),
        )
        .set("width", format!("{}mm", frame.width))
        .set("height", format!("{}mm", frame.height));

    for path in layer.paths.iter() {
        let points = path.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();

        if contour::is_closed(path) {
            // The closing point is implicit in a polygon.
            let polygon = Polygon::new()
                .set("points", points[..points.len() - 1].to_vec())
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", STROKE_WIDTH);
            doc = doc.add(polygon);
        } else {
            let polyline = Polyline::new()
                .set("points", points)
                .set("fill", "none")
                .set("stroke", "black")
                .set("stroke-width", STROKE_WIDTH);
            doc = doc.add(polyline);
        }
    }

    doc
}
