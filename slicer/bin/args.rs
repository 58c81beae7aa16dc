use std::path::PathBuf;

use clap::Parser;

use slicer::intersection::Axis;

#[derive(Debug, Parser)]
/// Slices a triangle mesh into per-layer svg drawings for laser cutting.
pub struct Args {
    /// Path to a .stl file.
    pub mesh: PathBuf,

    #[arg(long, default_value = "z", value_parser = axis_value_parser)]
    /// Axis to slice along.
    pub axis: Axis,

    #[arg(long, default_value_t = 1.0)]
    /// Requested layer thickness in mm. The spacing is adjusted so the
    /// first and last layers land exactly on the model's extremes.
    pub layer_thickness: f32,

    #[arg(long, default_value_t = 2.0)]
    /// Padding around each layer's geometry in mm.
    pub padding: f32,

    /// Directory to write layer_NNN.svg files into.
    pub output: PathBuf,
}

fn axis_value_parser(raw: &str) -> Result<Axis, String> {
    match raw.to_ascii_lowercase().as_str() {
        "x" => Ok(Axis::X),
        "y" => Ok(Axis::Y),
        "z" => Ok(Axis::Z),
        _ => Err(format!("expected one of `x`, `y`, `z`, got `{raw}`")),
    }
}
