use std::{
    fs::{self, File},
    io::{stdout, BufReader, Write},
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;

use args::Args;
use common::progress::Progress;
use slicer::{format::svg, mesh::load_mesh, slicer::Slicer};

mod args;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let file = File::open(&args.mesh)
        .with_context(|| format!("failed to open `{}`", args.mesh.display()))?;
    let mesh = load_mesh(BufReader::new(file))?;

    println!(
        "Loaded `{}`. {{ vert: {}, face: {} }}",
        args.mesh.file_name().unwrap_or_default().to_string_lossy(),
        mesh.vertex_count(),
        mesh.face_count()
    );

    // Slice on another thread so the main one can report progress.
    let now = Instant::now();
    let progress = Progress::default();

    let worker = thread::spawn({
        let progress = progress.clone();
        let (axis, thickness) = (args.axis, args.layer_thickness);
        move || {
            let layers = Slicer::new(&mesh).and_then(|slicer| {
                slicer.slice_model(axis, thickness, |percent| progress.report(percent))
            });
            progress.set_finished();
            layers
        }
    });

    while !progress.finished() {
        print!("\rSlicing... {:5.1}%", progress.percent());
        stdout().flush()?;
        thread::sleep(Duration::from_millis(50));
    }

    let layers = match worker.join() {
        Ok(result) => result?,
        Err(panic) => std::panic::resume_unwind(panic),
    };

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create `{}`", args.output.display()))?;

    for layer in &layers {
        let path = args.output.join(format!("layer_{:03}.svg", layer.index));
        fs::write(path, svg::document(layer, args.padding).to_string())?;
    }

    println!(
        "\nWrote {} layers to `{}`. Elapsed: {:.1}s",
        layers.len(),
        args.output.display(),
        now.elapsed().as_secs_f32()
    );

    Ok(())
}
