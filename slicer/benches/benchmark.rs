use std::f32::consts::PI;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use slicer::{
    intersection::{self, Axis},
    mesh::Mesh,
    slicer::Slicer,
    Pos,
};

/// Generates a unit uv sphere with `resolution` rings and segments.
fn uv_sphere(resolution: usize) -> Mesh {
    let mut positions = Vec::new();

    let point = |ring: usize, segment: usize| {
        let theta = PI * ring as f32 / resolution as f32;
        let phi = 2.0 * PI * segment as f32 / resolution as f32;
        Pos::new(
            theta.sin() * phi.cos(),
            theta.sin() * phi.sin(),
            theta.cos(),
        )
    };

    for ring in 0..resolution {
        for segment in 0..resolution {
            let (a, b) = (point(ring, segment), point(ring, segment + 1));
            let (c, d) = (point(ring + 1, segment), point(ring + 1, segment + 1));

            positions.extend([a, c, b]);
            positions.extend([b, c, d]);
        }
    }

    Mesh::from_positions(positions).unwrap()
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("Plane Intersections");

    for resolution in [32, 128, 512] {
        let mesh = uv_sphere(resolution);
        let slicer = Slicer::new(&mesh).unwrap();

        group.bench_with_input(BenchmarkId::new("Linear", resolution), &mesh, |b, mesh| {
            b.iter(|| {
                (0..mesh.face_count())
                    .filter_map(|face| intersection::triangle_plane(mesh.face(face), Axis::Z, 0.0))
                    .count()
            })
        });

        group.bench_with_input(BenchmarkId::new("Bvh", resolution), &slicer, |b, slicer| {
            b.iter(|| slicer.slice_at(Axis::Z, 0.0).len())
        });
    }
}

criterion_group!(benches, bench);
criterion_main!(benches);
