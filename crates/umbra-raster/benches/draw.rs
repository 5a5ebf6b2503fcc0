use std::hint::black_box;
use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use umbra_model::{FacePriorities, Lighting, Model};
use umbra_raster::{Canvas, FillError, FillState, Palette, Rasterizer, TextureSpace, Viewport};

struct NullCanvas(usize);

impl Canvas for NullCanvas {
    fn flat_triangle(&mut self, _: [i32; 3], _: [i32; 3], _: u32, _: FillState) -> Result<(), FillError> {
        self.0 += 1;
        Ok(())
    }

    fn gouraud_triangle(&mut self, _: [i32; 3], _: [i32; 3], _: [i32; 3], _: FillState) -> Result<(), FillError> {
        self.0 += 1;
        Ok(())
    }

    fn textured_triangle(
        &mut self,
        _: [i32; 3],
        _: [i32; 3],
        _: [i32; 3],
        _: TextureSpace,
        _: i32,
        _: FillState,
    ) -> Result<(), FillError> {
        self.0 += 1;
        Ok(())
    }
}

/// Folded sheet of `n * n` quads with mixed priorities.
fn sheet(n: i32) -> Model {
    let mut vx = Vec::new();
    let mut vy = Vec::new();
    let mut vz = Vec::new();
    for i in 0..=n {
        for j in 0..=n {
            vx.push(j * 32 - n * 16);
            vy.push(i * 32 - n * 16);
            vz.push(((i + j) % 3) * 16);
        }
    }
    let (mut fa, mut fb, mut fc, mut pri) = (Vec::new(), Vec::new(), Vec::new(), Vec::new());
    let w = (n + 1) as u32;
    for i in 0..n as u32 {
        for j in 0..n as u32 {
            let v = i * w + j;
            fa.extend([v, v + 1]);
            fb.extend([v + w, v + w]);
            fc.extend([v + 1, v + w + 1]);
            pri.extend([(i % 12) as u8, (j % 12) as u8]);
        }
    }
    let faces = fa.len();
    let mut model = Model {
        vertex_x: Arc::new(vx),
        vertex_y: Arc::new(vy),
        vertex_z: Arc::new(vz),
        face_a: Arc::new(fa),
        face_b: Arc::new(fb),
        face_c: Arc::new(fc),
        face_colour: Arc::new((0..faces as i32).map(|f| f & 0xffff).collect()),
        face_priority: FacePriorities::PerFace(Arc::new(pri)),
        ..Model::default()
    };
    model.calculate_normals(&Lighting::for_loc(0, 0), true);
    model
}

fn bench_draw(c: &mut Criterion) {
    let model = sheet(32);
    let mut r = Rasterizer::new(Viewport::new(512, 334), Arc::new(Palette::new(0.8)));
    let mut canvas = NullCanvas(0);
    let mut group = c.benchmark_group("draw");
    group.bench_function("simple_2048_faces", |b| {
        b.iter(|| {
            r.draw_simple(black_box(&model), 0, 128, 0, 0, 0, 0, 1500, &mut canvas);
        })
    });
    group.finish();
    black_box(canvas.0);
}

criterion_group!(benches, bench_draw);
criterion_main!(benches);
