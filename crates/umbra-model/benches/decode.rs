use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use umbra_model::{Lighting, Model, encode};

fn grid_model(n: i32) -> Model {
    let mut x = Vec::new();
    let mut y = Vec::new();
    let mut z = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            x.push(i * 16);
            y.push(((i * 7 + j * 13) % 11) * -4);
            z.push(j * 16);
        }
    }
    let (mut a, mut b, mut c) = (Vec::new(), Vec::new(), Vec::new());
    let stride = (n + 1) as u32;
    for j in 0..n as u32 {
        for i in 0..n as u32 {
            let v = j * stride + i;
            a.extend([v, v]);
            b.extend([v + 1, v + stride + 1]);
            c.extend([v + stride + 1, v + stride]);
        }
    }
    let faces = a.len();
    Model {
        vertex_x: Arc::new(x),
        vertex_y: Arc::new(y),
        vertex_z: Arc::new(z),
        face_a: Arc::new(a),
        face_b: Arc::new(b),
        face_c: Arc::new(c),
        face_colour: Arc::new(vec![0x1a50; faces]),
        ..Model::default()
    }
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_decode");
    group.measurement_time(Duration::from_secs(5));
    let blob = encode(&grid_model(24));
    group.bench_function("grid_24", |b| {
        b.iter(|| black_box(Model::decode(black_box(&blob))))
    });
    let decoded = Model::decode(&blob);
    group.bench_function("grid_24_light", |b| {
        b.iter(|| {
            let mut m = decoded.clone();
            m.calculate_normals(&Lighting::for_loc(0, 0), true);
            black_box(m)
        })
    });
    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
