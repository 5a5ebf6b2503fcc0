use criterion::{Criterion, black_box, criterion_group, criterion_main};
use umbra_defs::DefsRegistry;
use umbra_model::PacketWriter;
use umbra_world::noise::perlin_noise;
use umbra_world::{CollisionGrid, REGION_SIZE, Scene, World};

const FLOORS: &str = r#"
    [[floors]]
    id = 0
    rgb = 0x35720a

    [[floors]]
    id = 1
    rgb = 0x8a6d3b
"#;

/// Noise-height mapsquare with a checker of two underlays.
fn mapsquare() -> Vec<u8> {
    let mut w = PacketWriter::new();
    for level in 0..4 {
        for x in 0..64 {
            for z in 0..64 {
                if level == 0 {
                    w.p1(82 + ((x / 8 + z / 8) % 2) as u8);
                }
                w.p1(0);
            }
        }
    }
    w.data
}

fn bench_build(c: &mut Criterion) {
    let defs = DefsRegistry::from_toml_strs("", FLOORS).expect("defs");
    let ground = mapsquare();
    let mut group = c.benchmark_group("world");
    group.bench_function("noise_64x64", |b| {
        b.iter(|| {
            let mut sum = 0;
            for x in 0..64 {
                for z in 0..64 {
                    sum += perlin_noise(black_box(x + 932_731), black_box(z + 556_238));
                }
            }
            sum
        })
    });
    group.bench_function("build_region", |b| {
        b.iter(|| {
            let mut world = World::new(REGION_SIZE, REGION_SIZE);
            for (mx, mz) in [(0, 0), (64, 0), (0, 64), (64, 64)] {
                world
                    .load_ground(3136, 3136, mx, mz, black_box(&ground))
                    .expect("ground");
            }
            let mut scene = Scene::new(REGION_SIZE, REGION_SIZE);
            let mut collision = CollisionGrid::levels(REGION_SIZE, REGION_SIZE);
            world.build(&mut scene, &mut collision, &defs).expect("build");
            scene.ground.len()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build);
criterion_main!(benches);
