use umbra_model::PacketWriter;
use umbra_world::noise::perlin_noise;
use umbra_world::{World, WorldError};

/// Writes a full 4-level mapsquare, one call per tile.
fn mapsquare(mut tile: impl FnMut(usize, i32, i32, &mut PacketWriter)) -> Vec<u8> {
    let mut w = PacketWriter::new();
    for level in 0..4 {
        for x in 0..64 {
            for z in 0..64 {
                tile(level, x, z, &mut w);
            }
        }
    }
    w.data
}

#[test]
fn upper_levels_step_up_from_explicit_ground() {
    let bytes = mapsquare(|level, _, _, w| {
        if level == 0 {
            w.p1(82);
            w.p1(1);
            w.p1(0);
        } else {
            w.p1(0);
        }
    });
    let mut world = World::new(64, 64);
    world.load_ground(3200, 3200, 0, 0, &bytes).expect("ground");
    assert_eq!(world.tiles.height(0, 10, 10), 0);
    assert_eq!(world.tiles.height(1, 10, 10), -240);
    assert_eq!(world.tiles.height(3, 63, 0), -720);
    assert_eq!(world.tiles.get(0, 5, 5).underlay, 1);
    assert_eq!(world.tiles.get(1, 5, 5).underlay, 0);
}

#[test]
fn explicit_heights_stack_on_the_level_below() {
    let bytes = mapsquare(|level, _, _, w| match level {
        0 => {
            // a height byte of 1 means zero
            w.p1(1);
            w.p1(1);
        }
        1 => {
            w.p1(1);
            w.p1(10);
        }
        2 => {
            w.p1(1);
            w.p1(5);
        }
        _ => w.p1(0),
    });
    let mut world = World::new(64, 64);
    world.load_ground(0, 0, 0, 0, &bytes).expect("ground");
    assert_eq!(world.tiles.height(0, 1, 1), 0);
    assert_eq!(world.tiles.height(1, 1, 1), -80);
    assert_eq!(world.tiles.height(2, 1, 1), -120);
    assert_eq!(world.tiles.height(3, 1, 1), -360);
}

#[test]
fn overlay_and_flag_opcodes() {
    let bytes = mapsquare(|level, x, z, w| {
        if (x, z) == (4, 9) {
            if level == 0 {
                // overlay shape 3, rotation 2
                w.p1(2 + 4 * 3 + 2);
                w.p1(7);
            } else if level == 2 {
                w.p1(49 + 8);
            }
        }
        w.p1(0);
    });
    let mut world = World::new(64, 64);
    world.load_ground(0, 0, 0, 0, &bytes).expect("ground");
    let t = world.tiles.get(0, 4, 9);
    assert_eq!((t.overlay, t.overlay_shape, t.overlay_rotation), (7, 3, 2));
    assert_eq!(t.flags, 0);
    assert_eq!(world.tiles.flags(2, 4, 9), 8);
    assert_eq!(world.tiles.draw_level(2, 4, 9), 0);
    assert_eq!(world.tiles.draw_level(2, 4, 8), 2);
}

#[test]
fn derived_ground_heights_follow_the_noise() {
    let bytes = mapsquare(|_, _, _, w| w.p1(0));
    let (origin_x, origin_z) = (3136, 3264);
    let mut world = World::new(64, 64);
    world.load_ground(origin_x, origin_z, 0, 0, &bytes).expect("ground");
    for x in 0..64 {
        for z in 0..64 {
            let h = world.tiles.height(0, x, z);
            assert_eq!(h % 8, 0);
            assert!((-480..=-80).contains(&h));
            let expected = -perlin_noise(x as i32 + origin_x + 932_731, z as i32 + origin_z + 556_238) * 8;
            assert_eq!(h, expected);
        }
    }
}

#[test]
fn tiles_outside_the_region_are_skipped() {
    let bytes = mapsquare(|_, _, _, w| {
        w.p1(2);
        w.p1(9);
        w.p1(1);
        w.p1(3);
    });
    let mut world = World::new(32, 32);
    world.load_ground(0, 0, 16, -8, &bytes).expect("stream parses past skipped tiles");
    assert_eq!(world.tiles.get(0, 16, 0).overlay, 9);
    assert_eq!(world.tiles.height(0, 31, 31), -24);
    assert_eq!(world.tiles.get(0, 15, 0).overlay, 0);
}

#[test]
fn truncated_ground_is_fatal() {
    let mut bytes = mapsquare(|_, _, _, w| w.p1(0));
    bytes.truncate(1000);
    let mut world = World::new(64, 64);
    let err = world.load_ground(0, 0, 0, 0, &bytes).unwrap_err();
    assert!(matches!(err, WorldError::Stream(_)));
}
