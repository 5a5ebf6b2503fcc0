use std::sync::Arc;

use umbra_cache::{MemoryProvider, ModelCache, ModelCacheConfig};
use umbra_defs::{DefsRegistry, LocShape};
use umbra_model::{Model, PacketWriter, encode};
use umbra_world::collision::flag;
use umbra_world::locs::{CORNER_TYPES, WALL_TYPES};
use umbra_world::tiles::{flags, occlude};
use umbra_world::{CollisionGrid, LocContext, PlacedLoc, Scene, World, WorldError};

const LOCS: &str = r#"
    [[locs]]
    id = 1
    name = "wall"
    models = [10]
    shapes = [0]
    occlude = true
    wallwidth = 8

    [[locs]]
    id = 2
    name = "tree"
    models = [20]
    width = 2
    length = 2

    [[locs]]
    id = 3
    name = "flowers"
    models = [30]
    shapes = [22]
    active = false

    [[locs]]
    id = 4
    name = "banner"
    models = [40]
    shapes = [4]

    [[locs]]
    id = 5
    name = "fence"
    models = [50]
    shapes = [2]
    occlude = true

    [[locs]]
    id = 6
    name = "pillar"
    models = [60]
    shapes = [3]

    [[locs]]
    id = 7
    name = "roof"
    models = [70]
    shapes = [12]

    [[locs]]
    id = 8
    name = "crate"
    models = [80]
"#;

const FLOORS: &str = r#"
    [[floors]]
    id = 0
    name = "grass"
    rgb = 0x35720a
"#;

fn post() -> Model {
    Model {
        vertex_x: Arc::new(vec![-64, 64, 64, -64]),
        vertex_y: Arc::new(vec![0, 0, -200, -200]),
        vertex_z: Arc::new(vec![-64, -64, 64, 64]),
        face_a: Arc::new(vec![0, 0]),
        face_b: Arc::new(vec![1, 2]),
        face_c: Arc::new(vec![2, 3]),
        face_colour: Arc::new(vec![0x1234, 0x4321]),
        ..Model::default()
    }
}

struct Fixture {
    world: World,
    scene: Scene,
    collision: Vec<CollisionGrid>,
    defs: DefsRegistry,
    cache: ModelCache<MemoryProvider>,
}

impl Fixture {
    fn new() -> Self {
        let mut cache = ModelCache::new(MemoryProvider::new(), ModelCacheConfig::default());
        for id in [10, 20, 30, 40, 50, 60, 70] {
            cache.store.insert(id, encode(&post()));
        }
        Self {
            world: World::new(16, 16),
            scene: Scene::new(16, 16),
            collision: CollisionGrid::levels(16, 16),
            defs: DefsRegistry::from_toml_strs(LOCS, FLOORS).expect("defs"),
            cache,
        }
    }

    fn place(&mut self, level: usize, x: i32, z: i32, id: u32, shape: u8, angle: u8) {
        let mut ctx = LocContext {
            scene: &mut self.scene,
            collision: &mut self.collision,
            defs: &self.defs,
            cache: &mut self.cache,
        };
        let shape = LocShape::from_id(shape).expect("shape");
        self.world
            .add_loc(&mut ctx, level, x, z, id, shape, angle, Some(level))
            .expect("placed");
    }

    fn load(&mut self, bytes: &[u8]) -> Result<usize, WorldError> {
        let mut ctx = LocContext {
            scene: &mut self.scene,
            collision: &mut self.collision,
            defs: &self.defs,
            cache: &mut self.cache,
        };
        self.world.load_locations(bytes, 0, 0, &mut ctx)
    }
}

#[test]
fn straight_wall_shades_occludes_and_blocks() {
    let mut f = Fixture::new();
    f.place(0, 5, 5, 1, 0, 0);

    assert_eq!(f.world.tiles.get(0, 5, 5).shadow, 50);
    assert_eq!(f.world.tiles.get(0, 5, 6).shadow, 50);
    assert_eq!(f.world.tiles.get(0, 6, 5).shadow, 0);
    assert_eq!(f.world.tiles.occlude(0, 5, 5), occlude::WALL_Z);

    let grid = &f.collision[0];
    assert_eq!(grid.get(5, 5), Some(flag::OPEN | flag::WALL_WEST | flag::WALL_WEST << 9));
    assert_eq!(grid.get(4, 5), Some(flag::OPEN | flag::WALL_EAST | flag::WALL_EAST << 9));

    let wall = &f.scene.walls[&(0, 5, 5)];
    assert_eq!(wall.type_a, WALL_TYPES[0]);
    assert!(wall.loc.model.is_some());
    assert_eq!(PlacedLoc::bitset_loc_id(wall.loc.bitset), 1);
    assert_eq!(wall.loc.bitset & 0x3fff, 5 + (5 << 7));
    // walls are not interactive by default
    assert_ne!(wall.loc.bitset & 0x8000_0000, 0);
    assert_eq!(wall.loc.typecode2, 0);
}

#[test]
fn l_walls_use_both_halves() {
    let mut f = Fixture::new();
    f.place(0, 5, 5, 5, 2, 1);
    assert_eq!(f.world.tiles.occlude(0, 5, 6), occlude::WALL_X);
    assert_eq!(f.world.tiles.occlude(0, 6, 5), occlude::WALL_Z);
    let wall = &f.scene.walls[&(0, 5, 5)];
    assert_eq!((wall.type_a, wall.type_b), (WALL_TYPES[1], WALL_TYPES[2]));
    assert!(wall.second.is_some());
    assert_eq!(wall.loc.typecode2, (1 << 6) + 2);
    // the L collision covers the north and east edges
    assert_eq!(
        f.collision[0].get(5, 5).map(|v| v & 0xff),
        Some(flag::WALL_NORTH | flag::WALL_EAST)
    );
}

#[test]
fn square_corners_shade_one_corner() {
    let mut f = Fixture::new();
    f.place(0, 8, 8, 6, 3, 2);
    assert_eq!(f.world.tiles.get(0, 9, 8).shadow, 50);
    assert_eq!(f.world.tiles.get(0, 8, 8).shadow, 0);
    assert_eq!(f.scene.walls[&(0, 8, 8)].type_a, CORNER_TYPES[2]);
}

#[test]
fn centrepieces_raise_shadow_over_their_footprint() {
    let mut f = Fixture::new();
    f.place(0, 3, 3, 2, 10, 0);
    let placed = &f.scene.locs[0];
    assert_eq!((placed.width, placed.length), (2, 2));
    let radius = placed.loc.model.as_ref().expect("model").bounds.radius;
    let power = (radius / 4).min(30) as u8;
    for x in 3..=5 {
        for z in 3..=5 {
            assert_eq!(f.world.tiles.get(0, x, z).shadow, power);
        }
    }
    assert_eq!(f.world.tiles.get(0, 6, 3).shadow, 0);

    let grid = &f.collision[0];
    for (x, z) in [(3, 3), (4, 3), (3, 4), (4, 4)] {
        assert_ne!(grid.get(x, z).unwrap() & flag::LOC, 0);
    }
    assert_eq!(grid.get(5, 5), Some(flag::OPEN));
}

#[test]
fn centrepiece_without_a_model_still_blocks() {
    let mut f = Fixture::new();
    f.place(0, 3, 3, 8, 10, 0);
    assert!(f.scene.locs.is_empty());
    assert_eq!(f.world.tiles.get(0, 3, 3).shadow, 0);
    assert_ne!(f.collision[0].get(3, 3).unwrap() & flag::LOC, 0);
}

#[test]
fn inactive_ground_decoration_never_blocks() {
    let mut f = Fixture::new();
    f.place(0, 4, 4, 3, 22, 0);
    assert_eq!(f.scene.ground_decorations.len(), 1);
    assert_eq!(f.collision[0].get(4, 4), Some(flag::OPEN));
}

#[test]
fn wall_decorations_sit_on_the_wall_face() {
    let mut f = Fixture::new();
    f.place(0, 7, 7, 1, 0, 0);
    f.place(0, 7, 7, 4, 5, 0);
    let decor = &f.scene.wall_decorations[&(0, 7, 7)];
    assert_eq!((decor.offset_x, decor.offset_z), (8, 0));
    assert_eq!(decor.yaw, 0);
}

#[test]
fn later_walls_rescale_existing_decorations() {
    let mut f = Fixture::new();
    f.place(0, 7, 7, 4, 5, 3);
    assert_eq!(f.scene.wall_decorations[&(0, 7, 7)].offset_z, 16);
    f.place(0, 7, 7, 1, 0, 3);
    let decor = &f.scene.wall_decorations[&(0, 7, 7)];
    assert_eq!((decor.offset_x, decor.offset_z), (0, 8));
    assert_eq!(decor.yaw, 3 * 512);
}

#[test]
fn upper_roofs_occlude_as_floors() {
    let mut f = Fixture::new();
    f.place(0, 2, 2, 7, 12, 0);
    f.place(1, 2, 2, 7, 12, 0);
    assert_eq!(f.world.tiles.occlude(0, 2, 2), 0);
    assert_eq!(f.world.tiles.occlude(1, 2, 2), occlude::FLOOR);
}

fn stream(entries: &[(u32, usize, i32, i32, u8, u8)]) -> Vec<u8> {
    let mut w = PacketWriter::new();
    let mut last_id = -1i32;
    let mut i = 0;
    while i < entries.len() {
        let id = entries[i].0;
        w.psmart(id as i32 - last_id);
        last_id = id as i32;
        let mut last_pos = 0;
        while i < entries.len() && entries[i].0 == id {
            let (_, level, x, z, shape, angle) = entries[i];
            let pos = z | x << 6 | (level as i32) << 12;
            w.psmart(pos - last_pos + 1);
            last_pos = pos;
            w.p1(shape << 2 | angle);
            i += 1;
        }
        w.psmart(0);
    }
    w.psmart(0);
    w.data
}

#[test]
fn loc_streams_skip_the_border() {
    let mut f = Fixture::new();
    let bytes = stream(&[(1, 0, 0, 3, 0, 0), (1, 0, 5, 6, 0, 1), (2, 0, 9, 9, 10, 0)]);
    assert_eq!(f.load(&bytes).expect("locs"), 2);
    assert!(f.scene.walls.contains_key(&(0, 5, 6)));
    assert!(!f.scene.walls.contains_key(&(0, 0, 3)));
    assert_eq!(f.scene.locs.len(), 1);
}

#[test]
fn bridged_locs_block_the_level_below() {
    let mut f = Fixture::new();
    f.world.tiles.get_mut(1, 9, 9).flags = flags::LINK_BELOW;
    let bytes = stream(&[(2, 1, 9, 9, 10, 0)]);
    f.load(&bytes).expect("locs");
    assert_ne!(f.collision[0].get(9, 9).unwrap() & flag::LOC, 0);
    assert_eq!(f.collision[1].get(9, 9), Some(flag::OPEN));
}

#[test]
fn unknown_locs_abort_the_region() {
    let mut f = Fixture::new();
    let bytes = stream(&[(99, 0, 5, 5, 10, 0)]);
    assert!(matches!(f.load(&bytes), Err(WorldError::UnknownLoc { id: 99, .. })));
}

#[test]
fn readiness_requests_missing_models() {
    let mut f = Fixture::new();
    let mut cache = ModelCache::new(MemoryProvider::new(), ModelCacheConfig::default());
    let bytes = stream(&[(1, 0, 5, 5, 0, 0)]);
    assert!(!World::locs_ready(&bytes, &f.defs, &mut cache).expect("stream"));
    assert_eq!(cache.store.provider().requests, 1);
    assert!(World::locs_ready(&bytes, &f.defs, &mut f.cache).expect("stream"));
}
