use std::sync::Arc;

use proptest::prelude::*;
use umbra_model::{Model, encode};

fn model() -> impl Strategy<Value = Model> {
    (1usize..32).prop_flat_map(|vertices| {
        let coords = prop::collection::vec(-4000i32..4000, vertices * 3);
        let faces = prop::collection::vec((0..vertices as u32, 0..vertices as u32, 0..vertices as u32), 0..48);
        (coords, faces).prop_map(move |(coords, faces)| {
            let (x, rest) = coords.split_at(vertices);
            let (y, z) = rest.split_at(vertices);
            Model {
                vertex_x: Arc::new(x.to_vec()),
                vertex_y: Arc::new(y.to_vec()),
                vertex_z: Arc::new(z.to_vec()),
                face_a: Arc::new(faces.iter().map(|f| f.0).collect()),
                face_b: Arc::new(faces.iter().map(|f| f.1).collect()),
                face_c: Arc::new(faces.iter().map(|f| f.2).collect()),
                face_colour: Arc::new(faces.iter().map(|f| (f.0 * 97 % 65535) as i32).collect()),
                ..Model::default()
            }
        })
    })
}

proptest! {
    // Decoding the same blob twice yields identical geometry
    #[test]
    fn decode_is_deterministic(m in model()) {
        let blob = encode(&m);
        let first = Model::decode(&blob);
        let second = Model::decode(&blob);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &m);
    }

    // Arbitrary bytes never panic and decode the same way every time
    #[test]
    fn arbitrary_bytes_are_handled(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let first = Model::decode(&bytes);
        let second = Model::decode(&bytes);
        prop_assert_eq!(first, second);
    }
}
