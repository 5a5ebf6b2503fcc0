use proptest::prelude::*;
use umbra_cache::LruCache;

#[derive(Clone, Debug)]
enum Op {
    Insert(u8, u32),
    Get(u8),
    Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..16, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        (0u8..16).prop_map(Op::Get),
        (0u8..16).prop_map(Op::Remove),
    ]
}

/// Recency-ordered list, least recent first.
struct Reference {
    items: Vec<(u8, u32)>,
    capacity: usize,
}

impl Reference {
    fn take(&mut self, k: u8) -> Option<(u8, u32)> {
        let pos = self.items.iter().position(|(key, _)| *key == k)?;
        Some(self.items.remove(pos))
    }
}

proptest! {
    // behaves like a recency list truncated to capacity
    #[test]
    fn matches_recency_list(capacity in 1usize..8, ops in prop::collection::vec(op(), 0..200)) {
        let mut lru = LruCache::new(capacity);
        let mut reference = Reference { items: Vec::new(), capacity };
        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    lru.insert(k, v);
                    reference.take(k);
                    reference.items.push((k, v));
                    if reference.items.len() > reference.capacity {
                        reference.items.remove(0);
                    }
                }
                Op::Get(k) => {
                    let expected = reference.take(k);
                    if let Some(item) = expected {
                        reference.items.push(item);
                    }
                    prop_assert_eq!(lru.get(&k), expected.map(|(_, v)| v));
                }
                Op::Remove(k) => {
                    prop_assert_eq!(lru.remove(&k), reference.take(k).map(|(_, v)| v));
                }
            }
            prop_assert!(lru.len() <= capacity);
            prop_assert_eq!(lru.len(), reference.items.len());
        }
        for (k, v) in &reference.items {
            prop_assert_eq!(lru.peek(k), Some(v));
        }
    }
}
