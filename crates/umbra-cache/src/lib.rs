//! Model residency: blob store, on-demand provider and the static/dynamic model caches.
#![forbid(unsafe_code)]

pub mod lru;
pub mod model_cache;
pub mod provider;
pub mod store;

pub use lru::{LruCache, LruStats};
pub use model_cache::{ModelCache, ModelCacheConfig, typecode};
pub use provider::{ChannelProvider, Delivery, MemoryProvider, ModelProvider};
pub use store::ModelStore;
