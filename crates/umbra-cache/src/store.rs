use hashbrown::{HashMap, HashSet};
use umbra_model::Model;

use crate::provider::{Delivery, ModelProvider};

/// Resident model blobs plus the set of ids already requested from the provider.
pub struct ModelStore<P: ModelProvider> {
    provider: P,
    blobs: HashMap<i32, Vec<u8>>,
    outstanding: HashSet<i32>,
}

impl<P: ModelProvider> ModelStore<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            blobs: HashMap::new(),
            outstanding: HashSet::new(),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Makes a blob resident without going through the provider.
    pub fn insert(&mut self, id: i32, data: Vec<u8>) {
        self.outstanding.remove(&id);
        self.blobs.insert(id, data);
    }

    /// True when the blob is resident; otherwise requests it and returns false.
    pub fn is_ready(&mut self, id: i32) -> bool {
        if self.blobs.contains_key(&id) {
            return true;
        }
        self.request(id);
        false
    }

    /// Decodes a resident model, or requests it and returns `None`.
    pub fn try_get(&mut self, id: i32) -> Option<Model> {
        match self.blobs.get(&id) {
            Some(blob) => Some(Model::decode(blob)),
            None => {
                self.request(id);
                None
            }
        }
    }

    /// Drains deliveries. Returns how many blobs became resident.
    pub fn poll(&mut self) -> usize {
        let mut loaded = 0;
        for delivery in self.provider.drain() {
            match delivery {
                Delivery::Loaded { id, data } => {
                    self.outstanding.remove(&id);
                    self.blobs.insert(id, data);
                    loaded += 1;
                }
                Delivery::Missing { id } => {
                    self.outstanding.remove(&id);
                }
            }
        }
        if loaded > 0 {
            log::debug!("{} model blob(s) arrived", loaded);
        }
        loaded
    }

    pub fn resident(&self) -> usize {
        self.blobs.len()
    }

    fn request(&mut self, id: i32) {
        if self.outstanding.insert(id) {
            log::debug!("requesting model {}", id);
            self.provider.request_model(id);
        }
    }
}
