use std::path::PathBuf;
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashMap;

/// Result of one fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    Loaded { id: i32, data: Vec<u8> },
    Missing { id: i32 },
}

/// On-demand model source. Requests are fire-and-forget; results are drained
/// by polling.
pub trait ModelProvider {
    fn request_model(&mut self, id: i32);
    fn drain(&mut self) -> Vec<Delivery>;
}

/// Loads `<dir>/<id>.dat` on a background thread.
pub struct ChannelProvider {
    req_tx: Sender<i32>,
    res_rx: Receiver<Delivery>,
}

impl ChannelProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let (req_tx, req_rx) = unbounded::<i32>();
        let (res_tx, res_rx) = unbounded::<Delivery>();
        thread::spawn(move || {
            while let Ok(id) = req_rx.recv() {
                let path = dir.join(format!("{id}.dat"));
                let delivery = match std::fs::read(&path) {
                    Ok(data) => Delivery::Loaded { id, data },
                    Err(e) => {
                        log::debug!("model {} unavailable at {}: {}", id, path.display(), e);
                        Delivery::Missing { id }
                    }
                };
                if res_tx.send(delivery).is_err() {
                    break;
                }
            }
        });
        Self { req_tx, res_rx }
    }
}

impl ModelProvider for ChannelProvider {
    fn request_model(&mut self, id: i32) {
        let _ = self.req_tx.send(id);
    }

    fn drain(&mut self) -> Vec<Delivery> {
        self.res_rx.try_iter().collect()
    }
}

/// Serves blobs held in memory; requested ids are delivered on the next drain.
#[derive(Default)]
pub struct MemoryProvider {
    blobs: HashMap<i32, Vec<u8>>,
    pending: Vec<i32>,
    pub requests: usize,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: i32, data: Vec<u8>) {
        self.blobs.insert(id, data);
    }
}

impl ModelProvider for MemoryProvider {
    fn request_model(&mut self, id: i32) {
        self.requests += 1;
        self.pending.push(id);
    }

    fn drain(&mut self) -> Vec<Delivery> {
        self.pending
            .drain(..)
            .map(|id| match self.blobs.get(&id) {
                Some(data) => Delivery::Loaded {
                    id,
                    data: data.clone(),
                },
                None => Delivery::Missing { id },
            })
            .collect()
    }
}
