use std::fs;
use std::path::Path;

use hashbrown::HashMap;

use crate::config::{FloorsConfig, LocsConfig};
use crate::error::DefsError;
use crate::floor::FloorType;
use crate::loc::LocType;

/// All loaded loc and floor definitions.
#[derive(Clone, Debug, Default)]
pub struct DefsRegistry {
    pub locs: HashMap<u32, LocType>,
    pub floors: HashMap<u16, FloorType>,
    pub loc_by_name: HashMap<String, u32>,
}

impl DefsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn loc(&self, id: u32) -> Option<&LocType> {
        self.locs.get(&id)
    }

    #[inline]
    pub fn floor(&self, id: u16) -> Option<&FloorType> {
        self.floors.get(&id)
    }

    pub fn loc_id_by_name(&self, name: &str) -> Option<u32> {
        self.loc_by_name.get(name).copied()
    }

    pub fn load_from_paths(
        locs_path: impl AsRef<Path>,
        floors_path: impl AsRef<Path>,
    ) -> Result<Self, DefsError> {
        let locs = fs::read_to_string(locs_path)?;
        let floors = fs::read_to_string(floors_path)?;
        Self::from_toml_strs(&locs, &floors)
    }

    pub fn from_toml_strs(locs_toml: &str, floors_toml: &str) -> Result<Self, DefsError> {
        let locs: LocsConfig = toml::from_str(locs_toml)?;
        let floors: FloorsConfig = toml::from_str(floors_toml)?;
        Self::from_configs(locs, floors)
    }

    pub fn from_configs(locs: LocsConfig, floors: FloorsConfig) -> Result<Self, DefsError> {
        let mut reg = DefsRegistry::new();
        for def in locs.locs {
            reg.insert_loc(LocType::from_def(def))?;
        }
        for def in floors.floors {
            reg.insert_floor(FloorType::from_def(def))?;
        }
        log::info!(
            "loaded {} loc types and {} floor types",
            reg.locs.len(),
            reg.floors.len()
        );
        Ok(reg)
    }

    pub fn insert_loc(&mut self, loc: LocType) -> Result<(), DefsError> {
        if self.locs.contains_key(&loc.id) {
            return Err(DefsError::DuplicateId {
                kind: "loc",
                id: loc.id,
            });
        }
        if loc.shapes.as_ref().is_some_and(|s| s.len() != loc.models.len()) {
            return Err(DefsError::Invalid {
                kind: "loc",
                id: loc.id,
                reason: "shapes and models differ in length".into(),
            });
        }
        if !loc.name.is_empty() {
            self.loc_by_name.insert(loc.name.clone(), loc.id);
        }
        self.locs.insert(loc.id, loc);
        Ok(())
    }

    pub fn insert_floor(&mut self, floor: FloorType) -> Result<(), DefsError> {
        if self.floors.contains_key(&floor.id) {
            return Err(DefsError::DuplicateId {
                kind: "floor",
                id: floor.id as u32,
            });
        }
        self.floors.insert(floor.id, floor);
        Ok(())
    }
}
