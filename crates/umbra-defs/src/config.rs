use serde::Deserialize;

/// One `[[locs]]` entry. Unset fields take the stock loc defaults.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct LocDef {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub models: Vec<i32>,
    #[serde(default)]
    pub shapes: Option<Vec<u8>>,
    /// `[src, dst]` HSL16 pairs.
    #[serde(default)]
    pub recolours: Vec<[i32; 2]>,
    pub width: Option<i32>,
    pub length: Option<i32>,
    pub blockwalk: Option<bool>,
    pub blockrange: Option<bool>,
    pub active: Option<bool>,
    pub hillskew: Option<bool>,
    pub sharelight: Option<bool>,
    pub occlude: Option<bool>,
    pub anim: Option<i32>,
    pub wallwidth: Option<i32>,
    pub ambient: Option<i32>,
    pub contrast: Option<i32>,
    pub mirror: Option<bool>,
    pub shadow: Option<bool>,
    pub resize: Option<[i32; 3]>,
    pub offset: Option<[i32; 3]>,
    pub forcedecor: Option<bool>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct LocsConfig {
    #[serde(default)]
    pub locs: Vec<LocDef>,
}

/// One `[[floors]]` entry.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct FloorDef {
    pub id: u16,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rgb: u32,
    pub texture: Option<i32>,
    pub occlude: Option<bool>,
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct FloorsConfig {
    #[serde(default)]
    pub floors: Vec<FloorDef>,
}
