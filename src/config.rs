use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use umbra_cache::ModelCacheConfig;
use umbra_geom::IVec3;
use umbra_model::Lighting;
use umbra_world::BuildOptions;

/// `umbra.toml`. Every section and field is optional.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheSection,
    pub lighting: LightingSection,
    pub viewport: ViewportSection,
    pub build: BuildSection,
    pub paths: PathsSection,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CacheSection {
    pub static_capacity: usize,
    pub dynamic_capacity: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        let d = ModelCacheConfig::default();
        Self {
            static_capacity: d.static_capacity,
            dynamic_capacity: d.dynamic_capacity,
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LightingSection {
    pub ambient: i32,
    pub contrast: i32,
    pub source: [i32; 3],
}

impl Default for LightingSection {
    fn default() -> Self {
        let s = Lighting::DEFAULT_SOURCE;
        Self {
            ambient: 64,
            contrast: 768,
            source: [s.x, s.y, s.z],
        }
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct ViewportSection {
    pub width: i32,
    pub height: i32,
    /// Palette gamma; 0.9 is darkest, 0.6 brightest.
    pub brightness: f64,
}

impl Default for ViewportSection {
    fn default() -> Self {
        Self {
            width: 512,
            height: 334,
            brightness: 0.8,
        }
    }
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct BuildSection {
    pub low_memory: bool,
    pub draw_level: usize,
    pub hue_offset: i32,
    pub lightness_offset: i32,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct PathsSection {
    pub locs: PathBuf,
    pub floors: PathBuf,
    /// Directory of `<id>.dat` model blobs.
    pub models: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            locs: PathBuf::from("assets/defs/locs.toml"),
            floors: PathBuf::from("assets/defs/floors.toml"),
            models: PathBuf::from("assets/models"),
        }
    }
}

impl AppConfig {
    /// Reads `path`, or returns the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        if !path.exists() {
            log::info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Box<dyn Error>> {
        Ok(toml::from_str(text)?)
    }

    pub fn cache_config(&self) -> ModelCacheConfig {
        ModelCacheConfig {
            static_capacity: self.cache.static_capacity,
            dynamic_capacity: self.cache.dynamic_capacity,
        }
    }

    pub fn lighting(&self) -> Lighting {
        let [x, y, z] = self.lighting.source;
        Lighting::new(self.lighting.ambient, self.lighting.contrast, IVec3::new(x, y, z))
    }

    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            low_memory: self.build.low_memory,
            draw_level: self.build.draw_level,
            hue_offset: self.build.hue_offset,
            lightness_offset: self.build.lightness_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = AppConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.cache_config(), ModelCacheConfig::default());
        assert_eq!(cfg.lighting(), Lighting::new(64, 768, Lighting::DEFAULT_SOURCE));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [viewport]
            width = 256

            [build]
            hue_offset = 4
            "#,
        )
        .unwrap();
        assert_eq!(cfg.viewport.width, 256);
        assert_eq!(cfg.viewport.height, 334);
        assert_eq!(cfg.build_options().hue_offset, 4);
        assert!(!cfg.build_options().low_memory);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(AppConfig::from_toml_str("[cache]\nstatic_capacity = \"many\"").is_err());
    }

    #[test]
    fn missing_file_falls_back() {
        let cfg = AppConfig::load(Path::new("does/not/exist/umbra.toml")).unwrap();
        assert_eq!(cfg.paths, PathsSection::default());
    }

    #[test]
    fn file_on_disk_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("umbra.toml");
        std::fs::write(&path, "[paths]\nmodels = \"blobs\"\n").unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.paths.models, PathBuf::from("blobs"));
        assert_eq!(cfg.paths.locs, PathsSection::default().locs);
    }
}
