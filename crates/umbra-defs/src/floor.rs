use umbra_model::hsl24_to_16;

use crate::config::FloorDef;

/// Colour the editor uses for "no floor here".
pub const MAGENTA: u32 = 0xff00ff;

/// Compiled underlay/overlay definition with its colour split into the
/// terms the terrain blend sums.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FloorType {
    pub id: u16,
    pub name: String,
    pub rgb: u32,
    pub texture: Option<i32>,
    pub occlude: bool,
    pub hue: i32,
    pub saturation: i32,
    pub lightness: i32,
    /// Saturation weight used when averaging hues.
    pub luminance: i32,
    /// `hue * luminance`, summed by the blend and divided back out.
    pub chroma: i32,
    pub hsl: i32,
}

impl FloorType {
    pub fn from_def(def: FloorDef) -> Self {
        let mut floor = Self::from_rgb(def.id, def.rgb);
        floor.name = def.name.unwrap_or_default();
        floor.texture = def.texture.filter(|&t| t >= 0);
        floor.occlude = def.occlude.unwrap_or(true);
        floor
    }

    pub fn from_rgb(id: u16, rgb: u32) -> Self {
        let r = ((rgb >> 16) & 0xff) as f64 / 256.0;
        let g = ((rgb >> 8) & 0xff) as f64 / 256.0;
        let b = (rgb & 0xff) as f64 / 256.0;
        let min = r.min(g).min(b);
        let max = r.max(g).max(b);

        let mut h = 0.0;
        let mut s = 0.0;
        let l = (min + max) / 2.0;
        if min != max {
            if l < 0.5 {
                s = (max - min) / (max + min);
            }
            if l >= 0.5 {
                s = (max - min) / (2.0 - max - min);
            }
            if r == max {
                h = (g - b) / (max - min);
            } else if g == max {
                h = 2.0 + (b - r) / (max - min);
            } else if b == max {
                h = 4.0 + (r - g) / (max - min);
            }
        }
        h /= 6.0;

        let hue = (h * 256.0) as i32;
        let saturation = ((s * 256.0) as i32).clamp(0, 255);
        let lightness = ((l * 256.0) as i32).clamp(0, 255);
        let luminance = if l > 0.5 {
            ((1.0 - l) * s * 512.0) as i32
        } else {
            (l * s * 512.0) as i32
        }
        .max(1);
        let chroma = (h * luminance as f64) as i32;

        Self {
            id,
            name: String::new(),
            rgb,
            texture: None,
            occlude: true,
            hue,
            saturation,
            lightness,
            luminance,
            chroma,
            hsl: hsl24_to_16(hue, saturation, lightness),
        }
    }

    /// HSL16 an overlay is drawn with: `-1` for textured floors, `-2` for
    /// hidden (magenta) floors.
    pub fn overlay_hsl(&self) -> i32 {
        if self.texture.is_some() {
            -1
        } else if self.rgb == MAGENTA {
            -2
        } else {
            self.hsl
        }
    }
}
