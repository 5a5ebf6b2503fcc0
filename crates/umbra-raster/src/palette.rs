/// HSL16 to RGB lookup, gamma-adjusted by brightness.
#[derive(Clone)]
pub struct Palette {
    rgb: Vec<u32>,
}

impl std::fmt::Debug for Palette {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Palette").field("entries", &self.rgb.len()).finish()
    }
}

impl Palette {
    /// `brightness` is a gamma exponent, usually between 0.9 (dark) and 0.6 (bright).
    pub fn new(brightness: f64) -> Self {
        let mut rgb = Vec::with_capacity(65536);
        for hs in 0..512 {
            let hue = (hs / 8) as f64 / 64.0 + 0.0078125;
            let saturation = (hs & 7) as f64 / 8.0 + 0.0625;
            for l in 0..128 {
                let lightness = l as f64 / 128.0;
                let (mut r, mut g, mut b) = (lightness, lightness, lightness);
                if saturation != 0.0 {
                    let q = if lightness < 0.5 {
                        lightness * (1.0 + saturation)
                    } else {
                        lightness + saturation - lightness * saturation
                    };
                    let p = 2.0 * lightness - q;
                    let mut hr = hue + 1.0 / 3.0;
                    if hr > 1.0 {
                        hr -= 1.0;
                    }
                    let mut hb = hue - 1.0 / 3.0;
                    if hb < 0.0 {
                        hb += 1.0;
                    }
                    r = channel(p, q, hr);
                    g = channel(p, q, hue);
                    b = channel(p, q, hb);
                }
                let packed = ((r * 256.0) as u32) << 16 | ((g * 256.0) as u32) << 8 | (b * 256.0) as u32;
                rgb.push(gamma(packed, brightness));
            }
        }
        Self { rgb }
    }

    /// RGB for an HSL16 colour. Only the low 16 bits are used.
    #[inline]
    pub fn rgb(&self, hsl: i32) -> u32 {
        self.rgb[(hsl & 0xffff) as usize]
    }

    pub fn len(&self) -> usize {
        self.rgb.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rgb.is_empty()
    }
}

fn channel(p: f64, q: f64, t: f64) -> f64 {
    if 6.0 * t < 1.0 {
        p + (q - p) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        q
    } else if 3.0 * t < 2.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn gamma(rgb: u32, exponent: f64) -> u32 {
    let adjust = |c: u32| ((c as f64 / 256.0).powf(exponent) * 256.0) as u32;
    adjust(rgb >> 16) << 16 | adjust((rgb >> 8) & 0xff) << 8 | adjust(rgb & 0xff)
}
