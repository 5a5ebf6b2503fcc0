use std::path::Path;
use std::sync::Arc;

use image::{ImageError, Rgba, RgbaImage};
use umbra_raster::{Canvas, FillError, FillState, Palette, TextureSpace};

/// RGB pixel buffer filled by edge functions.
pub struct Framebuffer {
    pub width: i32,
    pub height: i32,
    pub pixels: Vec<u32>,
    palette: Arc<Palette>,
}

impl Framebuffer {
    pub fn new(width: i32, height: i32, palette: Arc<Palette>) -> Self {
        let len = (width.max(0) * height.max(0)) as usize;
        Self {
            width,
            height,
            pixels: vec![0; len],
            palette,
        }
    }

    pub fn clear(&mut self, rgb: u32) {
        self.pixels.fill(rgb);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<u32> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get((y * self.width + x) as usize).copied()
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width.max(0) as u32, self.height.max(0) as u32, |x, y| {
            let rgb = self.pixels[(y * self.width as u32 + x) as usize];
            Rgba([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xff])
        })
    }

    /// Encodes by file extension.
    pub fn save(&self, path: &Path) -> Result<(), ImageError> {
        self.to_image().save(path)
    }

    /// Fills `(x, y)` with `shade` evaluated from barycentric weights.
    fn fill(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        state: FillState,
        shade: impl Fn(i64, i64, i64, i64) -> u32,
    ) -> Result<(), FillError> {
        if !state.hclip {
            if let Some(i) = (0..3).find(|&i| x[i] < 0 || x[i] >= self.width) {
                return Err(FillError::OutOfBounds { x: x[i], y: y[i] });
            }
        }
        let [x0, x1, x2] = x.map(i64::from);
        let [y0, y1, y2] = y.map(i64::from);
        let area = (x1 - x0) * (y2 - y0) - (x2 - x0) * (y1 - y0);
        if area == 0 {
            return Ok(());
        }
        let min_x = x0.min(x1).min(x2).max(0);
        let max_x = x0.max(x1).max(x2).min(self.width as i64 - 1);
        let min_y = y0.min(y1).min(y2).max(0);
        let max_y = y0.max(y1).max(y2).min(self.height as i64 - 1);
        let sign = area.signum();
        let alpha = state.alpha.clamp(0, 255) as u32;
        for py in min_y..=max_y {
            for px in min_x..=max_x {
                let w0 = ((x2 - x1) * (py - y1) - (y2 - y1) * (px - x1)) * sign;
                let w1 = ((x0 - x2) * (py - y2) - (y0 - y2) * (px - x2)) * sign;
                let w2 = ((x1 - x0) * (py - y0) - (y1 - y0) * (px - x0)) * sign;
                if w0 < 0 || w1 < 0 || w2 < 0 {
                    continue;
                }
                let rgb = shade(w0, w1, w2, area.abs());
                let i = (py * self.width as i64 + px) as usize;
                self.pixels[i] = blend(rgb, self.pixels[i], alpha);
            }
        }
        Ok(())
    }
}

/// `alpha` of 0 keeps `src` unchanged; 255 keeps nearly all of `dst`.
fn blend(src: u32, dst: u32, alpha: u32) -> u32 {
    if alpha == 0 {
        return src;
    }
    let keep = 256 - alpha;
    let rb = ((src & 0xff00ff) * keep + (dst & 0xff00ff) * alpha) >> 8 & 0xff00ff;
    let g = ((src & 0xff00) * keep + (dst & 0xff00) * alpha) >> 8 & 0xff00;
    rb | g
}

fn lerp_hsl(hsl: [i32; 3], w0: i64, w1: i64, w2: i64, area: i64) -> i32 {
    let [a, b, c] = hsl.map(i64::from);
    ((a * w0 + b * w1 + c * w2) / area) as i32
}

/// Textured faces are a flat stand-in: they are shaded by lightness alone and
/// the texture id is ignored.
impl Canvas for Framebuffer {
    fn flat_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        rgb: u32,
        state: FillState,
    ) -> Result<(), FillError> {
        self.fill(x, y, state, |_, _, _, _| rgb)
    }

    fn gouraud_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        hsl: [i32; 3],
        state: FillState,
    ) -> Result<(), FillError> {
        let palette = self.palette.clone();
        self.fill(x, y, state, |w0, w1, w2, area| {
            palette.rgb(lerp_hsl(hsl, w0, w1, w2, area))
        })
    }

    fn textured_triangle(
        &mut self,
        x: [i32; 3],
        y: [i32; 3],
        hsl: [i32; 3],
        _space: TextureSpace,
        _texture: i32,
        state: FillState,
    ) -> Result<(), FillError> {
        // textured colours carry lightness alone
        let lightness = hsl.map(|l| l.clamp(0, 127));
        self.gouraud_triangle(x, y, lightness, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn framebuffer() -> Framebuffer {
        Framebuffer::new(8, 8, Arc::new(Palette::new(0.8)))
    }

    #[test]
    fn flat_triangle_covers_its_interior() {
        let mut fb = framebuffer();
        let state = FillState::default();
        fb.flat_triangle([0, 0, 7], [0, 7, 0], 0xff0000, state).unwrap();
        assert_eq!(fb.pixel(1, 1), Some(0xff0000));
        assert_eq!(fb.pixel(0, 0), Some(0xff0000));
        assert_eq!(fb.pixel(7, 7), Some(0));
    }

    #[test]
    fn unclipped_fill_outside_the_target_fails() {
        let mut fb = framebuffer();
        let err = fb
            .flat_triangle([0, 0, 20], [0, 7, 0], 1, FillState::default())
            .unwrap_err();
        assert_eq!(err, FillError::OutOfBounds { x: 20, y: 0 });
        let clipped = FillState {
            hclip: true,
            alpha: 0,
        };
        assert!(fb.flat_triangle([0, 0, 20], [0, 7, 0], 1, clipped).is_ok());
        assert_eq!(fb.pixel(7, 0), Some(1));
    }

    #[test]
    fn alpha_mixes_with_what_is_below() {
        let mut fb = framebuffer();
        fb.clear(0x0000ff);
        let state = FillState {
            hclip: false,
            alpha: 128,
        };
        fb.flat_triangle([0, 0, 7], [0, 7, 0], 0xff0000, state).unwrap();
        assert_eq!(fb.pixel(0, 0), Some(0x7f_00_7f));
    }

    #[test]
    fn gouraud_uses_the_palette() {
        let palette = Arc::new(Palette::new(0.8));
        let mut fb = Framebuffer::new(8, 8, palette.clone());
        fb.gouraud_triangle([0, 0, 7], [0, 7, 0], [0x40; 3], FillState::default())
            .unwrap();
        assert_eq!(fb.pixel(1, 1), Some(palette.rgb(0x40)));
    }

    #[test]
    fn textured_fill_ignores_the_texture_id() {
        let space = TextureSpace::default();
        let mut a = framebuffer();
        let mut b = framebuffer();
        a.textured_triangle([0, 0, 7], [0, 7, 0], [40; 3], space, 0, FillState::default())
            .unwrap();
        b.textured_triangle([0, 0, 7], [0, 7, 0], [40; 3], space, 99, FillState::default())
            .unwrap();
        assert_eq!(a.pixels, b.pixels);
        assert_eq!(a.pixel(1, 1), Some(a.palette.rgb(40)));
    }

    #[test]
    fn image_keeps_pixel_channels() {
        let mut fb = Framebuffer::new(2, 1, Arc::new(Palette::new(0.8)));
        fb.pixels = vec![0x010203, 0x040506];
        let img = fb.to_image();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(0, 0), &Rgba([1, 2, 3, 0xff]));
        assert_eq!(img.get_pixel(1, 0), &Rgba([4, 5, 6, 0xff]));
    }

    #[test]
    fn saved_png_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        let mut fb = Framebuffer::new(3, 2, Arc::new(Palette::new(0.8)));
        fb.clear(0x102030);
        fb.pixels[5] = 0xabcdef;
        fb.save(&path).unwrap();

        let back = image::open(&path).unwrap().to_rgba8();
        assert_eq!(back.dimensions(), (3, 2));
        assert_eq!(back.get_pixel(0, 0), &Rgba([0x10, 0x20, 0x30, 0xff]));
        assert_eq!(back.get_pixel(2, 1), &Rgba([0xab, 0xcd, 0xef, 0xff]));
    }
}
