//! Packed HSL16 helpers: 6 bits hue, 3 bits saturation, 7 bits lightness.

/// Colour value the terrain uses for "draw nothing".
pub const HIDDEN_COLOUR: i32 = 12_345_678;

/// Packs 8-bit hue/saturation/lightness into HSL16, desaturating very light colours.
pub fn hsl24_to_16(hue: i32, mut saturation: i32, lightness: i32) -> i32 {
    if lightness > 179 {
        saturation /= 2;
    }
    if lightness > 192 {
        saturation /= 2;
    }
    if lightness > 217 {
        saturation /= 2;
    }
    if lightness > 243 {
        saturation /= 2;
    }
    ((hue / 4) << 10) + ((saturation / 32) << 7) + lightness / 2
}

/// Model face shading. Textured faces (`info & 2`) store an inverted
/// lightness in place of a colour.
#[inline]
pub fn mul_colour_lightness(hsl: i32, scalar: i32, info: i32) -> i32 {
    if info & 2 == 2 {
        return 127 - scalar.clamp(0, 127);
    }
    let scalar = (scalar * (hsl & 0x7f)) >> 7;
    (hsl & 0xff80) + scalar.clamp(2, 126)
}

/// Terrain underlay shading; `-1` means the tile has no colour.
#[inline]
pub fn mul_hsl(hsl: i32, lightness: i32) -> i32 {
    if hsl == -1 {
        return HIDDEN_COLOUR;
    }
    let lightness = (lightness * (hsl & 0x7f)) / 128;
    (hsl & 0xff80) + lightness.clamp(2, 126)
}

/// Terrain overlay shading. `-2` hides the tile, `-1` marks a textured overlay.
#[inline]
pub fn adjust_lightness(hsl: i32, lightness: i32) -> i32 {
    match hsl {
        -2 => HIDDEN_COLOUR,
        -1 => 127 - lightness.clamp(0, 127),
        _ => {
            let lightness = (lightness * (hsl & 0x7f)) / 128;
            (hsl & 0xff80) + lightness.clamp(2, 126)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lightness_is_clamped_into_visible_range() {
        assert_eq!(mul_colour_lightness(0x1234 | 0x7f, 1000, 0), (0x1234 & 0xff80) + 126);
        assert_eq!(mul_colour_lightness(0x1280, 64, 0), 0x1280 + 2);
        assert_eq!(mul_colour_lightness(0x0040, 128, 0), 64);
    }

    #[test]
    fn textured_faces_invert_lightness() {
        assert_eq!(mul_colour_lightness(55, 200, 2), 0);
        assert_eq!(mul_colour_lightness(55, -4, 3), 127);
        assert_eq!(mul_colour_lightness(55, 27, 2), 100);
    }

    #[test]
    fn very_light_colours_lose_saturation() {
        assert_eq!(hsl24_to_16(128, 255, 100), (32 << 10) + (7 << 7) + 50);
        // four halvings: 255 -> 15
        assert_eq!(hsl24_to_16(0, 255, 250), 125);
    }

    #[test]
    fn terrain_sentinels() {
        assert_eq!(mul_hsl(-1, 96), HIDDEN_COLOUR);
        assert_eq!(adjust_lightness(-2, 96), HIDDEN_COLOUR);
        assert_eq!(adjust_lightness(-1, 96), 31);
        assert_eq!(adjust_lightness(0x407f, 128), 0x4000 + 126);
    }
}
