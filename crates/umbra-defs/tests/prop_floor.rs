use proptest::prelude::*;
use umbra_defs::FloorType;

proptest! {
    // blend inputs stay in their 8-bit ranges and never divide by zero
    #[test]
    fn colour_terms_stay_in_range(rgb in 0u32..=0xffffff) {
        let f = FloorType::from_rgb(0, rgb);
        prop_assert!((0..=255).contains(&f.saturation));
        prop_assert!((0..=255).contains(&f.lightness));
        prop_assert!(f.luminance >= 1);
    }

    #[test]
    fn greys_have_no_hue(v in 0u32..=255) {
        let f = FloorType::from_rgb(0, v << 16 | v << 8 | v);
        prop_assert_eq!(f.hue, 0);
        prop_assert_eq!(f.saturation, 0);
        prop_assert_eq!(f.chroma, 0);
        prop_assert_eq!(f.luminance, 1);
    }
}
