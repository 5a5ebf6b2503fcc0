use proptest::prelude::*;
use umbra_raster::{ClipVertex, NEAR_Z, clip_near_face};

fn corner(x: i32, y: i32, z: i32) -> ClipVertex {
    let (screen_x, screen_y) = if z >= NEAR_Z {
        ((x << 9) / z, (y << 9) / z)
    } else {
        (-5000, -5000)
    };
    ClipVertex {
        screen_x,
        screen_y,
        view_x: x,
        view_y: y,
        view_z: z,
        colour: 0,
    }
}

proptest! {
    // one corner behind the near plane: the quad's fan triangles face the same way
    #[test]
    fn single_behind_corner_gives_consistent_quad(
        ax in -50i32..50, ay in 200i32..400, az in 0i32..40,
        bx in -300i32..-150, by in -100i32..100, bz in 200i32..600,
        cx in 150i32..300, cy in -100i32..100, cz in 200i32..600,
        rotate in 0usize..3,
    ) {
        let mut corners = [corner(ax, ay, az), corner(bx, by, bz), corner(cx, cy, cz)];
        corners.rotate_left(rotate);
        let poly = clip_near_face(corners, 256, 256);
        prop_assert_eq!(poly.len, 4);
        let first = poly.winding(0, 1, 2);
        let second = poly.winding(0, 2, 3);
        prop_assert!(first != 0 && second != 0);
        prop_assert_eq!(first > 0, second > 0);
    }

    // the clipped polygon never has a corner nearer than the plane allows
    #[test]
    fn clipped_colours_stay_between_endpoints(
        az in 0i32..50, bz in 50i32..1000, cz in 50i32..1000,
        ca in 0i32..0xffff, cb in 0i32..0xffff, cc in 0i32..0xffff,
    ) {
        let mut corners = [corner(0, 0, az), corner(-200, 100, bz), corner(200, 100, cz)];
        corners[0].colour = ca;
        corners[1].colour = cb;
        corners[2].colour = cc;
        let poly = clip_near_face(corners, 0, 0);
        let lo = ca.min(cb).min(cc);
        let hi = ca.max(cb).max(cc);
        for &c in &poly.colour[..poly.len] {
            prop_assert!(c >= lo && c <= hi);
        }
    }
}
