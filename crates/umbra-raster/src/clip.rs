use umbra_geom::reciprocal16;

/// View-space depth of the near plane.
pub const NEAR_Z: i32 = 50;

/// One triangle corner as the clipper sees it. Screen coordinates are only
/// read for corners at or beyond the near plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClipVertex {
    pub screen_x: i32,
    pub screen_y: i32,
    pub view_x: i32,
    pub view_y: i32,
    pub view_z: i32,
    pub colour: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClippedPolygon {
    pub len: usize,
    pub x: [i32; 4],
    pub y: [i32; 4],
    pub colour: [i32; 4],
}

impl ClippedPolygon {
    fn push(&mut self, x: i32, y: i32, colour: i32) {
        // a triangle crosses the plane on at most two edges
        if self.len < 4 {
            self.x[self.len] = x;
            self.y[self.len] = y;
            self.colour[self.len] = colour;
            self.len += 1;
        }
    }

    /// Signed screen area of the corners `(i, j, k)`; positive is front-facing.
    pub fn winding(&self, i: usize, j: usize, k: usize) -> i32 {
        let (x, y) = (&self.x, &self.y);
        (x[i] - x[j])
            .wrapping_mul(y[k] - y[j])
            .wrapping_sub((y[i] - y[j]).wrapping_mul(x[k] - x[j]))
    }

    /// Fan triangles `(0, 1, 2)` and, for quads, `(0, 2, 3)`.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> {
        let count = self.len.saturating_sub(2);
        [[0, 1, 2], [0, 2, 3]].into_iter().take(count)
    }
}

/// Clips a triangle against `z = NEAR_Z`, walking corners `a, b, c` and
/// interpolating position and colour along each edge that crosses the
/// plane. Crossings are projected onto the plane itself.
pub fn clip_near_face(corners: [ClipVertex; 3], centre_x: i32, centre_y: i32) -> ClippedPolygon {
    let mut poly = ClippedPolygon::default();
    // each corner is followed by the two edges leaving it, in draw order
    const WALK: [(usize, usize, usize); 3] = [(0, 2, 1), (1, 0, 2), (2, 1, 0)];
    for (current, first, second) in WALK {
        let from = corners[current];
        if from.view_z >= NEAR_Z {
            poly.push(from.screen_x, from.screen_y, from.colour);
            continue;
        }
        for to in [corners[first], corners[second]] {
            if to.view_z < NEAR_Z {
                continue;
            }
            let scalar = (NEAR_Z - from.view_z).wrapping_mul(reciprocal16(to.view_z - from.view_z));
            let lerp = |a: i32, b: i32| a + ((b - a).wrapping_mul(scalar) >> 16);
            let x = lerp(from.view_x, to.view_x);
            let y = lerp(from.view_y, to.view_y);
            poly.push(
                centre_x + (x << 9) / NEAR_Z,
                centre_y + (y << 9) / NEAR_Z,
                lerp(from.colour, to.colour),
            );
        }
    }
    poly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corner(x: i32, y: i32, z: i32, colour: i32) -> ClipVertex {
        let project = |v: i32| if z >= NEAR_Z { (v << 9) / z } else { -5000 };
        ClipVertex {
            screen_x: project(x),
            screen_y: project(y),
            view_x: x,
            view_y: y,
            view_z: z,
            colour,
        }
    }

    #[test]
    fn all_in_front_passes_through() {
        let p = clip_near_face(
            [corner(0, 0, 100, 1), corner(100, 0, 100, 2), corner(0, 100, 100, 3)],
            0,
            0,
        );
        assert_eq!(p.len, 3);
        assert_eq!(p.x, [0, 512, 0, 0]);
        assert_eq!(p.colour, [1, 2, 3, 0]);
    }

    #[test]
    fn two_behind_leaves_a_triangle() {
        let p = clip_near_face(
            [corner(0, 0, 0, 0), corner(100, 0, 0, 0), corner(0, 0, 128, 128)],
            0,
            0,
        );
        assert_eq!(p.len, 3);
        // both crossings sit 50/128 of the way towards c
        assert_eq!(p.colour, [50, 50, 128, 0]);
        assert_eq!(p.triangles().count(), 1);
    }

    #[test]
    fn one_behind_makes_a_quad() {
        let p = clip_near_face(
            [corner(0, 0, 0, 0), corner(100, 0, 128, 128), corner(0, 100, 128, 64)],
            0,
            0,
        );
        assert_eq!(p.len, 4);
        assert_eq!(p.triangles().collect::<Vec<_>>(), vec![[0, 1, 2], [0, 2, 3]]);
        assert_eq!(p.colour, [25, 50, 128, 64]);
        assert_eq!((p.x[2], p.y[3]), (400, 400));
    }

    #[test]
    fn fully_behind_is_empty() {
        let p = clip_near_face(
            [corner(0, 0, 10, 0), corner(10, 0, 10, 0), corner(0, 10, 10, 0)],
            0,
            0,
        );
        assert_eq!(p.len, 0);
        assert_eq!(p.triangles().count(), 0);
    }
}
