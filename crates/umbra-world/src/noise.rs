//! Deterministic terrain height noise. All arithmetic wraps at 32 bits.

use umbra_geom::cos;

/// Pseudo-random byte for a lattice point.
#[inline]
pub fn noise(x: i32, y: i32) -> i32 {
    let mut n = x.wrapping_add(y.wrapping_mul(57));
    n = (n << 13) ^ n;
    let h = n
        .wrapping_mul(
            n.wrapping_mul(n)
                .wrapping_mul(15731)
                .wrapping_add(789_221),
        )
        .wrapping_add(1_376_312_589)
        & 0x7fff_ffff;
    (h >> 19) & 0xff
}

/// Lattice noise blurred over its eight neighbours.
pub fn smooth_noise(x: i32, y: i32) -> i32 {
    let corners = noise(x - 1, y - 1) + noise(x + 1, y - 1) + noise(x - 1, y + 1) + noise(x + 1, y + 1);
    let sides = noise(x - 1, y) + noise(x + 1, y) + noise(x, y - 1) + noise(x, y + 1);
    let centre = noise(x, y);
    corners / 16 + sides / 8 + centre / 4
}

/// Cosine interpolation between `a` and `b`; `x` is the offset within a cell of `scale`.
#[inline]
pub fn interpolate(a: i32, b: i32, x: i32, scale: i32) -> i32 {
    let f = (65536 - cos(x * 1024 / scale)) >> 1;
    ((a * (65536 - f)) >> 16) + ((b * f) >> 16)
}

/// Smooth noise sampled on a lattice of cell size `scale` (a power of two).
pub fn interpolated_noise(x: i32, z: i32, scale: i32) -> i32 {
    let ix = x / scale;
    let fx = x & (scale - 1);
    let iz = z / scale;
    let fz = z & (scale - 1);
    let sw = smooth_noise(ix, iz);
    let se = smooth_noise(ix + 1, iz);
    let nw = smooth_noise(ix, iz + 1);
    let ne = smooth_noise(ix + 1, iz + 1);
    let south = interpolate(sw, se, fx, scale);
    let north = interpolate(nw, ne, fx, scale);
    interpolate(south, north, fz, scale)
}

/// Three octaves of interpolated noise mapped to a height step in `10..=60`.
pub fn perlin_noise(x: i32, z: i32) -> i32 {
    let v = (interpolated_noise(x + 45365, z + 91923, 4) - 128)
        + ((interpolated_noise(x + 10294, z + 37821, 2) - 128) >> 1)
        + ((interpolated_noise(x, z, 1) - 128) >> 2);
    let v = (v as f64 * 0.3) as i32 + 35;
    v.clamp(10, 60)
}
