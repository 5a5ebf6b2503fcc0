//! Fixed-point trig tables and small integer geometry types shared by the engine crates.
#![forbid(unsafe_code)]

use core::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::sync::OnceLock;

/// Number of steps in a full turn. Angles are `0..2048`.
pub const ANGLE_STEPS: usize = 2048;
pub const ANGLE_MASK: i32 = ANGLE_STEPS as i32 - 1;

/// Radians per angle step (2π / 2048), truncated the same way the lookup tables always were.
const RADIANS_PER_STEP: f64 = 0.0030679615;

struct TrigTables {
    sin: [i32; ANGLE_STEPS],
    cos: [i32; ANGLE_STEPS],
    reciprocal16: [i32; ANGLE_STEPS],
}

fn build_tables() -> TrigTables {
    let mut sin = [0i32; ANGLE_STEPS];
    let mut cos = [0i32; ANGLE_STEPS];
    let mut reciprocal16 = [0i32; ANGLE_STEPS];
    for i in 0..ANGLE_STEPS {
        let r = i as f64 * RADIANS_PER_STEP;
        sin[i] = (65536.0 * r.sin()) as i32;
        cos[i] = (65536.0 * r.cos()) as i32;
    }
    for (i, slot) in reciprocal16.iter_mut().enumerate().skip(1) {
        *slot = 65536 / i as i32;
    }
    TrigTables {
        sin,
        cos,
        reciprocal16,
    }
}

#[inline]
fn tables() -> &'static TrigTables {
    static TABLES: OnceLock<TrigTables> = OnceLock::new();
    TABLES.get_or_init(build_tables)
}

/// 16.16 fixed-point sine of a 2048-step angle.
#[inline]
pub fn sin(angle: i32) -> i32 {
    tables().sin[(angle & ANGLE_MASK) as usize]
}

/// 16.16 fixed-point cosine of a 2048-step angle.
#[inline]
pub fn cos(angle: i32) -> i32 {
    tables().cos[(angle & ANGLE_MASK) as usize]
}

/// `65536 / n` for `n` in `1..2048`; zero for anything else.
#[inline]
pub fn reciprocal16(n: i32) -> i32 {
    if n <= 0 || n as usize >= ANGLE_STEPS {
        return 0;
    }
    tables().reciprocal16[n as usize]
}

/// Integer square root with the truncation the fixed-point math expects.
#[inline]
pub fn isqrt(v: i32) -> i32 {
    if v <= 0 {
        return 0;
    }
    (v as f64).sqrt() as i32
}

/// Rotates `(a, b)` by a precomputed sine/cosine pair, returning `(a', b')` where
/// `a' = (b*sin + a*cos) >> 16` and `b' = (b*cos - a*sin) >> 16`.
#[inline]
pub fn rotate_pair(a: i32, b: i32, sin: i32, cos: i32) -> (i32, i32) {
    ((b * sin + a * cos) >> 16, (b * cos - a * sin) >> 16)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
pub struct IVec3 {
    #[cfg_attr(test, proptest(strategy = "-256i32..=256"))]
    pub x: i32,
    #[cfg_attr(test, proptest(strategy = "-256i32..=256"))]
    pub y: i32,
    #[cfg_attr(test, proptest(strategy = "-256i32..=256"))]
    pub z: i32,
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3 { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Wraps on overflow like the rest of the fixed-point math.
    #[inline]
    pub fn dot(self, rhs: IVec3) -> i32 {
        self.x
            .wrapping_mul(rhs.x)
            .wrapping_add(self.y.wrapping_mul(rhs.y))
            .wrapping_add(self.z.wrapping_mul(rhs.z))
    }

    /// Wraps on overflow; callers shrink the result before normalizing.
    #[inline]
    pub fn cross(self, rhs: IVec3) -> IVec3 {
        IVec3 {
            x: self.y.wrapping_mul(rhs.z).wrapping_sub(rhs.y.wrapping_mul(self.z)),
            y: self.z.wrapping_mul(rhs.x).wrapping_sub(rhs.z.wrapping_mul(self.x)),
            z: self.x.wrapping_mul(rhs.y).wrapping_sub(rhs.x.wrapping_mul(self.y)),
        }
    }

    #[inline]
    pub fn length(self) -> i32 {
        isqrt(self.dot(self))
    }

    /// Halves every component until all of them fit in `-limit..=limit`.
    pub fn shrink_to(mut self, limit: i32) -> IVec3 {
        while self.x > limit
            || self.y > limit
            || self.z > limit
            || self.x < -limit
            || self.y < -limit
            || self.z < -limit
        {
            self.x >>= 1;
            self.y >>= 1;
            self.z >>= 1;
        }
        self
    }

    /// Scales to `length` using integer division; a zero vector stays zero.
    pub fn with_length(self, length: i32) -> IVec3 {
        let mut len = self.length();
        if len <= 0 {
            len = 1;
        }
        IVec3 {
            x: self.x * length / len,
            y: self.y * length / len,
            z: self.z * length / len,
        }
    }
}

impl Add for IVec3 {
    type Output = IVec3;
    #[inline]
    fn add(self, rhs: IVec3) -> IVec3 {
        IVec3::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }
}

impl AddAssign for IVec3 {
    #[inline]
    fn add_assign(&mut self, rhs: IVec3) {
        *self = *self + rhs;
    }
}

impl Sub for IVec3 {
    type Output = IVec3;
    #[inline]
    fn sub(self, rhs: IVec3) -> IVec3 {
        IVec3::new(
            self.x.wrapping_sub(rhs.x),
            self.y.wrapping_sub(rhs.y),
            self.z.wrapping_sub(rhs.z),
        )
    }
}

impl SubAssign for IVec3 {
    #[inline]
    fn sub_assign(&mut self, rhs: IVec3) {
        *self = *self - rhs;
    }
}

impl Neg for IVec3 {
    type Output = IVec3;
    #[inline]
    fn neg(self) -> IVec3 {
        IVec3::new(-self.x, -self.y, -self.z)
    }
}
