use umbra_geom::{cos, sin};

/// Draw target geometry. The projection centre is the middle of the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
    pub centre_x: i32,
    pub centre_y: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            centre_x: width / 2,
            centre_y: height / 2,
        }
    }

    /// Rightmost column a fill can touch without horizontal clipping.
    #[inline]
    pub fn safe_width(&self) -> i32 {
        self.width - 1
    }

    #[inline]
    pub fn needs_hclip(&self, xs: &[i32]) -> bool {
        let safe = self.safe_width();
        xs.iter().any(|&x| x < 0 || x > safe)
    }
}

/// Camera orientation as 16.16 sine/cosine pairs of 2048-step angles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Camera {
    pub sin_pitch: i32,
    pub cos_pitch: i32,
    pub sin_yaw: i32,
    pub cos_yaw: i32,
}

impl Camera {
    pub fn new(pitch: i32, yaw: i32) -> Self {
        Self {
            sin_pitch: sin(pitch),
            cos_pitch: cos(pitch),
            sin_yaw: sin(yaw),
            cos_yaw: cos(yaw),
        }
    }
}
