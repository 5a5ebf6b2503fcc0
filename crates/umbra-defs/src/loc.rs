use crate::config::LocDef;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WallKind {
    Straight,
    DiagonalCorner,
    L,
    SquareCorner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DecorKind {
    StraightNoOffset,
    StraightOffset,
    DiagonalOffset,
    DiagonalNoOffset,
    DiagonalBoth,
}

/// Placement geometry of a loc, from its 0..=22 shape id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LocShape {
    Wall(WallKind),
    WallDecor(DecorKind),
    WallDiagonal,
    Centrepiece { diagonal: bool },
    /// Roof pieces and roof edges keep their raw id (12..=21).
    Roof(u8),
    GroundDecor,
}

impl LocShape {
    pub const WALL_STRAIGHT: u8 = 0;
    pub const WALL_DECOR_STRAIGHT_NOOFFSET: u8 = 4;
    pub const CENTREPIECE_STRAIGHT: u8 = 10;
    pub const GROUND_DECOR: u8 = 22;

    pub fn from_id(id: u8) -> Option<Self> {
        Some(match id {
            0 => LocShape::Wall(WallKind::Straight),
            1 => LocShape::Wall(WallKind::DiagonalCorner),
            2 => LocShape::Wall(WallKind::L),
            3 => LocShape::Wall(WallKind::SquareCorner),
            4 => LocShape::WallDecor(DecorKind::StraightNoOffset),
            5 => LocShape::WallDecor(DecorKind::StraightOffset),
            6 => LocShape::WallDecor(DecorKind::DiagonalOffset),
            7 => LocShape::WallDecor(DecorKind::DiagonalNoOffset),
            8 => LocShape::WallDecor(DecorKind::DiagonalBoth),
            9 => LocShape::WallDiagonal,
            10 => LocShape::Centrepiece { diagonal: false },
            11 => LocShape::Centrepiece { diagonal: true },
            12..=21 => LocShape::Roof(id),
            22 => LocShape::GroundDecor,
            _ => return None,
        })
    }

    pub fn id(self) -> u8 {
        match self {
            LocShape::Wall(WallKind::Straight) => 0,
            LocShape::Wall(WallKind::DiagonalCorner) => 1,
            LocShape::Wall(WallKind::L) => 2,
            LocShape::Wall(WallKind::SquareCorner) => 3,
            LocShape::WallDecor(DecorKind::StraightNoOffset) => 4,
            LocShape::WallDecor(DecorKind::StraightOffset) => 5,
            LocShape::WallDecor(DecorKind::DiagonalOffset) => 6,
            LocShape::WallDecor(DecorKind::DiagonalNoOffset) => 7,
            LocShape::WallDecor(DecorKind::DiagonalBoth) => 8,
            LocShape::WallDiagonal => 9,
            LocShape::Centrepiece { diagonal } => 10 + diagonal as u8,
            LocShape::Roof(id) => id,
            LocShape::GroundDecor => 22,
        }
    }
}

/// Compiled scenery definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocType {
    pub id: u32,
    pub name: String,
    pub models: Vec<i32>,
    pub shapes: Option<Vec<u8>>,
    pub recolours: Vec<(i32, i32)>,
    pub width: i32,
    pub length: i32,
    pub blockwalk: bool,
    pub blockrange: bool,
    pub active: bool,
    pub hillskew: bool,
    pub sharelight: bool,
    pub occlude: bool,
    pub anim: Option<i32>,
    pub wallwidth: i32,
    pub ambient: i32,
    pub contrast: i32,
    pub mirror: bool,
    pub shadow: bool,
    pub resize: [i32; 3],
    pub offset: [i32; 3],
    pub forcedecor: bool,
}

impl Default for LocType {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            models: Vec::new(),
            shapes: None,
            recolours: Vec::new(),
            width: 1,
            length: 1,
            blockwalk: true,
            blockrange: true,
            active: false,
            hillskew: false,
            sharelight: false,
            occlude: false,
            anim: None,
            wallwidth: 16,
            ambient: 0,
            contrast: 0,
            mirror: false,
            shadow: true,
            resize: [128, 128, 128],
            offset: [0, 0, 0],
            forcedecor: false,
        }
    }
}

impl LocType {
    pub fn from_def(def: LocDef) -> Self {
        let d = LocType::default();
        // interactive unless told otherwise when the loc is a plain centrepiece
        let active = def.active.unwrap_or_else(|| {
            !def.models.is_empty()
                && def
                    .shapes
                    .as_ref()
                    .is_none_or(|s| s.first() == Some(&LocShape::CENTREPIECE_STRAIGHT))
        });
        Self {
            id: def.id,
            name: def.name.unwrap_or_default(),
            models: def.models,
            shapes: def.shapes,
            recolours: def.recolours.into_iter().map(|[s, d]| (s, d)).collect(),
            width: def.width.unwrap_or(d.width),
            length: def.length.unwrap_or(d.length),
            blockwalk: def.blockwalk.unwrap_or(d.blockwalk),
            blockrange: def.blockrange.unwrap_or(d.blockrange),
            active,
            hillskew: def.hillskew.unwrap_or(d.hillskew),
            sharelight: def.sharelight.unwrap_or(d.sharelight),
            occlude: def.occlude.unwrap_or(d.occlude),
            anim: def.anim.filter(|&a| a >= 0),
            wallwidth: def.wallwidth.unwrap_or(d.wallwidth),
            ambient: def.ambient.unwrap_or(d.ambient),
            contrast: def.contrast.unwrap_or(d.contrast),
            mirror: def.mirror.unwrap_or(d.mirror),
            shadow: def.shadow.unwrap_or(d.shadow),
            resize: def.resize.unwrap_or(d.resize),
            offset: def.offset.unwrap_or(d.offset),
            forcedecor: def.forcedecor.unwrap_or(d.forcedecor),
        }
    }

    /// Index into `models` used for `shape`, or `None` if the loc has no model
    /// for it. Locs without a shape list only have centrepiece models.
    pub fn shape_index(&self, shape: u8) -> Option<usize> {
        match &self.shapes {
            None => (shape == LocShape::CENTREPIECE_STRAIGHT).then_some(0),
            Some(shapes) => shapes.iter().position(|&s| s == shape),
        }
    }

    /// Base model ids for `shape`: every model when no shape list is declared,
    /// otherwise the single model at the shape's index.
    pub fn base_models(&self, shape: u8) -> Option<&[i32]> {
        match &self.shapes {
            None if shape == LocShape::CENTREPIECE_STRAIGHT => Some(&self.models),
            None => None,
            Some(_) => {
                let index = self.shape_index(shape)?;
                self.models.get(index..index + 1)
            }
        }
    }

    #[inline]
    pub fn needs_resize(&self) -> bool {
        self.resize != [128, 128, 128]
    }

    #[inline]
    pub fn needs_offset(&self) -> bool {
        self.offset != [0, 0, 0]
    }
}
