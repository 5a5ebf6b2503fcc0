use umbra_model::Packet;

use crate::error::WorldError;
use crate::noise::perlin_noise;
use crate::tiles::LEVELS;
use crate::{MAPSQUARE_SIZE, World};

/// Height step between levels when no explicit height is given.
pub const LEVEL_HEIGHT: i32 = 240;

impl World {
    /// Reads one mapsquare's terrain stream, placing it at `(x_off, z_off)` in the
    /// region. `origin_x`/`origin_z` are the region's absolute tile origin and seed
    /// the height noise. Tiles falling outside the region are parsed and dropped.
    pub fn load_ground(
        &mut self,
        origin_x: i32,
        origin_z: i32,
        x_off: i32,
        z_off: i32,
        bytes: &[u8],
    ) -> Result<(), WorldError> {
        let mut buf = Packet::new(bytes);
        for level in 0..LEVELS {
            for x in 0..MAPSQUARE_SIZE {
                for z in 0..MAPSQUARE_SIZE {
                    let stx = x + x_off;
                    let stz = z + z_off;
                    if stx >= 0
                        && stz >= 0
                        && (stx as usize) < self.size_x()
                        && (stz as usize) < self.size_z()
                    {
                        self.read_tile(&mut buf, level, stx as usize, stz as usize, origin_x, origin_z)?;
                    } else {
                        skip_tile(&mut buf)?;
                    }
                }
            }
        }
        log::debug!(
            "loaded ground at ({}, {}), {} of {} bytes used",
            x_off,
            z_off,
            buf.pos,
            bytes.len()
        );
        Ok(())
    }

    fn read_tile(
        &mut self,
        buf: &mut Packet<'_>,
        level: usize,
        x: usize,
        z: usize,
        origin_x: i32,
        origin_z: i32,
    ) -> Result<(), WorldError> {
        let below = if level > 0 {
            Some(self.tiles.height(level - 1, x, z))
        } else {
            None
        };
        let tile = self.tiles.get_mut(level, x, z);
        tile.flags = 0;
        loop {
            let opcode = buf.g1()?;
            match opcode {
                0 => {
                    tile.height = match below {
                        None => {
                            -perlin_noise(x as i32 + origin_x + 932_731, z as i32 + origin_z + 556_238) * 8
                        }
                        Some(h) => h - LEVEL_HEIGHT,
                    };
                    return Ok(());
                }
                1 => {
                    let mut height = buf.g1()? as i32;
                    if height == 1 {
                        height = 0;
                    }
                    tile.height = below.unwrap_or(0) - height * 8;
                    return Ok(());
                }
                2..=49 => {
                    tile.overlay = buf.g1()?;
                    tile.overlay_shape = (opcode - 2) / 4;
                    tile.overlay_rotation = (opcode - 2) & 3;
                }
                50..=81 => tile.flags = opcode - 49,
                _ => tile.underlay = opcode - 81,
            }
        }
    }
}

fn skip_tile(buf: &mut Packet<'_>) -> Result<(), WorldError> {
    loop {
        match buf.g1()? {
            0 => return Ok(()),
            1 => {
                buf.g1()?;
                return Ok(());
            }
            2..=49 => {
                buf.g1()?;
            }
            _ => {}
        }
    }
}
