//! Bounds-checked big-endian byte reader used by every binary stream in the engine.

use crate::error::DecodeError;

#[derive(Clone, Debug)]
pub struct Packet<'a> {
    data: &'a [u8],
    pub pos: usize,
}

impl<'a> Packet<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    #[inline]
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    #[inline]
    fn take(&mut self, want: usize) -> Result<&'a [u8], DecodeError> {
        let end = self.pos + want;
        match self.data.get(self.pos..end) {
            Some(bytes) => {
                self.pos = end;
                Ok(bytes)
            }
            None => Err(DecodeError::Truncated {
                pos: self.pos,
                want,
                len: self.data.len(),
            }),
        }
    }

    #[inline]
    pub fn peek(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::Truncated {
                pos: self.pos,
                want: 1,
                len: self.data.len(),
            })
    }

    #[inline]
    pub fn g1(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn g1b(&mut self) -> Result<i8, DecodeError> {
        Ok(self.take(1)?[0] as i8)
    }

    #[inline]
    pub fn g2(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Unsigned smart: one byte below 128, otherwise two bytes minus 32768.
    #[inline]
    pub fn gsmart(&mut self) -> Result<i32, DecodeError> {
        if self.peek()? < 128 {
            Ok(self.g1()? as i32)
        } else {
            Ok(self.g2()? as i32 - 32768)
        }
    }

    /// Signed smart: one byte holding `v + 64`, or two bytes holding `v + 49152`.
    #[inline]
    pub fn gsmarts(&mut self) -> Result<i32, DecodeError> {
        if self.peek()? < 128 {
            Ok(self.g1()? as i32 - 64)
        } else {
            Ok(self.g2()? as i32 - 49152)
        }
    }
}

/// Writer counterpart used to author blobs and streams.
#[derive(Clone, Debug, Default)]
pub struct PacketWriter {
    pub data: Vec<u8>,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn p1(&mut self, v: u8) {
        self.data.push(v);
    }

    #[inline]
    pub fn p2(&mut self, v: u16) {
        self.data.extend_from_slice(&v.to_be_bytes());
    }

    /// Values must lie in `0..32768`.
    pub fn psmart(&mut self, v: i32) {
        debug_assert!((0..32768).contains(&v));
        if v < 128 {
            self.p1(v as u8);
        } else {
            self.p2((v + 32768) as u16);
        }
    }

    /// Values must lie in `-16384..16384`.
    pub fn psmarts(&mut self, v: i32) {
        debug_assert!((-16384..16384).contains(&v));
        if (-64..64).contains(&v) {
            self.p1((v + 64) as u8);
        } else {
            self.p2((v + 49152) as u16);
        }
    }

    pub fn extend(&mut self, other: &[u8]) {
        self.data.extend_from_slice(other);
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_smarts_cover_both_widths() {
        let mut w = PacketWriter::new();
        for v in [-64, 63, -65, 64, -16384, 16383, 0] {
            w.psmarts(v);
        }
        let mut p = Packet::new(&w.data);
        for v in [-64, 63, -65, 64, -16384, 16383, 0] {
            assert_eq!(p.gsmarts().unwrap(), v);
        }
        assert_eq!(p.remaining(), 0);
    }

    #[test]
    fn unsigned_smarts_switch_at_128() {
        let mut w = PacketWriter::new();
        w.psmart(127);
        w.psmart(128);
        w.psmart(32767);
        assert_eq!(w.len(), 1 + 2 + 2);
        let mut p = Packet::new(&w.data);
        assert_eq!(p.gsmart().unwrap(), 127);
        assert_eq!(p.gsmart().unwrap(), 128);
        assert_eq!(p.gsmart().unwrap(), 32767);
    }

    #[test]
    fn reads_past_end_are_errors() {
        let mut p = Packet::new(&[1]);
        assert_eq!(p.g1().unwrap(), 1);
        assert!(matches!(p.g2(), Err(DecodeError::Truncated { pos: 1, want: 2, len: 1 })));
    }
}
