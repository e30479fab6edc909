use crate::data::FontData;
use crate::error::Error;
use crate::tables::bitmap::SbitLineMetrics;

const SCALE_TABLE_BASE: usize = 8;
const SCALE_TABLE_LEN: usize = 28;

/// The embedded bitmap scaling table: strikes to synthesize by scaling
/// another strike's bitmaps. The table is read-only here and passes through
/// serialization untouched.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/ebsc
#[derive(Debug, PartialEq, Clone)]
pub struct Ebsc {
    data: FontData,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct BitmapScale {
    pub hori: SbitLineMetrics,
    pub vert: SbitLineMetrics,
    pub ppem_x: u8,
    pub ppem_y: u8,
    pub substitute_ppem_x: u8,
    pub substitute_ppem_y: u8,
}

impl Ebsc {
    pub fn new(data: FontData) -> Self {
        Ebsc { data }
    }

    pub fn major_version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn minor_version(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    pub fn num_sizes(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32_as_i32(4)? as usize)
    }

    pub fn bitmap_scale(&self, index: usize) -> Result<BitmapScale, Error> {
        if index >= self.num_sizes()? {
            return Err(Error::OutOfBounds);
        }
        let base = SCALE_TABLE_BASE + index * SCALE_TABLE_LEN;
        Ok(BitmapScale {
            hori: SbitLineMetrics::read(&self.data, base)?,
            vert: SbitLineMetrics::read(&self.data, base + 12)?,
            ppem_x: self.data.read_u8(base + 24)?,
            ppem_y: self.data.read_u8(base + 25)?,
            substitute_ppem_x: self.data.read_u8(base + 26)?,
            substitute_ppem_y: self.data.read_u8(base + 27)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Write;

    #[test]
    fn test_ebsc_scale_entries() {
        let mut wr = WritableFontData::new();
        wr.write_u16::<BigEndian>(2).unwrap(); // major version
        wr.write_u16::<BigEndian>(0).unwrap(); // minor version
        wr.write_u32::<BigEndian>(1).unwrap(); // num sizes
        let mut hori = [0u8; 12];
        hori[0] = 10; // ascender
        wr.write_all(&hori).unwrap();
        wr.write_all(&[0u8; 12]).unwrap(); // vert
        wr.write_all(&[9, 9, 12, 12]).unwrap();

        let ebsc = Ebsc::new(wr.data());
        assert_eq!(ebsc.num_sizes().unwrap(), 1);
        let scale = ebsc.bitmap_scale(0).unwrap();
        assert_eq!(scale.hori.ascender, 10);
        assert_eq!(scale.ppem_x, 9);
        assert_eq!(scale.substitute_ppem_y, 12);
        assert!(matches!(ebsc.bitmap_scale(1), Err(Error::OutOfBounds)));
    }
}
