use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

/// Byte encoding table: a direct 256-entry glyph index array for single-byte
/// character codes.
#[derive(Debug, PartialEq, Clone)]
pub struct Format0 {
    data: FontData,
}

impl Format0 {
    pub(crate) fn new(data: FontData) -> Self {
        Format0 { data }
    }

    pub fn language(&self) -> Result<u16, Error> {
        self.data.read_u16(4)
    }
}

impl GlyphLookup for Format0 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        if character > 0xFF {
            return Ok(0);
        }
        Ok(self.data.read_u8(6 + character as usize)? as u16)
    }
}

impl CharacterRanges for Format0 {
    fn num_ranges(&self) -> Result<usize, Error> {
        Ok(1)
    }

    fn range_start(&self, _index: usize) -> Result<u32, Error> {
        Ok(0)
    }

    fn range_end(&self, _index: usize) -> Result<u32, Error> {
        Ok(0xFF)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Write;

    fn sample() -> Format0 {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(0).unwrap(); // format
        buffer.write_u16::<BigEndian>(262).unwrap(); // length
        buffer.write_u16::<BigEndian>(0).unwrap(); // language
        let mut glyph_ids = [0u8; 256];
        glyph_ids[b'A' as usize] = 1;
        glyph_ids[b'B' as usize] = 2;
        buffer.write_all(&glyph_ids).unwrap();
        Format0::new(buffer.data())
    }

    #[test]
    fn test_format0_lookup() {
        let subtable = sample();
        assert_eq!(subtable.glyph_id(b'A' as u32).unwrap(), 1);
        assert_eq!(subtable.glyph_id(b'B' as u32).unwrap(), 2);
        assert_eq!(subtable.glyph_id(b'C' as u32).unwrap(), 0);
        assert_eq!(subtable.glyph_id(0x100).unwrap(), 0);
    }

    #[test]
    fn test_format0_iterates_all_byte_codes() {
        let subtable = sample();
        let characters: Vec<u32> = subtable.characters().map(Result::unwrap).collect();
        assert_eq!(characters.len(), 256);
        assert_eq!(characters[0], 0);
        assert_eq!(characters[255], 0xFF);
    }
}
