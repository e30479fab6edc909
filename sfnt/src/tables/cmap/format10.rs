use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

/// Trimmed array for 32-bit character codes: one contiguous range with a
/// dense glyph array, the 32-bit sibling of format 6.
#[derive(Debug, PartialEq, Clone)]
pub struct Format10 {
    data: FontData,
}

impl Format10 {
    pub(crate) fn new(data: FontData) -> Self {
        Format10 { data }
    }

    pub fn language(&self) -> Result<u32, Error> {
        self.data.read_u32(8)
    }

    pub fn start_char_code(&self) -> Result<u32, Error> {
        self.data.read_u32(12)
    }

    pub fn num_chars(&self) -> Result<u32, Error> {
        self.data.read_u32(16)
    }
}

impl GlyphLookup for Format10 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        let start = self.start_char_code()?;
        if character < start || character - start >= self.num_chars()? {
            return Ok(0);
        }
        self.data.read_u16(20 + 2 * (character - start) as usize)
    }
}

impl CharacterRanges for Format10 {
    fn num_ranges(&self) -> Result<usize, Error> {
        Ok(1)
    }

    fn range_start(&self, _index: usize) -> Result<u32, Error> {
        self.start_char_code()
    }

    fn range_end(&self, _index: usize) -> Result<u32, Error> {
        let num_chars = self.num_chars()?;
        Ok(self.start_char_code()? + num_chars.saturating_sub(1))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};

    fn sample() -> Format10 {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(10).unwrap(); // format
        buffer.write_u16::<BigEndian>(0).unwrap(); // reserved
        buffer.write_u32::<BigEndian>(26).unwrap(); // length
        buffer.write_u32::<BigEndian>(0).unwrap(); // language
        buffer.write_u32::<BigEndian>(0x10300).unwrap(); // start char code
        buffer.write_u32::<BigEndian>(3).unwrap(); // num chars
        for glyph_id in &[40u16, 41, 42] {
            buffer.write_u16::<BigEndian>(*glyph_id).unwrap();
        }
        Format10::new(buffer.data())
    }

    #[test]
    fn test_format10_lookup() {
        let subtable = sample();
        assert_eq!(subtable.glyph_id(0x102FF).unwrap(), 0);
        assert_eq!(subtable.glyph_id(0x10300).unwrap(), 40);
        assert_eq!(subtable.glyph_id(0x10302).unwrap(), 42);
        assert_eq!(subtable.glyph_id(0x10303).unwrap(), 0);
    }

    #[test]
    fn test_format10_iteration() {
        let subtable = sample();
        let characters: Vec<u32> = subtable.characters().map(Result::unwrap).collect();
        assert_eq!(characters, vec![0x10300, 0x10301, 0x10302]);
    }
}
