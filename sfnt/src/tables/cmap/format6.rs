use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

/// Trimmed table mapping: a dense glyph array for one contiguous 16-bit
/// character range.
#[derive(Debug, PartialEq, Clone)]
pub struct Format6 {
    data: FontData,
}

impl Format6 {
    pub(crate) fn new(data: FontData) -> Self {
        Format6 { data }
    }

    pub fn language(&self) -> Result<u16, Error> {
        self.data.read_u16(4)
    }

    pub fn first_code(&self) -> Result<u16, Error> {
        self.data.read_u16(6)
    }

    pub fn entry_count(&self) -> Result<u16, Error> {
        self.data.read_u16(8)
    }
}

impl GlyphLookup for Format6 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        if character > 0xFFFF {
            return Ok(0);
        }
        let first_code = self.first_code()? as u32;
        let entry_count = self.entry_count()? as u32;
        if character < first_code || character - first_code >= entry_count {
            return Ok(0);
        }
        self.data.read_u16(10 + 2 * (character - first_code) as usize)
    }
}

impl CharacterRanges for Format6 {
    fn num_ranges(&self) -> Result<usize, Error> {
        Ok(1)
    }

    fn range_start(&self, _index: usize) -> Result<u32, Error> {
        Ok(self.first_code()? as u32)
    }

    fn range_end(&self, _index: usize) -> Result<u32, Error> {
        let entry_count = self.entry_count()? as u32;
        Ok(self.first_code()? as u32 + entry_count.saturating_sub(1))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};

    fn sample() -> Format6 {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(6).unwrap(); // format
        buffer.write_u16::<BigEndian>(16).unwrap(); // length
        buffer.write_u16::<BigEndian>(0).unwrap(); // language
        buffer.write_u16::<BigEndian>(0x30).unwrap(); // first code
        buffer.write_u16::<BigEndian>(3).unwrap(); // entry count
        for glyph_id in &[7u16, 8, 9] {
            buffer.write_u16::<BigEndian>(*glyph_id).unwrap();
        }
        Format6::new(buffer.data())
    }

    #[test]
    fn test_format6_lookup() {
        let subtable = sample();
        assert_eq!(subtable.glyph_id(0x2F).unwrap(), 0);
        assert_eq!(subtable.glyph_id(0x30).unwrap(), 7);
        assert_eq!(subtable.glyph_id(0x32).unwrap(), 9);
        assert_eq!(subtable.glyph_id(0x33).unwrap(), 0);
    }

    #[test]
    fn test_format6_iteration_covers_trimmed_range() {
        let subtable = sample();
        let characters: Vec<u32> = subtable.characters().map(Result::unwrap).collect();
        assert_eq!(characters, vec![0x30, 0x31, 0x32]);
    }
}
