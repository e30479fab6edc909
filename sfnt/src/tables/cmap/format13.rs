use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::format12::{Format12, GROUPS_BASE};
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

/// Many-to-one range mappings: the same group layout as format 12, but every
/// character of a group maps to the group's single `glyph_id` (no offset
/// addition). Used for last-resort fonts.
#[derive(Debug, PartialEq, Clone)]
pub struct Format13 {
    data: FontData,
}

impl Format13 {
    pub(crate) fn new(data: FontData) -> Self {
        Format13 { data }
    }

    pub fn language(&self) -> Result<u32, Error> {
        self.data.read_u32(8)
    }

    pub fn num_groups(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32(12)? as usize)
    }
}

impl GlyphLookup for Format13 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        // identical group parsing to format 12; only the mapping rule differs
        let group = match Format12::search_groups(&self.data, self.num_groups()?, character)? {
            Some(group) => group,
            None => return Ok(0),
        };
        let (_, _, glyph_id) = Format12::group(&self.data, group)?;
        Ok(glyph_id as u16)
    }
}

impl CharacterRanges for Format13 {
    fn num_ranges(&self) -> Result<usize, Error> {
        self.num_groups()
    }

    fn range_start(&self, index: usize) -> Result<u32, Error> {
        self.data.read_u32(GROUPS_BASE + index * 12)
    }

    fn range_end(&self, index: usize) -> Result<u32, Error> {
        self.data.read_u32(GROUPS_BASE + index * 12 + 4)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};

    fn sample() -> Format13 {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(13).unwrap(); // format
        buffer.write_u16::<BigEndian>(0).unwrap(); // reserved
        buffer.write_u32::<BigEndian>(28).unwrap(); // length
        buffer.write_u32::<BigEndian>(0).unwrap(); // language
        buffer.write_u32::<BigEndian>(1).unwrap(); // num groups
        buffer.write_u32::<BigEndian>(0x10000).unwrap();
        buffer.write_u32::<BigEndian>(0x10010).unwrap();
        buffer.write_u32::<BigEndian>(100).unwrap();
        Format13::new(buffer.data())
    }

    #[test]
    fn test_format13_constant_group_lookup() {
        let subtable = sample();
        // every character of the group maps to the same glyph
        for character in 0x10000..=0x10010u32 {
            assert_eq!(subtable.glyph_id(character).unwrap(), 100);
        }
        assert_eq!(subtable.glyph_id(0x10011).unwrap(), 0);
    }
}
