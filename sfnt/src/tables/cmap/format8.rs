use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

const IS32_BASE: usize = 12;
const NUM_GROUPS_OFFSET: usize = IS32_BASE + 8192;
const GROUPS_BASE: usize = NUM_GROUPS_OFFSET + 4;

/// Mixed 16/32-bit coverage: a packed `is32` bitmap classifying 16-bit
/// units, followed by sequential map groups. The format has no well-known
/// producer in the wild; this decoder is only exercised against synthetic
/// tables.
#[derive(Debug, PartialEq, Clone)]
pub struct Format8 {
    data: FontData,
}

impl Format8 {
    pub(crate) fn new(data: FontData) -> Self {
        Format8 { data }
    }

    pub fn language(&self) -> Result<u32, Error> {
        self.data.read_u32(8)
    }

    pub fn num_groups(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32(NUM_GROUPS_OFFSET)? as usize)
    }

    /// Whether the 16-bit unit `unit` is the start of a 32-bit character.
    pub fn is32(&self, unit: u16) -> Result<bool, Error> {
        let byte = self.data.read_u8(IS32_BASE + (unit as usize) / 8)?;
        Ok(byte & (0x80 >> (unit % 8)) != 0)
    }
}

impl GlyphLookup for Format8 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        let group = match self.data.search_u32(
            GROUPS_BASE,
            12,
            GROUPS_BASE + 4,
            12,
            self.num_groups()?,
            character,
        )? {
            Some(group) => group,
            None => return Ok(0),
        };
        let start_char_code = self.data.read_u32(GROUPS_BASE + group * 12)?;
        let start_glyph_id = self.data.read_u32(GROUPS_BASE + group * 12 + 8)?;
        Ok((start_glyph_id + (character - start_char_code)) as u16)
    }
}

impl CharacterRanges for Format8 {
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
