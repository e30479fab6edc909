use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

const SUB_HEADER_KEYS_BASE: usize = 6;
const SUB_HEADERS_BASE: usize = SUB_HEADER_KEYS_BASE + 256 * 2;

/// High-byte mapping through subheaders, used by legacy CJK encodings.
/// Single-byte codes route through subheader 0; two-byte codes select their
/// subheader by the high byte.
#[derive(Debug, PartialEq, Clone)]
pub struct Format2 {
    data: FontData,
}

impl Format2 {
    pub(crate) fn new(data: FontData) -> Self {
        Format2 { data }
    }

    pub fn language(&self) -> Result<u16, Error> {
        self.data.read_u16(4)
    }

    /// The subheader key for a high byte; values are byte offsets into the
    /// subheader array (subheader index times eight).
    fn sub_header_key(&self, high_byte: usize) -> Result<usize, Error> {
        Ok(self.data.read_u16(SUB_HEADER_KEYS_BASE + 2 * high_byte)? as usize)
    }

    fn sub_header(&self, key: usize) -> Result<SubHeader, Error> {
        let base = SUB_HEADERS_BASE + key;
        Ok(SubHeader {
            first_code: self.data.read_u16(base)?,
            entry_count: self.data.read_u16(base + 2)?,
            id_delta: self.data.read_i16(base + 4)?,
            id_range_offset: self.data.read_u16(base + 6)?,
            id_range_offset_pos: base + 6,
        })
    }
}

struct SubHeader {
    first_code: u16,
    entry_count: u16,
    id_delta: i16,
    id_range_offset: u16,
    /// Absolute position of the `id_range_offset` field itself; the offset
    /// is relative to it.
    id_range_offset_pos: usize,
}

impl GlyphLookup for Format2 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        if character > 0xFFFF {
            return Ok(0);
        }

        let high = (character >> 8) as usize;
        let (key, low) = if character < 0x100 {
            // single-byte codes are only valid if their value is not
            // declared as a high byte, and map through subheader 0
            if self.sub_header_key(character as usize)? != 0 {
                return Ok(0);
            }
            (0, character as u16)
        } else {
            let key = self.sub_header_key(high)?;
            if key == 0 {
                return Ok(0);
            }
            (key, (character & 0xFF) as u16)
        };

        let sub_header = self.sub_header(key)?;
        if low < sub_header.first_code
            || low - sub_header.first_code >= sub_header.entry_count
        {
            return Ok(0);
        }

        let target = sub_header.id_range_offset_pos
            + sub_header.id_range_offset as usize
            + 2 * (low - sub_header.first_code) as usize;
        let glyph_id = self.data.read_u16(target)?;
        if glyph_id == 0 {
            return Ok(0);
        }
        Ok(glyph_id.wrapping_add(sub_header.id_delta as u16))
    }
}

impl CharacterRanges for Format2 {
    fn num_ranges(&self) -> Result<usize, Error> {
        Ok(256)
    }

    fn range_start(&self, index: usize) -> Result<u32, Error> {
        let key = self.sub_header_key(index)?;
        if key == 0 {
            return Ok(index as u32);
        }
        let sub_header = self.sub_header(key)?;
        Ok(((index as u32) << 8) | sub_header.first_code as u32)
    }

    fn range_end(&self, index: usize) -> Result<u32, Error> {
        let key = self.sub_header_key(index)?;
        if key == 0 {
            return Ok(index as u32);
        }
        let sub_header = self.sub_header(key)?;
        let last = sub_header.first_code as u32 + (sub_header.entry_count as u32).saturating_sub(1);
        Ok(((index as u32) << 8) | last.min(0xFF))
    }

    fn skips_unmapped(&self) -> bool {
        true
    }
}
