use crate::data::FontData;
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};

const RECORDS_BASE: usize = 10;
const RECORD_SIZE: usize = 11;

/// Unicode variation sequences: per variation selector, ranges of base
/// characters that keep their default glyph plus explicit mappings to
/// non-default glyphs.
#[derive(Debug, PartialEq, Clone)]
pub struct Format14 {
    data: FontData,
}

/// The result of a variation-sequence lookup.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum VariationLookup {
    /// The sequence is valid and renders the default glyph of the base
    /// character (resolve through the font's regular cmap subtable).
    UseDefault,
    /// The sequence selects this specific glyph.
    Glyph(u16),
    /// The selector does not cover the base character.
    None,
}

impl Format14 {
    pub(crate) fn new(data: FontData) -> Self {
        Format14 { data }
    }

    pub fn num_var_selector_records(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32(6)? as usize)
    }

    pub fn var_selector(&self, index: usize) -> Result<u32, Error> {
        self.data.read_u24(RECORDS_BASE + index * RECORD_SIZE)
    }

    fn record_offsets(&self, index: usize) -> Result<(u32, u32), Error> {
        let base = RECORDS_BASE + index * RECORD_SIZE;
        Ok((self.data.read_u32(base + 3)?, self.data.read_u32(base + 7)?))
    }

    fn find_selector(&self, selector: u32) -> Result<Option<usize>, Error> {
        // records are sorted by selector value
        let mut lo = 0;
        let mut hi = self.num_var_selector_records()?;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let value = self.var_selector(mid)?;
            if value < selector {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo < self.num_var_selector_records()? && self.var_selector(lo)? == selector {
            Ok(Some(lo))
        } else {
            Ok(None)
        }
    }

    /// Looks up the variation sequence `(base, selector)`: first the default
    /// UVS ranges, then the non-default mappings of the selector.
    pub fn glyph_id_variant(&self, base: u32, selector: u32) -> Result<VariationLookup, Error> {
        let record = match self.find_selector(selector)? {
            Some(record) => record,
            None => return Ok(VariationLookup::None),
        };
        let (default_offset, non_default_offset) = self.record_offsets(record)?;

        if default_offset != 0 {
            let table = default_offset as usize;
            let num_ranges = self.data.read_u32(table)? as usize;
            for i in 0..num_ranges {
                let range = table + 4 + i * 4;
                let start = self.data.read_u24(range)?;
                let additional = self.data.read_u8(range + 3)? as u32;
                if base < start {
                    break;
                }
                if base <= start + additional {
                    return Ok(VariationLookup::UseDefault);
                }
            }
        }

        if non_default_offset != 0 {
            let table = non_default_offset as usize;
            let num_mappings = self.data.read_u32(table)? as usize;
            // mappings are sorted by base character
            let mut lo = 0;
            let mut hi = num_mappings;
            while lo < hi {
                let mid = lo + (hi - lo) / 2;
                let value = self.data.read_u24(table + 4 + mid * 5)?;
                if value < base {
                    lo = mid + 1;
                } else {
                    hi = mid;
                }
            }
            if lo < num_mappings && self.data.read_u24(table + 4 + lo * 5)? == base {
                let glyph_id = self.data.read_u16(table + 4 + lo * 5 + 3)?;
                return Ok(VariationLookup::Glyph(glyph_id));
            }
        }

        Ok(VariationLookup::None)
    }
}

impl GlyphLookup for Format14 {
    fn glyph_id(&self, _character: u32) -> Result<u16, Error> {
        // variation selectors do not map plain characters
        Ok(0)
    }
}

impl CharacterRanges for Format14 {
    // iteration covers the base characters with non-default mappings; one
    // "range" per mapping entry, walked selector by selector
    fn num_ranges(&self) -> Result<usize, Error> {
        let mut total = 0;
        for record in 0..self.num_var_selector_records()? {
            let (_, non_default_offset) = self.record_offsets(record)?;
            if non_default_offset != 0 {
                total += self.data.read_u32(non_default_offset as usize)? as usize;
            }
        }
        Ok(total)
    }

    fn range_start(&self, index: usize) -> Result<u32, Error> {
        let mut remaining = index;
        for record in 0..self.num_var_selector_records()? {
            let (_, non_default_offset) = self.record_offsets(record)?;
            if non_default_offset == 0 {
                continue;
            }
            let table = non_default_offset as usize;
            let num_mappings = self.data.read_u32(table)? as usize;
            if remaining < num_mappings {
                return self.data.read_u24(table + 4 + remaining * 5);
            }
            remaining -= num_mappings;
        }
        Err(Error::OutOfBounds)
    }

    fn range_end(&self, index: usize) -> Result<u32, Error> {
        self.range_start(index)
    }

    fn skips_unmapped(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};

    fn write_u24(buffer: &mut WritableFontData, value: u32) {
        let offset = buffer.len();
        buffer.write_u8_at(offset, (value >> 16) as u8);
        buffer.write_u8_at(offset + 1, (value >> 8) as u8);
        buffer.write_u8_at(offset + 2, value as u8);
    }

    /// One selector (VS16, 0xFE0F): 0x2640 keeps its default glyph,
    /// 0x2642 maps to glyph 77.
    fn sample() -> Format14 {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(14).unwrap(); // format
        buffer.write_u32::<BigEndian>(0).unwrap(); // length, unused here
        buffer.write_u32::<BigEndian>(1).unwrap(); // one selector record

        let default_uvs_offset = RECORDS_BASE + RECORD_SIZE;
        let non_default_uvs_offset = default_uvs_offset + 4 + 4;
        write_u24(&mut buffer, 0xFE0F);
        buffer.write_u32::<BigEndian>(default_uvs_offset as u32).unwrap();
        buffer.write_u32::<BigEndian>(non_default_uvs_offset as u32).unwrap();

        // default UVS: one range [0x2640, 0x2640]
        buffer.write_u32::<BigEndian>(1).unwrap();
        write_u24(&mut buffer, 0x2640);
        let offset = buffer.len();
        buffer.write_u8_at(offset, 0); // additional count

        // non-default UVS: 0x2642 -> glyph 77
        buffer.write_u32::<BigEndian>(1).unwrap();
        write_u24(&mut buffer, 0x2642);
        buffer.write_u16::<BigEndian>(77).unwrap();

        Format14::new(buffer.data())
    }

    #[test]
    fn test_format14_two_level_lookup() {
        let subtable = sample();
        assert_eq!(
            subtable.glyph_id_variant(0x2640, 0xFE0F).unwrap(),
            VariationLookup::UseDefault
        );
        assert_eq!(
            subtable.glyph_id_variant(0x2642, 0xFE0F).unwrap(),
            VariationLookup::Glyph(77)
        );
        assert_eq!(
            subtable.glyph_id_variant(0x2643, 0xFE0F).unwrap(),
            VariationLookup::None
        );
        assert_eq!(
            subtable.glyph_id_variant(0x2640, 0xFE00).unwrap(),
            VariationLookup::None
        );
    }

    #[test]
    fn test_format14_plain_lookup_is_notdef() {
        let subtable = sample();
        assert_eq!(subtable.glyph_id(0x2640).unwrap(), 0);
    }

    #[test]
    fn test_format14_iterates_non_default_bases() {
        let subtable = sample();
        let characters: Vec<u32> = subtable.characters().map(Result::unwrap).collect();
        assert_eq!(characters, vec![0x2642]);
    }
}
