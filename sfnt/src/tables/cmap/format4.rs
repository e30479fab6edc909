use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};
use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};

const HEADER_SIZE: usize = 14;

/// Segmented mapping of 16-bit character ranges, the workhorse format for
/// BMP encodings. Lookups run directly against the binary form.
#[derive(Debug, PartialEq, Clone)]
pub struct Format4 {
    data: FontData,
}

impl Format4 {
    pub(crate) fn new(data: FontData) -> Self {
        Format4 { data }
    }

    pub fn language(&self) -> Result<u16, Error> {
        self.data.read_u16(4)
    }

    pub fn seg_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(6)? as usize / 2)
    }

    fn end_code_base(&self) -> usize {
        HEADER_SIZE
    }

    fn start_code_base(&self, seg_count: usize) -> usize {
        // the reserved pad sits between the end and start code arrays
        HEADER_SIZE + 2 * seg_count + 2
    }

    fn id_delta_base(&self, seg_count: usize) -> usize {
        self.start_code_base(seg_count) + 2 * seg_count
    }

    fn id_range_offset_base(&self, seg_count: usize) -> usize {
        self.id_delta_base(seg_count) + 2 * seg_count
    }

    fn lookup(&self, character: u32, strict: bool) -> Result<u16, Error> {
        if character > 0xFFFF {
            return Ok(0);
        }
        let character = character as u16;
        let seg_count = self.seg_count()?;

        let segment = match self.data.search_u16(
            self.start_code_base(seg_count),
            2,
            self.end_code_base(),
            2,
            seg_count,
            character,
        )? {
            Some(segment) => segment,
            None => return Ok(0),
        };

        let id_delta = self.data.read_i16(self.id_delta_base(seg_count) + 2 * segment)?;
        let range_offset_pos = self.id_range_offset_base(seg_count) + 2 * segment;
        let id_range_offset = self.data.read_u16(range_offset_pos)?;
        if id_range_offset == 0 {
            return Ok(character.wrapping_add(id_delta as u16));
        }

        let start_code = self
            .data
            .read_u16(self.start_code_base(seg_count) + 2 * segment)?;
        let target = range_offset_pos
            + id_range_offset as usize
            + 2 * (character - start_code) as usize;
        let glyph_id = match self.data.read_u16(target) {
            Ok(glyph_id) => glyph_id,
            // an id_range_offset pointing outside the glyph-id array yields
            // NOTDEF unless the caller asked for the strict check
            Err(Error::OutOfBounds) if !strict => return Ok(0),
            Err(Error::OutOfBounds) => {
                return Err(Error::corrupt(
                    Tag::CMAP,
                    format!(
                        "format 4 id_range_offset of segment {} points outside the table",
                        segment
                    ),
                ))
            }
            Err(err) => return Err(err),
        };
        if glyph_id == 0 {
            return Ok(0);
        }
        Ok(glyph_id.wrapping_add(id_delta as u16))
    }

    /// Like [`GlyphLookup::glyph_id`], but fails with
    /// [`Error::CorruptTable`] when an `id_range_offset` points outside the
    /// table instead of silently yielding NOTDEF.
    pub fn glyph_id_strict(&self, character: u32) -> Result<u16, Error> {
        self.lookup(character, true)
    }
}

impl GlyphLookup for Format4 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        self.lookup(character, false)
    }
}

impl CharacterRanges for Format4 {
    fn num_ranges(&self) -> Result<usize, Error> {
        self.seg_count()
    }

    fn range_start(&self, index: usize) -> Result<u32, Error> {
        let seg_count = self.seg_count()?;
        Ok(self.data.read_u16(self.start_code_base(seg_count) + 2 * index)? as u32)
    }

    fn range_end(&self, index: usize) -> Result<u32, Error> {
        Ok(self.data.read_u16(self.end_code_base() + 2 * index)? as u32)
    }
}

/// One segment of the editable format 4 model.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

/// The editable model behind the format 4 builder. Materialization validates
/// the structural invariants the binary search relies on.
#[derive(Debug, PartialEq, Clone)]
pub struct Format4Model {
    pub language: u16,
    pub segments: Vec<Segment>,
    pub glyph_id_array: Vec<u16>,
}

impl Format4Model {
    pub(crate) fn read(data: FontData) -> Result<Self, Error> {
        let view = Format4::new(data.clone());
        let seg_count = view.seg_count()?;
        if seg_count == 0 {
            return Err(Error::corrupt(Tag::CMAP, "format 4 subtable without segments"));
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(seg_count);
        for i in 0..seg_count {
            let segment = Segment {
                start_code: data.read_u16(view.start_code_base(seg_count) + 2 * i)?,
                end_code: data.read_u16(view.end_code_base() + 2 * i)?,
                id_delta: data.read_i16(view.id_delta_base(seg_count) + 2 * i)?,
                id_range_offset: data.read_u16(view.id_range_offset_base(seg_count) + 2 * i)?,
            };
            if segment.start_code > segment.end_code {
                return Err(Error::corrupt(
                    Tag::CMAP,
                    format!("format 4 segment {} starts after its end", i),
                ));
            }
            if let Some(previous) = segments.last() {
                if segment.start_code <= previous.end_code {
                    return Err(Error::corrupt(
                        Tag::CMAP,
                        format!("format 4 segment {} overlaps its predecessor", i),
                    ));
                }
            }
            segments.push(segment);
        }
        if segments.last().map(|s| s.end_code) != Some(0xFFFF) {
            return Err(Error::corrupt(
                Tag::CMAP,
                "format 4 last segment end code must be 0xFFFF",
            ));
        }

        let glyph_ids_base = view.id_range_offset_base(seg_count) + 2 * seg_count;
        let glyph_id_array = (glyph_ids_base..data.len().saturating_sub(1))
            .step_by(2)
            .map(|offset| data.read_u16(offset))
            .collect::<Result<Vec<u16>, Error>>()?;

        Ok(Format4Model {
            language: view.language()?,
            segments,
            glyph_id_array,
        })
    }

    /// Builds a minimal model from character-to-glyph mappings. Runs of
    /// consecutive characters with consecutive glyph ids collapse into one
    /// delta segment; the terminal 0xFFFF segment is appended when absent.
    pub fn from_mappings(mappings: &[(u16, u16)]) -> Result<Self, Error> {
        let mut mappings = mappings.to_vec();
        mappings.sort_unstable();
        mappings.dedup();
        for pair in mappings.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::corrupt(
                    Tag::CMAP,
                    format!("character 0x{:04X} mapped to two glyphs", pair[0].0),
                ));
            }
        }

        let mut segments: Vec<Segment> = Vec::new();
        for (character, glyph_id) in mappings {
            let extends = segments.last().map_or(false, |s| {
                s.end_code.checked_add(1) == Some(character)
                    && s.start_code.wrapping_add(s.id_delta as u16)
                        == glyph_id.wrapping_sub(character - s.start_code)
            });
            if let (true, Some(segment)) = (extends, segments.last_mut()) {
                segment.end_code = character;
            } else {
                segments.push(Segment {
                    start_code: character,
                    end_code: character,
                    id_delta: glyph_id.wrapping_sub(character) as i16,
                    id_range_offset: 0,
                });
            }
        }
        if segments.last().map(|s| s.end_code) != Some(0xFFFF) {
            // maps 0xFFFF to (0xFFFF + 1) mod 65536 = NOTDEF
            segments.push(Segment {
                start_code: 0xFFFF,
                end_code: 0xFFFF,
                id_delta: 1,
                id_range_offset: 0,
            });
        }

        Ok(Format4Model {
            language: 0,
            segments,
            glyph_id_array: Vec::new(),
        })
    }

    pub(crate) fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        let seg_count = self.segments.len();
        let length = HEADER_SIZE + 2 + 8 * seg_count + 2 * self.glyph_id_array.len();

        let exponent = (seg_count as f32).log2() as u32;
        let search_range = 2 * 2u16.pow(exponent);
        let entry_selector = exponent as u16;
        let range_shift = 2 * seg_count as u16 - search_range;

        wr.write_u16::<BigEndian>(4)?;
        wr.write_u16::<BigEndian>(length as u16)?;
        wr.write_u16::<BigEndian>(self.language)?;
        wr.write_u16::<BigEndian>(2 * seg_count as u16)?;
        wr.write_u16::<BigEndian>(search_range)?;
        wr.write_u16::<BigEndian>(entry_selector)?;
        wr.write_u16::<BigEndian>(range_shift)?;
        for segment in &self.segments {
            wr.write_u16::<BigEndian>(segment.end_code)?;
        }
        wr.write_u16::<BigEndian>(0)?; // reserved pad
        for segment in &self.segments {
            wr.write_u16::<BigEndian>(segment.start_code)?;
        }
        for segment in &self.segments {
            wr.write_i16::<BigEndian>(segment.id_delta)?;
        }
        for segment in &self.segments {
            wr.write_u16::<BigEndian>(segment.id_range_offset)?;
        }
        for glyph_id in &self.glyph_id_array {
            wr.write_u16::<BigEndian>(*glyph_id)?;
        }
        Ok(wr.len() - start)
    }

    pub(crate) fn ready(&self) -> bool {
        self.segments.last().map(|s| s.end_code) == Some(0xFFFF)
            && HEADER_SIZE + 2 + 8 * self.segments.len() + 2 * self.glyph_id_array.len()
                <= u16::max_value() as usize
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn serialized(model: &Format4Model) -> FontData {
        let mut buffer = WritableFontData::new();
        model.write(&mut buffer).unwrap();
        buffer.data()
    }

    /// The reference lookup: a linear scan over the model's segments,
    /// applying the delta/range-offset rules directly.
    fn naive_glyph_id(model: &Format4Model, character: u16) -> u16 {
        let seg_count = model.segments.len();
        for (i, segment) in model.segments.iter().enumerate() {
            if character < segment.start_code || character > segment.end_code {
                continue;
            }
            if segment.id_range_offset == 0 {
                return character.wrapping_add(segment.id_delta as u16);
            }
            let index = segment.id_range_offset as usize / 2
                + (character - segment.start_code) as usize
                - (seg_count - i);
            let glyph_id = model.glyph_id_array.get(index).copied().unwrap_or(0);
            if glyph_id == 0 {
                return 0;
            }
            return glyph_id.wrapping_add(segment.id_delta as u16);
        }
        0
    }

    #[test]
    fn test_format4_delta_segments() {
        let model = Format4Model::from_mappings(&[(b'A' as u16, 1), (b'B' as u16, 2)]).unwrap();
        // 'A' and 'B' collapse into one delta segment plus the terminal one
        assert_eq!(model.segments.len(), 2);

        let view = Format4::new(serialized(&model));
        assert_eq!(view.glyph_id(b'A' as u32).unwrap(), 1);
        assert_eq!(view.glyph_id(b'B' as u32).unwrap(), 2);
        assert_eq!(view.glyph_id(b'C' as u32).unwrap(), 0);
        assert_eq!(view.glyph_id(0xFFFF).unwrap(), 0);
        assert_eq!(view.glyph_id(0x10000).unwrap(), 0);
    }

    #[test]
    fn test_format4_search_acceleration_fields() {
        let model = Format4Model::from_mappings(&[(b'A' as u16, 1)]).unwrap();
        let data = serialized(&model);
        // two segments: search_range = 2 * 2^1, entry_selector = 1,
        // range_shift = 2 * 2 - 4
        assert_eq!(data.read_u16(6).unwrap(), 4);
        assert_eq!(data.read_u16(8).unwrap(), 4);
        assert_eq!(data.read_u16(10).unwrap(), 1);
        assert_eq!(data.read_u16(12).unwrap(), 0);
    }

    #[test]
    fn test_format4_range_offset_lookup() {
        // segment 0 maps [0x20, 0x22] through the glyph id array; the
        // offset is relative to the segment's own id_range_offset slot
        let model = Format4Model {
            language: 0,
            segments: vec![
                Segment {
                    start_code: 0x20,
                    end_code: 0x22,
                    id_delta: 0,
                    id_range_offset: 2 * 2, // array position 0, seg_count 2
                },
                Segment {
                    start_code: 0xFFFF,
                    end_code: 0xFFFF,
                    id_delta: 1,
                    id_range_offset: 0,
                },
            ],
            glyph_id_array: vec![10, 0, 12],
        };

        let view = Format4::new(serialized(&model));
        assert_eq!(view.glyph_id(0x20).unwrap(), 10);
        assert_eq!(view.glyph_id(0x21).unwrap(), 0); // explicit NOTDEF hole
        assert_eq!(view.glyph_id(0x22).unwrap(), 12);
    }

    #[test]
    fn test_format4_binary_form_agrees_with_linear_scan() {
        let model = Format4Model {
            language: 0,
            segments: vec![
                Segment {
                    start_code: 0x20,
                    end_code: 0x24,
                    id_delta: -10,
                    id_range_offset: 0,
                },
                Segment {
                    start_code: 0x41,
                    end_code: 0x43,
                    id_delta: 0,
                    id_range_offset: 2 * 3, // array position 0, seg_count 3
                },
                Segment {
                    start_code: 0xFFFF,
                    end_code: 0xFFFF,
                    id_delta: 1,
                    id_range_offset: 0,
                },
            ],
            glyph_id_array: vec![100, 0, 102],
        };

        let view = Format4::new(serialized(&model));
        for segment in &model.segments {
            for character in segment.start_code..=segment.end_code {
                assert_eq!(
                    view.glyph_id(character as u32).unwrap(),
                    naive_glyph_id(&model, character),
                    "character 0x{:04X}",
                    character
                );
            }
        }
    }

    #[test]
    fn test_format4_round_trip() {
        let model = Format4Model::from_mappings(&[(0x20, 3), (0x21, 4), (0x30, 9)]).unwrap();
        let reread = Format4Model::read(serialized(&model)).unwrap();
        assert_eq!(reread, model);
    }

    #[test]
    fn test_format4_rejects_missing_terminal_segment() {
        let model = Format4Model {
            language: 0,
            segments: vec![Segment {
                start_code: 0x20,
                end_code: 0x2F,
                id_delta: 0,
                id_range_offset: 0,
            }],
            glyph_id_array: Vec::new(),
        };
        assert!(!model.ready());
        assert!(matches!(
            Format4Model::read(serialized(&model)),
            Err(Error::CorruptTable { tag: Tag::CMAP, .. })
        ));
    }

    #[test]
    fn test_format4_out_of_bounds_range_offset() {
        let model = Format4Model {
            language: 0,
            segments: vec![
                Segment {
                    start_code: 0x20,
                    end_code: 0x20,
                    id_delta: 0,
                    id_range_offset: 0x4000, // far outside the table
                },
                Segment {
                    start_code: 0xFFFF,
                    end_code: 0xFFFF,
                    id_delta: 1,
                    id_range_offset: 0,
                },
            ],
            glyph_id_array: Vec::new(),
        };

        let view = Format4::new(serialized(&model));
        // the lenient path mirrors the historical behavior
        assert_eq!(view.glyph_id(0x20).unwrap(), 0);
        assert!(matches!(
            view.glyph_id_strict(0x20),
            Err(Error::CorruptTable { tag: Tag::CMAP, .. })
        ));
    }

    #[test]
    fn test_format4_character_iteration() {
        let model = Format4Model::from_mappings(&[(0x41, 1), (0x42, 2), (0x50, 7)]).unwrap();
        let view = Format4::new(serialized(&model));
        let characters: Vec<u32> = view.characters().map(Result::unwrap).collect();
        assert_eq!(characters, vec![0x41, 0x42, 0x50, 0xFFFF]);
    }
}
