use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::cmap::{CharacterRanges, GlyphLookup};
use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};

pub(crate) const GROUPS_BASE: usize = 16;

/// Segmented coverage for 32-bit character codes: sequential map groups
/// `{start_char_code, end_char_code, start_glyph_id}`, each group mapping a
/// character run onto a consecutive glyph run.
#[derive(Debug, PartialEq, Clone)]
pub struct Format12 {
    data: FontData,
}

impl Format12 {
    pub(crate) fn new(data: FontData) -> Self {
        Format12 { data }
    }

    pub fn language(&self) -> Result<u32, Error> {
        self.data.read_u32(8)
    }

    pub fn num_groups(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32(12)? as usize)
    }

    pub(crate) fn group(data: &FontData, index: usize) -> Result<(u32, u32, u32), Error> {
        let base = GROUPS_BASE + index * 12;
        Ok((
            data.read_u32(base)?,
            data.read_u32(base + 4)?,
            data.read_u32(base + 8)?,
        ))
    }

    pub(crate) fn search_groups(
        data: &FontData,
        num_groups: usize,
        character: u32,
    ) -> Result<Option<usize>, Error> {
        data.search_u32(GROUPS_BASE, 12, GROUPS_BASE + 4, 12, num_groups, character)
    }
}

impl GlyphLookup for Format12 {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        let group = match Format12::search_groups(&self.data, self.num_groups()?, character)? {
            Some(group) => group,
            None => return Ok(0),
        };
        let (start_char_code, _, start_glyph_id) = Format12::group(&self.data, group)?;
        Ok((start_glyph_id + (character - start_char_code)) as u16)
    }
}

impl CharacterRanges for Format12 {
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

/// One sequential map group of the editable model.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct MapGroup {
    pub start_char_code: u32,
    pub end_char_code: u32,
    pub start_glyph_id: u32,
}

/// The editable model behind the format 12 builder.
#[derive(Debug, PartialEq, Clone)]
pub struct Format12Model {
    pub language: u32,
    pub groups: Vec<MapGroup>,
}

impl Format12Model {
    pub(crate) fn read(data: FontData) -> Result<Self, Error> {
        let view = Format12::new(data.clone());
        let num_groups = view.num_groups()?;
        let mut groups = Vec::with_capacity(num_groups);
        for i in 0..num_groups {
            let (start_char_code, end_char_code, start_glyph_id) = Format12::group(&data, i)?;
            if start_char_code > end_char_code {
                return Err(Error::corrupt(
                    Tag::CMAP,
                    format!("format 12 group {} starts after its end", i),
                ));
            }
            if let Some(previous) = groups.last().map(|g: &MapGroup| g.end_char_code) {
                if start_char_code <= previous {
                    return Err(Error::corrupt(
                        Tag::CMAP,
                        format!("format 12 group {} overlaps its predecessor", i),
                    ));
                }
            }
            groups.push(MapGroup {
                start_char_code,
                end_char_code,
                start_glyph_id,
            });
        }
        Ok(Format12Model {
            language: view.language()?,
            groups,
        })
    }

    /// Builds a minimal model: runs of consecutive characters mapping to
    /// consecutive glyph ids collapse into one group.
    pub fn from_mappings(mappings: &[(u32, u16)]) -> Result<Self, Error> {
        let mut mappings = mappings.to_vec();
        mappings.sort_unstable();
        mappings.dedup();
        for pair in mappings.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(Error::corrupt(
                    Tag::CMAP,
                    format!("character 0x{:06X} mapped to two glyphs", pair[0].0),
                ));
            }
        }

        let mut groups: Vec<MapGroup> = Vec::new();
        for (character, glyph_id) in mappings {
            let glyph_id = glyph_id as u32;
            let extends = groups.last().map_or(false, |g| {
                g.end_char_code + 1 == character
                    && g.start_glyph_id + (character - g.start_char_code) == glyph_id
            });
            if let (true, Some(group)) = (extends, groups.last_mut()) {
                group.end_char_code = character;
            } else {
                groups.push(MapGroup {
                    start_char_code: character,
                    end_char_code: character,
                    start_glyph_id: glyph_id,
                });
            }
        }
        Ok(Format12Model { language: 0, groups })
    }

    pub(crate) fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        let length = GROUPS_BASE + 12 * self.groups.len();
        wr.write_u16::<BigEndian>(12)?;
        wr.write_u16::<BigEndian>(0)?; // reserved
        wr.write_u32::<BigEndian>(length as u32)?;
        wr.write_u32::<BigEndian>(self.language)?;
        wr.write_u32::<BigEndian>(self.groups.len() as u32)?;
        for group in &self.groups {
            wr.write_u32::<BigEndian>(group.start_char_code)?;
            wr.write_u32::<BigEndian>(group.end_char_code)?;
            wr.write_u32::<BigEndian>(group.start_glyph_id)?;
        }
        Ok(wr.len() - start)
    }

    pub(crate) fn ready(&self) -> bool {
        self.groups
            .windows(2)
            .all(|pair| pair[0].end_char_code < pair[1].start_char_code)
            && self.groups.iter().all(|g| g.start_char_code <= g.end_char_code)
    }
}
