mod format0;
mod format10;
mod format12;
mod format13;
mod format14;
mod format2;
mod format4;
mod format6;
mod format8;

use std::io::Write;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};

pub use format0::Format0;
pub use format10::Format10;
pub use format12::{Format12, Format12Model};
pub use format13::Format13;
pub use format14::{Format14, VariationLookup};
pub use format2::Format2;
pub use format4::{Format4, Format4Model, Segment};
pub use format6::Format6;
pub use format8::Format8;

/// The character-to-glyph map: a set of subtables, each keyed by platform
/// and encoding id and stored in one of nine on-disk formats.
///
/// Character encodings are preferred in the following order when looking up
/// a glyph through the table as a whole:
/// | platform ID | encoding ID |                                 |
/// |-------------|-------------|---------------------------------|
/// | 0           | 4           | Unicode >= 2.0, non-BMP allowed |
/// | 3           | 10          | Windows, full Unicode           |
/// | 0           | 3           | Unicode >= 2.0, BMP only        |
/// | 3           | 1           | Windows, basic multilingual     |
///
/// See OpenType spec: https://docs.microsoft.com/en-us/typography/opentype/spec/cmap
#[derive(Debug, PartialEq, Clone)]
pub struct Cmap {
    data: FontData,
}

const PREFERRED_ENCODINGS: [(u16, u16); 4] = [(0, 4), (3, 10), (0, 3), (3, 1)];

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct EncodingRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    /// Byte offset from the beginning of the table to the subtable for this
    /// encoding.
    pub offset: u32,
}

impl Cmap {
    pub fn new(data: FontData) -> Self {
        Cmap { data }
    }

    pub fn version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn num_records(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(2)? as usize)
    }

    pub fn record(&self, index: usize) -> Result<EncodingRecord, Error> {
        if index >= self.num_records()? {
            return Err(Error::OutOfBounds);
        }
        let offset = 4 + index * 8;
        Ok(EncodingRecord {
            platform_id: self.data.read_u16(offset)?,
            encoding_id: self.data.read_u16(offset + 2)?,
            offset: self.data.read_u32(offset + 4)?,
        })
    }

    /// The subtable declared by record `index`, dispatched on its format
    /// number. Unknown formats fail with [`Error::UnknownFormat`]; the raw
    /// bytes stay available through [`Cmap::data`].
    pub fn subtable(&self, index: usize) -> Result<Subtable, Error> {
        let record = self.record(index)?;
        self.subtable_at(record.offset as usize)
    }

    /// The subtable for a platform/encoding pair, if declared.
    pub fn subtable_for(
        &self,
        platform_id: u16,
        encoding_id: u16,
    ) -> Result<Option<Subtable>, Error> {
        for index in 0..self.num_records()? {
            let record = self.record(index)?;
            if (record.platform_id, record.encoding_id) == (platform_id, encoding_id) {
                return self.subtable_at(record.offset as usize).map(Some);
            }
        }
        Ok(None)
    }

    fn subtable_at(&self, offset: usize) -> Result<Subtable, Error> {
        // subtables stay views over the whole remaining table so that lookup
        // data reaching past a (possibly wrong) declared subtable length is
        // still addressable
        let data = self.data.slice_from(offset)?;
        let format = data.read_u16(0)?;
        Ok(match format {
            0 => Subtable::Format0(Format0::new(data)),
            2 => Subtable::Format2(Format2::new(data)),
            4 => Subtable::Format4(Format4::new(data)),
            6 => Subtable::Format6(Format6::new(data)),
            8 => Subtable::Format8(Format8::new(data)),
            10 => Subtable::Format10(Format10::new(data)),
            12 => Subtable::Format12(Format12::new(data)),
            13 => Subtable::Format13(Format13::new(data)),
            14 => Subtable::Format14(Format14::new(data)),
            _ => {
                return Err(Error::UnknownFormat {
                    tag: Tag::CMAP,
                    format,
                })
            }
        })
    }

    /// Looks `character` up through the best available subtable, preferring
    /// full-Unicode encodings. NOTDEF (0) means "not mapped".
    pub fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        for (platform_id, encoding_id) in &PREFERRED_ENCODINGS {
            if let Some(subtable) = self.subtable_for(*platform_id, *encoding_id)? {
                return subtable.glyph_id(character);
            }
        }
        // fall back to the first subtable with a recognized format
        for index in 0..self.num_records()? {
            if let Ok(subtable) = self.subtable(index) {
                return subtable.glyph_id(character);
            }
        }
        Err(Error::corrupt(Tag::CMAP, "no supported subtable"))
    }

    pub fn data(&self) -> &FontData {
        &self.data
    }
}

/// Maps character codes to glyph ids; the shared behavior of every cmap
/// subtable format.
pub trait GlyphLookup {
    /// The glyph id for a character code; NOTDEF (0) when not covered.
    fn glyph_id(&self, character: u32) -> Result<u16, Error>;
}

/// The character ranges a subtable declares, driving the generic iteration
/// over covered character codes. Formats supply only the range bounds; the
/// driver emits every integer in `[start, end]`, skipping codes that map to
/// NOTDEF for sparse formats.
pub trait CharacterRanges: GlyphLookup {
    fn num_ranges(&self) -> Result<usize, Error>;
    fn range_start(&self, index: usize) -> Result<u32, Error>;
    fn range_end(&self, index: usize) -> Result<u32, Error>;

    /// Whether codes mapping to NOTDEF are gaps rather than entries.
    fn skips_unmapped(&self) -> bool {
        false
    }

    fn characters(&self) -> Characters<'_, Self>
    where
        Self: Sized,
    {
        Characters {
            table: self,
            num_ranges: None,
            range: 0,
            next_character: None,
            done: false,
        }
    }
}

/// Iterator over the character codes covered by a subtable, in range order.
pub struct Characters<'a, T> {
    table: &'a T,
    num_ranges: Option<usize>,
    range: usize,
    next_character: Option<u32>,
    done: bool,
}

impl<'a, T: CharacterRanges> Characters<'a, T> {
    fn step(&mut self) -> Result<Option<u32>, Error> {
        let num_ranges = match self.num_ranges {
            Some(n) => n,
            None => {
                let n = self.table.num_ranges()?;
                self.num_ranges = Some(n);
                n
            }
        };

        while self.range < num_ranges {
            let end = self.table.range_end(self.range)?;
            let character = match self.next_character {
                Some(c) => c,
                None => self.table.range_start(self.range)?,
            };
            if character > end {
                // empty or exhausted range
                self.range += 1;
                self.next_character = None;
                continue;
            }

            self.next_character = character.checked_add(1);
            if self.next_character.is_none() {
                self.range = num_ranges;
            }
            if self.table.skips_unmapped() && self.table.glyph_id(character)? == 0 {
                continue;
            }
            return Ok(Some(character));
        }
        Ok(None)
    }
}

impl<'a, T: CharacterRanges> Iterator for Characters<'a, T> {
    type Item = Result<u32, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(character)) => Some(Ok(character)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// A cmap subtable, tagged by its on-disk format.
#[derive(Debug, PartialEq, Clone)]
pub enum Subtable {
    Format0(Format0),
    Format2(Format2),
    Format4(Format4),
    Format6(Format6),
    Format8(Format8),
    Format10(Format10),
    Format12(Format12),
    Format13(Format13),
    Format14(Format14),
}

impl Subtable {
    pub fn format(&self) -> u16 {
        match self {
            Subtable::Format0(_) => 0,
            Subtable::Format2(_) => 2,
            Subtable::Format4(_) => 4,
            Subtable::Format6(_) => 6,
            Subtable::Format8(_) => 8,
            Subtable::Format10(_) => 10,
            Subtable::Format12(_) => 12,
            Subtable::Format13(_) => 13,
            Subtable::Format14(_) => 14,
        }
    }

    /// Iterates over the character codes the subtable covers.
    pub fn characters(&self) -> Box<dyn Iterator<Item = Result<u32, Error>> + '_> {
        match self {
            Subtable::Format0(t) => Box::new(t.characters()),
            Subtable::Format2(t) => Box::new(t.characters()),
            Subtable::Format4(t) => Box::new(t.characters()),
            Subtable::Format6(t) => Box::new(t.characters()),
            Subtable::Format8(t) => Box::new(t.characters()),
            Subtable::Format10(t) => Box::new(t.characters()),
            Subtable::Format12(t) => Box::new(t.characters()),
            Subtable::Format13(t) => Box::new(t.characters()),
            Subtable::Format14(t) => Box::new(t.characters()),
        }
    }
}

impl GlyphLookup for Subtable {
    fn glyph_id(&self, character: u32) -> Result<u16, Error> {
        match self {
            Subtable::Format0(t) => t.glyph_id(character),
            Subtable::Format2(t) => t.glyph_id(character),
            Subtable::Format4(t) => t.glyph_id(character),
            Subtable::Format6(t) => t.glyph_id(character),
            Subtable::Format8(t) => t.glyph_id(character),
            Subtable::Format10(t) => t.glyph_id(character),
            Subtable::Format12(t) => t.glyph_id(character),
            Subtable::Format13(t) => t.glyph_id(character),
            Subtable::Format14(t) => t.glyph_id(character),
        }
    }
}

/// The byte length a subtable declares for itself; capped to the bytes
/// actually available in the table.
fn subtable_length(table: &FontData, offset: usize) -> Result<usize, Error> {
    let available = table.len().checked_sub(offset).ok_or(Error::OutOfBounds)?;
    let format = table.read_u16(offset)?;
    let declared = match format {
        0 | 2 | 4 | 6 => table.read_u16(offset + 2)? as usize,
        8 | 10 | 12 | 13 => table.read_u32(offset + 4)? as usize,
        14 => table.read_u32(offset + 2)? as usize,
        _ => available,
    };
    Ok(declared.min(available))
}

/// The editable model behind the cmap builder. Subtables the crate can edit
/// (formats 4 and 12) materialize; all other formats stay raw bytes.
#[derive(Debug, PartialEq, Clone)]
pub struct CmapModel {
    pub version: u16,
    pub records: Vec<EncodingRecordModel>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct EncodingRecordModel {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub subtable: SubtableModel,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SubtableModel {
    Format4(Format4Model),
    Format12(Format12Model),
    /// Any other format, preserved verbatim.
    Raw(Vec<u8>),
}

impl SubtableModel {
    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        match self {
            SubtableModel::Format4(model) => model.write(wr),
            SubtableModel::Format12(model) => model.write(wr),
            SubtableModel::Raw(bytes) => {
                wr.write_all(bytes)?;
                Ok(bytes.len())
            }
        }
    }

    fn ready(&self) -> bool {
        match self {
            SubtableModel::Format4(model) => model.ready(),
            SubtableModel::Format12(model) => model.ready(),
            SubtableModel::Raw(bytes) => !bytes.is_empty(),
        }
    }
}

impl TableModel for CmapModel {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let view = Cmap::new(data.clone());
        let version = view.version()?;
        let mut records = Vec::with_capacity(view.num_records()?);
        for index in 0..view.num_records()? {
            let record = view.record(index)?;
            let offset = record.offset as usize;
            let format = data.read_u16(offset)?;
            let length = subtable_length(data, offset)?;
            let subtable = match format {
                4 => SubtableModel::Format4(Format4Model::read(data.slice(offset, length)?)?),
                12 => SubtableModel::Format12(Format12Model::read(data.slice(offset, length)?)?),
                _ => SubtableModel::Raw(data.read_bytes(offset, length)?.to_vec()),
            };
            records.push(EncodingRecordModel {
                platform_id: record.platform_id,
                encoding_id: record.encoding_id,
                subtable,
            });
        }
        Ok(CmapModel { version, records })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        wr.write_u16::<BigEndian>(self.version)?;
        wr.write_u16::<BigEndian>(self.records.len() as u16)?;
        // reserve the encoding records; subtable offsets are patched once
        // the subtables are laid out
        for record in &self.records {
            wr.write_u16::<BigEndian>(record.platform_id)?;
            wr.write_u16::<BigEndian>(record.encoding_id)?;
            wr.write_u32::<BigEndian>(0)?;
        }

        // equal subtables are written once and shared by offset
        let mut written: Vec<(&SubtableModel, u32)> = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            let offset = match written.iter().find(|(other, _)| **other == record.subtable) {
                Some((_, offset)) => *offset,
                None => {
                    let offset = (wr.len() - start) as u32;
                    record.subtable.write(wr)?;
                    written.push((&record.subtable, offset));
                    offset
                }
            };
            wr.write_u32_at(start + 4 + index * 8 + 4, offset);
        }
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        !self.records.is_empty() && self.records.iter().all(|r| r.subtable.ready())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_cmap_model() -> CmapModel {
        let format4 =
            Format4Model::from_mappings(&[(b'A' as u16, 1), (b'B' as u16, 2)]).unwrap();
        CmapModel {
            version: 0,
            records: vec![
                EncodingRecordModel {
                    platform_id: 0,
                    encoding_id: 3,
                    subtable: SubtableModel::Format4(format4.clone()),
                },
                EncodingRecordModel {
                    platform_id: 3,
                    encoding_id: 1,
                    subtable: SubtableModel::Format4(format4),
                },
            ],
        }
    }

    #[test]
    fn test_cmap_encode_decode() {
        let model = sample_cmap_model();
        let mut buffer = WritableFontData::new();
        model.write(&mut buffer).unwrap();

        let reread = CmapModel::read(&buffer.data(), &()).unwrap();
        assert_eq!(reread, model);
    }

    #[test]
    fn test_cmap_equal_subtables_share_storage() {
        let model = sample_cmap_model();
        let mut buffer = WritableFontData::new();
        model.write(&mut buffer).unwrap();

        let view = Cmap::new(buffer.data());
        assert_eq!(view.num_records().unwrap(), 2);
        // both records point at the same subtable bytes
        assert_eq!(
            view.record(0).unwrap().offset,
            view.record(1).unwrap().offset
        );
    }

    #[test]
    fn test_cmap_preferred_encoding_lookup() {
        let model = sample_cmap_model();
        let mut buffer = WritableFontData::new();
        model.write(&mut buffer).unwrap();

        let view = Cmap::new(buffer.data());
        assert_eq!(view.glyph_id(b'A' as u32).unwrap(), 1);
        assert_eq!(view.glyph_id(b'B' as u32).unwrap(), 2);
        assert_eq!(view.glyph_id(b'C' as u32).unwrap(), 0);
    }

    #[test]
    fn test_cmap_unknown_subtable_format() {
        let mut buffer = WritableFontData::new();
        buffer.write_u16::<BigEndian>(0).unwrap(); // version
        buffer.write_u16::<BigEndian>(1).unwrap(); // one record
        buffer.write_u16::<BigEndian>(3).unwrap();
        buffer.write_u16::<BigEndian>(1).unwrap();
        buffer.write_u32::<BigEndian>(12).unwrap(); // offset
        buffer.write_u16::<BigEndian>(99).unwrap(); // bogus format

        let view = Cmap::new(buffer.data());
        assert!(matches!(
            view.subtable(0),
            Err(Error::UnknownFormat {
                tag: Tag::CMAP,
                format: 99
            })
        ));
    }
}
