use crate::data::FontData;
use crate::error::Error;
use crate::tables::bitmap::{BigGlyphMetrics, SbitLineMetrics};
use crate::tag::Tag;

const SIZE_TABLE_BASE: usize = 8;
const SIZE_TABLE_LEN: usize = 48;

/// The embedded bitmap location table: per strike (size), line metrics, the
/// covered glyph range and an array of index subtables mapping glyph ids to
/// image ranges within the 'EBDT' table.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/eblc
#[derive(Debug, PartialEq, Clone)]
pub struct Eblc {
    data: FontData,
}

impl Eblc {
    pub fn new(data: FontData) -> Self {
        Eblc { data }
    }

    pub fn major_version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn minor_version(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    pub fn num_sizes(&self) -> Result<usize, Error> {
        Ok(self.data.read_u32_as_i32(4)? as usize)
    }

    pub fn bitmap_size(&self, index: usize) -> Result<BitmapSize, Error> {
        if index >= self.num_sizes()? {
            return Err(Error::OutOfBounds);
        }
        Ok(BitmapSize {
            table: self.data.clone(),
            offset: SIZE_TABLE_BASE + index * SIZE_TABLE_LEN,
        })
    }
}

/// One strike of the table. The view keeps the whole 'EBLC' data around
/// because the index subtable array is addressed relative to the table
/// start.
#[derive(Debug, PartialEq, Clone)]
pub struct BitmapSize {
    table: FontData,
    offset: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct IndexSubtableArrayEntry {
    pub first_glyph_index: u16,
    pub last_glyph_index: u16,
    /// Relative to the strike's index subtable array offset.
    pub additional_offset: u32,
}

impl BitmapSize {
    pub fn index_subtable_array_offset(&self) -> Result<u32, Error> {
        self.table.read_u32(self.offset)
    }

    pub fn index_tables_size(&self) -> Result<u32, Error> {
        self.table.read_u32(self.offset + 4)
    }

    pub fn number_of_index_subtables(&self) -> Result<usize, Error> {
        Ok(self.table.read_u32_as_i32(self.offset + 8)? as usize)
    }

    pub fn color_ref(&self) -> Result<u32, Error> {
        self.table.read_u32(self.offset + 12)
    }

    pub fn hori(&self) -> Result<SbitLineMetrics, Error> {
        SbitLineMetrics::read(&self.table, self.offset + 16)
    }

    pub fn vert(&self) -> Result<SbitLineMetrics, Error> {
        SbitLineMetrics::read(&self.table, self.offset + 28)
    }

    pub fn start_glyph_index(&self) -> Result<u16, Error> {
        self.table.read_u16(self.offset + 40)
    }

    pub fn end_glyph_index(&self) -> Result<u16, Error> {
        self.table.read_u16(self.offset + 42)
    }

    pub fn ppem_x(&self) -> Result<u8, Error> {
        self.table.read_u8(self.offset + 44)
    }

    pub fn ppem_y(&self) -> Result<u8, Error> {
        self.table.read_u8(self.offset + 45)
    }

    pub fn bit_depth(&self) -> Result<u8, Error> {
        self.table.read_u8(self.offset + 46)
    }

    pub fn flags(&self) -> Result<i8, Error> {
        self.table.read_i8(self.offset + 47)
    }

    pub fn index_subtable_array_entry(
        &self,
        index: usize,
    ) -> Result<IndexSubtableArrayEntry, Error> {
        if index >= self.number_of_index_subtables()? {
            return Err(Error::OutOfBounds);
        }
        let base = self.index_subtable_array_offset()? as usize + index * 8;
        Ok(IndexSubtableArrayEntry {
            first_glyph_index: self.table.read_u16(base)?,
            last_glyph_index: self.table.read_u16(base + 2)?,
            additional_offset: self.table.read_u32(base + 4)?,
        })
    }

    pub fn index_subtable(&self, index: usize) -> Result<IndexSubtable, Error> {
        let entry = self.index_subtable_array_entry(index)?;
        let offset =
            self.index_subtable_array_offset()? as usize + entry.additional_offset as usize;
        IndexSubtable::read(
            self.table.slice_from(offset)?,
            entry.first_glyph_index,
            entry.last_glyph_index,
        )
    }

    /// The index subtable covering `glyph_id`, if any.
    pub fn index_subtable_for_glyph(
        &self,
        glyph_id: u16,
    ) -> Result<Option<IndexSubtable>, Error> {
        for index in 0..self.number_of_index_subtables()? {
            let entry = self.index_subtable_array_entry(index)?;
            if (entry.first_glyph_index..=entry.last_glyph_index).contains(&glyph_id) {
                return self.index_subtable(index).map(Some);
            }
        }
        Ok(None)
    }
}

/// An index subtable: one of five layouts trading lookup time against
/// storage for the glyph-id to image-range mapping.
#[derive(Debug, PartialEq, Clone)]
pub enum IndexSubtable {
    /// Proportional metrics, 32-bit offset array.
    Format1(IndexSubtableData),
    /// Monospaced: one image size, metrics shared by all glyphs.
    Format2(IndexSubtableData),
    /// Proportional metrics, 16-bit offset array.
    Format3(IndexSubtableData),
    /// Sparse glyph set: sorted `(glyph id, offset)` pairs.
    Format4(IndexSubtableData),
    /// Sparse monospaced: one image size, sorted glyph id array.
    Format5(IndexSubtableData),
}

/// The shared backing of an index subtable: its bytes (starting at the
/// subtable header) and the glyph range it covers.
#[derive(Debug, PartialEq, Clone)]
pub struct IndexSubtableData {
    data: FontData,
    first_glyph_index: u16,
    last_glyph_index: u16,
}

impl IndexSubtable {
    pub(crate) fn read(
        data: FontData,
        first_glyph_index: u16,
        last_glyph_index: u16,
    ) -> Result<Self, Error> {
        let index_format = data.read_u16(0)?;
        let inner = IndexSubtableData {
            data,
            first_glyph_index,
            last_glyph_index,
        };
        match index_format {
            1 => Ok(IndexSubtable::Format1(inner)),
            2 => Ok(IndexSubtable::Format2(inner)),
            3 => Ok(IndexSubtable::Format3(inner)),
            4 => Ok(IndexSubtable::Format4(inner)),
            5 => Ok(IndexSubtable::Format5(inner)),
            _ => Err(Error::UnknownFormat {
                tag: Tag::EBLC,
                format: index_format,
            }),
        }
    }

    fn inner(&self) -> &IndexSubtableData {
        match self {
            IndexSubtable::Format1(inner)
            | IndexSubtable::Format2(inner)
            | IndexSubtable::Format3(inner)
            | IndexSubtable::Format4(inner)
            | IndexSubtable::Format5(inner) => inner,
        }
    }

    pub fn index_format(&self) -> Result<u16, Error> {
        self.inner().data.read_u16(0)
    }

    pub fn image_format(&self) -> Result<u16, Error> {
        self.inner().data.read_u16(2)
    }

    /// Offset of this subtable's image block within the 'EBDT' table.
    pub fn image_data_offset(&self) -> Result<u32, Error> {
        self.inner().data.read_u32(4)
    }

    pub fn first_glyph_index(&self) -> u16 {
        self.inner().first_glyph_index
    }

    pub fn last_glyph_index(&self) -> u16 {
        self.inner().last_glyph_index
    }

    /// The metrics shared by all glyphs of a monospaced subtable (formats 2
    /// and 5).
    pub fn big_metrics(&self) -> Result<Option<BigGlyphMetrics>, Error> {
        match self {
            IndexSubtable::Format2(inner) | IndexSubtable::Format5(inner) => {
                BigGlyphMetrics::read(&inner.data, 12).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn check_range(&self, glyph_id: u16) -> Result<u32, Error> {
        let inner = self.inner();
        if glyph_id < inner.first_glyph_index || glyph_id > inner.last_glyph_index {
            return Err(Error::GlyphOutOfRange {
                glyph_id,
                first: inner.first_glyph_index,
                last: inner.last_glyph_index,
            });
        }
        Ok(u32::from(glyph_id - inner.first_glyph_index))
    }

    /// Position of the glyph's `(glyph id, offset)` pair in a format 4
    /// subtable, or of its id in a format 5 glyph id array.
    fn search_sparse(&self, glyph_id: u16) -> Result<Option<usize>, Error> {
        let inner = self.inner();
        match self {
            IndexSubtable::Format4(_) => {
                let num_glyphs = inner.data.read_u32(8)? as usize;
                inner.data.search_u16(12, 4, 12, 4, num_glyphs, glyph_id)
            }
            IndexSubtable::Format5(_) => {
                let num_glyphs = inner.data.read_u32(20)? as usize;
                inner.data.search_u16(24, 2, 24, 2, num_glyphs, glyph_id)
            }
            _ => Ok(None),
        }
    }

    /// The start of the glyph's image, relative to `image_data_offset`.
    /// `Ok(None)` means the glyph is within the covered range but has no
    /// image (sparse formats 4 and 5).
    pub fn glyph_start_offset(&self, glyph_id: u16) -> Result<Option<u32>, Error> {
        let index = self.check_range(glyph_id)?;
        let inner = self.inner();
        match self {
            IndexSubtable::Format1(_) => {
                inner.data.read_u32(8 + 4 * index as usize).map(Some)
            }
            IndexSubtable::Format2(_) => {
                let image_size = inner.data.read_u32(8)?;
                Ok(Some(index * image_size))
            }
            IndexSubtable::Format3(_) => Ok(Some(u32::from(
                inner.data.read_u16(8 + 2 * index as usize)?,
            ))),
            IndexSubtable::Format4(_) => match self.search_sparse(glyph_id)? {
                Some(pair) => Ok(Some(u32::from(inner.data.read_u16(12 + 4 * pair + 2)?))),
                None => Ok(None),
            },
            IndexSubtable::Format5(_) => match self.search_sparse(glyph_id)? {
                Some(position) => {
                    let image_size = inner.data.read_u32(8)?;
                    Ok(Some(position as u32 * image_size))
                }
                None => Ok(None),
            },
        }
    }

    /// The byte length of the glyph's image; `Ok(None)` as for
    /// [`IndexSubtable::glyph_start_offset`].
    pub fn glyph_length(&self, glyph_id: u16) -> Result<Option<u32>, Error> {
        let index = self.check_range(glyph_id)?;
        let inner = self.inner();
        match self {
            IndexSubtable::Format1(_) => {
                let start = inner.data.read_u32(8 + 4 * index as usize)?;
                let end = inner.data.read_u32(8 + 4 * (index as usize + 1))?;
                end.checked_sub(start).ok_or_else(|| {
                    Error::corrupt(Tag::EBLC, "format 1 offsets are not monotonic")
                })
                .map(Some)
            }
            IndexSubtable::Format2(_) | IndexSubtable::Format5(_) => {
                match self.glyph_start_offset(glyph_id)? {
                    Some(_) => inner.data.read_u32(8).map(Some),
                    None => Ok(None),
                }
            }
            IndexSubtable::Format3(_) => {
                let start = u32::from(inner.data.read_u16(8 + 2 * index as usize)?);
                let end = u32::from(inner.data.read_u16(8 + 2 * (index as usize + 1))?);
                end.checked_sub(start).ok_or_else(|| {
                    Error::corrupt(Tag::EBLC, "format 3 offsets are not monotonic")
                })
                .map(Some)
            }
            IndexSubtable::Format4(_) => match self.search_sparse(glyph_id)? {
                Some(pair) => {
                    let start = u32::from(inner.data.read_u16(12 + 4 * pair + 2)?);
                    let end = u32::from(inner.data.read_u16(12 + 4 * (pair + 1) + 2)?);
                    end.checked_sub(start).ok_or_else(|| {
                        Error::corrupt(Tag::EBLC, "format 4 offsets are not monotonic")
                    })
                    .map(Some)
                }
                None => Ok(None),
            },
        }
    }
}
