use std::io::Cursor;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// Byte offset of `check_sum_adjustment` within the table. The font
/// serializer patches this field after the whole-font checksum is known.
pub(crate) const CHECK_SUM_ADJUSTMENT_OFFSET: usize = 8;

const MAGIC_NUMBER: u32 = 0x5F0F3CF5;

/// The font header table.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/head
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6head.html
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(test, derive(Default))]
pub struct Head {
    /// Major version number of the font header table — set to 1.
    pub major_version: u16,
    /// Minor version number of the font header table — set to 0.
    pub minor_version: u16,
    /// Set by font manufacturer.
    pub font_revision: (i16, u16),
    /// To compute: set it to 0, sum the entire font as uint32, then store
    /// 0xB1B0AFBA - sum. If the font is used as a component in a font
    /// collection file, the value of this field will be invalidated by
    /// changes to the file structure and font table directory, and must be
    /// ignored.
    pub check_sum_adjustment: u32,
    /// Set to 0x5F0F3CF5.
    pub magic_number: u32,
    /// Bit 0: Baseline for font at y=0;
    /// Bit 1: Left sidebearing point at x=0;
    /// Bit 2: Instructions may depend on point size;
    /// Bit 3: Force ppem to integer values for all internal scaler math;
    /// Bit 4: Instructions may alter advance width.
    /// Bits 5-15: see the OpenType spec.
    pub flags: u16,
    /// Set to a value from 16 to 16384. Any value in this range is valid.
    pub units_per_em: u16,
    /// Number of seconds since 12:00 midnight that started January 1st 1904
    /// in GMT/UTC time zone.
    pub created: i64,
    /// Number of seconds since 12:00 midnight that started January 1st 1904
    /// in GMT/UTC time zone.
    pub modified: i64,
    /// Min x of all glyph bounding boxes.
    pub x_min: i16,
    /// Min y of all glyph bounding boxes.
    pub y_min: i16,
    /// Max x of all glyph bounding boxes.
    pub x_max: i16,
    /// Max y of all glyph bounding boxes.
    pub y_max: i16,
    /// Bit 0: Bold; Bit 1: Italic; Bit 2: Underline; Bit 3: Outline;
    /// Bit 4: Shadow; Bit 5: Condensed; Bit 6: Extended;
    /// Bits 7-15: Reserved (set to 0).
    pub mac_style: u16,
    /// Smallest readable size in pixels.
    pub lowest_rec_ppem: u16,
    /// Deprecated (Set to 2).
    pub font_direction_hint: i16,
    /// 0 for short offsets (Offset16), 1 for long (Offset32).
    pub index_to_loc_format: i16,
    /// 0 for current format.
    pub glyph_data_format: i16,
}

impl TableModel for Head {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let major_version = rd.read_u16::<BigEndian>()?;
        let minor_version = rd.read_u16::<BigEndian>()?;
        let decimal = rd.read_i16::<BigEndian>()?;
        let fraction = rd.read_u16::<BigEndian>()?;
        let check_sum_adjustment = rd.read_u32::<BigEndian>()?;

        let magic_number = rd.read_u32::<BigEndian>()?;
        if magic_number != MAGIC_NUMBER {
            return Err(Error::corrupt(
                Tag::HEAD,
                format!("invalid magic number 0x{:08X}", magic_number),
            ));
        }

        Ok(Head {
            major_version,
            minor_version,
            font_revision: (decimal, fraction),
            check_sum_adjustment,
            magic_number,
            flags: rd.read_u16::<BigEndian>()?,
            units_per_em: rd.read_u16::<BigEndian>()?,
            created: rd.read_i64::<BigEndian>()?,
            modified: rd.read_i64::<BigEndian>()?,
            x_min: rd.read_i16::<BigEndian>()?,
            y_min: rd.read_i16::<BigEndian>()?,
            x_max: rd.read_i16::<BigEndian>()?,
            y_max: rd.read_i16::<BigEndian>()?,
            mac_style: rd.read_u16::<BigEndian>()?,
            lowest_rec_ppem: rd.read_u16::<BigEndian>()?,
            font_direction_hint: rd.read_i16::<BigEndian>()?,
            index_to_loc_format: rd.read_i16::<BigEndian>()?,
            glyph_data_format: rd.read_i16::<BigEndian>()?,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        wr.write_u16::<BigEndian>(self.major_version)?;
        wr.write_u16::<BigEndian>(self.minor_version)?;
        wr.write_i16::<BigEndian>(self.font_revision.0)?;
        wr.write_u16::<BigEndian>(self.font_revision.1)?;
        wr.write_u32::<BigEndian>(self.check_sum_adjustment)?;
        wr.write_u32::<BigEndian>(self.magic_number)?;
        wr.write_u16::<BigEndian>(self.flags)?;
        wr.write_u16::<BigEndian>(self.units_per_em)?;
        wr.write_i64::<BigEndian>(self.created)?;
        wr.write_i64::<BigEndian>(self.modified)?;
        wr.write_i16::<BigEndian>(self.x_min)?;
        wr.write_i16::<BigEndian>(self.y_min)?;
        wr.write_i16::<BigEndian>(self.x_max)?;
        wr.write_i16::<BigEndian>(self.y_max)?;
        wr.write_u16::<BigEndian>(self.mac_style)?;
        wr.write_u16::<BigEndian>(self.lowest_rec_ppem)?;
        wr.write_i16::<BigEndian>(self.font_direction_hint)?;
        wr.write_i16::<BigEndian>(self.index_to_loc_format)?;
        wr.write_i16::<BigEndian>(self.glyph_data_format)?;
        Ok(wr.len() - start)
    }
}
