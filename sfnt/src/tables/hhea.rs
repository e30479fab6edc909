use std::io::Cursor;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// The horizontal header table.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hhea
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hhea.html
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(test, derive(Default))]
pub struct Hhea {
    pub major_version: u16,
    pub minor_version: u16,
    /// Typographic ascent (distance from baseline of highest ascender).
    pub ascender: i16,
    /// Typographic descent (distance from baseline of lowest descender).
    pub descender: i16,
    /// Typographic line gap.
    pub line_gap: i16,
    /// Maximum advance width value in 'hmtx' table.
    pub advance_width_max: u16,
    /// Minimum left sidebearing value in 'hmtx' table.
    pub min_left_side_bearing: i16,
    /// Minimum right sidebearing value.
    pub min_right_side_bearing: i16,
    /// Max(lsb + (xMax - xMin)).
    pub x_max_extent: i16,
    /// Used to calculate the slope of the cursor (rise/run); 1 for vertical.
    pub caret_slope_rise: i16,
    /// 0 for vertical.
    pub caret_slope_run: i16,
    /// Set to 0 for non-slanted fonts.
    pub caret_offset: i16,
    /// 0 for current format.
    pub metric_data_format: i16,
    /// Number of hMetric entries in 'hmtx' table.
    pub number_of_h_metrics: u16,
}

impl TableModel for Hhea {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let major_version = rd.read_u16::<BigEndian>()?;
        let minor_version = rd.read_u16::<BigEndian>()?;
        let ascender = rd.read_i16::<BigEndian>()?;
        let descender = rd.read_i16::<BigEndian>()?;
        let line_gap = rd.read_i16::<BigEndian>()?;
        let advance_width_max = rd.read_u16::<BigEndian>()?;
        let min_left_side_bearing = rd.read_i16::<BigEndian>()?;
        let min_right_side_bearing = rd.read_i16::<BigEndian>()?;
        let x_max_extent = rd.read_i16::<BigEndian>()?;
        let caret_slope_rise = rd.read_i16::<BigEndian>()?;
        let caret_slope_run = rd.read_i16::<BigEndian>()?;
        let caret_offset = rd.read_i16::<BigEndian>()?;
        // four reserved shorts, set to 0
        for _ in 0..4 {
            rd.read_i16::<BigEndian>()?;
        }
        Ok(Hhea {
            major_version,
            minor_version,
            ascender,
            descender,
            line_gap,
            advance_width_max,
            min_left_side_bearing,
            min_right_side_bearing,
            x_max_extent,
            caret_slope_rise,
            caret_slope_run,
            caret_offset,
            metric_data_format: rd.read_i16::<BigEndian>()?,
            number_of_h_metrics: rd.read_u16::<BigEndian>()?,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        wr.write_u16::<BigEndian>(self.major_version)?;
        wr.write_u16::<BigEndian>(self.minor_version)?;
        wr.write_i16::<BigEndian>(self.ascender)?;
        wr.write_i16::<BigEndian>(self.descender)?;
        wr.write_i16::<BigEndian>(self.line_gap)?;
        wr.write_u16::<BigEndian>(self.advance_width_max)?;
        wr.write_i16::<BigEndian>(self.min_left_side_bearing)?;
        wr.write_i16::<BigEndian>(self.min_right_side_bearing)?;
        wr.write_i16::<BigEndian>(self.x_max_extent)?;
        wr.write_i16::<BigEndian>(self.caret_slope_rise)?;
        wr.write_i16::<BigEndian>(self.caret_slope_run)?;
        wr.write_i16::<BigEndian>(self.caret_offset)?;
        for _ in 0..4 {
            wr.write_i16::<BigEndian>(0)?;
        }
        wr.write_i16::<BigEndian>(self.metric_data_format)?;
        wr.write_u16::<BigEndian>(self.number_of_h_metrics)?;
        Ok(wr.len() - start)
    }
}
