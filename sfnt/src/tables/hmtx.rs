use std::io::Cursor;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// This table contains glyph metrics used for horizontal text layout.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/hmtx
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6hmtx.html
#[derive(Debug, PartialEq, Clone)]
pub struct Hmtx {
    /// Paired advance width and left side bearing values for each glyph.
    /// Records are indexed by glyph ID.
    pub h_metrics: Vec<LongHorMetric>,
    /// Left side bearings for glyph IDs greater than or equal to
    /// `number_of_h_metrics`; those glyphs reuse the last advance width.
    pub left_side_bearings: Vec<i16>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct LongHorMetric {
    /// Advance width, in font design units.
    pub advance_width: u16,
    /// Glyph left side bearing, in font design units.
    pub lsb: i16,
}

/// How many bytes the table occupies: set by `hhea.number_of_h_metrics` and
/// `maxp.num_glyphs`, passed in at builder construction.
#[derive(Debug, Clone, Copy)]
pub struct HmtxDep {
    pub number_of_h_metrics: u16,
    pub num_glyphs: u16,
}

impl Hmtx {
    pub fn advance_width(&self, glyph_id: u16) -> Option<u16> {
        if (glyph_id as usize) < self.h_metrics.len() {
            return self.h_metrics.get(glyph_id as usize).map(|m| m.advance_width);
        }
        let runs_on = (glyph_id as usize) - self.h_metrics.len() < self.left_side_bearings.len();
        if runs_on {
            self.h_metrics.last().map(|m| m.advance_width)
        } else {
            None
        }
    }

    pub fn left_side_bearing(&self, glyph_id: u16) -> Option<i16> {
        if let Some(metric) = self.h_metrics.get(glyph_id as usize) {
            return Some(metric.lsb);
        }
        self.left_side_bearings
            .get((glyph_id as usize) - self.h_metrics.len())
            .copied()
    }
}

impl TableModel for Hmtx {
    type ReadDep = HmtxDep;

    fn read(data: &FontData, dep: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let mut h_metrics = Vec::with_capacity(dep.number_of_h_metrics as usize);
        for _ in 0..dep.number_of_h_metrics {
            h_metrics.push(LongHorMetric {
                advance_width: rd.read_u16::<BigEndian>()?,
                lsb: rd.read_i16::<BigEndian>()?,
            });
        }

        let mut left_side_bearings =
            vec![0; dep.num_glyphs.saturating_sub(dep.number_of_h_metrics) as usize];
        rd.read_i16_into::<BigEndian>(&mut left_side_bearings)?;

        Ok(Hmtx {
            h_metrics,
            left_side_bearings,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        for metric in &self.h_metrics {
            wr.write_u16::<BigEndian>(metric.advance_width)?;
            wr.write_i16::<BigEndian>(metric.lsb)?;
        }
        for bearing in &self.left_side_bearings {
            wr.write_i16::<BigEndian>(*bearing)?;
        }
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        // all advance widths can be stored; the trailing bearings only make
        // sense after at least one full metric
        self.h_metrics.len() <= u16::max_value() as usize
            && (!self.h_metrics.is_empty() || self.left_side_bearings.is_empty())
    }
}
