pub mod ebdt;
pub mod eblc;
pub mod ebsc;

pub use ebdt::{BitmapGlyph, Ebdt, EbdtComponent};
pub use eblc::{BitmapSize, Eblc, IndexSubtable};
pub use ebsc::{BitmapScale, Ebsc};

use crate::data::FontData;
use crate::error::Error;

/// Line metrics for one direction of an embedded bitmap strike (12 bytes).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SbitLineMetrics {
    pub ascender: i8,
    pub descender: i8,
    pub width_max: u8,
    pub caret_slope_numerator: i8,
    pub caret_slope_denominator: i8,
    pub caret_offset: i8,
    pub min_origin_sb: i8,
    pub min_advance_sb: i8,
    pub max_before_bl: i8,
    pub min_after_bl: i8,
    pub pad1: i8,
    pub pad2: i8,
}

impl SbitLineMetrics {
    pub(crate) fn read(data: &FontData, offset: usize) -> Result<Self, Error> {
        Ok(SbitLineMetrics {
            ascender: data.read_i8(offset)?,
            descender: data.read_i8(offset + 1)?,
            width_max: data.read_u8(offset + 2)?,
            caret_slope_numerator: data.read_i8(offset + 3)?,
            caret_slope_denominator: data.read_i8(offset + 4)?,
            caret_offset: data.read_i8(offset + 5)?,
            min_origin_sb: data.read_i8(offset + 6)?,
            min_advance_sb: data.read_i8(offset + 7)?,
            max_before_bl: data.read_i8(offset + 8)?,
            min_after_bl: data.read_i8(offset + 9)?,
            pad1: data.read_i8(offset + 10)?,
            pad2: data.read_i8(offset + 11)?,
        })
    }
}

/// Metrics of a bitmap glyph with distinct horizontal and vertical values
/// (8 bytes).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct BigGlyphMetrics {
    pub height: u8,
    pub width: u8,
    pub hori_bearing_x: i8,
    pub hori_bearing_y: i8,
    pub hori_advance: u8,
    pub vert_bearing_x: i8,
    pub vert_bearing_y: i8,
    pub vert_advance: u8,
}

impl BigGlyphMetrics {
    pub(crate) fn read(data: &FontData, offset: usize) -> Result<Self, Error> {
        Ok(BigGlyphMetrics {
            height: data.read_u8(offset)?,
            width: data.read_u8(offset + 1)?,
            hori_bearing_x: data.read_i8(offset + 2)?,
            hori_bearing_y: data.read_i8(offset + 3)?,
            hori_advance: data.read_u8(offset + 4)?,
            vert_bearing_x: data.read_i8(offset + 5)?,
            vert_bearing_y: data.read_i8(offset + 6)?,
            vert_advance: data.read_u8(offset + 7)?,
        })
    }
}

/// Metrics of a bitmap glyph in a single direction (5 bytes).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct SmallGlyphMetrics {
    pub height: u8,
    pub width: u8,
    pub bearing_x: i8,
    pub bearing_y: i8,
    pub advance: u8,
}

impl SmallGlyphMetrics {
    pub(crate) fn read(data: &FontData, offset: usize) -> Result<Self, Error> {
        Ok(SmallGlyphMetrics {
            height: data.read_u8(offset)?,
            width: data.read_u8(offset + 1)?,
            bearing_x: data.read_i8(offset + 2)?,
            bearing_y: data.read_i8(offset + 3)?,
            advance: data.read_u8(offset + 4)?,
        })
    }
}
