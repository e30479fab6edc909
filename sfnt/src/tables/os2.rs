use std::io::{Cursor, Read, Write};

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// The OS/2 and Windows metrics table. Versions 0 through 5 append trailing
/// field groups; the groups present are gated by the version number.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/os2
#[derive(Debug, PartialEq, Clone)]
pub struct Os2 {
    pub version: u16,
    pub x_avg_char_width: i16,
    pub us_weight_class: u16,
    pub us_width_class: u16,
    pub fs_type: u16,
    pub y_subscript_x_size: i16,
    pub y_subscript_y_size: i16,
    pub y_subscript_x_offset: i16,
    pub y_subscript_y_offset: i16,
    pub y_superscript_x_size: i16,
    pub y_superscript_y_size: i16,
    pub y_superscript_x_offset: i16,
    pub y_superscript_y_offset: i16,
    pub y_strikeout_size: i16,
    pub y_strikeout_position: i16,
    pub s_family_class: i16,
    pub panose: [u8; 10],
    pub ul_unicode_range: [u32; 4],
    pub ach_vend_id: Tag,
    pub fs_selection: u16,
    pub us_first_char_index: u16,
    pub us_last_char_index: u16,
    pub s_typo_ascender: i16,
    pub s_typo_descender: i16,
    pub s_typo_line_gap: i16,
    pub us_win_ascent: u16,
    pub us_win_descent: u16,
    /// Version >= 1.
    pub ul_code_page_range: Option<[u32; 2]>,
    /// Version >= 2.
    pub v2: Option<Os2Version2>,
    /// Version 5.
    pub optical_point_size: Option<(u16, u16)>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Os2Version2 {
    pub sx_height: i16,
    pub s_cap_height: i16,
    pub us_default_char: u16,
    pub us_break_char: u16,
    pub us_max_context: u16,
}

impl TableModel for Os2 {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let version = rd.read_u16::<BigEndian>()?;
        if version > 5 {
            return Err(Error::corrupt(
                Tag::OS2,
                format!("unsupported version {}", version),
            ));
        }

        let x_avg_char_width = rd.read_i16::<BigEndian>()?;
        let us_weight_class = rd.read_u16::<BigEndian>()?;
        let us_width_class = rd.read_u16::<BigEndian>()?;
        let fs_type = rd.read_u16::<BigEndian>()?;
        let y_subscript_x_size = rd.read_i16::<BigEndian>()?;
        let y_subscript_y_size = rd.read_i16::<BigEndian>()?;
        let y_subscript_x_offset = rd.read_i16::<BigEndian>()?;
        let y_subscript_y_offset = rd.read_i16::<BigEndian>()?;
        let y_superscript_x_size = rd.read_i16::<BigEndian>()?;
        let y_superscript_y_size = rd.read_i16::<BigEndian>()?;
        let y_superscript_x_offset = rd.read_i16::<BigEndian>()?;
        let y_superscript_y_offset = rd.read_i16::<BigEndian>()?;
        let y_strikeout_size = rd.read_i16::<BigEndian>()?;
        let y_strikeout_position = rd.read_i16::<BigEndian>()?;
        let s_family_class = rd.read_i16::<BigEndian>()?;
        let mut panose = [0u8; 10];
        rd.read_exact(&mut panose)?;
        let mut ul_unicode_range = [0u32; 4];
        for range in &mut ul_unicode_range {
            *range = rd.read_u32::<BigEndian>()?;
        }
        let ach_vend_id = Tag::from_u32(rd.read_u32::<BigEndian>()?);
        let fs_selection = rd.read_u16::<BigEndian>()?;
        let us_first_char_index = rd.read_u16::<BigEndian>()?;
        let us_last_char_index = rd.read_u16::<BigEndian>()?;
        let s_typo_ascender = rd.read_i16::<BigEndian>()?;
        let s_typo_descender = rd.read_i16::<BigEndian>()?;
        let s_typo_line_gap = rd.read_i16::<BigEndian>()?;
        let us_win_ascent = rd.read_u16::<BigEndian>()?;
        let us_win_descent = rd.read_u16::<BigEndian>()?;

        let ul_code_page_range = if version >= 1 {
            Some([rd.read_u32::<BigEndian>()?, rd.read_u32::<BigEndian>()?])
        } else {
            None
        };
        let v2 = if version >= 2 {
            Some(Os2Version2 {
                sx_height: rd.read_i16::<BigEndian>()?,
                s_cap_height: rd.read_i16::<BigEndian>()?,
                us_default_char: rd.read_u16::<BigEndian>()?,
                us_break_char: rd.read_u16::<BigEndian>()?,
                us_max_context: rd.read_u16::<BigEndian>()?,
            })
        } else {
            None
        };
        let optical_point_size = if version >= 5 {
            Some((rd.read_u16::<BigEndian>()?, rd.read_u16::<BigEndian>()?))
        } else {
            None
        };

        Ok(Os2 {
            version,
            x_avg_char_width,
            us_weight_class,
            us_width_class,
            fs_type,
            y_subscript_x_size,
            y_subscript_y_size,
            y_subscript_x_offset,
            y_subscript_y_offset,
            y_superscript_x_size,
            y_superscript_y_size,
            y_superscript_x_offset,
            y_superscript_y_offset,
            y_strikeout_size,
            y_strikeout_position,
            s_family_class,
            panose,
            ul_unicode_range,
            ach_vend_id,
            fs_selection,
            us_first_char_index,
            us_last_char_index,
            s_typo_ascender,
            s_typo_descender,
            s_typo_line_gap,
            us_win_ascent,
            us_win_descent,
            ul_code_page_range,
            v2,
            optical_point_size,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        wr.write_u16::<BigEndian>(self.version)?;
        wr.write_i16::<BigEndian>(self.x_avg_char_width)?;
        wr.write_u16::<BigEndian>(self.us_weight_class)?;
        wr.write_u16::<BigEndian>(self.us_width_class)?;
        wr.write_u16::<BigEndian>(self.fs_type)?;
        wr.write_i16::<BigEndian>(self.y_subscript_x_size)?;
        wr.write_i16::<BigEndian>(self.y_subscript_y_size)?;
        wr.write_i16::<BigEndian>(self.y_subscript_x_offset)?;
        wr.write_i16::<BigEndian>(self.y_subscript_y_offset)?;
        wr.write_i16::<BigEndian>(self.y_superscript_x_size)?;
        wr.write_i16::<BigEndian>(self.y_superscript_y_size)?;
        wr.write_i16::<BigEndian>(self.y_superscript_x_offset)?;
        wr.write_i16::<BigEndian>(self.y_superscript_y_offset)?;
        wr.write_i16::<BigEndian>(self.y_strikeout_size)?;
        wr.write_i16::<BigEndian>(self.y_strikeout_position)?;
        wr.write_i16::<BigEndian>(self.s_family_class)?;
        wr.write_all(&self.panose)?;
        for range in &self.ul_unicode_range {
            wr.write_u32::<BigEndian>(*range)?;
        }
        wr.write_u32::<BigEndian>(self.ach_vend_id.as_u32())?;
        wr.write_u16::<BigEndian>(self.fs_selection)?;
        wr.write_u16::<BigEndian>(self.us_first_char_index)?;
        wr.write_u16::<BigEndian>(self.us_last_char_index)?;
        wr.write_i16::<BigEndian>(self.s_typo_ascender)?;
        wr.write_i16::<BigEndian>(self.s_typo_descender)?;
        wr.write_i16::<BigEndian>(self.s_typo_line_gap)?;
        wr.write_u16::<BigEndian>(self.us_win_ascent)?;
        wr.write_u16::<BigEndian>(self.us_win_descent)?;
        if let Some(ranges) = &self.ul_code_page_range {
            wr.write_u32::<BigEndian>(ranges[0])?;
            wr.write_u32::<BigEndian>(ranges[1])?;
        }
        if let Some(v2) = &self.v2 {
            wr.write_i16::<BigEndian>(v2.sx_height)?;
            wr.write_i16::<BigEndian>(v2.s_cap_height)?;
            wr.write_u16::<BigEndian>(v2.us_default_char)?;
            wr.write_u16::<BigEndian>(v2.us_break_char)?;
            wr.write_u16::<BigEndian>(v2.us_max_context)?;
        }
        if let Some((lower, upper)) = self.optical_point_size {
            wr.write_u16::<BigEndian>(lower)?;
            wr.write_u16::<BigEndian>(upper)?;
        }
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        // the trailing groups must agree with the declared version
        (self.version >= 1) == self.ul_code_page_range.is_some()
            && (self.version >= 2) == self.v2.is_some()
            && (self.version >= 5) == self.optical_point_size.is_some()
    }
}
