use std::io::Cursor;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// This table establishes the memory requirements for this font.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/maxp
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6maxp.html
#[derive(Debug, PartialEq, Clone)]
pub enum Maxp {
    // Version 0.5
    Cff(CffMaxp),
    // Version 1.0
    TrueType(TrueTypeMaxp),
}

#[derive(Debug, PartialEq, Clone)]
pub struct CffMaxp {
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
}

#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(test, derive(Default))]
pub struct TrueTypeMaxp {
    /// The number of glyphs in the font.
    pub num_glyphs: u16,
    /// Maximum points in a non-composite glyph.
    pub max_points: u16,
    /// Maximum contours in a non-composite glyph.
    pub max_contours: u16,
    /// Maximum points in a composite glyph.
    pub max_component_points: u16,
    /// Maximum contours in a composite glyph.
    pub max_component_contours: u16,
    /// 1 if instructions do not use the twilight zone (Z0), 2 otherwise.
    pub max_zones: u16,
    /// Maximum points used in Z0.
    pub max_twilight_points: u16,
    /// Number of Storage Area locations.
    pub max_storage: u16,
    /// Number of FDEFs, equal to the highest function number + 1.
    pub max_function_defs: u16,
    /// Number of IDEFs.
    pub max_instruction_defs: u16,
    /// Maximum stack depth across font and CVT programs and all glyph
    /// instructions.
    pub max_stack_elements: u16,
    /// Maximum byte count for glyph instructions.
    pub max_size_of_instructions: u16,
    /// Maximum number of components referenced at top level for any
    /// composite glyph.
    pub max_component_elements: u16,
    /// Maximum levels of recursion; 1 for simple components.
    pub max_component_depth: u16,
}

impl Maxp {
    pub fn num_glyphs(&self) -> u16 {
        match self {
            Maxp::Cff(table) => table.num_glyphs,
            Maxp::TrueType(table) => table.num_glyphs,
        }
    }
}

impl TableModel for Maxp {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let version = rd.read_u32::<BigEndian>()?;
        match version {
            0x00005000 => Ok(Maxp::Cff(CffMaxp {
                num_glyphs: rd.read_u16::<BigEndian>()?,
            })),
            0x00010000 => Ok(Maxp::TrueType(TrueTypeMaxp {
                num_glyphs: rd.read_u16::<BigEndian>()?,
                max_points: rd.read_u16::<BigEndian>()?,
                max_contours: rd.read_u16::<BigEndian>()?,
                max_component_points: rd.read_u16::<BigEndian>()?,
                max_component_contours: rd.read_u16::<BigEndian>()?,
                max_zones: rd.read_u16::<BigEndian>()?,
                max_twilight_points: rd.read_u16::<BigEndian>()?,
                max_storage: rd.read_u16::<BigEndian>()?,
                max_function_defs: rd.read_u16::<BigEndian>()?,
                max_instruction_defs: rd.read_u16::<BigEndian>()?,
                max_stack_elements: rd.read_u16::<BigEndian>()?,
                max_size_of_instructions: rd.read_u16::<BigEndian>()?,
                max_component_elements: rd.read_u16::<BigEndian>()?,
                max_component_depth: rd.read_u16::<BigEndian>()?,
            })),
            _ => Err(Error::corrupt(
                Tag::MAXP,
                format!("invalid version 0x{:08X}", version),
            )),
        }
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        match self {
            Maxp::Cff(table) => {
                wr.write_u32::<BigEndian>(0x00005000)?;
                wr.write_u16::<BigEndian>(table.num_glyphs)?;
            }
            Maxp::TrueType(table) => {
                wr.write_u32::<BigEndian>(0x00010000)?;
                wr.write_u16::<BigEndian>(table.num_glyphs)?;
                wr.write_u16::<BigEndian>(table.max_points)?;
                wr.write_u16::<BigEndian>(table.max_contours)?;
                wr.write_u16::<BigEndian>(table.max_component_points)?;
                wr.write_u16::<BigEndian>(table.max_component_contours)?;
                wr.write_u16::<BigEndian>(table.max_zones)?;
                wr.write_u16::<BigEndian>(table.max_twilight_points)?;
                wr.write_u16::<BigEndian>(table.max_storage)?;
                wr.write_u16::<BigEndian>(table.max_function_defs)?;
                wr.write_u16::<BigEndian>(table.max_instruction_defs)?;
                wr.write_u16::<BigEndian>(table.max_stack_elements)?;
                wr.write_u16::<BigEndian>(table.max_size_of_instructions)?;
                wr.write_u16::<BigEndian>(table.max_component_elements)?;
                wr.write_u16::<BigEndian>(table.max_component_depth)?;
            }
        }
        Ok(wr.len() - start)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_maxp_true_type_encode_decode() {
        let maxp = Maxp::TrueType(TrueTypeMaxp {
            num_glyphs: 2,
            max_points: 12,
            max_contours: 2,
            max_zones: 2,
            ..Default::default()
        });

        let mut buffer = WritableFontData::new();
        assert_eq!(maxp.write(&mut buffer).unwrap(), 32);
        assert_eq!(Maxp::read(&buffer.data(), &()).unwrap(), maxp);
    }

    #[test]
    fn test_maxp_cff_encode_decode() {
        let data = FontData::new(vec![
            0x00, 0x00, 0x50, 0x00, // version
            0x22, 0xC2, // number of glyphs
        ]);
        let maxp = Maxp::read(&data, &()).unwrap();
        assert_eq!(maxp.num_glyphs(), 8898);

        let mut buffer = WritableFontData::new();
        maxp.write(&mut buffer).unwrap();
        assert_eq!(buffer.bytes(), data.bytes());
    }

    #[test]
    fn test_maxp_invalid_version() {
        let data = FontData::new(vec![0x00, 0x02, 0x00, 0x00, 0x00, 0x01]);
        assert!(matches!(
            Maxp::read(&data, &()),
            Err(Error::CorruptTable { tag: Tag::MAXP, .. })
        ));
    }
}
