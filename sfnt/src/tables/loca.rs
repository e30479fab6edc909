use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};

/// This table stores the offsets to the locations of the glyphs in the font,
/// relative to the beginning of the glyph data table: `num_glyphs + 1`
/// non-decreasing offsets, where glyph `i` occupies `[loca[i], loca[i+1])`.
/// Equal adjacent offsets denote a glyph without an outline.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/loca
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6loca.html
#[derive(Debug, PartialEq, Clone)]
pub struct Loca {
    data: FontData,
    format: LocaFormat,
    num_glyphs: u16,
}

/// Selected by `head.index_to_loc_format`: the short form stores
/// `offset / 2` as a ushort, the long form the offset itself as a ulong.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LocaFormat {
    Short,
    Long,
}

impl LocaFormat {
    pub(crate) fn from_index_to_loc_format(value: i16) -> Self {
        if value == 0 {
            LocaFormat::Short
        } else {
            LocaFormat::Long
        }
    }
}

impl Loca {
    pub fn new(data: FontData, format: LocaFormat, num_glyphs: u16) -> Self {
        Loca {
            data,
            format,
            num_glyphs,
        }
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// The offset of glyph `index` into the glyph data table; `index` may be
    /// `num_glyphs` to address the end of the last glyph.
    pub fn glyph_offset(&self, index: u16) -> Result<u32, Error> {
        if index > self.num_glyphs {
            return Err(Error::OutOfBounds);
        }
        match self.format {
            LocaFormat::Short => Ok(u32::from(self.data.read_u16(2 * index as usize)?) * 2),
            LocaFormat::Long => self.data.read_u32(4 * index as usize),
        }
    }

    /// The byte length of glyph `index`; zero means "no outline".
    pub fn glyph_length(&self, index: u16) -> Result<u32, Error> {
        if index >= self.num_glyphs {
            return Err(Error::OutOfBounds);
        }
        let start = self.glyph_offset(index)?;
        let end = self.glyph_offset(index + 1)?;
        end.checked_sub(start).ok_or_else(|| {
            Error::corrupt(
                Tag::LOCA,
                format!("offset of glyph {} exceeds its successor", index),
            )
        })
    }
}

/// The editable model behind the loca builder. Offsets are stored raw (in
/// bytes); the short/long storage form is applied on serialization and must
/// be written back to `head.index_to_loc_format` by the caller when changed.
#[derive(Debug, PartialEq, Clone)]
pub struct LocaModel {
    pub offsets: Vec<u32>,
    pub format: LocaFormat,
}

/// Inputs resolved from `head` and `maxp`, passed in at builder
/// construction.
#[derive(Debug, Clone, Copy)]
pub struct LocaDep {
    pub format: LocaFormat,
    pub num_glyphs: u16,
}

impl TableModel for LocaModel {
    type ReadDep = LocaDep;

    fn read(data: &FontData, dep: &Self::ReadDep) -> Result<Self, Error> {
        let view = Loca::new(data.clone(), dep.format, dep.num_glyphs);
        let mut offsets = Vec::with_capacity(dep.num_glyphs as usize + 1);
        for index in 0..=dep.num_glyphs {
            let offset = view.glyph_offset(index)?;
            if offsets.last().map_or(false, |previous| offset < *previous) {
                return Err(Error::corrupt(
                    Tag::LOCA,
                    format!("offsets are not monotonic at glyph {}", index),
                ));
            }
            offsets.push(offset);
        }
        Ok(LocaModel {
            offsets,
            format: dep.format,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        for offset in &self.offsets {
            match self.format {
                LocaFormat::Short => wr.write_u16::<BigEndian>((offset / 2) as u16)?,
                LocaFormat::Long => wr.write_u32::<BigEndian>(*offset)?,
            }
        }
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        let monotonic = self.offsets.windows(2).all(|pair| pair[0] <= pair[1]);
        let representable = match self.format {
            LocaFormat::Short => self
                .offsets
                .iter()
                .all(|offset| offset % 2 == 0 && offset / 2 <= u32::from(u16::max_value())),
            LocaFormat::Long => true,
        };
        !self.offsets.is_empty() && monotonic && representable
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const DEP: LocaDep = LocaDep {
        format: LocaFormat::Short,
        num_glyphs: 3,
    };

    fn serialized(model: &LocaModel) -> FontData {
        let mut buffer = WritableFontData::new();
        model.write(&mut buffer).unwrap();
        buffer.data()
    }

    #[test]
    fn test_loca_short_form_scales_offsets() {
        let model = LocaModel {
            offsets: vec![0, 36, 36, 100],
            format: LocaFormat::Short,
        };
        let data = serialized(&model);
        assert_eq!(data.len(), 8);
        assert_eq!(data.read_u16(2).unwrap(), 18);

        let view = Loca::new(data, LocaFormat::Short, 3);
        assert_eq!(view.glyph_offset(1).unwrap(), 36);
        assert_eq!(view.glyph_length(0).unwrap(), 36);
        // equal adjacent offsets denote an empty glyph
        assert_eq!(view.glyph_length(1).unwrap(), 0);
        assert_eq!(view.glyph_length(2).unwrap(), 64);
        assert!(matches!(view.glyph_length(3), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_loca_round_trip() {
        let model = LocaModel {
            offsets: vec![0, 36, 36, 100],
            format: LocaFormat::Short,
        };
        assert_eq!(LocaModel::read(&serialized(&model), &DEP).unwrap(), model);
    }

    #[test]
    fn test_loca_rejects_non_monotonic_offsets() {
        let model = LocaModel {
            offsets: vec![0, 100, 36, 100],
            format: LocaFormat::Long,
        };
        assert!(!model.ready());

        let dep = LocaDep {
            format: LocaFormat::Long,
            num_glyphs: 3,
        };
        assert!(matches!(
            LocaModel::read(&serialized(&model), &dep),
            Err(Error::CorruptTable { tag: Tag::LOCA, .. })
        ));
    }

    #[test]
    fn test_loca_short_form_requires_even_offsets() {
        let model = LocaModel {
            offsets: vec![0, 35],
            format: LocaFormat::Short,
        };
        assert!(!model.ready());
    }
}
