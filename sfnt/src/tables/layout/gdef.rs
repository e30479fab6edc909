use crate::data::FontData;
use crate::error::Error;
use crate::tables::layout::ClassDef;

/// The glyph definition table: glyph classes, attachment points and ligature
/// carets. Offsets of 0 mean "subtable absent".
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/gdef
#[derive(Debug, PartialEq, Clone)]
pub struct Gdef {
    data: FontData,
}

impl Gdef {
    pub fn new(data: FontData) -> Self {
        Gdef { data }
    }

    pub fn major_version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn minor_version(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    fn subtable(&self, offset_pos: usize) -> Result<Option<FontData>, Error> {
        let offset = self.data.read_u16(offset_pos)? as usize;
        if offset == 0 {
            return Ok(None);
        }
        self.data.slice_from(offset).map(Some)
    }

    pub fn glyph_class_def(&self) -> Result<Option<ClassDef>, Error> {
        Ok(self.subtable(4)?.map(ClassDef::new))
    }

    pub fn attach_list_data(&self) -> Result<Option<FontData>, Error> {
        self.subtable(6)
    }

    pub fn lig_caret_list_data(&self) -> Result<Option<FontData>, Error> {
        self.subtable(8)
    }

    pub fn mark_attach_class_def(&self) -> Result<Option<ClassDef>, Error> {
        Ok(self.subtable(10)?.map(ClassDef::new))
    }

    /// Version 1.2 only.
    pub fn mark_glyph_sets_data(&self) -> Result<Option<FontData>, Error> {
        if (self.major_version()?, self.minor_version()?) < (1, 2) {
            return Ok(None);
        }
        self.subtable(12)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};

    #[test]
    fn test_gdef_optional_subtables() {
        let mut wr = WritableFontData::new();
        wr.write_u16::<BigEndian>(1).unwrap(); // major version
        wr.write_u16::<BigEndian>(0).unwrap(); // minor version
        wr.write_u16::<BigEndian>(12).unwrap(); // glyph class def
        wr.write_u16::<BigEndian>(0).unwrap(); // no attach list
        wr.write_u16::<BigEndian>(0).unwrap(); // no lig caret list
        wr.write_u16::<BigEndian>(0).unwrap(); // no mark attach class def
        // class def format 1 at 12: glyph 4 is class 3 (mark)
        wr.write_u16::<BigEndian>(1).unwrap();
        wr.write_u16::<BigEndian>(4).unwrap();
        wr.write_u16::<BigEndian>(1).unwrap();
        wr.write_u16::<BigEndian>(3).unwrap();

        let gdef = Gdef::new(wr.data());
        assert_eq!(gdef.major_version().unwrap(), 1);
        assert!(gdef.attach_list_data().unwrap().is_none());
        assert!(gdef.mark_glyph_sets_data().unwrap().is_none());

        let classes = gdef.glyph_class_def().unwrap().unwrap();
        assert_eq!(classes.glyph_class(4).unwrap(), 3);
        assert_eq!(classes.glyph_class(5).unwrap(), 0);
    }
}
