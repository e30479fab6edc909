use crate::data::FontData;
use crate::error::Error;
use crate::tables::layout::common::LayoutTable;
use crate::tables::layout::{FeatureList, LookupList, ScriptList};

/// The glyph positioning table; structurally the same skeleton as 'GSUB'
/// with positioning lookups behind it.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/gpos
#[derive(Debug, PartialEq, Clone)]
pub struct Gpos {
    table: LayoutTable,
}

impl Gpos {
    pub fn new(data: FontData) -> Self {
        Gpos {
            table: LayoutTable::new(data),
        }
    }

    pub fn major_version(&self) -> Result<u16, Error> {
        self.table.major_version()
    }

    pub fn minor_version(&self) -> Result<u16, Error> {
        self.table.minor_version()
    }

    pub fn script_list(&self) -> Result<ScriptList, Error> {
        self.table.script_list()
    }

    pub fn feature_list(&self) -> Result<FeatureList, Error> {
        self.table.feature_list()
    }

    pub fn lookup_list(&self) -> Result<LookupList, Error> {
        self.table.lookup_list()
    }

    pub fn feature_variations_offset(&self) -> Result<Option<u32>, Error> {
        self.table.feature_variations_offset()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tables::layout::common::test::sample_layout_table;

    #[test]
    fn test_gpos_skeleton() {
        let gpos = Gpos::new(sample_layout_table());
        let lookup = gpos.lookup_list().unwrap().lookup(0).unwrap();
        assert_eq!(lookup.lookup_type().unwrap(), 4);
        assert_eq!(lookup.subtable_count().unwrap(), 1);
    }
}
