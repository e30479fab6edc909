use crate::data::FontData;
use crate::error::Error;
use crate::tables::layout::common::LayoutTable;
use crate::tables::layout::{FeatureList, LookupList, ScriptList};

/// The glyph substitution table. Only the record skeleton (scripts,
/// features, lookup headers) is typed; substitution subtables stay raw.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/gsub
#[derive(Debug, PartialEq, Clone)]
pub struct Gsub {
    table: LayoutTable,
}

impl Gsub {
    pub fn new(data: FontData) -> Self {
        Gsub {
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
    use crate::tag::Tag;

    #[test]
    fn test_gsub_skeleton() {
        let gsub = Gsub::new(sample_layout_table());
        assert_eq!(gsub.major_version().unwrap(), 1);
        assert_eq!(gsub.feature_variations_offset().unwrap(), None);

        let (tag, _) = gsub.script_list().unwrap().script(0).unwrap();
        assert_eq!(tag, Tag::new(b"latn"));
        assert_eq!(gsub.lookup_list().unwrap().lookup_count().unwrap(), 1);
    }
}
