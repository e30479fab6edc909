//! The record structures shared by the OpenType layout tables: scripts,
//! features and lookups are parallel tag/offset lists, walked lazily. The
//! internals of lookup subtables stay raw bytes; consumers that shape text
//! sit above this crate.

use crate::data::FontData;
use crate::error::Error;
use crate::tag::Tag;

const USE_MARK_FILTERING_SET: u16 = 0x0010;

/// Common header of 'GSUB' and 'GPOS': version plus offsets to the script,
/// feature and lookup lists.
#[derive(Debug, PartialEq, Clone)]
pub(crate) struct LayoutTable {
    data: FontData,
}

impl LayoutTable {
    pub(crate) fn new(data: FontData) -> Self {
        LayoutTable { data }
    }

    pub(crate) fn major_version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub(crate) fn minor_version(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    pub(crate) fn script_list(&self) -> Result<ScriptList, Error> {
        let offset = self.data.read_u16(4)? as usize;
        Ok(ScriptList {
            data: self.data.slice_from(offset)?,
        })
    }

    pub(crate) fn feature_list(&self) -> Result<FeatureList, Error> {
        let offset = self.data.read_u16(6)? as usize;
        Ok(FeatureList {
            data: self.data.slice_from(offset)?,
        })
    }

    pub(crate) fn lookup_list(&self) -> Result<LookupList, Error> {
        let offset = self.data.read_u16(8)? as usize;
        Ok(LookupList {
            data: self.data.slice_from(offset)?,
        })
    }

    /// Version 1.1 only.
    pub(crate) fn feature_variations_offset(&self) -> Result<Option<u32>, Error> {
        if (self.major_version()?, self.minor_version()?) < (1, 1) {
            return Ok(None);
        }
        let offset = self.data.read_u32(10)?;
        Ok(if offset == 0 { None } else { Some(offset) })
    }
}

fn tag_record_list_entry(data: &FontData, index: usize, count: usize) -> Result<(Tag, usize), Error> {
    if index >= count {
        return Err(Error::OutOfBounds);
    }
    let base = 2 + index * 6;
    Ok((
        Tag::from_u32(data.read_u32(base)?),
        data.read_u16(base + 4)? as usize,
    ))
}

/// The scripts a layout table covers, as `{tag, offset}` records.
#[derive(Debug, PartialEq, Clone)]
pub struct ScriptList {
    data: FontData,
}

impl ScriptList {
    pub fn script_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(0)? as usize)
    }

    pub fn script(&self, index: usize) -> Result<(Tag, Script), Error> {
        let (tag, offset) = tag_record_list_entry(&self.data, index, self.script_count()?)?;
        Ok((
            tag,
            Script {
                data: self.data.slice_from(offset)?,
            },
        ))
    }

    pub fn script_for(&self, tag: Tag) -> Result<Option<Script>, Error> {
        for index in 0..self.script_count()? {
            let (script_tag, script) = self.script(index)?;
            if script_tag == tag {
                return Ok(Some(script));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Script {
    data: FontData,
}

impl Script {
    pub fn default_lang_sys(&self) -> Result<Option<LangSys>, Error> {
        let offset = self.data.read_u16(0)? as usize;
        if offset == 0 {
            return Ok(None);
        }
        Ok(Some(LangSys {
            data: self.data.slice_from(offset)?,
        }))
    }

    pub fn lang_sys_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(2)? as usize)
    }

    pub fn lang_sys(&self, index: usize) -> Result<(Tag, LangSys), Error> {
        if index >= self.lang_sys_count()? {
            return Err(Error::OutOfBounds);
        }
        let base = 4 + index * 6;
        let tag = Tag::from_u32(self.data.read_u32(base)?);
        let offset = self.data.read_u16(base + 4)? as usize;
        Ok((
            tag,
            LangSys {
                data: self.data.slice_from(offset)?,
            },
        ))
    }
}

/// A language system: the feature indices active for one script/language
/// pair.
#[derive(Debug, PartialEq, Clone)]
pub struct LangSys {
    data: FontData,
}

impl LangSys {
    /// 0xFFFF when no feature is required.
    pub fn required_feature_index(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    pub fn feature_index_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(4)? as usize)
    }

    pub fn feature_index(&self, index: usize) -> Result<u16, Error> {
        if index >= self.feature_index_count()? {
            return Err(Error::OutOfBounds);
        }
        self.data.read_u16(6 + index * 2)
    }
}

/// The features of a layout table, as `{tag, offset}` records.
#[derive(Debug, PartialEq, Clone)]
pub struct FeatureList {
    data: FontData,
}

impl FeatureList {
    pub fn feature_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(0)? as usize)
    }

    pub fn feature(&self, index: usize) -> Result<(Tag, Feature), Error> {
        let (tag, offset) = tag_record_list_entry(&self.data, index, self.feature_count()?)?;
        Ok((
            tag,
            Feature {
                data: self.data.slice_from(offset)?,
            },
        ))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Feature {
    data: FontData,
}

impl Feature {
    pub fn lookup_index_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(2)? as usize)
    }

    pub fn lookup_index(&self, index: usize) -> Result<u16, Error> {
        if index >= self.lookup_index_count()? {
            return Err(Error::OutOfBounds);
        }
        self.data.read_u16(4 + index * 2)
    }
}

/// The lookups of a layout table, in processing order.
#[derive(Debug, PartialEq, Clone)]
pub struct LookupList {
    data: FontData,
}

impl LookupList {
    pub fn lookup_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(0)? as usize)
    }

    pub fn lookup(&self, index: usize) -> Result<Lookup, Error> {
        if index >= self.lookup_count()? {
            return Err(Error::OutOfBounds);
        }
        let offset = self.data.read_u16(2 + index * 2)? as usize;
        Ok(Lookup {
            data: self.data.slice_from(offset)?,
        })
    }
}

/// A lookup header; its subtables stay raw bytes.
#[derive(Debug, PartialEq, Clone)]
pub struct Lookup {
    data: FontData,
}

impl Lookup {
    pub fn lookup_type(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn lookup_flag(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    pub fn subtable_count(&self) -> Result<usize, Error> {
        Ok(self.data.read_u16(4)? as usize)
    }

    /// The raw bytes of one lookup subtable (to the end of the lookup's
    /// window; subtable-internal lengths are format specific).
    pub fn subtable_data(&self, index: usize) -> Result<FontData, Error> {
        if index >= self.subtable_count()? {
            return Err(Error::OutOfBounds);
        }
        let offset = self.data.read_u16(6 + index * 2)? as usize;
        self.data.slice_from(offset)
    }

    pub fn mark_filtering_set(&self) -> Result<Option<u16>, Error> {
        if self.lookup_flag()? & USE_MARK_FILTERING_SET == 0 {
            return Ok(None);
        }
        let offset = 6 + self.subtable_count()? * 2;
        self.data.read_u16(offset).map(Some)
    }
}

/// A glyph class definition, formats 1 (dense array) and 2 (class ranges).
#[derive(Debug, PartialEq, Clone)]
pub struct ClassDef {
    data: FontData,
}

impl ClassDef {
    pub(crate) fn new(data: FontData) -> Self {
        ClassDef { data }
    }

    pub fn format(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    /// The class of `glyph_id`; glyphs not covered are class 0.
    pub fn glyph_class(&self, glyph_id: u16) -> Result<u16, Error> {
        match self.format()? {
            1 => {
                let start_glyph = self.data.read_u16(2)?;
                let glyph_count = self.data.read_u16(4)?;
                if glyph_id < start_glyph || glyph_id - start_glyph >= glyph_count {
                    return Ok(0);
                }
                self.data.read_u16(6 + 2 * (glyph_id - start_glyph) as usize)
            }
            2 => {
                let range_count = self.data.read_u16(2)? as usize;
                match self.data.search_u16(4, 6, 6, 6, range_count, glyph_id)? {
                    Some(range) => self.data.read_u16(4 + range * 6 + 4),
                    None => Ok(0),
                }
            }
            format => Err(Error::UnknownFormat {
                tag: Tag::GDEF,
                format,
            }),
        }
    }
}

/// A coverage table, formats 1 (sorted glyph list) and 2 (glyph ranges).
#[derive(Debug, PartialEq, Clone)]
pub struct Coverage {
    data: FontData,
}

impl Coverage {
    pub fn new(data: FontData) -> Self {
        Coverage { data }
    }

    pub fn format(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    /// The coverage index of `glyph_id`, or `None` when not covered.
    pub fn coverage_index(&self, glyph_id: u16) -> Result<Option<u16>, Error> {
        match self.format()? {
            1 => {
                let glyph_count = self.data.read_u16(2)? as usize;
                Ok(self
                    .data
                    .search_u16(4, 2, 4, 2, glyph_count, glyph_id)?
                    .map(|index| index as u16))
            }
            2 => {
                let range_count = self.data.read_u16(2)? as usize;
                match self.data.search_u16(4, 6, 6, 6, range_count, glyph_id)? {
                    Some(range) => {
                        let base = 4 + range * 6;
                        let start = self.data.read_u16(base)?;
                        let start_coverage_index = self.data.read_u16(base + 4)?;
                        Ok(Some(start_coverage_index + (glyph_id - start)))
                    }
                    None => Ok(None),
                }
            }
            format => Err(Error::UnknownFormat {
                tag: Tag::GSUB,
                format,
            }),
        }
    }
}
