use std::io::{self, Write};

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::bitmap::{Ebdt, Eblc, Ebsc};
use crate::tables::cmap::{Cmap, CmapModel};
use crate::tables::glyf::{Glyf, GlyfModel, Glyph};
use crate::tables::head::{self, Head};
use crate::tables::hhea::Hhea;
use crate::tables::hmtx::{Hmtx, HmtxDep};
use crate::tables::layout::{Gdef, Gpos, Gsub};
use crate::tables::loca::{Loca, LocaDep, LocaFormat, LocaModel};
use crate::tables::maxp::Maxp;
use crate::tables::name::Name;
use crate::tables::os2::Os2;
use crate::tables::post::Post;
use crate::tables::{Builder, Table, TableBuilder, TableHeader, TableModel};
use crate::tag::Tag;
use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, warn};

// Spec: https://docs.microsoft.com/en-us/typography/opentype/spec/otff

const OFFSET_TABLE_LEN: usize = 12;
const TABLE_RECORD_LEN: usize = 16;
const CHECK_SUM_ADJUSTMENT_MAGIC: u32 = 0xB1B0AFBA;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SfntVersion {
    TrueType,
    Cff,
}

impl SfntVersion {
    fn from_u32(value: u32) -> Result<Self, Error> {
        match value {
            0x00010000 => Ok(SfntVersion::TrueType),
            0x4F54544F => Ok(SfntVersion::Cff),
            value => Err(Error::CorruptFont(format!(
                "unknown sfnt version 0x{:08X}",
                value
            ))),
        }
    }

    fn as_u32(self) -> u32 {
        match self {
            SfntVersion::TrueType => 0x00010000,
            SfntVersion::Cff => 0x4F54544F,
        }
    }
}

/// An immutable font: its sfnt version plus the tables located through the
/// table directory, sorted by tag. Mutation goes through [`FontBuilder`].
///
/// A fully loaded `Font` only holds cheap views into the backing bytes; it
/// is safe to read from multiple threads.
#[derive(Debug, PartialEq, Clone)]
pub struct Font {
    sfnt_version: SfntVersion,
    tables: Vec<Table>,
}

impl Font {
    pub fn sfnt_version(&self) -> SfntVersion {
        self.sfnt_version
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn table(&self, tag: Tag) -> Option<&Table> {
        self.tables
            .binary_search_by(|table| table.tag().cmp(&tag))
            .ok()
            .and_then(|index| self.tables.get(index))
    }

    fn table_data(&self, tag: Tag) -> Result<FontData, Error> {
        self.table(tag)
            .map(|table| table.data().clone())
            .ok_or(Error::MissingTable(tag))
    }

    pub fn head(&self) -> Result<Head, Error> {
        Head::read(&self.table_data(Tag::HEAD)?, &())
    }

    pub fn hhea(&self) -> Result<Hhea, Error> {
        Hhea::read(&self.table_data(Tag::HHEA)?, &())
    }

    pub fn maxp(&self) -> Result<Maxp, Error> {
        Maxp::read(&self.table_data(Tag::MAXP)?, &())
    }

    pub fn hmtx(&self) -> Result<Hmtx, Error> {
        let dep = HmtxDep {
            number_of_h_metrics: self.hhea()?.number_of_h_metrics,
            num_glyphs: self.maxp()?.num_glyphs(),
        };
        Hmtx::read(&self.table_data(Tag::HMTX)?, &dep)
    }

    pub fn name(&self) -> Result<Name, Error> {
        Name::read(&self.table_data(Tag::NAME)?, &())
    }

    pub fn os2(&self) -> Result<Os2, Error> {
        Os2::read(&self.table_data(Tag::OS2)?, &())
    }

    pub fn post(&self) -> Result<Post, Error> {
        Post::read(&self.table_data(Tag::POST)?, &())
    }

    pub fn cmap(&self) -> Result<Cmap, Error> {
        Ok(Cmap::new(self.table_data(Tag::CMAP)?))
    }

    /// The glyph location view; its storage form and glyph count come from
    /// 'head' and 'maxp', resolved here and passed in explicitly.
    pub fn loca(&self) -> Result<Loca, Error> {
        let format = LocaFormat::from_index_to_loc_format(self.head()?.index_to_loc_format);
        let num_glyphs = self.maxp()?.num_glyphs();
        Ok(Loca::new(self.table_data(Tag::LOCA)?, format, num_glyphs))
    }

    pub fn glyf(&self) -> Result<Glyf, Error> {
        Ok(Glyf::new(self.table_data(Tag::GLYF)?))
    }

    /// Decodes the outline of one glyph; `Ok(None)` for glyphs without one.
    pub fn glyph(&self, glyph_id: u16) -> Result<Option<Glyph>, Error> {
        let loca = self.loca()?;
        let offset = loca.glyph_offset(glyph_id)?;
        let length = loca.glyph_length(glyph_id)?;
        self.glyf()?.glyph(offset, length)
    }

    pub fn eblc(&self) -> Result<Eblc, Error> {
        Ok(Eblc::new(self.table_data(Tag::EBLC)?))
    }

    pub fn ebdt(&self) -> Result<Ebdt, Error> {
        Ok(Ebdt::new(self.table_data(Tag::EBDT)?))
    }

    pub fn ebsc(&self) -> Result<Ebsc, Error> {
        Ok(Ebsc::new(self.table_data(Tag::EBSC)?))
    }

    pub fn gsub(&self) -> Result<Gsub, Error> {
        Ok(Gsub::new(self.table_data(Tag::GSUB)?))
    }

    pub fn gpos(&self) -> Result<Gpos, Error> {
        Ok(Gpos::new(self.table_data(Tag::GPOS)?))
    }

    pub fn gdef(&self) -> Result<Gdef, Error> {
        Ok(Gdef::new(self.table_data(Tag::GDEF)?))
    }

    /// Opt-in verification: compares each table's computed checksum against
    /// the directory. Mismatches are reported (and logged), never fatal.
    pub fn verify_checksums(&self) -> Vec<Error> {
        let mut mismatches = Vec::new();
        for table in &self.tables {
            let mut sum = table.data().checksum();
            if table.tag() == Tag::HEAD {
                // the adjustment field is zeroed for the head checksum
                if let Ok(adjustment) = table.data().read_u32(head::CHECK_SUM_ADJUSTMENT_OFFSET) {
                    sum = sum.wrapping_sub(adjustment);
                }
            }
            if sum != table.header().checksum {
                warn!(
                    "checksum mismatch for {} table: computed 0x{:08X}, directory says 0x{:08X}",
                    table.tag(),
                    sum,
                    table.header().checksum
                );
                mismatches.push(Error::ChecksumMismatch(table.tag()));
            }
        }
        mismatches
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        FontBuilder::from_font(self).to_vec()
    }

    pub fn to_writer(&self, wr: impl io::Write) -> Result<(), Error> {
        FontBuilder::from_font(self).serialize(wr)
    }
}

/// Loads fonts from in-memory bytes: plain sfnt files and 'ttcf' collections
/// (whose fonts share one backing buffer, so table ranges appearing in
/// several directories are sliced once and shared).
///
/// The factory is strict about the table directory (sort order, duplicate
/// tags, file bounds) and lenient about table contents: corrupt table
/// internals only surface once a typed accessor walks them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FontFactory {
    verify_checksums: bool,
}

impl FontFactory {
    pub fn new() -> Self {
        FontFactory::default()
    }

    /// Enables checksum verification during loading. Mismatches are logged,
    /// never fatal; use [`Font::verify_checksums`] for programmatic access.
    pub fn verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Loads every font in the file; collection files yield more than one.
    pub fn load(&self, bytes: Vec<u8>) -> Result<Vec<Font>, Error> {
        let file = FontData::new(bytes);
        if file.len() >= 4 && file.read_u32(0)? == Tag::TTCF.as_u32() {
            let num_fonts = file.read_u32(8)? as usize;
            debug!("loading a font collection of {} fonts", num_fonts);
            let mut fonts = Vec::with_capacity(num_fonts);
            for index in 0..num_fonts {
                let offset = file.read_u32(12 + index * 4)? as usize;
                fonts.push(self.load_font(&file, offset)?);
            }
            if self.verify_checksums {
                for font in &fonts {
                    font.verify_checksums();
                }
            }
            Ok(fonts)
        } else {
            let font = self.load_font(&file, 0)?;
            if self.verify_checksums {
                font.verify_checksums();
                // with the adjustment in place the whole file sums to the
                // magic constant
                if file.checksum() != CHECK_SUM_ADJUSTMENT_MAGIC && font.table(Tag::HEAD).is_some()
                {
                    warn!("whole-font checksum does not satisfy the adjustment identity");
                }
            }
            Ok(vec![font])
        }
    }

    fn load_font(&self, file: &FontData, offset: usize) -> Result<Font, Error> {
        let sfnt_version = SfntVersion::from_u32(file.read_u32(offset)?)?;
        let num_tables = file.read_u16(offset + 4)? as usize;
        // search_range, entry_selector and range_shift are derived fields;
        // they are recomputed on serialization

        let mut tables = Vec::with_capacity(num_tables);
        for index in 0..num_tables {
            let record = offset + OFFSET_TABLE_LEN + index * TABLE_RECORD_LEN;
            let header = TableHeader {
                tag: Tag::from_u32(file.read_u32(record)?),
                checksum: file.read_u32(record + 4)?,
                offset: file.read_u32(record + 8)?,
                length: file.read_u32(record + 12)?,
            };

            if let Some(previous) = tables.last().map(|table: &Table| table.tag()) {
                if header.tag <= previous {
                    return Err(Error::CorruptFont(format!(
                        "table directory is not sorted at {} table",
                        header.tag
                    )));
                }
            }
            let data = file
                .slice(header.offset as usize, header.length as usize)
                .map_err(|_| {
                    Error::CorruptFont(format!(
                        "{} table range {}..{} exceeds the file",
                        header.tag,
                        header.offset,
                        u64::from(header.offset) + u64::from(header.length)
                    ))
                })?;
            tables.push(Table::new(header, data));
        }
        debug!("loaded {} tables", tables.len());

        Ok(Font {
            sfnt_version,
            tables,
        })
    }
}

struct BuilderEntry {
    tag: Tag,
    /// Offset in the source file, used to keep the physical table order on
    /// re-serialization. New tables have none and are appended in tag order.
    source_offset: Option<u32>,
    builder: TableBuilder,
}

/// The editable counterpart of a [`Font`]: one builder per table, keyed by
/// tag. Untouched builders pass their source bytes through unchanged, so a
/// font serialized without edits reproduces its input (table order, padding
/// and `check_sum_adjustment` included, for fonts laid out in the usual
/// contiguous, 4-byte aligned way).
///
/// A builder tree is single-threaded; builders for different tables are
/// independent of each other.
pub struct FontBuilder {
    sfnt_version: SfntVersion,
    entries: Vec<BuilderEntry>,
}

impl FontBuilder {
    pub fn new(sfnt_version: SfntVersion) -> Self {
        FontBuilder {
            sfnt_version,
            entries: Vec::new(),
        }
    }

    pub fn from_font(font: &Font) -> Self {
        let mut builder = FontBuilder::new(font.sfnt_version());
        for table in font.tables() {
            builder.entries.push(BuilderEntry {
                tag: table.tag(),
                source_offset: Some(table.header().offset),
                builder: FontBuilder::builder_for(font, table),
            });
        }
        builder
    }

    /// Picks the typed builder for a table, falling back to an opaque
    /// pass-through when a cross-table dependency cannot be resolved.
    fn builder_for(font: &Font, table: &Table) -> TableBuilder {
        let data = table.data().clone();
        match table.tag() {
            Tag::HEAD => TableBuilder::Head(Builder::from_data(data, ())),
            Tag::HHEA => TableBuilder::Hhea(Builder::from_data(data, ())),
            Tag::MAXP => TableBuilder::Maxp(Builder::from_data(data, ())),
            Tag::NAME => TableBuilder::Name(Builder::from_data(data, ())),
            Tag::OS2 => TableBuilder::Os2(Builder::from_data(data, ())),
            Tag::POST => TableBuilder::Post(Builder::from_data(data, ())),
            Tag::CMAP => TableBuilder::Cmap(Builder::from_data(data, ())),
            Tag::HMTX => match (font.hhea(), font.maxp()) {
                (Ok(hhea), Ok(maxp)) => {
                    let dep = HmtxDep {
                        number_of_h_metrics: hhea.number_of_h_metrics,
                        num_glyphs: maxp.num_glyphs(),
                    };
                    TableBuilder::Hmtx(Builder::from_data(data, dep))
                }
                _ => TableBuilder::Opaque(Builder::from_data(data, ())),
            },
            Tag::LOCA => match (font.head(), font.maxp()) {
                (Ok(head), Ok(maxp)) => {
                    let dep = LocaDep {
                        format: LocaFormat::from_index_to_loc_format(head.index_to_loc_format),
                        num_glyphs: maxp.num_glyphs(),
                    };
                    TableBuilder::Loca(Builder::from_data(data, dep))
                }
                _ => TableBuilder::Opaque(Builder::from_data(data, ())),
            },
            Tag::GLYF => match FontBuilder::loca_offsets(font) {
                Some(offsets) => TableBuilder::Glyf(Builder::from_data(data, offsets)),
                None => TableBuilder::Opaque(Builder::from_data(data, ())),
            },
            _ => TableBuilder::Opaque(Builder::from_data(data, ())),
        }
    }

    fn loca_offsets(font: &Font) -> Option<Vec<u32>> {
        let loca = font.loca().ok()?;
        let mut offsets = Vec::with_capacity(loca.num_glyphs() as usize + 1);
        for index in 0..=loca.num_glyphs() {
            offsets.push(loca.glyph_offset(index).ok()?);
        }
        Some(offsets)
    }

    /// Adds or replaces a table builder, keeping the directory sorted.
    pub fn insert(&mut self, tag: Tag, builder: TableBuilder) {
        match self.entries.binary_search_by(|entry| entry.tag.cmp(&tag)) {
            Ok(index) => self.entries[index].builder = builder,
            Err(index) => self.entries.insert(
                index,
                BuilderEntry {
                    tag,
                    source_offset: None,
                    builder,
                },
            ),
        }
    }

    /// Adds or replaces a table with opaque bytes preserved verbatim.
    pub fn insert_data(&mut self, tag: Tag, data: FontData) {
        self.insert(tag, TableBuilder::Opaque(Builder::from_data(data, ())));
    }

    pub fn remove(&mut self, tag: Tag) -> Option<TableBuilder> {
        self.entries
            .binary_search_by(|entry| entry.tag.cmp(&tag))
            .ok()
            .map(|index| self.entries.remove(index).builder)
    }

    pub fn table_mut(&mut self, tag: Tag) -> Option<&mut TableBuilder> {
        self.entries
            .binary_search_by(|entry| entry.tag.cmp(&tag))
            .ok()
            .map(move |index| &mut self.entries[index].builder)
    }

    /// The editable 'head' model; materializes it on first access.
    pub fn head_mut(&mut self) -> Result<&mut Head, Error> {
        match self.table_mut(Tag::HEAD) {
            Some(TableBuilder::Head(builder)) => builder.model(),
            _ => Err(Error::MissingTable(Tag::HEAD)),
        }
    }

    /// The editable 'cmap' model; materializes it on first access.
    pub fn cmap_mut(&mut self) -> Result<&mut CmapModel, Error> {
        match self.table_mut(Tag::CMAP) {
            Some(TableBuilder::Cmap(builder)) => builder.model(),
            _ => Err(Error::MissingTable(Tag::CMAP)),
        }
    }

    /// The editable 'glyf' model; materializes it on first access.
    pub fn glyf_mut(&mut self) -> Result<&mut GlyfModel, Error> {
        match self.table_mut(Tag::GLYF) {
            Some(TableBuilder::Glyf(builder)) => builder.model(),
            _ => Err(Error::MissingTable(Tag::GLYF)),
        }
    }

    /// The editable 'loca' model; materializes it on first access.
    pub fn loca_mut(&mut self) -> Result<&mut LocaModel, Error> {
        match self.table_mut(Tag::LOCA) {
            Some(TableBuilder::Loca(builder)) => builder.model(),
            _ => Err(Error::MissingTable(Tag::LOCA)),
        }
    }

    pub fn build(&self) -> Result<Font, Error> {
        let mut fonts = FontFactory::new().load(self.to_vec()?)?;
        Ok(fonts.remove(0))
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, Error> {
        self.serialize_into().map(WritableFontData::into_vec)
    }

    pub fn serialize(&self, mut wr: impl io::Write) -> Result<(), Error> {
        let data = self.serialize_into()?;
        wr.write_all(data.bytes()).map_err(Error::Io)?;
        Ok(())
    }

    fn serialize_into(&self) -> Result<WritableFontData, Error> {
        for entry in &self.entries {
            if !entry.builder.ready_to_serialize() {
                return Err(Error::NotReadyForSerialization(entry.tag));
            }
        }

        let num_tables = self.entries.len();
        let mut wr = WritableFontData::with_capacity(
            OFFSET_TABLE_LEN + num_tables * TABLE_RECORD_LEN,
        );
        wr.write_u32::<BigEndian>(self.sfnt_version.as_u32())?;
        wr.write_u16::<BigEndian>(num_tables as u16)?;
        let x = if num_tables == 0 {
            0
        } else {
            2u16.pow((num_tables as f32).log2() as u32)
        };
        let search_range = x * 16;
        wr.write_u16::<BigEndian>(search_range)?;
        let entry_selector = if x == 0 { 0 } else { (x as f32).log2() as u16 };
        wr.write_u16::<BigEndian>(entry_selector)?;
        let range_shift = num_tables as u16 * 16 - search_range;
        wr.write_u16::<BigEndian>(range_shift)?;

        // directory records, offsets and checksums patched after layout
        for entry in &self.entries {
            wr.write_u32::<BigEndian>(entry.tag.as_u32())?;
            wr.write_u32::<BigEndian>(0)?;
            wr.write_u32::<BigEndian>(0)?;
            wr.write_u32::<BigEndian>(0)?;
        }

        // bodies keep the physical order of the source file; new tables go
        // last in tag order
        let mut order: Vec<usize> = (0..num_tables).collect();
        order.sort_by_key(|&index| {
            let entry = &self.entries[index];
            (entry.source_offset.is_none(), entry.source_offset, entry.tag)
        });

        let mut layouts = vec![(0usize, 0usize); num_tables];
        for &index in &order {
            let offset = wr.len();
            let written = self.entries[index].builder.serialize(&mut wr)?;
            wr.pad_to(4);
            layouts[index] = (offset, written);
        }

        // the head checksum is computed with a zeroed adjustment field
        let head_offset = self
            .entries
            .iter()
            .position(|entry| entry.tag == Tag::HEAD)
            .map(|index| layouts[index].0);
        if let Some(head_offset) = head_offset {
            wr.write_u32_at(head_offset + head::CHECK_SUM_ADJUSTMENT_OFFSET, 0);
        }

        for (index, &(offset, length)) in layouts.iter().enumerate() {
            let padded = (length + 3) & !3;
            let checksum = wr.checksum_of(offset, padded)?;
            let record = OFFSET_TABLE_LEN + index * TABLE_RECORD_LEN;
            wr.write_u32_at(record + 4, checksum);
            wr.write_u32_at(record + 8, offset as u32);
            wr.write_u32_at(record + 12, length as u32);
        }

        if let Some(head_offset) = head_offset {
            let adjustment = CHECK_SUM_ADJUSTMENT_MAGIC.wrapping_sub(wr.checksum());
            wr.write_u32_at(head_offset + head::CHECK_SUM_ADJUSTMENT_OFFSET, adjustment);
        }

        Ok(wr)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tables::cmap::{EncodingRecordModel, Format4Model, SubtableModel};
    use crate::tables::glyf::{GlyphDescription, Point, SimpleGlyph};
    use crate::tables::maxp::TrueTypeMaxp;
    use crate::tables::hmtx::LongHorMetric;
    use pretty_assertions::assert_eq;

    fn simple_glyph(width: i16) -> Glyph {
        Glyph {
            x_min: 0,
            y_min: 0,
            x_max: width,
            y_max: 700,
            description: GlyphDescription::Simple(SimpleGlyph {
                end_pts_of_contours: vec![3],
                instructions: Vec::new(),
                points: vec![
                    Point {
                        x: 0,
                        y: 0,
                        on_curve: true,
                    },
                    Point {
                        x: width,
                        y: 0,
                        on_curve: true,
                    },
                    Point {
                        x: width,
                        y: 700,
                        on_curve: true,
                    },
                    Point {
                        x: 0,
                        y: 700,
                        on_curve: true,
                    },
                ],
            }),
        }
    }

    /// A complete little font: three glyphs (.notdef, 'A', 'B'), cmap
    /// format 4, short loca offsets.
    pub(crate) fn sample_font_bytes() -> Vec<u8> {
        let glyf = GlyfModel {
            glyphs: vec![
                Some(simple_glyph(500)),
                Some(simple_glyph(600)),
                Some(simple_glyph(640)),
            ],
        };
        let loca = LocaModel {
            offsets: glyf.loca_offsets().unwrap(),
            format: LocaFormat::Short,
        };
        let head = Head {
            major_version: 1,
            minor_version: 0,
            font_revision: (1, 0),
            check_sum_adjustment: 0,
            magic_number: 0x5F0F3CF5,
            flags: 0x000B,
            units_per_em: 1000,
            created: 3406620153,
            modified: 3647951938,
            x_min: 0,
            y_min: 0,
            x_max: 640,
            y_max: 700,
            mac_style: 0,
            lowest_rec_ppem: 8,
            font_direction_hint: 2,
            index_to_loc_format: 0,
            glyph_data_format: 0,
        };
        let hhea = Hhea {
            major_version: 1,
            minor_version: 0,
            ascender: 750,
            descender: -250,
            line_gap: 0,
            advance_width_max: 660,
            min_left_side_bearing: 0,
            min_right_side_bearing: 0,
            x_max_extent: 640,
            caret_slope_rise: 1,
            caret_slope_run: 0,
            caret_offset: 0,
            metric_data_format: 0,
            number_of_h_metrics: 3,
        };
        let maxp = Maxp::TrueType(TrueTypeMaxp {
            num_glyphs: 3,
            max_points: 4,
            max_contours: 1,
            max_zones: 2,
            ..Default::default()
        });
        let hmtx = Hmtx {
            h_metrics: vec![
                LongHorMetric {
                    advance_width: 520,
                    lsb: 0,
                },
                LongHorMetric {
                    advance_width: 620,
                    lsb: 0,
                },
                LongHorMetric {
                    advance_width: 660,
                    lsb: 0,
                },
            ],
            left_side_bearings: Vec::new(),
        };
        let cmap = CmapModel {
            version: 0,
            records: vec![EncodingRecordModel {
                platform_id: 3,
                encoding_id: 1,
                subtable: SubtableModel::Format4(
                    Format4Model::from_mappings(&[(b'A' as u16, 1), (b'B' as u16, 2)]).unwrap(),
                ),
            }],
        };

        let mut builder = FontBuilder::new(SfntVersion::TrueType);
        builder.insert(Tag::HEAD, TableBuilder::Head(Builder::from_model(head, ())));
        builder.insert(Tag::HHEA, TableBuilder::Hhea(Builder::from_model(hhea, ())));
        builder.insert(Tag::MAXP, TableBuilder::Maxp(Builder::from_model(maxp, ())));
        builder.insert(
            Tag::HMTX,
            TableBuilder::Hmtx(Builder::from_model(
                hmtx,
                HmtxDep {
                    number_of_h_metrics: 3,
                    num_glyphs: 3,
                },
            )),
        );
        builder.insert(Tag::CMAP, TableBuilder::Cmap(Builder::from_model(cmap, ())));
        builder.insert(
            Tag::LOCA,
            TableBuilder::Loca(Builder::from_model(
                loca,
                LocaDep {
                    format: LocaFormat::Short,
                    num_glyphs: 3,
                },
            )),
        );
        let offsets = glyf.loca_offsets().unwrap();
        builder.insert(Tag::GLYF, TableBuilder::Glyf(Builder::from_model(glyf, offsets)));
        builder.to_vec().unwrap()
    }

    #[test]
    fn test_load_directory_and_lookup() {
        let bytes = sample_font_bytes();
        let fonts = FontFactory::new().load(bytes).unwrap();
        assert_eq!(fonts.len(), 1);
        let font = &fonts[0];

        assert_eq!(font.sfnt_version(), SfntVersion::TrueType);
        assert_eq!(font.tables().count(), 7);
        assert!(font.table(Tag::GLYF).is_some());
        assert!(font.table(Tag::new(b"vhea")).is_none());

        // directory iteration follows tag order
        let tags: Vec<Tag> = font.tables().map(|t| t.tag()).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);

        let cmap = font.cmap().unwrap();
        assert_eq!(cmap.glyph_id(b'A' as u32).unwrap(), 1);
        assert_eq!(cmap.glyph_id(b'B' as u32).unwrap(), 2);
        assert_eq!(cmap.glyph_id(b'C' as u32).unwrap(), 0);

        assert_eq!(font.hmtx().unwrap().advance_width(1), Some(620));
        assert!(font.glyph(1).unwrap().is_some());
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let bytes = sample_font_bytes();
        let font = FontFactory::new().load(bytes.clone()).unwrap().remove(0);
        assert_eq!(font.to_vec().unwrap(), bytes);
    }

    #[test]
    fn test_checksum_identity() {
        let bytes = sample_font_bytes();
        // with the adjustment in place, the whole file sums to the magic
        assert_eq!(
            crate::data::checksum(&bytes),
            CHECK_SUM_ADJUSTMENT_MAGIC
        );

        let font = FontFactory::new().load(bytes).unwrap().remove(0);
        assert!(font.verify_checksums().is_empty());
        assert_ne!(font.head().unwrap().check_sum_adjustment, 0);
    }

    #[test]
    fn test_builder_edit_reflects_in_serialization() {
        let bytes = sample_font_bytes();
        let font = FontFactory::new().load(bytes.clone()).unwrap().remove(0);

        let mut builder = FontBuilder::from_font(&font);
        builder.head_mut().unwrap().units_per_em = 2048;
        let edited = builder.build().unwrap();
        assert_eq!(edited.head().unwrap().units_per_em, 2048);
        // checksums are recomputed for the edited bytes
        assert!(edited.verify_checksums().is_empty());

        // absent any edit, serialization reproduces the input exactly
        let untouched = FontBuilder::from_font(&font);
        assert_eq!(untouched.to_vec().unwrap(), bytes);
    }

    #[test]
    fn test_unknown_table_preserved_verbatim() {
        let bytes = sample_font_bytes();
        let font = FontFactory::new().load(bytes).unwrap().remove(0);

        let mut builder = FontBuilder::from_font(&font);
        builder.insert_data(Tag::new(b"zzzz"), FontData::new(vec![1, 2, 3, 4, 5]));
        let font = builder.build().unwrap();

        let table = font.table(Tag::new(b"zzzz")).unwrap();
        assert_eq!(table.data().bytes(), &[1, 2, 3, 4, 5]);
        assert_eq!(table.header().length, 5);
        // new tables are appended after the source tables, 4-byte padded
        assert!(font.verify_checksums().is_empty());
    }

    #[test]
    fn test_unsorted_directory_is_rejected() {
        let mut bytes = sample_font_bytes();
        // swap the first two directory records
        let mut record = [0u8; 32];
        record.copy_from_slice(&bytes[12..44]);
        bytes[12..28].copy_from_slice(&record[16..]);
        bytes[28..44].copy_from_slice(&record[..16]);

        assert!(matches!(
            FontFactory::new().load(bytes),
            Err(Error::CorruptFont(_))
        ));
    }

    #[test]
    fn test_table_range_outside_file_is_rejected() {
        let bytes = sample_font_bytes();
        let truncated = bytes[..bytes.len() - 8].to_vec();
        assert!(matches!(
            FontFactory::new().load(truncated),
            Err(Error::CorruptFont(_))
        ));
    }

    #[test]
    fn test_collection_shares_backing_storage() {
        // a two-font collection whose entries point at the same offset table
        let header_len: u32 = 12 + 2 * 4;

        // the embedded font's directory offsets are file-absolute, so they
        // shift by the collection header size
        let mut embedded = sample_font_bytes();
        let num_tables = u16::from_be_bytes([embedded[4], embedded[5]]) as usize;
        for index in 0..num_tables {
            let record = 12 + index * 16 + 8;
            let old = u32::from_be_bytes([
                embedded[record],
                embedded[record + 1],
                embedded[record + 2],
                embedded[record + 3],
            ]);
            embedded[record..record + 4].copy_from_slice(&(old + header_len).to_be_bytes());
        }

        let mut file = Vec::new();
        file.extend_from_slice(&Tag::TTCF.as_u32().to_be_bytes());
        file.extend_from_slice(&0x00010000u32.to_be_bytes());
        file.extend_from_slice(&2u32.to_be_bytes());
        file.extend_from_slice(&header_len.to_be_bytes());
        file.extend_from_slice(&header_len.to_be_bytes());
        file.extend_from_slice(&embedded);

        let fonts = FontFactory::new().load(file).unwrap();
        assert_eq!(fonts.len(), 2);
        assert_eq!(fonts[0], fonts[1]);
        assert_eq!(fonts[0].cmap().unwrap().glyph_id(b'A' as u32).unwrap(), 1);
    }

    #[test]
    fn test_not_ready_builder_fails_with_tag() {
        let mut builder = FontBuilder::new(SfntVersion::TrueType);
        let loca = LocaModel {
            offsets: vec![100, 0], // not monotonic
            format: LocaFormat::Long,
        };
        builder.insert(
            Tag::LOCA,
            TableBuilder::Loca(Builder::from_model(
                loca,
                LocaDep {
                    format: LocaFormat::Long,
                    num_glyphs: 1,
                },
            )),
        );
        assert!(matches!(
            builder.to_vec(),
            Err(Error::NotReadyForSerialization(Tag::LOCA))
        ));
    }
}
