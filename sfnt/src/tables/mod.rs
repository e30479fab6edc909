pub mod bitmap;
pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hhea;
pub mod hmtx;
pub mod layout;
pub mod loca;
pub mod maxp;
pub mod name;
pub mod os2;
pub mod post;

use std::io::Write;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tag::Tag;

/// The directory entry of a table: its tag, declared checksum and the byte
/// range it occupied in the source file.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct TableHeader {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// A table as loaded from a font: its directory header plus its bytes,
/// already sliced out of the file.
#[derive(Debug, PartialEq, Clone)]
pub struct Table {
    header: TableHeader,
    data: FontData,
}

impl Table {
    pub(crate) fn new(header: TableHeader, data: FontData) -> Self {
        Table { header, data }
    }

    pub fn tag(&self) -> Tag {
        self.header.tag
    }

    pub fn header(&self) -> &TableHeader {
        &self.header
    }

    pub fn data(&self) -> &FontData {
        &self.data
    }
}

/// The in-memory editable model of a table.
///
/// `read` materializes the model from backing bytes, validating the table's
/// structural invariants (failing with [`Error::CorruptTable`]); `write`
/// recomputes the byte layout from scratch.
pub trait TableModel: Sized {
    /// Cross-table inputs needed to interpret the backing bytes (e.g. `loca`
    /// needs `head.index_to_loc_format` and `maxp.num_glyphs`). Dependencies
    /// are passed explicitly at builder construction, never looked up through
    /// back-pointers.
    type ReadDep;

    fn read(data: &FontData, dep: &Self::ReadDep) -> Result<Self, Error>;
    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error>;

    /// Whether the model holds enough state to emit bytes.
    fn ready(&self) -> bool {
        true
    }
}

enum BuilderState<M> {
    Pristine(FontData),
    Edited(M),
}

/// The serialization lifecycle shared by every table builder.
///
/// A builder starts out `Pristine`: the backing bytes are authoritative, the
/// serialized size equals their length and serialization copies them
/// verbatim. The first mutable model access materializes the model and
/// transitions the builder to `Edited`; from then on the model is
/// authoritative and serialization recomputes the layout from scratch.
pub struct Builder<M: TableModel> {
    state: BuilderState<M>,
    dep: M::ReadDep,
}

impl<M: TableModel> Builder<M> {
    pub fn from_data(data: FontData, dep: M::ReadDep) -> Self {
        Builder {
            state: BuilderState::Pristine(data),
            dep,
        }
    }

    pub fn from_model(model: M, dep: M::ReadDep) -> Self {
        Builder {
            state: BuilderState::Edited(model),
            dep,
        }
    }

    /// Whether the in-memory model has become authoritative. While this is
    /// `false`, serialization reproduces the backing bytes exactly.
    pub fn model_changed(&self) -> bool {
        matches!(self.state, BuilderState::Edited(_))
    }

    /// Replaces the backing bytes, dropping any materialized model.
    pub fn set_data(&mut self, data: FontData) {
        self.state = BuilderState::Pristine(data);
    }

    /// Mutable access to the model, materializing it from the backing bytes
    /// on first use. Materialization validates the table's structural
    /// invariants; afterwards the model is authoritative.
    pub fn model(&mut self) -> Result<&mut M, Error> {
        if let BuilderState::Pristine(data) = &self.state {
            self.state = BuilderState::Edited(M::read(data, &self.dep)?);
        }
        match &mut self.state {
            BuilderState::Edited(model) => Ok(model),
            BuilderState::Pristine(_) => unreachable!(),
        }
    }

    pub fn ready_to_serialize(&self) -> bool {
        match &self.state {
            BuilderState::Pristine(_) => true,
            BuilderState::Edited(model) => model.ready(),
        }
    }

    /// The number of bytes [`Builder::serialize`] would write.
    pub fn data_size(&self) -> Result<usize, Error> {
        match &self.state {
            BuilderState::Pristine(data) => Ok(data.len()),
            BuilderState::Edited(model) => {
                let mut scratch = WritableFontData::new();
                model.write(&mut scratch)
            }
        }
    }

    /// Writes the table body, returning the number of bytes written.
    pub fn serialize(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        match &self.state {
            BuilderState::Pristine(data) => {
                wr.write_all(data.bytes())?;
                Ok(data.len())
            }
            BuilderState::Edited(model) => model.write(wr),
        }
    }
}

/// Verbatim pass-through model for tables the crate keeps opaque: unknown
/// tags, and tables that are never edited structurally (bitmap and layout
/// tables among them).
#[derive(Debug, PartialEq, Clone)]
pub struct Raw(pub Vec<u8>);

impl TableModel for Raw {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        Ok(Raw(data.bytes().to_vec()))
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        wr.write_all(&self.0)?;
        Ok(self.0.len())
    }
}

/// The per-tag dispatch over the typed table builders.
pub enum TableBuilder {
    Head(Builder<head::Head>),
    Hhea(Builder<hhea::Hhea>),
    Maxp(Builder<maxp::Maxp>),
    Hmtx(Builder<hmtx::Hmtx>),
    Name(Builder<name::Name>),
    Os2(Builder<os2::Os2>),
    Post(Builder<post::Post>),
    Cmap(Builder<cmap::CmapModel>),
    Loca(Builder<loca::LocaModel>),
    Glyf(Builder<glyf::GlyfModel>),
    Opaque(Builder<Raw>),
}

impl TableBuilder {
    pub fn model_changed(&self) -> bool {
        match self {
            TableBuilder::Head(b) => b.model_changed(),
            TableBuilder::Hhea(b) => b.model_changed(),
            TableBuilder::Maxp(b) => b.model_changed(),
            TableBuilder::Hmtx(b) => b.model_changed(),
            TableBuilder::Name(b) => b.model_changed(),
            TableBuilder::Os2(b) => b.model_changed(),
            TableBuilder::Post(b) => b.model_changed(),
            TableBuilder::Cmap(b) => b.model_changed(),
            TableBuilder::Loca(b) => b.model_changed(),
            TableBuilder::Glyf(b) => b.model_changed(),
            TableBuilder::Opaque(b) => b.model_changed(),
        }
    }

    pub fn ready_to_serialize(&self) -> bool {
        match self {
            TableBuilder::Head(b) => b.ready_to_serialize(),
            TableBuilder::Hhea(b) => b.ready_to_serialize(),
            TableBuilder::Maxp(b) => b.ready_to_serialize(),
            TableBuilder::Hmtx(b) => b.ready_to_serialize(),
            TableBuilder::Name(b) => b.ready_to_serialize(),
            TableBuilder::Os2(b) => b.ready_to_serialize(),
            TableBuilder::Post(b) => b.ready_to_serialize(),
            TableBuilder::Cmap(b) => b.ready_to_serialize(),
            TableBuilder::Loca(b) => b.ready_to_serialize(),
            TableBuilder::Glyf(b) => b.ready_to_serialize(),
            TableBuilder::Opaque(b) => b.ready_to_serialize(),
        }
    }

    pub fn data_size(&self) -> Result<usize, Error> {
        match self {
            TableBuilder::Head(b) => b.data_size(),
            TableBuilder::Hhea(b) => b.data_size(),
            TableBuilder::Maxp(b) => b.data_size(),
            TableBuilder::Hmtx(b) => b.data_size(),
            TableBuilder::Name(b) => b.data_size(),
            TableBuilder::Os2(b) => b.data_size(),
            TableBuilder::Post(b) => b.data_size(),
            TableBuilder::Cmap(b) => b.data_size(),
            TableBuilder::Loca(b) => b.data_size(),
            TableBuilder::Glyf(b) => b.data_size(),
            TableBuilder::Opaque(b) => b.data_size(),
        }
    }

    pub fn serialize(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        match self {
            TableBuilder::Head(b) => b.serialize(wr),
            TableBuilder::Hhea(b) => b.serialize(wr),
            TableBuilder::Maxp(b) => b.serialize(wr),
            TableBuilder::Hmtx(b) => b.serialize(wr),
            TableBuilder::Name(b) => b.serialize(wr),
            TableBuilder::Os2(b) => b.serialize(wr),
            TableBuilder::Post(b) => b.serialize(wr),
            TableBuilder::Cmap(b) => b.serialize(wr),
            TableBuilder::Loca(b) => b.serialize(wr),
            TableBuilder::Glyf(b) => b.serialize(wr),
            TableBuilder::Opaque(b) => b.serialize(wr),
        }
    }

    pub fn set_data(&mut self, data: FontData) {
        match self {
            TableBuilder::Head(b) => b.set_data(data),
            TableBuilder::Hhea(b) => b.set_data(data),
            TableBuilder::Maxp(b) => b.set_data(data),
            TableBuilder::Hmtx(b) => b.set_data(data),
            TableBuilder::Name(b) => b.set_data(data),
            TableBuilder::Os2(b) => b.set_data(data),
            TableBuilder::Post(b) => b.set_data(data),
            TableBuilder::Cmap(b) => b.set_data(data),
            TableBuilder::Loca(b) => b.set_data(data),
            TableBuilder::Glyf(b) => b.set_data(data),
            TableBuilder::Opaque(b) => b.set_data(data),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pristine_builder_passes_bytes_through() {
        let data = FontData::new(vec![1, 2, 3, 4, 5]);
        let builder: Builder<Raw> = Builder::from_data(data.clone(), ());
        assert!(!builder.model_changed());
        assert!(builder.ready_to_serialize());
        assert_eq!(builder.data_size().unwrap(), 5);

        let mut out = WritableFontData::new();
        assert_eq!(builder.serialize(&mut out).unwrap(), 5);
        assert_eq!(out.bytes(), data.bytes());
    }

    #[test]
    fn test_model_access_raises_model_changed() {
        let data = FontData::new(vec![1, 2, 3, 4, 5]);
        let mut builder: Builder<Raw> = Builder::from_data(data, ());
        builder.model().unwrap().0.push(6);
        assert!(builder.model_changed());
        assert_eq!(builder.data_size().unwrap(), 6);

        let mut out = WritableFontData::new();
        builder.serialize(&mut out).unwrap();
        assert_eq!(out.bytes(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_set_data_discards_model() {
        let mut builder: Builder<Raw> = Builder::from_data(FontData::new(vec![1, 2]), ());
        builder.model().unwrap().0.clear();
        assert!(builder.model_changed());

        builder.set_data(FontData::new(vec![9, 9, 9]));
        assert!(!builder.model_changed());
        assert_eq!(builder.data_size().unwrap(), 3);
    }
}
