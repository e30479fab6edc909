use std::io;

use crate::tag::Tag;
use thiserror::Error;

/// Errors surfaced by font parsing and serialization.
///
/// The loader is strict about the table directory and lenient about table
/// contents: a table with corrupt internals loads fine and only fails once a
/// typed accessor touches the broken range.
#[derive(Debug, Error)]
pub enum Error {
    /// A read, write or slice exceeded the bounds of its data window. The
    /// in-flight operation is abandoned; the underlying data is untouched.
    #[error("attempted to access data outside of its bounds")]
    OutOfBounds,
    /// A 32-bit unsigned value does not fit into a signed 32-bit integer.
    #[error("unsigned 32-bit value {0} exceeds the signed integer range")]
    OutOfRange(u32),
    /// A glyph id outside of the range covered by a bitmap index subtable.
    #[error("glyph id {glyph_id} outside of covered range {first}..={last}")]
    GlyphOutOfRange { glyph_id: u16, first: u16, last: u16 },
    /// A structural invariant of a table is violated. Fatal for that table;
    /// other tables of the same font remain usable.
    #[error("corrupt {tag} table: {reason}")]
    CorruptTable { tag: Tag, reason: String },
    /// A subtable format number is not recognized. The raw bytes are
    /// preserved; only typed access fails.
    #[error("unknown format {format} in {tag} table")]
    UnknownFormat { tag: Tag, format: u16 },
    /// A builder's invariants are not met, so it cannot emit bytes.
    #[error("{0} table is not ready for serialization")]
    NotReadyForSerialization(Tag),
    /// Reported by opt-in checksum verification; never fatal for loading.
    #[error("checksum mismatch for {0} table")]
    ChecksumMismatch(Tag),
    /// The table directory (not a table's contents) is malformed.
    #[error("corrupt font: {0}")]
    CorruptFont(String),
    /// A required table is missing from the font.
    #[error("{0} table missing")]
    MissingTable(Tag),
    #[error(transparent)]
    Io(io::Error),
}

impl Error {
    pub(crate) fn corrupt(tag: Tag, reason: impl Into<String>) -> Self {
        Error::CorruptTable {
            tag,
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        // All sequential decoding runs against in-memory windows, where the
        // only read failure is running off the end of the window.
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::OutOfBounds
        } else {
            Error::Io(err)
        }
    }
}
