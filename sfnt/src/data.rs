use std::fmt;
use std::io;
use std::sync::Arc;

use crate::error::Error;
use byteorder::{BigEndian, ByteOrder};

/// An immutable window over shared font bytes, with big-endian scalar reads
/// and bounded slicing. Every table decoder reads through this type.
///
/// Slicing is cheap: sub-windows share the same backing storage, which is
/// released once the last window is dropped. All reads are bounds-checked
/// against the window (`offset + size_of(value) <= length`) and fail with
/// [`Error::OutOfBounds`] otherwise.
#[derive(Clone)]
pub struct FontData {
    storage: Arc<[u8]>,
    offset: usize,
    length: usize,
}

impl FontData {
    pub fn new(bytes: Vec<u8>) -> Self {
        let length = bytes.len();
        FontData {
            storage: bytes.into(),
            offset: 0,
            length,
        }
    }

    pub fn from_slice(bytes: &[u8]) -> Self {
        FontData::new(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The bytes of this window.
    pub fn bytes(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.length]
    }

    /// A bounded sub-window sharing the same backing storage.
    pub fn slice(&self, offset: usize, length: usize) -> Result<FontData, Error> {
        if offset.checked_add(length).map_or(true, |end| end > self.length) {
            return Err(Error::OutOfBounds);
        }
        Ok(FontData {
            storage: Arc::clone(&self.storage),
            offset: self.offset + offset,
            length,
        })
    }

    /// A sub-window from `offset` to the end of this window.
    pub fn slice_from(&self, offset: usize) -> Result<FontData, Error> {
        if offset > self.length {
            return Err(Error::OutOfBounds);
        }
        self.slice(offset, self.length - offset)
    }

    fn checked(&self, offset: usize, size: usize) -> Result<&[u8], Error> {
        if offset.checked_add(size).map_or(true, |end| end > self.length) {
            return Err(Error::OutOfBounds);
        }
        let start = self.offset + offset;
        Ok(&self.storage[start..start + size])
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, Error> {
        Ok(self.checked(offset, 1)?[0])
    }

    pub fn read_i8(&self, offset: usize) -> Result<i8, Error> {
        Ok(self.checked(offset, 1)?[0] as i8)
    }

    pub fn read_u16(&self, offset: usize) -> Result<u16, Error> {
        Ok(BigEndian::read_u16(self.checked(offset, 2)?))
    }

    pub fn read_i16(&self, offset: usize) -> Result<i16, Error> {
        Ok(BigEndian::read_i16(self.checked(offset, 2)?))
    }

    pub fn read_u24(&self, offset: usize) -> Result<u32, Error> {
        Ok(BigEndian::read_u24(self.checked(offset, 3)?))
    }

    pub fn read_i32(&self, offset: usize) -> Result<i32, Error> {
        Ok(BigEndian::read_i32(self.checked(offset, 4)?))
    }

    pub fn read_u32(&self, offset: usize) -> Result<u32, Error> {
        Ok(BigEndian::read_u32(self.checked(offset, 4)?))
    }

    /// Reads a 32-bit unsigned value into a signed integer, failing with
    /// [`Error::OutOfRange`] if the value has its top bit set.
    pub fn read_u32_as_i32(&self, offset: usize) -> Result<i32, Error> {
        let value = self.read_u32(offset)?;
        if value > i32::max_value() as u32 {
            return Err(Error::OutOfRange(value));
        }
        Ok(value as i32)
    }

    /// Reads a 16.16 fixed-point value as its raw 32-bit representation.
    pub fn read_fixed(&self, offset: usize) -> Result<i32, Error> {
        self.read_i32(offset)
    }

    /// Reads a 2.14 fixed-point value as its raw 16-bit representation.
    pub fn read_f2dot14(&self, offset: usize) -> Result<i16, Error> {
        self.read_i16(offset)
    }

    /// Reads a long datetime: seconds since 1904-01-01T00:00:00 UTC.
    pub fn read_long_datetime(&self, offset: usize) -> Result<i64, Error> {
        Ok(BigEndian::read_i64(self.checked(offset, 8)?))
    }

    pub fn read_bytes(&self, offset: usize, length: usize) -> Result<&[u8], Error> {
        self.checked(offset, length)
    }

    /// The OpenType table checksum: the sum of the data as 32-bit big-endian
    /// words, with a final partial word zero-padded on the right.
    pub fn checksum(&self) -> u32 {
        checksum(self.bytes())
    }

    /// Binary search over two parallel sorted arrays of range start/end
    /// values, both indexed by the same `i in 0..count`: the start of range
    /// `i` is the ushort at `start_offset + i * start_stride`, its end at
    /// `end_offset + i * end_stride`. Ranges are inclusive on both sides and
    /// end values must be non-decreasing. Returns the index of the range
    /// containing `key`, or `None` if `key` falls into a gap or beyond the
    /// last range.
    pub fn search_u16(
        &self,
        start_offset: usize,
        start_stride: usize,
        end_offset: usize,
        end_stride: usize,
        count: usize,
        key: u16,
    ) -> Result<Option<usize>, Error> {
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let end = self.read_u16(end_offset + mid * end_stride)?;
            if key > end {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo >= count {
            return Ok(None);
        }
        let start = self.read_u16(start_offset + lo * start_stride)?;
        Ok(if key >= start { Some(lo) } else { None })
    }

    /// The 32-bit variant of [`FontData::search_u16`].
    pub fn search_u32(
        &self,
        start_offset: usize,
        start_stride: usize,
        end_offset: usize,
        end_stride: usize,
        count: usize,
        key: u32,
    ) -> Result<Option<usize>, Error> {
        let mut lo = 0;
        let mut hi = count;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let end = self.read_u32(end_offset + mid * end_stride)?;
            if key > end {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        if lo >= count {
            return Ok(None);
        }
        let start = self.read_u32(start_offset + lo * start_stride)?;
        Ok(if key >= start { Some(lo) } else { None })
    }
}

impl PartialEq for FontData {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl fmt::Debug for FontData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontData")
            .field("offset", &self.offset)
            .field("length", &self.length)
            .finish()
    }
}

impl From<Vec<u8>> for FontData {
    fn from(bytes: Vec<u8>) -> Self {
        FontData::new(bytes)
    }
}

/// A growable output buffer for table serialization.
///
/// Sequential writes go through [`io::Write`] (so serializers can use
/// `byteorder::WriteBytesExt`), appending at the end and growing the buffer.
/// Offsets that can only be known after layout (directory entries, subtable
/// offsets, `check_sum_adjustment`) are patched afterwards with the `*_at`
/// writes, which also grow the buffer when the write extends past its end.
#[derive(Debug, Default, PartialEq)]
pub struct WritableFontData {
    data: Vec<u8>,
}

impl WritableFontData {
    pub fn new() -> Self {
        WritableFontData { data: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        WritableFontData {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    fn grow_for(&mut self, offset: usize, size: usize) -> &mut [u8] {
        let end = offset + size;
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        &mut self.data[offset..end]
    }

    pub fn write_u8_at(&mut self, offset: usize, value: u8) -> usize {
        self.grow_for(offset, 1)[0] = value;
        1
    }

    pub fn write_i8_at(&mut self, offset: usize, value: i8) -> usize {
        self.write_u8_at(offset, value as u8)
    }

    pub fn write_u16_at(&mut self, offset: usize, value: u16) -> usize {
        BigEndian::write_u16(self.grow_for(offset, 2), value);
        2
    }

    pub fn write_i16_at(&mut self, offset: usize, value: i16) -> usize {
        BigEndian::write_i16(self.grow_for(offset, 2), value);
        2
    }

    pub fn write_u32_at(&mut self, offset: usize, value: u32) -> usize {
        BigEndian::write_u32(self.grow_for(offset, 4), value);
        4
    }

    pub fn write_i32_at(&mut self, offset: usize, value: i32) -> usize {
        BigEndian::write_i32(self.grow_for(offset, 4), value);
        4
    }

    /// Writes a 16.16 fixed-point value from its raw representation.
    pub fn write_fixed_at(&mut self, offset: usize, value: i32) -> usize {
        self.write_i32_at(offset, value)
    }

    pub fn write_long_datetime_at(&mut self, offset: usize, value: i64) -> usize {
        BigEndian::write_i64(self.grow_for(offset, 8), value);
        8
    }

    /// A bounded writable window into already-written bytes. Writes through
    /// the window are visible in this buffer, which owns the storage.
    pub fn slice_mut(&mut self, offset: usize, length: usize) -> Result<&mut [u8], Error> {
        if offset.checked_add(length).map_or(true, |end| end > self.data.len()) {
            return Err(Error::OutOfBounds);
        }
        Ok(&mut self.data[offset..offset + length])
    }

    /// Appends zero bytes until the length is a multiple of `align`.
    pub fn pad_to(&mut self, align: usize) {
        while self.data.len() % align != 0 {
            self.data.push(0);
        }
    }

    pub fn checksum(&self) -> u32 {
        checksum(&self.data)
    }

    /// Checksum of the byte range `[offset, offset + length)`, zero-padding
    /// the final partial word. Used for per-table directory checksums.
    pub fn checksum_of(&self, offset: usize, length: usize) -> Result<u32, Error> {
        if offset.checked_add(length).map_or(true, |end| end > self.data.len()) {
            return Err(Error::OutOfBounds);
        }
        Ok(checksum(&self.data[offset..offset + length]))
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn data(&self) -> FontData {
        FontData::from_slice(&self.data)
    }
}

impl io::Write for WritableFontData {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub(crate) fn checksum(bytes: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        sum = sum.wrapping_add(BigEndian::read_u32(chunk));
    }
    let remainder = chunks.remainder();
    if !remainder.is_empty() {
        let mut word = [0u8; 4];
        word[..remainder.len()].copy_from_slice(remainder);
        sum = sum.wrapping_add(BigEndian::read_u32(&word));
    }
    sum
}
