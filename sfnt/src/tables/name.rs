use std::io::Write;

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use byteorder::{BigEndian, WriteBytesExt};

/// The naming table: localized strings (family, style, copyright, ...) keyed
/// by platform, encoding, language and name id.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/name
#[derive(Debug, PartialEq, Clone)]
pub struct Name {
    pub records: Vec<NameRecord>,
    /// Language-tag strings of a format 1 table (BCP 47, UTF-16BE). Empty
    /// for format 0.
    pub lang_tags: Vec<Vec<u8>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: u16,
    /// The raw string bytes; their encoding is selected by the platform and
    /// encoding ids.
    pub bytes: Vec<u8>,
}

impl NameRecord {
    /// Decodes the string for the encodings the crate understands: UTF-16BE
    /// for the Unicode and Windows platforms, Latin-1 for Macintosh Roman.
    pub fn string(&self) -> Option<String> {
        match (self.platform_id, self.encoding_id) {
            (0, _) | (3, _) => {
                let units: Vec<u16> = self
                    .bytes
                    .chunks_exact(2)
                    .map(|pair| u16::from(pair[0]) << 8 | u16::from(pair[1]))
                    .collect();
                String::from_utf16(&units).ok()
            }
            (1, 0) => Some(self.bytes.iter().map(|&b| b as char).collect()),
            _ => None,
        }
    }
}

impl Name {
    /// The first record carrying the given name id, in table order.
    pub fn find(&self, name_id: u16) -> Option<&NameRecord> {
        self.records.iter().find(|r| r.name_id == name_id)
    }
}

impl TableModel for Name {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let format = data.read_u16(0)?;
        let count = data.read_u16(2)? as usize;
        let string_offset = data.read_u16(4)? as usize;

        let mut records = Vec::with_capacity(count);
        for i in 0..count {
            let record = 6 + i * 12;
            let length = data.read_u16(record + 8)? as usize;
            let offset = data.read_u16(record + 10)? as usize;
            records.push(NameRecord {
                platform_id: data.read_u16(record)?,
                encoding_id: data.read_u16(record + 2)?,
                language_id: data.read_u16(record + 4)?,
                name_id: data.read_u16(record + 6)?,
                bytes: data.read_bytes(string_offset + offset, length)?.to_vec(),
            });
        }

        let mut lang_tags = Vec::new();
        if format == 1 {
            let base = 6 + count * 12;
            let lang_tag_count = data.read_u16(base)? as usize;
            for i in 0..lang_tag_count {
                let record = base + 2 + i * 4;
                let length = data.read_u16(record)? as usize;
                let offset = data.read_u16(record + 2)? as usize;
                lang_tags.push(data.read_bytes(string_offset + offset, length)?.to_vec());
            }
        }

        Ok(Name { records, lang_tags })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        let format: u16 = if self.lang_tags.is_empty() { 0 } else { 1 };
        let mut header_size = 6 + self.records.len() * 12;
        if format == 1 {
            header_size += 2 + self.lang_tags.len() * 4;
        }

        // string storage; identical byte runs share one offset
        let mut storage: Vec<u8> = Vec::new();
        let mut stored: Vec<(usize, usize)> = Vec::new();
        let mut offset_of = |bytes: &[u8]| -> usize {
            let existing = stored
                .iter()
                .find(|(offset, length)| &storage[*offset..offset + length] == bytes);
            if let Some((offset, _)) = existing {
                return *offset;
            }
            let offset = storage.len();
            storage.extend_from_slice(bytes);
            stored.push((offset, bytes.len()));
            offset
        };

        let record_offsets: Vec<usize> =
            self.records.iter().map(|r| offset_of(&r.bytes)).collect();
        let lang_tag_offsets: Vec<usize> =
            self.lang_tags.iter().map(|t| offset_of(t)).collect();

        wr.write_u16::<BigEndian>(format)?;
        wr.write_u16::<BigEndian>(self.records.len() as u16)?;
        wr.write_u16::<BigEndian>(header_size as u16)?;
        for (record, offset) in self.records.iter().zip(&record_offsets) {
            wr.write_u16::<BigEndian>(record.platform_id)?;
            wr.write_u16::<BigEndian>(record.encoding_id)?;
            wr.write_u16::<BigEndian>(record.language_id)?;
            wr.write_u16::<BigEndian>(record.name_id)?;
            wr.write_u16::<BigEndian>(record.bytes.len() as u16)?;
            wr.write_u16::<BigEndian>(*offset as u16)?;
        }
        if format == 1 {
            wr.write_u16::<BigEndian>(self.lang_tags.len() as u16)?;
            for (tag, offset) in self.lang_tags.iter().zip(&lang_tag_offsets) {
                wr.write_u16::<BigEndian>(tag.len() as u16)?;
                wr.write_u16::<BigEndian>(*offset as u16)?;
            }
        }
        wr.write_all(&storage)?;
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        self.records.len() <= u16::max_value() as usize
            && self
                .records
                .iter()
                .all(|r| r.bytes.len() <= u16::max_value() as usize)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn utf16be(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_be_bytes().to_vec()).collect()
    }

    #[test]
    fn test_name_encode_decode() {
        let name = Name {
            records: vec![
                NameRecord {
                    platform_id: 3,
                    encoding_id: 1,
                    language_id: 0x0409,
                    name_id: 1,
                    bytes: utf16be("Test Family"),
                },
                NameRecord {
                    platform_id: 3,
                    encoding_id: 1,
                    language_id: 0x0409,
                    name_id: 4,
                    bytes: utf16be("Test Family"),
                },
            ],
            lang_tags: Vec::new(),
        };

        let mut buffer = WritableFontData::new();
        name.write(&mut buffer).unwrap();
        // shared storage: the identical family and full name are stored once
        assert_eq!(buffer.len(), 6 + 2 * 12 + "Test Family".len() * 2);
        assert_eq!(Name::read(&buffer.data(), &()).unwrap(), name);
    }

    #[test]
    fn test_name_string_decoding() {
        let record = NameRecord {
            platform_id: 3,
            encoding_id: 1,
            language_id: 0x0409,
            name_id: 1,
            bytes: utf16be("Grüße"),
        };
        assert_eq!(record.string().as_deref(), Some("Grüße"));

        let mac = NameRecord {
            platform_id: 1,
            encoding_id: 0,
            language_id: 0,
            name_id: 1,
            bytes: b"Plain".to_vec(),
        };
        assert_eq!(mac.string().as_deref(), Some("Plain"));
    }

    #[test]
    fn test_name_format1_lang_tags() {
        let name = Name {
            records: vec![NameRecord {
                platform_id: 0,
                encoding_id: 4,
                language_id: 0x8000,
                name_id: 1,
                bytes: utf16be("Familie"),
            }],
            lang_tags: vec![utf16be("de-DE")],
        };

        let mut buffer = WritableFontData::new();
        name.write(&mut buffer).unwrap();
        let reread = Name::read(&buffer.data(), &()).unwrap();
        assert_eq!(reread, name);
        assert_eq!(reread.find(1).unwrap().string().as_deref(), Some("Familie"));
    }
}
