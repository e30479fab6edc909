use std::io::{Cursor, Read, Write};

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// The PostScript table: glyph names and printer metadata.
/// Version 2.0 carries a glyph-name index plus Pascal-string names; versions
/// 1.0 and 3.0 are header-only.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/post
#[derive(Debug, PartialEq, Clone)]
pub struct Post {
    /// Raw 16.16 version: 0x00010000, 0x00020000 or 0x00030000.
    pub version: u32,
    /// Italic angle in counter-clockwise degrees from the vertical (16.16).
    pub italic_angle: i32,
    pub underline_position: i16,
    pub underline_thickness: i16,
    /// 0 if the font is proportionally spaced, non-zero otherwise.
    pub is_fixed_pitch: u32,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
    /// Present for version 2.0 only.
    pub names: Option<PostNames>,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct PostNames {
    /// Per-glyph index: values below 258 select a standard Macintosh glyph
    /// name, values from 258 select `names[index - 258]`.
    pub glyph_name_index: Vec<u16>,
    pub names: Vec<String>,
}

impl Post {
    pub fn glyph_name(&self, glyph_id: u16) -> Option<&str> {
        let names = self.names.as_ref()?;
        let index = *names.glyph_name_index.get(glyph_id as usize)? as usize;
        if index < MAC_GLYPH_NAMES.len() {
            Some(MAC_GLYPH_NAMES[index])
        } else {
            names.names.get(index - MAC_GLYPH_NAMES.len()).map(String::as_str)
        }
    }
}

impl TableModel for Post {
    type ReadDep = ();

    fn read(data: &FontData, _: &Self::ReadDep) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let version = rd.read_u32::<BigEndian>()?;
        if !matches!(version, 0x00010000 | 0x00020000 | 0x00030000) {
            return Err(Error::corrupt(
                Tag::POST,
                format!("unsupported version 0x{:08X}", version),
            ));
        }

        let italic_angle = rd.read_i32::<BigEndian>()?;
        let underline_position = rd.read_i16::<BigEndian>()?;
        let underline_thickness = rd.read_i16::<BigEndian>()?;
        let is_fixed_pitch = rd.read_u32::<BigEndian>()?;
        let min_mem_type42 = rd.read_u32::<BigEndian>()?;
        let max_mem_type42 = rd.read_u32::<BigEndian>()?;
        let min_mem_type1 = rd.read_u32::<BigEndian>()?;
        let max_mem_type1 = rd.read_u32::<BigEndian>()?;

        let names = if version == 0x00020000 {
            let num_glyphs = rd.read_u16::<BigEndian>()? as usize;
            let mut glyph_name_index = vec![0u16; num_glyphs];
            rd.read_u16_into::<BigEndian>(&mut glyph_name_index)?;

            let mut names = Vec::new();
            while (rd.position() as usize) < data.len() {
                let length = rd.read_u8()? as usize;
                let mut bytes = vec![0; length];
                rd.read_exact(&mut bytes)?;
                names.push(String::from_utf8_lossy(&bytes).to_string());
            }
            Some(PostNames {
                glyph_name_index,
                names,
            })
        } else {
            None
        };

        Ok(Post {
            version,
            italic_angle,
            underline_position,
            underline_thickness,
            is_fixed_pitch,
            min_mem_type42,
            max_mem_type42,
            min_mem_type1,
            max_mem_type1,
            names,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        wr.write_u32::<BigEndian>(self.version)?;
        wr.write_i32::<BigEndian>(self.italic_angle)?;
        wr.write_i16::<BigEndian>(self.underline_position)?;
        wr.write_i16::<BigEndian>(self.underline_thickness)?;
        wr.write_u32::<BigEndian>(self.is_fixed_pitch)?;
        wr.write_u32::<BigEndian>(self.min_mem_type42)?;
        wr.write_u32::<BigEndian>(self.max_mem_type42)?;
        wr.write_u32::<BigEndian>(self.min_mem_type1)?;
        wr.write_u32::<BigEndian>(self.max_mem_type1)?;
        if let Some(names) = &self.names {
            wr.write_u16::<BigEndian>(names.glyph_name_index.len() as u16)?;
            for index in &names.glyph_name_index {
                wr.write_u16::<BigEndian>(*index)?;
            }
            for name in &names.names {
                wr.write_u8(name.len() as u8)?;
                wr.write_all(name.as_bytes())?;
            }
        }
        Ok(wr.len() - start)
    }

    fn ready(&self) -> bool {
        (self.version == 0x00020000) == self.names.is_some()
            && self.names.as_ref().map_or(true, |names| {
                names.names.iter().all(|name| name.len() <= u8::max_value() as usize)
            })
    }
}

/// The 258 standard Macintosh glyph names shared by all version 2.0 tables.
#[rustfmt::skip]
const MAC_GLYPH_NAMES: [&str; 258] = [
    ".notdef", ".null", "nonmarkingreturn", "space", "exclam", "quotedbl",
    "numbersign", "dollar", "percent", "ampersand", "quotesingle", "parenleft",
    "parenright", "asterisk", "plus", "comma", "hyphen", "period", "slash",
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight",
    "nine", "colon", "semicolon", "less", "equal", "greater", "question", "at",
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O",
    "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "bracketleft",
    "backslash", "bracketright", "asciicircum", "underscore", "grave", "a",
    "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p",
    "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "braceleft", "bar",
    "braceright", "asciitilde", "Adieresis", "Aring", "Ccedilla", "Eacute",
    "Ntilde", "Odieresis", "Udieresis", "aacute", "agrave", "acircumflex",
    "adieresis", "atilde", "aring", "ccedilla", "eacute", "egrave",
    "ecircumflex", "edieresis", "iacute", "igrave", "icircumflex", "idieresis",
    "ntilde", "oacute", "ograve", "ocircumflex", "odieresis", "otilde",
    "uacute", "ugrave", "ucircumflex", "udieresis", "dagger", "degree", "cent",
    "sterling", "section", "bullet", "paragraph", "germandbls", "registered",
    "copyright", "trademark", "acute", "dieresis", "notequal", "AE", "Oslash",
    "infinity", "plusminus", "lessequal", "greaterequal", "yen", "mu",
    "partialdiff", "summation", "product", "pi", "integral", "ordfeminine",
    "ordmasculine", "Omega", "ae", "oslash", "questiondown", "exclamdown",
    "logicalnot", "radical", "florin", "approxequal", "Delta", "guillemotleft",
    "guillemotright", "ellipsis", "nonbreakingspace", "Agrave", "Atilde",
    "Otilde", "OE", "oe", "endash", "emdash", "quotedblleft", "quotedblright",
    "quoteleft", "quoteright", "divide", "lozenge", "ydieresis", "Ydieresis",
    "fraction", "currency", "guilsinglleft", "guilsinglright", "fi", "fl",
    "daggerdbl", "periodcentered", "quotesinglbase", "quotedblbase",
    "perthousand", "Acircumflex", "Ecircumflex", "Aacute", "Edieresis",
    "Egrave", "Iacute", "Icircumflex", "Idieresis", "Igrave", "Oacute",
    "Ocircumflex", "apple", "Ograve", "Uacute", "Ucircumflex", "Ugrave",
    "dotlessi", "circumflex", "tilde", "macron", "breve", "dotaccent", "ring",
    "cedilla", "hungarumlaut", "ogonek", "caron", "Lslash", "lslash",
    "Scaron", "scaron", "Zcaron", "zcaron", "brokenbar", "Eth", "eth",
    "Yacute", "yacute", "Thorn", "thorn", "minus", "multiply", "onesuperior",
    "twosuperior", "threesuperior", "onehalf", "onequarter", "threequarters",
    "franc", "Gbreve", "gbreve", "Idotaccent", "Scedilla", "scedilla",
    "Cacute", "cacute", "Ccaron", "ccaron", "dcroat",
];

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_post_version3_encode_decode() {
        let post = Post {
            version: 0x00030000,
            italic_angle: 0,
            underline_position: -75,
            underline_thickness: 50,
            is_fixed_pitch: 0,
            min_mem_type42: 0,
            max_mem_type42: 0,
            min_mem_type1: 0,
            max_mem_type1: 0,
            names: None,
        };

        let mut buffer = WritableFontData::new();
        assert_eq!(post.write(&mut buffer).unwrap(), 32);
        assert_eq!(Post::read(&buffer.data(), &()).unwrap(), post);
    }

    #[test]
    fn test_post_version2_glyph_names() {
        let post = Post {
            version: 0x00020000,
            italic_angle: 0,
            underline_position: -75,
            underline_thickness: 50,
            is_fixed_pitch: 0,
            min_mem_type42: 0,
            max_mem_type42: 0,
            min_mem_type1: 0,
            max_mem_type1: 0,
            names: Some(PostNames {
                // .notdef, "A" (standard index 36), one custom name
                glyph_name_index: vec![0, 36, 258],
                names: vec!["uniE000".to_string()],
            }),
        };

        let mut buffer = WritableFontData::new();
        post.write(&mut buffer).unwrap();
        let reread = Post::read(&buffer.data(), &()).unwrap();
        assert_eq!(reread, post);

        assert_eq!(reread.glyph_name(0), Some(".notdef"));
        assert_eq!(reread.glyph_name(1), Some("A"));
        assert_eq!(reread.glyph_name(2), Some("uniE000"));
        assert_eq!(reread.glyph_name(3), None);
    }

    #[test]
    fn test_post_rejects_deprecated_version25() {
        let mut buffer = WritableFontData::new();
        buffer.write_u32::<BigEndian>(0x00025000).unwrap();
        for _ in 0..7 {
            buffer.write_u32::<BigEndian>(0).unwrap();
        }
        assert!(matches!(
            Post::read(&buffer.data(), &()),
            Err(Error::CorruptTable { tag: Tag::POST, .. })
        ));
    }
}
