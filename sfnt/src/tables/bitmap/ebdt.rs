use crate::data::FontData;
use crate::error::Error;
use crate::tables::bitmap::{BigGlyphMetrics, SmallGlyphMetrics};
use crate::tag::Tag;

/// The embedded bitmap data table: a version header followed by glyph image
/// blocks. Images are located through 'EBLC'; their interpretation is
/// selected by the image format carried in the index subtable.
/// See https://docs.microsoft.com/en-us/typography/opentype/spec/ebdt
#[derive(Debug, PartialEq, Clone)]
pub struct Ebdt {
    data: FontData,
}

/// A decoded glyph image block.
#[derive(Debug, PartialEq, Clone)]
pub enum BitmapGlyph {
    /// Formats 1 (byte-aligned) and 2 (bit-aligned): small metrics plus
    /// image data.
    Small {
        metrics: SmallGlyphMetrics,
        image: FontData,
    },
    /// Formats 6 (byte-aligned) and 7 (bit-aligned): big metrics plus image
    /// data.
    Big {
        metrics: BigGlyphMetrics,
        image: FontData,
    },
    /// Format 5: bit-aligned data without per-glyph metrics (metrics live in
    /// the 'EBLC' index subtable).
    Bare { image: FontData },
    /// Format 8: small metrics plus component glyphs.
    SmallComposite {
        metrics: SmallGlyphMetrics,
        components: Vec<EbdtComponent>,
    },
    /// Format 9: big metrics plus component glyphs.
    BigComposite {
        metrics: BigGlyphMetrics,
        components: Vec<EbdtComponent>,
    },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct EbdtComponent {
    pub glyph_id: u16,
    pub x_offset: i8,
    pub y_offset: i8,
}

impl Ebdt {
    pub fn new(data: FontData) -> Self {
        Ebdt { data }
    }

    pub fn major_version(&self) -> Result<u16, Error> {
        self.data.read_u16(0)
    }

    pub fn minor_version(&self) -> Result<u16, Error> {
        self.data.read_u16(2)
    }

    /// The raw bytes of a glyph image block, as located by an 'EBLC' index
    /// subtable (`image_data_offset + glyph_start_offset`, `glyph_length`).
    pub fn glyph_data(&self, offset: u32, length: u32) -> Result<FontData, Error> {
        self.data.slice(offset as usize, length as usize)
    }

    /// Decodes a glyph image block according to `image_format`.
    pub fn glyph(
        &self,
        offset: u32,
        length: u32,
        image_format: u16,
    ) -> Result<BitmapGlyph, Error> {
        let data = self.glyph_data(offset, length)?;
        match image_format {
            1 | 2 => Ok(BitmapGlyph::Small {
                metrics: SmallGlyphMetrics::read(&data, 0)?,
                image: data.slice_from(5)?,
            }),
            5 => Ok(BitmapGlyph::Bare { image: data }),
            6 | 7 => Ok(BitmapGlyph::Big {
                metrics: BigGlyphMetrics::read(&data, 0)?,
                image: data.slice_from(8)?,
            }),
            8 => {
                let metrics = SmallGlyphMetrics::read(&data, 0)?;
                // one pad byte after the small metrics
                let num_components = data.read_u16(6)? as usize;
                Ok(BitmapGlyph::SmallComposite {
                    metrics,
                    components: Ebdt::components(&data, 8, num_components)?,
                })
            }
            9 => {
                let metrics = BigGlyphMetrics::read(&data, 0)?;
                let num_components = data.read_u16(8)? as usize;
                Ok(BitmapGlyph::BigComposite {
                    metrics,
                    components: Ebdt::components(&data, 10, num_components)?,
                })
            }
            _ => Err(Error::UnknownFormat {
                tag: Tag::EBDT,
                format: image_format,
            }),
        }
    }

    fn components(
        data: &FontData,
        base: usize,
        count: usize,
    ) -> Result<Vec<EbdtComponent>, Error> {
        let mut components = Vec::with_capacity(count);
        for i in 0..count {
            let offset = base + i * 4;
            components.push(EbdtComponent {
                glyph_id: data.read_u16(offset)?,
                x_offset: data.read_i8(offset + 2)?,
                y_offset: data.read_i8(offset + 3)?,
            });
        }
        Ok(components)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::WritableFontData;
    use byteorder::{BigEndian, WriteBytesExt};
    use std::io::Write;

    #[test]
    fn test_ebdt_small_metrics_glyph() {
        let mut wr = WritableFontData::new();
        wr.write_u16::<BigEndian>(2).unwrap(); // major version
        wr.write_u16::<BigEndian>(0).unwrap(); // minor version
        wr.write_all(&[8, 6, 0, 8, 7]).unwrap(); // small metrics
        wr.write_all(&[0xF0, 0xF0, 0xF0, 0xF0, 0xF0, 0xF0]).unwrap();

        let ebdt = Ebdt::new(wr.data());
        assert_eq!(ebdt.major_version().unwrap(), 2);
        match ebdt.glyph(4, 11, 1).unwrap() {
            BitmapGlyph::Small { metrics, image } => {
                assert_eq!(metrics.height, 8);
                assert_eq!(metrics.width, 6);
                assert_eq!(metrics.advance, 7);
                assert_eq!(image.len(), 6);
            }
            other => panic!("expected a small-metrics glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_ebdt_metrics_less_glyph() {
        let mut wr = WritableFontData::new();
        wr.write_u32::<BigEndian>(0x00020000).unwrap(); // version
        wr.write_all(&[0xAA; 9]).unwrap();

        let ebdt = Ebdt::new(wr.data());
        match ebdt.glyph(4, 9, 5).unwrap() {
            BitmapGlyph::Bare { image } => assert_eq!(image.len(), 9),
            other => panic!("expected a bare glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_ebdt_big_composite_glyph() {
        let mut wr = WritableFontData::new();
        wr.write_u32::<BigEndian>(0x00020000).unwrap(); // version
        wr.write_all(&[10, 10, 0, 10, 11, 0, 0, 11]).unwrap(); // big metrics
        wr.write_u16::<BigEndian>(2).unwrap(); // num components
        wr.write_u16::<BigEndian>(5).unwrap();
        wr.write_all(&[0u8, 0]).unwrap();
        wr.write_u16::<BigEndian>(6).unwrap();
        wr.write_all(&[3u8, 0xFF]).unwrap(); // x offset 3, y offset -1

        let ebdt = Ebdt::new(wr.data());
        match ebdt.glyph(4, 18, 9).unwrap() {
            BitmapGlyph::BigComposite { components, .. } => {
                assert_eq!(
                    components,
                    vec![
                        EbdtComponent {
                            glyph_id: 5,
                            x_offset: 0,
                            y_offset: 0
                        },
                        EbdtComponent {
                            glyph_id: 6,
                            x_offset: 3,
                            y_offset: -1
                        },
                    ]
                );
            }
            other => panic!("expected a composite glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_ebdt_unknown_image_format() {
        let ebdt = Ebdt::new(FontData::new(vec![0; 16]));
        assert!(matches!(
            ebdt.glyph(4, 8, 42),
            Err(Error::UnknownFormat {
                tag: Tag::EBDT,
                format: 42
            })
        ));
    }
}
