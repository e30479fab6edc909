use std::io::{Cursor, Read, Write};

use crate::data::{FontData, WritableFontData};
use crate::error::Error;
use crate::tables::TableModel;
use crate::tag::Tag;
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

/// The 'glyf' table is comprised of a list of glyph data blocks, each of
/// which provides the description for a single glyph. Glyph blocks are
/// located through the 'loca' table.
/// See spec:
/// - https://docs.microsoft.com/en-us/typography/opentype/spec/glyf
/// - https://developer.apple.com/fonts/TrueType-Reference-Manual/RM06/Chap6glyf.html
#[derive(Debug, PartialEq, Clone)]
pub struct Glyf {
    data: FontData,
}

impl Glyf {
    pub fn new(data: FontData) -> Self {
        Glyf { data }
    }

    /// Decodes the glyph occupying `[offset, offset + length)`, as located
    /// by the 'loca' table. A zero length means "no outline".
    pub fn glyph(&self, offset: u32, length: u32) -> Result<Option<Glyph>, Error> {
        if length == 0 {
            return Ok(None);
        }
        let data = self.data.slice(offset as usize, length as usize)?;
        Glyph::read(&data).map(Some)
    }

    pub fn data(&self) -> &FontData {
        &self.data
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Glyph {
    /// Minimum x for coordinate data.
    pub x_min: i16,
    /// Minimum y for coordinate data.
    pub y_min: i16,
    /// Maximum x for coordinate data.
    pub x_max: i16,
    /// Maximum y for coordinate data.
    pub y_max: i16,
    pub description: GlyphDescription,
}

#[derive(Debug, PartialEq, Clone)]
pub enum GlyphDescription {
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

/// A glyph defined by its own contours. Coordinates are absolute; the
/// delta encoding of the binary form is resolved during decoding and
/// re-derived (with run-length compressed flags) during encoding.
#[derive(Debug, PartialEq, Clone)]
pub struct SimpleGlyph {
    /// Point indices of the last point of each contour; the number of
    /// points is `end_pts_of_contours[last] + 1`.
    pub end_pts_of_contours: Vec<u16>,
    pub instructions: Vec<u8>,
    pub points: Vec<Point>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

/// A glyph assembled from other glyphs.
#[derive(Debug, PartialEq, Clone)]
pub struct CompositeGlyph {
    pub components: Vec<Component>,
    /// Placed after the last component when present.
    pub instructions: Option<Vec<u8>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Component {
    pub flags: u16,
    pub glyph_index: u16,
    pub args: Args,
    pub scale: Option<Scale>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Args {
    U16(u16, u16),
    I16(i16, i16),
    U8(u8, u8),
    I8(i8, i8),
}

/// Scale values are raw 2.14 fixed-point numbers.
#[derive(Debug, PartialEq, Clone)]
pub enum Scale {
    Simple(i16),
    XY {
        x: i16,
        y: i16,
    },
    TwoByTwo {
        x: i16,
        scale01: i16,
        scale10: i16,
        y: i16,
    },
}

// simple glyph flags
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;

// composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

impl Glyph {
    pub(crate) fn read(data: &FontData) -> Result<Self, Error> {
        let mut rd = Cursor::new(data.bytes());
        let number_of_contours = rd.read_i16::<BigEndian>()?;
        let x_min = rd.read_i16::<BigEndian>()?;
        let y_min = rd.read_i16::<BigEndian>()?;
        let x_max = rd.read_i16::<BigEndian>()?;
        let y_max = rd.read_i16::<BigEndian>()?;

        let description = if number_of_contours < 0 {
            GlyphDescription::Composite(CompositeGlyph::read(&mut rd)?)
        } else {
            GlyphDescription::Simple(SimpleGlyph::read(&mut rd, number_of_contours as usize)?)
        };

        Ok(Glyph {
            x_min,
            y_min,
            x_max,
            y_max,
            description,
        })
    }

    pub(crate) fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        let number_of_contours = match &self.description {
            GlyphDescription::Simple(simple) => {
                if simple.end_pts_of_contours.len() > i16::max_value() as usize {
                    return Err(Error::corrupt(Tag::GLYF, "too many contours"));
                }
                simple.end_pts_of_contours.len() as i16
            }
            GlyphDescription::Composite(_) => -1,
        };
        wr.write_i16::<BigEndian>(number_of_contours)?;
        wr.write_i16::<BigEndian>(self.x_min)?;
        wr.write_i16::<BigEndian>(self.y_min)?;
        wr.write_i16::<BigEndian>(self.x_max)?;
        wr.write_i16::<BigEndian>(self.y_max)?;
        match &self.description {
            GlyphDescription::Simple(simple) => simple.write(wr)?,
            GlyphDescription::Composite(composite) => composite.write(wr)?,
        }
        Ok(wr.len() - start)
    }
}

impl SimpleGlyph {
    fn read(rd: &mut Cursor<&[u8]>, number_of_contours: usize) -> Result<Self, Error> {
        let mut end_pts_of_contours = Vec::with_capacity(number_of_contours);
        for _ in 0..number_of_contours {
            end_pts_of_contours.push(rd.read_u16::<BigEndian>()?);
        }
        let num_points = end_pts_of_contours
            .last()
            .map(|last| *last as usize + 1)
            .unwrap_or(0);

        let instruction_length = rd.read_u16::<BigEndian>()? as usize;
        let mut instructions = vec![0; instruction_length];
        rd.read_exact(&mut instructions)?;

        // flags are run-length encoded: REPEAT means the next byte is a
        // repeat count
        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            let flag = rd.read_u8()?;
            flags.push(flag);
            if flag & REPEAT_FLAG != 0 {
                let count = rd.read_u8()?;
                for _ in 0..count {
                    flags.push(flag);
                }
            }
        }
        if flags.len() != num_points {
            return Err(Error::corrupt(
                Tag::GLYF,
                "flag repeat count overruns the point count",
            ));
        }

        // coordinates are deltas from the previous point, the first point
        // from the origin
        let mut points = vec![
            Point {
                x: 0,
                y: 0,
                on_curve: false
            };
            num_points
        ];
        let mut x = 0i16;
        for (point, flag) in points.iter_mut().zip(&flags) {
            let dx = if flag & X_SHORT_VECTOR != 0 {
                let byte = rd.read_u8()? as i16;
                if flag & X_IS_SAME_OR_POSITIVE != 0 {
                    byte
                } else {
                    -byte
                }
            } else if flag & X_IS_SAME_OR_POSITIVE != 0 {
                0
            } else {
                rd.read_i16::<BigEndian>()?
            };
            x = x.wrapping_add(dx);
            point.x = x;
            point.on_curve = flag & ON_CURVE_POINT != 0;
        }
        let mut y = 0i16;
        for (point, flag) in points.iter_mut().zip(&flags) {
            let dy = if flag & Y_SHORT_VECTOR != 0 {
                let byte = rd.read_u8()? as i16;
                if flag & Y_IS_SAME_OR_POSITIVE != 0 {
                    byte
                } else {
                    -byte
                }
            } else if flag & Y_IS_SAME_OR_POSITIVE != 0 {
                0
            } else {
                rd.read_i16::<BigEndian>()?
            };
            y = y.wrapping_add(dy);
            point.y = y;
        }

        Ok(SimpleGlyph {
            end_pts_of_contours,
            instructions,
            points,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<(), Error> {
        for end_pt in &self.end_pts_of_contours {
            wr.write_u16::<BigEndian>(*end_pt)?;
        }
        wr.write_u16::<BigEndian>(self.instructions.len() as u16)?;
        wr.write_all(&self.instructions)?;

        // re-derive per-point flags and coordinate bytes from the deltas
        let mut flags = Vec::with_capacity(self.points.len());
        let mut x_bytes = Vec::new();
        let mut y_bytes = Vec::new();
        let mut previous = Point {
            x: 0,
            y: 0,
            on_curve: false,
        };
        for point in &self.points {
            let mut flag = 0u8;
            if point.on_curve {
                flag |= ON_CURVE_POINT;
            }
            let dx = point.x.wrapping_sub(previous.x);
            if dx == 0 {
                flag |= X_IS_SAME_OR_POSITIVE;
            } else if dx.unsigned_abs() <= 0xFF {
                flag |= X_SHORT_VECTOR;
                if dx > 0 {
                    flag |= X_IS_SAME_OR_POSITIVE;
                }
                x_bytes.push(dx.unsigned_abs() as u8);
            } else {
                x_bytes.extend_from_slice(&dx.to_be_bytes());
            }
            let dy = point.y.wrapping_sub(previous.y);
            if dy == 0 {
                flag |= Y_IS_SAME_OR_POSITIVE;
            } else if dy.unsigned_abs() <= 0xFF {
                flag |= Y_SHORT_VECTOR;
                if dy > 0 {
                    flag |= Y_IS_SAME_OR_POSITIVE;
                }
                y_bytes.push(dy.unsigned_abs() as u8);
            } else {
                y_bytes.extend_from_slice(&dy.to_be_bytes());
            }
            flags.push(flag);
            previous = *point;
        }

        // run-length compress equal flags
        let mut i = 0;
        while i < flags.len() {
            let flag = flags[i];
            let mut run = 1;
            while i + run < flags.len() && flags[i + run] == flag && run <= 0xFF {
                run += 1;
            }
            if run > 1 {
                wr.write_u8(flag | REPEAT_FLAG)?;
                wr.write_u8((run - 1) as u8)?;
            } else {
                wr.write_u8(flag)?;
            }
            i += run;
        }

        wr.write_all(&x_bytes)?;
        wr.write_all(&y_bytes)?;
        Ok(())
    }
}

impl CompositeGlyph {
    fn read(rd: &mut Cursor<&[u8]>) -> Result<Self, Error> {
        let mut components = Vec::with_capacity(1);
        let mut flags;
        loop {
            flags = rd.read_u16::<BigEndian>()?;
            let glyph_index = rd.read_u16::<BigEndian>()?;

            let args = if flags & ARG_1_AND_2_ARE_WORDS != 0 {
                if flags & ARGS_ARE_XY_VALUES != 0 {
                    Args::I16(rd.read_i16::<BigEndian>()?, rd.read_i16::<BigEndian>()?)
                } else {
                    Args::U16(rd.read_u16::<BigEndian>()?, rd.read_u16::<BigEndian>()?)
                }
            } else if flags & ARGS_ARE_XY_VALUES != 0 {
                Args::I8(rd.read_i8()?, rd.read_i8()?)
            } else {
                Args::U8(rd.read_u8()?, rd.read_u8()?)
            };

            let scale = if flags & WE_HAVE_A_SCALE != 0 {
                Some(Scale::Simple(rd.read_i16::<BigEndian>()?))
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                Some(Scale::XY {
                    x: rd.read_i16::<BigEndian>()?,
                    y: rd.read_i16::<BigEndian>()?,
                })
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                Some(Scale::TwoByTwo {
                    x: rd.read_i16::<BigEndian>()?,
                    scale01: rd.read_i16::<BigEndian>()?,
                    scale10: rd.read_i16::<BigEndian>()?,
                    y: rd.read_i16::<BigEndian>()?,
                })
            } else {
                None
            };

            components.push(Component {
                flags,
                glyph_index,
                args,
                scale,
            });
            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }

        let instructions = if flags & WE_HAVE_INSTRUCTIONS != 0 {
            let length = rd.read_u16::<BigEndian>()? as usize;
            let mut instructions = vec![0; length];
            rd.read_exact(&mut instructions)?;
            Some(instructions)
        } else {
            None
        };

        Ok(CompositeGlyph {
            components,
            instructions,
        })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<(), Error> {
        for (i, component) in self.components.iter().enumerate() {
            let mut flags = component.flags;
            match component.args {
                Args::I16(_, _) | Args::U16(_, _) => flags |= ARG_1_AND_2_ARE_WORDS,
                Args::I8(_, _) | Args::U8(_, _) => flags &= !ARG_1_AND_2_ARE_WORDS,
            }
            match component.args {
                Args::I16(_, _) | Args::I8(_, _) => flags |= ARGS_ARE_XY_VALUES,
                Args::U16(_, _) | Args::U8(_, _) => flags &= !ARGS_ARE_XY_VALUES,
            }
            flags &= !(WE_HAVE_A_SCALE | WE_HAVE_AN_X_AND_Y_SCALE | WE_HAVE_A_TWO_BY_TWO);
            match component.scale {
                Some(Scale::Simple(_)) => flags |= WE_HAVE_A_SCALE,
                Some(Scale::XY { .. }) => flags |= WE_HAVE_AN_X_AND_Y_SCALE,
                Some(Scale::TwoByTwo { .. }) => flags |= WE_HAVE_A_TWO_BY_TWO,
                None => {}
            }

            let is_last = self.components.len() == i + 1;
            if is_last {
                flags &= !MORE_COMPONENTS;
            } else {
                flags |= MORE_COMPONENTS;
            }
            if is_last && self.instructions.is_some() {
                flags |= WE_HAVE_INSTRUCTIONS;
            } else {
                flags &= !WE_HAVE_INSTRUCTIONS;
            }

            wr.write_u16::<BigEndian>(flags)?;
            wr.write_u16::<BigEndian>(component.glyph_index)?;
            match component.args {
                Args::I16(a, b) => {
                    wr.write_i16::<BigEndian>(a)?;
                    wr.write_i16::<BigEndian>(b)?;
                }
                Args::U16(a, b) => {
                    wr.write_u16::<BigEndian>(a)?;
                    wr.write_u16::<BigEndian>(b)?;
                }
                Args::I8(a, b) => {
                    wr.write_i8(a)?;
                    wr.write_i8(b)?;
                }
                Args::U8(a, b) => {
                    wr.write_u8(a)?;
                    wr.write_u8(b)?;
                }
            }
            match component.scale {
                Some(Scale::Simple(s)) => wr.write_i16::<BigEndian>(s)?,
                Some(Scale::XY { x, y }) => {
                    wr.write_i16::<BigEndian>(x)?;
                    wr.write_i16::<BigEndian>(y)?;
                }
                Some(Scale::TwoByTwo {
                    x,
                    scale01,
                    scale10,
                    y,
                }) => {
                    wr.write_i16::<BigEndian>(x)?;
                    wr.write_i16::<BigEndian>(scale01)?;
                    wr.write_i16::<BigEndian>(scale10)?;
                    wr.write_i16::<BigEndian>(y)?;
                }
                None => {}
            }
        }

        if let Some(instructions) = &self.instructions {
            wr.write_u16::<BigEndian>(instructions.len() as u16)?;
            wr.write_all(instructions)?;
        }
        Ok(())
    }
}

/// The editable model behind the glyf builder: one decoded glyph per id.
/// Serialization lays the glyphs out sequentially, each padded to two bytes
/// so the resulting offsets stay representable in a short 'loca' table; the
/// matching offsets are exposed through [`GlyfModel::loca_offsets`].
#[derive(Debug, PartialEq, Clone)]
pub struct GlyfModel {
    pub glyphs: Vec<Option<Glyph>>,
}

impl GlyfModel {
    /// The 'loca' offsets matching this model's serialization.
    pub fn loca_offsets(&self) -> Result<Vec<u32>, Error> {
        let mut scratch = WritableFontData::new();
        let mut offsets = Vec::with_capacity(self.glyphs.len() + 1);
        offsets.push(0);
        for glyph in &self.glyphs {
            if let Some(glyph) = glyph {
                glyph.write(&mut scratch)?;
                scratch.pad_to(2);
            }
            offsets.push(scratch.len() as u32);
        }
        Ok(offsets)
    }
}

impl TableModel for GlyfModel {
    /// The glyph ranges resolved from the sibling 'loca' table.
    type ReadDep = Vec<u32>;

    fn read(data: &FontData, loca_offsets: &Self::ReadDep) -> Result<Self, Error> {
        let glyf = Glyf::new(data.clone());
        let mut glyphs = Vec::with_capacity(loca_offsets.len().saturating_sub(1));
        for pair in loca_offsets.windows(2) {
            let length = pair[1].checked_sub(pair[0]).ok_or_else(|| {
                Error::corrupt(Tag::GLYF, "loca offsets are not monotonic")
            })?;
            glyphs.push(glyf.glyph(pair[0], length)?);
        }
        Ok(GlyfModel { glyphs })
    }

    fn write(&self, wr: &mut WritableFontData) -> Result<usize, Error> {
        let start = wr.len();
        for glyph in self.glyphs.iter().flatten() {
            glyph.write(wr)?;
            if (wr.len() - start) % 2 != 0 {
                wr.write_u8(0)?;
            }
        }
        Ok(wr.len() - start)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn sample_simple_glyph() -> Glyph {
        Glyph {
            x_min: 0,
            y_min: 0,
            x_max: 500,
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
                        x: 500,
                        y: 0,
                        on_curve: true,
                    },
                    Point {
                        x: 500,
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

    fn serialized(glyph: &Glyph) -> FontData {
        let mut buffer = WritableFontData::new();
        glyph.write(&mut buffer).unwrap();
        buffer.data()
    }

    #[test]
    fn test_simple_glyph_round_trip() {
        let glyph = sample_simple_glyph();
        assert_eq!(Glyph::read(&serialized(&glyph)).unwrap(), glyph);
    }

    #[test]
    fn test_simple_glyph_repeat_flags_round_trip() {
        // a run of identical deltas compresses into a REPEAT flag
        let glyph = Glyph {
            x_min: 0,
            y_min: 0,
            x_max: 50,
            y_max: 0,
            description: GlyphDescription::Simple(SimpleGlyph {
                end_pts_of_contours: vec![4],
                instructions: vec![0xB0, 0x01],
                points: (0..5)
                    .map(|i| Point {
                        x: 10 * i,
                        y: 0,
                        on_curve: true,
                    })
                    .collect(),
            }),
        };
        assert_eq!(Glyph::read(&serialized(&glyph)).unwrap(), glyph);
    }

    #[test]
    fn test_simple_glyph_mixed_delta_widths() {
        // deltas of 0, byte and word size in both axes
        let glyph = Glyph {
            x_min: -300,
            y_min: -1,
            x_max: 300,
            y_max: 1000,
            description: GlyphDescription::Simple(SimpleGlyph {
                end_pts_of_contours: vec![3],
                instructions: Vec::new(),
                points: vec![
                    Point {
                        x: -300,
                        y: 1000,
                        on_curve: true,
                    },
                    Point {
                        x: -300,
                        y: -1,
                        on_curve: false,
                    },
                    Point {
                        x: 300,
                        y: -1,
                        on_curve: true,
                    },
                    Point {
                        x: 45,
                        y: 255,
                        on_curve: true,
                    },
                ],
            }),
        };
        assert_eq!(Glyph::read(&serialized(&glyph)).unwrap(), glyph);
    }

    #[test]
    fn test_composite_glyph_two_components() {
        let glyph = Glyph {
            x_min: 0,
            y_min: 0,
            x_max: 100,
            y_max: 100,
            description: GlyphDescription::Composite(CompositeGlyph {
                components: vec![
                    Component {
                        flags: 0,
                        glyph_index: 1,
                        args: Args::I16(10, 20),
                        scale: None,
                    },
                    Component {
                        flags: 0,
                        glyph_index: 2,
                        args: Args::I8(-5, 5),
                        scale: Some(Scale::XY { x: 0x4000, y: 0x2000 }),
                    },
                ],
                instructions: None,
            }),
        };

        let reread = Glyph::read(&serialized(&glyph)).unwrap();
        match &reread.description {
            GlyphDescription::Composite(composite) => {
                // exactly two components: MORE_COMPONENTS drives the
                // terminator
                assert_eq!(composite.components.len(), 2);
                assert!(composite.components[0].flags & MORE_COMPONENTS != 0);
                assert!(composite.components[1].flags & MORE_COMPONENTS == 0);
                assert!(composite.instructions.is_none());
            }
            GlyphDescription::Simple(_) => panic!("expected a composite glyph"),
        }
    }

    #[test]
    fn test_composite_glyph_instructions_trail_the_record() {
        let glyph = Glyph {
            x_min: 0,
            y_min: 0,
            x_max: 100,
            y_max: 100,
            description: GlyphDescription::Composite(CompositeGlyph {
                components: vec![
                    Component {
                        flags: 0,
                        glyph_index: 1,
                        args: Args::I16(0, 0),
                        scale: None,
                    },
                    Component {
                        flags: 0,
                        glyph_index: 2,
                        args: Args::I16(50, 0),
                        scale: None,
                    },
                ],
                instructions: Some(vec![0xB0, 0x00]),
            }),
        };

        let data = serialized(&glyph);
        // the instruction block sits at the very end of the record
        assert_eq!(&data.bytes()[data.len() - 2..], &[0xB0, 0x00][..]);

        let reread = Glyph::read(&data).unwrap();
        match &reread.description {
            GlyphDescription::Composite(composite) => {
                assert_eq!(composite.components.len(), 2);
                // WE_HAVE_INSTRUCTIONS is carried by the last component only
                assert!(composite.components[0].flags & WE_HAVE_INSTRUCTIONS == 0);
                assert!(composite.components[1].flags & WE_HAVE_INSTRUCTIONS != 0);
                assert_eq!(composite.instructions.as_deref(), Some(&[0xB0, 0x00][..]));
            }
            GlyphDescription::Simple(_) => panic!("expected a composite glyph"),
        }
    }

    #[test]
    fn test_glyf_model_loca_offsets_match_serialization() {
        let model = GlyfModel {
            glyphs: vec![
                Some(sample_simple_glyph()),
                None,
                Some(sample_simple_glyph()),
            ],
        };
        let offsets = model.loca_offsets().unwrap();

        let mut buffer = WritableFontData::new();
        let written = model.write(&mut buffer).unwrap();
        assert_eq!(offsets.len(), 4);
        assert_eq!(offsets[0], 0);
        assert_eq!(offsets[1], offsets[2]); // empty glyph
        assert_eq!(offsets[3] as usize, written);

        // the model round-trips through its own loca offsets
        assert_eq!(GlyfModel::read(&buffer.data(), &offsets).unwrap(), model);
    }
}
