//! Model decoding.
//!
//! A model is a footer describing section sizes, preceded by the sections
//! themselves. The last two bytes select the layout:
//!
//! | Trailer | Layout |
//! |---|---|
//! | `FF FD` | modern, with animation groups |
//! | `FF FE` | legacy, with animation groups |
//! | `FF FF` | modern |
//! | other | legacy |
//!
//! Every section is read through its own cursor, positioned by summing the
//! lengths of the sections before it.

mod legacy;
mod modern;

use crate::definition::{ModelDefinition, Triangle, Vertex};
use crate::error::{ErrorKind, Result};
use modeldump_codec::buffer::Reader;
use tracing::instrument;

/// Decode a model from its decompressed archive bytes.
#[instrument(level = "debug", skip(data), fields(size = data.len(), format))]
pub fn load(id: u32, data: &[u8]) -> Result<ModelDefinition> {
    let format = match data {
        [.., 0xFF, 0xFD] => Format::ModernAnimated,
        [.., 0xFF, 0xFE] => Format::LegacyAnimated,
        [.., 0xFF, 0xFF] => Format::Modern,
        _ => Format::Legacy,
    };
    tracing::Span::current().record("format", format.as_str());
    match format {
        Format::Legacy => legacy::decode(id, data, false),
        Format::LegacyAnimated => legacy::decode(id, data, true),
        Format::Modern => modern::decode(id, data, false),
        Format::ModernAnimated => modern::decode(id, data, true),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Legacy,
    LegacyAnimated,
    Modern,
    ModernAnimated,
}

impl Format {
    fn as_str(self) -> &'static str {
        match self {
            Format::Legacy => "legacy",
            Format::LegacyAnimated => "legacy-animated",
            Format::Modern => "modern",
            Format::ModernAnimated => "modern-animated",
        }
    }
}

/// A cursor over one section, with codec errors mapped to model errors.
struct Section<'a>(Reader<'a>);

impl<'a> Section<'a> {
    fn at(data: &'a [u8], offset: usize) -> Self {
        Self(Reader::at(data, offset))
    }

    fn u8(&mut self) -> Result<u8> {
        self.0.u8().map_err(ErrorKind::codec)
    }

    fn u16(&mut self) -> Result<u16> {
        self.0.u16().map_err(ErrorKind::codec)
    }

    fn short_smart(&mut self) -> Result<i32> {
        self.0.short_smart().map_err(ErrorKind::codec)
    }

    fn flag(&mut self) -> Result<bool> {
        Ok(self.u8()? == 1)
    }

    fn len(&mut self) -> Result<usize> {
        Ok(usize::from(self.u16()?))
    }

    fn triangle(&mut self) -> Result<Triangle> {
        Ok([
            usize::from(self.u16()?),
            usize::from(self.u16()?),
            usize::from(self.u16()?),
        ])
    }
}

/// Hands out consecutive section offsets.
struct Layout {
    position: usize,
}

impl Layout {
    fn new() -> Self {
        Self { position: 0 }
    }

    fn section(&mut self, len: usize) -> usize {
        let start = self.position;
        self.position += len;
        start
    }

    fn optional(&mut self, present: bool, len: usize) -> usize {
        self.section(if present { len } else { 0 })
    }

    /// Sections must end before the footer starts.
    fn check(&self, footer_start: usize) -> Result<()> {
        if self.position > footer_start {
            exn::bail!(ErrorKind::InvalidFormat(format!(
                "sections need {} bytes, only {footer_start} precede the footer",
                self.position
            )));
        }
        Ok(())
    }
}

/// Position a cursor on the footer, which occupies the last `len` bytes.
fn footer(data: &[u8], len: usize) -> Result<(Section<'_>, usize)> {
    let Some(start) = data.len().checked_sub(len) else {
        exn::bail!(ErrorKind::InvalidFormat(format!(
            "{} bytes is shorter than the {len} byte footer",
            data.len()
        )));
    };
    Ok((Section::at(data, start), start))
}

/// Vertex positions are deltas from the previous vertex; each flag bit says
/// whether the x, y or z delta is present.
fn decode_vertices(
    data: &[u8],
    flags_at: usize,
    [x_at, y_at, z_at]: [usize; 3],
    count: usize,
) -> Result<Vec<Vertex>> {
    let mut flags = Section::at(data, flags_at);
    let mut xs = Section::at(data, x_at);
    let mut ys = Section::at(data, y_at);
    let mut zs = Section::at(data, z_at);

    let mut previous = Vertex::default();
    let mut vertices = Vec::with_capacity(count);
    for _ in 0..count {
        let flag = flags.u8()?;
        let dx = if flag & 1 != 0 { xs.short_smart()? } else { 0 };
        let dy = if flag & 2 != 0 { ys.short_smart()? } else { 0 };
        let dz = if flag & 4 != 0 { zs.short_smart()? } else { 0 };
        previous = Vertex {
            x: previous.x + dx,
            y: previous.y + dy,
            z: previous.z + dz,
        };
        vertices.push(previous);
    }
    Ok(vertices)
}

/// Triangles are strip-compressed: each face either spells out three
/// indices or reuses two from the previous face plus one new index.
fn decode_faces(
    data: &[u8],
    indices_at: usize,
    types_at: usize,
    count: usize,
    vertex_count: usize,
) -> Result<Vec<Triangle>> {
    let mut indices = Section::at(data, indices_at);
    let mut types = Section::at(data, types_at);

    let (mut a, mut b, mut c, mut last) = (0i32, 0i32, 0i32, 0i32);
    let mut faces = Vec::with_capacity(count);
    for face in 0..count {
        match types.u8()? {
            1 => {
                a = indices.short_smart()? + last;
                b = indices.short_smart()? + a;
                c = indices.short_smart()? + b;
                last = c;
            },
            2 => {
                b = c;
                c = indices.short_smart()? + last;
                last = c;
            },
            3 => {
                a = c;
                c = indices.short_smart()? + last;
                last = c;
            },
            4 => {
                std::mem::swap(&mut a, &mut b);
                c = indices.short_smart()? + last;
                last = c;
            },
            _ => {},
        }
        faces.push([
            vertex_index(face, a, vertex_count)?,
            vertex_index(face, b, vertex_count)?,
            vertex_index(face, c, vertex_count)?,
        ]);
    }
    Ok(faces)
}

fn vertex_index(face: usize, vertex: i32, vertices: usize) -> Result<usize> {
    match usize::try_from(vertex) {
        Ok(index) if index < vertices => Ok(index),
        _ => exn::bail!(ErrorKind::VertexOutOfRange { face, vertex, vertices }),
    }
}

/// Per-face bytes from an optional section.
fn read_bytes(data: &[u8], at: usize, count: usize) -> Result<Vec<u8>> {
    let mut section = Section::at(data, at);
    (0..count).map(|_| section.u8()).collect()
}

/// Texture coordinates must name an existing texture triangle.
fn check_texture_coordinates(coordinates: &[Option<u8>], triangles: usize) -> Result<()> {
    for (face, coordinate) in coordinates.iter().enumerate() {
        if let Some(coordinate) = coordinate
            && usize::from(*coordinate) >= triangles
        {
            exn::bail!(ErrorKind::InvalidFormat(format!(
                "face {face} uses texture triangle {coordinate}, model has {triangles}"
            )));
        }
    }
    Ok(())
}
