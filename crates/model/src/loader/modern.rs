//! Modern layout: explicit face texture ids and texture coordinates, with
//! texture render types stored ahead of the vertex flags.

use super::{Layout, Section, check_texture_coordinates, decode_faces, decode_vertices, footer, read_bytes};
use crate::definition::ModelDefinition;
use crate::error::Result;

const FOOTER: usize = 23;
const ANIMATED_FOOTER: usize = 26;

pub(super) fn decode(id: u32, data: &[u8], animated: bool) -> Result<ModelDefinition> {
    let (mut footer, footer_start) = footer(data, if animated { ANIMATED_FOOTER } else { FOOTER })?;
    let vertex_count = footer.len()?;
    let face_count = footer.len()?;
    let texture_count = usize::from(footer.u8()?);
    let has_render_types = footer.u8()? & 1 == 1;
    let priority = footer.u8()?;
    let has_transparencies = footer.flag()?;
    let has_face_skins = footer.flag()?;
    let has_textures = footer.flag()?;
    let has_vertex_skins = footer.flag()?;
    if animated {
        footer.u8()?;
    }
    let x_len = footer.len()?;
    let y_len = footer.len()?;
    let z_len = footer.len()?;
    let face_index_len = footer.len()?;
    let texture_coordinates_len = footer.len()?;
    let skins_len = if animated {
        footer.len()?
    } else if has_vertex_skins {
        vertex_count
    } else {
        0
    };

    let texture_render_types = read_bytes(data, 0, texture_count)?;
    let simple_textures = texture_render_types.iter().filter(|kind| **kind == 0).count();

    let mut layout = Layout::new();
    layout.section(texture_count);
    let vertex_flags_at = layout.section(vertex_count);
    let render_types_at = layout.optional(has_render_types, face_count);
    let compression_at = layout.section(face_count);
    let priorities_at = layout.optional(priority == 255, face_count);
    let face_skins_at = layout.optional(has_face_skins, face_count);
    let vertex_skins_at = layout.section(skins_len);
    let transparencies_at = layout.optional(has_transparencies, face_count);
    let face_indices_at = layout.section(face_index_len);
    let face_textures_at = layout.optional(has_textures, face_count * 2);
    let texture_coordinates_at = layout.section(texture_coordinates_len);
    let colours_at = layout.section(face_count * 2);
    let x_at = layout.section(x_len);
    let y_at = layout.section(y_len);
    let z_at = layout.section(z_len);
    let texture_triangles_at = layout.section(simple_textures * 6);
    // Projection parameters of non-planar textures follow; they are not decoded.
    layout.check(footer_start)?;

    let vertices = decode_vertices(data, vertex_flags_at, [x_at, y_at, z_at], vertex_count)?;
    let vertex_skins = has_vertex_skins
        .then(|| read_bytes(data, vertex_skins_at, vertex_count))
        .transpose()?;

    let mut colours = Section::at(data, colours_at);
    let mut textures = Section::at(data, face_textures_at);
    let mut coordinates = Section::at(data, texture_coordinates_at);
    let has_coordinates = has_textures && texture_count > 0;
    let mut face_colours = Vec::with_capacity(face_count);
    let mut face_textures = Vec::with_capacity(face_count);
    let mut texture_coordinates = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        face_colours.push(colours.u16()?);
        if has_textures {
            // Stored as id + 1 so that 0 means untextured.
            let texture = textures.u16()?.checked_sub(1);
            face_textures.push(texture);
            if has_coordinates {
                let coordinate = match texture {
                    Some(_) => coordinates.u8()?.checked_sub(1),
                    None => None,
                };
                texture_coordinates.push(coordinate);
            }
        }
    }
    check_texture_coordinates(&texture_coordinates, texture_count)?;

    let faces = decode_faces(data, face_indices_at, compression_at, face_count, vertex_count)?;

    let mut triangles = Section::at(data, texture_triangles_at);
    let mut texture_triangles = Vec::with_capacity(texture_count);
    for kind in &texture_render_types {
        texture_triangles.push(if *kind == 0 { triangles.triangle()? } else { [0, 0, 0] });
    }

    Ok(ModelDefinition {
        id,
        vertices,
        vertex_skins,
        faces,
        face_colours,
        face_render_types: has_render_types
            .then(|| read_bytes(data, render_types_at, face_count))
            .transpose()?,
        face_priorities: (priority == 255)
            .then(|| read_bytes(data, priorities_at, face_count))
            .transpose()?,
        priority: if priority == 255 { 0 } else { priority },
        face_transparencies: has_transparencies
            .then(|| read_bytes(data, transparencies_at, face_count))
            .transpose()?,
        face_skins: has_face_skins
            .then(|| read_bytes(data, face_skins_at, face_count))
            .transpose()?,
        face_textures: has_textures.then_some(face_textures),
        texture_coordinates: has_coordinates.then_some(texture_coordinates),
        texture_render_types,
        texture_triangles,
        ..Default::default()
    })
}
