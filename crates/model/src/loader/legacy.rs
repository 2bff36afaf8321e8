//! Legacy layout: texturing is packed into a per-face flags byte and the
//! face colour doubles as the texture id.

use super::{Layout, Section, check_texture_coordinates, decode_faces, decode_vertices, footer, read_bytes};
use crate::definition::ModelDefinition;
use crate::error::Result;

const FOOTER: usize = 18;
const ANIMATED_FOOTER: usize = 23;
/// Colour given to faces whose colour field holds a texture id.
const TEXTURED_FACE_COLOUR: u16 = 127;

pub(super) fn decode(id: u32, data: &[u8], animated: bool) -> Result<ModelDefinition> {
    let (mut footer, footer_start) = footer(data, if animated { ANIMATED_FOOTER } else { FOOTER })?;
    let vertex_count = footer.len()?;
    let face_count = footer.len()?;
    let texture_count = usize::from(footer.u8()?);
    let textured = footer.flag()?;
    let priority = footer.u8()?;
    let has_transparencies = footer.flag()?;
    let has_face_skins = footer.flag()?;
    let has_vertex_skins = footer.flag()?;
    if animated {
        // Animation groups share the skins section, whose length is given below.
        footer.u8()?;
    }
    let x_len = footer.len()?;
    let y_len = footer.len()?;
    let z_len = footer.len()?;
    let face_index_len = footer.len()?;
    let skins_len = if animated {
        footer.len()?
    } else if has_vertex_skins {
        vertex_count
    } else {
        0
    };

    let mut layout = Layout::new();
    let vertex_flags_at = layout.section(vertex_count);
    let compression_at = layout.section(face_count);
    let priorities_at = layout.optional(priority == 255, face_count);
    let face_skins_at = layout.optional(has_face_skins, face_count);
    let face_flags_at = layout.optional(textured, face_count);
    let vertex_skins_at = layout.section(skins_len);
    let transparencies_at = layout.optional(has_transparencies, face_count);
    let face_indices_at = layout.section(face_index_len);
    let colours_at = layout.section(face_count * 2);
    let texture_triangles_at = layout.section(texture_count * 6);
    let x_at = layout.section(x_len);
    let y_at = layout.section(y_len);
    let z_at = layout.section(z_len);
    layout.check(footer_start)?;

    let vertices = decode_vertices(data, vertex_flags_at, [x_at, y_at, z_at], vertex_count)?;
    let vertex_skins = has_vertex_skins
        .then(|| read_bytes(data, vertex_skins_at, vertex_count))
        .transpose()?;

    let mut colours = Section::at(data, colours_at);
    let mut face_flags = Section::at(data, face_flags_at);
    let mut face_colours = Vec::with_capacity(face_count);
    let mut render_types = Vec::with_capacity(face_count);
    let mut face_textures = Vec::with_capacity(face_count);
    let mut texture_coordinates = Vec::with_capacity(face_count);
    for _ in 0..face_count {
        let mut colour = colours.u16()?;
        if textured {
            let flags = face_flags.u8()?;
            render_types.push(flags & 1);
            if flags & 2 != 0 {
                texture_coordinates.push(Some(flags >> 2));
                face_textures.push((colour != u16::MAX).then_some(colour));
                colour = TEXTURED_FACE_COLOUR;
            } else {
                texture_coordinates.push(None);
                face_textures.push(None);
            }
        }
        face_colours.push(colour);
    }

    let faces = decode_faces(data, face_indices_at, compression_at, face_count, vertex_count)?;

    let mut triangles = Section::at(data, texture_triangles_at);
    let texture_triangles = (0..texture_count)
        .map(|_| triangles.triangle())
        .collect::<Result<Vec<_>>>()?;

    // A texture triangle identical to the face it textures adds nothing.
    check_texture_coordinates(&texture_coordinates, texture_count)?;
    for (coordinate, face) in texture_coordinates.iter_mut().zip(&faces) {
        if let Some(triangle) = coordinate.map(usize::from)
            && texture_triangles[triangle] == *face
        {
            *coordinate = None;
        }
    }

    Ok(ModelDefinition {
        id,
        vertices,
        vertex_skins,
        faces,
        face_colours,
        face_render_types: render_types.contains(&1).then_some(render_types),
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
        face_textures: face_textures.iter().any(Option::is_some).then_some(face_textures),
        texture_coordinates: texture_coordinates
            .iter()
            .any(Option::is_some)
            .then_some(texture_coordinates),
        texture_render_types: vec![0; texture_count],
        texture_triangles,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::loader::fixtures::LEGACY_TRIANGLE;

    /// Legacy triangle with a textured-face flags section and one texture
    /// triangle.
    fn textured(face_flags: u8, texture_id: u16, triangle: [u8; 6]) -> Vec<u8> {
        let mut data = vec![
            0, 1, 3, // vertex flags
            1, // compression
            face_flags,
            64, 65, 65, // face indices
        ];
        data.extend_from_slice(&texture_id.to_be_bytes());
        data.extend_from_slice(&triangle);
        data.extend_from_slice(&[74, 54, 74]);
        data.extend_from_slice(&[
            0x00, 0x03, 0x00, 0x01, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x03,
        ]);
        data
    }

    #[test]
    fn textured_face_takes_colour_as_texture() {
        // Textured (2), flat (1), texture triangle 0.
        let model = decode(0, &textured(0b11, 44, [0, 0, 0, 2, 0, 1]), false).unwrap();
        assert_eq!(model.face_textures, Some(vec![Some(44)]));
        assert_eq!(model.face_colours, vec![TEXTURED_FACE_COLOUR]);
        assert_eq!(model.face_render_types, Some(vec![1]));
        assert_eq!(model.texture_coordinates, Some(vec![Some(0)]));
        assert_eq!(model.texture_triangles, vec![[0, 2, 1]]);
    }

    #[test]
    fn texture_triangle_matching_face_is_dropped() {
        let model = decode(0, &textured(0b10, 44, [0, 0, 0, 1, 0, 2]), false).unwrap();
        assert!(model.texture_coordinates.is_none());
        assert!(model.face_render_types.is_none());
        assert_eq!(model.face_textures, Some(vec![Some(44)]));
    }

    #[test]
    fn untextured_flag_keeps_colour() {
        let model = decode(0, &textured(0, 0x1234, [0, 0, 0, 1, 0, 2]), false).unwrap();
        assert!(model.face_textures.is_none());
        assert_eq!(model.face_colours, vec![0x1234]);
    }

    #[test]
    fn texture_coordinate_beyond_triangles() {
        // Texture triangle 1 of 1.
        let err = decode(0, &textured(0b110, 44, [0, 0, 0, 1, 0, 2]), false).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidFormat(_)));
    }

    #[test]
    fn per_face_priorities_and_alpha() {
        let mut data = LEGACY_TRIANGLE[..12].to_vec();
        // Priority and transparency sections sit after compression types and
        // before the face indices respectively.
        data.insert(4, 9);
        data.insert(5, 200);
        data.extend_from_slice(&[
            0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0xFF, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00,
            0x03,
        ]);
        let model = decode(0, &data, false).unwrap();
        assert_eq!(model.face_priorities, Some(vec![9]));
        assert_eq!(model.face_transparencies, Some(vec![200]));
        assert_eq!(model.faces, vec![[0, 1, 2]]);
        assert_eq!(model.face_colours, vec![0x1234]);
    }

    #[test]
    fn animated_skins_length() {
        let mut data = LEGACY_TRIANGLE[..12].to_vec();
        // Three vertex skins plus two bytes of animation groups, after compression types.
        for (offset, byte) in [5, 6, 7, 0, 0].into_iter().enumerate() {
            data.insert(4 + offset, byte);
        }
        data.extend_from_slice(&[
            0x00, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00,
            0x00, 0x03, 0x00, 0x05, 0xFF, 0xFE,
        ]);
        let model = crate::load(0, &data).unwrap();
        assert_eq!(model.vertex_skins, Some(vec![5, 6, 7]));
        assert_eq!(model.vertices.len(), 3);
        assert_eq!(model.face_colours, vec![0x1234]);
    }
}
