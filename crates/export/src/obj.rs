use crate::colour::{BRIGHTNESS_MIN, channels, hsl_to_rgb};
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use modeldump_model::{ModelDefinition, TextureManager};
use std::borrow::Cow;
use std::io::{self, Write};
use tracing::instrument;

/// Brightness applied to face colours in materials.
const BRIGHTNESS: f64 = BRIGHTNESS_MIN;

/// Writes a model as a Wavefront OBJ file plus its MTL material library.
///
/// Every face gets its own material `m<face>`: a diffuse colour for plain
/// faces, or a sprite path for textured ones. Y and Z are negated so the
/// model is upright in common viewers.
pub struct ObjExporter<'a> {
    textures: &'a TextureManager,
    model: &'a ModelDefinition,
}

impl<'a> ObjExporter<'a> {
    pub fn new(textures: &'a TextureManager, model: &'a ModelDefinition) -> Self {
        Self { textures, model }
    }

    /// Write the geometry to `obj` and the materials to `mtl`.
    ///
    /// Normals and texture coordinates are computed first if the model does
    /// not carry them yet. Writers are not flushed.
    #[instrument(level = "debug", skip_all, fields(model = self.model.id))]
    pub fn export(&self, mut obj: impl Write, mut mtl: impl Write) -> Result<()> {
        let model = self.prepared();
        write_geometry(&model, &mut obj).or_raise(|| ErrorKind::Geometry)?;
        self.write_materials(&model, &mut mtl).or_raise(|| ErrorKind::Materials)?;
        Ok(())
    }

    fn prepared(&self) -> Cow<'a, ModelDefinition> {
        let model = self.model;
        let lit = model.vertex_normals.len() == model.vertex_count() && model.face_normals.len() == model.face_count();
        let mapped = model.face_textures.is_none() || model.face_uvs.is_some();
        if lit && mapped {
            return Cow::Borrowed(model);
        }
        let mut model = model.clone();
        model.compute_normals();
        model.compute_texture_uv_coordinates();
        Cow::Owned(model)
    }

    fn write_materials(&self, model: &ModelDefinition, mtl: &mut impl Write) -> io::Result<()> {
        for (face, colour) in model.face_colours.iter().enumerate() {
            writeln!(mtl, "newmtl m{face}")?;
            match model.face_texture(face).map(|texture| self.sprite(model.id, face, texture)) {
                Some(Some(sprite)) => writeln!(mtl, "map_Kd sprite/{sprite}-0.png")?,
                _ => {
                    let [r, g, b] = channels(hsl_to_rgb(*colour, BRIGHTNESS)).map(|channel| f64::from(channel) / 255.0);
                    writeln!(mtl, "Kd {r:?} {g:?} {b:?}")?;
                },
            }
            let alpha = model.face_transparency(face);
            if alpha != 0 {
                writeln!(mtl, "d {:?}", f64::from(alpha) / 255.0)?;
            }
        }
        Ok(())
    }

    /// Base sprite of a face's texture, if the texture is known.
    fn sprite(&self, model: u32, face: usize, texture: u16) -> Option<u16> {
        let sprite = self.textures.find(u32::from(texture)).and_then(|texture| texture.sprite());
        if sprite.is_none() {
            tracing::warn!(model, face, texture, "Unknown texture, using face colour");
        }
        sprite
    }
}

fn write_geometry(model: &ModelDefinition, obj: &mut impl Write) -> io::Result<()> {
    writeln!(obj, "mtllib {}.mtl", model.id)?;
    writeln!(obj, "o runescapemodel")?;
    for vertex in &model.vertices {
        writeln!(obj, "v {} {} {}", vertex.x, -vertex.y, -vertex.z)?;
    }

    let textured = model.face_textures.is_some();
    if textured {
        for face in 0..model.face_count() {
            let uv = model
                .face_uvs
                .as_ref()
                .and_then(|uvs| uvs.get(face).copied())
                .unwrap_or_default();
            for corner in 0..3 {
                writeln!(obj, "vt {:?} {:?}", uv.u[corner], uv.v[corner])?;
            }
        }
    }

    for normal in &model.vertex_normals {
        let [x, y, z] = normal.normalize();
        writeln!(obj, "vn {x:?} {y:?} {z:?}")?;
    }

    for (face, [a, b, c]) in model.faces.iter().enumerate() {
        let (a, b, c) = (a + 1, b + 1, c + 1);
        writeln!(obj, "usemtl m{face}")?;
        if textured {
            let t = face * 3;
            writeln!(obj, "f {a}/{} {b}/{} {c}/{}", t + 1, t + 2, t + 3)?;
        } else {
            writeln!(obj, "f {a} {b} {c}")?;
        }
        writeln!(obj)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modeldump_model::{TextureDefinition, Vertex};

    fn triangle() -> ModelDefinition {
        ModelDefinition {
            id: 12,
            vertices: vec![
                Vertex { x: 0, y: 0, z: 0 },
                Vertex { x: 10, y: 0, z: 0 },
                Vertex { x: 0, y: 10, z: 0 },
            ],
            faces: vec![[0, 1, 2]],
            face_colours: vec![127],
            ..Default::default()
        }
    }

    fn export(textures: &TextureManager, model: &ModelDefinition) -> (String, String) {
        let (mut obj, mut mtl) = (Vec::new(), Vec::new());
        ObjExporter::new(textures, model).export(&mut obj, &mut mtl).unwrap();
        (String::from_utf8(obj).unwrap(), String::from_utf8(mtl).unwrap())
    }

    #[test]
    fn plain_triangle() {
        let (obj, mtl) = export(&TextureManager::default(), &triangle());
        let normal = "vn 0.0 0.0 1.0\n";
        assert!(obj.starts_with("mtllib 12.mtl\no runescapemodel\nv 0 0 0\nv 10 0 0\nv 0 -10 0\n"));
        assert!(!obj.contains("vt "));
        assert_eq!(obj.matches(normal).count(), 3);
        assert!(obj.ends_with("usemtl m0\nf 1 2 3\n\n"));
        assert_eq!(mtl, "newmtl m0\nKd 0.996078431372549 0.9921568627450981 0.9921568627450981\n");
    }

    #[test]
    fn textured_face_uses_sprite() {
        let mut model = triangle();
        model.face_textures = Some(vec![Some(3)]);
        model.face_transparencies = Some(vec![51]);
        let textures = TextureManager::from_definitions([TextureDefinition {
            id: 3,
            file_ids: vec![77],
            ..Default::default()
        }]);

        let (obj, mtl) = export(&textures, &model);
        assert!(obj.contains("vt 0.0 1.0\nvt 1.0 1.0\nvt 0.0 0.0\n"));
        assert!(obj.contains("usemtl m0\nf 1/1 2/2 3/3\n"));
        assert_eq!(mtl, "newmtl m0\nmap_Kd sprite/77-0.png\nd 0.2\n");
    }

    #[test]
    fn unknown_texture_falls_back_to_colour() {
        let mut model = triangle();
        model.face_textures = Some(vec![Some(3)]);
        let (obj, mtl) = export(&TextureManager::default(), &model);
        assert!(obj.contains("f 1/1 2/2 3/3"));
        assert!(mtl.starts_with("newmtl m0\nKd "));
    }

    #[test]
    fn precomputed_normals_are_kept() {
        let mut model = triangle();
        model.compute_normals();
        model.vertex_normals[0].x = 256;
        model.vertex_normals[0].y = 0;
        model.vertex_normals[0].z = 0;
        let (obj, _) = export(&TextureManager::default(), &model);
        assert!(obj.contains("vn 1.0 0.0 0.0\n"));
    }

    #[test]
    fn writer_failure() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::other("disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let model = triangle();
        let textures = TextureManager::default();
        let err = ObjExporter::new(&textures, &model).export(Broken, Vec::new()).unwrap_err();
        assert_eq!(*err, ErrorKind::Geometry);
        let err = ObjExporter::new(&textures, &model).export(Vec::new(), Broken).unwrap_err();
        assert_eq!(*err, ErrorKind::Materials);
    }
}
