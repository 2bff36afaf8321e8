use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use modeldump_export::ObjExporter;
use modeldump_model::{ModelDefinition, TextureManager};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Converts dumped `<id>.model` files to `<id>.obj` and `<id>.mtl` in the
/// same directory.
pub struct Converter<'a> {
    textures: &'a TextureManager,
    output: PathBuf,
}

impl<'a> Converter<'a> {
    pub fn new(textures: &'a TextureManager, output: impl Into<PathBuf>) -> Self {
        Self {
            textures,
            output: output.into(),
        }
    }

    /// Convert model `id`, which must already have been dumped.
    ///
    /// On failure neither output file is left behind.
    #[instrument(level = "debug", skip(self))]
    pub fn convert(&self, id: u32) -> Result<()> {
        let source = self.output.join(format!("{id}.model"));
        let data = fs::read(&source).or_raise(|| ErrorKind::Read(source.clone()))?;
        let model = modeldump_model::load(id, &data).or_raise(|| ErrorKind::Parse(id))?;

        let obj = self.output.join(format!("{id}.obj"));
        let mtl = self.output.join(format!("{id}.mtl"));
        let result = self.write(&model, &obj, &mtl);
        if result.is_err() {
            // Partial output is worse than none.
            _ = fs::remove_file(&obj);
            _ = fs::remove_file(&mtl);
        }
        result
    }

    fn write(&self, model: &ModelDefinition, obj_path: &Path, mtl_path: &Path) -> Result<()> {
        let mut obj = BufWriter::new(File::create(obj_path).or_raise(|| ErrorKind::Write(obj_path.to_path_buf()))?);
        let mut mtl = BufWriter::new(File::create(mtl_path).or_raise(|| ErrorKind::Write(mtl_path.to_path_buf()))?);
        ObjExporter::new(self.textures, model)
            .export(&mut obj, &mut mtl)
            .or_raise(|| ErrorKind::Export(model.id))?;
        obj.flush().or_raise(|| ErrorKind::Write(obj_path.to_path_buf()))?;
        mtl.flush().or_raise(|| ErrorKind::Write(mtl_path.to_path_buf()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{TRIANGLE, textured_triangle};
    use modeldump_model::TextureDefinition;

    #[test]
    fn writes_geometry_and_materials() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("5.model"), TRIANGLE).unwrap();
        let textures = TextureManager::default();

        Converter::new(&textures, dir.path()).convert(5).unwrap();

        let obj = fs::read_to_string(dir.path().join("5.obj")).unwrap();
        let mtl = fs::read_to_string(dir.path().join("5.mtl")).unwrap();
        assert!(obj.starts_with("mtllib 5.mtl\n"));
        assert!(obj.contains("f 1 2 3\n"));
        assert!(mtl.starts_with("newmtl m0\nKd "));
    }

    #[test]
    fn resolves_textures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("8.model"), textured_triangle()).unwrap();
        let textures = TextureManager::from_definitions([TextureDefinition {
            id: 5,
            file_ids: vec![90],
            ..Default::default()
        }]);

        Converter::new(&textures, dir.path()).convert(8).unwrap();

        let mtl = fs::read_to_string(dir.path().join("8.mtl")).unwrap();
        assert_eq!(mtl, "newmtl m0\nmap_Kd sprite/90-0.png\n");
    }

    #[test]
    fn missing_dump() {
        let dir = tempfile::tempdir().unwrap();
        let textures = TextureManager::default();
        let err = Converter::new(&textures, dir.path()).convert(3).unwrap_err();
        assert_eq!(*err, ErrorKind::Read(dir.path().join("3.model")));
    }

    #[test]
    fn unparseable_model_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("4.model"), [0xFF, 0xFF]).unwrap();
        let textures = TextureManager::default();

        let err = Converter::new(&textures, dir.path()).convert(4).unwrap_err();
        assert_eq!(*err, ErrorKind::Parse(4));
        assert!(!dir.path().join("4.obj").exists());
        assert!(!dir.path().join("4.mtl").exists());
    }

    #[test]
    fn unwritable_output_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("6.model"), TRIANGLE).unwrap();
        // A directory where the material file should go.
        fs::create_dir(dir.path().join("6.mtl")).unwrap();
        let textures = TextureManager::default();

        let err = Converter::new(&textures, dir.path()).convert(6).unwrap_err();
        assert_eq!(*err, ErrorKind::Write(dir.path().join("6.mtl")));
        assert!(!dir.path().join("6.obj").exists());
    }
}
