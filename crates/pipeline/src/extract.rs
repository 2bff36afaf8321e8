use crate::convert::Converter;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use modeldump_store::{Archive, IndexType, Store};
use std::fs;
use std::path::Path;
use tracing::instrument;

/// Outcome of an extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    /// Models written as `<id>.model`.
    pub extracted: usize,
    /// Models also written as `<id>.obj` + `<id>.mtl`.
    pub converted: usize,
    /// Archives that failed. Only ever filled when continuing past errors.
    pub failures: Vec<u32>,
}

impl Summary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Dump every archive of the models index into `output` as `<id>.model`,
/// converting each one straight after when a converter is given.
///
/// Stops at the first failure unless `keep_going` is set, in which case
/// failing archives are logged and listed in [`Summary::failures`].
#[instrument(level = "info", skip(store, converter), fields(output = %output.display(), models))]
pub fn extract(store: &Store, output: &Path, converter: Option<&Converter<'_>>, keep_going: bool) -> Result<Summary> {
    fs::create_dir_all(output).or_raise(|| ErrorKind::Write(output.to_path_buf()))?;
    let index = store.index(IndexType::Models).or_raise(|| ErrorKind::Store)?;
    tracing::Span::current().record("models", index.archives.len());

    let mut summary = Summary::default();
    for archive in &index.archives {
        match dump(store, archive, output, converter, &mut summary) {
            Ok(()) => {},
            Err(err) if keep_going => {
                tracing::error!(archive = archive.id, error = ?err, "Skipping model");
                summary.failures.push(archive.id);
            },
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        extracted = summary.extracted,
        converted = summary.converted,
        failed = summary.failures.len(),
        "Dumped models"
    );
    Ok(summary)
}

fn dump(
    store: &Store,
    archive: &Archive,
    output: &Path,
    converter: Option<&Converter<'_>>,
    summary: &mut Summary,
) -> Result<()> {
    let data = store.load_archive(archive).or_raise(|| ErrorKind::Archive(archive.id))?;
    let path = output.join(format!("{}.model", archive.id));
    fs::write(&path, &data).or_raise(|| ErrorKind::Write(path.clone()))?;
    tracing::debug!(archive = archive.id, size = data.len(), "Dumped model");
    summary.extracted += 1;

    if let Some(converter) = converter {
        converter.convert(archive.id)?;
        summary.converted += 1;
    }
    Ok(())
}
