//! Finding and validating the cache directory.

use crate::error::{ErrorKind, Result};
use directories::BaseDirs;
use exn::ResultExt;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Name every cache file shares, whatever its extension.
pub const SENTINEL: &str = "main_file_cache";

/// Cache location relative to the home directory.
const DEFAULT_CACHE: [&str; 3] = ["jagexcache", "oldschool", "LIVE"];

/// A directory that has been checked to look like a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRoot(PathBuf);

impl CacheRoot {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// The explicit path if given, otherwise the default cache location.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_cache(),
    }
}

/// `~/jagexcache/oldschool/LIVE`
pub fn default_cache() -> Result<PathBuf> {
    let Some(dirs) = BaseDirs::new() else {
        exn::bail!(ErrorKind::NoHomeDirectory);
    };
    Ok(DEFAULT_CACHE.iter().fold(dirs.home_dir().to_path_buf(), |path, part| path.join(part)))
}

/// Check that `path` is a directory holding a `main_file_cache.*` file.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn validate(path: &Path) -> Result<CacheRoot> {
    if !path.exists() {
        exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        exn::bail!(ErrorKind::NotADirectory(path.to_path_buf()));
    }

    let entries = path.read_dir().or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
    for entry in entries {
        let entry = entry.or_raise(|| ErrorKind::Io(path.to_path_buf()))?;
        let is_file = entry.file_type().is_ok_and(|kind| kind.is_file());
        if is_file && is_sentinel(Path::new(&entry.file_name())) {
            tracing::debug!(file = %entry.path().display(), "Found cache file");
            return Ok(CacheRoot(path.to_path_buf()));
        }
    }
    exn::bail!(ErrorKind::MissingSentinel(path.to_path_buf()))
}

fn is_sentinel(name: &Path) -> bool {
    name.extension().is_some() && name.file_stem() == Some(OsStr::new(SENTINEL))
}
