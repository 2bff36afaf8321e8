//! In-memory storage for testing.

use crate::backend::Storage;
use crate::error::{ErrorKind, Result};
use crate::index::IndexType;
use std::collections::{BTreeMap, BTreeSet};

/// In-memory storage for testing, holding raw containers keyed by
/// `(index, archive)`.
#[derive(Default)]
pub struct MockStorage {
    archives: BTreeMap<(u8, u32), Vec<u8>>,
}

impl MockStorage {
    /// Create a mock storage pre-populated with raw archives keyed by
    /// `(index, archive)`.
    pub fn with_archives(archives: impl IntoIterator<Item = ((u8, u32), Vec<u8>)>) -> Self {
        Self {
            archives: archives.into_iter().collect(),
        }
    }
}

impl Storage for MockStorage {
    fn name(&self) -> &str {
        "mock"
    }

    fn indexes(&self) -> Result<Vec<u8>> {
        let ids: BTreeSet<u8> = self
            .archives
            .keys()
            .map(|(index, _)| *index)
            .filter(|index| *index != IndexType::Reference.id())
            .collect();
        Ok(ids.into_iter().collect())
    }

    fn load_archive(&self, index: u8, archive: u32) -> Result<Vec<u8>> {
        self.archives
            .get(&(index, archive))
            .cloned()
            .ok_or_else(|| exn::Exn::from(ErrorKind::MissingArchive { index, archive }))
    }
}
