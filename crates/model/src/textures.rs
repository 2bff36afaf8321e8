use crate::error::{ErrorKind, Result};
use crate::texture::TextureDefinition;
use modeldump_store::{IndexType, Store};
use std::collections::BTreeMap;
use tracing::instrument;

/// Every texture definition of a cache, keyed by id.
///
/// Loaded once and shared by reference between conversions.
#[derive(Debug, Default, Clone)]
pub struct TextureManager {
    textures: BTreeMap<u32, TextureDefinition>,
}

impl TextureManager {
    /// Definitions live as files of archive 0 in the textures index.
    const ARCHIVE: u32 = 0;

    #[instrument(level = "debug", skip(store), fields(textures))]
    pub fn load(store: &Store) -> Result<Self> {
        let index = store
            .index(IndexType::Textures)
            .map_err(|err| err.raise(ErrorKind::Textures))?;
        let Some(archive) = index.archive(Self::ARCHIVE) else {
            exn::bail!(ErrorKind::Textures);
        };
        let files = store.files(archive).map_err(|err| err.raise(ErrorKind::Textures))?;

        let textures = files
            .iter()
            .map(|file| TextureDefinition::decode(file.id, &file.contents))
            .collect::<Result<Vec<_>>>()?;
        tracing::Span::current().record("textures", textures.len());
        Ok(Self::from_definitions(textures))
    }

    pub fn from_definitions(definitions: impl IntoIterator<Item = TextureDefinition>) -> Self {
        Self {
            textures: definitions.into_iter().map(|texture| (texture.id, texture)).collect(),
        }
    }

    pub fn find(&self, id: u32) -> Option<&TextureDefinition> {
        self.textures.get(&id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}
