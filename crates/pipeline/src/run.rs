use crate::convert::Converter;
use crate::error::{ErrorKind, Result};
use crate::extract::{Summary, extract};
use exn::ResultExt;
use modeldump_config::Config;
use modeldump_model::TextureManager;
use modeldump_store::Store;
use tracing::instrument;

/// Locate and validate the cache, load it, then dump (and convert) every
/// model.
///
/// Textures are loaded once, up front, and only when converting.
#[instrument(level = "debug", skip_all)]
pub fn run(config: &Config) -> Result<Summary> {
    let path = modeldump_config::locate(config.cache.as_deref()).or_raise(|| ErrorKind::InvalidCache)?;
    tracing::info!(cache = %path.display(), "Validating cache");
    let root = modeldump_config::validate(&path).or_raise(|| ErrorKind::InvalidCache)?;

    tracing::info!(cache = %root, "Loading cache");
    let store = Store::open(root.path()).or_raise(|| ErrorKind::Store)?;

    let textures = if config.convert {
        let textures = TextureManager::load(&store).or_raise(|| ErrorKind::Textures)?;
        tracing::info!(textures = textures.len(), "Loaded textures");
        Some(textures)
    } else {
        None
    };
    let converter = textures.as_ref().map(|textures| Converter::new(textures, &config.models));

    tracing::info!(output = %config.models.display(), convert = config.convert, "Dumping models");
    extract(&store, &config.models, converter.as_ref(), config.keep_going)
}
