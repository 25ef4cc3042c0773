use std::fs;
use std::path::PathBuf;

use crate::detection::domain::model_loader::{AssetSource, ModelAsset};
use crate::shared::model_resolver;

/// Reads model blobs from the user cache or a bundled directory,
/// downloading into the cache when the asset has a known URL.
pub struct CachedModelAssets {
    bundled_dir: Option<PathBuf>,
}

impl CachedModelAssets {
    pub fn new(bundled_dir: Option<PathBuf>) -> Self {
        Self { bundled_dir }
    }

    /// Resolves an asset to a local path without reading it.
    pub fn resolve(&self, asset: ModelAsset) -> Result<PathBuf, model_resolver::ModelResolveError> {
        model_resolver::resolve(asset.file_name(), asset.url(), self.bundled_dir.as_deref())
    }
}

impl AssetSource for CachedModelAssets {
    fn fetch(&self, asset: ModelAsset) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        let path = self.resolve(asset)?;
        log::debug!("Reading {asset} from {}", path.display());
        Ok(fs::read(path)?)
    }
}
