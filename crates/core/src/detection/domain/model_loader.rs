use std::fmt;

use thiserror::Error;

use crate::shared::constants::{CASCADE_MODEL_NAME, CASCADE_MODEL_URL, PUPLOC_MODEL_NAME};

use super::classifier::{PupilLocalizer, RegionClassifier};

/// Byte-packed model blobs fetched at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelAsset {
    Cascade,
    PupilLocalizer,
}

impl ModelAsset {
    pub fn file_name(&self) -> &'static str {
        match self {
            ModelAsset::Cascade => CASCADE_MODEL_NAME,
            ModelAsset::PupilLocalizer => PUPLOC_MODEL_NAME,
        }
    }

    pub fn url(&self) -> Option<&'static str> {
        match self {
            ModelAsset::Cascade => Some(CASCADE_MODEL_URL),
            ModelAsset::PupilLocalizer => None,
        }
    }
}

impl fmt::Display for ModelAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelAsset::Cascade => write!(f, "face cascade"),
            ModelAsset::PupilLocalizer => write!(f, "pupil localizer"),
        }
    }
}

/// Fetches raw model bytes.
pub trait AssetSource: Send {
    fn fetch(&self, asset: ModelAsset) -> Result<Vec<u8>, Box<dyn std::error::Error>>;
}

/// Turns packed model bytes into callable scorers.
pub trait ModelUnpacker: Send {
    fn unpack_cascade(
        &self,
        bytes: &[u8],
    ) -> Result<Box<dyn RegionClassifier>, Box<dyn std::error::Error>>;

    fn unpack_localizer(
        &self,
        bytes: &[u8],
    ) -> Result<Box<dyn PupilLocalizer>, Box<dyn std::error::Error>>;
}

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("failed to fetch {asset}: {reason}")]
    Fetch { asset: ModelAsset, reason: String },
    #[error("failed to unpack {asset}: {reason}")]
    Unpack { asset: ModelAsset, reason: String },
}

/// Fetches and unpacks the face cascade.
pub fn load_cascade(
    assets: &dyn AssetSource,
    unpacker: &dyn ModelUnpacker,
) -> Result<Box<dyn RegionClassifier>, ModelLoadError> {
    let bytes = fetch(assets, ModelAsset::Cascade)?;
    log::info!("Cascade loaded, {} bytes", bytes.len());
    unpacker
        .unpack_cascade(&bytes)
        .map_err(|e| ModelLoadError::Unpack {
            asset: ModelAsset::Cascade,
            reason: e.to_string(),
        })
}

/// Fetches and unpacks the pupil localizer.
pub fn load_localizer(
    assets: &dyn AssetSource,
    unpacker: &dyn ModelUnpacker,
) -> Result<Box<dyn PupilLocalizer>, ModelLoadError> {
    let bytes = fetch(assets, ModelAsset::PupilLocalizer)?;
    log::info!("Pupil localizer loaded, {} bytes", bytes.len());
    unpacker
        .unpack_localizer(&bytes)
        .map_err(|e| ModelLoadError::Unpack {
            asset: ModelAsset::PupilLocalizer,
            reason: e.to_string(),
        })
}

fn fetch(assets: &dyn AssetSource, asset: ModelAsset) -> Result<Vec<u8>, ModelLoadError> {
    let bytes = assets.fetch(asset).map_err(|e| ModelLoadError::Fetch {
        asset,
        reason: e.to_string(),
    })?;
    if bytes.is_empty() {
        return Err(ModelLoadError::Fetch {
            asset,
            reason: "empty model blob".to_string(),
        });
    }
    Ok(bytes)
}
