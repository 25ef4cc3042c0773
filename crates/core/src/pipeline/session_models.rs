use crate::detection::domain::classifier::{FaceClassifier, PupilLocalizer};
use crate::detection::domain::model_loader::{load_cascade, load_localizer, AssetSource, ModelUnpacker};
use crate::detection::infrastructure::cascade_scanner::CascadeScanner;
use crate::pipeline::detection_session::SessionError;
use crate::pipeline::frame_pipeline::{FramePipeline, PipelineConfig};

/// The scorers a session runs with, loaded once before the first cycle.
pub struct SessionModels {
    pub classifier: Box<dyn FaceClassifier>,
    pub localizer: Option<Box<dyn PupilLocalizer>>,
}

impl SessionModels {
    pub fn new(classifier: Box<dyn FaceClassifier>) -> Self {
        Self {
            classifier,
            localizer: None,
        }
    }

    pub fn with_localizer(mut self, localizer: Box<dyn PupilLocalizer>) -> Self {
        self.localizer = Some(localizer);
        self
    }

    /// Fetches and unpacks the cascade (and the pupil localizer when
    /// asked), wrapping the cascade in a multi-scale scanner. Any failure
    /// is fatal to session start.
    pub fn load(
        assets: &dyn AssetSource,
        unpacker: &dyn ModelUnpacker,
        with_localizer: bool,
    ) -> Result<Self, SessionError> {
        let cascade = load_cascade(assets, unpacker)?;
        let mut models = Self::new(Box::new(CascadeScanner::new(cascade)));
        if with_localizer {
            models.localizer = Some(load_localizer(assets, unpacker)?);
        }
        Ok(models)
    }

    pub fn into_pipeline(self, config: PipelineConfig) -> FramePipeline {
        let pipeline = FramePipeline::new(config, self.classifier);
        match self.localizer {
            Some(localizer) => pipeline.with_localizer(localizer),
            None => pipeline,
        }
    }
}
