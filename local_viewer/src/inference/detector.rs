use crate::inference::decoder::{decode, DecodeSettings};
use crate::inference::letterbox::Letterbox;
use crate::inference::local_result::LocalResult;
use crate::inference::model_source::ModelSource;
use crate::utils::config::Config;
use crate::utils::logging::*;
use image::DynamicImage;
use ort::session::Session;
use ort::value::Value;
use std::sync::Mutex;

/// The model, loaded once at startup and shared by every request.
pub struct LocalDetector {
    source: ModelSource,
    input_size: u32,
    settings: DecodeSettings,
    // Running a session needs exclusive access.
    session: Mutex<Session>,
}

impl LocalDetector {
    pub async fn load(config: &Config) -> Result<Self, InferenceEntry> {
        let source = ModelSource::parse(&config.model_source);
        let weights = source.fetch().await?;
        let load_error = |err: String| InferenceEntry::ModelLoadError(format!("{source}: {err}"));
        let session = Session::builder()
            .map_err(|err| load_error(err.to_string()))?
            .with_intra_threads(config.intra_threads)
            .map_err(|err| load_error(err.to_string()))?
            .commit_from_memory(&weights)
            .map_err(|err| load_error(err.to_string()))?;
        Ok(Self {
            source,
            input_size: config.input_size,
            settings: DecodeSettings::from(config),
            session: Mutex::new(session),
        })
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }

    pub fn infer(&self, image: &DynamicImage) -> Result<LocalResult, InferenceEntry> {
        self.infer_with(image, &self.settings)
    }

    pub fn infer_with(&self, image: &DynamicImage, settings: &DecodeSettings) -> Result<LocalResult, InferenceEntry> {
        if image.width() == 0 || image.height() == 0 {
            return Err(InferenceEntry::ModelInputError("Image has no pixels".to_string()));
        }
        let letterbox = Letterbox::new(image.width(), image.height(), self.input_size);
        let size = self.input_size as i64;
        let input = Value::from_array((vec![1_i64, 3, size, size], letterbox.tensor(&image.to_rgb8())))
            .map_err(|err| InferenceEntry::InferenceError(err.to_string()))?;
        let mut session = self.session.lock()
            .map_err(|_| InferenceEntry::InferenceError("Model session is poisoned".to_string()))?;
        let outputs = session.run(ort::inputs![input])
            .map_err(|err| InferenceEntry::InferenceError(err.to_string()))?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()
            .map_err(|err| InferenceEntry::InferenceError(err.to_string()))?;
        let dims: Vec<usize> = shape.iter().map(|&dim| dim as usize).collect();
        decode(&dims, data, &letterbox, settings)
    }
}

impl From<&Config> for DecodeSettings {
    fn from(config: &Config) -> Self {
        Self {
            class_names: config.class_names.clone(),
            confidence: config.confidence,
            overlap: config.overlap,
        }
    }
}
