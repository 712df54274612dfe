use thiserror::Error;

#[derive(Error, Debug)]
pub enum InferenceEntry {
    #[error("Failed to load model: {0}")]
    ModelLoadError(String),
    #[error("Invalid model input: {0}")]
    ModelInputError(String),
    #[error("Inference failed: {0}")]
    InferenceError(String),
    #[error("Remote request failed: {0}")]
    TransportError(String),
    #[error("Unexpected response shape: {0}")]
    ResponseShapeError(String),
    #[error("Invalid inference request: {0}")]
    InvalidRequest(String),
}

impl From<InferenceEntry> for String {
    #[inline(always)]
    fn from(value: InferenceEntry) -> Self {
        value.to_string()
    }
}
