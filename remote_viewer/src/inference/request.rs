use crate::utils::logging::*;
use common::detection::output_mode::OutputMode;

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Upload(Vec<u8>),
    Url(String),
}

/// One call to the hosted model.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceRequest {
    pub source: ImageSource,
    pub model: String,
    pub version: String,
    pub api_key: String,
    pub confidence: u8, //percent
    pub overlap: f32, //0.0 - 1.0
    pub classes: Vec<String>,
    pub output_mode: OutputMode,
}

impl InferenceRequest {
    pub fn new<T: Into<String>, U: Into<String>, V: Into<String>>(upload: Option<Vec<u8>>, url: Option<String>, model: T, version: U, api_key: V) -> Result<Self, InferenceEntry> {
        let source = match (upload, url) {
            (Some(bytes), None) => ImageSource::Upload(bytes),
            (None, Some(url)) => ImageSource::Url(url),
            (Some(_), Some(_)) => return Err(InferenceEntry::InvalidRequest("Provide either an image file or an image URL, not both".to_string())),
            (None, None) => return Err(InferenceEntry::InvalidRequest("Provide an image file or an image URL".to_string())),
        };
        let request = Self {
            source,
            model: model.into(),
            version: version.into(),
            api_key: api_key.into(),
            confidence: 40,
            overlap: 0.3,
            classes: Vec::new(),
            output_mode: OutputMode::default(),
        };
        if request.model.is_empty() || request.version.is_empty() {
            return Err(InferenceEntry::InvalidRequest("Model id and version are required".to_string()));
        }
        Ok(request)
    }

    pub fn with_thresholds(mut self, confidence: u8, overlap: f32) -> Result<Self, InferenceEntry> {
        if confidence > 100 {
            return Err(InferenceEntry::InvalidRequest(format!("Confidence {confidence} is outside 0 - 100")));
        }
        if !(0.0..=1.0).contains(&overlap) {
            return Err(InferenceEntry::InvalidRequest(format!("Overlap {overlap} is outside 0.0 - 1.0")));
        }
        self.confidence = confidence;
        self.overlap = overlap;
        Ok(self)
    }

    /// Accepts the comma separated form text; blanks are dropped.
    pub fn with_classes(mut self, classes: &str) -> Self {
        self.classes = classes.split(',')
            .map(str::trim)
            .filter(|class| !class.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("api_key", self.api_key.clone()),
            ("confidence", format!("{}", self.confidence as f64 / 100.0)),
            ("overlap", format!("{}", self.overlap)),
        ];
        if !self.classes.is_empty() {
            pairs.push(("classes", self.classes.join(",")));
        }
        if let ImageSource::Url(url) = &self.source {
            pairs.push(("image", url.clone()));
        }
        pairs
    }

    pub fn body(&self) -> Vec<u8> {
        match &self.source {
            ImageSource::Upload(bytes) => bytes.clone(),
            ImageSource::Url(_) => Vec::new(),
        }
    }
}
