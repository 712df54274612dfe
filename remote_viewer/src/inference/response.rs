use crate::utils::logging::*;
use common::detection::detection::{Detection, DetectionSet};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// The `image` block of a hosted response.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HostedImage {
    #[serde(deserialize_with = "dimension")]
    pub width: u32,
    #[serde(deserialize_with = "dimension")]
    pub height: u32,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HostedPayload {
    pub image: HostedImage,
    pub predictions: Vec<Detection>,
}

impl HostedPayload {
    pub fn parse(payload: Value) -> Result<Self, InferenceEntry> {
        if payload.get("image").is_none() {
            return Err(InferenceEntry::ResponseShapeError("Response has no image field".to_string()));
        }
        if !payload.get("predictions").is_some_and(Value::is_array) {
            return Err(InferenceEntry::ResponseShapeError("Response predictions are not a list".to_string()));
        }
        serde_json::from_value(payload).map_err(|err| InferenceEntry::ResponseShapeError(err.to_string()))
    }

    pub fn into_detection_set(self) -> DetectionSet {
        DetectionSet::new(self.image.width, self.image.height, self.predictions)
    }
}

// Hosted responses carry dimensions either as numbers or as numeric strings.
fn dimension<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dimension {
        Number(u32),
        Text(String),
    }
    match Dimension::deserialize(deserializer)? {
        Dimension::Number(value) => Ok(value),
        Dimension::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}
