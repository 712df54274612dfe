use common::detection::detection::DetectionSet;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassProbability {
    #[serde(rename = "class")]
    pub class_name: String,
    pub probability: f32,
}

/// Outcome of one local inference.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LocalResult {
    #[serde(flatten)]
    pub detections: DetectionSet,
    // Only classification heads report probabilities.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub probabilities: Option<Vec<ClassProbability>>,
}

impl LocalResult {
    pub fn detected(detections: DetectionSet) -> Self {
        Self {
            detections,
            probabilities: None,
        }
    }

    pub fn classified(width: u32, height: u32, probabilities: Vec<ClassProbability>) -> Self {
        Self {
            detections: DetectionSet::empty(width, height),
            probabilities: Some(probabilities),
        }
    }
}
