use crate::inference::letterbox::Letterbox;
use crate::inference::local_result::{ClassProbability, LocalResult};
use crate::utils::logging::*;
use common::detection::detection::{CornerBox, Detection, DetectionSet};

/// Per-request post-processing knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeSettings {
    pub class_names: Vec<String>,
    pub confidence: f32,
    pub overlap: f32,
}

impl DecodeSettings {
    pub fn class_name(&self, index: usize) -> String {
        self.class_names.get(index)
            .cloned()
            .unwrap_or_else(|| format!("class_{index}"))
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum HeadLayout {
    /// `[1, 4 + nc, N]`: center boxes followed by per-class scores.
    Raw { classes: usize, anchors: usize },
    /// `[1, N, 6]`: `x1, y1, x2, y2, score, class` rows.
    EndToEnd { rows: usize },
    /// `[1, nc]`
    Classification { classes: usize },
}

impl HeadLayout {
    pub fn from_shape(shape: &[usize]) -> Result<Self, InferenceEntry> {
        match shape {
            [1, rows, 6] => Ok(HeadLayout::EndToEnd { rows: *rows }),
            [1, features, anchors] if *features > 4 => Ok(HeadLayout::Raw { classes: features - 4, anchors: *anchors }),
            [1, classes] if *classes > 0 => Ok(HeadLayout::Classification { classes: *classes }),
            _ => Err(InferenceEntry::InferenceError(format!("Unsupported output shape {shape:?}"))),
        }
    }

    fn len(&self) -> usize {
        match self {
            HeadLayout::Raw { classes, anchors } => (classes + 4) * anchors,
            HeadLayout::EndToEnd { rows } => rows * 6,
            HeadLayout::Classification { classes } => *classes,
        }
    }
}

struct Candidate {
    corners: CornerBox,
    class_index: usize,
    score: f32,
}

pub fn decode(shape: &[usize], data: &[f32], letterbox: &Letterbox, settings: &DecodeSettings) -> Result<LocalResult, InferenceEntry> {
    let layout = HeadLayout::from_shape(shape)?;
    if data.len() != layout.len() {
        return Err(InferenceEntry::InferenceError(format!("Output of shape {shape:?} holds {} values", data.len())));
    }
    let candidates = match layout {
        HeadLayout::Raw { classes, anchors } => non_maximum_suppression(raw_candidates(data, classes, anchors, settings.confidence), settings.overlap),
        HeadLayout::EndToEnd { rows } => end_to_end_candidates(data, rows, settings.confidence),
        HeadLayout::Classification { .. } => {
            let probabilities = data.iter()
                .enumerate()
                .map(|(index, &probability)| ClassProbability { class_name: settings.class_name(index), probability })
                .collect();
            return Ok(LocalResult::classified(letterbox.source_width, letterbox.source_height, probabilities));
        },
    };
    let detections = candidates.into_iter()
        .map(|candidate| Detection::from_corners(letterbox.restore(candidate.corners), settings.class_name(candidate.class_index), candidate.score))
        .collect();
    Ok(LocalResult::detected(DetectionSet::new(letterbox.source_width, letterbox.source_height, detections)))
}

fn raw_candidates(data: &[f32], classes: usize, anchors: usize, confidence: f32) -> Vec<Candidate> {
    let value = |feature: usize, anchor: usize| data[feature * anchors + anchor];
    (0..anchors)
        .filter_map(|anchor| {
            let (class_index, score) = (0..classes)
                .map(|class| (class, value(4 + class, anchor)))
                .fold((0, f32::MIN), |best, current| if current.1 > best.1 { current } else { best });
            if score < confidence {
                return None;
            }
            let detection = Detection::new(value(0, anchor), value(1, anchor), value(2, anchor), value(3, anchor), "", score);
            Some(Candidate { corners: detection.corners(), class_index, score })
        })
        .collect()
}

fn end_to_end_candidates(data: &[f32], rows: usize, confidence: f32) -> Vec<Candidate> {
    data.chunks_exact(6)
        .take(rows)
        .filter(|row| row[4] >= confidence)
        .map(|row| Candidate {
            corners: CornerBox { left: row[0], top: row[1], right: row[2], bottom: row[3] },
            class_index: row[5].max(0.0).round() as usize,
            score: row[4],
        })
        .collect()
}

/// Greedy class-wise suppression, highest score first.
fn non_maximum_suppression(mut candidates: Vec<Candidate>, overlap: f32) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    let mut kept: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        let suppressed = kept.iter()
            .any(|other| other.class_index == candidate.class_index && other.corners.iou(&candidate.corners) > overlap);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
