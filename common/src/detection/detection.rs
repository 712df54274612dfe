use serde::{Deserialize, Serialize};

/// One recognized object, stored in center form.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    #[serde(rename = "class")]
    pub class_name: String,
    pub confidence: f32,
}

/// Axis-aligned rectangle given by its corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CornerBox {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Detection {
    pub fn new<T: Into<String>>(x: f32, y: f32, width: f32, height: f32, class_name: T, confidence: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            class_name: class_name.into(),
            confidence,
        }
    }

    pub fn from_corners<T: Into<String>>(corners: CornerBox, class_name: T, confidence: f32) -> Self {
        let width = corners.right - corners.left;
        let height = corners.bottom - corners.top;
        Self::new(corners.left + width / 2.0, corners.top + height / 2.0, width, height, class_name, confidence)
    }

    pub fn corners(&self) -> CornerBox {
        let half_width = self.width / 2.0;
        let half_height = self.height / 2.0;
        CornerBox {
            left: self.x - half_width,
            top: self.y - half_height,
            right: self.x + half_width,
            bottom: self.y + half_height,
        }
    }
}

impl CornerBox {
    pub fn area(&self) -> f32 {
        (self.right - self.left).max(0.0) * (self.bottom - self.top).max(0.0)
    }

    pub fn iou(&self, other: &CornerBox) -> f32 {
        let intersection = CornerBox {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        }.area();
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Detections of one image together with the image's pixel size.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct DetectionSet {
    pub width: u32,
    pub height: u32,
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new(width: u32, height: u32, detections: Vec<Detection>) -> Self {
        Self {
            width,
            height,
            detections,
        }
    }

    pub fn empty(width: u32, height: u32) -> Self {
        Self::new(width, height, Vec::new())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_center_plus_minus_half_extent() {
        let detection = Detection::new(100.0, 100.0, 40.0, 20.0, "pothole", 0.9);
        let corners = detection.corners();
        assert_eq!(corners, CornerBox { left: 80.0, top: 90.0, right: 120.0, bottom: 110.0 });
    }

    #[test]
    fn odd_extent_keeps_half_pixel() {
        let corners = Detection::new(10.0, 10.0, 5.0, 3.0, "pothole", 0.5).corners();
        assert_eq!(corners.left, 7.5);
        assert_eq!(corners.right, 12.5);
        assert_eq!(corners.top, 8.5);
        assert_eq!(corners.bottom, 11.5);
    }

    #[test]
    fn from_corners_restores_center_form() {
        let corners = CornerBox { left: 80.0, top: 90.0, right: 120.0, bottom: 110.0 };
        let detection = Detection::from_corners(corners, "pothole", 0.7);
        assert_eq!(detection, Detection::new(100.0, 100.0, 40.0, 20.0, "pothole", 0.7));
    }

    #[test]
    fn iou_of_disjoint_and_identical_boxes() {
        let a = CornerBox { left: 0.0, top: 0.0, right: 10.0, bottom: 10.0 };
        let b = CornerBox { left: 20.0, top: 20.0, right: 30.0, bottom: 30.0 };
        let c = CornerBox { left: 5.0, top: 0.0, right: 15.0, bottom: 10.0 };
        assert_eq!(a.iou(&b), 0.0);
        assert_eq!(a.iou(&a), 1.0);
        assert!((a.iou(&c) - 50.0 / 150.0).abs() < 1e-6);
    }

    #[test]
    fn zero_area_boxes_have_zero_iou() {
        let point = Detection::new(5.0, 5.0, 0.0, 0.0, "pothole", 0.5).corners();
        assert_eq!(point.iou(&point), 0.0);
    }

    #[test]
    fn deserializes_hosted_prediction_fields() {
        let json = r#"{"x": 12.5, "y": 30, "width": 8, "height": 4, "class": "pothole", "confidence": 0.81, "class_id": 0}"#;
        let detection: Detection = serde_json::from_str(json).unwrap();
        assert_eq!(detection.class_name, "pothole");
        assert_eq!(detection.x, 12.5);
        assert_eq!(detection.confidence, 0.81);
    }
}
