use crate::detection::detection::{CornerBox, DetectionSet};
use crate::detection::render_options::RenderOptions;
use crate::utils::log_entry::io::IOEntry;
use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_text_mut};

/// Distance between a label's baseline anchor and the top edge of its box.
pub const LABEL_OFFSET: f32 = 10.0;

pub struct BoxOverlay {
    border_color: Rgb<u8>,
    text_color: Rgb<u8>,
    font_scale: PxScale,
    font: Option<FontVec>,
}

impl BoxOverlay {
    pub fn new(border_color: [u8; 3], text_color: [u8; 3], font_size: f32) -> Self {
        Self {
            border_color: Rgb(border_color),
            text_color: Rgb(text_color),
            font_scale: PxScale::from(font_size),
            font: None,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(font);
        self
    }

    pub fn parse_font(font_data: Vec<u8>) -> Option<FontVec> {
        FontVec::try_from_vec(font_data).ok()
    }

    pub async fn load_font(font_path: &str) -> Result<FontVec, IOEntry> {
        let font_data = tokio::fs::read(font_path).await
            .map_err(|err| IOEntry::ReadFileError(font_path.to_string(), err))?;
        Self::parse_font(font_data).ok_or_else(|| IOEntry::InvalidFontError(font_path.to_string()))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Draws every detection onto a copy of `image`.
    ///
    /// Labels are skipped when no font is loaded.
    pub fn render(&self, image: &RgbImage, detection_set: &DetectionSet, options: &RenderOptions) -> RgbImage {
        let mut canvas = image.clone();
        for detection in detection_set.iter() {
            let corners = detection.corners();
            self.draw_outline(&mut canvas, &corners, options.stroke_width.pixels());
            if options.show_labels {
                if let Some(font) = &self.font {
                    let x = corners.left.round() as i32;
                    let y = (corners.top - LABEL_OFFSET).round() as i32;
                    draw_text_mut(&mut canvas, self.text_color, x, y, self.font_scale, font, &detection.class_name);
                }
            }
        }
        canvas
    }

    fn draw_outline(&self, canvas: &mut RgbImage, corners: &CornerBox, stroke_width: u32) {
        // Segments are walked point by point, so keep them near the canvas.
        let margin = stroke_width as f32;
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        let clip_x = |x: f32| x.clamp(-margin, width + margin);
        let clip_y = |y: f32| y.clamp(-margin, height + margin);
        // Ring 0 sits on the exact corners, further rings grow outward.
        for ring in 0..stroke_width {
            let offset = ring as f32;
            let (left, top) = (clip_x(corners.left - offset), clip_y(corners.top - offset));
            let (right, bottom) = (clip_x(corners.right + offset), clip_y(corners.bottom + offset));
            draw_line_segment_mut(canvas, (left, top), (right, top), self.border_color);
            draw_line_segment_mut(canvas, (right, top), (right, bottom), self.border_color);
            draw_line_segment_mut(canvas, (right, bottom), (left, bottom), self.border_color);
            draw_line_segment_mut(canvas, (left, bottom), (left, top), self.border_color);
        }
    }
}
