use common::detection::detection::CornerBox;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

const PADDING: u8 = 114;

/// Geometry of fitting a source image into the square model input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Letterbox {
    pub source_width: u32,
    pub source_height: u32,
    pub size: u32,
    pub scale: f32,
    pub resized_width: u32,
    pub resized_height: u32,
    pub offset_x: u32,
    pub offset_y: u32,
}

impl Letterbox {
    pub fn new(source_width: u32, source_height: u32, size: u32) -> Self {
        let scale = (size as f32 / source_width as f32).min(size as f32 / source_height as f32);
        let resized_width = ((source_width as f32 * scale).round() as u32).clamp(1, size);
        let resized_height = ((source_height as f32 * scale).round() as u32).clamp(1, size);
        Self {
            source_width,
            source_height,
            size,
            scale,
            resized_width,
            resized_height,
            offset_x: (size - resized_width) / 2,
            offset_y: (size - resized_height) / 2,
        }
    }

    pub fn canvas(&self, image: &RgbImage) -> RgbImage {
        let resized = imageops::resize(image, self.resized_width, self.resized_height, FilterType::Triangle);
        let mut canvas = RgbImage::from_pixel(self.size, self.size, Rgb([PADDING; 3]));
        imageops::overlay(&mut canvas, &resized, self.offset_x as i64, self.offset_y as i64);
        canvas
    }

    /// Planar RGB (CHW) scaled to 0.0 - 1.0.
    pub fn tensor(&self, image: &RgbImage) -> Vec<f32> {
        let canvas = self.canvas(image);
        let plane = (self.size * self.size) as usize;
        let mut data = vec![0_f32; plane * 3];
        for (x, y, pixel) in canvas.enumerate_pixels() {
            let index = (y * self.size + x) as usize;
            for channel in 0..3 {
                data[channel * plane + index] = pixel[channel] as f32 / 255.0;
            }
        }
        data
    }

    pub fn restore(&self, corners: CornerBox) -> CornerBox {
        let map = |value: f32, offset: u32, limit: u32| ((value - offset as f32) / self.scale).clamp(0.0, limit as f32);
        CornerBox {
            left: map(corners.left, self.offset_x, self.source_width),
            top: map(corners.top, self.offset_y, self.source_height),
            right: map(corners.right, self.offset_x, self.source_width),
            bottom: map(corners.bottom, self.offset_y, self.source_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_padded_vertically() {
        let letterbox = Letterbox::new(1280, 640, 640);
        assert_eq!(letterbox.scale, 0.5);
        assert_eq!((letterbox.resized_width, letterbox.resized_height), (640, 320));
        assert_eq!((letterbox.offset_x, letterbox.offset_y), (0, 160));
    }

    #[test]
    fn restore_maps_back_to_source_pixels() {
        let letterbox = Letterbox::new(1280, 640, 640);
        let restored = letterbox.restore(CornerBox { left: 100.0, top: 200.0, right: 300.0, bottom: 400.0 });
        assert_eq!(restored, CornerBox { left: 200.0, top: 80.0, right: 600.0, bottom: 480.0 });
    }

    #[test]
    fn restore_clamps_into_padding() {
        let letterbox = Letterbox::new(1280, 640, 640);
        let restored = letterbox.restore(CornerBox { left: -5.0, top: 10.0, right: 700.0, bottom: 630.0 });
        assert_eq!(restored, CornerBox { left: 0.0, top: 0.0, right: 1280.0, bottom: 640.0 });
    }

    #[test]
    fn tensor_is_planar_with_grey_padding() {
        let image = RgbImage::from_pixel(4, 2, Rgb([255, 0, 0]));
        let letterbox = Letterbox::new(4, 2, 4);
        let tensor = letterbox.tensor(&image);
        assert_eq!(tensor.len(), 3 * 16);
        // Row 0 is padding, row 1 holds the image.
        assert_eq!(tensor[0], 114.0 / 255.0);
        assert_eq!(tensor[4], 1.0);
        assert_eq!(tensor[16 + 4], 0.0);
        assert_eq!(tensor[32 + 4], 0.0);
    }
}
