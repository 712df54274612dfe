use image::ImageError;
use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IOEntry {
    #[error("Failed to read file {0}: {1}")]
    ReadFileError(String, IoError),
    #[error("Failed to parse font file {0}")]
    InvalidFontError(String),
    #[error("Failed to encode image: {0}")]
    EncodeImageError(ImageError),
}

impl From<IOEntry> for String {
    #[inline(always)]
    fn from(value: IOEntry) -> Self {
        value.to_string()
    }
}
