use crate::utils::log_entry::inference::InferenceEntry;
use image::DynamicImage;

/// Decodes PNG or JPEG bytes, refusing images without pixels.
pub fn decode_image(data: &[u8]) -> Result<DynamicImage, InferenceEntry> {
    let image = image::load_from_memory(data)
        .map_err(|err| InferenceEntry::ModelInputError(err.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(InferenceEntry::ModelInputError("Image has no pixels".to_string()));
    }
    Ok(image)
}
