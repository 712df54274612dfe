use crate::detection::output_mode::OutputMode;
use crate::detection::render_options::{RenderOptions, StrokeWidth};
use crate::utils::log_entry::inference::InferenceEntry;
use crate::utils::log_entry::network::NetworkEntry;
use actix_multipart::{Field, Multipart};
use futures::{StreamExt, TryStreamExt};
use std::collections::HashMap;
use std::path::Path;

pub struct UploadedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .and_then(|os_str| os_str.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

/// A fully buffered `multipart/form-data` submission.
#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut payload: Multipart, max_upload_size: usize) -> Result<Self, NetworkEntry> {
        let mut form = FormData::default();
        let mut total_size = 0_usize;
        while let Some(mut field) = payload.try_next().await.map_err(|err| NetworkEntry::InvalidPayload(err.to_string()))? {
            let content_disposition = field.content_disposition().cloned()
                .ok_or_else(|| NetworkEntry::InvalidPayload("Missing content disposition".to_string()))?;
            let field_name = content_disposition.get_name()
                .ok_or_else(|| NetworkEntry::InvalidPayload("Missing field name".to_string()))?
                .to_string();
            let data = Self::read_field(&mut field, max_upload_size.saturating_sub(total_size)).await
                .map_err(|err| match err {
                    NetworkEntry::PayloadTooLarge(_) => NetworkEntry::PayloadTooLarge(max_upload_size),
                    other => other,
                })?;
            total_size += data.len();
            match content_disposition.get_filename() {
                // Browsers submit an unnamed, empty part for an untouched file input.
                Some(file_name) if file_name.is_empty() && data.is_empty() => {},
                Some(file_name) => {
                    form.files.insert(field_name, UploadedFile { file_name: file_name.to_string(), data });
                },
                None => {
                    form.fields.insert(field_name, String::from_utf8_lossy(&data).trim().to_string());
                },
            }
        }
        Ok(form)
    }

    async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, NetworkEntry> {
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|err| NetworkEntry::InvalidPayload(err.to_string()))?;
            if data.len() + chunk.len() > limit {
                return Err(NetworkEntry::PayloadTooLarge(limit));
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }

    pub fn with_field<T: Into<String>, U: Into<String>>(mut self, name: T, value: U) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn with_file<T: Into<String>, U: Into<String>>(mut self, name: T, file_name: U, data: Vec<u8>) -> Self {
        self.files.insert(name.into(), UploadedFile { file_name: file_name.into(), data });
        self
    }

    /// Text value of a field; blank values count as absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str).filter(|value| !value.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn output_mode(&self) -> Result<OutputMode, InferenceEntry> {
        match self.field("outputMode") {
            Some(mode) => mode.parse()
                .map_err(|_| InferenceEntry::InvalidRequest(format!("Unknown output mode {mode}"))),
            None => Ok(OutputMode::default()),
        }
    }

    /// `labels` is `on` or `off`, `strokeWidth` a form label such as `2px`.
    pub fn render_options(&self) -> Result<RenderOptions, InferenceEntry> {
        let show_labels = match self.field("labels") {
            Some("on") | None => true,
            Some("off") => false,
            Some(other) => return Err(InferenceEntry::InvalidRequest(format!("Unknown labels option {other}"))),
        };
        let stroke_width = match self.field("strokeWidth") {
            Some(width) => width.parse::<StrokeWidth>()
                .map_err(|_| InferenceEntry::InvalidRequest(format!("Unsupported stroke width {width}")))?,
            None => StrokeWidth::default(),
        };
        Ok(RenderOptions::new(show_labels, stroke_width))
    }
}
