use crate::utils::logging::*;
use std::path::PathBuf;

/// Where the model weights come from.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    File(PathBuf),
    Url(String),
}

impl ModelSource {
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        if source.starts_with("http://") || source.starts_with("https://") {
            ModelSource::Url(source.to_string())
        } else {
            ModelSource::File(PathBuf::from(source))
        }
    }

    pub async fn fetch(&self) -> Result<Vec<u8>, InferenceEntry> {
        match self {
            ModelSource::File(path) => tokio::fs::read(path).await
                .map_err(|err| InferenceEntry::ModelLoadError(format!("{}: {err}", path.display()))),
            ModelSource::Url(url) => {
                let response = reqwest::get(url).await
                    .map_err(|err| InferenceEntry::ModelLoadError(format!("{url}: {err}")))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(InferenceEntry::ModelLoadError(format!("{url}: HTTP {status}")));
                }
                let bytes = response.bytes().await
                    .map_err(|err| InferenceEntry::ModelLoadError(format!("{url}: {err}")))?;
                Ok(bytes.to_vec())
            },
        }
    }
}

impl std::fmt::Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelSource::File(path) => write!(f, "{}", path.display()),
            ModelSource::Url(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn recognizes_urls() {
        assert_eq!(ModelSource::parse("https://example.com/best.onnx"), ModelSource::Url("https://example.com/best.onnx".to_string()));
        assert_eq!(ModelSource::parse(" ./Model/best.onnx "), ModelSource::File(PathBuf::from("./Model/best.onnx")));
    }

    #[tokio::test]
    async fn reads_file_source() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"weights").unwrap();
        let source = ModelSource::File(file.path().to_path_buf());
        assert_eq!(source.fetch().await.unwrap(), b"weights".to_vec());
    }

    #[tokio::test]
    async fn missing_file_is_load_error() {
        let source = ModelSource::parse("./definitely/not/here.onnx");
        assert!(matches!(source.fetch().await, Err(InferenceEntry::ModelLoadError(_))));
    }
}
