use crate::utils::logging::*;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tokio::sync::RwLock;

lazy_static! {
    static ref CONFIG: RwLock<Config> = RwLock::new(Config::new());
}

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub http_server_bind_port: u16, //port
    pub bind_retry_duration: u64, //seconds
    pub max_upload_size: usize, //bytes
    pub endpoint: String, //URL
    pub default_model: String,
    pub default_version: String,
    pub default_api_key: String,
    pub font_path: String, //path
    pub font_size: f32, //points
    pub border_color: [u8; 3], //RGB
    pub text_color: [u8; 3], //RGB
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        match Self::load("./remote_viewer.toml") {
            Ok(config) => config,
            Err(err) => {
                logging_console!(emergency_entry!(err));
                panic!("Unable to load configuration file");
            },
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SystemEntry> {
        let toml_string = fs::read_to_string(path).map_err(SystemEntry::ConfigNotFound)?;
        Self::parse(&toml_string)
    }

    pub fn parse(toml_string: &str) -> Result<Self, SystemEntry> {
        let config_table = toml::from_str::<ConfigTable>(toml_string)
            .map_err(|err| SystemEntry::ConfigParseError(err.to_string()))?;
        let config = config_table.config;
        if !Self::validate(&config) {
            return Err(SystemEntry::InvalidConfig);
        }
        Ok(config)
    }

    pub async fn now() -> Config {
        CONFIG.read().await.clone()
    }

    pub async fn update(config: Config) {
        *CONFIG.write().await = config
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_second(config.bind_retry_duration)
            && config.max_upload_size > 0
            && Config::validate_endpoint(&config.endpoint)
            && Config::validate_font_size(config.font_size)
    }

    fn validate_second(second: u64) -> bool {
        second <= 3600
    }

    fn validate_endpoint(endpoint: &str) -> bool {
        endpoint.starts_with("https://") || endpoint.starts_with("http://")
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = include_str!("../../remote_viewer.toml");

    #[test]
    fn bundled_configuration_is_valid() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.endpoint, "https://detect.roboflow.com");
        assert_eq!(config.default_version, "1");
    }

    #[test]
    fn rejects_endpoint_without_scheme() {
        let broken = SAMPLE.replace("https://detect.roboflow.com", "detect.roboflow.com");
        assert!(matches!(Config::parse(&broken), Err(SystemEntry::InvalidConfig)));
    }

    #[test]
    fn rejects_non_positive_font_size() {
        let broken = SAMPLE.replace("font_size = 18.0", "font_size = 0.0");
        assert!(matches!(Config::parse(&broken), Err(SystemEntry::InvalidConfig)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        assert_eq!(Config::load(file.path()).unwrap(), Config::parse(SAMPLE).unwrap());
    }
}
