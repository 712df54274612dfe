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
    pub model_source: String, //path or URL
    pub input_size: u32, //pixels
    pub intra_threads: usize,
    pub class_names: Vec<String>,
    pub confidence: f32, //0.0 - 1.0
    pub overlap: f32, //0.0 - 1.0
    pub font_path: String, //path
    pub font_size: f32, //points
    pub border_color: [u8; 3], //RGB
    pub text_color: [u8; 3], //RGB
}

impl Config {
    pub fn new() -> Self {
        //Seriously, the program must be terminated.
        match Self::load("./local_viewer.toml") {
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
            && !config.model_source.trim().is_empty()
            && Config::validate_input_size(config.input_size)
            && config.intra_threads > 0
            && !config.class_names.is_empty()
            && Config::validate_ratio(config.confidence)
            && Config::validate_ratio(config.overlap)
            && Config::validate_font_size(config.font_size)
    }

    fn validate_second(second: u64) -> bool {
        second <= 3600
    }

    fn validate_input_size(size: u32) -> bool {
        // YOLO strides top out at 32.
        size > 0 && size % 32 == 0
    }

    fn validate_ratio(ratio: f32) -> bool {
        (0.0..=1.0).contains(&ratio)
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }
}
