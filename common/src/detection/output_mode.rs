use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// What an inference request should answer with.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Image,
    Json,
}

impl FromStr for OutputMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Image" => Ok(OutputMode::Image),
            "JSON" => Ok(OutputMode::Json),
            _ => Err(()),
        }
    }
}

impl Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            OutputMode::Image => "Image",
            OutputMode::Json => "JSON",
        })
    }
}
