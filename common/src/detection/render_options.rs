use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Outline width in pixels, restricted to the widths offered by the viewers.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub struct StrokeWidth(u32);

impl StrokeWidth {
    pub const ALLOWED: [u32; 5] = [1, 2, 5, 8, 10];

    pub fn new(pixels: u32) -> Option<Self> {
        Self::ALLOWED.contains(&pixels).then_some(Self(pixels))
    }

    pub fn pixels(&self) -> u32 {
        self.0
    }
}

impl Default for StrokeWidth {
    fn default() -> Self {
        Self(2)
    }
}

impl TryFrom<u32> for StrokeWidth {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("Unsupported stroke width {value}"))
    }
}

impl From<StrokeWidth> for u32 {
    fn from(value: StrokeWidth) -> Self {
        value.0
    }
}

impl FromStr for StrokeWidth {
    type Err = ();

    /// Accepts the form labels `"2px"`, `"10px"` and so on.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let pixels = s.trim().strip_suffix("px").ok_or(())?;
        let pixels = pixels.parse::<u32>().map_err(|_| ())?;
        Self::new(pixels).ok_or(())
    }
}

impl Display for StrokeWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px", self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_labels: bool,
    pub stroke_width: StrokeWidth,
}

impl RenderOptions {
    pub fn new(show_labels: bool, stroke_width: StrokeWidth) -> Self {
        Self {
            show_labels,
            stroke_width,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(true, StrokeWidth::default())
    }
}
