pub mod config;
pub mod default;
pub mod inference;
