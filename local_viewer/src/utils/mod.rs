pub mod config;
pub mod logging;
pub mod static_files;
