pub mod log_entry;
pub mod logger;
pub mod logging;
