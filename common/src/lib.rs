pub mod detection;
pub mod utils;
pub mod web;
