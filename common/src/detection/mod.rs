pub mod detection;
pub mod image_data;
pub mod output_mode;
pub mod overlay;
pub mod render_options;
