pub mod decoder;
pub mod detector;
pub mod letterbox;
pub mod local_result;
pub mod model_source;
