pub mod log;
pub mod multipart;
pub mod response;
