use crate::viewer::viewer::Viewer;
use std::process::ExitCode;

pub mod inference;
pub mod utils;
pub mod viewer;
pub mod web;

#[actix_web::main]
async fn main() -> ExitCode {
    let exit_code = Viewer::run().await;
    Viewer::terminate().await;
    exit_code
}
