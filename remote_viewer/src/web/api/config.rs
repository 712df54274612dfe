use crate::utils::config::Config;
use crate::utils::logging::*;
use actix_web::{get, post, web, HttpResponse, Responder, Scope};
use common::web::response::OperationStatus;

pub fn initialize() -> Scope {
    web::scope("/config")
        .service(get_config)
        .service(update_config)
}

#[get("/get")]
async fn get_config() -> impl Responder {
    web::Json(Config::now().await)
}

// The endpoint only takes effect on restart.
#[post("/update")]
async fn update_config(config: web::Json<Config>) -> impl Responder {
    let config = config.into_inner();
    if Config::validate(&config) {
        Config::update(config).await;
        logging_information!(SystemEntry::ConfigUpdated);
        HttpResponse::Ok().json(OperationStatus::new(true, None))
    } else {
        HttpResponse::BadRequest().json(OperationStatus::failed(SystemEntry::InvalidConfig))
    }
}
