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

// Model source, input size and thread count only take effect on restart.
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

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body_json, TestRequest};
    use actix_web::App;

    #[actix_web::test]
    async fn invalid_update_is_rejected() {
        let app = init_service(App::new().service(initialize())).await;
        let mut config = Config::parse(include_str!("../../../local_viewer.toml")).unwrap();
        config.overlap = 2.0;
        let request = TestRequest::post().uri("/config/update").set_json(&config).to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = read_body_json(response).await;
        assert_eq!(body["success"], false);
    }
}
