use crate::utils::logger::Logger;
use actix_web::{get, web, HttpResponse, Responder, Scope};
use chrono::{DateTime, Local};
use uuid::Uuid;

pub fn initialize() -> Scope {
    web::scope("/log")
        .service(system_log)
        .service(system_log_since)
        .service(request_log)
        .service(request_log_since)
}

#[get("/system_log")]
async fn system_log() -> impl Responder {
    let system_log = Logger::get_system_logs().await
        .into_iter().map(|log| log.to_plain_string()).collect::<Vec<String>>();
    HttpResponse::Ok().json(system_log)
}

#[get("/system_log/since/{since}")]
async fn system_log_since(since: web::Path<String>) -> impl Responder {
    match parse_datetime(&since.into_inner()) {
        Ok(since_time) => {
            let logs = Logger::get_system_logs_since(since_time).await
                .into_iter().map(|log| log.to_plain_string()).collect::<Vec<String>>();
            HttpResponse::Ok().json(logs)
        }
        Err(err) => HttpResponse::BadRequest().body(err),
    }
}

#[get("/{request_id}")]
async fn request_log(request_id: web::Path<Uuid>) -> impl Responder {
    match Logger::get_request_logs(request_id.into_inner()).await {
        Some(request_log) => {
            let request_log = request_log
                .into_iter().map(|log| log.to_plain_string()).collect::<Vec<String>>();
            HttpResponse::Ok().json(request_log)
        }
        None => HttpResponse::NotFound().body("Request not found."),
    }
}

#[get("/{request_id}/since/{since}")]
async fn request_log_since(argument: web::Path<(Uuid, String)>) -> impl Responder {
    let (request_id, since_str) = argument.into_inner();
    match parse_datetime(&since_str) {
        Ok(since_time) => match Logger::get_request_logs_since(request_id, since_time).await {
            Some(logs) => {
                let logs = logs
                    .into_iter().map(|log| log.to_plain_string()).collect::<Vec<String>>();
                HttpResponse::Ok().json(logs)
            }
            None => HttpResponse::NotFound().body("Request not found."),
        },
        Err(err) => HttpResponse::BadRequest().body(err),
    }
}

fn parse_datetime(datetime_str: &str) -> Result<DateTime<Local>, String> {
    DateTime::parse_from_rfc3339(datetime_str)
        .map_err(|_| "Invalid datetime format.".to_string())
        .map(|datetime| datetime.with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::App;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, TestRequest};

    #[test]
    fn parses_rfc3339_timestamps() {
        assert!(parse_datetime("2024-05-01T10:00:00+08:00").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[actix_web::test]
    async fn unknown_request_log_is_not_found() {
        let app = init_service(App::new().service(initialize())).await;
        let request = TestRequest::get().uri(&format!("/log/{}", Uuid::new_v4())).to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn malformed_since_is_rejected() {
        let app = init_service(App::new().service(initialize())).await;
        let request = TestRequest::get().uri("/log/system_log/since/not-a-date").to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
