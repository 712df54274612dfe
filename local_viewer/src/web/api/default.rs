use crate::utils::static_files::StaticFiles;
use actix_web::{HttpRequest, HttpResponse, Responder};
use mime_guess::from_path;

pub async fn default_route(req: HttpRequest) -> impl Responder {
    let request_path = req.path().trim_start_matches('/');
    let request_path = if request_path.is_empty() { "index.html" } else { request_path };
    match StaticFiles::get(request_path) {
        Some(content) => {
            let mime_type = from_path(request_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime_type.as_ref())
                .body(content.data.into_owned())
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, TestRequest};
    use actix_web::web::route;
    use actix_web::App;

    #[actix_web::test]
    async fn serves_embedded_page() {
        let app = init_service(App::new().default_service(route().to(default_route))).await;
        let response = call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "text/html");
        let response = call_service(&app, TestRequest::get().uri("/missing.js").to_request()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
