use crate::inference::client::{RemoteClient, RemoteResult};
use crate::inference::request::InferenceRequest;
use crate::utils::config::Config;
use crate::utils::logging::*;
use actix_multipart::Multipart;
use actix_web::{post, web, HttpResponse, Responder, Scope};
use common::detection::overlay::BoxOverlay;
use common::detection::render_options::RenderOptions;
use common::web::multipart::FormData;
use common::web::response::{bad_request, inference_error_response, json_response, png_response};
use uuid::Uuid;

pub fn initialize() -> Scope {
    web::scope("/inference")
        .service(detect)
}

#[post("/detect")]
async fn detect(client: web::Data<RemoteClient>, payload: Multipart) -> impl Responder {
    let request_id = Uuid::new_v4();
    let config = Config::now().await;
    let mut form = match FormData::read(payload, config.max_upload_size).await {
        Ok(form) => form,
        Err(entry) => {
            let message = entry.to_string();
            logging_warning!(request_id, message.clone(), "");
            return bad_request(request_id, message);
        },
    };
    let result = match (build_request(&mut form, &config), form.render_options()) {
        (Ok(request), Ok(options)) => run(request_id, &client, &request, &options, &config).await,
        (Err(entry), _) | (_, Err(entry)) => Err(entry),
    };
    match result {
        Ok(response) => response,
        Err(entry) => {
            logging_error!(request_id, entry.to_string(), "");
            inference_error_response(request_id, entry)
        },
    }
}

fn build_request(form: &mut FormData, config: &Config) -> Result<InferenceRequest, InferenceEntry> {
    let upload = match form.take_file("inferenceFile") {
        Some(file) if matches!(file.extension().as_str(), "png" | "jpg" | "jpeg") => Some(file.data),
        Some(file) => return Err(InferenceEntry::InvalidRequest(format!("Unsupported file type {}", file.file_name))),
        None => None,
    };
    let url = form.field("imageUrl").map(str::to_string);
    let model = form.field("modelId").unwrap_or(&config.default_model);
    let version = form.field("modelVersion").unwrap_or(&config.default_version);
    let api_key = form.field("apiKey").unwrap_or(&config.default_api_key);
    let confidence = match form.field("confidence") {
        Some(confidence) => confidence.parse::<u8>()
            .map_err(|_| InferenceEntry::InvalidRequest(format!("Invalid confidence {confidence}")))?,
        None => 40,
    };
    let overlap = match form.field("overlap") {
        Some(overlap) => overlap.parse::<f32>()
            .map_err(|_| InferenceEntry::InvalidRequest(format!("Invalid overlap {overlap}")))?,
        None => 0.3,
    };
    let request = InferenceRequest::new(upload, url, model, version, api_key)?
        .with_thresholds(confidence, overlap)?
        .with_classes(form.field("classes").unwrap_or(""))
        .with_output_mode(form.output_mode()?);
    Ok(request)
}

async fn run(request_id: Uuid, client: &RemoteClient, request: &InferenceRequest, options: &RenderOptions, config: &Config) -> Result<HttpResponse, InferenceEntry> {
    logging_information!(request_id, format!("Hosted inference requested from {}", client.url(request)), format!("Mode: {}, Options: {options:?}", request.output_mode));
    match client.infer(request).await? {
        RemoteResult::Json(payload) => Ok(json_response(request_id, &payload)),
        RemoteResult::Image { detections, image } => {
            logging_information!(request_id, format!("Received {} predictions", detections.len()), "");
            let mut overlay = BoxOverlay::new(config.border_color, config.text_color, config.font_size);
            if options.show_labels {
                match BoxOverlay::load_font(&config.font_path).await {
                    Ok(font) => overlay = overlay.with_font(font),
                    Err(entry) => logging_warning!(request_id, entry.to_string(), "Labels are not drawn"),
                }
            }
            let rendered = overlay.render(&image.to_rgb8(), &detections, options);
            Ok(png_response(request_id, &rendered))
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::request::ImageSource;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, init_service, read_body, TestRequest};
    use actix_web::App;
    use common::detection::output_mode::OutputMode;
    use common::web::response::{encode_png, REQUEST_ID_HEADER};
    use image::RgbImage;

    fn config() -> Config {
        Config::parse(include_str!("../../../remote_viewer.toml")).unwrap()
    }

    const BOUNDARY: &str = "hosted-boundary";

    fn multipart_body(fields: &[(&str, &str)], png: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes());
        }
        body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"inferenceFile\"; filename=\"road.png\"\r\nContent-Type: image/png\r\n\r\n").as_bytes());
        body.extend_from_slice(png);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    #[actix_web::test]
    async fn image_mode_returns_rendered_png() {
        let mut server = mockito::Server::new_async().await;
        let hosted = server.mock("POST", "/pothole-detection-system/1")
            .match_query(mockito::Matcher::UrlEncoded("confidence".to_string(), "0.6".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"image": {"width": 4, "height": 3}, "predictions": [{"x": 2.0, "y": 1.5, "width": 2.0, "height": 1.0, "class": "pothole", "confidence": 0.8}]}"#)
            .expect(1)
            .create_async().await;
        let app = init_service(App::new()
            .app_data(web::Data::new(RemoteClient::new(server.url())))
            .service(initialize())).await;
        let png = encode_png(&RgbImage::new(4, 3)).unwrap();
        let request = TestRequest::post()
            .uri("/inference/detect")
            .insert_header(("content-type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(multipart_body(&[("confidence", "60"), ("labels", "off")], &png))
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let body = read_body(response).await;
        let rendered = image::load_from_memory(&body).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (4, 3));
        hosted.assert_async().await;
    }

    #[actix_web::test]
    async fn hosted_failure_is_bad_gateway() {
        let mut server = mockito::Server::new_async().await;
        let _hosted = server.mock("POST", "/pothole-detection-system/1")
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .with_body("upstream down")
            .create_async().await;
        let app = init_service(App::new()
            .app_data(web::Data::new(RemoteClient::new(server.url())))
            .service(initialize())).await;
        let png = encode_png(&RgbImage::new(4, 3)).unwrap();
        let request = TestRequest::post()
            .uri("/inference/detect")
            .insert_header(("content-type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(multipart_body(&[], &png))
            .to_request();
        let response = call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let mut form = FormData::default()
            .with_field("imageUrl", "https://img.example/road.jpg")
            .with_field("modelId", "")
            .with_field("confidence", "60");
        let request = build_request(&mut form, &config()).unwrap();
        assert_eq!(request.model, "pothole-detection-system");
        assert_eq!(request.version, "1");
        assert_eq!(request.confidence, 60);
        assert_eq!(request.source, ImageSource::Url("https://img.example/road.jpg".to_string()));
        assert_eq!(request.output_mode, OutputMode::Image);
    }

    #[test]
    fn file_and_url_together_are_rejected() {
        let mut form = FormData::default()
            .with_file("inferenceFile", "road.png", vec![1, 2, 3])
            .with_field("imageUrl", "https://img.example/road.jpg");
        assert!(matches!(build_request(&mut form, &config()), Err(InferenceEntry::InvalidRequest(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let mut form = FormData::default().with_file("inferenceFile", "road.gif", vec![1]);
        assert!(matches!(build_request(&mut form, &config()), Err(InferenceEntry::InvalidRequest(_))));
    }

    #[test]
    fn malformed_thresholds_are_rejected() {
        let mut form = FormData::default()
            .with_file("inferenceFile", "road.jpg", vec![1])
            .with_field("confidence", "sixty");
        assert!(matches!(build_request(&mut form, &config()), Err(InferenceEntry::InvalidRequest(_))));
        let mut form = FormData::default()
            .with_file("inferenceFile", "road.jpg", vec![1])
            .with_field("overlap", "1.2");
        assert!(matches!(build_request(&mut form, &config()), Err(InferenceEntry::InvalidRequest(_))));
    }
}
