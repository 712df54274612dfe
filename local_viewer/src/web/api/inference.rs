use crate::inference::decoder::DecodeSettings;
use crate::inference::detector::LocalDetector;
use crate::utils::config::Config;
use crate::utils::logging::*;
use actix_multipart::Multipart;
use actix_web::{post, web, HttpRequest, HttpResponse, Responder, Scope};
use common::detection::image_data::decode_image;
use common::detection::output_mode::OutputMode;
use common::detection::overlay::BoxOverlay;
use common::web::multipart::FormData;
use common::web::response::{bad_request, inference_error_response, json_response, png_response};
use uuid::Uuid;

pub fn initialize() -> Scope {
    web::scope("/inference")
        .service(detect)
}

#[post("/detect")]
async fn detect(req: HttpRequest, payload: Multipart) -> impl Responder {
    let request_id = Uuid::new_v4();
    let config = Config::now().await;
    let form = match FormData::read(payload, config.max_upload_size).await {
        Ok(form) => form,
        Err(entry) => {
            let message = entry.to_string();
            logging_warning!(request_id, message.clone(), "");
            return bad_request(request_id, message);
        },
    };
    match run(request_id, &req, form, &config).await {
        Ok(response) => response,
        Err(entry) => {
            logging_error!(request_id, entry.to_string(), "");
            inference_error_response(request_id, entry)
        },
    }
}

async fn run(request_id: Uuid, req: &HttpRequest, mut form: FormData, config: &Config) -> Result<HttpResponse, InferenceEntry> {
    let output_mode = form.output_mode()?;
    let options = form.render_options()?;
    let file = form.take_file("inferenceFile")
        .ok_or_else(|| InferenceEntry::InvalidRequest("No image uploaded".to_string()))?;
    if !matches!(file.extension().as_str(), "png" | "jpg" | "jpeg") {
        return Err(InferenceEntry::InvalidRequest(format!("Unsupported file type {}", file.file_name)));
    }
    logging_information!(request_id, format!("Inference requested for {}", file.file_name), format!("Mode: {output_mode}, Options: {options:?}"));
    let image = decode_image(&file.data)?;
    // The form is validated before the model is touched.
    let detector = req.app_data::<web::Data<LocalDetector>>()
        .ok_or_else(|| InferenceEntry::InferenceError("Model is not loaded".to_string()))?
        .clone()
        .into_inner();
    let settings = DecodeSettings::from(config);
    let (image, result) = tokio::task::spawn_blocking(move || {
        let result = detector.infer_with(&image, &settings);
        (image, result)
    }).await
        .map_err(|err| InferenceEntry::InferenceError(SystemEntry::TaskPanickedError(err).to_string()))?;
    let result = result?;
    logging_information!(request_id, format!("Detected {} objects", result.detections.len()), "");
    match output_mode {
        OutputMode::Json => Ok(json_response(request_id, &result)),
        OutputMode::Image => {
            let mut overlay = BoxOverlay::new(config.border_color, config.text_color, config.font_size);
            if options.show_labels {
                match BoxOverlay::load_font(&config.font_path).await {
                    Ok(font) => overlay = overlay.with_font(font),
                    Err(entry) => logging_warning!(request_id, entry.to_string(), "Labels are not drawn"),
                }
            }
            let rendered = overlay.render(&image.to_rgb8(), &result.detections, &options);
            Ok(png_response(request_id, &rendered))
        },
    }
}
