use crate::utils::log_entry::inference::InferenceEntry;
use crate::utils::log_entry::io::IOEntry;
use actix_web::HttpResponse;
use image::{ImageFormat, RgbImage};
use serde::Serialize;
use std::io::Cursor;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Serialize, Debug)]
pub struct OperationStatus {
    success: bool,
    error: Option<String>,
}

impl OperationStatus {
    pub fn new(success: bool, error: Option<String>) -> Self {
        Self {
            success,
            error,
        }
    }

    pub fn failed<T: Into<String>>(error: T) -> Self {
        Self::new(false, Some(error.into()))
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, IOEntry> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).map_err(IOEntry::EncodeImageError)?;
    Ok(buffer.into_inner())
}

pub fn png_response(request_id: Uuid, image: &RgbImage) -> HttpResponse {
    match encode_png(image) {
        Ok(png) => HttpResponse::Ok()
            .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
            .content_type("image/png")
            .body(png),
        Err(err) => HttpResponse::InternalServerError()
            .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
            .json(OperationStatus::failed(err)),
    }
}

pub fn json_response<T: Serialize>(request_id: Uuid, value: &T) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
        .json(value)
}

pub fn bad_request<T: Into<String>>(request_id: Uuid, error: T) -> HttpResponse {
    HttpResponse::BadRequest()
        .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
        .json(OperationStatus::failed(error))
}

pub fn inference_error_response(request_id: Uuid, err: InferenceEntry) -> HttpResponse {
    let mut response = match err {
        InferenceEntry::ModelInputError(_) | InferenceEntry::InvalidRequest(_) => HttpResponse::BadRequest(),
        InferenceEntry::TransportError(_) | InferenceEntry::ResponseShapeError(_) => HttpResponse::BadGateway(),
        InferenceEntry::ModelLoadError(_) | InferenceEntry::InferenceError(_) => HttpResponse::InternalServerError(),
    };
    response
        .insert_header((REQUEST_ID_HEADER, request_id.to_string()))
        .json(OperationStatus::failed(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn error_kinds_map_to_status_codes() {
        let id = Uuid::new_v4();
        let cases = [
            (InferenceEntry::InvalidRequest("both".to_string()), StatusCode::BAD_REQUEST),
            (InferenceEntry::ModelInputError("decode".to_string()), StatusCode::BAD_REQUEST),
            (InferenceEntry::TransportError("503".to_string()), StatusCode::BAD_GATEWAY),
            (InferenceEntry::ResponseShapeError("image".to_string()), StatusCode::BAD_GATEWAY),
            (InferenceEntry::InferenceError("shape".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = inference_error_response(id, err);
            assert_eq!(response.status(), status);
            assert_eq!(response.headers().get(REQUEST_ID_HEADER).and_then(|value| value.to_str().ok()), Some(id.to_string().as_str()));
        }
    }

    #[test]
    fn encodes_png_signature() {
        let png = encode_png(&RgbImage::new(4, 4)).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
