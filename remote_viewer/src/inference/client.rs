use crate::inference::request::{ImageSource, InferenceRequest};
use crate::inference::response::HostedPayload;
use crate::utils::logging::*;
use common::detection::detection::DetectionSet;
use common::detection::image_data::decode_image;
use common::detection::output_mode::OutputMode;
use image::DynamicImage;
use reqwest::{Client, Response};
use serde_json::Value;

pub enum RemoteResult {
    Json(Value),
    Image { detections: DetectionSet, image: DynamicImage },
}

/// Talks to the hosted detection endpoint.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    endpoint: String,
}

impl RemoteClient {
    pub fn new<T: Into<String>>(endpoint: T) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn url(&self, request: &InferenceRequest) -> String {
        format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), request.model, request.version)
    }

    pub async fn infer(&self, request: &InferenceRequest) -> Result<RemoteResult, InferenceEntry> {
        let response = self.client.post(self.url(request))
            .query(&request.query_pairs())
            .header("Content-Type", "application/octet-stream")
            .body(request.body())
            .send().await
            .map_err(|err| InferenceEntry::TransportError(err.to_string()))?;
        let body = Self::success_bytes(response).await?;
        let payload: Value = serde_json::from_slice(&body)
            .map_err(|err| InferenceEntry::ResponseShapeError(err.to_string()))?;
        if request.output_mode == OutputMode::Json {
            return Ok(RemoteResult::Json(payload));
        }
        let payload = HostedPayload::parse(payload)?;
        let image_data = match (&payload.image.url, &request.source) {
            (Some(url), _) | (None, ImageSource::Url(url)) => self.fetch(url).await?,
            (None, ImageSource::Upload(bytes)) => bytes.clone(),
        };
        let image = decode_image(&image_data)?;
        Ok(RemoteResult::Image { detections: payload.into_detection_set(), image })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, InferenceEntry> {
        let response = self.client.get(url).send().await
            .map_err(|err| InferenceEntry::TransportError(format!("{url}: {err}")))?;
        Self::success_bytes(response).await
    }

    async fn success_bytes(response: Response) -> Result<Vec<u8>, InferenceEntry> {
        let status = response.status();
        let body = response.bytes().await
            .map_err(|err| InferenceEntry::TransportError(err.to_string()))?;
        if !status.is_success() {
            return Err(InferenceEntry::TransportError(format!("HTTP {status}: {}", String::from_utf8_lossy(&body))));
        }
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::web::response::encode_png;
    use image::RgbImage;
    use mockito::{Matcher, Server};

    const PAYLOAD: &str = r#"{"image": {"width": 4, "height": 3}, "predictions": [{"x": 2.0, "y": 1.5, "width": 2.0, "height": 1.0, "class": "pothole", "confidence": 0.8}]}"#;

    fn upload_request() -> InferenceRequest {
        let png = encode_png(&RgbImage::new(4, 3)).unwrap();
        InferenceRequest::new(Some(png), None, "pothole-detection", "2", "secret").unwrap()
            .with_thresholds(60, 0.5).unwrap()
    }

    #[tokio::test]
    async fn json_mode_returns_payload_untouched() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api_key".to_string(), "secret".to_string()),
                Matcher::UrlEncoded("confidence".to_string(), "0.6".to_string()),
                Matcher::UrlEncoded("overlap".to_string(), "0.5".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(PAYLOAD)
            .expect(1)
            .create_async().await;
        let client = RemoteClient::new(server.url());
        let request = upload_request().with_output_mode(OutputMode::Json);
        match client.infer(&request).await.unwrap() {
            RemoteResult::Json(value) => assert_eq!(value, serde_json::from_str::<Value>(PAYLOAD).unwrap()),
            RemoteResult::Image { .. } => panic!("expected JSON"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn image_mode_uses_uploaded_bytes() {
        let mut server = Server::new_async().await;
        let _mock = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(PAYLOAD)
            .create_async().await;
        let client = RemoteClient::new(server.url());
        match client.infer(&upload_request()).await.unwrap() {
            RemoteResult::Image { detections, image } => {
                assert_eq!((detections.width, detections.height), (4, 3));
                assert_eq!(detections.len(), 1);
                assert_eq!((image.width(), image.height()), (4, 3));
            },
            RemoteResult::Json(_) => panic!("expected image"),
        }
    }

    #[tokio::test]
    async fn image_mode_fetches_image_url() {
        let mut server = Server::new_async().await;
        let png = encode_png(&RgbImage::new(5, 5)).unwrap();
        let payload = format!(r#"{{"image": {{"width": 5, "height": 5, "url": "{}/images/road.png"}}, "predictions": []}}"#, server.url());
        let _post = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(payload)
            .create_async().await;
        let get = server.mock("GET", "/images/road.png")
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png)
            .expect(1)
            .create_async().await;
        let client = RemoteClient::new(server.url());
        match client.infer(&upload_request()).await.unwrap() {
            RemoteResult::Image { image, detections } => {
                assert_eq!((image.width(), image.height()), (5, 5));
                assert!(detections.is_empty());
            },
            RemoteResult::Json(_) => panic!("expected image"),
        }
        get.assert_async().await;
    }

    #[tokio::test]
    async fn missing_image_field_skips_fetch() {
        let mut server = Server::new_async().await;
        let _post = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"predictions": []}"#)
            .create_async().await;
        let get = server.mock("GET", Matcher::Any)
            .expect(0)
            .create_async().await;
        let client = RemoteClient::new(server.url());
        let request = InferenceRequest::new(None, Some(format!("{}/images/road.png", server.url())), "pothole-detection", "2", "secret").unwrap();
        assert!(matches!(client.infer(&request).await, Err(InferenceEntry::ResponseShapeError(_))));
        get.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_transport_error() {
        let mut server = Server::new_async().await;
        let _post = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("Forbidden")
            .create_async().await;
        let client = RemoteClient::new(server.url());
        match client.infer(&upload_request()).await {
            Err(InferenceEntry::TransportError(message)) => assert!(message.contains("403") && message.contains("Forbidden")),
            _ => panic!("expected transport error"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_shape_error() {
        let mut server = Server::new_async().await;
        let _post = server.mock("POST", "/pothole-detection/2")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html></html>")
            .create_async().await;
        let client = RemoteClient::new(server.url());
        assert!(matches!(client.infer(&upload_request()).await, Err(InferenceEntry::ResponseShapeError(_))));
    }
}
