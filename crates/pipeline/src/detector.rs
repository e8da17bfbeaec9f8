//! Dish detection: upload checks, detector client, and result shaping.
//!
//! The detector itself is an external service that accepts an image and
//! returns raw boxes. This module validates the upload before sending it,
//! drops low-confidence boxes, and enriches known dishes from the catalog.

use std::io::Cursor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vitafit_core::dish_catalog::{self, DishInfo};
use vitafit_core::error::CoreError;
use vitafit_core::plan::round2;

use crate::error::ServiceError;

/// IoU threshold for non-maximum suppression, forwarded to the detector.
pub const DEFAULT_IOU: f64 = 0.7;
/// Inference image size, forwarded to the detector.
pub const DEFAULT_IMAGE_SIZE: u32 = 640;

/// One box as reported by the detector service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawDetection {
    #[serde(alias = "label")]
    pub class_name: String,
    pub confidence: f64,
    /// `[x1, y1, x2, y2]` in pixels.
    #[serde(rename = "box")]
    pub bbox: [f64; 4],
}

/// A detection as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DishDetection {
    pub class_name: String,
    pub confidence: f64,
    #[serde(rename = "box")]
    pub bbox: [i64; 4],
    pub origin: Option<&'static str>,
    pub description: Option<&'static str>,
    pub estimated_calories: Option<&'static str>,
}

impl DishDetection {
    fn from_raw(raw: RawDetection) -> Self {
        let info: Option<&DishInfo> = dish_catalog::lookup(&raw.class_name);
        Self {
            confidence: round2(raw.confidence),
            bbox: raw.bbox.map(|v| v.round() as i64),
            origin: info.map(|i| i.origin),
            description: info.map(|i| i.description),
            estimated_calories: info.map(|i| i.estimated_calories),
            class_name: raw.class_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub detections: Vec<DishDetection>,
}

/// Drop boxes under `min_confidence` and shape the rest for the response.
pub fn summarize(raw: Vec<RawDetection>, min_confidence: f64) -> DetectionResponse {
    let detections: Vec<DishDetection> = raw
        .into_iter()
        .filter(|d| d.confidence >= min_confidence)
        .map(DishDetection::from_raw)
        .collect();
    let message = if detections.is_empty() {
        "No known dishes detected in the image."
    } else {
        "Dishes detected successfully."
    };
    DetectionResponse {
        status: "success",
        message,
        detections,
    }
}

/// Check an upload is non-empty, within `max_bytes`, and a readable
/// PNG, JPEG or WebP image. Returns its dimensions.
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<(u32, u32), CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(CoreError::Validation(format!(
            "Uploaded file is {} bytes, limit is {max_bytes}",
            bytes.len()
        )));
    }
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| CoreError::Validation(format!("Could not read uploaded image: {e}")))?;
    if reader.format().is_none() {
        return Err(CoreError::Validation(
            "Uploaded file is not a supported image (PNG, JPEG or WebP)".into(),
        ));
    }
    reader
        .into_dimensions()
        .map_err(|e| CoreError::Validation(format!("Invalid image file: {e}")))
}

/// Image in, raw detections out.
#[async_trait]
pub trait DishDetector: Send + Sync {
    async fn detect(&self, image: Vec<u8>, filename: &str) -> Result<Vec<RawDetection>, ServiceError>;
}

#[derive(Debug, Deserialize)]
struct DetectReply {
    detections: Vec<RawDetection>,
}

/// HTTP client for a detector exposing `POST /detect` (multipart `file`).
pub struct HttpDishDetector {
    client: reqwest::Client,
    base_url: String,
    confidence: f64,
}

impl HttpDishDetector {
    /// * `base_url` - e.g. `http://detector:9000`.
    pub fn new(base_url: impl Into<String>, confidence: f64) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, confidence)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>, confidence: f64) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            confidence,
        }
    }
}

#[async_trait]
impl DishDetector for HttpDishDetector {
    async fn detect(&self, image: Vec<u8>, filename: &str) -> Result<Vec<RawDetection>, ServiceError> {
        let part = reqwest::multipart::Part::bytes(image).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("conf", self.confidence.to_string())
            .text("iou", DEFAULT_IOU.to_string())
            .text("imgsz", DEFAULT_IMAGE_SIZE.to_string());

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let reply: DetectReply = response.json().await?;
        tracing::debug!(count = reply.detections.len(), "Detector replied");
        Ok(reply.detections)
    }
}

/// Map a non-2xx response to [`ServiceError::Api`].
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ServiceError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}
