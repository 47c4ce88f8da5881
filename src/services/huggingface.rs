//! HTTP client for hosted captioning and object detection models

use crate::io::configuration::{
    CONNECT_TIMEOUT_SECS, DEFAULT_DESCRIPTION_MODEL, DEFAULT_DETECTION_MODEL, HF_API_BASE,
    HF_API_KEY_VAR, REQUEST_TIMEOUT_SECS, SUBJECT_LABEL, SUBJECT_MIN_SCORE,
};
use crate::io::error::{OutpaintError, Result, Stage, collaborator_error};
use crate::io::image::encode_png;
use crate::services::{FocusDetector, SceneDescriber, SubjectDetector};
use crate::spatial::geometry::Rect;
use image::RgbaImage;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

/// One object reported by a detection model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    /// Confidence in `[0, 1]`
    pub score: f64,
    /// Class label
    pub label: String,
    /// Bounding box in image coordinates
    #[serde(rename = "box")]
    pub bounds: DetectionBox,
}

/// Floating-point bounding box as reported by detection models
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DetectionBox {
    /// Left edge
    pub xmin: f64,
    /// Top edge
    pub ymin: f64,
    /// Right edge
    pub xmax: f64,
    /// Bottom edge
    pub ymax: f64,
}

impl DetectionBox {
    /// Round outward to whole pixels, clamped at zero
    pub fn to_rect(self) -> Rect {
        Rect::new(
            floor_to_pixel(self.xmin),
            floor_to_pixel(self.ymin),
            ceil_to_pixel(self.xmax),
            ceil_to_pixel(self.ymax),
        )
    }
}

fn floor_to_pixel(value: f64) -> u32 {
    value.floor().clamp(0.0, f64::from(u32::MAX)) as u32
}

fn ceil_to_pixel(value: f64) -> u32 {
    value.ceil().clamp(0.0, f64::from(u32::MAX)) as u32
}

#[derive(Debug, Deserialize)]
struct Caption {
    generated_text: String,
}

/// Blocking client for the hosted inference API
#[derive(Debug, Clone)]
pub struct HuggingFaceClient {
    client: Client,
    api_key: String,
    base_url: String,
    description_model: String,
    detection_model: String,
}

impl HuggingFaceClient {
    /// Create a client using the default models and public endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OutpaintError::MissingCredential {
                variable: HF_API_KEY_VAR,
            });
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| collaborator_error(Stage::Description, &e))?;

        Ok(Self {
            client,
            api_key,
            base_url: HF_API_BASE.to_string(),
            description_model: DEFAULT_DESCRIPTION_MODEL.to_string(),
            detection_model: DEFAULT_DETECTION_MODEL.to_string(),
        })
    }

    /// Use a different endpoint base
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use a different captioning model
    #[must_use]
    pub fn with_description_model(mut self, model: impl Into<String>) -> Self {
        self.description_model = model.into();
        self
    }

    /// Use a different detection model
    #[must_use]
    pub fn with_detection_model(mut self, model: impl Into<String>) -> Self {
        self.detection_model = model.into();
        self
    }

    /// Captioning model in use
    pub fn description_model(&self) -> &str {
        &self.description_model
    }

    /// Detection model in use
    pub fn detection_model(&self) -> &str {
        &self.detection_model
    }

    fn infer<T>(&self, model: &str, image: &RgbaImage, stage: Stage) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = encode_png(image)?;
        self.client
            .post(format!("{}/{model}", self.base_url))
            .bearer_auth(&self.api_key)
            .header("Content-Type", "image/png")
            .body(body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<T>)
            .map_err(|e| collaborator_error(stage, &e))
    }

    fn detect(&self, image: &RgbaImage, stage: Stage) -> Result<Vec<Rect>> {
        let detections: Vec<Detection> = self.infer(&self.detection_model, image, stage)?;
        Ok(subject_boxes(&detections))
    }
}

impl SceneDescriber for HuggingFaceClient {
    fn describe(&self, image: &RgbaImage) -> Result<String> {
        info!(model = %self.description_model, "Describing image");
        let captions: Vec<Caption> =
            self.infer(&self.description_model, image, Stage::Description)?;
        captions
            .into_iter()
            .map(|caption| caption.generated_text.trim().to_string())
            .find(|text| !text.is_empty())
            .ok_or_else(|| collaborator_error(Stage::Description, &"model returned no caption"))
    }
}

impl SubjectDetector for HuggingFaceClient {
    fn detect_subjects(&self, image: &RgbaImage) -> Result<Vec<Rect>> {
        let boxes = self.detect(image, Stage::SubjectDetection)?;
        info!(count = boxes.len(), ?boxes, "Detected subjects");
        Ok(boxes)
    }
}

impl FocusDetector for HuggingFaceClient {
    fn detect_focus(&self, image: &RgbaImage) -> Result<Option<Rect>> {
        let focus = self
            .detect(image, Stage::FocusDetection)?
            .into_iter()
            .next();
        info!(?focus, "Detected focus");
        Ok(focus)
    }
}

/// Subject boxes from raw detections, most confident first
///
/// Keeps detections labelled as subjects with at least the minimum score.
pub fn subject_boxes(detections: &[Detection]) -> Vec<Rect> {
    let mut subjects: Vec<&Detection> = detections
        .iter()
        .filter(|d| d.label == SUBJECT_LABEL && d.score >= SUBJECT_MIN_SCORE)
        .collect();
    subjects.sort_by(|a, b| b.score.total_cmp(&a.score));
    subjects.iter().map(|d| d.bounds.to_rect()).collect()
}
