//! HTTP client for the hosted image-edit and chat completion endpoints

use crate::io::configuration::{
    CONNECT_TIMEOUT_SECS, FALLBACK_REWRITE_MODEL, FALLBACK_SUFFIX, OPENAI_API_BASE,
    OPENAI_API_KEY_VAR, REQUEST_TIMEOUT_SECS, TileSize,
};
use crate::io::error::{OutpaintError, Result, Stage, collaborator_error};
use crate::io::image::decode_rgba;
use crate::services::{PromptRewriter, TileGenerator};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FallbackAnswer {
    #[serde(default)]
    approved: Vec<String>,
}

/// Blocking client for tile generation and fallback prompt rewriting
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    /// Create a client against the public endpoint
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client cannot be built
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Create a client against a compatible endpoint at `base_url`
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty or the HTTP client cannot be built
    pub fn with_base_url(api_key: impl Into<String>, base_url: &str) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(OutpaintError::MissingCredential {
                variable: OPENAI_API_KEY_VAR,
            });
        }

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| collaborator_error(Stage::TileGeneration, &e))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint base this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn png_part(tile_png: &[u8]) -> Result<multipart::Part> {
        multipart::Part::bytes(tile_png.to_vec())
            .file_name("tile.png")
            .mime_str("image/png")
            .map_err(|e| collaborator_error(Stage::TileGeneration, &e))
    }

    fn fetch_image(&self, datum: &ImageDatum) -> Result<Vec<u8>> {
        if let Some(encoded) = &datum.b64_json {
            return decode_base64_image(encoded);
        }
        let url = datum.url.as_deref().ok_or_else(|| {
            collaborator_error(Stage::TileGeneration, &"response carries no image data")
        })?;
        let response = self
            .client
            .get(url)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| collaborator_error(Stage::TileGeneration, &e))?;
        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(|e| collaborator_error(Stage::TileGeneration, &e))
    }

    fn request_rewrite(&self, primary: &str) -> Result<String> {
        let body = json!({
            "model": FALLBACK_REWRITE_MODEL,
            "messages": [
                {"role": "system", "content": ""},
                {"role": "user", "content": fallback_instruction(primary)},
            ],
        });

        let response: ChatResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<ChatResponse>)
            .map_err(|e| collaborator_error(Stage::FallbackRewrite, &e))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| collaborator_error(Stage::FallbackRewrite, &"empty completion"))
    }
}

impl TileGenerator for OpenAiClient {
    fn generate_tile(
        &self,
        tile_png: &[u8],
        prompt: &str,
        tile_size: TileSize,
    ) -> Result<RgbaImage> {
        // The tile's own alpha channel doubles as the edit mask
        let form = multipart::Form::new()
            .part("image", Self::png_part(tile_png)?)
            .part("mask", Self::png_part(tile_png)?)
            .text("prompt", prompt.to_string())
            .text("n", "1")
            .text("size", tile_size.to_string())
            .text("response_format", "b64_json");

        debug!(size = %tile_size, prompt, "Requesting image edit");
        let response: ImageResponse = self
            .client
            .post(format!("{}/images/edits", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::json::<ImageResponse>)
            .map_err(|e| collaborator_error(Stage::TileGeneration, &e))?;

        let datum = response.data.first().ok_or_else(|| {
            collaborator_error(Stage::TileGeneration, &"response contains no images")
        })?;
        let bytes = self.fetch_image(datum)?;
        decode_rgba(&bytes).map_err(|e| collaborator_error(Stage::TileGeneration, &e))
    }
}

impl PromptRewriter for OpenAiClient {
    fn rewrite_fallback(&self, primary: &str) -> String {
        info!("Rewriting prompt without subjects");
        let answer = match self.request_rewrite(primary) {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, "Fallback prompt rewrite failed");
                return String::new();
            }
        };
        debug!(%answer, "Fallback rewrite answer");

        parse_fallback_answer(&answer).unwrap_or_else(|| {
            warn!(%answer, "Invalid fallback rewrite answer");
            String::new()
        })
    }
}

/// Instruction asking the chat model to strip subjects from `primary`
///
/// The model is asked for a JSON dictionary whose `approved` list holds
/// the phrases about style, background, time and scenery.
pub fn fallback_instruction(primary: &str) -> String {
    format!(
        "Create a JSON dictionary. Split this text into a list of short phrases that focus on \
         style, background and overall scenery, but ignoring humans and human-related items: \
         \"{primary}\". Put that list in the `descriptors` item. In the `ignored` item, list the \
         descriptors that relate to humans, human activity or human properties. In the \
         `approved` item, list the descriptors that are not ignored, keeping any that relate \
         to style or time. Output only the JSON dictionary, with no commentary."
    )
}

/// Turn the chat model's answer into a fallback prompt
///
/// Accepts the JSON dictionary with or without surrounding prose or code
/// fences. Returns `None` when no JSON object can be parsed.
pub fn parse_fallback_answer(answer: &str) -> Option<String> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    let json_text = answer.get(start..=end)?;
    let parsed: FallbackAnswer = serde_json::from_str(json_text).ok()?;

    let mut phrases: Vec<&str> = parsed
        .approved
        .iter()
        .map(|phrase| phrase.trim())
        .filter(|phrase| !phrase.is_empty())
        .collect();
    phrases.push(FALLBACK_SUFFIX);
    Some(phrases.join(", "))
}

/// Decode a base64 image payload
///
/// # Errors
///
/// Returns a collaborator error if the payload is not valid base64
pub fn decode_base64_image(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| collaborator_error(Stage::TileGeneration, &e))
}
