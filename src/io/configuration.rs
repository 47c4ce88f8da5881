//! Service endpoints, model names and runtime configuration defaults

use crate::io::error::{OutpaintError, invalid_parameter};
use std::fmt;

/// Square tile sizes accepted by the image-edit endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileSize {
    /// 256 x 256 tiles
    Small,
    /// 512 x 512 tiles
    Medium,
    /// 1024 x 1024 tiles
    #[default]
    Large,
}

impl TileSize {
    /// Every supported size, smallest first
    pub const SUPPORTED: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Side length in pixels
    pub const fn pixels(self) -> u32 {
        match self {
            Self::Small => 256,
            Self::Medium => 512,
            Self::Large => 1024,
        }
    }

    /// Step used when none is configured: half a tile
    pub const fn default_step(self) -> u32 {
        self.pixels() / 2
    }
}

impl TryFrom<u32> for TileSize {
    type Error = OutpaintError;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        Self::SUPPORTED
            .into_iter()
            .find(|size| size.pixels() == pixels)
            .ok_or_else(|| {
                invalid_parameter("tile_size", &pixels, &"must be one of 256, 512 or 1024")
            })
    }
}

impl fmt::Display for TileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = self.pixels();
        write!(f, "{side}x{side}")
    }
}

// Service endpoints
/// Base URL of the generative inpainting and chat API
pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
/// Base URL of the hosted inference API for captioning and detection
pub const HF_API_BASE: &str = "https://api-inference.huggingface.co/models";
/// Environment variable holding the inpainting service key
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
/// Environment variable holding the inference service token
pub const HF_API_KEY_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";
/// Per-request timeout applied by the HTTP clients
pub const REQUEST_TIMEOUT_SECS: u64 = 300;
/// Connection timeout applied by the HTTP clients
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

// Models
/// Captioning model used to describe the input image
pub const DEFAULT_DESCRIPTION_MODEL: &str = "Salesforce/blip2-opt-2.7b";
/// Object detection model used to find subjects
pub const DEFAULT_DETECTION_MODEL: &str = "facebook/detr-resnet-50";
/// Chat model used to rewrite the fallback prompt
pub const FALLBACK_REWRITE_MODEL: &str = "gpt-3.5-turbo";

// Detection filtering
/// Detection label treated as a subject of interest
pub const SUBJECT_LABEL: &str = "person";
/// Minimum detection confidence for a subject box
pub const SUBJECT_MIN_SCORE: f64 = 0.6;

// Output settings
/// Suffix added to the input stem for the default output name
pub const OUTPUT_SUFFIX: &str = "_outpainted";
/// `chrono` format of snapshot timestamps
pub const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Phrase appended to rewritten fallback prompts
pub const FALLBACK_SUFFIX: &str = "no humans";
