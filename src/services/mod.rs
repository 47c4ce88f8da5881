//! Contracts for the external services the outpainter depends on
//!
//! The orchestrator only sees these traits, so any implementation (HTTP
//! clients, local models, test doubles) can be substituted.

use crate::io::configuration::TileSize;
use crate::io::error::Result;
use crate::spatial::geometry::Rect;
use image::RgbaImage;

/// Hosted captioning and object detection
pub mod huggingface;
/// Hosted image editing and prompt rewriting
pub mod openai;

/// Locates the primary subject used as the focal point
pub trait FocusDetector {
    /// Best-effort primary subject box in image-local coordinates
    ///
    /// # Errors
    ///
    /// Returns a collaborator error if the detector cannot be reached or
    /// answers with something unusable
    fn detect_focus(&self, image: &RgbaImage) -> Result<Option<Rect>>;
}

/// Finds every subject of interest in an image
pub trait SubjectDetector {
    /// Zero or more subject boxes in image-local coordinates
    ///
    /// # Errors
    ///
    /// Returns a collaborator error if the detector cannot be reached or
    /// answers with something unusable
    fn detect_subjects(&self, image: &RgbaImage) -> Result<Vec<Rect>>;
}

/// Produces a natural-language description of a scene
pub trait SceneDescriber {
    /// Describe `image` for use as the primary prompt
    ///
    /// # Errors
    ///
    /// Returns a collaborator error if the captioning service fails
    fn describe(&self, image: &RgbaImage) -> Result<String>;
}

/// Derives a subject-free variant of a prompt
pub trait PromptRewriter {
    /// Rewrite `primary` to describe only the surroundings
    ///
    /// Never fails: an unusable upstream answer yields an empty string.
    fn rewrite_fallback(&self, primary: &str) -> String;
}

/// Generates replacement content for one tile
pub trait TileGenerator {
    /// Return a newly generated `tile_size` square for the PNG-encoded tile
    ///
    /// Transparent pixels in `tile_png` mark the area to fill.
    ///
    /// # Errors
    ///
    /// Returns a collaborator error on transport or service failure
    fn generate_tile(&self, tile_png: &[u8], prompt: &str, tile_size: TileSize)
    -> Result<RgbaImage>;
}
