//! Iterative outpainting: grows an image to a larger canvas one square tile at a time
//!
//! The original is placed on the canvas around a focal point, a deterministic
//! direction-ordered plan of overlapping tiles is derived for the uncovered
//! area, and each tile is filled by an external generative inpainting
//! service guided by a primary or fallback prompt.

#![forbid(unsafe_code)]

/// Run orchestration, canvas state and prompt selection
pub mod algorithm;
/// Input/output operations, configuration and error handling
pub mod io;
/// Contracts and HTTP clients for the external services
pub mod services;
/// Canvas geometry, tile planning and region classification
pub mod spatial;

pub use io::error::{OutpaintError, Result};
