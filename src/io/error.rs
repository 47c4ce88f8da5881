//! Error types and context management for outpainting runs

use crate::spatial::geometry::Point;
use std::fmt;
use std::path::PathBuf;

/// External collaborator a failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Primary subject / face detection used for the focal point
    FocusDetection,
    /// Subject-of-interest detection used for prompt selection
    SubjectDetection,
    /// Scene captioning used when no primary prompt was supplied
    Description,
    /// Rewriting of the primary prompt into a subject-free fallback
    FallbackRewrite,
    /// Generative inpainting of a single tile
    TileGeneration,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FocusDetection => "focus detection",
            Self::SubjectDetection => "subject detection",
            Self::Description => "image description",
            Self::FallbackRewrite => "fallback prompt rewrite",
            Self::TileGeneration => "tile generation",
        };
        f.write_str(name)
    }
}

/// Main error type for all outpainting operations
#[derive(Debug)]
pub enum OutpaintError {
    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// Failed to encode or decode an in-memory image
    ImageEncode {
        /// What was being encoded or decoded
        operation: &'static str,
        /// Underlying codec error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Configuration parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// A service credential was neither passed nor found in the environment
    MissingCredential {
        /// Environment variable that would have supplied it
        variable: &'static str,
    },

    /// An external collaborator failed or answered with something unusable
    ///
    /// Never retried; the run stops and the canvas keeps whatever was
    /// pasted before the failure.
    Collaborator {
        /// Which collaborator failed
        stage: Stage,
        /// Tile origin being processed, when the failure is tile-specific
        tile: Option<Point>,
        /// Description of the failure
        reason: String,
    },

    /// The run was stopped between tiles
    Cancelled {
        /// Tiles processed (generated or skipped) before stopping
        completed: usize,
        /// Tiles in the plan
        total: usize,
    },

    /// An operation was invoked in a state that cannot support it
    InvariantViolation {
        /// Name of the operation
        operation: &'static str,
        /// Description of the violated invariant
        reason: String,
    },
}

impl fmt::Display for OutpaintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::ImageEncode { operation, source } => {
                write!(f, "Failed to {operation}: {source}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::MissingCredential { variable } => {
                write!(
                    f,
                    "Missing credential: pass it explicitly or set the {variable} environment variable"
                )
            }
            Self::Collaborator {
                stage,
                tile: Some(tile),
                reason,
            } => {
                write!(f, "{stage} failed at tile ({}, {}): {reason}", tile.x, tile.y)
            }
            Self::Collaborator {
                stage,
                tile: None,
                reason,
            } => {
                write!(f, "{stage} failed: {reason}")
            }
            Self::Cancelled { completed, total } => {
                write!(f, "Run cancelled after {completed} of {total} tiles")
            }
            Self::InvariantViolation { operation, reason } => {
                write!(f, "Invariant violated in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for OutpaintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. }
            | Self::ImageExport { source, .. }
            | Self::ImageEncode { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for outpainting results
pub type Result<T> = std::result::Result<T, OutpaintError>;

/// Additional context to enrich collaborator errors
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorContext {
    /// Collaborator stage the call belonged to
    pub stage: Option<Stage>,
    /// Tile origin being processed
    pub tile: Option<Point>,
}

/// Enriches collaborator errors with run state information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the tile context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the tile context applied
    fn at_tile(self, tile: Point) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<OutpaintError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only collaborator failures carry positional context
            if let OutpaintError::Collaborator { stage, tile, .. } = &mut error {
                if let Some(context_stage) = context.stage {
                    *stage = context_stage;
                }
                if context.tile.is_some() {
                    *tile = context.tile;
                }
            }
            error
        })
    }

    fn at_tile(self, tile: Point) -> Result<T> {
        self.with_context(ErrorContext {
            tile: Some(tile),
            ..Default::default()
        })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> OutpaintError {
    OutpaintError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a collaborator error without tile context
pub fn collaborator_error(stage: Stage, reason: &impl ToString) -> OutpaintError {
    OutpaintError::Collaborator {
        stage,
        tile: None,
        reason: reason.to_string(),
    }
}

/// Create an invariant violation error
pub fn invariant_violation(operation: &'static str, reason: &impl ToString) -> OutpaintError {
    OutpaintError::InvariantViolation {
        operation,
        reason: reason.to_string(),
    }
}
