//! Image loading, lossless export and snapshot naming

use crate::io::configuration::{OUTPUT_SUFFIX, SNAPSHOT_TIMESTAMP_FORMAT};
use crate::io::error::{OutpaintError, Result};
use crate::spatial::geometry::Dimensions;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load an image from disk and convert it to RGBA
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable or in an
/// unsupported format
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|source| OutpaintError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.into_rgba8();
    info!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "Loaded input image"
    );
    Ok(rgba)
}

/// Save an image as PNG at `path`, creating parent directories
///
/// # Errors
///
/// Returns an error if:
/// - The parent directory cannot be created
/// - The image cannot be written to the specified path
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OutpaintError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source: e,
        })?;
    }

    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| OutpaintError::ImageExport {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Encode an image as PNG bytes for transport
///
/// # Errors
///
/// Returns an error if PNG encoding fails
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|source| OutpaintError::ImageEncode {
            operation: "encode tile as PNG",
            source,
        })?;
    Ok(buffer.into_inner())
}

/// Decode image bytes in any supported format into RGBA
///
/// # Errors
///
/// Returns an error if the bytes are not a decodable image
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(image::DynamicImage::into_rgba8)
        .map_err(|source| OutpaintError::ImageEncode {
            operation: "decode image",
            source,
        })
}

/// Current local time formatted for snapshot names
pub fn timestamp() -> String {
    chrono::Local::now()
        .format(SNAPSHOT_TIMESTAMP_FORMAT)
        .to_string()
}

/// `{stem}-{timestamp}-{tile}.png` beside `output_path`
///
/// Timestamps have one-second resolution, so the tile's position in the
/// visit order keeps snapshots taken within the same second apart.
pub fn snapshot_path(output_path: &Path, timestamp: &str, tile: usize) -> PathBuf {
    let stem = output_path.file_stem().unwrap_or_default();
    let snapshot_name = format!("{}-{timestamp}-{tile:03}.png", stem.to_string_lossy());

    if let Some(parent) = output_path.parent() {
        parent.join(snapshot_name)
    } else {
        PathBuf::from(snapshot_name)
    }
}

/// `{stem}_outpainted-{W}x{H}.png` beside `input_path`
pub fn default_output_path(input_path: &Path, canvas: Dimensions) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let output_name = format!(
        "{}{OUTPUT_SUFFIX}-{}x{}.png",
        stem.to_string_lossy(),
        canvas.width,
        canvas.height
    );

    if let Some(parent) = input_path.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}
