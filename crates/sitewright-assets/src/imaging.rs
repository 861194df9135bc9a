//! Raster image optimization.
//!
//! JPEG files are re-encoded at a fixed quality. Every other format passes
//! through unchanged, and a re-encode that would grow the file is discarded.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::ImageFormat;

use crate::error::AssetError;

/// JPEG quality used by the documentation build.
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// What happened to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    /// Re-encoded and smaller than the original
    Recompressed,
    /// Written unchanged
    Copied,
}

/// Result of optimizing a single image.
#[derive(Debug)]
pub struct OptimizedImage {
    pub bytes: Vec<u8>,
    pub action: ImageAction,
}

/// Whether a path names a JPEG file (extension match is case-insensitive).
pub fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Optimize image bytes read from `path`.
pub fn optimize_image(path: &Path, bytes: Vec<u8>, quality: u8) -> Result<OptimizedImage, AssetError> {
    if !is_jpeg(path) {
        return Ok(OptimizedImage {
            bytes,
            action: ImageAction::Copied,
        });
    }

    let recompressed = recompress_jpeg(&bytes, quality)?;
    if recompressed.len() < bytes.len() {
        Ok(OptimizedImage {
            bytes: recompressed,
            action: ImageAction::Recompressed,
        })
    } else {
        Ok(OptimizedImage {
            bytes,
            action: ImageAction::Copied,
        })
    }
}

/// Decode a JPEG and encode it again at `quality`.
fn recompress_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, AssetError> {
    let img = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)?;
    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, quality);
    img.write_with_encoder(encoder)?;
    Ok(out.into_inner())
}
