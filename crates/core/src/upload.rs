//! Image upload validation and JPEG re-encoding.
//!
//! Only the in-memory part lives here: size and type checks, content
//! sniffing, and recompression. Writing the result to storage is the API
//! layer's job.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageFormat};

/// Extensions accepted for product and category images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// Default upload ceiling: 40 000 KiB.
pub const DEFAULT_MAX_BYTES: usize = 40_000 * 1024;

/// Default JPEG re-encoding quality.
pub const DEFAULT_JPEG_QUALITY: u8 = 50;

/// A file part taken from a multipart body.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Browsers send an empty part with no filename when no file was picked.
    pub fn is_empty(&self) -> bool {
        self.file_name.is_empty() && self.bytes.is_empty()
    }

    /// Lowercased extension of the client-side file name.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Limits applied to an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePolicy {
    pub max_bytes: usize,
    /// JPEG quality 1-100; `None` keeps the uploaded JPEG bytes unchanged.
    pub quality: Option<u8>,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            quality: Some(DEFAULT_JPEG_QUALITY),
        }
    }
}

/// Validated image bytes and the extension to store them under.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bytes: Vec<u8>,
    pub extension: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("The image field is required.")]
    Missing,

    #[error("The image may not be greater than {max_kib} kilobytes.")]
    TooLarge { max_kib: usize },

    #[error("The image must be a file of type: jpeg, jpg, png.")]
    DisallowedType,

    #[error("The image could not be read: {0}")]
    Unreadable(String),
}

/// Validate an uploaded image and re-encode JPEGs at the policy quality.
///
/// The extension must be one of [`ALLOWED_EXTENSIONS`] and the content must
/// sniff as the same family (JPEG or PNG). PNGs are stored as uploaded.
pub fn prepare_image(file: &UploadedFile, policy: &ImagePolicy) -> Result<PreparedImage, UploadError> {
    if file.is_empty() || file.bytes.is_empty() {
        return Err(UploadError::Missing);
    }
    if file.bytes.len() > policy.max_bytes {
        return Err(UploadError::TooLarge {
            max_kib: policy.max_bytes / 1024,
        });
    }

    let declared = file
        .extension()
        .filter(|ext| ALLOWED_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(UploadError::DisallowedType)?;

    let sniffed = image::guess_format(&file.bytes).map_err(|_| UploadError::DisallowedType)?;
    let declared_format = if declared == "png" {
        ImageFormat::Png
    } else {
        ImageFormat::Jpeg
    };
    if sniffed != declared_format {
        return Err(UploadError::DisallowedType);
    }

    match sniffed {
        ImageFormat::Png => {
            image::load_from_memory_with_format(&file.bytes, ImageFormat::Png)
                .map_err(|e| UploadError::Unreadable(e.to_string()))?;
            Ok(PreparedImage {
                bytes: file.bytes.clone(),
                extension: "png",
            })
        }
        ImageFormat::Jpeg => {
            let bytes = match policy.quality {
                Some(quality) => reencode_jpeg(&file.bytes, quality)?,
                None => {
                    image::load_from_memory_with_format(&file.bytes, ImageFormat::Jpeg)
                        .map_err(|e| UploadError::Unreadable(e.to_string()))?;
                    file.bytes.clone()
                }
            };
            Ok(PreparedImage {
                bytes,
                extension: "jpg",
            })
        }
        _ => Err(UploadError::DisallowedType),
    }
}

fn reencode_jpeg(bytes: &[u8], quality: u8) -> Result<Vec<u8>, UploadError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| UploadError::Unreadable(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| UploadError::Unreadable(e.to_string()))?;
    Ok(out.into_inner())
}
