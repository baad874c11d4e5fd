//! Food photos as `data:<mime>;base64,<data>` URIs.
//!
//! Raw images are downscaled to at most 1024px on the longest edge and
//! re-encoded as JPEG before they are sent to a vision model.

use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::error::GatewayError;

/// Maximum dimension (width or height) for photos sent to vision APIs.
pub const MAX_IMAGE_DIMENSION: u32 = 1024;

/// A syntactically valid image data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoDataUri {
    uri: String,
    mime_end: usize,
}

impl PhotoDataUri {
    /// Validate a data URI: `data:` prefix, an `image/*` MIME type, the
    /// `;base64,` marker and a payload that decodes.
    pub fn parse(uri: &str) -> Result<Self, GatewayError> {
        let invalid = |reason: &str| GatewayError::InvalidPhoto(reason.to_string());

        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| invalid("expected a 'data:' URI"))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| invalid("expected ';base64,' after the MIME type"))?;

        let (kind, subtype) = mime
            .split_once('/')
            .ok_or_else(|| invalid("MIME type must look like 'image/jpeg'"))?;
        if kind != "image" || subtype.is_empty() {
            return Err(invalid("MIME type must be an image type"));
        }
        if subtype.contains(';') || subtype.contains(char::is_whitespace) {
            return Err(invalid("MIME type must not carry parameters"));
        }
        if payload.is_empty() {
            return Err(invalid("image payload is empty"));
        }
        STANDARD
            .decode(payload)
            .map_err(|e| GatewayError::InvalidPhoto(format!("payload is not base64: {}", e)))?;

        Ok(Self {
            uri: uri.to_string(),
            mime_end: "data:".len() + mime.len(),
        })
    }

    /// Load, downscale and JPEG-encode raw image bytes (JPEG, PNG, WebP, ...).
    pub fn from_image_bytes(image_bytes: &[u8]) -> Result<Self, GatewayError> {
        let img = image::load_from_memory(image_bytes).map_err(|e| {
            GatewayError::InvalidPhoto(format!(
                "Failed to load image: {}. Ensure it's a valid JPEG/PNG/WebP.",
                e
            ))
        })?;
        info!("Loaded photo: {}x{}", img.width(), img.height());

        let resized = resize_if_needed(img, MAX_IMAGE_DIMENSION);
        let jpeg_bytes = encode_to_jpeg(&resized)?;
        info!(
            "Prepared photo: {}x{}, {} JPEG bytes",
            resized.width(),
            resized.height(),
            jpeg_bytes.len()
        );

        let mime = "image/jpeg";
        Ok(Self {
            uri: format!("data:{};base64,{}", mime, STANDARD.encode(&jpeg_bytes)),
            mime_end: "data:".len() + mime.len(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.uri
    }

    /// MIME type, e.g. `image/png`.
    pub fn mime_type(&self) -> &str {
        &self.uri["data:".len()..self.mime_end]
    }

    /// Base64 payload without the URI header.
    pub fn base64_data(&self) -> &str {
        &self.uri[self.mime_end + ";base64,".len()..]
    }
}

impl FromStr for PhotoDataUri {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhotoDataUri::parse(s)
    }
}

impl fmt::Display for PhotoDataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

impl Serialize for PhotoDataUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.uri)
    }
}

/// Resize image if either dimension exceeds max, maintaining aspect ratio.
fn resize_if_needed(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= max_dimension && height <= max_dimension {
        return img;
    }

    let scale = max_dimension as f32 / width.max(height) as f32;
    let new_width = (width as f32 * scale) as u32;
    let new_height = (height as f32 * scale) as u32;

    img.resize(new_width, new_height, image::imageops::FilterType::Lanczos3)
}

fn encode_to_jpeg(img: &DynamicImage) -> Result<Vec<u8>, GatewayError> {
    let mut buffer = Cursor::new(Vec::new());
    // JPEG has no alpha channel
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_to(&mut buffer, ImageFormat::Jpeg)
        .map_err(|e| GatewayError::InvalidPhoto(format!("Failed to encode image to JPEG: {}", e)))?;
    Ok(buffer.into_inner())
}
