//! `data:image/<ext>;base64,<payload>` decoding.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::error::ApiError;

pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// Largest decoded image accepted.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

pub fn parse_data_uri(input: &str) -> Result<DecodedImage, ApiError> {
    let (header, payload) = input
        .trim()
        .split_once(";base64,")
        .ok_or(ApiError::InvalidImage)?;
    let extension = header
        .strip_prefix("data:image/")
        .map(str::to_ascii_lowercase)
        .ok_or(ApiError::InvalidImage)?;
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::InvalidImage);
    }
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| ApiError::InvalidImage)?;
    if bytes.is_empty() || bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::InvalidImage);
    }
    Ok(DecodedImage { extension, bytes })
}
