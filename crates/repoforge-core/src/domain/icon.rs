//! In-memory application icon.

use base64::Engine;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::IconError;

/// Icon formats accepted from the user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IconFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl IconFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            IconFormat::Png => "image/png",
            IconFormat::Jpeg => "image/jpeg",
            IconFormat::Gif => "image/gif",
            IconFormat::WebP => "image/webp",
        }
    }

    /// Detect the format from magic bytes.
    pub fn sniff(data: &[u8]) -> Result<Self, IconError> {
        if data.len() < 4 {
            return Err(IconError::TooShort(data.len()));
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Ok(IconFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Ok(IconFormat::Jpeg);
        }
        if data.starts_with(b"GIF8") {
            return Ok(IconFormat::Gif);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Ok(IconFormat::WebP);
        }
        Err(IconError::UnsupportedFormat)
    }
}

/// The user's icon held as an encoded blob for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIcon {
    format: IconFormat,
    bytes: Vec<u8>,
}

impl AppIcon {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, IconError> {
        let format = IconFormat::sniff(&bytes)?;
        Ok(Self { format, bytes })
    }

    pub fn format(&self) -> IconFormat {
        self.format
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `data:<mime>;base64,<payload>` form of the icon.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// SHA-256 hex digest of the raw bytes.
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }
}
