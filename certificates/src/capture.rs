//! Rendered note images as handed over by the page's rasterizer.

use base64::{engine::general_purpose::STANDARD, Engine as _};

pub const PNG_MIME: &str = "image/png";

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("image data is empty")]
    Empty,
    #[error("unsupported data URI: {0}")]
    UnsupportedUri(String),
    #[error("image is not a PNG")]
    NotPng,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}

/// Decoded image bytes together with the media type declared by the data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    mime: String,
    bytes: Vec<u8>,
}

impl ImageData {
    /// Accepts `data:image/<type>;base64,<payload>` or a bare base64 payload, which is
    /// taken to be a PNG.
    pub fn from_data_uri(input: &str) -> Result<Self, Error> {
        let input = input.trim();

        let (mime, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| Error::UnsupportedUri(truncate(input)))?;
                let mime = header
                    .strip_suffix(";base64")
                    .filter(|mime| mime.starts_with("image/"))
                    .ok_or_else(|| Error::UnsupportedUri(truncate(input)))?;
                (mime.to_owned(), payload)
            }
            None => (PNG_MIME.to_owned(), input),
        };

        if payload.is_empty() {
            return Err(Error::Empty);
        }

        let bytes = STANDARD.decode(payload)?;
        Ok(Self { mime, bytes })
    }

    pub fn from_png(bytes: Vec<u8>) -> Self {
        Self {
            mime: PNG_MIME.to_owned(),
            bytes,
        }
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_png(&self) -> bool {
        self.bytes.starts_with(&PNG_SIGNATURE)
    }

    /// Rejects anything that does not carry the PNG signature.
    pub fn require_png(self) -> Result<Self, Error> {
        if self.is_png() {
            Ok(self)
        } else {
            Err(Error::NotPng)
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// File name offered when a note is downloaded as an image.
pub fn export_file_name(note_id: i64) -> String {
    format!("note-{note_id}.png")
}

fn truncate(input: &str) -> String {
    input.chars().take(32).collect()
}
