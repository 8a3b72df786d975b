use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Error, Result};
use crate::capture::{ImageData, PNG_MIME};

const PIN_FILE_PATH: &str = "/pinning/pinFileToIPFS";
const FILE_NAME: &str = "note.png";
const METADATA_NAME: &str = "Course Note";

/// Content-addressed storage for rendered notes.
#[async_trait]
pub trait ContentPinner: Send + Sync {
    /// Stores the image and returns its `ipfs://` URI.
    async fn pin_image(&self, image: &ImageData) -> Result<String>;
}

pub fn content_uri(hash: &str) -> String {
    format!("ipfs://{hash}")
}

/// Pinata `pinFileToIPFS` client.
pub struct PinataClient {
    client: Client,
    base_url: String,
    api_key: String,
    secret_api_key: String,
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

impl PinataClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, secret_api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            secret_api_key: secret_api_key.into(),
        }
    }

    fn form(image: &ImageData) -> Result<Form> {
        let file = Part::bytes(image.bytes().to_vec())
            .file_name(FILE_NAME)
            .mime_str(PNG_MIME)
            .map_err(|e| Error::Upload(e.to_string()))?;

        let metadata = json!({
            "name": METADATA_NAME,
            "keyvalues": {
                "date": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            }
        });

        Ok(Form::new().part("file", file).text("pinataMetadata", metadata.to_string()))
    }
}

#[async_trait]
impl ContentPinner for PinataClient {
    async fn pin_image(&self, image: &ImageData) -> Result<String> {
        let url = format!("{}{PIN_FILE_PATH}", self.base_url.trim_end_matches('/'));
        tracing::info!(size = image.bytes().len(), "pinning image");

        let response = self
            .client
            .post(&url)
            .header("pinata_api_key", &self.api_key)
            .header("pinata_secret_api_key", &self.secret_api_key)
            .multipart(Self::form(image)?)
            .send()
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = service_message(&body).unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));
            tracing::warn!(%status, "pinning failed: {message}");
            return Err(Error::Upload(message));
        }

        let pinned = response
            .json::<PinResponse>()
            .await
            .map_err(|e| Error::Upload(e.to_string()))?;

        let uri = content_uri(&pinned.ipfs_hash);
        tracing::info!(uri = %uri, "image pinned");
        Ok(uri)
    }
}

/// Extracts the human-readable part of an error body from the pinning service.
fn service_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;

    let message = value
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| value.get("error").and_then(Value::as_str))
        .or_else(|| value.pointer("/error/reason").and_then(Value::as_str))
        .or_else(|| value.pointer("/error/details").and_then(Value::as_str))?;

    Some(message.to_owned())
}
