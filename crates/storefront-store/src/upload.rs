//! Unsigned multipart image upload to the hosted media service.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use storefront_checkout::ImagePayload;
use storefront_core::UploadConfig;

use crate::error::StoreError;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorBody {
    error: UploadErrorDetail,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: Url,
    upload_preset: String,
}

impl UploadClient {
    /// Builds the client for `{base_url}/v1_1/{cloud_name}/image/upload`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidBaseUrl`] if the
    /// resulting endpoint does not parse.
    pub fn new(config: &UploadConfig, timeout_secs: u64) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let raw = format!(
            "{}/v1_1/{}/image/upload",
            config.base_url.trim_end_matches('/'),
            config.cloud_name
        );
        let endpoint = Url::parse(&raw).map_err(|e| StoreError::InvalidBaseUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            upload_preset: config.upload_preset.clone(),
        })
    }

    /// Uploads one image and returns its public HTTPS URL.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UploadRejected`] when the service refuses the file.
    /// - [`StoreError::MissingUploadUrl`] when the success body has no URL.
    /// - [`StoreError::Http`] on network failure.
    /// - [`StoreError::Deserialize`] if the success body does not parse.
    pub async fn upload_image(&self, image: &ImagePayload) -> Result<String, StoreError> {
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone());

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let reason = serde_json::from_str::<UploadErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| format!("upload service returned {status}"));
            tracing::warn!(file = %image.file_name, %status, %reason, "upload rejected");
            return Err(StoreError::UploadRejected(reason));
        }

        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Deserialize {
                context: "image upload".to_string(),
                source: e,
            })?;
        parsed.secure_url.ok_or(StoreError::MissingUploadUrl)
    }
}
