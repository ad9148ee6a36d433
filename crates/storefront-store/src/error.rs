use thiserror::Error;

/// Errors returned by the hosted backend clients.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the backend's own error text when the
    /// body carried one.
    #[error("backend returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The upload service refused the file.
    #[error("upload rejected: {0}")]
    UploadRejected(String),

    #[error("upload response did not include a secure_url")]
    MissingUploadUrl,

    /// A representation was requested but no row came back.
    #[error("{0} returned no rows")]
    EmptyResponse(String),
}

impl StoreError {
    /// The text to classify or show: the backend's message for API and upload
    /// rejections, the rendered error otherwise.
    #[must_use]
    pub fn backend_message(&self) -> String {
        match self {
            StoreError::Api { message, .. } | StoreError::UploadRejected(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}
