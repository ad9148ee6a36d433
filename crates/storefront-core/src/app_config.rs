use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Credentials and endpoints for the upload service. Present only when both
/// the cloud name and the upload preset are configured.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

impl std::fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadConfig")
            .field("base_url", &self.base_url)
            .field("cloud_name", &self.cloud_name)
            .field("upload_preset", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub api_key: String,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub upload: Option<UploadConfig>,
    pub messenger_page_id: String,
    pub store_name: String,
    pub currency_symbol: String,
    pub ip_lookup_url: String,
    pub ip_lookup_timeout_secs: u64,
}

impl AppConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn ip_lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.ip_lookup_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("upload", &self.upload)
            .field("messenger_page_id", &self.messenger_page_id)
            .field("store_name", &self.store_name)
            .field("currency_symbol", &self.currency_symbol)
            .field("ip_lookup_url", &self.ip_lookup_url)
            .field("ip_lookup_timeout_secs", &self.ip_lookup_timeout_secs)
            .finish()
    }
}
