use crate::app_config::{AppConfig, Environment, UploadConfig};
use crate::ConfigError;

/// Load application configuration from environment variables already in the process.
///
/// Does NOT load `.env` files; the binary does that before parsing arguments.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let api_url = require("STOREFRONT_API_URL")?;
    let api_key = require("STOREFRONT_API_KEY")?;

    let env = parse_environment(&or_default("STOREFRONT_ENV", "development"))?;
    let log_level = or_default("STOREFRONT_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("STOREFRONT_REQUEST_TIMEOUT_SECS", "30")?;

    let upload = match (
        lookup("STOREFRONT_UPLOAD_CLOUD_NAME").ok(),
        lookup("STOREFRONT_UPLOAD_PRESET").ok(),
    ) {
        (Some(cloud_name), Some(upload_preset)) => Some(UploadConfig {
            base_url: or_default("STOREFRONT_UPLOAD_BASE_URL", "https://api.cloudinary.com"),
            cloud_name,
            upload_preset,
        }),
        (None, None) => None,
        (Some(_), None) => {
            return Err(ConfigError::MissingEnvVar(
                "STOREFRONT_UPLOAD_PRESET".to_string(),
            ))
        }
        (None, Some(_)) => {
            return Err(ConfigError::MissingEnvVar(
                "STOREFRONT_UPLOAD_CLOUD_NAME".to_string(),
            ))
        }
    };

    let messenger_page_id = or_default("STOREFRONT_MESSENGER_PAGE_ID", "Recreationalgearrental");
    let store_name = or_default("STOREFRONT_STORE_NAME", "Recreational Gear rental");
    let currency_symbol = or_default("STOREFRONT_CURRENCY_SYMBOL", "₱");
    let ip_lookup_url = or_default(
        "STOREFRONT_IP_LOOKUP_URL",
        "https://api.ipify.org?format=json",
    );
    let ip_lookup_timeout_secs = parse_u64("STOREFRONT_IP_LOOKUP_TIMEOUT_SECS", "3")?;

    Ok(AppConfig {
        api_url,
        api_key,
        env,
        log_level,
        request_timeout_secs,
        upload,
        messenger_page_id,
        store_name,
        currency_symbol,
        ip_lookup_url,
        ip_lookup_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "STOREFRONT_ENV".to_string(),
            reason: format!("expected development, test, or production; got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
