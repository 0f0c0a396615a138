// config.rs
use std::env;
use std::time::Duration;

use crate::errors::{AppError, Result};

const DEFAULT_API_BASE_URL: &str = "https://hpg-backend-6kzwb.ondigitalocean.app/api/v1";
const DEFAULT_SUCCESS_URL: &str = "https://hpg-frontend-m3vhq.ondigitalocean.app/payment/success";
const DEFAULT_ERROR_URL: &str = "https://hpg-frontend-m3vhq.ondigitalocean.app/payment/error";

/// How inbound webhooks are authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookVerification {
    Signed { secret: String },
    /// Explicitly enabled with `WEBHOOK_ALLOW_UNSIGNED=true`.
    Unsigned,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub webhook: WebhookVerification,
    pub currency: String,
    pub business_name: String,
    pub default_success_url: String,
    pub default_error_url: String,
    pub admin_api_key: Option<String>,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub gateway_timeout: Duration,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("API_KEY")
            .ok_or_else(|| AppError::configuration("API_KEY must be set"))?;

        let allow_unsigned = match get("WEBHOOK_ALLOW_UNSIGNED") {
            Some(value) => parse_bool(&value).ok_or_else(|| {
                AppError::configuration(format!("WEBHOOK_ALLOW_UNSIGNED must be true or false, got {}", value))
            })?,
            None => false,
        };

        let webhook = match get("WEBHOOK_SECRET") {
            Some(secret) => WebhookVerification::Signed { secret },
            None if allow_unsigned => WebhookVerification::Unsigned,
            None => {
                return Err(AppError::configuration(
                    "WEBHOOK_SECRET must be set (or WEBHOOK_ALLOW_UNSIGNED=true to accept unsigned webhooks)",
                ))
            }
        };

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| AppError::configuration(format!("PORT must be a number, got {}", value)))?,
            None => 3001,
        };

        let timeout_secs: u64 = match get("GATEWAY_TIMEOUT_SECS") {
            Some(value) => value.parse().map_err(|_| {
                AppError::configuration(format!("GATEWAY_TIMEOUT_SECS must be a number, got {}", value))
            })?,
            None => 30,
        };

        let cors_origins = get("CORS_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(AppConfig {
            api_base_url: get("API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            api_key,
            webhook,
            currency: get("CURRENCY").unwrap_or_else(|| "GMD".to_string()),
            business_name: get("BUSINESS_NAME").unwrap_or_else(|| "LE.SS WiFi".to_string()),
            default_success_url: get("SUCCESS_URL").unwrap_or_else(|| DEFAULT_SUCCESS_URL.to_string()),
            default_error_url: get("ERROR_URL").unwrap_or_else(|| DEFAULT_ERROR_URL.to_string()),
            admin_api_key: get("ADMIN_API_KEY"),
            cors_origins,
            environment: get("APP_ENV").unwrap_or_else(|| "production".to_string()),
            gateway_timeout: Duration::from_secs(timeout_secs),
            port,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        })
    }

    /// Raw transport and internal error text is only sent to clients in development.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn webhook_signing_enabled(&self) -> bool {
        matches!(self.webhook, WebhookVerification::Signed { .. })
    }

    pub fn get_config_info(&self) -> serde_json::Value {
        serde_json::json!({
            "environment": self.environment,
            "api_base_url": self.api_base_url,
            "currency": self.currency,
            "business_name": self.business_name,
            "webhook_signing": self.webhook_signing_enabled(),
            "admin_listing_enabled": self.admin_api_key.is_some(),
            "gateway_timeout_secs": self.gateway_timeout.as_secs(),
            "port": self.port,
            "host": self.host,
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_required_values_set() {
        let config = config_from(&[("API_KEY", "key"), ("WEBHOOK_SECRET", "whsec")]).unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.currency, "GMD");
        assert_eq!(config.port, 3001);
        assert_eq!(config.gateway_timeout, Duration::from_secs(30));
        assert_eq!(
            config.webhook,
            WebhookVerification::Signed { secret: "whsec".into() }
        );
        assert!(config.admin_api_key.is_none());
        assert!(!config.is_development());
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = config_from(&[("WEBHOOK_SECRET", "whsec")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn missing_webhook_secret_requires_explicit_opt_out() {
        assert!(config_from(&[("API_KEY", "key")]).is_err());
        assert!(config_from(&[("API_KEY", "key"), ("WEBHOOK_ALLOW_UNSIGNED", "false")]).is_err());

        let config = config_from(&[("API_KEY", "key"), ("WEBHOOK_ALLOW_UNSIGNED", "true")]).unwrap();
        assert_eq!(config.webhook, WebhookVerification::Unsigned);
    }

    #[test]
    fn invalid_numbers_are_configuration_errors() {
        let err = config_from(&[("API_KEY", "key"), ("WEBHOOK_SECRET", "s"), ("PORT", "http")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigurationError(_)));
    }

    #[test]
    fn base_url_and_cors_origins_are_normalized() {
        let config = config_from(&[
            ("API_KEY", "key"),
            ("WEBHOOK_SECRET", "s"),
            ("API_BASE_URL", "http://gateway.local/api/v1/"),
            ("CORS_ORIGINS", "https://portal.example, ,http://10.0.0.1"),
            ("APP_ENV", "Development"),
        ])
        .unwrap();

        assert_eq!(config.api_base_url, "http://gateway.local/api/v1");
        assert_eq!(config.cors_origins, vec!["https://portal.example", "http://10.0.0.1"]);
        assert!(config.is_development());
    }
}
