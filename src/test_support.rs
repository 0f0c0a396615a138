use std::collections::HashMap;

use crate::config::AppConfig;

pub const API_KEY: &str = "test-api-key";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const ADMIN_KEY: &str = "test-admin-key";

pub fn config_with(base_url: &str, overrides: &[(&str, &str)]) -> AppConfig {
    let mut vars: HashMap<String, String> = [
        ("API_BASE_URL", base_url),
        ("API_KEY", API_KEY),
        ("WEBHOOK_SECRET", WEBHOOK_SECRET),
        ("ADMIN_API_KEY", ADMIN_KEY),
        ("SUCCESS_URL", "https://portal.example/success"),
        ("ERROR_URL", "https://portal.example/error"),
        ("GATEWAY_TIMEOUT_SECS", "5"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    AppConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

pub fn test_config(base_url: &str) -> AppConfig {
    config_with(base_url, &[])
}
