use axum::http::{header, request::Parts, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::config::AppConfig;

pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let extra = config.cors_origins.clone();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| is_allowed_origin(origin, &extra))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Local development hosts, private 192.168.x.x addresses, the hosted
/// deployment domain, and any configured prefix.
pub fn is_allowed_origin(origin: &str, extra: &[String]) -> bool {
    if extra.iter().any(|allowed| origin.starts_with(allowed.as_str())) {
        return true;
    }

    let Some(rest) = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
    else {
        return false;
    };

    let (host, port) = match rest.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (rest, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
    }

    matches!(host, "localhost" | "127.0.0.1" | "0.0.0.0")
        || is_private_lan(host)
        || (host.ends_with(".ondigitalocean.app") && !host.contains('/'))
}

fn is_private_lan(host: &str) -> bool {
    let Some(tail) = host.strip_prefix("192.168.") else {
        return false;
    };
    let parts: Vec<&str> = tail.split('.').collect();
    parts.len() == 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.len() <= 3 && p.chars().all(|c| c.is_ascii_digit()))
}
