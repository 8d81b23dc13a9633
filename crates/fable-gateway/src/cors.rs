//! Allowed-origin policy for the inbound surface.
//!
//! Exact allow-list for the known front-end deployments, plus acceptance of
//! any HTTPS origin under the trusted `rpg-play-ai.com` family.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:4200",
    "https://dnd-ai.pages.dev",
    "https://rpg-play-ai.com",
    "https://app.rpg-play-ai.com",
];

const TRUSTED_ORIGIN_SUFFIX: &str = ".rpg-play-ai.com";

pub fn is_allowed_origin(origin: &str) -> bool {
    if ALLOWED_ORIGINS.contains(&origin) {
        return true;
    }

    origin
        .strip_prefix("https://")
        .map(|host| host.ends_with(TRUSTED_ORIGIN_SUFFIX) && !host.contains('/'))
        .unwrap_or(false)
}

pub fn build_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.to_str().map(is_allowed_origin).unwrap_or(false)
        }))
        .allow_methods([
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::PATCH,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
