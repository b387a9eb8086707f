use axum::http::header::CONTENT_DISPOSITION;
use tower_http::cors::{Any, CorsLayer};

/// Open CORS policy; report downloads need their file name header exposed.
pub fn permissive_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any)
        .expose_headers([CONTENT_DISPOSITION])
}
