//! Centralized configuration (environment variables + defaults).

/// Database URL must be provided (no default) for safety.
pub fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set")
}

/// Shared secret expected in the `X-Service-Key` header (required).
pub fn service_internal_key() -> String {
    std::env::var("SERVICE_INTERNAL_KEY").expect("SERVICE_INTERNAL_KEY must be set")
}

/// Listen address for the HTTP server.
pub fn bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}
