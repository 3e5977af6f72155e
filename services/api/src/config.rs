use anyhow::Context as _;

/// API service configuration loaded from environment variables.
#[derive(Debug)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    pub api_port: u16,
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Access-token lifetime (default 7 days). Env var: `TOKEN_TTL_SECS`.
    pub token_ttl_secs: u64,
    /// Directory uploaded images are written to (default `media`).
    pub media_root: String,
    /// URL prefix prepended to stored image paths (default `/media/`).
    pub media_url: String,
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL")?,
            api_port: std::env::var("API_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8000),
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(foodgram_auth_types::token::ACCESS_TOKEN_TTL_SECS),
            media_root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_owned()),
            media_url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_owned()),
        })
    }
}
