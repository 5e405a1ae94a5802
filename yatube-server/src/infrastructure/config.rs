use std::path::PathBuf;
use std::time::Duration;

use crate::infrastructure::logging::LogFormat;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub media_root: PathBuf,
    pub index_cache_ttl: Duration,
    pub session_ttl_hours: i64,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
        let port = parse_var("PORT", 8080)?;
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let database_max_connections = parse_var("DATABASE_MAX_CONNECTIONS", 20)?;
        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let media_root = std::env::var("MEDIA_ROOT")
            .unwrap_or_else(|_| "media".into())
            .into();
        let index_cache_ttl = Duration::from_secs(parse_var("INDEX_CACHE_TTL_SECS", 20)?);
        let session_ttl_hours = parse_var("SESSION_TTL_HOURS", 24)?;
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", 5 * 1024 * 1024)?;
        let log_format = parse_var("LOG_FORMAT", LogFormat::Json)?;

        Ok(Self {
            host,
            port,
            database_url,
            database_max_connections,
            jwt_secret,
            cors_origins,
            media_root,
            index_cache_ttl,
            session_ttl_hours,
            max_upload_bytes,
            log_format,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {}: {}", name, e)),
        Err(_) => Ok(default),
    }
}
