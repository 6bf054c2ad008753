use crate::auth::jwt::JwtConfig;
use crate::cookies::CookieConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secrets have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Frontend base URL used for email links and payment redirects.
    pub frontend_url: String,
    /// JWT token configuration (secrets, expiry durations).
    pub jwt: JwtConfig,
    /// Auth cookie attribute configuration.
    pub cookies: CookieConfig,
    /// Template image upload configuration.
    pub uploads: UploadConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `8000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                    |
    /// | `FRONTEND_URL`         | `http://localhost:3000` |
    ///
    /// Also loads [`JwtConfig`], [`CookieConfig`], and [`UploadConfig`] from
    /// their own environment variables.
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable fails to parse or a JWT secret is
    /// missing (see [`JwtConfig::from_env`]).
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let frontend_url = std::env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            frontend_url,
            jwt: JwtConfig::from_env(),
            cookies: CookieConfig::from_env(),
            uploads: UploadConfig::from_env(),
        }
    }
}

/// Default maximum upload size: 10 MB.
const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Configuration for template image uploads.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory where uploaded images are stored (default: `uploads`).
    pub dir: String,
    /// Maximum accepted upload size in bytes (default: 10 MB).
    pub max_file_size: usize,
}

impl UploadConfig {
    /// Load upload configuration from environment variables.
    ///
    /// | Env Var         | Default    |
    /// |-----------------|------------|
    /// | `UPLOAD_DIR`    | `uploads`  |
    /// | `MAX_FILE_SIZE` | `10485760` |
    pub fn from_env() -> Self {
        let dir = std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into());

        let max_file_size: usize = std::env::var("MAX_FILE_SIZE")
            .unwrap_or_else(|_| DEFAULT_MAX_FILE_SIZE.to_string())
            .parse()
            .expect("MAX_FILE_SIZE must be a valid usize");

        Self { dir, max_file_size }
    }
}
