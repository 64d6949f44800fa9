use std::time::Duration;

use circle_pipeline::DubConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development
/// except the Murf API key. In production, override via environment
/// variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Interval between WebSocket keep-alive pings, in seconds
    /// (default: `30`).
    pub heartbeat_interval_secs: u64,
    /// Base URL of the Murf dubbing API.
    pub murf_api_url: String,
    /// Murf account API key. Empty when unset; dub submissions will
    /// then fail at the gateway and be reported per listener.
    pub murf_api_key: String,
    /// Dub pipeline tunables (poll interval, attempt budget, limits).
    pub dub: DubConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                 |
    /// |-----------------------------|-------------------------|
    /// | `HOST`                      | `0.0.0.0`               |
    /// | `PORT`                      | `3000`                  |
    /// | `CORS_ORIGINS`              | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                    |
    /// | `HEARTBEAT_INTERVAL_SECS`   | `30`                    |
    /// | `MURF_API_URL`              | `https://api.murf.ai`   |
    /// | `MURF_API_KEY`              | (empty)                 |
    /// | `DUB_POLL_INTERVAL_SECS`    | `5`                     |
    /// | `DUB_MAX_POLL_ATTEMPTS`     | `30`                    |
    /// | `DUB_DOWNLOAD_TIMEOUT_SECS` | `30`                    |
    /// | `DUB_MAX_JOBS_PER_LISTENER` | `8`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let heartbeat_interval_secs = env_u64("HEARTBEAT_INTERVAL_SECS", 30);

        let murf_api_url = std::env::var("MURF_API_URL")
            .unwrap_or_else(|_| circle_murf::api::DEFAULT_API_URL.into());

        let murf_api_key = std::env::var("MURF_API_KEY").unwrap_or_default();

        let defaults = DubConfig::default();
        let dub = DubConfig {
            poll_interval: Duration::from_secs(env_u64(
                "DUB_POLL_INTERVAL_SECS",
                defaults.poll_interval.as_secs(),
            )),
            max_attempts: env_u64("DUB_MAX_POLL_ATTEMPTS", defaults.max_attempts as u64) as u32,
            download_timeout: Duration::from_secs(env_u64(
                "DUB_DOWNLOAD_TIMEOUT_SECS",
                defaults.download_timeout.as_secs(),
            )),
            max_jobs_per_listener: env_u64(
                "DUB_MAX_JOBS_PER_LISTENER",
                defaults.max_jobs_per_listener as u64,
            ) as usize,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            heartbeat_interval_secs,
            murf_api_url,
            murf_api_key,
            dub,
        }
    }
}

/// Read a u64 environment variable, falling back to `default`.
fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("{name} must be a valid u64")),
        Err(_) => default,
    }
}
