// Configuration module entry point
// Loads layered configuration and owns the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use state::AppState;
pub use types::{
    Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig, RoutesConfig,
    ServerConfig, StorageConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `EVS_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "EVS";

impl Config {
    /// Load configuration from the default `config.toml` if present
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; environment variables override it and built-in
    /// defaults fill whatever neither provides.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8000)?
            .set_default("storage.dir", "emergency_videos")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 300)?
            .set_default("http.server_name", "emergency-video-server")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 536_870_912)? // 512MB
            .build()?;

        settings.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Deadline for a client to finish sending request headers
    pub const fn header_read_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.read_timeout)
    }

    /// Longest gap allowed between two chunks of an upload body
    ///
    /// Applies per chunk, so a slow but steady upload is never cut off.
    pub const fn body_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.performance.write_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.storage.dir, "emergency_videos");
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.http.max_body_size, 536_870_912);
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.routes.health.liveness_path, "/healthz");
        assert!(cfg.server.workers.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9100\n\n[storage]\ndir = \"/tmp/videos\"\n",
        )
        .unwrap();

        let base = path.with_extension("");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.storage.dir, "/tmp/videos");
        assert_eq!(cfg.server.host, "127.0.0.1");
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8000);

        cfg.server.host = "not an address".to_string();
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_timeouts() {
        let mut cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.header_read_timeout(), Duration::from_secs(30));
        assert_eq!(cfg.body_idle_timeout(), Duration::from_secs(300));

        cfg.performance.write_timeout = 5;
        assert_eq!(cfg.body_idle_timeout(), Duration::from_secs(5));
    }
}
