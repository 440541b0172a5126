// Configuration module entry point
// Layered sources: optional config.toml, built-in defaults, PORT override

mod types;

use std::net::SocketAddr;

pub use types::{AssetsConfig, Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default config file name (without extension), resolved in the working directory
const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable overriding the listening port
const PORT_ENV_VAR: &str = "PORT";

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; every key has a built-in default. The `PORT`
    /// environment variable, when set, overrides `server.port` and must
    /// parse as an integer.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("assets.dir", "public")?
            .set_default("assets.index_files", vec!["index.html".to_string()])?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("http.server_name", "flutter-stub/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?;

        if let Ok(port) = std::env::var(PORT_ENV_VAR) {
            builder = builder.set_override("server.port", port)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MISSING_CONFIG: &str = "no-such-config-file";

    // Defaults, file loading, and the PORT override share one test body:
    // PORT is process-global state, so interleaving these across parallel
    // test threads would race.
    #[test]
    fn load_layers() {
        std::env::remove_var(PORT_ENV_VAR);

        // Pure defaults
        let cfg = Config::load_from(MISSING_CONFIG).unwrap();
        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.assets.dir, "public");
        assert_eq!(cfg.assets.index_files, vec!["index.html".to_string()]);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "common");
        assert!(cfg.server.workers.is_none());
        assert!(cfg.performance.max_connections.is_none());

        // File values win over defaults
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 4000\nworkers = 2\n\n[assets]\ndir = \"www\""
        )
        .unwrap();
        let stem = dir.path().join("config");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 4000);
        assert_eq!(cfg.server.workers, Some(2));
        assert_eq!(cfg.assets.dir, "www");

        // PORT env var wins over everything
        std::env::set_var(PORT_ENV_VAR, "8080");
        let cfg = Config::load_from(MISSING_CONFIG).unwrap();
        assert_eq!(cfg.server.port, 8080);
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 8080);

        // Non-numeric PORT is a startup error, not a silent fallback
        std::env::set_var(PORT_ENV_VAR, "not-a-port");
        assert!(Config::load_from(MISSING_CONFIG).is_err());

        std::env::remove_var(PORT_ENV_VAR);
        let cfg = Config::load_from(MISSING_CONFIG).unwrap();
        assert_eq!(cfg.server.port, 3000);
    }

    // Built by hand rather than via load_from: the PORT test above owns
    // the environment and these assertions must not depend on it.
    #[test]
    fn socket_addr_from_parts() {
        let mut cfg = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                workers: None,
            },
            assets: AssetsConfig {
                dir: "public".to_string(),
                index_files: vec!["index.html".to_string()],
            },
            logging: LoggingConfig {
                access_log: false,
                access_log_format: "common".to_string(),
                access_log_file: None,
                error_log_file: None,
            },
            http: HttpConfig {
                server_name: "flutter-stub/0.1".to_string(),
                enable_cors: false,
                max_body_size: 10_485_760,
            },
            performance: PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
        };
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:3000");

        cfg.server.host = "not an address".to_string();
        assert!(cfg.socket_addr().is_err());
    }
}
