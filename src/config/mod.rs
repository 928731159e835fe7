// Configuration module entry point
// Manages application configuration and runtime state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, FixtureConfig, LoggingConfig};

/// Config file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "fake_syno";

/// Environment variable prefix, e.g. `FAKE_SYNO_SERVER__PORT`
const ENV_PREFIX: &str = "FAKE_SYNO";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Missing file is fine; environment and defaults fill the gaps
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        Self::load_layered(config_path, env_source(None))
    }

    fn load_layered(
        config_path: &str,
        env: config::Environment,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(env)
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8888)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("fixture.sid", 1)?
            .set_default("fixture.seed_demo_tasks", true)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Environment layer; `vars` replaces the process environment when given
fn env_source(vars: Option<config::Map<String, String>>) -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .source(vars)
}

#[cfg(test)]
impl Config {
    /// What `load_from` yields with no config file and a clean environment
    pub fn shipped_defaults() -> Self {
        Self::load_layered("does/not/exist/fake_syno", env_source(Some(config::Map::new())))
            .unwrap()
    }

    /// Fixed values for handler tests: ephemeral port, empty task list
    pub fn for_tests() -> Self {
        Self {
            server: types::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                workers: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                access_log: false,
                access_log_format: "combined".to_string(),
                log_file: None,
            },
            performance: types::PerformanceConfig {
                keep_alive_timeout: 75,
                read_timeout: 30,
                write_timeout: 30,
                max_connections: None,
            },
            fixture: FixtureConfig {
                sid: 1,
                seed_demo_tasks: false,
                seed_file: None,
            },
        }
    }
}
