use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "EMR + RPA Backend";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_RECORDS_FILE: &str = "heidi_patients.json";
pub const DEFAULT_STATE_FILE: &str = "patient_state.json";

/// Front-end dev servers allowed to call the API.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5173", "http://localhost:3000"];

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "emr_panel_lib=info,emr_panel=info,tower_http=warn"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime settings, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub records_file: String,
    pub state_file: String,
    pub host: IpAddr,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            records_file: DEFAULT_RECORDS_FILE.into(),
            state_file: DEFAULT_STATE_FILE.into(),
            host: IpAddr::from([0, 0, 0, 0]),
            port: DEFAULT_PORT,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank values keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get("EMR_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(name) = get("EMR_RECORDS_FILE") {
            config.records_file = name;
        }
        if let Some(name) = get("EMR_STATE_FILE") {
            config.state_file = name;
        }
        if let Some(host) = get("EMR_HOST") {
            config.host = host.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "EMR_HOST",
                value: host.clone(),
            })?;
        }
        if let Some(port) = get("PORT") {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(origins) = get("EMR_ALLOWED_ORIGINS") {
            config.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(&self.records_file)
    }

    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join(&self.state_file)
    }
}
