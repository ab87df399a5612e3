use crate::io::credentials::Credentials;
use crate::io::earth_engine::DEFAULT_API_URL;
use crate::types::{LandcoverError, LandcoverResult};
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_CREDENTIALS_FILE: &str = "/etc/secrets/google_credentials.json";
pub const DEFAULT_PROJECT: &str = "gen-lang-client-0605302377";

/// Runtime settings, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub credentials_file: PathBuf,
    /// `EE_PROJECT`; when unset the project named in the credentials is used
    pub project: Option<String>,
    pub api_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            workers: 1,
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            project: None,
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> LandcoverResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any variable source; unset or empty variables
    /// keep their defaults
    pub fn from_lookup<F>(lookup: F) -> LandcoverResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(workers) = get("WORKERS") {
            config.workers = parse_number("WORKERS", &workers)?;
            if config.workers == 0 {
                return Err(LandcoverError::Config("WORKERS must be at least 1".to_string()));
            }
        }
        if let Some(path) = get("EE_CREDENTIALS_FILE") {
            config.credentials_file = PathBuf::from(path);
        }
        if let Some(project) = get("EE_PROJECT") {
            config.project = Some(project);
        }
        if let Some(url) = get("EE_API_URL") {
            config.api_url = url;
        }

        Ok(config)
    }

    /// Cloud project the requests are billed to: `EE_PROJECT`, then the
    /// project recorded in the credentials, then the built-in default
    pub fn project_for(&self, credentials: &Credentials) -> String {
        self.project
            .as_deref()
            .or_else(|| credentials.project())
            .unwrap_or(DEFAULT_PROJECT)
            .to_string()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> LandcoverResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LandcoverError::Config(format!("{} must be a number, got '{}'", key, value)))
}
