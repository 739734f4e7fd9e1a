use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf};
use url::Url;
use woundcare_auth::IdentityConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Identity service and session cookie configuration
    #[serde(default)]
    pub identity: IdentityConfig,
    /// Education content configuration
    #[serde(default)]
    pub education: EducationConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        if let Some(ref base) = self.server.base_url {
            Url::parse(base).map_err(|e| format!("server.base_url is invalid: {e}"))?;
        }
        if let Some(ref origin) = self.server.public_origin {
            Url::parse(origin).map_err(|e| format!("server.public_origin is invalid: {e}"))?;
        }
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.identity
            .validate()
            .map_err(|e| format!("identity config error: {e}"))?;
        if self.education.default_locale.trim().is_empty() {
            return Err("education.default_locale must not be empty".into());
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    /// Returns the base URL for the server.
    /// If `base_url` is configured, returns that; otherwise computes from host:port.
    pub fn base_url(&self) -> String {
        self.server
            .base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.server.host, self.server.port))
    }

    /// Public origin that redirects are built on, if configured.
    pub fn public_origin(&self) -> Option<Url> {
        self.server
            .public_origin
            .as_deref()
            .and_then(|o| Url::parse(o).ok())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL of the server. Used as the redirect origin when the request
    /// carries no `Host` header. Defaults to http://{host}:{port}
    #[serde(default)]
    pub base_url: Option<String>,
    /// Origin the portal is served from behind a proxy. When set, every
    /// redirect is built on it regardless of request headers.
    #[serde(default)]
    pub public_origin: Option<String>,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    3000
}
fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            public_origin: None,
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationConfig {
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Directory of extra `<locale>.json` bundles; they override the
    /// embedded ones with the same tag.
    #[serde(default)]
    pub locales_dir: Option<PathBuf>,
}
fn default_locale() -> String {
    "en".into()
}
impl Default for EducationConfig {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            locales_dir: None,
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::{Path, PathBuf};

    /// Default configuration file, read when no path is given.
    pub const DEFAULT_CONFIG_FILE: &str = "woundcare.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            tracing::warn!(path = %pathbuf.display(), "Config file not found, using defaults");
        }
        // Environment variable overrides, e.g., WOUNDCARE__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("WOUNDCARE")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let mut merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.identity = merged.identity.with_env_fallbacks();
        merged.validate()?;
        Ok(merged)
    }

    pub fn load_config_with_default_path<P: AsRef<Path>>(
        path: Option<P>,
    ) -> Result<AppConfig, String> {
        let p = path
            .as_ref()
            .map(|p| p.as_ref().to_string_lossy().to_string());
        load_config(p.as_deref())
    }
}
