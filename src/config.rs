use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::{Parser, ValueEnum};
use std::fs;
use tracing::{info, warn};

/// Configuration for the Stargazer server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL for the database connection
    pub database_url: String,
    /// Address the HTTP server binds to
    pub bind_address: String,
    /// Key sent with every NASA API request
    pub nasa_api_key: String,
    /// Base URL of the NASA API
    pub nasa_base_url: String,
    /// How long successful NASA responses are cached, in seconds
    pub cache_duration_secs: u64,
    /// Timeout for each NASA API request, in seconds
    pub http_timeout_secs: u64,
    /// Idle time after which a session expires, in minutes
    pub session_lifetime_minutes: u64,
    /// Time between cache and session cleanups, in minutes
    pub maintenance_interval_minutes: u64,
    /// Origin allowed to make credentialed cross-origin requests
    pub cors_origin: Option<String>,
    /// Directory for rolling JSON log files
    pub log_dir: Option<PathBuf>,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ConfigUpdate {
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub bind_address: Option<String>,
    #[serde(default)]
    pub nasa_api_key: Option<String>,
    #[serde(default)]
    pub nasa_base_url: Option<String>,
    #[serde(default)]
    pub cache_duration_secs: Option<u64>,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub session_lifetime_minutes: Option<u64>,
    #[serde(default)]
    pub maintenance_interval_minutes: Option<u64>,
    #[serde(default)]
    pub cors_origin: Option<String>,
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Server URL used by the CLI; ignored by the server
    #[serde(default)]
    pub server_url: Option<String>,
}

/// Format of log lines written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "stargazer", about = "NASA gallery backend with favorites and feedback")]
pub struct CliArgs {
    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to listen on, e.g. 0.0.0.0:8080
    #[clap(long, env = "STARGAZER_BIND")]
    pub bind_address: Option<String>,

    /// NASA API key
    #[clap(long, env = "NASA_API_KEY")]
    pub nasa_api_key: Option<String>,

    /// NASA API base URL
    #[clap(long, env = "NASA_API_BASE_URL")]
    pub nasa_base_url: Option<String>,

    /// Cache duration for NASA responses in seconds
    #[clap(long, env = "CACHE_DURATION")]
    pub cache_duration_secs: Option<u64>,

    /// NASA request timeout in seconds
    #[clap(long, env = "NASA_HTTP_TIMEOUT")]
    pub http_timeout_secs: Option<u64>,

    /// Session idle lifetime in minutes
    #[clap(long, env = "SESSION_LIFETIME")]
    pub session_lifetime_minutes: Option<u64>,

    /// Minutes between cleanup runs
    #[clap(long, env = "MAINTENANCE_INTERVAL")]
    pub maintenance_interval_minutes: Option<u64>,

    /// Allowed CORS origin
    #[clap(long, env = "CORS_ORIGIN")]
    pub cors_origin: Option<String>,

    /// Directory for log files
    #[clap(long, env = "STARGAZER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Stdout log format
    #[clap(long, value_enum, env = "STARGAZER_LOG_FORMAT", default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Debug mode
    #[clap(long, env = "STARGAZER_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            database_url: update.database_url.unwrap_or(self.database_url),
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            nasa_api_key: update.nasa_api_key.unwrap_or(self.nasa_api_key),
            nasa_base_url: update.nasa_base_url.unwrap_or(self.nasa_base_url),
            cache_duration_secs: update.cache_duration_secs.unwrap_or(self.cache_duration_secs),
            http_timeout_secs: update.http_timeout_secs.unwrap_or(self.http_timeout_secs),
            session_lifetime_minutes: update.session_lifetime_minutes.unwrap_or(self.session_lifetime_minutes),
            maintenance_interval_minutes: update.maintenance_interval_minutes.unwrap_or(self.maintenance_interval_minutes),
            cors_origin: update.cors_origin.or(self.cors_origin),
            log_dir: update.log_dir.or(self.log_dir),
        }
    }

    /// Returns the NASA cache duration as a Duration
    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    /// Returns the NASA request timeout as a Duration
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Returns the session lifetime as a Duration
    pub fn session_lifetime(&self) -> Duration {
        Duration::from_secs(self.session_lifetime_minutes.saturating_mul(60))
    }

    /// Returns the maintenance interval as a Duration, never shorter than a minute
    pub fn maintenance_interval(&self) -> Duration {
        Duration::from_secs(self.maintenance_interval_minutes.max(1).saturating_mul(60))
    }
}

/// Returns the base (default) configuration
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let database_url = config_path.map_or("stargazer.db".to_string(), |path| path.join("stargazer.db").to_string_lossy().to_string());

    Config {
        database_url,
        bind_address: "127.0.0.1:3000".to_string(),
        nasa_api_key: "DEMO_KEY".to_string(),
        nasa_base_url: "https://api.nasa.gov".to_string(),
        cache_duration_secs: 3600,
        http_timeout_secs: 10,
        session_lifetime_minutes: 120,
        maintenance_interval_minutes: 15,
        cors_origin: None,
        log_dir: None,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        database_url: args.database_url,
        bind_address: args.bind_address,
        nasa_api_key: args.nasa_api_key,
        nasa_base_url: args.nasa_base_url,
        cache_duration_secs: args.cache_duration_secs,
        http_timeout_secs: args.http_timeout_secs,
        session_lifetime_minutes: args.session_lifetime_minutes,
        maintenance_interval_minutes: args.maintenance_interval_minutes,
        cors_origin: args.cors_origin,
        log_dir: args.log_dir,
        server_url: None,
    }
}

/// Returns the platform config directory if it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let Some(proj_dirs) = ProjectDirs::from("com", "stargazer", "stargazer") else {
        warn!("Could not determine XDG config directory, skipping config file");
        return None;
    };

    let path = proj_dirs.config_dir().to_path_buf();
    if path.exists() {
        Some(path)
    } else {
        info!("Config path not found at {:?}, using defaults", path);
        None
    }
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path();
    let config_file = config_dir.as_ref().map(|dir| dir.join("config.toml"));

    base_config(config_dir)
        .apply_update(config_from_file(config_file).unwrap_or_default())
        .apply_update(config_from_args(args))
}


#[cfg(test)]
mod prop_tests;
