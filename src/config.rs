use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    #[serde(default)]
    pub region_api: RegionApiSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub posts: PostsSettings,
    #[serde(default)]
    pub preferences: PreferenceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegionApiSettings {
    #[serde(default = "default_provinces_url")]
    pub provinces_url: String,
    #[serde(default = "default_wards_url")]
    pub wards_url: String,
    pub timeout_secs: Option<u64>,
}

impl Default for RegionApiSettings {
    fn default() -> Self {
        Self {
            provinces_url: default_provinces_url(),
            wards_url: default_wards_url(),
            timeout_secs: None,
        }
    }
}

fn default_provinces_url() -> String { crate::services::region_catalog::DEFAULT_PROVINCES_URL.to_string() }
fn default_wards_url() -> String { crate::services::region_catalog::DEFAULT_WARDS_URL.to_string() }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheSettings {
    pub ttl_secs: Option<u64>,
    pub max_entries: Option<u64>,
}

/// Profile store backend; without a URL profiles live in memory
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseSettings {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostsSettings {
    #[serde(default = "default_seed_path")]
    pub seed_path: String,
}

impl Default for PostsSettings {
    fn default() -> Self {
        Self { seed_path: default_seed_path() }
    }
}

fn default_seed_path() -> String { "data/posts.json".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct PreferenceSettings {
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
}

impl Default for PreferenceSettings {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
        }
    }
}

fn default_radius_km() -> f64 { crate::services::preferences::DEFAULT_RADIUS_KM }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with RELIEF__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., RELIEF__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("RELIEF")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_database_url(settings)?;

        settings.try_deserialize()
    }
}

/// Let the conventional DATABASE_URL select the Postgres profile store
fn apply_database_url(settings: Config) -> Result<Config, ConfigError> {
    match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => Config::builder()
            .add_source(settings)
            .set_override("database.url", url)?
            .build(),
        _ => Ok(settings),
    }
}
