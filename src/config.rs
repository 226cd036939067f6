use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub completion: CompletionSettings,
    #[serde(default)]
    pub store: StoreSettings,
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub link: LinkSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// OpenAI-compatible completion endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_completion_endpoint")]
    pub endpoint: String,
    /// Missing key disables every semantic step
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_completion_endpoint(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_completion_timeout(),
        }
    }
}

impl CompletionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// API key, if one is set and non-blank
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

fn default_completion_endpoint() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_completion_timeout() -> u64 { 20 }

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Appwrite,
    Memory,
}

/// Venue document store
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_store_timeout")]
    pub timeout_secs: u64,
    /// JSON array of venue documents for the memory backend
    pub seed_path: Option<String>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            endpoint: String::new(),
            api_key: String::new(),
            project_id: String::new(),
            database_id: String::new(),
            collection: default_collection(),
            timeout_secs: default_store_timeout(),
            seed_path: None,
        }
    }
}

impl StoreSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_collection() -> String { "venues".to_string() }
fn default_store_timeout() -> u64 { 10 }

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_candidate_cap")]
    pub candidate_cap: usize,
    #[serde(default = "default_min_search_confidence")]
    pub min_search_confidence: f64,
    #[serde(default = "default_fast_path_confidence")]
    pub fast_path_confidence: f64,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            candidate_cap: default_candidate_cap(),
            min_search_confidence: default_min_search_confidence(),
            fast_path_confidence: default_fast_path_confidence(),
        }
    }
}

fn default_candidate_cap() -> usize { 50 }
fn default_min_search_confidence() -> f64 { 0.5 }
fn default_fast_path_confidence() -> f64 { 0.9 }

#[derive(Debug, Clone, Deserialize)]
pub struct LinkSettings {
    #[serde(default = "default_link_base")]
    pub base_url: String,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self { base_url: default_link_base() }
    }
}

fn default_link_base() -> String { "https://evengo.space/search".to_string() }

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
    /// 4. Environment variables (prefixed with EVENGO__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., EVENGO__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        substitute_env_vars(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("EVENGO")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Apply the conventional credential variables on top of loaded config
///
/// `OPENAI_API_KEY` feeds the completion key; `APPWRITE_*` feed the store.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let overrides = [
        ("OPENAI_API_KEY", "completion.api_key"),
        ("APPWRITE_ENDPOINT", "store.endpoint"),
        ("APPWRITE_API_KEY", "store.api_key"),
        ("APPWRITE_PROJECT_ID", "store.project_id"),
        ("APPWRITE_DATABASE_ID", "store.database_id"),
    ];

    let mut builder = Config::builder().add_source(settings);

    for (var, key) in overrides {
        if let Ok(value) = env::var(var) {
            if !value.trim().is_empty() {
                builder = builder.set_override(key, value)?;
            }
        }
    }

    builder.build()
}
