use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};
use url::Url;

use crate::constants::{DEFAULT_MAX_IMAGE_BYTES, MAX_IMAGES_PER_LISTING};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Base URL of the remote marketplace API.
    #[serde(default)]
    pub api_base_url: String,

    /// Public origin of the site; detail and checkout redirect targets hang off it.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    #[serde(default = "default_max_images")]
    pub max_images: usize,

    #[serde(default = "default_draft_ttl")]
    pub draft_ttl_minutes: i64,

    #[serde(default = "default_purge_interval")]
    pub purge_interval_secs: u64,

    /// 0 disables the upstream keep-alive ping.
    #[serde(default = "default_wakeup_interval")]
    pub wakeup_interval_secs: u64,

    #[serde(default = "default_max_open_forms")]
    pub max_open_forms: usize,

    #[serde(default = "default_max_forms_per_user")]
    pub max_forms_per_user: usize,

    /// Requests a client may make at once to the form and photo routes.
    #[serde(default = "default_draft_rate_burst")]
    pub draft_rate_burst: u32,

    #[serde(default = "default_draft_rate_per_minute")]
    pub draft_rate_per_minute: u32,

    /// Key rate limits on the first X-Forwarded-For hop. Only enable behind a proxy you control.
    #[serde(default)]
    pub trust_x_forwarded_for: bool,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "TLC-Listings".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_public_base_url() -> String {
    "http://localhost:3000".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}
fn default_max_images() -> usize {
    MAX_IMAGES_PER_LISTING
}
fn default_draft_ttl() -> i64 {
    60
}
fn default_purge_interval() -> u64 {
    300
}
fn default_wakeup_interval() -> u64 {
    600
}
fn default_max_open_forms() -> usize {
    500
}
fn default_max_forms_per_user() -> usize {
    5
}
fn default_draft_rate_burst() -> u32 {
    10
}
fn default_draft_rate_per_minute() -> u32 {
    30
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let env_name = AppEnvironment::from_str(&raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_allowed_origins")
                    .try_parsing(true)
                    .ignore_empty(true)
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;
        config.api_base_url = fill_or_env(config.api_base_url, "APP_API_BASE_URL")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if Url::parse(&self.api_base_url).is_err() {
            errors.push("API_BASE_URL must be an absolute URL");
        }
        if Url::parse(&self.public_base_url).is_err() {
            errors.push("PUBLIC_BASE_URL must be an absolute URL");
        }
        if self.max_image_bytes == 0 {
            errors.push("MAX_IMAGE_BYTES must be greater than 0");
        }
        if self.max_images == 0 || self.max_images > MAX_IMAGES_PER_LISTING {
            errors.push("MAX_IMAGES must be between 1 and 8");
        }
        if self.draft_ttl_minutes <= 0 {
            errors.push("DRAFT_TTL_MINUTES must be greater than 0");
        }
        if self.max_open_forms == 0 || self.max_forms_per_user == 0 {
            errors.push("MAX_OPEN_FORMS and MAX_FORMS_PER_USER must be greater than 0");
        }
        if self.draft_rate_burst == 0 || self.draft_rate_per_minute == 0 {
            errors.push("DRAFT_RATE_BURST and DRAFT_RATE_PER_MINUTE must be greater than 0");
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn fill_or_env(current: String, env_key: &str) -> Result<String, ConfigError> {
    if current.trim().is_empty() {
        env::var(env_key).map_err(|_| ConfigError::Message(format!("{env_key} must be set")))
    } else {
        Ok(current)
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}
