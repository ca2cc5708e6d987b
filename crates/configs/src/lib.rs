//! # configs
//!
//! Layered application settings.
//!
//! Precedence, lowest first:
//! 1. built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/{APP_ENV}.toml` (optional, `APP_ENV` defaults to `development`)
//! 4. `BRIEFING__SECTION__KEY` environment variables
//! 5. the deployment's flat variables (`TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`,
//!    `TELEGRAM_WEBHOOK_SECRET`, `GH_PAT`, `GITHUB_REPO`)
//!
//! A `.env` file in the working directory is loaded first if present.

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::SecretString;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Flat variables kept for compatibility with existing deployments.
const LEGACY_OVERRIDES: &[(&str, &str)] = &[
    ("telegram.bot_token", "TELEGRAM_BOT_TOKEN"),
    ("telegram.chat_id", "TELEGRAM_CHAT_ID"),
    ("telegram.webhook_secret", "TELEGRAM_WEBHOOK_SECRET"),
    ("github.token", "GH_PAT"),
    ("github.repo", "GITHUB_REPO"),
];

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub rate_limit: RateLimitSettings,
    pub comments: CommentSettings,
    pub telegram: TelegramSettings,
    pub github: GithubSettings,
    pub http_client: HttpClientSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// sqlx URL of the writable comments database.
    pub comments_url: String,
    /// Path of the bundled, read-only digest database.
    pub archive_path: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            comments_url: "sqlite://comments.db".to_string(),
            archive_path: "data/news.db".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// Admitted writes per window and client.
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CommentSettings {
    pub default_nickname: String,
}

impl Default for CommentSettings {
    fn default() -> Self {
        Self {
            default_nickname: "anonymous".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub bot_token: Option<SecretString>,
    /// The only chat allowed to issue commands.
    pub chat_id: String,
    pub webhook_secret: Option<SecretString>,
    pub api_base: String,
    /// Command prefix recognised in chat messages.
    pub command: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: String::new(),
            webhook_secret: None,
            api_base: "https://api.telegram.org".to_string(),
            command: "/분석".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub token: Option<SecretString>,
    /// `owner/name` of the repository running the update workflow.
    pub repo: String,
    pub api_base: String,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            token: None,
            repo: "Joseph-mun/daily-news-agent".to_string(),
            api_base: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    pub timeout_secs: u64,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl HttpClientSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub format: LogFormat,
}

impl Settings {
    /// Loads `.env`, then every layer described in the module docs.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Self::load_from(Path::new("config"), &env_name)
    }

    /// Logs the non-secret settings and which secrets are present. Call once
    /// a subscriber is installed.
    pub fn log_summary(&self) {
        info!(
            address = %self.server.bind_address(),
            comments_url = %self.database.comments_url,
            archive_path = %self.database.archive_path,
            max_requests = self.rate_limit.max_requests,
            window_secs = self.rate_limit.window_secs,
            github_repo = %self.github.repo,
            bot_token = self.telegram.bot_token.is_some(),
            webhook_secret = self.telegram.webhook_secret.is_some(),
            github_token = self.github.token.is_some(),
            "configuration loaded"
        );
    }

    /// Loads from an explicit config directory and environment name.
    pub fn load_from(config_dir: &Path, env_name: &str) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(env_name)).required(false))
            .add_source(
                Environment::with_prefix("BRIEFING")
                    .separator("__")
                    .try_parsing(true),
            );

        for (key, var) in LEGACY_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses a TOML document on top of the defaults. No environment input.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be non-zero".into()));
        }
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Invalid("rate_limit.max_requests must be at least 1".into()));
        }
        if !(1..=86_400).contains(&self.rate_limit.window_secs) {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs must be between 1 and 86400".into(),
            ));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid("database.max_connections must be at least 1".into()));
        }
        if self.telegram.command.trim().is_empty() {
            return Err(ConfigError::Invalid("telegram.command must not be blank".into()));
        }
        Ok(())
    }
}
