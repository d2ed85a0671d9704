use anyhow::{Context, Result};
use serde::Deserialize;

/// Prefix for environment overrides, e.g. `CALL_CAPTURE__TELEPHONY__AUTH_TOKEN`
pub const ENV_PREFIX: &str = "CALL_CAPTURE";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub telephony: TelephonyConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelephonyConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Caller id the calls are placed from
    pub from_number: String,
    /// Public URL the provider reaches this service on
    pub public_base_url: String,
    /// Provider REST API root
    pub api_base: String,
    /// How long the callee's phone rings before giving up
    pub ring_timeout_secs: u32,
    /// Longest answer recorded
    pub max_listening_secs: u32,
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            account_sid: String::new(),
            auth_token: String::new(),
            from_number: String::new(),
            public_base_url: "http://localhost:8000".to_string(),
            api_base: "https://api.twilio.com".to_string(),
            ring_timeout_secs: 30,
            max_listening_secs: 60,
        }
    }
}

impl TelephonyConfig {
    /// Credentials are present and not left at template placeholders
    pub fn is_configured(&self) -> bool {
        [&self.account_sid, &self.auth_token, &self.from_number]
            .iter()
            .all(|v| !v.trim().is_empty() && !v.starts_with("your_"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_speech_text_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_speech_text_length: 4000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Bot token; empty means results are only logged
    pub telegram_bot_token: String,
    pub api_base: String,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            telegram_bot_token: String::new(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. "info" or "call_capture=debug,tower_http=info"
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load from a config file (extension optional) with environment overrides.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config from {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.service.http.bind, self.service.http.port)
    }
}
