use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::agent::{Agent, AgentLimits};
use crate::controller::TurnController;
use crate::providers::configs::OpenAiProviderConfig;
use crate::providers::factory::{get_provider, ProviderType};
use crate::session::InMemoryStore;
use crate::toolkits::web_search::{DEFAULT_MAX_RESULTS, DEFAULT_SEARCH_HOST};
use crate::toolkits::{WebSearch, WebSearchConfig};

pub const ENV_PREFIX: &str = "WREN";
pub const CONFIG_FILE_ENV: &str = "WREN_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "config/wren";
pub const SEARCH_API_KEY_ENV: &str = "TAVILY_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing secret: set the {env_var} environment variable")]
    MissingSecret { env_var: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Failed to create client: {0}")]
    Client(String),
    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Convert a settings path like `provider.api_key` to the variable that sets it
pub fn to_env_var(field_path: &str) -> String {
    let mut env_var = String::from(ENV_PREFIX);
    for part in field_path.split('.') {
        env_var.push_str(if env_var == ENV_PREFIX { "_" } else { "__" });
        env_var.push_str(&part.to_uppercase());
    }
    env_var
}

/// Read a secret from the environment, treating an empty value as unset
fn secret_from_env(env_var: &str) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    /// Host and port to bind. The host may be a name such as `localhost`; it is resolved at bind time.
    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

/// The responder. Host, model and key fall back to the preset for the provider type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderSettings {
    #[serde(rename = "type", default)]
    pub provider_type: ProviderType,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<i32>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl ProviderSettings {
    pub fn host(&self) -> String {
        self.host
            .clone()
            .unwrap_or_else(|| self.provider_type.default_host().to_string())
    }

    pub fn model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| self.provider_type.default_model().to_string())
    }

    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| secret_from_env(self.provider_type.api_key_env()))
            .ok_or_else(|| ConfigError::MissingSecret {
                env_var: self.provider_type.api_key_env().to_string(),
            })
    }

    pub fn to_config(&self, timeout: Duration) -> Result<OpenAiProviderConfig, ConfigError> {
        Ok(OpenAiProviderConfig {
            host: self.host(),
            api_key: self.api_key()?,
            model: self.model(),
            temperature: Some(self.temperature.unwrap_or(0.0)),
            max_tokens: self.max_tokens,
            timeout,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_search_host")]
    pub host: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            host: default_search_host(),
            max_results: default_max_results(),
            api_key: None,
        }
    }
}

impl SearchSettings {
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| secret_from_env(SEARCH_API_KEY_ENV))
            .ok_or_else(|| ConfigError::MissingSecret {
                env_var: SEARCH_API_KEY_ENV.to_string(),
            })
    }

    pub fn to_config(&self, timeout: Duration) -> Result<WebSearchConfig, ConfigError> {
        Ok(WebSearchConfig {
            host: self.host.clone(),
            api_key: self.api_key()?,
            max_results: self.max_results,
            timeout,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentSettings {
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
    #[serde(default = "default_responder_timeout_secs")]
    pub responder_timeout_secs: u64,
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// Whether the responder sees earlier turns of the session
    #[serde(default = "default_true")]
    pub memory: bool,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_tool_rounds: default_max_tool_rounds(),
            responder_timeout_secs: default_responder_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
            memory: true,
        }
    }
}

impl AgentSettings {
    pub fn limits(&self) -> AgentLimits {
        AgentLimits {
            max_tool_rounds: self.max_tool_rounds,
            responder_timeout: Duration::from_secs(self.responder_timeout_secs),
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub provider: ProviderSettings,
    #[serde(default)]
    pub search: SearchSettings,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub server: ServerSettings,
}

impl Settings {
    /// Load settings from the config file, `.env` files and the environment
    pub fn new() -> Result<Self, ConfigError> {
        // Neither file is required, and neither overrides variables already set
        if dotenv::from_filename("config/.env").is_ok() {
            tracing::debug!("loaded config/.env");
        }
        if dotenv::dotenv().is_ok() {
            tracing::debug!("loaded .env");
        }

        let file = match std::env::var(CONFIG_FILE_ENV) {
            Ok(path) => File::from(PathBuf::from(path)).required(true),
            Err(_) => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };
        Self::load(file)
    }

    fn load(file: File<config::FileSourceFile, config::FileFormat>) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(file)
            // Layer on the environment variables
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize().map_err(|err| {
            tracing::debug!("Configuration error: {:?}", &err);
            ConfigError::Other(err)
        })
    }

    /// Check that everything needed for a turn is present, before any turn runs
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.provider.api_key()?;
        if self.model_name().trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "{} must not be empty",
                to_env_var("provider.model")
            )));
        }
        if self.agent.responder_timeout_secs == 0 || self.agent.tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "agent timeouts must be at least one second".to_string(),
            ));
        }
        if self.search.enabled {
            self.search.api_key()?;
            if self.search.max_results == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be at least 1",
                    to_env_var("search.max_results")
                )));
            }
        }
        Ok(())
    }

    pub fn model_name(&self) -> String {
        self.provider.model()
    }
}

/// Assemble the responder, toolkits, store and controller described by the settings
pub fn build_controller(settings: &Settings) -> Result<TurnController, ConfigError> {
    settings.validate()?;
    let limits = settings.agent.limits();

    let provider_config = settings.provider.to_config(limits.responder_timeout)?;
    let provider = get_provider(settings.provider.provider_type, provider_config)
        .map_err(|e| ConfigError::Client(e.to_string()))?;
    let mut agent = Agent::new(provider).with_limits(limits);

    if settings.search.enabled {
        let search = WebSearch::new(settings.search.to_config(limits.tool_timeout)?)
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        agent.add_toolkit(Box::new(search));
    } else {
        tracing::info!("web search disabled");
    }

    tracing::info!(
        provider = %settings.provider.provider_type,
        model = %settings.model_name(),
        memory = settings.agent.memory,
        "controller ready"
    );
    Ok(TurnController::new(agent, Arc::new(InMemoryStore::new())).with_memory(settings.agent.memory))
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_true() -> bool {
    true
}

fn default_search_host() -> String {
    DEFAULT_SEARCH_HOST.to_string()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

fn default_max_tool_rounds() -> usize {
    crate::agent::DEFAULT_MAX_TOOL_ROUNDS
}

fn default_responder_timeout_secs() -> u64 {
    crate::agent::DEFAULT_RESPONDER_TIMEOUT.as_secs()
}

fn default_tool_timeout_secs() -> u64 {
    crate::agent::DEFAULT_TOOL_TIMEOUT.as_secs()
}
