use super::{base::Provider, configs::OpenAiProviderConfig, openai::OpenAiProvider};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// The hosted model services we know how to talk to
#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProviderType {
    #[default]
    Together,
    OpenAi,
}

impl ProviderType {
    pub fn default_host(&self) -> &'static str {
        match self {
            ProviderType::Together => "https://api.together.xyz",
            ProviderType::OpenAi => "https://api.openai.com",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Together => "meta-llama/Meta-Llama-3.1-8B-Instruct-Turbo",
            ProviderType::OpenAi => "gpt-4o",
        }
    }

    /// The environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderType::Together => "TOGETHER_API_KEY",
            ProviderType::OpenAi => "OPENAI_API_KEY",
        }
    }
}

pub fn get_provider(
    provider_type: ProviderType,
    config: OpenAiProviderConfig,
) -> Result<Box<dyn Provider>> {
    match provider_type {
        // Together serves the OpenAI chat completions protocol
        ProviderType::Together | ProviderType::OpenAi => Ok(Box::new(OpenAiProvider::new(config)?)),
    }
}
