use std::time::Duration;

/// Connection settings for an OpenAI compatible chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    /// Upper bound for a single HTTP request to the endpoint
    pub timeout: Duration,
}
