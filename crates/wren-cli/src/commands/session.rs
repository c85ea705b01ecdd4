use anyhow::Result;
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use crate::prompt::rustyline::RustylinePrompt;
use crate::session::Session;
use wren::configuration::Settings;
use wren::controller::TurnController;
use wren::providers::factory::ProviderType;

#[derive(Args, Debug, Default, Clone)]
pub struct SessionArgs {
    /// Session id to continue, a new one is generated when omitted
    #[arg(short, long)]
    pub session: Option<String>,

    /// Answer without the web search tool
    #[arg(long)]
    pub no_search: bool,

    /// Only send the current message to the model, not the earlier turns
    #[arg(long)]
    pub no_memory: bool,

    /// Provider preset (together or openai)
    #[arg(short, long, value_parser = ProviderType::from_str)]
    pub provider: Option<ProviderType>,

    /// Model to use, overriding the provider preset
    #[arg(short, long)]
    pub model: Option<String>,
}

impl SessionArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(provider_type) = self.provider {
            if provider_type != settings.provider.provider_type {
                // Host and model presets belong to the previous provider
                settings.provider.host = None;
                settings.provider.model = None;
            }
            settings.provider.provider_type = provider_type;
        }
        if let Some(model) = &self.model {
            settings.provider.model = Some(model.clone());
        }
        if self.no_search {
            settings.search.enabled = false;
        }
        if self.no_memory {
            settings.agent.memory = false;
        }
    }

    pub fn session_id(&self) -> String {
        self.session
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string())
    }
}

pub fn build_controller(args: &SessionArgs) -> Result<Arc<TurnController>> {
    let mut settings = Settings::new()?;
    args.apply(&mut settings);
    Ok(Arc::new(wren::build_controller(&settings)?))
}

pub async fn execute(args: SessionArgs) -> Result<()> {
    let controller = build_controller(&args)?;
    let prompt = RustylinePrompt::new()?;
    let mut session = Session::new(controller, Box::new(prompt), args.session_id());
    session.start().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let mut settings = Settings::default();
        settings.provider.model = Some("meta-llama/Llama-3-70b".to_string());

        let args = SessionArgs {
            no_search: true,
            no_memory: true,
            provider: Some(ProviderType::OpenAi),
            ..SessionArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.provider.provider_type, ProviderType::OpenAi);
        assert_eq!(settings.model_name(), "gpt-4o");
        assert!(!settings.search.enabled);
        assert!(!settings.agent.memory);
    }

    #[test]
    fn test_model_override_wins() {
        let mut settings = Settings::default();
        let args = SessionArgs {
            provider: Some(ProviderType::OpenAi),
            model: Some("gpt-4o-mini".to_string()),
            ..SessionArgs::default()
        };
        args.apply(&mut settings);

        assert_eq!(settings.model_name(), "gpt-4o-mini");
        assert!(settings.search.enabled);
    }

    #[test]
    fn test_session_id() {
        let named = SessionArgs {
            session: Some("s1".to_string()),
            ..SessionArgs::default()
        };
        assert_eq!(named.session_id(), "s1");

        let generated = SessionArgs::default().session_id();
        assert!(Uuid::parse_str(&generated).is_ok());
    }
}
