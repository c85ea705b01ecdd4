use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands {
    pub mod run;
    pub mod session;
    pub mod version;
}
mod prompt;
mod session;

use commands::session::SessionArgs;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (the default)
    Session(SessionArgs),

    /// Send a single message and print the reply
    Run {
        /// Message to send, or - to read it from stdin
        #[arg(short, long)]
        text: String,

        #[command(flatten)]
        options: SessionArgs,
    },

    /// Print the version
    Version,
}

fn init_logging() {
    // Logs go to stderr so they never interleave with the conversation
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    match cli.command {
        Some(Command::Session(args)) => commands::session::execute(args).await,
        Some(Command::Run { text, options }) => commands::run::execute(text, options).await,
        Some(Command::Version) => {
            commands::version::execute();
            Ok(())
        }
        None => commands::session::execute(SessionArgs::default()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wren::providers::factory::ProviderType;

    #[test]
    fn test_default_command() {
        let cli = Cli::try_parse_from(["wren"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_session_flags() {
        let cli = Cli::try_parse_from([
            "wren",
            "session",
            "--session",
            "s1",
            "--no-search",
            "--provider",
            "openai",
        ])
        .unwrap();

        match cli.command {
            Some(Command::Session(args)) => {
                assert_eq!(args.session.as_deref(), Some("s1"));
                assert!(args.no_search);
                assert!(!args.no_memory);
                assert_eq!(args.provider, Some(ProviderType::OpenAi));
            }
            _ => panic!("Expected session command"),
        }
    }

    #[test]
    fn test_run_requires_text() {
        assert!(Cli::try_parse_from(["wren", "run"]).is_err());

        let cli = Cli::try_parse_from(["wren", "run", "--text", "-", "--no-memory"]).unwrap();
        match cli.command {
            Some(Command::Run { text, options }) => {
                assert_eq!(text, "-");
                assert!(options.no_memory);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_unknown_provider_rejected() {
        assert!(Cli::try_parse_from(["wren", "session", "--provider", "databricks"]).is_err());
    }
}
