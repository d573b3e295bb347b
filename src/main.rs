mod interactive;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use newsrag_core::Config;
use newsrag_core::Pipeline;
use newsrag_core::vault::EnvVaultProvider;

#[derive(Debug, Parser)]
#[command(name = "newsrag", version, about = "Ask questions about a handful of news articles")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch articles and rebuild the index.
    Build {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Answer a question from the last built index.
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Prompt for URLs and questions in a loop (default).
    Interactive,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();

    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config);
    let mut config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    config.resolve_secrets(&EnvVaultProvider).await?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    match cli.command.unwrap_or(Command::Interactive) {
        Command::Build { urls } => {
            let pipeline = Pipeline::from_config(&config)?;
            eprintln!("Processing...");
            let outcome = pipeline.build(&urls).await?;
            println!("{}", render::build_outcome(&outcome));
        }
        Command::Ask { question } => {
            let pipeline = Pipeline::from_config(&config)?;
            let result = pipeline.ask(&question.join(" ")).await?;
            println!("{}", render::answer(&result));
        }
        Command::Interactive => interactive::run(config).await?,
    }
    Ok(())
}

fn resolve_config_path(arg: Option<PathBuf>) -> PathBuf {
    if let Some(path) = arg {
        return path;
    }
    if let Ok(path) = std::env::var("NEWSRAG_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use serial_test::serial;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_to_interactive() {
        let cli = Cli::try_parse_from(["newsrag"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn parses_build_and_ask() {
        let cli = Cli::try_parse_from([
            "newsrag",
            "--config",
            "my.toml",
            "build",
            "https://a.test",
            "https://b.test",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("my.toml")));
        let Some(Command::Build { urls }) = cli.command else {
            panic!("expected build");
        };
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);

        let cli = Cli::try_parse_from(["newsrag", "ask", "what", "happened?"]).unwrap();
        let Some(Command::Ask { question }) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(question.join(" "), "what happened?");
    }

    #[test]
    fn build_requires_urls() {
        assert!(Cli::try_parse_from(["newsrag", "build"]).is_err());
    }

    #[test]
    #[serial]
    fn config_path_precedence() {
        unsafe { std::env::remove_var("NEWSRAG_CONFIG") };
        assert_eq!(resolve_config_path(None), PathBuf::from("config/default.toml"));

        unsafe { std::env::set_var("NEWSRAG_CONFIG", "/etc/newsrag.toml") };
        assert_eq!(resolve_config_path(None), PathBuf::from("/etc/newsrag.toml"));
        assert_eq!(
            resolve_config_path(Some(PathBuf::from("cli.toml"))),
            PathBuf::from("cli.toml")
        );
        unsafe { std::env::remove_var("NEWSRAG_CONFIG") };
    }
}
