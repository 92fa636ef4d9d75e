use crate::constants::{
    DEFAULT_GRAPH_BASE_URL, DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY, DEFAULT_REQUEST_TIMEOUT,
};
use crate::error::PublishError;
use crate::polling::{ExponentialBackoff, FixedDelay, RetryPolicy};
use crate::types::ValidatedUrl;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const ENV_IMAGE_BASE_URL: &str = "RATING2POST_IMAGE_BASE_URL";
const ENV_PRINCIPAL: &str = "RATING2POST_PRINCIPAL";
const ENV_ROLE: &str = "RATING2POST_ROLE";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// JSON file holding the Instagram credentials and caption template
    #[arg(long, global = true, default_value = "rating2post.config.json")]
    pub config_file: PathBuf,

    /// Directory of exported ratings (<rating_id>.json)
    #[arg(long, global = true, default_value = "ratings")]
    pub ratings_dir: PathBuf,

    /// Public URL prefix images are served from (or RATING2POST_IMAGE_BASE_URL)
    #[arg(long, global = true)]
    pub image_base_url: Option<String>,

    /// Graph API root, including version
    #[arg(long, global = true, default_value = DEFAULT_GRAPH_BASE_URL)]
    pub graph_base_url: String,

    /// Status checks per media container before giving up
    #[arg(long, global = true, default_value_t = DEFAULT_POLL_ATTEMPTS)]
    pub poll_attempts: u32,

    /// Pause between status checks, in milliseconds
    #[arg(long, global = true, default_value_t = DEFAULT_POLL_DELAY.as_millis() as u64)]
    pub poll_delay_ms: u64,

    /// How the pause between status checks evolves
    #[arg(long, global = true, value_enum, default_value_t = PollStrategy::Fixed)]
    pub poll_strategy: PollStrategy,

    /// HTTP timeout per Graph API request, in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    /// Who is publishing (or RATING2POST_PRINCIPAL)
    #[arg(long, global = true)]
    pub principal: Option<String>,

    /// Role of the publishing principal (or RATING2POST_ROLE)
    #[arg(long, global = true)]
    pub role: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Publish a saved rating to Instagram
    Publish {
        /// Id of the rating to publish
        rating_id: String,

        /// Image key to publish instead of the rating's own images (repeatable, order kept)
        #[arg(long = "image", value_name = "KEY")]
        images: Vec<String>,
    },

    /// Inspect or change the stored Instagram configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Store a configuration value
    Set { key: String, value: String },
    /// Print the stored configuration (token redacted)
    Show,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStrategy {
    /// Same pause after every check
    Fixed,
    /// Doubling pause with jitter, capped at 30s
    Exponential,
}

/// Resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub config_file: PathBuf,
    pub ratings_dir: PathBuf,
    pub image_base_url: Option<ValidatedUrl>,
    pub graph_base_url: ValidatedUrl,
    pub poll_attempts: u32,
    pub poll_delay: Duration,
    pub poll_strategy: PollStrategy,
    pub request_timeout: Duration,
    pub principal: Option<String>,
    pub role: String,
    pub verbose: bool,
}

impl AppConfig {
    /// Resolves configuration from CLI input, falling back to the environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, PublishError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    fn resolve_with(
        cli: &CommandLineInput,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, PublishError> {
        let image_base_url = cli
            .image_base_url
            .clone()
            .or_else(|| env(ENV_IMAGE_BASE_URL))
            .filter(|url| !url.trim().is_empty())
            .map(|url| ValidatedUrl::parse(url.trim()))
            .transpose()?;

        Ok(Self {
            config_file: cli.config_file.clone(),
            ratings_dir: cli.ratings_dir.clone(),
            image_base_url,
            graph_base_url: ValidatedUrl::parse(&cli.graph_base_url)?,
            poll_attempts: cli.poll_attempts,
            poll_delay: Duration::from_millis(cli.poll_delay_ms),
            poll_strategy: cli.poll_strategy,
            request_timeout: Duration::from_secs(cli.request_timeout_secs.max(1)),
            principal: cli.principal.clone().or_else(|| env(ENV_PRINCIPAL)),
            role: cli
                .role
                .clone()
                .or_else(|| env(ENV_ROLE))
                .unwrap_or_else(|| "viewer".to_string()),
            verbose: cli.verbose,
        })
    }

    /// The image host prefix; publishing cannot proceed without one.
    pub fn require_image_base_url(&self) -> Result<&ValidatedUrl, PublishError> {
        self.image_base_url
            .as_ref()
            .ok_or_else(|| PublishError::ConfigurationIncomplete {
                missing: vec![format!("--image-base-url or {}", ENV_IMAGE_BASE_URL)],
            })
    }

    pub fn retry_policy(&self) -> Arc<dyn RetryPolicy> {
        match self.poll_strategy {
            PollStrategy::Fixed => Arc::new(FixedDelay::new(self.poll_attempts, self.poll_delay)),
            PollStrategy::Exponential => {
                Arc::new(ExponentialBackoff::new(self.poll_attempts, self.poll_delay))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CommandLineInput {
        CommandLineInput::try_parse_from(std::iter::once("rating2post").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_publish_command_keeps_image_order() {
        let cli = parse(&["publish", "42", "--image", "b.jpg", "--image", "a.jpg"]);
        match cli.command {
            Command::Publish { rating_id, images } => {
                assert_eq!(rating_id, "42");
                assert_eq!(images, vec!["b.jpg", "a.jpg"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_defaults_match_reference_polling() {
        let cli = parse(&["publish", "1"]);
        let config = AppConfig::resolve_with(&cli, |_| None).unwrap();
        assert_eq!(config.poll_attempts, 10);
        assert_eq!(config.poll_delay, Duration::from_millis(1000));
        assert_eq!(config.poll_strategy, PollStrategy::Fixed);
        assert_eq!(config.role, "viewer");
        assert_eq!(config.graph_base_url.as_str(), "https://graph.facebook.com/v19.0");
        assert!(matches!(
            config.require_image_base_url(),
            Err(PublishError::ConfigurationIncomplete { .. })
        ));
    }

    #[test]
    fn test_environment_fills_gaps_but_flags_win() {
        let env = |name: &str| match name {
            ENV_IMAGE_BASE_URL => Some("https://cdn.example.com/img".to_string()),
            ENV_PRINCIPAL => Some("env-user".to_string()),
            ENV_ROLE => Some("editor".to_string()),
            _ => None,
        };

        let cli = parse(&["--principal", "flag-user", "config", "show"]);
        let config = AppConfig::resolve_with(&cli, env).unwrap();
        assert_eq!(config.principal.as_deref(), Some("flag-user"));
        assert_eq!(config.role, "editor");
        assert_eq!(
            config.require_image_base_url().unwrap().as_str(),
            "https://cdn.example.com/img"
        );
    }

    #[test]
    fn test_invalid_urls_are_rejected() {
        let cli = parse(&["--graph-base-url", "ftp://graph", "config", "show"]);
        assert!(matches!(
            AppConfig::resolve_with(&cli, |_| None),
            Err(PublishError::Validation(_))
        ));
    }
}
