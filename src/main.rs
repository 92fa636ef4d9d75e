// src/main.rs

use anyhow::Context;
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use rating2post::{
    AccessToken, AppConfig, Command, CommandLineInput, ConfigAction, ConfigStore,
    GraphHttpClient, ImageKey, JsonFileConfigStore, JsonRatingStore, PublishError,
    PublishOrchestrator, PublishRequest, RatingId, RoleAuthorizer, Severity, UrlPrefixImageHost,
    CONFIG_KEY_ACCESS_TOKEN, PUBLISHER_CONFIG_KEYS,
};
use std::fs;
use std::process::ExitCode;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let log_file_path = std::env::temp_dir().join("rating2post.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let pattern = if verbose {
        "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}"
    } else {
        "{m}{n}"
    };

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(pattern)))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] - {m}{n}",
        )))
        .build(&log_file_path)?;

    // Root runs at debug so the file always gets detail; the console
    // appender filters down to the requested level.
    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stdout", Box::new(stdout_appender)),
        )
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Publishes one rating and reports the outcome.
async fn run_publish(
    config: &AppConfig,
    rating_id: &str,
    images: &[String],
) -> Result<(), PublishError> {
    let request = PublishRequest::new(RatingId::parse(rating_id)?).with_images(
        images
            .iter()
            .map(|key| ImageKey::new(key.as_str()))
            .collect::<Result<Vec<_>, _>>()?,
    );

    let image_host = UrlPrefixImageHost::new(config.require_image_base_url()?.clone());
    let platform = GraphHttpClient::new(&config.graph_base_url, config.request_timeout)?;

    let orchestrator = PublishOrchestrator::new(
        Arc::new(platform),
        Arc::new(RoleAuthorizer::new(config.principal.clone(), config.role.clone())),
        Arc::new(JsonFileConfigStore::new(&config.config_file)),
        Arc::new(JsonRatingStore::new(&config.ratings_dir)),
        Arc::new(image_host),
    )
    .with_retry_policy(config.retry_policy());

    let result = orchestrator.publish(request).await?;

    println!(
        "✓ Published rating {} as {} {} (publish id {})",
        rating_id, result.media_kind, result.creation_id, result.publish_id
    );
    Ok(())
}

async fn run_config(config: &AppConfig, action: &ConfigAction) -> anyhow::Result<()> {
    let store = JsonFileConfigStore::new(&config.config_file);

    match action {
        ConfigAction::Set { key, value } => {
            if !PUBLISHER_CONFIG_KEYS.contains(&key.as_str()) {
                anyhow::bail!(
                    "unknown configuration key '{}' (expected one of: {})",
                    key,
                    PUBLISHER_CONFIG_KEYS.join(", ")
                );
            }
            store
                .set(key, value)
                .await
                .with_context(|| format!("storing {} in {}", key, store.path().display()))?;
            println!("✓ {} updated in {}", key, store.path().display());
        }
        ConfigAction::Show => {
            let values = store
                .get(&PUBLISHER_CONFIG_KEYS)
                .await
                .with_context(|| format!("reading {}", store.path().display()))?;
            for key in PUBLISHER_CONFIG_KEYS {
                let shown = match values.get(key) {
                    None => "(not set)".to_string(),
                    Some(token) if key == CONFIG_KEY_ACCESS_TOKEN => AccessToken::new(token.as_str())
                        .map(|t| t.redacted())
                        .unwrap_or_else(|_| "(invalid)".to_string()),
                    Some(value) => value.replace('\n', "\\n"),
                };
                println!("{} = {}", key, shown);
            }
        }
    }
    Ok(())
}

fn exit_code_for(severity: Severity) -> ExitCode {
    match severity {
        Severity::BadRequest => ExitCode::from(2),
        Severity::Permission => ExitCode::from(3),
        Severity::NotFound => ExitCode::from(4),
        Severity::UpstreamFailure => ExitCode::from(5),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CommandLineInput::parse();

    if let Err(e) = setup_logging(cli.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
        return ExitCode::FAILURE;
    }

    let config = match AppConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return exit_code_for(e.severity());
        }
    };

    match &cli.command {
        Command::Publish { rating_id, images } => {
            match run_publish(&config, rating_id, images).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("✗ Publish failed ({}): {}", e.severity(), e);
                    exit_code_for(e.severity())
                }
            }
        }
        Command::Config { action } => match run_config(&config, action).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("✗ {:#}", e);
                ExitCode::FAILURE
            }
        },
    }
}
