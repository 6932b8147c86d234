//! Binary entry point for `jira-bot`.
//!
//! This module provides the command-line interface for jira-bot with options
//! for configuration file paths, logging verbosity, and span export. It initializes
//! the necessary components and starts the service.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing::error;
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use jira_bot::base::{config::Config, error::BotError, types::Void};

/// Jira-bot – replies to Jira ticket mentions in Slack.
///
/// Configuration can come from `config.toml` or `JIRA_BOT_*` environment variables.
/// The bot watches the channels it is in and answers each ticket key it sees
/// with the ticket's summary, status, and assignee.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP (HTTP).
    ///
    /// The endpoint is taken from the standard `OTEL_EXPORTER_OTLP_*` environment variables.
    #[arg(long)]
    otlp: bool,
}

/// Main entry point for the jira-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and starts the bot.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("jira-bot");
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let result = match Config::load(args.config.as_deref()) {
        Ok(config) => jira_bot::start(config).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(e.downcast_ref::<BotError>().map(BotError::exit_code).unwrap_or(1));
    }

    Ok(())
}
