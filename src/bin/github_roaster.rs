//! github-roaster — serve the roast form over HTTP
//!
//! Usage:
//!   github-roaster [--config <path>]      Start the server
//!   github-roaster --version              Show version information
//!   github-roaster --help                 Show this help message

use anyhow::{Context, Result};
use github_roaster::config::Settings;
use github_roaster::form::PromptForm;
use github_roaster::web::{create_router, AppState};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn print_usage() {
    println!(
        r#"github-roaster — GitHub profile roast form

USAGE:
    github-roaster [OPTIONS]

OPTIONS:
    --config <path>     YAML secrets/config file (default: ./secrets.yaml if present)
    --version           Show version information
    --help              Show this help message

ENVIRONMENT:
    GEMINI_API_KEY          Gemini API key (required unless set in the config file)
    GEMINI_MODEL            Model name (default: gemini-2.0-flash)
    GEMINI_BASE_URL         API host override
    ROASTER_CONFIG          Config file path
    ROASTER_BIND            Listen address (default: 127.0.0.1:8501)
    ROASTER_TIMEOUT_SECS    Upstream request timeout
    ROASTER_GITHUB_PROFILE  Fetch the GitHub profile before prompting (1/0)
    GITHUB_TOKEN            GitHub token for the profile lookup
    RUST_LOG                Log filter (default: info)"#
    );
}

enum Command {
    Serve { config: Option<PathBuf> },
    Version,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config requires a path")?;
                config = Some(PathBuf::from(path));
            }
            "--version" | "-V" => return Ok(Command::Version),
            "--help" | "-h" => return Ok(Command::Help),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(Command::Serve { config })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(Command::Serve { config }) => config,
        Ok(Command::Version) => {
            println!("github-roaster {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Ok(Command::Help) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    info!("Starting github-roaster v{}", env!("CARGO_PKG_VERSION"));

    // Configuration problems stop us before the form is reachable.
    let settings = Settings::load(config.as_deref()).map_err(|e| {
        error!("{}", e);
        e
    })?;
    let form = PromptForm::from_settings(&settings)?;
    info!(
        model = %settings.model,
        github_profile = settings.github.enabled,
        "form ready"
    );

    let app = create_router(AppState::new(form)).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    info!("Listening on http://{}", settings.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
