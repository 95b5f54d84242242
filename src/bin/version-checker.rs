//! # version-checker
//!
//! Resolve, update and serve build versions from the command line.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use version_checker::bootstrap::ServiceContext;
use version_checker::cli;
use version_checker::config::ConfigManager;
use version_checker::logging::init_structured_logging;
use version_checker::web;

#[derive(Parser, Debug)]
#[command(name = "version-checker")]
#[command(about = "Cached build-version lookup service")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: config/version-checker[.<env>].toml)
    #[arg(short, long, global = true, env = "VERSION_CHECKER_CONFIG")]
    config: Option<PathBuf>,

    /// Environment (development, test, production)
    #[arg(short, long, global = true, env = "VERSION_CHECKER_ENV")]
    environment: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version of each project (default: every configured project)
    Show {
        projects: Vec<String>,
    },

    /// Set a project's version in the build config
    Update { project: String, version: String },

    /// Probe dependencies and print the health report
    Health,

    /// Run the HTTP server until Ctrl-C
    Serve {
        /// Listen port (overrides server.port / PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    let environment = args
        .environment
        .clone()
        .unwrap_or_else(ConfigManager::detect_environment);
    let config = match &args.config {
        Some(path) => ConfigManager::load_from_file_with_env(path, &environment),
        None => ConfigManager::load_from_directory_with_env(None, &environment),
    }
    .context("Failed to load configuration")?;

    let mut logging = config.config().logging.clone();
    logging.level = match args.verbose {
        0 if matches!(args.command, Commands::Serve { .. }) => logging.level.take(),
        0 => logging.level.take().or_else(|| Some("warn".to_string())),
        1 => Some("info".to_string()),
        2 => Some("debug".to_string()),
        _ => Some("trace".to_string()),
    };
    init_structured_logging(&logging, config.environment());

    let context = ServiceContext::bootstrap(config)
        .await
        .context("Failed to start services")?;

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    let succeeded = match &args.command {
        Commands::Show { projects } => {
            cli::show(&context.resolver, projects, &mut stdout).await?;
            true
        }
        Commands::Update { project, version } => {
            cli::update(&context.resolver, project, version, &mut stdout, &mut stderr).await?
        }
        Commands::Health => cli::health(&context.health, &mut stdout).await?,
        Commands::Serve { port } => {
            let server = &context.config.config().server;
            let bind_address = format!("{}:{}", server.host, port.unwrap_or(server.port));
            web::serve(context.app_state(), &bind_address, shutdown_signal()).await?;
            true
        }
    };

    context.shutdown().await;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Unable to listen for Ctrl-C, serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
